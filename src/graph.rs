/*!
# Dagger: Task Graph

Tasks are nodes, dependencies are edges, and nothing runs before everything
it depends on has finished successfully.
*/

use crate::DaggerError;
use crossbeam_channel::{
	Receiver,
	Sender,
};
use dactyl::NiceU64;
use fyi_msg::Msg;
use petgraph::{
	algo::toposort,
	Direction::{
		Incoming,
		Outgoing,
	},
	graph::{
		DiGraph,
		NodeIndex,
	},
};
use std::{
	collections::{
		HashMap,
		HashSet,
	},
	fmt,
	num::NonZeroUsize,
	panic::{
		self,
		AssertUnwindSafe,
	},
	sync::atomic::{
		AtomicBool,
		Ordering::Acquire,
	},
	thread,
	time::{
		Duration,
		Instant,
	},
};



/// # Task Body.
pub(super) type Body<C> = fn(&C) -> Result<(), DaggerError>;

/// # Completion Message.
type Done = (NodeIndex, Result<(), DaggerError>, Duration);



/// # Task.
pub(super) struct Task<C> {
	/// # Name.
	pub(super) name: &'static str,

	/// # Dependencies.
	pub(super) deps: &'static [&'static str],

	/// # Body.
	///
	/// Grouping tasks have nothing to do beyond their dependencies.
	pub(super) body: Option<Body<C>>,
}

impl<C> fmt::Debug for Task<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Task")
			.field("name", &self.name)
			.field("deps", &self.deps)
			.field("body", &self.body.is_some())
			.finish()
	}
}

impl<C> Task<C> {
	/// # New.
	pub(super) const fn new(
		name: &'static str,
		deps: &'static [&'static str],
		body: Option<Body<C>>,
	) -> Self {
		Self { name, deps, body }
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Outcome.
pub(super) enum Outcome {
	/// # Finished Successfully.
	Done,

	/// # Failed.
	Failed(DaggerError),

	/// # Never Ran.
	///
	/// A prerequisite failed, or the run was aborted.
	Skipped,
}



#[derive(Debug, Clone)]
/// # Run Summary.
pub(super) struct Summary {
	/// # Outcomes (in Settle Order).
	outcomes: Vec<(&'static str, Outcome)>,

	/// # Aborted?
	killed: bool,

	/// # Elapsed.
	elapsed: Duration,
}

impl Summary {
	/// # Outcome For.
	pub(super) fn outcome(&self, name: &str) -> Option<&Outcome> {
		self.outcomes.iter().find_map(|(n, o)| (*n == name).then_some(o))
	}

	/// # Names, Filtered.
	fn names(&self, cb: fn(&Outcome) -> bool) -> Vec<&'static str> {
		self.outcomes.iter()
			.filter_map(|(n, o)| cb(o).then_some(*n))
			.collect()
	}

	/// # Completed Task Names (in Order).
	pub(super) fn completed(&self) -> Vec<&'static str> {
		self.names(|o| matches!(o, Outcome::Done))
	}

	/// # Elapsed.
	pub(super) const fn elapsed(&self) -> Duration { self.elapsed }

	/// # Result.
	///
	/// ## Errors
	///
	/// An aborted run or one with any failures is an error.
	pub(super) fn result(&self) -> Result<(), DaggerError> {
		if self.killed { return Err(DaggerError::Killed); }
		let failed = self.names(|o| matches!(o, Outcome::Failed(_)));
		if failed.is_empty() { Ok(()) }
		else { Err(DaggerError::Failed(failed)) }
	}
}



#[derive(Debug)]
/// # Task Graph.
pub(super) struct TaskGraph<'a, C> {
	/// # Graph.
	///
	/// Edges point from a dependency to its dependent.
	graph: DiGraph<&'a Task<C>, ()>,

	/// # Name Lookup.
	index: HashMap<&'static str, NodeIndex>,
}

impl<'a, C: Sync> TaskGraph<'a, C> {
	/// # New.
	///
	/// ## Errors
	///
	/// Every dependency must name a real task, and there can't be any
	/// cycles.
	pub(super) fn new(tasks: &'a [Task<C>]) -> Result<Self, DaggerError> {
		let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
		let mut index = HashMap::with_capacity(tasks.len());
		for task in tasks {
			index.insert(task.name, graph.add_node(task));
		}

		for task in tasks {
			let to = index[task.name];
			for dep in task.deps {
				let from = index.get(dep)
					.copied()
					.ok_or(DaggerError::UnknownDependency(task.name, *dep))?;
				graph.add_edge(from, to, ());
			}
		}

		toposort(&graph, None)
			.map_err(|c| DaggerError::Cycle(graph[c.node_id()].name))?;

		Ok(Self { graph, index })
	}

	/// # Plan.
	///
	/// Return the targets and everything they transitively depend on.
	///
	/// ## Errors
	///
	/// Unknown targets are errors.
	fn plan<S: AsRef<str>>(&self, targets: &[S]) -> Result<HashSet<NodeIndex>, DaggerError> {
		let mut out = HashSet::new();
		let mut stack = Vec::new();
		for t in targets {
			let t = t.as_ref();
			let idx = self.index.get(t)
				.copied()
				.ok_or_else(|| DaggerError::UnknownTask(t.to_owned()))?;
			stack.push(idx);
		}

		while let Some(idx) = stack.pop() {
			if out.insert(idx) {
				stack.extend(self.graph.neighbors_directed(idx, Incoming));
			}
		}

		Ok(out)
	}

	/// # Check Targets.
	///
	/// ## Errors
	///
	/// Unknown targets are errors.
	pub(super) fn check<S: AsRef<str>>(&self, targets: &[S]) -> Result<usize, DaggerError> {
		self.plan(targets).map(|p| p.len())
	}

	/// # Run.
	///
	/// Execute the targets and their prerequisites using up to `jobs` worker
	/// threads. Independent chains run side-by-side; a failure only stops
	/// the tasks downstream of it.
	///
	/// ## Errors
	///
	/// This only fails if the targets are unknown; task failures are
	/// recorded in the summary.
	pub(super) fn run<S: AsRef<str>>(
		&self,
		targets: &[S],
		ctx: &C,
		jobs: NonZeroUsize,
		quiet: bool,
		killed: &AtomicBool,
	) -> Result<Summary, DaggerError> {
		let now = Instant::now();
		let plan = self.plan(targets)?;
		let mut waiting: HashMap<NodeIndex, usize> = plan.iter()
			.map(|&idx| (idx, self.graph.neighbors_directed(idx, Incoming).count()))
			.collect();
		let mut settled: HashSet<NodeIndex> = HashSet::with_capacity(plan.len());
		let mut outcomes = Vec::with_capacity(plan.len());

		let threads = NonZeroUsize::new(plan.len()).map_or(NonZeroUsize::MIN, |n| n.min(jobs));
		let (tx, rx) = crossbeam_channel::bounded::<NodeIndex>(threads.get());
		let (done_tx, done_rx) = crossbeam_channel::unbounded::<Done>();

		thread::scope(#[inline(always)] |s| {
			// Set up the worker threads.
			for _ in 0..threads.get() {
				let rx = rx.clone();
				let done_tx = done_tx.clone();
				s.spawn(move || self.work(&rx, &done_tx, ctx, quiet));
			}
			drop(done_tx);

			// Queue up everything that's ready to go.
			let mut in_flight = 0_usize;
			let mut ready: Vec<NodeIndex> = waiting.iter()
				.filter_map(|(&idx, &n)| (n == 0).then_some(idx))
				.collect();
			ready.sort_unstable();
			for idx in ready {
				if killed.load(Acquire) || tx.send(idx).is_err() { break; }
				in_flight += 1;
			}

			// Settle completions, unlocking dependents as we go.
			while in_flight != 0 {
				let Ok((idx, res, elapsed)) = done_rx.recv() else { break; };
				in_flight -= 1;
				let name = self.graph[idx].name;
				settled.insert(idx);

				match res {
					Ok(()) => {
						if ! quiet {
							Msg::success(format!("Finished '{name}' after {} ms", nice_ms(elapsed)))
								.with_newline(true)
								.print();
						}
						outcomes.push((name, Outcome::Done));

						for next in self.graph.neighbors_directed(idx, Outgoing) {
							let Some(n) = waiting.get_mut(&next) else { continue; };
							*n -= 1;
							if
								*n == 0 &&
								! killed.load(Acquire) &&
								tx.send(next).is_ok()
							{
								in_flight += 1;
							}
						}
					},
					Err(e) => {
						Msg::error(format!("'{name}' errored after {} ms: {e}", nice_ms(elapsed)))
							.with_newline(true)
							.eprint();
						outcomes.push((name, Outcome::Failed(e)));
					},
				}
			}

			// Disconnect the workers.
			drop(tx);
		});
		drop(rx);

		// Anything left never got its turn.
		let mut unsettled: Vec<NodeIndex> = plan.into_iter()
			.filter(|idx| ! settled.contains(idx))
			.collect();
		unsettled.sort_unstable();
		for idx in unsettled {
			let name = self.graph[idx].name;
			if ! quiet {
				Msg::warning(format!("Skipped '{name}'."))
					.with_newline(true)
					.print();
			}
			outcomes.push((name, Outcome::Skipped));
		}

		Ok(Summary {
			outcomes,
			killed: killed.load(Acquire),
			elapsed: now.elapsed(),
		})
	}

	#[inline(never)]
	/// # Worker Callback.
	///
	/// Listen for ready tasks and run them, reporting back when each is done,
	/// then quit when the work has dried up.
	fn work(&self, rx: &Receiver<NodeIndex>, done: &Sender<Done>, ctx: &C, quiet: bool) {
		while let Ok(idx) = rx.recv() {
			let task = self.graph[idx];
			if ! quiet {
				Msg::task(format!("Starting '{}'…", task.name))
					.with_newline(true)
					.print();
			}

			let now = Instant::now();
			let res = task.body.map_or(Ok(()), |body|
				// A panicking body fails its task like any other error.
				panic::catch_unwind(AssertUnwindSafe(|| body(ctx)))
					.unwrap_or(Err(DaggerError::Panic))
			);
			if done.send((idx, res, now.elapsed())).is_err() { break; }
		}
	}
}



/// # Nice Milliseconds.
pub(super) fn nice_ms(elapsed: Duration) -> NiceU64 {
	NiceU64::from(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}



#[cfg(test)]
mod test {
	use super::*;
	use std::sync::Mutex;

	#[derive(Debug, Default)]
	struct Log(Mutex<Vec<&'static str>>);

	impl Log {
		fn push(&self, name: &'static str) -> Result<(), DaggerError> {
			if let Ok(mut v) = self.0.lock() { v.push(name); }
			Ok(())
		}

		fn list(&self) -> Vec<&'static str> {
			self.0.lock().map(|v| v.clone()).unwrap_or_default()
		}

		fn position(&self, name: &str) -> usize {
			self.list().iter().position(|n| *n == name).expect("Task did not run.")
		}
	}

	static TASKS: [Task<Log>; 7] = [
		Task::new("build", &["a:post", "b:post"], Some(|l| l.push("build"))),
		Task::new("a:pre", &[], Some(|l| l.push("a:pre"))),
		Task::new("a:post", &["a:pre"], Some(|l| l.push("a:post"))),
		Task::new("b:pre", &[], Some(|l| l.push("b:pre"))),
		Task::new("b:post", &["b:pre"], Some(|l| l.push("b:post"))),
		Task::new("group", &["a:post"], None),
		Task::new("lonely", &[], Some(|l| l.push("lonely"))),
	];

	static PANICKY: [Task<Log>; 4] = [
		Task::new("boom", &[], Some(|_| panic!("Kaboom."))),
		Task::new("after", &["boom"], Some(|l| l.push("after"))),
		Task::new("calm", &[], Some(|l| l.push("calm"))),
		Task::new("top", &["after", "calm"], Some(|l| l.push("top"))),
	];

	static FAILING: [Task<Log>; 5] = [
		Task::new("top", &["bad", "good"], Some(|l| l.push("top"))),
		Task::new("bad", &[], Some(|_| Err(DaggerError::Lint(1)))),
		Task::new("after-bad", &["bad"], Some(|l| l.push("after-bad"))),
		Task::new("good", &[], Some(|l| l.push("good"))),
		Task::new("after-good", &["good"], Some(|l| l.push("after-good"))),
	];

	fn jobs(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).expect("Zero jobs.") }

	#[test]
	fn t_order() {
		let graph = TaskGraph::new(&TASKS).expect("Graph failed.");
		for threads in [1, 4] {
			let log = Log::default();
			let killed = AtomicBool::new(false);
			let summary = graph.run(&["build"], &log, jobs(threads), true, &killed)
				.expect("Run failed.");
			assert!(summary.result().is_ok());

			// Exactly the plan, nothing more.
			let mut ran = log.list();
			ran.sort_unstable();
			assert_eq!(ran, ["a:post", "a:pre", "b:post", "b:pre", "build"]);
			assert_eq!(summary.completed().len(), 5);

			// Dependencies first.
			assert!(log.position("a:pre") < log.position("a:post"));
			assert!(log.position("b:pre") < log.position("b:post"));
			assert!(log.position("a:post") < log.position("build"));
			assert!(log.position("b:post") < log.position("build"));
		}
	}

	#[test]
	fn t_bodiless() {
		let graph = TaskGraph::new(&TASKS).expect("Graph failed.");
		let log = Log::default();
		let killed = AtomicBool::new(false);
		let summary = graph.run(&["group"], &log, jobs(2), true, &killed)
			.expect("Run failed.");
		assert!(summary.result().is_ok());
		assert_eq!(log.list(), ["a:pre", "a:post"]);
		assert_eq!(summary.outcome("group"), Some(&Outcome::Done));
	}

	#[test]
	fn t_failure() {
		let graph = TaskGraph::new(&FAILING).expect("Graph failed.");
		let log = Log::default();
		let killed = AtomicBool::new(false);
		let summary = graph.run(&["top", "after-bad", "after-good"], &log, jobs(2), true, &killed)
			.expect("Run failed.");

		assert_eq!(summary.result(), Err(DaggerError::Failed(vec!["bad"])));
		assert_eq!(summary.outcome("bad"), Some(&Outcome::Failed(DaggerError::Lint(1))));
		assert_eq!(summary.outcome("top"), Some(&Outcome::Skipped));
		assert_eq!(summary.outcome("after-bad"), Some(&Outcome::Skipped));

		// The unrelated chain still ran.
		assert_eq!(summary.outcome("good"), Some(&Outcome::Done));
		assert_eq!(summary.outcome("after-good"), Some(&Outcome::Done));
		let ran = log.list();
		assert!(! ran.contains(&"top"));
		assert!(! ran.contains(&"after-bad"));
	}

	#[test]
	fn t_panic() {
		let graph = TaskGraph::new(&PANICKY).expect("Graph failed.");
		for threads in [1, 3] {
			let log = Log::default();
			let killed = AtomicBool::new(false);
			let summary = graph.run(&["top"], &log, jobs(threads), true, &killed)
				.expect("Run failed.");

			assert_eq!(summary.result(), Err(DaggerError::Failed(vec!["boom"])));
			assert_eq!(summary.outcome("boom"), Some(&Outcome::Failed(DaggerError::Panic)));
			assert_eq!(summary.outcome("after"), Some(&Outcome::Skipped));
			assert_eq!(summary.outcome("top"), Some(&Outcome::Skipped));
			assert_eq!(summary.outcome("calm"), Some(&Outcome::Done));
			assert_eq!(log.list(), ["calm"]);
		}
	}

	#[test]
	fn t_killed() {
		let graph = TaskGraph::new(&TASKS).expect("Graph failed.");
		let log = Log::default();
		let killed = AtomicBool::new(true);
		let summary = graph.run(&["build"], &log, jobs(2), true, &killed)
			.expect("Run failed.");
		assert_eq!(summary.result(), Err(DaggerError::Killed));
		assert!(log.list().is_empty());
		assert_eq!(summary.outcome("build"), Some(&Outcome::Skipped));
	}

	#[test]
	fn t_invalid() {
		static UNKNOWN: [Task<Log>; 1] = [Task::new("a", &["nope"], None)];
		assert_eq!(
			TaskGraph::new(&UNKNOWN).map(|_| ()),
			Err(DaggerError::UnknownDependency("a", "nope")),
		);

		static CYCLE: [Task<Log>; 3] = [
			Task::new("a", &["c"], None),
			Task::new("b", &["a"], None),
			Task::new("c", &["b"], None),
		];
		assert!(matches!(TaskGraph::new(&CYCLE), Err(DaggerError::Cycle(_))));

		let graph = TaskGraph::new(&TASKS).expect("Graph failed.");
		assert_eq!(graph.check(&["build"]), Ok(5));
		assert_eq!(graph.check(&["lonely", "group"]), Ok(4));
		assert_eq!(
			graph.check(&["bogus"]),
			Err(DaggerError::UnknownTask("bogus".to_owned())),
		);
	}
}
