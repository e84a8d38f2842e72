/*!
# Dagger: Pipelines

A pipeline is a fixed, linear chain of stages. Optional steps are not left
out; they are replaced with a no-op so every chain of a given kind has the
same shape regardless of its options.
*/

use crate::{
	Asset,
	css,
	DaggerError,
	files::{
		self,
		Selection,
	},
	js,
	layout::MAPS,
	Mode,
	report,
	SourceMap,
};
use std::{
	fmt,
	path::{
		Path,
		PathBuf,
	},
};



/// # Stage.
///
/// One link in the chain: assets in, assets out.
pub(super) trait Stage: fmt::Debug + Send + Sync {
	/// # Label.
	fn label(&self) -> &'static str;

	/// # Apply.
	///
	/// ## Errors
	///
	/// A failing stage halts the pipeline.
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError>;
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Script Options.
pub(super) struct ScriptOptions {
	/// # Lint (and Fail on Errors).
	pub(super) lint: bool,

	/// # Transpile.
	pub(super) transpile: bool,

	/// # Use the Minified Extension.
	///
	/// Note: this only renames the file; the contents are not minified.
	pub(super) minify: bool,

	/// # Bundle Everything Into This File.
	pub(super) concat_name: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Style Options.
pub(super) struct StyleOptions {
	/// # Lint (Report Only).
	pub(super) lint: bool,

	/// # Minify (and Rename).
	pub(super) minify: bool,

	/// # Bundle Everything Into This File.
	pub(super) concat_name: Option<&'static str>,
}



#[derive(Default)]
/// # Pipeline.
pub(super) struct Pipeline {
	/// # Stages.
	stages: Vec<Box<dyn Stage>>,
}

impl fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.labels()).finish()
	}
}

impl Pipeline {
	/// # Scripts.
	///
	/// Source maps (development only), lint, report, fail on lint errors,
	/// bundle, transpile, rename, write maps (development only).
	pub(super) fn scripts(options: ScriptOptions, mode: Mode) -> Self {
		let dev = mode.is_development();
		let mut out = Self::default();
		out.push_if(dev, MapsInit);
		out.push_if(options.lint, LintScripts);
		out.push_if(options.lint, Report(Format::Stylish));
		out.push_if(options.lint, FailAfterError);
		match options.concat_name {
			Some(name) => out.push(Concat(name)),
			None => out.push(Noop),
		}
		out.push_if(options.transpile, Transpile);
		out.push_if(options.minify, Rename("min.js"));
		out.push_if(dev, MapsWrite(Comment::Line));
		out
	}

	/// # Styles.
	///
	/// Source maps (development only), lint, report, bundle, minify, rename,
	/// write maps (development only). Lint findings never fail the build.
	pub(super) fn styles(options: StyleOptions, mode: Mode) -> Self {
		let dev = mode.is_development();
		let mut out = Self::default();
		out.push_if(dev, MapsInit);
		out.push_if(options.lint, LintStyles);
		out.push_if(options.lint, Report(Format::CssLint));
		match options.concat_name {
			Some(name) => out.push(Concat(name)),
			None => out.push(Noop),
		}
		out.push_if(options.minify, MinifyStyles);
		out.push_if(options.minify, Rename("min.css"));
		out.push_if(dev, MapsWrite(Comment::Block));
		out
	}

	/// # Pages.
	///
	/// Pages are copied as-is, so there is nothing in the chain.
	pub(super) fn pages() -> Self { Self::default() }

	/// # Push.
	fn push<S: Stage + 'static>(&mut self, stage: S) {
		self.stages.push(Box::new(stage));
	}

	/// # Push If.
	///
	/// Push the stage if the condition holds, otherwise a no-op.
	fn push_if<S: Stage + 'static>(&mut self, cond: bool, stage: S) {
		if cond { self.push(stage); }
		else { self.push(Noop); }
	}

	/// # Labels.
	pub(super) fn labels(&self) -> Vec<&'static str> {
		self.stages.iter().map(|s| s.label()).collect()
	}

	/// # Run.
	///
	/// Feed the assets through each stage in turn.
	///
	/// ## Errors
	///
	/// The first failing stage stops everything.
	pub(super) fn run(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for stage in &self.stages { assets = stage.apply(assets)?; }
		Ok(assets)
	}

	/// # Execute.
	///
	/// Gather the sources, stage copies in the scratch directory, run the
	/// chain, then write the results to the destination. Nothing is written
	/// to the destination unless every stage succeeds.
	///
	/// Returns the number of files and bytes written to the destination.
	///
	/// ## Errors
	///
	/// Read, write, and stage failures all bubble up.
	pub(super) fn execute(&self, src: &Selection, tmp: &Path, dst: &Path)
	-> Result<(usize, u64), DaggerError> {
		let assets = src.gather()?;
		files::write_all(tmp, &assets)?;
		let assets = self.run(assets)?;
		let bytes = files::write_all(dst, &assets)?;
		Ok((assets.len(), bytes))
	}
}



#[derive(Debug, Clone, Copy)]
/// # No-Op.
struct Noop;

impl Stage for Noop {
	fn label(&self) -> &'static str { "noop" }
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Start Source Maps.
struct MapsInit;

impl Stage for MapsInit {
	fn label(&self) -> &'static str { "sourcemaps:init" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let map = SourceMap::identity(asset.rel_slashed(), asset.text()?);
			asset.set_map(map);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Lint Scripts.
struct LintScripts;

impl Stage for LintScripts {
	fn label(&self) -> &'static str { "lint" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let findings = js::lint(asset.text()?);
			asset.set_findings(findings);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Lint Styles.
struct LintStyles;

impl Stage for LintStyles {
	fn label(&self) -> &'static str { "lint" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let findings = css::lint(asset.origin(), asset.text()?);
			asset.set_findings(findings);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Report Format.
enum Format {
	/// # ESLint Stylish.
	Stylish,

	/// # CSSLint Text.
	CssLint,
}

#[derive(Debug, Clone, Copy)]
/// # Print Lint Findings.
struct Report(Format);

impl Report {
	/// # Render.
	fn render(self, assets: &[Asset]) -> String {
		match self.0 {
			Format::Stylish => report::stylish(
				assets.iter().map(|a| (a.origin(), a.findings()))
			),
			Format::CssLint => assets.iter()
				.map(|a| report::csslint(a.origin(), a.findings()))
				.collect(),
		}
	}
}

impl Stage for Report {
	fn label(&self) -> &'static str { "report" }
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		let out = self.render(&assets);
		if ! out.is_empty() { report::print(&out); }
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Fail After Error.
///
/// Abort if any asset picked up an error-level finding.
struct FailAfterError;

impl Stage for FailAfterError {
	fn label(&self) -> &'static str { "fail-after-error" }
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		let errors: usize = assets.iter().map(|a| report::error_count(a.findings())).sum();
		if errors == 0 { Ok(assets) }
		else { Err(DaggerError::Lint(errors)) }
	}
}



#[derive(Debug, Clone, Copy)]
/// # Concatenate.
///
/// Join everything, in order, into a single file separated by newlines.
struct Concat(&'static str);

impl Stage for Concat {
	fn label(&self) -> &'static str { "concat" }
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		let mut iter = assets.into_iter();
		let Some(mut first) = iter.next() else { return Ok(Vec::new()); };

		let mut map = first.take_map();
		let mut out = Asset::new(first.origin(), self.0, first.contents().to_vec());
		for mut next in iter {
			out.push_bytes(b"\n");
			out.push_bytes(next.contents());
			match (map.as_mut(), next.take_map()) {
				(Some(a), Some(b)) => { a.append(b); },
				(Some(a), None) => {
					a.push_unmapped(next.text().map_or(1, crate::sourcemap::line_count));
				},
				_ => {},
			}
		}

		if let Some(map) = map { out.set_map(map); }
		Ok(vec![out])
	}
}



#[derive(Debug, Clone, Copy)]
/// # Transpile Scripts.
struct Transpile;

impl Stage for Transpile {
	fn label(&self) -> &'static str { "transpile" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let out = js::transpile(asset.origin(), asset.text()?)?;
			asset.replace_text(out);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Minify Styles.
struct MinifyStyles;

impl Stage for MinifyStyles {
	fn label(&self) -> &'static str { "minify" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let out = css::minify(asset.origin(), asset.text()?)?;
			asset.replace_text(out);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Rename Extension.
struct Rename(&'static str);

impl Stage for Rename {
	fn label(&self) -> &'static str { "rename" }
	fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		for asset in &mut assets {
			let rel = asset.rel().with_extension(self.0);
			asset.set_rel(rel);
		}
		Ok(assets)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Map Comment Style.
enum Comment {
	/// # `//# …`
	Line,

	/// # `/*# … */`
	Block,
}

#[derive(Debug, Clone, Copy)]
/// # Write Source Maps.
///
/// Emit a `.map` file under the maps directory for every tracked asset, and
/// point the asset at it.
struct MapsWrite(Comment);

impl Stage for MapsWrite {
	fn label(&self) -> &'static str { "sourcemaps:write" }
	fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, DaggerError> {
		let mut out = Vec::with_capacity(assets.len() * 2);
		for mut asset in assets {
			let Some(map) = asset.take_map() else {
				out.push(asset);
				continue;
			};

			let rel = asset.rel_slashed();
			let map_rel = format!("{MAPS}/{rel}.map");
			let depth = asset.rel().parent().map_or(0, |p| p.components().count());
			let url = format!("{}{map_rel}", "../".repeat(depth));

			match self.0 {
				Comment::Line => asset.push_bytes(format!("\n//# sourceMappingURL={url}\n").as_bytes()),
				Comment::Block => asset.push_bytes(format!("\n/*# sourceMappingURL={url} */\n").as_bytes()),
			}

			let json = map.to_json(&rel);
			let map_asset = Asset::new(asset.origin(), PathBuf::from(map_rel), json.into_bytes());
			out.push(asset);
			out.push(map_asset);
		}
		Ok(out)
	}
}
