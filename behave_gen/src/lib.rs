//! Behave Gen
//!
//! Compiles behavior suites into Rust test source.
//! Each case becomes one `#[test]` function that builds the operation input
//! as a typed literal, sends it against a synthetic response and checks the
//! result with the predicates of `behave_testing`.

pub mod assertions;
pub mod compiler;
pub mod config;
pub mod error;
pub mod naming;
pub mod shape_builder;

pub use assertions::{AssertionCompiler, CompiledAssertion};
pub use compiler::SuiteCompiler;
pub use config::GeneratorConfig;
pub use error::{GenError, Result};
pub use shape_builder::ShapeValueBuilder;

use behave_core::{ApiModel, BehaviorSuite, SuiteLoader};
use std::path::Path;

/// Generate test source for an already loaded suite
pub fn generate(
    suite: &BehaviorSuite,
    model: &ApiModel,
    config: &GeneratorConfig,
) -> Result<String> {
    SuiteCompiler::new(model, config).compile(suite)
}

/// Load a suite and an API model from disk and generate test source
pub fn generate_from_files<S, M>(spec: S, model: M, config: &GeneratorConfig) -> Result<String>
where
    S: AsRef<Path>,
    M: AsRef<Path>,
{
    let suite = SuiteLoader::new().load_file(spec)?;
    let model = ApiModel::load_file(model)?;
    generate(&suite, &model, config)
}

/// Write generated source to `out`, or with `check` compare it to the file
///
/// A check fails with [`GenError::OutOfDate`] when the file content differs.
pub fn write_output(out: &Path, source: &str, check: bool) -> Result<()> {
    if check {
        let existing = std::fs::read_to_string(out)?;
        if existing != source {
            return Err(GenError::OutOfDate(out.to_path_buf()));
        }
        tracing::info!("{} is up to date", out.display());
    } else {
        std::fs::write(out, source)?;
        tracing::info!("Wrote {}", out.display());
    }
    Ok(())
}
