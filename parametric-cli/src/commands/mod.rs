pub mod buckets;
pub mod dependent;
pub mod values;

pub use buckets::run_buckets;
pub use dependent::run_dependent;
pub use values::run_values;

use anyhow::{Context, Result};
use parametric::{Config, FixtureSource, ParametricValuesEngine};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Engine over the fixture at `path`
pub fn load_engine(path: &Path, config: &Config) -> Result<ParametricValuesEngine> {
    let source = FixtureSource::from_path(path)
        .with_context(|| format!("Failed to load fixture {:?}", path))?;
    Ok(ParametricValuesEngine::with_source(
        Arc::new(source),
        config.parametric.clone(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
