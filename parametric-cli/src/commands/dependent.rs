use anyhow::Result;
use parametric::{ParametricRequest, ParametricValuesEngine};

pub async fn run_dependent(engine: &ParametricValuesEngine, fields: Vec<String>) -> Result<()> {
    let tree = engine
        .dependent_values(&ParametricRequest::new(fields))
        .await?;
    super::print_json(&tree)
}
