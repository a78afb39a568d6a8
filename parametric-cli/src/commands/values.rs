use anyhow::Result;
use parametric::{ParametricRequest, ParametricValuesEngine, SortParam};

pub async fn run_values(
    engine: &ParametricValuesEngine,
    fields: Vec<String>,
    sort: Option<SortParam>,
    max_values: Option<u32>,
) -> Result<()> {
    let mut request = ParametricRequest::new(fields);
    request.sort = sort;
    request.max_values = max_values;

    let values = engine.all_values(&request).await?;
    tracing::info!("{} fields with values", values.len());
    super::print_json(&values)
}
