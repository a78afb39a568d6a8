use anyhow::Result;
use parametric::{BucketingParams, ParametricRequest, ParametricValuesEngine};
use std::collections::HashMap;

/// Bucket every field with the same params
pub async fn run_buckets(
    engine: &ParametricValuesEngine,
    fields: Vec<String>,
    buckets: u32,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<()> {
    let params = BucketingParams {
        target_number_of_buckets: buckets,
        min,
        max,
    };
    let per_field: HashMap<String, BucketingParams> =
        fields.iter().map(|field| (field.clone(), params)).collect();

    let ranges = engine
        .bucketed_values(&ParametricRequest::new(fields), &per_field)
        .await?;
    super::print_json(&ranges)
}
