//! Parametric values engine
//!
//! Fans a request out over its fields, one collaborator round trip (or two
//! for bucketing) per field, and collects the per-field results in request
//! order.

use crate::aggregations::{
    aggregate_tag_values, prune_zero_counts, AdaptiveBucketSizeEvaluator, BucketingParams,
    NumericSummary, QueryTagInfo, RangeAggregator, RangeInfo, RecursiveField,
};
use crate::config::{FieldFailurePolicy, ParametricConfig};
use crate::metrics;
use crate::request::{FieldName, FieldTypeParam, ParametricRequest, QueryRestrictions};
use crate::source::{FieldMetadataSource, ValueCountSource};
use crate::{Error, Result, AUTN_DATE_FIELD};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

const OP_VALUES: &str = "values";
const OP_BUCKETS: &str = "buckets";
const OP_DEPENDENT: &str = "dependent";

pub struct ParametricValuesEngine {
    values: Arc<dyn ValueCountSource>,
    fields: Arc<dyn FieldMetadataSource>,
    config: ParametricConfig,
    semaphore: Arc<Semaphore>,
}

impl ParametricValuesEngine {
    pub fn new(
        values: Arc<dyn ValueCountSource>,
        fields: Arc<dyn FieldMetadataSource>,
        config: ParametricConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_fields.max(1)));
        Self {
            values,
            fields,
            config,
            semaphore,
        }
    }

    /// Engine over a single source serving both values and field metadata
    pub fn with_source<S>(source: Arc<S>, config: ParametricConfig) -> Self
    where
        S: ValueCountSource + FieldMetadataSource + 'static,
    {
        Self::new(source.clone(), source, config)
    }

    /// Categorical values for every requested field.
    ///
    /// Fields without any (non-zero) value are left out.
    pub async fn all_values(&self, request: &ParametricRequest) -> Result<Vec<QueryTagInfo>> {
        let fields = self.resolve_field_names(request).await?;
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let sort = request.sort.unwrap_or(self.config.sort);
        let limit = match request.max_values {
            Some(0) => None,
            Some(max) => Some(max as usize),
            None => self.config.max_values_limit(),
        };
        let query = &request.query_restrictions;

        debug!(
            "Fetching values for {} fields from {}",
            fields.len(),
            self.values.source_name()
        );

        self.run_per_field(OP_VALUES, &fields, move |field| async move {
            let values = self.values.fetch_values(query, &field).await?;
            Ok(aggregate_tag_values(&field, values, sort, limit))
        })
        .await
    }

    /// Numeric range buckets for every requested field with bucketing params.
    ///
    /// Params are looked up by full field name, then by field id. Fields with
    /// no params or a zero bucket target produce nothing.
    pub async fn bucketed_values(
        &self,
        request: &ParametricRequest,
        params: &HashMap<String, BucketingParams>,
    ) -> Result<Vec<RangeInfo>> {
        if params.values().all(BucketingParams::is_disabled) {
            return Ok(Vec::new());
        }

        let mut fields = self.resolve_field_names(request).await?;
        if request.field_names.is_empty()
            && params.contains_key(AUTN_DATE_FIELD)
            && !fields.iter().any(|f| f.id() == AUTN_DATE_FIELD)
        {
            fields.push(FieldName::from(AUTN_DATE_FIELD));
        }

        let targets: Vec<(FieldName, BucketingParams)> = fields
            .into_iter()
            .filter_map(|field| {
                let field_params = *lookup_params(params, &field)?;
                (!field_params.is_disabled()).then_some((field, field_params))
            })
            .collect();
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let by_name: HashMap<FieldName, BucketingParams> = targets.iter().cloned().collect();
        let names: Vec<FieldName> = targets.into_iter().map(|(field, _)| field).collect();
        let query = &request.query_restrictions;
        let by_name = &by_name;

        self.run_per_field(OP_BUCKETS, &names, move |field| async move {
            match by_name.get(&field) {
                Some(field_params) => self.bucket_field(query, &field, field_params).await,
                None => Ok(None),
            }
        })
        .await
    }

    /// Hierarchical value tree across the requested fields, outermost first.
    ///
    /// Nodes with a zero count are pruned at every level.
    pub async fn dependent_values(
        &self,
        request: &ParametricRequest,
    ) -> Result<Vec<RecursiveField>> {
        let fields = self.resolve_field_names(request).await?;
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let result = self
            .values
            .fetch_dependent_values(&request.query_restrictions, &fields)
            .await;
        metrics::record_field_duration(OP_DEPENDENT, start.elapsed());

        match result {
            Ok(tree) => {
                metrics::record_field_success(OP_DEPENDENT);
                Ok(prune_zero_counts(tree))
            }
            Err(e) => {
                metrics::record_field_error(OP_DEPENDENT, e.error_type());
                Err(e)
            }
        }
    }

    /// Requested fields in order without duplicates, or every parametric
    /// field the index declares when the request names none
    pub async fn resolve_field_names(&self, request: &ParametricRequest) -> Result<Vec<FieldName>> {
        let names = if request.field_names.is_empty() {
            let declared = self.fields.list_fields(FieldTypeParam::Parametric).await?;
            debug!("No fields requested, using {} declared fields", declared.len());
            declared
        } else {
            request.field_names.clone()
        };

        let mut seen = HashSet::with_capacity(names.len());
        Ok(names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }

    async fn bucket_field(
        &self,
        query: &QueryRestrictions,
        field: &FieldName,
        params: &BucketingParams,
    ) -> Result<Option<RangeInfo>> {
        if params.target_number_of_buckets > self.config.max_buckets_per_field {
            return Err(Error::InvalidBucketing {
                field: field.to_string(),
                reason: format!(
                    "{} buckets requested, at most {} allowed",
                    params.target_number_of_buckets, self.config.max_buckets_per_field
                ),
            });
        }

        let (min, max, first_pass) = if params.min.is_some() && params.max.is_some() {
            let (min, max) = observed_range(field, params, &NumericSummary::default())?;
            debug!("Explicit range [{}, {}] for field '{}'", min, max, field);
            (min, max, Vec::new())
        } else {
            let summary = self.values.fetch_numeric_summary(query, field).await?;
            let (min, max) = observed_range(field, params, &summary)?;
            // A coarse partition is only meaningful over the observed range
            let first_pass = if params.min.is_none() && params.max.is_none() {
                summary.buckets
            } else {
                Vec::new()
            };
            (min, max, first_pass)
        };

        let evaluator = AdaptiveBucketSizeEvaluator::new(params.target_number_of_buckets);
        let boundaries = evaluator.evaluate(min, max, &first_pass);
        if boundaries.is_empty() {
            return Ok(None);
        }

        let values = self
            .values
            .fetch_ranged_values(query, field, &boundaries)
            .await?;
        Ok(Some(RangeAggregator::aggregate(
            field.id(),
            &boundaries,
            &values,
        )))
    }

    /// Run `f` for every field, bounded by the configured concurrency, and
    /// collect the present results in field order.
    async fn run_per_field<T, F, Fut>(
        &self,
        operation: &'static str,
        fields: &[FieldName],
        f: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(FieldName) -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let futures: Vec<_> = fields
            .iter()
            .map(|field| {
                let semaphore = Arc::clone(&self.semaphore);
                let task = f(field.clone());

                async move {
                    let _permit = semaphore.acquire().await.ok();

                    let start = Instant::now();
                    let result = task.await;
                    metrics::record_field_duration(operation, start.elapsed());
                    match &result {
                        Ok(_) => metrics::record_field_success(operation),
                        Err(e) => metrics::record_field_error(operation, e.error_type()),
                    }
                    result
                }
            })
            .collect();

        let results = futures::future::join_all(futures).await;

        let mut output = Vec::with_capacity(results.len());
        for (field, result) in fields.iter().zip(results) {
            match result {
                Ok(Some(value)) => output.push(value),
                Ok(None) => debug!("Field '{}' produced no {}", field, operation),
                Err(e) => {
                    let e = e.for_field(field.as_str());
                    match self.config.field_failure {
                        FieldFailurePolicy::Fail => return Err(e),
                        FieldFailurePolicy::Skip => {
                            warn!("Skipping field '{}' for {}: {}", field, operation, e);
                        }
                    }
                }
            }
        }

        Ok(output)
    }
}

fn lookup_params<'a>(
    params: &'a HashMap<String, BucketingParams>,
    field: &FieldName,
) -> Option<&'a BucketingParams> {
    params
        .get(field.as_str())
        .or_else(|| params.get(field.id()))
}

/// Range to bucket: explicit bounds win, missing ones come from the summary.
///
/// A derived bound that falls on the wrong side of an explicit one collapses
/// onto it. With nothing to go on the range is `[0, 0]`.
fn observed_range(
    field: &FieldName,
    params: &BucketingParams,
    summary: &NumericSummary,
) -> Result<(f64, f64)> {
    let invalid = |reason: String| Error::InvalidBucketing {
        field: field.to_string(),
        reason,
    };

    for bound in [params.min, params.max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(invalid(format!("bound {} is not finite", bound)));
        }
    }

    match (params.min, params.max) {
        (Some(min), Some(max)) if min > max => {
            Err(invalid(format!("min {} is greater than max {}", min, max)))
        }
        (Some(min), Some(max)) => Ok((min, max)),
        (Some(min), None) => Ok((min, summary.max.map_or(min, |max| max.max(min)))),
        (None, Some(max)) => Ok((summary.min.map_or(max, |min| min.min(max)), max)),
        (None, None) => match (summary.min, summary.max) {
            (Some(min), Some(max)) => Ok((min, max)),
            (Some(only), None) | (None, Some(only)) => Ok((only, only)),
            (None, None) => {
                debug!("No observed range for field '{}', using [0, 0]", field);
                Ok((0.0, 0.0))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(min: f64, max: f64) -> NumericSummary {
        NumericSummary {
            min: Some(min),
            max: Some(max),
            total_count: 1,
            buckets: Vec::new(),
        }
    }

    fn range(params: BucketingParams, summary: &NumericSummary) -> Result<(f64, f64)> {
        observed_range(&FieldName::from("PRICE"), &params, summary)
    }

    #[test]
    fn test_explicit_bounds_win() {
        let params = BucketingParams::with_range(5, 1.0, 5.0);
        assert_eq!(range(params, &summary(-10.0, 99.0)).unwrap(), (1.0, 5.0));
    }

    #[test]
    fn test_half_specified_bounds_use_summary() {
        let params = BucketingParams {
            min: Some(10.0),
            ..BucketingParams::new(4)
        };
        assert_eq!(range(params, &summary(0.0, 50.0)).unwrap(), (10.0, 50.0));
        // Derived max below the explicit min collapses onto it
        assert_eq!(range(params, &summary(0.0, 5.0)).unwrap(), (10.0, 10.0));
    }

    #[test]
    fn test_no_data_is_zero_range() {
        let params = BucketingParams::new(5);
        assert_eq!(range(params, &NumericSummary::default()).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_inverted_explicit_bounds_are_rejected() {
        let err = range(BucketingParams::with_range(5, 9.0, 1.0), &NumericSummary::default())
            .unwrap_err();
        assert_eq!(err.error_type(), "invalid_bucketing");
    }

    #[test]
    fn test_non_finite_bound_is_rejected() {
        let params = BucketingParams {
            max: Some(f64::INFINITY),
            ..BucketingParams::new(5)
        };
        assert!(range(params, &summary(0.0, 1.0)).is_err());
    }

    #[test]
    fn test_params_lookup_falls_back_to_id() {
        let mut params = HashMap::new();
        params.insert("PRICE".to_string(), BucketingParams::new(3));
        let field = FieldName::from("DOCUMENT/PRICE");
        assert_eq!(lookup_params(&params, &field).map(|p| p.target_number_of_buckets), Some(3));
        assert!(lookup_params(&params, &FieldName::from("OTHER")).is_none());
    }
}
