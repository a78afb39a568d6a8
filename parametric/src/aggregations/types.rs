use serde::{Deserialize, Serialize};

/// Bucketing request for one numeric or date field.
///
/// Unset `min`/`max` are derived from the field's observed range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketingParams {
    pub target_number_of_buckets: u32,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl BucketingParams {
    pub fn new(target_number_of_buckets: u32) -> Self {
        Self {
            target_number_of_buckets,
            min: None,
            max: None,
        }
    }

    pub fn with_range(target_number_of_buckets: u32, min: f64, max: f64) -> Self {
        Self {
            target_number_of_buckets,
            min: Some(min),
            max: Some(max),
        }
    }

    /// True when the caller asked for no aggregation at all
    pub fn is_disabled(&self) -> bool {
        self.target_number_of_buckets == 0
    }
}

/// One contiguous range `[range_start, range_end)` and its occurrence count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub count: u64,
    pub range_start: f64,
    pub range_end: f64,
}

impl Bucket {
    pub fn new(count: u64, range_start: f64, range_end: f64) -> Self {
        Self {
            count,
            range_start,
            range_end,
        }
    }

    pub fn width(&self) -> f64 {
        self.range_end - self.range_start
    }
}

/// Bucketed result for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeInfo {
    pub id: String,
    /// Total occurrences reported by the source for the field
    pub count: u64,
    /// Effective lower bound covered by `values`
    pub min: f64,
    /// Effective upper bound covered by `values`; may exceed the requested max
    pub max: f64,
    pub values: Vec<Bucket>,
}

/// Raw value (or textual sub-range) with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagValue {
    pub value: String,
    pub count: u64,
}

impl TagValue {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Categorical values for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTagInfo {
    pub id: String,
    pub name: String,
    pub values: Vec<TagValue>,
}

/// Hierarchical value of a dependent parametric field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveField {
    pub value: String,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<RecursiveField>,
}

impl RecursiveField {
    pub fn leaf(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
            fields: Vec::new(),
        }
    }

    pub fn with_children(value: impl Into<String>, count: u64, fields: Vec<RecursiveField>) -> Self {
        Self {
            value: value.into(),
            count,
            fields,
        }
    }
}

/// First-pass numeric information about a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub total_count: u64,
    /// Coarse partition computed by the source at its own granularity
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

impl NumericSummary {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0 && self.min.is_none() && self.max.is_none()
    }
}
