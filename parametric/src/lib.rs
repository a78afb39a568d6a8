//! Parametric value aggregation over an external search index
//!
//! Exposes faceted value lists, dependent (hierarchical) value trees and
//! numeric/date range bucketing for parametric fields. The index itself is
//! reached through two collaborator traits in [`source`]; everything here is
//! request-scoped and stateless.
//!
//! # Bucketing pipeline
//!
//! ```text
//! BucketingParams ─┐
//!                  ├─> AdaptiveBucketSizeEvaluator ─> BucketBoundaries
//! NumericSummary ──┘            (planner)                    │
//!                                                            v
//!                         ranged TagValues ─> RangeAggregator ─> RangeInfo
//! ```

pub mod aggregations;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod request;
pub mod source;

pub use aggregations::{
    AdaptiveBucketSizeEvaluator, Bucket, BucketBoundaries, BucketBoundaryPlanner, BucketingParams,
    NumericSummary, QueryTagInfo, RangeAggregator, RangeInfo, RawEntry, RecursiveField, TagValue,
};
pub use config::Config;
pub use engine::ParametricValuesEngine;
pub use error::{Error, Result};
pub use request::{FieldName, FieldTypeParam, ParametricRequest, QueryRestrictions, SortParam};
pub use source::{FieldMetadataSource, FixtureSource, ValueCountSource};

/// Built-in document date field exposed by the index; always bucketable.
pub const AUTN_DATE_FIELD: &str = "autn_date";
