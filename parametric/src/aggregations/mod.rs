mod adaptive;
mod dependent;
mod entry;
mod planner;
mod range;
mod terms;
pub mod types;

pub use adaptive::AdaptiveBucketSizeEvaluator;
pub use dependent::prune_zero_counts;
pub use entry::RawEntry;
pub use planner::{BucketBoundaries, BucketBoundaryPlanner};
pub use range::RangeAggregator;
pub use terms::aggregate_tag_values;
pub use types::{
    Bucket, BucketingParams, NumericSummary, QueryTagInfo, RangeInfo, RecursiveField, TagValue,
};
