//! Collaborators that reach the external index
//!
//! Transport, wire formats and retries live behind these traits; the engine
//! only ever sees classified values and summaries.

mod fixture;

pub use fixture::{FieldFixture, FixtureData, FixtureSource, SourceCall};

use crate::aggregations::{BucketBoundaries, NumericSummary, RecursiveField, TagValue};
use crate::request::{FieldName, FieldTypeParam, QueryRestrictions};
use crate::Result;
use async_trait::async_trait;

/// Lists the fields the index declares for a category
#[async_trait]
pub trait FieldMetadataSource: Send + Sync {
    async fn list_fields(&self, field_type: FieldTypeParam) -> Result<Vec<FieldName>>;
}

/// Fetches raw value/count data for fields under a query
#[async_trait]
pub trait ValueCountSource: Send + Sync {
    /// Raw values (or textual sub-ranges) with occurrence counts
    async fn fetch_values(
        &self,
        query: &QueryRestrictions,
        field: &FieldName,
    ) -> Result<Vec<TagValue>>;

    /// First-pass min/max/count and the source's own coarse partition
    async fn fetch_numeric_summary(
        &self,
        query: &QueryRestrictions,
        field: &FieldName,
    ) -> Result<NumericSummary>;

    /// Values pre-aggregated into `boundaries` where the source supports it.
    ///
    /// Sources that cannot aggregate by range return atomic values, which
    /// bucket identically.
    async fn fetch_ranged_values(
        &self,
        query: &QueryRestrictions,
        field: &FieldName,
        _boundaries: &BucketBoundaries,
    ) -> Result<Vec<TagValue>> {
        self.fetch_values(query, field).await
    }

    /// Value tree across the ordered list of dependent fields
    async fn fetch_dependent_values(
        &self,
        _query: &QueryRestrictions,
        _fields: &[FieldName],
    ) -> Result<Vec<RecursiveField>> {
        Ok(Vec::new())
    }

    /// Human-readable source name
    fn source_name(&self) -> &str;
}
