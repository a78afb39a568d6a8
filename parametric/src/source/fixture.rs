use super::{FieldMetadataSource, ValueCountSource};
use crate::aggregations::{BucketBoundaries, NumericSummary, RawEntry, RecursiveField, TagValue};
use crate::request::{FieldName, FieldTypeParam, QueryRestrictions};
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Canned data for one field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldFixture {
    #[serde(default)]
    pub values: Vec<TagValue>,
    /// Derived from `values` when absent
    #[serde(default)]
    pub summary: Option<NumericSummary>,
    /// Returned for range requests; `values` when absent
    #[serde(default)]
    pub ranged_values: Option<Vec<TagValue>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureData {
    #[serde(default)]
    pub field_types: HashMap<FieldTypeParam, Vec<FieldName>>,
    #[serde(default)]
    pub fields: HashMap<String, FieldFixture>,
    #[serde(default)]
    pub dependent: Vec<RecursiveField>,
}

/// Collaborator call as seen by a [`FixtureSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    ListFields(FieldTypeParam),
    Values(String),
    NumericSummary(String),
    RangedValues(String),
    DependentValues(Vec<String>),
}

/// In-memory source serving canned data for both collaborator traits.
///
/// Every call is recorded so callers can check what the engine asked for.
#[derive(Debug, Default)]
pub struct FixtureSource {
    data: FixtureData,
    calls: Mutex<Vec<SourceCall>>,
}

impl FixtureSource {
    pub fn new(data: FixtureData) -> Self {
        Self {
            data,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_field_type(mut self, field_type: FieldTypeParam, names: &[&str]) -> Self {
        self.data
            .field_types
            .insert(field_type, names.iter().map(|n| FieldName::from(*n)).collect());
        self
    }

    pub fn with_values(mut self, field: &str, values: Vec<TagValue>) -> Self {
        self.data.fields.entry(field.to_string()).or_default().values = values;
        self
    }

    pub fn with_summary(mut self, field: &str, summary: NumericSummary) -> Self {
        self.data.fields.entry(field.to_string()).or_default().summary = Some(summary);
        self
    }

    pub fn with_ranged_values(mut self, field: &str, values: Vec<TagValue>) -> Self {
        self.data.fields.entry(field.to_string()).or_default().ranged_values = Some(values);
        self
    }

    pub fn with_dependent(mut self, tree: Vec<RecursiveField>) -> Self {
        self.data.dependent = tree;
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: SourceCall) {
        self.calls.lock().push(call);
    }

    fn field(&self, field: &FieldName) -> Option<&FieldFixture> {
        self.data
            .fields
            .get(field.as_str())
            .or_else(|| self.data.fields.get(field.id()))
    }
}

#[async_trait]
impl FieldMetadataSource for FixtureSource {
    async fn list_fields(&self, field_type: FieldTypeParam) -> Result<Vec<FieldName>> {
        self.record(SourceCall::ListFields(field_type));
        Ok(self
            .data
            .field_types
            .get(&field_type)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ValueCountSource for FixtureSource {
    async fn fetch_values(
        &self,
        _query: &QueryRestrictions,
        field: &FieldName,
    ) -> Result<Vec<TagValue>> {
        self.record(SourceCall::Values(field.to_string()));
        Ok(self.field(field).map(|f| f.values.clone()).unwrap_or_default())
    }

    async fn fetch_numeric_summary(
        &self,
        _query: &QueryRestrictions,
        field: &FieldName,
    ) -> Result<NumericSummary> {
        self.record(SourceCall::NumericSummary(field.to_string()));
        let Some(fixture) = self.field(field) else {
            return Ok(NumericSummary::default());
        };
        if let Some(summary) = &fixture.summary {
            return Ok(summary.clone());
        }
        let entries = fixture
            .values
            .iter()
            .filter_map(|tag| RawEntry::classify(tag).ok());
        Ok(NumericSummary::from_entries(entries))
    }

    async fn fetch_ranged_values(
        &self,
        _query: &QueryRestrictions,
        field: &FieldName,
        _boundaries: &BucketBoundaries,
    ) -> Result<Vec<TagValue>> {
        self.record(SourceCall::RangedValues(field.to_string()));
        Ok(self
            .field(field)
            .map(|f| f.ranged_values.clone().unwrap_or_else(|| f.values.clone()))
            .unwrap_or_default())
    }

    async fn fetch_dependent_values(
        &self,
        _query: &QueryRestrictions,
        fields: &[FieldName],
    ) -> Result<Vec<RecursiveField>> {
        self.record(SourceCall::DependentValues(
            fields.iter().map(ToString::to_string).collect(),
        ));
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.data.dependent.clone())
    }

    fn source_name(&self) -> &str {
        "fixture"
    }
}
