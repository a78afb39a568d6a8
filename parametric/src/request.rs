use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a parametric field, optionally path-qualified
/// (`DOCUMENT/CATEGORY`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing path segment, used as the field id in results
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Human-readable form of the id: `PRICE_RANGE` -> `Price Range`
    pub fn display_name(&self) -> String {
        self.id()
            .split(['_', ' '])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Field categories known to the field-metadata source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTypeParam {
    Parametric,
    Numeric,
    Date,
    Index,
    Reference,
}

/// Ordering of categorical values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortParam {
    /// Highest count first
    #[default]
    DocumentCount,
    Alphabetical,
    ReverseAlphabetical,
    NumberIncreasing,
    NumberDecreasing,
    /// Keep the source's order
    Off,
}

impl SortParam {
    pub fn parse_sort(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "document_count" | "documentcount" => Some(SortParam::DocumentCount),
            "alphabetical" => Some(SortParam::Alphabetical),
            "reverse_alphabetical" => Some(SortParam::ReverseAlphabetical),
            "number_increasing" => Some(SortParam::NumberIncreasing),
            "number_decreasing" => Some(SortParam::NumberDecreasing),
            "off" => Some(SortParam::Off),
            _ => None,
        }
    }
}

/// Restrictions forwarded to the value source with every fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRestrictions {
    #[serde(default = "default_query_text")]
    pub query_text: String,
    #[serde(default)]
    pub field_text: String,
    #[serde(default)]
    pub databases: Vec<String>,
    /// Lower document date bound, passed through untouched
    #[serde(default)]
    pub min_date: Option<String>,
    #[serde(default)]
    pub max_date: Option<String>,
    /// Passed through to the source untouched
    #[serde(default)]
    pub modified: bool,
}

fn default_query_text() -> String {
    "*".to_string()
}

impl Default for QueryRestrictions {
    fn default() -> Self {
        Self {
            query_text: default_query_text(),
            field_text: String::new(),
            databases: Vec::new(),
            min_date: None,
            max_date: None,
            modified: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametricRequest {
    /// Empty means every field the metadata source reports as parametric
    #[serde(default)]
    pub field_names: Vec<FieldName>,
    #[serde(default)]
    pub query_restrictions: QueryRestrictions,
    /// Per-field cap on categorical values; falls back to the configured cap
    #[serde(default)]
    pub max_values: Option<u32>,
    /// Falls back to the configured sort
    #[serde(default)]
    pub sort: Option<SortParam>,
}

impl ParametricRequest {
    pub fn new<I, F>(field_names: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldName>,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_query_restrictions(mut self, query_restrictions: QueryRestrictions) -> Self {
        self.query_restrictions = query_restrictions;
        self
    }

    pub fn with_max_values(mut self, max_values: u32) -> Self {
        self.max_values = Some(max_values);
        self
    }

    pub fn with_sort(mut self, sort: SortParam) -> Self {
        self.sort = Some(sort);
        self
    }
}
