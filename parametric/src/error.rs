use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed value '{value}': {reason}")]
    MalformedValue { value: String, reason: String },

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid bucketing for field '{field}': {reason}")]
    InvalidBucketing { field: String, reason: String },

    #[error("Field '{field}' failed: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Scope an error to the field it was raised for.
    ///
    /// Already-scoped errors are returned unchanged so a field is never
    /// wrapped twice.
    pub fn for_field(self, field: impl Into<String>) -> Self {
        match self {
            scoped @ Error::Field { .. } => scoped,
            other => Error::Field {
                field: field.into(),
                source: Box::new(other),
            },
        }
    }

    /// Stable label used for metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::MalformedValue { .. } => "malformed_value",
            Error::SourceUnavailable(_) => "source_unavailable",
            Error::InvalidBucketing { .. } => "invalid_bucketing",
            Error::Field { source, .. } => source.error_type(),
            Error::Io(_) => "io",
            Error::TomlDe(_) | Error::TomlSer(_) => "toml",
            Error::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
