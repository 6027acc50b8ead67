use thiserror::Error;

/// Errors surfaced by dataset loading, theming, configuration and export.
///
/// Rendering itself has no error path: entities or relationships without a
/// coordinate are skipped, not reported here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Theme error: {0}")]
    Theme(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duplicate id in registry: {0}")]
    DuplicateId(String),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;
