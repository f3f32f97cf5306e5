use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("form has no field named '{0}'")]
    UnknownField(String),

    #[error("form has no page {0}")]
    UnknownPage(u32),

    #[error("invalid field kind '{0}'")]
    InvalidKind(String),

    #[error("form configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The submit handler returned an error. Values are left untouched.
    #[error("submission rejected: {0:#}")]
    SubmitRejected(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("error reading configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("error parsing configuration: {0}")]
    Parse(String),

    #[error("unsupported configuration file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("form '{0}' not found in module '{1}'")]
    FormNotFound(String, String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
