use thiserror::Error;

/// Errors raised while building configuration or parsing domain values.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid email status: {0}")]
    InvalidStatus(String),
}
