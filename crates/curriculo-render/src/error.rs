//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Render error types
#[derive(Error, Debug)]
pub enum RenderError {
    /// Page did not reach network idle in time
    #[error("Page did not settle within {0:?}")]
    Timeout(Duration),

    /// Browser launch, navigation or capture failed
    #[error("Render failed: {0}")]
    Failure(String),
}

impl RenderError {
    pub(crate) fn failure(context: &str, err: impl std::fmt::Display) -> Self {
        RenderError::Failure(format!("{context}: {err}"))
    }

    /// Both variants surface to callers as the same generic failure.
    pub fn user_message(&self) -> &str {
        "Erro ao gerar PDF"
    }
}
