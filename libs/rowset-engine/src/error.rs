use rowset_api::error::{CursorError, RowError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("row error: {0}")]
    Row(#[from] RowError),

    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// Two result sets being compared differ in shape. No row is inspected.
    #[error("structural mismatch: different number of {what} ({left} vs {right})")]
    StructuralMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Cursor` variant, context is added to the inner `CursorError`.
    /// For `Config`, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Cursor(e) => EngineError::Cursor(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
