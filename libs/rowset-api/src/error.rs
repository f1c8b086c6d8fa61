use std::fmt;

/// Error kind for cursor/driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Protocol,
    Statement,
    Closed,
}

/// Error returned by all cursor and session trait methods.
///
/// Raised by the driver side; the engine never retries on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CursorError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Protocol, message: msg.into() }
    }

    pub fn statement(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Statement, message: msg.into() }
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Closed, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CursorError {}

impl From<std::io::Error> for CursorError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

/// Row-level failures: shape checks, comparison and materialization.
///
/// Coercion variants are raised by `FromValue` with an empty `column`;
/// the row converter fills it in via [`RowError::with_column`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("row has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("cannot compare {left} with {right}")]
    IncomparableTypes { left: &'static str, right: &'static str },

    #[error("column '{column}': cannot assign NULL to non-nullable {target}")]
    NullCoercion { column: String, target: &'static str },

    #[error("column '{column}': value {value} does not fit in {target}")]
    CoercionOverflow {
        column: String,
        target: &'static str,
        value: String,
    },

    #[error("column '{column}': cannot coerce {found} to {target}")]
    TypeMismatch {
        column: String,
        found: &'static str,
        target: &'static str,
    },
}

impl RowError {
    pub fn null(target: &'static str) -> Self {
        RowError::NullCoercion { column: String::new(), target }
    }

    pub fn overflow(target: &'static str, value: impl fmt::Display) -> Self {
        RowError::CoercionOverflow {
            column: String::new(),
            target,
            value: value.to_string(),
        }
    }

    pub fn type_mismatch(found: &'static str, target: &'static str) -> Self {
        RowError::TypeMismatch { column: String::new(), found, target }
    }

    /// Attach the column name to a coercion error. Other variants pass through.
    pub fn with_column(self, name: &str) -> Self {
        match self {
            RowError::NullCoercion { target, .. } => RowError::NullCoercion {
                column: name.to_string(),
                target,
            },
            RowError::CoercionOverflow { target, value, .. } => RowError::CoercionOverflow {
                column: name.to_string(),
                target,
                value,
            },
            RowError::TypeMismatch { found, target, .. } => RowError::TypeMismatch {
                column: name.to_string(),
                found,
                target,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_error_context() {
        let err = CursorError::protocol("unexpected token").with_context("result set 2");
        assert_eq!(err.kind, ErrorKind::Protocol);
        assert_eq!(err.to_string(), "Protocol: result set 2: unexpected token");
    }

    #[test]
    fn test_with_column_fills_coercion_errors_only() {
        let err = RowError::overflow("i32", 5_000_000_000i64).with_column("Foo");
        assert_eq!(
            err.to_string(),
            "column 'Foo': value 5000000000 does not fit in i32"
        );

        let shape = RowError::ShapeMismatch { expected: 2, actual: 3 };
        assert_eq!(shape.clone().with_column("Foo"), shape);
    }
}
