//! Error types for dcop-yaml.
//!
//! Taxonomy:
//! - Input falsified: clauses, literals or keys that do not match the grammar
//! - Environment failures: unreadable sources, unwritable destinations
//! - Output failures: documents that cannot be rendered as YAML

use crate::literal::LiteralError;
use thiserror::Error;

/// Top-level error type for dcop-yaml.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ═══════════════════════════════════════════════════════════════════
    // INPUT — the source text does not follow the expected grammar
    // ═══════════════════════════════════════════════════════════════════

    #[error("Malformed clause `{clause}`: {reason}")]
    MalformedClause { clause: String, reason: String },

    #[error("Invalid literal in `{clause}`: {source}")]
    InvalidLiteral {
        clause: String,
        #[source]
        source: LiteralError,
    },

    #[error("Missing required key `{0}`")]
    MissingKey(String),

    // ═══════════════════════════════════════════════════════════════════
    // ENVIRONMENT — filesystem
    // ═══════════════════════════════════════════════════════════════════

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT — rendering documents
    // ═══════════════════════════════════════════════════════════════════

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed-clause error, keeping the trimmed clause text.
    pub fn malformed(clause: &str, reason: impl Into<String>) -> Self {
        Self::MalformedClause {
            clause: clause.trim().to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-literal error, keeping the trimmed clause text.
    pub fn literal(clause: &str, source: LiteralError) -> Self {
        Self::InvalidLiteral {
            clause: clause.trim().to_string(),
            source,
        }
    }

    /// Check if this error was caused by the input text rather than the environment.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedClause { .. } | Self::InvalidLiteral { .. } | Self::MissingKey(_)
        )
    }

    /// The offending clause or line, if the error carries one.
    pub fn clause(&self) -> Option<&str> {
        match self {
            Self::MalformedClause { clause, .. } | Self::InvalidLiteral { clause, .. } => {
                Some(clause)
            }
            _ => None,
        }
    }
}

/// Result type alias for dcop-yaml.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_literal;

    #[test]
    fn test_parse_errors_carry_clause() {
        let err = ConvertError::malformed("  decision_x1 (0, 4)\n", "missing `=`");
        assert!(err.is_parse_error());
        assert_eq!(err.clause(), Some("decision_x1 (0, 4)"));
        assert!(err.to_string().contains("decision_x1 (0, 4)"));
    }

    #[test]
    fn test_literal_error_is_parse_error() {
        let source = parse_literal("(0, x)").unwrap_err();
        let err = ConvertError::literal("decision_x1 = (0, x)", source);
        assert!(err.is_parse_error());
        assert_eq!(err.clause(), Some("decision_x1 = (0, x)"));
    }

    #[test]
    fn test_io_error_is_not_parse_error() {
        let err = ConvertError::io(
            "reading input",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!err.is_parse_error());
        assert!(err.clause().is_none());
        assert_eq!(err.to_string(), "IO error: reading input");
    }

    #[test]
    fn test_missing_key_message() {
        let err = ConvertError::MissingKey("cons".to_string());
        assert_eq!(err.to_string(), "Missing required key `cons`");
    }
}
