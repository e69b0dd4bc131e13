//! Error types reported by type builders and struct initializers

/// Result type for builder operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Builder-side failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Metadata record cannot be interpreted (missing or inconsistent data)
    #[error("Malformed metadata for '{type_name}': {reason}")]
    MalformedMetadata {
        /// Type whose metadata was rejected
        type_name: String,
        /// What was wrong with it
        reason: String,
    },

    /// A referenced type is not declared by the owning assembly generation
    #[error("'{type_name}' references unknown type '{reference}'")]
    UnresolvedReference {
        /// Type being built
        type_name: String,
        /// Name that failed to resolve
        reference: String,
    },

    /// Any other builder failure
    #[error("{0}")]
    Failed(String),
}

impl BuildError {
    /// Shorthand for a malformed-metadata error
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::MalformedMetadata {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for BuildError {
    fn from(s: String) -> Self {
        BuildError::Failed(s)
    }
}

impl From<&str> for BuildError {
    fn from(s: &str) -> Self {
        BuildError::Failed(s.to_string())
    }
}
