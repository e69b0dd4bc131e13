//! Engine error taxonomy

use std::time::Duration;

use tether_sdk::{BuildError, Generation};

/// Phase of a materialization in which a builder failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// `create_type`
    Create,
    /// `rebuild_type`
    Rebuild,
    /// `update_type`
    Update,
    /// Struct instance initialization
    Initialize,
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BuildPhase::Create => "create",
            BuildPhase::Rebuild => "rebuild",
            BuildPhase::Update => "update",
            BuildPhase::Initialize => "initialize",
        })
    }
}

/// Errors reported by the engine
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    /// Metadata record cannot be interpreted
    #[error("Malformed metadata for '{type_name}': {reason}")]
    MalformedMetadata {
        /// Type whose metadata was rejected
        type_name: String,
        /// What was wrong with it
        reason: String,
    },

    /// Metadata and owning assembly belong to different load generations
    #[error(
        "Generation mismatch for '{type_name}': metadata is {metadata}, assembly is {assembly}"
    )]
    CrossGenerationMismatch {
        /// Type being materialized
        type_name: String,
        /// Generation of the metadata record
        metadata: Generation,
        /// Generation of the owning assembly
        assembly: Generation,
    },

    /// A builder phase failed
    #[error("Failed to {phase} type '{type_name}': {source}")]
    Builder {
        /// Type being materialized
        type_name: String,
        /// Phase that failed
        phase: BuildPhase,
        /// Builder error
        #[source]
        source: BuildError,
    },

    /// The owning assembly generation has been unloaded
    #[error("Assembly '{name}' ({generation}) is unloaded")]
    AssemblyUnloaded {
        /// Assembly name
        name: String,
        /// Unloaded generation
        generation: Generation,
    },

    /// No assembly with this name is registered
    #[error("Assembly not found: {0}")]
    AssemblyNotFound(String),

    /// Other holders kept an assembly context alive past the unload timeout
    #[error("Unloading assembly '{name}' timed out after {waited:?} ({holders} holders left)")]
    UnloadTimeout {
        /// Assembly name
        name: String,
        /// Remaining holders besides the loader
        holders: usize,
        /// Time spent waiting
        waited: Duration,
    },

    /// No descriptor with this type name
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Struct initialization requested for a non-struct type
    #[error("Type '{0}' is not a struct")]
    NotAStruct(String),

    /// Reflection object is missing or stale
    #[error("Type '{0}' is not materialized")]
    NotMaterialized(String),

    /// Memory block smaller than the struct's instance size
    #[error("Instance of '{type_name}' needs {expected} bytes, got {actual}")]
    InstanceSizeMismatch {
        /// Struct type
        type_name: String,
        /// Required instance size
        expected: usize,
        /// Size of the supplied block
        actual: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReflectError {
    /// Wrap a builder error raised while materializing `type_name`.
    ///
    /// Malformed metadata keeps its own variant so hosts can tell bad input
    /// apart from builder bugs.
    pub fn from_build(type_name: &str, phase: BuildPhase, err: BuildError) -> Self {
        match err {
            BuildError::MalformedMetadata { type_name, reason } => {
                ReflectError::MalformedMetadata { type_name, reason }
            }
            source => ReflectError::Builder {
                type_name: type_name.to_string(),
                phase,
                source,
            },
        }
    }
}

/// Engine result
pub type ReflectResult<T> = Result<T, ReflectError>;
