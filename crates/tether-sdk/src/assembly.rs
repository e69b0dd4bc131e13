//! Owning assembly context
//!
//! One [`AssemblyContext`] exists per load generation of an external assembly.
//! It is shared (`Arc`) by every type descriptor parsed from that load and by
//! any builder currently working on one of those types, so the context lives
//! as long as its longest holder.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Process-unique identifier of one assembly context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyId(u64);

impl AssemblyId {
    /// Allocate a new unique assembly ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        AssemblyId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for AssemblyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Load generation of an assembly. Reloading an assembly produces the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u32);

impl Generation {
    /// The generation that follows this one
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Identity of one loaded assembly generation.
///
/// Read-only for everything except the loader, which flips [`is_loaded`]
/// off when the generation is unloaded.
///
/// [`is_loaded`]: AssemblyContext::is_loaded
#[derive(Debug)]
pub struct AssemblyContext {
    id: AssemblyId,
    name: String,
    generation: Generation,
    declared_types: HashSet<String>,
    loaded: AtomicBool,
}

impl AssemblyContext {
    /// Create a loaded context for `name` at `generation`
    pub fn new<I, S>(name: impl Into<String>, generation: Generation, declared_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: AssemblyId::new(),
            name: name.into(),
            generation,
            declared_types: declared_types.into_iter().map(Into::into).collect(),
            loaded: AtomicBool::new(true),
        }
    }

    /// Unique ID of this context
    pub fn id(&self) -> AssemblyId {
        self.id
    }

    /// Logical assembly name (stable across reloads)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load generation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether this generation declares a type called `type_name`.
    ///
    /// Builders use this to resolve cross-type references within one load.
    pub fn declares(&self, type_name: &str) -> bool {
        self.declared_types.contains(type_name)
    }

    /// Number of types declared by this generation
    pub fn declared_type_count(&self) -> usize {
        self.declared_types.len()
    }

    /// Whether this generation is still loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Mark the generation unloaded. Only the assembly loader calls this.
    pub fn mark_unloaded(&self) {
        self.loaded.store(false, Ordering::Release);
    }
}
