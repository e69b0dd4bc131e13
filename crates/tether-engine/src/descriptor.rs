//! Type descriptor: lazy materialization state machine
//!
//! A [`TypeDescriptor`] pairs one type's metadata with the host reflection
//! object built from it, and remembers how stale that object is:
//!
//! | State         | Next `materialize` runs      |
//! |---------------|------------------------------|
//! | `NeedRebuild` | `create_type` + `rebuild_type` |
//! | `NeedUpdate`  | `create_type` + `update_type`  |
//! | `UpToDate`    | nothing                      |
//!
//! Staleness only moves forward to `UpToDate` through [`materialize`]; the
//! external change detector moves it back with [`promote`] or [`reload`].
//!
//! [`materialize`]: TypeDescriptor::materialize
//! [`promote`]: TypeDescriptor::promote
//! [`reload`]: TypeDescriptor::reload

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tether_sdk::{
    AssemblyContext, ChangeKind, ReflectionHost, TypeBuilder, TypeHandle, TypeKind, TypeMetadata,
};

use crate::error::{BuildPhase, ReflectError, ReflectResult};

/// Staleness of a descriptor's reflection object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeState {
    /// Structure changed (or never built); needs a full rebuild
    #[default]
    NeedRebuild,
    /// Only behavior changed; needs a lightweight update
    NeedUpdate,
    /// Reflection object matches the metadata
    UpToDate,
}

impl TypeState {
    /// State after observing `change`. A pending rebuild is never downgraded.
    pub fn promote(self, change: ChangeKind) -> TypeState {
        let pending = match self {
            TypeState::NeedRebuild => change.merge(ChangeKind::Structural),
            TypeState::NeedUpdate => change.merge(ChangeKind::Behavioral),
            TypeState::UpToDate => change,
        };
        TypeState::pending(pending)
    }

    /// State that has `change` outstanding
    pub fn pending(change: ChangeKind) -> TypeState {
        match change {
            ChangeKind::Structural => TypeState::NeedRebuild,
            ChangeKind::Behavioral => TypeState::NeedUpdate,
        }
    }

    /// Whether a materialization would call the builder
    pub fn is_stale(self) -> bool {
        self != TypeState::UpToDate
    }
}

impl fmt::Display for TypeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeState::NeedRebuild => "need-rebuild",
            TypeState::NeedUpdate => "need-update",
            TypeState::UpToDate => "up-to-date",
        })
    }
}

/// Per-type state holder driving a [`TypeBuilder`]
pub struct TypeDescriptor<B: TypeBuilder> {
    metadata: Arc<B::Metadata>,
    live_type: Option<TypeHandle<B::Field>>,
    state: TypeState,
    owning_assembly: Arc<AssemblyContext>,
    _builder: PhantomData<fn() -> B>,
}

impl<B: TypeBuilder> TypeDescriptor<B> {
    /// Create a descriptor for freshly parsed metadata (`NeedRebuild`, no live type)
    pub fn new(metadata: Arc<B::Metadata>, owning_assembly: Arc<AssemblyContext>) -> Self {
        Self {
            metadata,
            live_type: None,
            state: TypeState::NeedRebuild,
            owning_assembly,
            _builder: PhantomData,
        }
    }

    /// Create a descriptor from a JSON metadata value
    pub fn from_json(
        value: serde_json::Value,
        owning_assembly: Arc<AssemblyContext>,
    ) -> ReflectResult<Self>
    where
        B::Metadata: DeserializeOwned,
    {
        let type_name = value
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("<unnamed>")
            .to_string();
        let metadata: B::Metadata = serde_json::from_value(value).map_err(|e| {
            ReflectError::MalformedMetadata {
                type_name,
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(Arc::new(metadata), owning_assembly))
    }

    /// Metadata record
    pub fn metadata(&self) -> &Arc<B::Metadata> {
        &self.metadata
    }

    /// Owning assembly context
    pub fn owning_assembly(&self) -> &Arc<AssemblyContext> {
        &self.owning_assembly
    }

    /// Current staleness
    pub fn state(&self) -> TypeState {
        self.state
    }

    /// Handle to the last materialized reflection object
    pub fn live_type(&self) -> Option<TypeHandle<B::Field>> {
        self.live_type
    }

    /// Type name from the metadata
    pub fn type_name(&self) -> &str {
        self.metadata.type_name()
    }

    /// Type kind from the metadata
    pub fn kind(&self) -> TypeKind {
        self.metadata.kind()
    }

    /// Fast-path check: the live type if nothing needs building
    pub fn current(&self, host: &B::Host) -> Option<TypeHandle<B::Field>> {
        match (self.state, self.live_type) {
            (TypeState::UpToDate, Some(handle)) if host.is_live(handle.raw()) => Some(handle),
            _ => None,
        }
    }

    /// Bring the reflection object in sync with the metadata and return it.
    ///
    /// Runs exactly one of {nothing, create + rebuild, create + update},
    /// chosen by the state at entry. On failure the descriptor is left as it
    /// was, so the next call retries the same pending work.
    pub fn materialize(&mut self, host: &mut B::Host) -> ReflectResult<TypeHandle<B::Field>> {
        if let Some(handle) = self.current(host) {
            tracing::trace!(type_name = self.type_name(), "reflection object up to date");
            return Ok(handle);
        }

        // Up to date but not current: the host tore the object down.
        let entry_state = match (self.state, self.live_type) {
            (TypeState::UpToDate, handle) => {
                tracing::warn!(
                    type_name = self.type_name(),
                    ?handle,
                    "reflection object was torn down by the host, rebuilding"
                );
                TypeState::NeedRebuild
            }
            (state, _) => state,
        };

        self.check_generation()?;
        if !self.owning_assembly.is_loaded() {
            return Err(ReflectError::AssemblyUnloaded {
                name: self.owning_assembly.name().to_string(),
                generation: self.owning_assembly.generation(),
            });
        }

        tracing::debug!(
            type_name = self.type_name(),
            kind = %self.kind(),
            state = %entry_state,
            "materializing type"
        );

        let mut builder = B::new(self.metadata.clone(), self.owning_assembly.clone());
        let handle = builder
            .create_type(host)
            .map_err(|e| ReflectError::from_build(self.type_name(), BuildPhase::Create, e))?;

        match entry_state {
            TypeState::NeedUpdate => builder
                .update_type(host)
                .map_err(|e| ReflectError::from_build(self.type_name(), BuildPhase::Update, e))?,
            TypeState::NeedRebuild | TypeState::UpToDate => builder
                .rebuild_type(host)
                .map_err(|e| ReflectError::from_build(self.type_name(), BuildPhase::Rebuild, e))?,
        }

        self.live_type = Some(handle);
        self.state = TypeState::UpToDate;
        Ok(handle)
    }

    /// Mark the reflection object stale after an external change.
    ///
    /// A structural change always wins over a behavioral one.
    pub fn promote(&mut self, change: ChangeKind) -> TypeState {
        let promoted = self.state.promote(change);
        if promoted != self.state {
            tracing::debug!(
                type_name = self.type_name(),
                from = %self.state,
                to = %promoted,
                "type promoted"
            );
        }
        self.state = promoted;
        promoted
    }

    /// Rebase the descriptor onto metadata from a newer assembly generation.
    ///
    /// The change between the old and new metadata is classified and the
    /// state promoted accordingly. The live type is kept, so a behavior-only
    /// reload preserves the reflection object's identity. Metadata that does
    /// not belong to `assembly` is rejected and the descriptor left untouched.
    pub fn reload(
        &mut self,
        metadata: Arc<B::Metadata>,
        assembly: Arc<AssemblyContext>,
    ) -> ReflectResult<Option<ChangeKind>> {
        if metadata.generation() != assembly.generation() {
            return Err(ReflectError::CrossGenerationMismatch {
                type_name: metadata.type_name().to_string(),
                metadata: metadata.generation(),
                assembly: assembly.generation(),
            });
        }

        let change = self.metadata.classify_change(&metadata);
        self.metadata = metadata;
        self.owning_assembly = assembly;
        if let Some(change) = change {
            self.promote(change);
        }
        Ok(change)
    }

    /// The host tore down the reflection object; forget it and rebuild next time.
    pub fn invalidate(&mut self) {
        self.live_type = None;
        self.state = TypeState::NeedRebuild;
    }

    fn check_generation(&self) -> ReflectResult<()> {
        let metadata = self.metadata.generation();
        let assembly = self.owning_assembly.generation();
        if metadata != assembly {
            return Err(ReflectError::CrossGenerationMismatch {
                type_name: self.type_name().to_string(),
                metadata,
                assembly,
            });
        }
        Ok(())
    }
}

impl<B: TypeBuilder> fmt::Debug for TypeDescriptor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name())
            .field("state", &self.state)
            .field("live_type", &self.live_type)
            .field("assembly", &self.owning_assembly.name())
            .field("generation", &self.owning_assembly.generation())
            .finish()
    }
}
