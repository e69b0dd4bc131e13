//! Builder and host contracts
//!
//! A [`TypeBuilder`] knows how to lay out one kind of type in the host's
//! reflection format. The engine never inspects reflection objects itself; it
//! only decides which of the three builder phases to run.

use std::sync::Arc;

use crate::assembly::AssemblyContext;
use crate::error::BuildResult;
use crate::handle::{RawHandle, TypeHandle};
use crate::metadata::TypeMetadata;

/// The host reflection system as seen by the engine
pub trait ReflectionHost {
    /// Whether `handle` still refers to a live reflection object
    fn is_live(&self, handle: RawHandle) -> bool;
}

/// Per-kind builder, bound to one metadata record and its owning assembly.
///
/// Builders may be stateless per call; the engine constructs a fresh one for
/// every materialization that is not a no-op.
pub trait TypeBuilder: Sized {
    /// Metadata record kind this builder reads
    type Metadata: TypeMetadata;
    /// Reflection object kind this builder produces
    type Field;
    /// Host reflection system the builder writes into
    type Host: ReflectionHost;

    /// Bind a builder to `metadata` and the assembly it was loaded from
    fn new(metadata: Arc<Self::Metadata>, assembly: Arc<AssemblyContext>) -> Self;

    /// Return the canonical reflection object for this type, creating a
    /// placeholder only if none exists. Must be safe to call repeatedly.
    fn create_type(&mut self, host: &mut Self::Host) -> BuildResult<TypeHandle<Self::Field>>;

    /// Full structural (re)layout of the object returned by [`create_type`].
    /// Idempotent for identical metadata.
    ///
    /// [`create_type`]: TypeBuilder::create_type
    fn rebuild_type(&mut self, host: &mut Self::Host) -> BuildResult<()>;

    /// Non-structural refresh. Must never change field layout or instance size.
    fn update_type(&mut self, host: &mut Self::Host) -> BuildResult<()>;
}

/// Initializes raw struct instance memory from a materialized reflection object
pub trait StructInitializer {
    /// Reflection object kind understood by this initializer
    type Field;

    /// Instance size of the struct behind `handle`, if known
    fn instance_size(&self, handle: TypeHandle<Self::Field>) -> Option<usize>;

    /// Set every field in `memory` to its default value, recursing into nested
    /// struct fields. `memory` is at least [`instance_size`] bytes.
    ///
    /// [`instance_size`]: StructInitializer::instance_size
    fn initialize_struct(&self, handle: TypeHandle<Self::Field>, memory: &mut [u8]) -> BuildResult<()>;
}
