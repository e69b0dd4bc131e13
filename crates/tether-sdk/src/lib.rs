//! Tether SDK - contract types for reflected-type builders
//!
//! This crate holds what a type builder, a host reflection system, or a
//! struct initializer needs to plug into `tether-engine` without depending on
//! the engine itself:
//!
//! - [`TypeMetadata`]: questions the engine asks of a metadata record
//! - [`AssemblyContext`]: identity of one assembly load generation
//! - [`TypeHandle`]: generational, non-owning handle to a reflection object
//! - [`TypeBuilder`], [`ReflectionHost`], [`StructInitializer`]: collaborator traits
//!
//! # Example
//!
//! ```ignore
//! use tether_sdk::{BuildResult, TypeBuilder, TypeHandle};
//!
//! impl TypeBuilder for StructBuilder {
//!     type Metadata = StructRecord;
//!     type Field = HostStruct;
//!     type Host = HostRegistry;
//!
//!     fn new(metadata: Arc<StructRecord>, assembly: Arc<AssemblyContext>) -> Self {
//!         Self { metadata, assembly, handle: None }
//!     }
//!
//!     fn create_type(&mut self, host: &mut HostRegistry) -> BuildResult<TypeHandle<HostStruct>> {
//!         // find or insert placeholder
//!     }
//!     // rebuild_type, update_type
//! }
//! ```

#![warn(missing_docs)]

mod assembly;
mod builder;
mod error;
mod handle;
mod metadata;

pub use assembly::{AssemblyContext, AssemblyId, Generation};
pub use builder::{ReflectionHost, StructInitializer, TypeBuilder};
pub use error::{BuildError, BuildResult};
pub use handle::{RawHandle, TypeHandle};
pub use metadata::{ChangeKind, TypeKind, TypeMetadata};
