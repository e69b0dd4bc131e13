//! Tether Engine
//!
//! Materializes types declared in an external, hot-reloadable assembly as
//! native reflection objects of a host, through a pluggable per-kind
//! [`TypeBuilder`](tether_sdk::TypeBuilder):
//! - **Descriptor**: per-type staleness state machine (`descriptor` module)
//! - **Shared descriptor**: per-descriptor serialization for threaded hosts (`shared` module)
//! - **Registry**: host-side owner of reflection objects (`registry` module)
//! - **Loader**: assembly load generations and unload waiting (`loader` module)
//! - **Type table**: one assembly's descriptors and hot reload (`table` module)
//! - **Initializer**: struct instance initialization entry point (`initializer` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_engine::{AssemblyLoader, ReflectionRegistry, TypeTable};
//!
//! let mut loader = AssemblyLoader::new();
//! let mut host = ReflectionRegistry::new();
//!
//! // Load and materialize
//! let assembly = loader.load("Game", ["Foo"]);
//! let mut table: TypeTable<StructBuilder> = TypeTable::new(assembly);
//! table.insert(foo_metadata)?;
//! let foo = table.materialize("Foo", &mut host)?;
//!
//! // Hot reload: diff, promote, and rebuild or update lazily
//! let next = loader.load("Game", ["Foo"]);
//! let summary = table.apply_reload(next, new_records)?;
//! let foo = table.materialize("Foo", &mut host)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod initializer;
pub mod loader;
pub mod registry;
pub mod shared;
pub mod table;

pub use config::LoaderOptions;
pub use descriptor::{TypeDescriptor, TypeState};
pub use error::{BuildPhase, ReflectError, ReflectResult};
pub use initializer::initialize_struct;
pub use loader::AssemblyLoader;
pub use registry::ReflectionRegistry;
pub use shared::SharedDescriptor;
pub use table::{MaterializeReport, ReloadSummary, TypeTable};

pub use tether_sdk::{
    AssemblyContext, AssemblyId, BuildError, BuildResult, ChangeKind, Generation, RawHandle,
    ReflectionHost, StructInitializer, TypeBuilder, TypeHandle, TypeKind, TypeMetadata,
};
