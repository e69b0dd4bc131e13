//! Struct instance initialization entry point
//!
//! Memory for a struct instance is allocated by the host; the layout-aware
//! [`StructInitializer`] fills it with defaults. What the engine owns is the
//! ordering: initialization only runs against a struct whose reflection
//! object is materialized and up to date, and only into a block large enough
//! for it.

use tether_sdk::{StructInitializer, TypeBuilder, TypeKind};

use crate::descriptor::{TypeDescriptor, TypeState};
use crate::error::{BuildPhase, ReflectError, ReflectResult};

/// Initialize `memory` as a default instance of the struct described by `descriptor`
pub fn initialize_struct<B, I>(
    descriptor: &TypeDescriptor<B>,
    initializer: &I,
    memory: &mut [u8],
) -> ReflectResult<()>
where
    B: TypeBuilder,
    I: StructInitializer<Field = B::Field>,
{
    let type_name = descriptor.type_name();
    if descriptor.kind() != TypeKind::Struct {
        return Err(ReflectError::NotAStruct(type_name.to_string()));
    }

    let handle = match (descriptor.state(), descriptor.live_type()) {
        (TypeState::UpToDate, Some(handle)) => handle,
        _ => return Err(ReflectError::NotMaterialized(type_name.to_string())),
    };

    let expected = initializer
        .instance_size(handle)
        .ok_or_else(|| ReflectError::NotMaterialized(type_name.to_string()))?;
    if memory.len() < expected {
        return Err(ReflectError::InstanceSizeMismatch {
            type_name: type_name.to_string(),
            expected,
            actual: memory.len(),
        });
    }

    initializer
        .initialize_struct(handle, &mut memory[..expected])
        .map_err(|e| ReflectError::from_build(type_name, BuildPhase::Initialize, e))
}
