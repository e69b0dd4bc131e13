//! Shared fixtures: a JSON metadata record, a host that lays types out as
//! packed byte structs, one builder for every kind, and a recursive struct
//! initializer.

#![allow(dead_code)]

use std::sync::Arc;

use serde::Deserialize;
use tether_engine::{
    AssemblyContext, BuildError, BuildResult, ChangeKind, Generation, RawHandle, ReflectionHost,
    ReflectionRegistry, StructInitializer, TypeBuilder, TypeHandle, TypeKind, TypeMetadata,
};

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Class,
    Struct,
    Enum,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int32,
    Float64,
    Bool,
    Struct(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub default: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub native: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRecord {
    pub name: String,
    pub kind: RecordKind,
    pub generation: u32,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
}

impl TypeRecord {
    pub fn from_json(value: serde_json::Value) -> Arc<TypeRecord> {
        Arc::new(serde_json::from_value(value).unwrap())
    }
}

impl TypeMetadata for TypeRecord {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        match self.kind {
            RecordKind::Class => TypeKind::Class,
            RecordKind::Struct => TypeKind::Struct,
            RecordKind::Enum => TypeKind::Enum,
            RecordKind::Interface => TypeKind::Interface,
        }
    }

    fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    fn classify_change(&self, newer: &Self) -> Option<ChangeKind> {
        let same_signatures = self.functions.len() == newer.functions.len()
            && self
                .functions
                .iter()
                .zip(&newer.functions)
                .all(|(a, b)| a.name == b.name);

        if self.kind != newer.kind || self.fields != newer.fields || !same_signatures {
            Some(ChangeKind::Structural)
        } else if self.functions != newer.functions {
            Some(ChangeKind::Behavioral)
        } else {
            None
        }
    }
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HostField {
    pub name: String,
    pub ty: FieldType,
    pub offset: usize,
    pub default: i32,
}

#[derive(Debug)]
pub struct HostType {
    pub kind: TypeKind,
    pub fields: Vec<HostField>,
    pub size: usize,
    pub functions: Vec<(String, u64)>,
    /// Assembly generation the layout was last built or updated for; 0 for a placeholder
    pub generation: u32,
    pub rebuilds: u32,
    pub updates: u32,
}

#[derive(Default)]
pub struct Host {
    pub registry: ReflectionRegistry<HostType>,
    pub log: Vec<String>,
    /// `(phase, type name)` that should fail
    pub fail: Option<(&'static str, String)>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(&mut self, phase: &'static str, type_name: &str) -> BuildResult<()> {
        self.log.push(format!("{} {}", phase, type_name));
        match &self.fail {
            Some((p, t)) if *p == phase && t == type_name => {
                Err(BuildError::Failed(format!("{} of {} refused", phase, type_name)))
            }
            _ => Ok(()),
        }
    }

    pub fn calls(&self, phase: &str) -> usize {
        self.log.iter().filter(|l| l.starts_with(phase)).count()
    }

    pub fn object(&self, handle: TypeHandle<HostType>) -> &HostType {
        self.registry.get(handle).unwrap()
    }

    /// Size of a field, or `None` while a nested struct has no layout for `generation`
    fn field_size(&self, ty: &FieldType, generation: u32) -> Option<usize> {
        match ty {
            FieldType::Int32 => Some(4),
            FieldType::Float64 => Some(8),
            FieldType::Bool => Some(1),
            FieldType::Struct(name) => self
                .registry
                .find(name)
                .and_then(|h| self.registry.get(h))
                .filter(|t| t.kind == TypeKind::Struct && t.generation == generation)
                .map(|t| t.size),
        }
    }

    fn init_fields(&self, object: &HostType, memory: &mut [u8]) -> BuildResult<()> {
        for field in &object.fields {
            match &field.ty {
                FieldType::Int32 => {
                    memory[field.offset..field.offset + 4].copy_from_slice(&field.default.to_le_bytes())
                }
                FieldType::Float64 => memory[field.offset..field.offset + 8].fill(0),
                FieldType::Bool => memory[field.offset] = 0,
                FieldType::Struct(name) => {
                    let nested = self
                        .registry
                        .find(name)
                        .and_then(|h| self.registry.get(h))
                        .ok_or_else(|| BuildError::Failed(format!("nested struct {} missing", name)))?;
                    self.init_fields(nested, &mut memory[field.offset..field.offset + nested.size])?;
                }
            }
        }
        Ok(())
    }
}

impl ReflectionHost for Host {
    fn is_live(&self, handle: RawHandle) -> bool {
        self.registry.is_live(handle)
    }
}

impl StructInitializer for Host {
    type Field = HostType;

    fn instance_size(&self, handle: TypeHandle<HostType>) -> Option<usize> {
        self.registry.get(handle).map(|t| t.size)
    }

    fn initialize_struct(&self, handle: TypeHandle<HostType>, memory: &mut [u8]) -> BuildResult<()> {
        let object = self
            .registry
            .get(handle)
            .ok_or_else(|| BuildError::Failed("struct vanished".to_string()))?;
        self.init_fields(object, memory)
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct RecordBuilder {
    metadata: Arc<TypeRecord>,
    assembly: Arc<AssemblyContext>,
    handle: Option<TypeHandle<HostType>>,
}

impl RecordBuilder {
    fn handle(&self) -> BuildResult<TypeHandle<HostType>> {
        self.handle.ok_or_else(|| BuildError::Failed("type not created".to_string()))
    }
}

impl TypeBuilder for RecordBuilder {
    type Metadata = TypeRecord;
    type Field = HostType;
    type Host = Host;

    fn new(metadata: Arc<TypeRecord>, assembly: Arc<AssemblyContext>) -> Self {
        Self {
            metadata,
            assembly,
            handle: None,
        }
    }

    fn create_type(&mut self, host: &mut Host) -> BuildResult<TypeHandle<HostType>> {
        host.step("create", &self.metadata.name)?;
        let handle = match host.registry.find(&self.metadata.name) {
            Some(handle) => handle,
            None => host.registry.insert(
                self.metadata.name.clone(),
                self.assembly.name(),
                HostType {
                    kind: self.metadata.kind(),
                    fields: Vec::new(),
                    size: 0,
                    functions: Vec::new(),
                    generation: 0,
                    rebuilds: 0,
                    updates: 0,
                },
            ),
        };
        self.handle = Some(handle);
        Ok(handle)
    }

    fn rebuild_type(&mut self, host: &mut Host) -> BuildResult<()> {
        host.step("rebuild", &self.metadata.name)?;
        let name = &self.metadata.name;
        let generation = self.assembly.generation().0;

        let mut fields = Vec::with_capacity(self.metadata.fields.len());
        let mut offset = 0;
        for field in &self.metadata.fields {
            if field.name.is_empty() {
                return Err(BuildError::malformed(name.as_str(), "field without a name"));
            }
            if let FieldType::Struct(reference) = &field.ty {
                if !self.assembly.declares(reference) {
                    return Err(BuildError::UnresolvedReference {
                        type_name: name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
            let size = host.field_size(&field.ty, generation).ok_or_else(|| {
                BuildError::Failed(format!("{} has no layout yet", field.name))
            })?;
            fields.push(HostField {
                name: field.name.clone(),
                ty: field.ty.clone(),
                offset,
                default: field.default,
            });
            offset += size;
        }

        let handle = self.handle()?;
        let object = host
            .registry
            .get_mut(handle)
            .ok_or_else(|| BuildError::Failed("type vanished".to_string()))?;
        object.kind = self.metadata.kind();
        object.fields = fields;
        object.size = offset;
        object.functions = self
            .metadata
            .functions
            .iter()
            .map(|f| (f.name.clone(), f.native))
            .collect();
        object.generation = generation;
        object.rebuilds += 1;
        Ok(())
    }

    fn update_type(&mut self, host: &mut Host) -> BuildResult<()> {
        host.step("update", &self.metadata.name)?;
        let handle = self.handle()?;
        let object = host
            .registry
            .get_mut(handle)
            .ok_or_else(|| BuildError::Failed("type vanished".to_string()))?;
        for (slot, function) in object.functions.iter_mut().zip(&self.metadata.functions) {
            slot.1 = function.native;
        }
        object.generation = self.assembly.generation().0;
        object.updates += 1;
        Ok(())
    }
}

// ============================================================================
// Records
// ============================================================================

pub fn foo(generation: u32, native: u64) -> Arc<TypeRecord> {
    TypeRecord::from_json(serde_json::json!({
        "name": "Foo",
        "kind": "struct",
        "generation": generation,
        "fields": [
            { "name": "health", "type": "int32", "default": 100 },
            { "name": "speed", "type": "float64" }
        ],
        "functions": [ { "name": "Tick", "native": native } ]
    }))
}

pub fn assembly(generation: u32) -> Arc<AssemblyContext> {
    Arc::new(AssemblyContext::new(
        "Game",
        Generation(generation),
        ["Foo", "Vec2", "Actor", "Transform"],
    ))
}
