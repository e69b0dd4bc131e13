//! Per-assembly type table and hot reload
//!
//! A [`TypeTable`] holds the descriptors of every type loaded from one
//! assembly. On hot reload the loader produces a new generation with fresh
//! metadata; [`TypeTable::apply_reload`] is the explicit staleness trigger
//! that diffs the old and new records and promotes each descriptor, so the
//! next materialization rebuilds, updates, or does nothing as appropriate.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tether_sdk::{AssemblyContext, ChangeKind, TypeBuilder, TypeHandle, TypeMetadata};

use crate::descriptor::TypeDescriptor;
use crate::error::{ReflectError, ReflectResult};

/// Outcome of [`TypeTable::materialize_all`]
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Types that are now up to date
    pub materialized: Vec<String>,
    /// Types that failed, with the reason
    pub failed: Vec<(String, ReflectError)>,
}

impl MaterializeReport {
    /// Whether every type materialized
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`TypeTable::apply_reload`]
#[derive(Debug)]
pub struct ReloadSummary<F> {
    /// Types whose layout changed
    pub structural: Vec<String>,
    /// Types whose behavior changed
    pub behavioral: Vec<String>,
    /// Types identical to the previous generation
    pub unchanged: Vec<String>,
    /// Types new in this generation
    pub added: Vec<String>,
    /// Types gone from this generation, with the reflection object they left behind
    pub removed: Vec<(String, Option<TypeHandle<F>>)>,
}

impl<F> Default for ReloadSummary<F> {
    fn default() -> Self {
        Self {
            structural: Vec::new(),
            behavioral: Vec::new(),
            unchanged: Vec::new(),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Descriptors of one assembly, keyed by type name
pub struct TypeTable<B: TypeBuilder> {
    assembly: Arc<AssemblyContext>,
    types: FxHashMap<String, TypeDescriptor<B>>,
}

impl<B: TypeBuilder> TypeTable<B> {
    /// Create an empty table for `assembly`
    pub fn new(assembly: Arc<AssemblyContext>) -> Self {
        Self {
            assembly,
            types: FxHashMap::default(),
        }
    }

    /// Owning assembly of every descriptor in the table
    pub fn assembly(&self) -> &Arc<AssemblyContext> {
        &self.assembly
    }

    /// Add a descriptor for freshly parsed metadata, replacing any existing one
    pub fn insert(&mut self, metadata: Arc<B::Metadata>) -> ReflectResult<()> {
        self.check_generation(&metadata)?;
        let name = metadata.type_name().to_string();
        self.types
            .insert(name, TypeDescriptor::new(metadata, self.assembly.clone()));
        Ok(())
    }

    /// Get a descriptor
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor<B>> {
        self.types.get(name)
    }

    /// Get a mutable descriptor
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDescriptor<B>> {
        self.types.get_mut(name)
    }

    /// Check if a type is in the table
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Materialize one type by name
    pub fn materialize(
        &mut self,
        name: &str,
        host: &mut B::Host,
    ) -> ReflectResult<TypeHandle<B::Field>> {
        self.types
            .get_mut(name)
            .ok_or_else(|| ReflectError::TypeNotFound(name.to_string()))?
            .materialize(host)
    }

    /// Materialize every type, in name order.
    ///
    /// Failures are collected; the remaining types are still attempted.
    pub fn materialize_all(&mut self, host: &mut B::Host) -> MaterializeReport {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort_unstable();

        let mut report = MaterializeReport::default();
        for name in names {
            let Some(descriptor) = self.types.get_mut(&name) else {
                continue;
            };
            match descriptor.materialize(host) {
                Ok(_) => report.materialized.push(name),
                Err(err) => {
                    tracing::warn!(type_name = %name, error = %err, "failed to materialize type");
                    report.failed.push((name, err));
                }
            }
        }
        report
    }

    /// Rebase the table onto a new assembly generation.
    ///
    /// Every record must belong to `assembly`; otherwise nothing changes.
    /// Existing descriptors keep their live type and are promoted by the
    /// change between their old and new metadata.
    pub fn apply_reload(
        &mut self,
        assembly: Arc<AssemblyContext>,
        records: impl IntoIterator<Item = Arc<B::Metadata>>,
    ) -> ReflectResult<ReloadSummary<B::Field>> {
        let records: Vec<Arc<B::Metadata>> = records.into_iter().collect();
        for record in &records {
            if record.generation() != assembly.generation() {
                return Err(ReflectError::CrossGenerationMismatch {
                    type_name: record.type_name().to_string(),
                    metadata: record.generation(),
                    assembly: assembly.generation(),
                });
            }
        }

        let mut summary = ReloadSummary::default();
        let mut seen = FxHashSet::default();
        for record in records {
            let name = record.type_name().to_string();
            seen.insert(name.clone());
            match self.types.get_mut(&name) {
                Some(descriptor) => match descriptor.reload(record, assembly.clone())? {
                    Some(ChangeKind::Structural) => summary.structural.push(name),
                    Some(ChangeKind::Behavioral) => summary.behavioral.push(name),
                    None => summary.unchanged.push(name),
                },
                None => {
                    self.types
                        .insert(name.clone(), TypeDescriptor::new(record, assembly.clone()));
                    summary.added.push(name);
                }
            }
        }

        let mut gone: Vec<String> = self
            .types
            .keys()
            .filter(|name| !seen.contains(*name))
            .cloned()
            .collect();
        gone.sort_unstable();
        for name in gone {
            if let Some(descriptor) = self.types.remove(&name) {
                summary.removed.push((name, descriptor.live_type()));
            }
        }

        tracing::info!(
            assembly = assembly.name(),
            generation = %assembly.generation(),
            structural = summary.structural.len(),
            behavioral = summary.behavioral.len(),
            unchanged = summary.unchanged.len(),
            added = summary.added.len(),
            removed = summary.removed.len(),
            "applied assembly reload"
        );
        self.assembly = assembly;
        Ok(summary)
    }

    /// Iterate over descriptors
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor<B>)> {
        self.types.iter().map(|(name, d)| (name.as_str(), d))
    }

    fn check_generation(&self, metadata: &B::Metadata) -> ReflectResult<()> {
        if metadata.generation() != self.assembly.generation() {
            return Err(ReflectError::CrossGenerationMismatch {
                type_name: metadata.type_name().to_string(),
                metadata: metadata.generation(),
                assembly: self.assembly.generation(),
            });
        }
        Ok(())
    }
}
