//! Assembly load generations
//!
//! The loader hands out one [`AssemblyContext`] per load of a named assembly.
//! Loading a name that is already loaded returns the live context; loading it
//! after an unload starts the next generation. Unloading marks the context
//! unloaded and then waits until every descriptor and builder holding it has
//! let go.

use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tether_sdk::{AssemblyContext, Generation};

use crate::config::LoaderOptions;
use crate::error::{ReflectError, ReflectResult};

#[derive(Debug)]
struct LoadedAssembly {
    context: Arc<AssemblyContext>,
}

/// Tracks the current generation of every named assembly
#[derive(Debug, Default)]
pub struct AssemblyLoader {
    options: LoaderOptions,
    assemblies: FxHashMap<String, LoadedAssembly>,
    generations: FxHashMap<String, Generation>,
}

impl AssemblyLoader {
    /// Create a loader with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with `options`
    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Loader options
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load `name`, declaring `declared_types`.
    ///
    /// If a loaded generation of `name` exists it is returned unchanged.
    pub fn load<I, S>(&mut self, name: &str, declared_types: I) -> Arc<AssemblyContext>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(loaded) = self.assemblies.get(name) {
            if loaded.context.is_loaded() {
                tracing::info!(
                    assembly = name,
                    generation = %loaded.context.generation(),
                    "assembly is already loaded"
                );
                return loaded.context.clone();
            }
        }

        let generation = self
            .generations
            .get(name)
            .map(|g| g.next())
            .unwrap_or(Generation(1));
        self.generations.insert(name.to_string(), generation);

        let context = Arc::new(AssemblyContext::new(name, generation, declared_types));
        self.assemblies.insert(
            name.to_string(),
            LoadedAssembly {
                context: context.clone(),
            },
        );
        tracing::info!(
            assembly = name,
            %generation,
            types = context.declared_type_count(),
            "loaded assembly"
        );
        context
    }

    /// Unload the current generation of `name`.
    ///
    /// Blocks until no other holder references the context. Fails with
    /// [`ReflectError::UnloadTimeout`] if holders remain after the configured
    /// timeout; the assembly then stays registered (marked unloaded) so the
    /// unload can be retried.
    pub fn unload(&mut self, name: &str) -> ReflectResult<()> {
        let context = match self.assemblies.get(name) {
            Some(loaded) => loaded.context.clone(),
            None => return Err(ReflectError::AssemblyNotFound(name.to_string())),
        };

        tracing::info!(assembly = name, generation = %context.generation(), "unloading assembly");
        context.mark_unloaded();

        // One reference lives in `self.assemblies`, one is `context` itself.
        let start = Instant::now();
        let mut warned = false;
        loop {
            let holders = Arc::strong_count(&context).saturating_sub(2);
            if holders == 0 {
                break;
            }

            let waited = start.elapsed();
            if waited >= self.options.unload_timeout() {
                tracing::warn!(assembly = name, holders, ?waited, "unloading assembly timed out");
                return Err(ReflectError::UnloadTimeout {
                    name: name.to_string(),
                    holders,
                    waited,
                });
            }
            if !warned && waited >= self.options.unload_warn_after() {
                warned = true;
                tracing::warn!(
                    assembly = name,
                    holders,
                    "unloading assembly is taking longer than expected"
                );
            }
            std::thread::sleep(self.options.unload_poll_interval());
        }

        self.assemblies.remove(name);
        tracing::info!(assembly = name, "assembly unloaded");
        Ok(())
    }

    /// Current context of `name`, loaded or pending unload
    pub fn find(&self, name: &str) -> Option<Arc<AssemblyContext>> {
        self.assemblies.get(name).map(|a| a.context.clone())
    }

    /// Iterate over loaded contexts
    pub fn loaded(&self) -> impl Iterator<Item = &Arc<AssemblyContext>> {
        self.assemblies
            .values()
            .map(|a| &a.context)
            .filter(|c| c.is_loaded())
    }

    /// Number of registered assemblies
    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    /// Check if no assembly is registered
    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }
}
