//! Host reflection registry
//!
//! Owns reflection objects and hands out generational [`TypeHandle`]s to them.
//! Descriptors and builders only ever hold handles; removing an object bumps
//! its slot stamp so stale handles stop resolving instead of dangling.

use rustc_hash::FxHashMap;
use tether_sdk::{RawHandle, ReflectionHost, TypeHandle};

#[derive(Debug)]
struct Slot<T> {
    stamp: u32,
    entry: Option<Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    name: String,
    assembly: String,
    object: T,
}

/// Registry of reflection objects of kind `T`
#[derive(Debug)]
pub struct ReflectionRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    name_to_handle: FxHashMap<String, RawHandle>,
}

impl<T> ReflectionRegistry<T> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            name_to_handle: FxHashMap::default(),
        }
    }

    /// Store a reflection object owned by `assembly`.
    ///
    /// An existing object with the same name is removed first.
    pub fn insert(&mut self, name: String, assembly: &str, object: T) -> TypeHandle<T> {
        if let Some(existing) = self.find(&name) {
            self.remove(existing);
        }

        let entry = Entry {
            name: name.clone(),
            assembly: assembly.to_string(),
            object,
        };
        let raw = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                RawHandle::new(index, slot.stamp)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    stamp: 0,
                    entry: Some(entry),
                });
                RawHandle::new(index, 0)
            }
        };
        self.name_to_handle.insert(name, raw);
        TypeHandle::from_raw(raw)
    }

    /// Get an object by handle
    pub fn get(&self, handle: TypeHandle<T>) -> Option<&T> {
        self.entry(handle.raw()).map(|e| &e.object)
    }

    /// Get a mutable object by handle
    pub fn get_mut(&mut self, handle: TypeHandle<T>) -> Option<&mut T> {
        let raw = handle.raw();
        self.slots
            .get_mut(raw.index as usize)
            .filter(|slot| slot.stamp == raw.stamp)
            .and_then(|slot| slot.entry.as_mut())
            .map(|e| &mut e.object)
    }

    /// Name an object was registered under
    pub fn name_of(&self, handle: TypeHandle<T>) -> Option<&str> {
        self.entry(handle.raw()).map(|e| e.name.as_str())
    }

    /// Find an object by type name
    pub fn find(&self, name: &str) -> Option<TypeHandle<T>> {
        self.name_to_handle
            .get(name)
            .copied()
            .filter(|raw| self.is_live(*raw))
            .map(TypeHandle::from_raw)
    }

    /// Whether `raw` refers to a live object
    pub fn is_live(&self, raw: RawHandle) -> bool {
        self.entry(raw).is_some()
    }

    /// Tear down one object. Outstanding handles to it go dead.
    pub fn remove(&mut self, handle: TypeHandle<T>) -> Option<T> {
        let raw = handle.raw();
        let slot = self.slots.get_mut(raw.index as usize)?;
        if slot.stamp != raw.stamp {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.stamp = slot.stamp.wrapping_add(1);
        self.free.push(raw.index);
        if self.name_to_handle.get(&entry.name) == Some(&raw) {
            self.name_to_handle.remove(&entry.name);
        }
        Some(entry.object)
    }

    /// Tear down every object owned by `assembly`; returns how many were removed
    pub fn release_assembly(&mut self, assembly: &str) -> usize {
        let doomed: Vec<TypeHandle<T>> = self
            .iter_entries()
            .filter(|(_, e)| e.assembly == assembly)
            .map(|(raw, _)| TypeHandle::from_raw(raw))
            .collect();
        for handle in &doomed {
            self.remove(*handle);
        }
        if !doomed.is_empty() {
            tracing::info!(assembly, removed = doomed.len(), "released reflection objects");
        }
        doomed.len()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over live objects with their handles and names
    pub fn iter(&self) -> impl Iterator<Item = (TypeHandle<T>, &str, &T)> {
        self.iter_entries()
            .map(|(raw, e)| (TypeHandle::from_raw(raw), e.name.as_str(), &e.object))
    }

    fn entry(&self, raw: RawHandle) -> Option<&Entry<T>> {
        self.slots
            .get(raw.index as usize)
            .filter(|slot| slot.stamp == raw.stamp)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn iter_entries(&self) -> impl Iterator<Item = (RawHandle, &Entry<T>)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|e| (RawHandle::new(index as u32, slot.stamp), e))
        })
    }
}

impl<T> Default for ReflectionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReflectionHost for ReflectionRegistry<T> {
    fn is_live(&self, handle: RawHandle) -> bool {
        ReflectionRegistry::is_live(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut registry = ReflectionRegistry::new();
        let handle = registry.insert("Point".to_string(), "Game", 2usize);

        assert_eq!(registry.get(handle), Some(&2));
        assert_eq!(registry.name_of(handle), Some("Point"));
        assert_eq!(registry.find("Point"), Some(handle));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_removed_handle_goes_dead() {
        let mut registry = ReflectionRegistry::new();
        let handle = registry.insert("Point".to_string(), "Game", 2usize);

        assert_eq!(registry.remove(handle), Some(2));
        assert!(!registry.is_live(handle.raw()));
        assert!(registry.get(handle).is_none());
        assert!(registry.find("Point").is_none());
        assert_eq!(registry.remove(handle), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_slot_reuse_bumps_stamp() {
        let mut registry = ReflectionRegistry::new();
        let old = registry.insert("Point".to_string(), "Game", 1usize);
        registry.remove(old);

        let new = registry.insert("Circle".to_string(), "Game", 2usize);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(registry.get(old).is_none());
        assert_eq!(registry.get(new), Some(&2));
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut registry = ReflectionRegistry::new();
        let first = registry.insert("Point".to_string(), "Game", 1usize);
        let second = registry.insert("Point".to_string(), "Game", 2usize);

        assert!(!registry.is_live(first.raw()));
        assert_eq!(registry.find("Point"), Some(second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut registry = ReflectionRegistry::new();
        let handle = registry.insert("Counter".to_string(), "Game", 0usize);
        *registry.get_mut(handle).unwrap() += 5;
        assert_eq!(registry.get(handle), Some(&5));
    }

    #[test]
    fn test_release_assembly() {
        let mut registry = ReflectionRegistry::new();
        let a = registry.insert("A".to_string(), "Game", 1usize);
        let b = registry.insert("B".to_string(), "Tools", 2usize);
        let c = registry.insert("C".to_string(), "Game", 3usize);

        assert_eq!(registry.release_assembly("Game"), 2);
        assert!(!registry.is_live(a.raw()));
        assert!(registry.is_live(b.raw()));
        assert!(!registry.is_live(c.raw()));
        assert_eq!(registry.release_assembly("Game"), 0);
    }

    #[test]
    fn test_iter() {
        let mut registry = ReflectionRegistry::new();
        registry.insert("A".to_string(), "Game", 1usize);
        let b = registry.insert("B".to_string(), "Game", 2usize);
        registry.remove(b);

        let names: Vec<&str> = registry.iter().map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["A"]);
    }
}
