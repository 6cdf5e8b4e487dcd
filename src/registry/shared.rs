//! Thread-safe access to a registry.
//!
//! The core itself is single-threaded per rank. Embedders that do share a
//! repository or register across threads wrap it in [`Shared`]: mutations
//! (`register`, `build`, `add`) run one at a time under the write lock;
//! lookups take the read lock, so concurrent lookups never block each other.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::register::NamedObjectRegister;
use super::repository::{BuildContext, ComponentFactory, ComponentRepository};
use super::component::Component;
use crate::stg_error::StgError;

/// A registry behind a read-write lock.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: RwLock<T>,
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<'f> Shared<ComponentRepository<'f>> {
    pub fn register(&self, factory: &'f ComponentFactory) -> Result<(), StgError> {
        self.write().register(factory)
    }

    pub fn build(
        &self,
        category: &str,
        type_name: &str,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Box<dyn Component>, StgError> {
        self.write().build(category, type_name, ctx)
    }

    pub fn lookup(&self, category: &str, type_name: &str) -> Option<&'f ComponentFactory> {
        self.read().lookup(category, type_name)
    }

    pub fn contains(&self, category: &str, type_name: &str) -> bool {
        self.read().contains(category, type_name)
    }
}

impl<T> Shared<NamedObjectRegister<T>> {
    pub fn add_named(&self, name: impl Into<String>, object: T) -> Result<usize, StgError> {
        self.write().add_named(name, object)
    }

    pub fn get_index(&self, name: &str) -> Option<usize> {
        self.read().get_index(name)
    }

    /// Run `f` on the object called `name` under the read lock.
    pub fn with_by_name<R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.read().get_by_name(name).map(f)
    }

    /// Run `f` on the object at `index` under the read lock.
    pub fn with_by_index<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.read().get_by_index(index).map(f)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_additions_keep_unique_indices() {
        let shared = Shared::new(NamedObjectRegister::<u32>::new());
        std::thread::scope(|s| {
            for t in 0..4u32 {
                let shared = &shared;
                s.spawn(move || {
                    for i in 0..25u32 {
                        shared.add_named(format!("t{t}-{i}"), t * 100 + i).unwrap();
                    }
                });
            }
        });
        assert_eq!(shared.len(), 100);
        let reg = shared.into_inner();
        let mut indices: Vec<_> = reg.names().map(|n| reg.get_index(n).unwrap()).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..100).collect::<Vec<_>>());
        assert_eq!(reg.get_by_name("t2-7"), Some(&207));
    }

    #[test]
    fn duplicate_name_under_lock() {
        let shared = Shared::new(NamedObjectRegister::new());
        shared.add_named("mesh", 1).unwrap();
        assert!(shared.add_named("mesh", 2).is_err());
        assert_eq!(shared.with_by_name("mesh", |v| *v), Some(1));
        assert_eq!(shared.with_by_index(0, |v| v + 1), Some(2));
        assert_eq!(shared.get_index("mesh"), Some(0));
    }
}
