use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type ModelSlot = Arc<dyn Any + Send + Sync>;

/// Named, typed model entries. Registering a name twice replaces the entry.
#[derive(Default)]
pub struct ModelRegistry {
    entries: HashMap<String, ModelSlot>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("ModelRegistry").field("names", &names).finish()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `model` under `name`. Returns `true` if an entry was replaced.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, model: T) -> bool {
        self.entries.insert(name.into(), Arc::new(model)).is_some()
    }

    /// Entry under `name`, if present and of type `T`
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .get(name)
            .and_then(|slot| Arc::clone(slot).downcast::<T>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
