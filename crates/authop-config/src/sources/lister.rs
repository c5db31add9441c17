//! Snapshot listers for upstream resources

use std::collections::HashMap;
use std::sync::Arc;

/// Lookup failures from a lister
#[derive(Debug, Clone, thiserror::Error)]
pub enum ListerError {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },

    #[error("{resource} \"{name}\" unavailable: {message}")]
    Unavailable {
        resource: String,
        name: String,
        message: String,
    },
}

impl ListerError {
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    pub fn unavailable(
        resource: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Unavailable {
            resource: resource.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read access to one resource kind by name
pub trait Lister<T>: Send + Sync {
    fn get(&self, name: &str) -> Result<T, ListerError>;
}

impl<T, L: Lister<T> + ?Sized> Lister<T> for Arc<L> {
    fn get(&self, name: &str) -> Result<T, ListerError> {
        (**self).get(name)
    }
}

/// Lister backed by an in-memory snapshot of resources.
///
/// A snapshot can be marked as failing, in which case every lookup reports
/// the resource as unavailable.
#[derive(Debug, Clone)]
pub struct InMemoryLister<T> {
    resource: String,
    items: HashMap<String, T>,
    failure: Option<String>,
}

impl<T> InMemoryLister<T> {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            items: HashMap::new(),
            failure: None,
        }
    }

    pub fn with_item(mut self, name: impl Into<String>, item: T) -> Self {
        self.items.insert(name.into(), item);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, item: T) {
        self.items.insert(name.into(), item);
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.items.remove(name)
    }

    /// Make every lookup fail with `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

impl<T: Clone + Send + Sync> Lister<T> for InMemoryLister<T> {
    fn get(&self, name: &str) -> Result<T, ListerError> {
        if let Some(message) = &self.failure {
            return Err(ListerError::unavailable(&self.resource, name, message));
        }
        self.items
            .get(name)
            .cloned()
            .ok_or_else(|| ListerError::not_found(&self.resource, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_lister_lookup() {
        let lister = InMemoryLister::new("widgets").with_item("cluster", 7u32);
        assert_eq!(lister.get("cluster").unwrap(), 7);

        let err = lister.get("other").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "widgets \"other\" not found");
    }

    #[test]
    fn test_failing_lister() {
        let lister = InMemoryLister::new("widgets")
            .with_item("cluster", 7u32)
            .failing("connection refused");
        let err = lister.get("cluster").unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("connection refused"));
    }
}
