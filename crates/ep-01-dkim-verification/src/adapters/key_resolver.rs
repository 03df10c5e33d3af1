//! # Key Method Registry
//!
//! Maps key query method names (the `q` tag) to [`KeyQuery`] implementations.
//! The mapping is built by the host and owned by the resolver.

use crate::domain::entities::KeyQueryResult;
use crate::domain::errors::ResolutionError;
use crate::ports::outbound::{KeyQuery, KeyResolution};
use std::collections::HashMap;
use tracing::debug;

/// Registry of key query methods.
#[derive(Default)]
pub struct KeyResolver {
    methods: HashMap<String, Box<dyn KeyQuery>>,
}

impl KeyResolver {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `query` under `method`, replacing any previous entry.
    pub fn register(&mut self, method: impl Into<String>, query: impl KeyQuery + 'static) {
        self.methods.insert(method.into(), Box::new(query));
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with_method(mut self, method: impl Into<String>, query: impl KeyQuery + 'static) -> Self {
        self.register(method, query);
        self
    }

    /// True if `method` is registered.
    pub fn supports(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("KeyResolver").field("methods", &names).finish()
    }
}

impl KeyResolution for KeyResolver {
    fn resolve(
        &self,
        methods: &[String],
        domain: &str,
        selector: &str,
    ) -> Result<KeyQueryResult, ResolutionError> {
        let (method, query) = methods
            .iter()
            .find_map(|m| self.methods.get(m).map(|q| (m, q)))
            .ok_or_else(|| ResolutionError::NoRecognizedMethod(methods.to_vec()))?;

        debug!(method = %method, domain = %domain, selector = %selector, "Querying key");
        query.query(domain, selector)
    }
}

// =============================================================================
// TESTS
// =============================================================================
