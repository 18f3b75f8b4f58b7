//! Keyed callback registry
//!
//! Every interactive control publishes its selection and commit events
//! through a [`CallbackRegistry`]. Subscribers register under a unique,
//! human-readable key so the producer never needs a reference to the
//! consumer, and duplicate or missing keys can be diagnosed.
//!
//! Misuse is reported, never fatal: the offending call is a no-op, the
//! problem is logged, and a [`ControlError`] is returned so callers (and
//! tests) can observe it.

use crate::types::{ControlError, Result};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a registered subscriber
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackKey(String);

impl CallbackKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallbackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for CallbackKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for CallbackKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A subscriber to events of type `E`
///
/// Any `FnMut(&E)` closure is a handler.
pub trait Handler<E> {
    fn handle(&mut self, event: &E);
}

impl<E, F> Handler<E> for F
where
    F: FnMut(&E),
{
    fn handle(&mut self, event: &E) {
        self(event)
    }
}

/// Keyed multi-subscriber fan-out
///
/// Handlers are kept ordered by key, so every `trigger` visits them in the
/// same order.
pub struct CallbackRegistry<E> {
    /// Owner name used in diagnostics
    name: &'static str,
    callbacks: BTreeMap<CallbackKey, Box<dyn Handler<E>>>,
}

impl<E> CallbackRegistry<E> {
    /// Create an empty registry; `name` identifies the owner in log output
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            callbacks: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register `handler` under `key`
    ///
    /// Registering a key twice is an error; the first handler stays bound.
    pub fn add<H>(&mut self, key: impl Into<CallbackKey>, handler: H) -> Result<()>
    where
        H: Handler<E> + 'static,
    {
        let key = key.into();
        if self.callbacks.contains_key(&key) {
            log::error!("{}: callback with key '{}' already exists", self.name, key);
            return Err(ControlError::DuplicateCallback(key.0));
        }
        log::trace!("{}: registered callback '{}'", self.name, key);
        self.callbacks.insert(key, Box::new(handler));
        Ok(())
    }

    /// Remove the handler registered under `key`
    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.callbacks.remove(key).is_none() {
            log::error!("{}: no callback found for key '{}' to remove", self.name, key);
            return Err(ControlError::MissingCallback(key.to_string()));
        }
        Ok(())
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Number of registered handlers
    pub fn count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.callbacks.contains_key(key)
    }

    /// Registered keys, in trigger order
    pub fn keys(&self) -> impl Iterator<Item = &CallbackKey> {
        self.callbacks.keys()
    }

    /// Invoke every handler with `event`, returning how many ran
    ///
    /// An empty registry logs a warning and does nothing.
    pub fn trigger(&mut self, event: &E) -> usize {
        if self.callbacks.is_empty() {
            log::warn!("{}: no callbacks to trigger", self.name);
            return 0;
        }
        for handler in self.callbacks.values_mut() {
            handler.handle(event);
        }
        self.callbacks.len()
    }

    /// Invoke only the handler registered under `key`
    pub fn trigger_specific(&mut self, key: &str, event: &E) -> Result<()> {
        match self.callbacks.get_mut(key) {
            Some(handler) => {
                handler.handle(event);
                Ok(())
            }
            None => {
                log::warn!("{}: no callback found for key '{}' to trigger", self.name, key);
                Err(ControlError::MissingCallback(key.to_string()))
            }
        }
    }
}

impl<E> fmt::Debug for CallbackRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("name", &self.name)
            .field("keys", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}
