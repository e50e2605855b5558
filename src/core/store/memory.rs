//! In-memory volatile scope.
//!
//! Values live only in this process and are zeroized when removed or
//! when the scope is dropped. This is the session-lifetime storage the
//! master password requires: ending the `latchkey session` process ends
//! the scope, with nothing written to disk.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use zeroize::Zeroizing;

use super::Scope;
use crate::error::Result;

#[derive(Default)]
pub struct MemoryScope {
    entries: Mutex<HashMap<String, Zeroizing<String>>>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Scope for MemoryScope {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).map(|v| v.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), Zeroizing::new(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
