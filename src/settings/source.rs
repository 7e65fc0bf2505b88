use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Raw string-valued property storage.
///
/// Implementations report failures freely; the accessor decides what to do
/// with them.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait PropertySource: Send + Sync {
    /// Read a property. `Ok(None)` when the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a property, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local property source, mainly for tests and dry runs.
#[derive(Default)]
pub struct MemoryPropertySource {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl PropertySource for MemoryPropertySource {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
