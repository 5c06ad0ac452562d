use std::sync::{Arc, Mutex};

use crate::environment::Environment;
use crate::errors::{Error, Result};

use super::{PreferenceStore, StoredPreference};

/// Non-durable preference store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryPreferenceStore {
    value: Arc<Mutex<Option<StoredPreference>>>,
    writes: Arc<Mutex<usize>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(environment: Environment) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(StoredPreference::full(environment)))),
            writes: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of writes performed since creation.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self) -> Result<Option<StoredPreference>> {
        self.value
            .lock()
            .map(|value| *value)
            .map_err(|_| Error::preference("Preference store lock poisoned"))
    }

    fn save(&self, preference: StoredPreference) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| Error::preference("Preference store lock poisoned"))?;
        *value = Some(preference);
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
