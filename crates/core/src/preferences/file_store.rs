use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::errors::{Error, Result};

use super::{
    PreferenceStore, StoredPreference, ENVIRONMENT_PREFERENCE_KEY, PARTIAL_SWITCH_KEY,
};

const CURRENT_VERSION: u32 = 1;

/// On-disk envelope. Kept as a map so later preferences can share the file.
#[derive(Serialize, Deserialize, Default)]
struct PreferencesFile {
    version: u32,
    #[serde(default)]
    values: HashMap<String, String>,
}

/// JSON-file preference store that survives restarts.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_locked(&self) -> Result<PreferencesFile> {
        if !self.path.exists() {
            return Ok(PreferencesFile::default());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(PreferencesFile::default());
        }

        Ok(serde_json::from_slice(&raw)?)
    }

    fn persist_locked(&self, file: &PreferencesFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<StoredPreference>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::preference("Preference store lock poisoned"))?;
        let file = self.load_locked()?;

        let Some(raw) = file.values.get(ENVIRONMENT_PREFERENCE_KEY) else {
            return Ok(None);
        };

        // An unrecognised value is treated as absent so the derived mode wins.
        let environment = match raw.parse::<Environment>() {
            Ok(env) => env,
            Err(e) => {
                warn!("[FilePreferenceStore] Ignoring stored preference: {}", e);
                return Ok(None);
            }
        };

        let partial = file
            .values
            .get(PARTIAL_SWITCH_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Ok(Some(StoredPreference {
            environment,
            partial,
        }))
    }

    fn save(&self, preference: StoredPreference) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::preference("Preference store lock poisoned"))?;
        let mut file = self.load_locked().unwrap_or_else(|e| {
            warn!("[FilePreferenceStore] Rewriting unreadable preferences file: {}", e);
            PreferencesFile::default()
        });
        file.version = CURRENT_VERSION;
        file.values.insert(
            ENVIRONMENT_PREFERENCE_KEY.to_string(),
            preference.environment.as_str().to_string(),
        );
        file.values.insert(
            PARTIAL_SWITCH_KEY.to_string(),
            preference.partial.to_string(),
        );
        self.persist_locked(&file)
    }
}
