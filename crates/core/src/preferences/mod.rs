//! Local preference store - remembers the last confirmed environment choice.

mod file_store;
mod memory_store;
mod preferences_traits;

pub use file_store::FilePreferenceStore;
pub use memory_store::InMemoryPreferenceStore;
pub use preferences_traits::{
    PreferenceStore, StoredPreference, ENVIRONMENT_PREFERENCE_KEY, PARTIAL_SWITCH_KEY,
};
