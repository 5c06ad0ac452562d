//! Credential directory interface - wire types and collaborator traits.

mod directory_model;
mod directory_traits;

pub use directory_model::{SwitchRequest, SwitchResponse};
pub use directory_traits::{CredentialDirectory, TokenProvider};
