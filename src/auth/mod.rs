//! OAuth device-code sign-in and credential storage.

pub mod authorizer;
pub mod controller;
pub mod device_code;
pub mod error;
pub mod service;
pub mod store;
pub mod token;

pub use authorizer::{DeviceCodeAuthorizer, TokenEndpoint};
pub use controller::{DevicePrompt, FlowState, PollingController, MIN_POLL_INTERVAL_SECS};
pub use device_code::DeviceCodeGrant;
pub use error::AuthError;
pub use service::AuthService;
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, StoredCredential};
pub use token::{TokenOutcome, TokenResult};
