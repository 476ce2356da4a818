//! tubelink: YouTube sign-in over the OAuth 2.0 device authorization grant.
//!
//! Requests a device code, shows the user a short code to enter on another
//! device, polls Google's token endpoint until the user approves, and keeps
//! the resulting credential on disk for read-only YouTube Data API calls.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tubelink::auth::{AuthService, DeviceCodeAuthorizer, FileCredentialStore};
//! use tubelink::config::OAuthConfig;
//!
//! # async fn example() -> tubelink::error::Result<()> {
//! let config = OAuthConfig::load()?;
//! let http = tubelink::http::build_client()?;
//! let service = AuthService::new(
//!     Arc::new(DeviceCodeAuthorizer::new(http, &config)),
//!     Arc::new(FileCredentialStore::new_default()),
//! );
//! let controller = service.controller();
//! let mut states = controller.watch_state();
//! if let Some(task) = controller.sign_in() {
//!     while states.changed().await.is_ok() {
//!         if states.borrow().is_terminal() {
//!             break;
//!         }
//!     }
//!     let _ = task.await;
//! }
//! println!("sign-in finished: {}", controller.state());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;

#[cfg(feature = "cli")]
pub mod cli;
