#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use tubelink::auth::{
    AuthError, CredentialStore, DeviceCodeGrant, StoredCredential, TokenEndpoint, TokenResult,
};

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: Mutex<Option<StoredCredential>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, credential: StoredCredential) {
        *self.credential.lock().expect("store lock poisoned") = Some(credential);
    }

    pub fn get(&self) -> Option<StoredCredential> {
        self.credential.lock().expect("store lock poisoned").clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        if self.fail_saves {
            return Err(AuthError::Io("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.credential.lock().expect("store lock poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.credential.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// Token endpoint answering from a script. Polls past the end of the script
/// answer `authorization_pending`.
pub struct ScriptedEndpoint {
    grant: Mutex<Option<Result<DeviceCodeGrant, AuthError>>>,
    polls: Mutex<VecDeque<Result<TokenResult, AuthError>>>,
    poll_times: Mutex<Vec<Instant>>,
    device_code_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedEndpoint {
    pub fn new(grant: DeviceCodeGrant) -> Self {
        Self::with_grant_result(Ok(grant))
    }

    pub fn with_grant_result(grant: Result<DeviceCodeGrant, AuthError>) -> Self {
        Self {
            grant: Mutex::new(Some(grant)),
            polls: Mutex::new(VecDeque::new()),
            poll_times: Mutex::new(Vec::new()),
            device_code_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold every poll response until the returned [`Notify`] fires.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn then(self, result: Result<TokenResult, AuthError>) -> Self {
        self.polls
            .lock()
            .expect("script lock poisoned")
            .push_back(result);
        self
    }

    pub fn then_error(self, code: &str) -> Self {
        self.then(Ok(error_result(code, None)))
    }

    pub fn then_tokens(self, access: &str, refresh: &str) -> Self {
        self.then(Ok(token_result(access, Some(refresh))))
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().expect("times lock poisoned").len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().expect("times lock poisoned").clone()
    }

    pub fn device_code_calls(&self) -> usize {
        self.device_code_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for ScriptedEndpoint {
    async fn request_device_code(&self) -> Result<DeviceCodeGrant, AuthError> {
        self.device_code_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.grant.lock().expect("grant lock poisoned").take();
        scripted.unwrap_or_else(|| Ok(grant(1800, 5)))
    }

    async fn poll_for_token(
        &self,
        _device_code: &str,
        _interval: u64,
    ) -> Result<TokenResult, AuthError> {
        self.poll_times
            .lock()
            .expect("times lock poisoned")
            .push(Instant::now());
        let next = self
            .polls
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(error_result("authorization_pending", None)));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        next
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenResult, AuthError> {
        Err(AuthError::Protocol("refresh not scripted".to_string()))
    }
}

pub fn grant(expires_in: u64, interval: u64) -> DeviceCodeGrant {
    DeviceCodeGrant {
        device_code: "AH-1Ng0device".to_string(),
        user_code: "GQVQ-JKEC".to_string(),
        verification_url: "https://www.google.com/device".to_string(),
        expires_in,
        interval,
    }
}

pub fn token_result(access: &str, refresh: Option<&str>) -> TokenResult {
    TokenResult {
        access_token: Some(access.to_string()),
        refresh_token: refresh.map(String::from),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(3599),
        ..TokenResult::default()
    }
}

pub fn error_result(code: &str, description: Option<&str>) -> TokenResult {
    TokenResult {
        error: Some(code.to_string()),
        error_description: description.map(String::from),
        ..TokenResult::default()
    }
}
