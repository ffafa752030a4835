use crate::errors::AuthError;
use crate::models::Identity;
use crate::subscription::{Subscription, Watchers};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Identity changes. Fires immediately with the current identity.
    async fn subscribe(&self) -> Subscription<Option<Identity>>;

    async fn sign_in(&self, display_name: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Default)]
struct AuthInner {
    current: Option<Identity>,
    watchers: Watchers<Option<Identity>>,
}

/// Single-user, in-process identity provider.
#[derive(Clone, Default)]
pub struct LocalAuth {
    inner: Arc<Mutex<AuthInner>>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<Identity> {
        self.inner.lock().await.current.clone()
    }

    async fn set_current(&self, identity: Option<Identity>) {
        let mut inner = self.inner.lock().await;
        inner.current = identity.clone();
        inner.watchers.broadcast(identity);
    }
}

/// Lowercase, alphanumeric words joined by `-`.
fn uid_for(display_name: &str) -> String {
    let slug = display_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    format!("local:{slug}")
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn subscribe(&self) -> Subscription<Option<Identity>> {
        let mut inner = self.inner.lock().await;
        let current = inner.current.clone();
        inner.watchers.register_with("", "identity", current)
    }

    async fn sign_in(&self, display_name: &str) -> Result<Identity, AuthError> {
        let display_name = display_name.trim();
        if display_name.is_empty() || !display_name.chars().any(char::is_alphanumeric) {
            return Err(AuthError::EmptyDisplayName);
        }

        let identity = Identity {
            uid: uid_for(display_name),
            display_name: display_name.to_string(),
        };
        info!(uid = %identity.uid, "signed in");
        self.set_current(Some(identity.clone())).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        info!("signed out");
        self.set_current(None).await;
        Ok(())
    }
}
