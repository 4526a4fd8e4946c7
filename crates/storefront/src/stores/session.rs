//! Session store.
//!
//! Tracks who the shopper is. The identity is persisted under
//! [`keys::USER`] so a restart keeps the shopper logged in without a
//! round-trip to the backend.
//!
//! # Stale responses
//!
//! Every login or signup captures the current epoch before awaiting the
//! backend. [`SessionStore::logout`] and any newer attempt advance the epoch,
//! so a response that arrives late is dropped without touching state or
//! navigating.

use std::sync::{Arc, Mutex, PoisonError};

use khushiv_core::{AuthToken, Identity};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::navigation::{Navigator, Route};
use crate::persistence::{PersistentBridge, keys};

/// Errors from login and signup.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A newer login attempt or a logout overtook this request.
    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Superseded => "This request was cancelled.".to_string(),
        }
    }
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    /// A login or signup is awaiting the backend.
    Authenticating,
    Authenticated,
}

/// Shared handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    api: ApiClient,
    bridge: PersistentBridge,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    identity: Option<Identity>,
    error: Option<String>,
    in_flight: bool,
    epoch: u64,
}

impl SessionStore {
    /// Create an anonymous session.
    #[must_use]
    pub fn new(api: ApiClient, bridge: PersistentBridge, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                bridge,
                navigator,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Create a session, adopting the persisted identity if one parses.
    ///
    /// The backend is not contacted; an expired token surfaces on the
    /// first authenticated call instead.
    #[must_use]
    pub fn restore(
        api: ApiClient,
        bridge: PersistentBridge,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let identity = bridge.load::<Identity>(keys::USER);
        if let Some(identity) = &identity {
            info!(email = %identity.email, "Restored persisted session");
        }

        let store = Self::new(api, bridge, navigator);
        store.state().identity = identity;
        store
    }

    /// Exchange credentials for an identity.
    ///
    /// On success the identity is stored, persisted, and the shopper is sent
    /// to [`Route::Home`]. On failure the message is kept in
    /// [`error`](Self::error) and the previous identity is left in place.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the backend call fails, or
    /// [`SessionError::Superseded`] if the session changed meanwhile.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, SessionError> {
        let attempt = self.begin();
        let result = self.inner.api.login(email, password).await;
        self.finish(attempt.epoch, result)
    }

    /// Register an account; same contract as [`login`](Self::login).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the backend call fails, or
    /// [`SessionError::Superseded`] if the session changed meanwhile.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, SessionError> {
        let attempt = self.begin();
        let result = self.inner.api.signup(name, email, password).await;
        self.finish(attempt.epoch, result)
    }

    /// End the session and send the shopper to [`Route::Login`].
    ///
    /// Always succeeds, including when nobody is logged in.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        {
            let mut state = self.state();
            state.epoch += 1;
            state.identity = None;
            state.error = None;
            state.in_flight = false;
        }
        self.inner.bridge.remove(keys::USER);
        info!("Logged out");
        self.inner.navigator.navigate(Route::login());
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current identity, if authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    /// Bearer token of the current identity.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.state().identity.as_ref().map(|i| i.token.clone())
    }

    /// Message from the last failed login or signup.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let state = self.state();
        if state.in_flight {
            SessionStatus::Authenticating
        } else if state.identity.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state().identity.as_ref().is_some_and(|i| i.is_admin)
    }

    /// Counter advanced by every login, signup and logout.
    ///
    /// Callers that await the backend on behalf of the current identity
    /// compare it before and after to detect that the session moved on.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Start an attempt: bump the epoch, clear the error, mark in flight.
    fn begin(&self) -> Attempt<'_> {
        let mut state = self.state();
        state.epoch += 1;
        state.error = None;
        state.in_flight = true;
        Attempt {
            store: self,
            epoch: state.epoch,
        }
    }

    /// Apply an attempt's outcome if it is still current.
    fn finish(
        &self,
        epoch: u64,
        result: Result<Identity, ApiError>,
    ) -> Result<Identity, SessionError> {
        {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!(epoch, current = state.epoch, "Discarding stale session response");
                return Err(SessionError::Superseded);
            }
            state.in_flight = false;

            match &result {
                Ok(identity) => {
                    state.identity = Some(identity.clone());
                    state.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "Authentication failed");
                    state.error = Some(e.user_message());
                }
            }
        }

        let identity = result?;
        self.inner.bridge.save(keys::USER, &identity);
        info!(email = %identity.email, admin = identity.is_admin, "Authenticated");
        self.inner.navigator.navigate(Route::Home);
        Ok(identity)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-flight login or signup.
///
/// Dropping it clears the in-flight flag unless a newer attempt or a logout
/// has taken over, so a cancelled request does not leave the session stuck
/// in [`SessionStatus::Authenticating`].
struct Attempt<'a> {
    store: &'a SessionStore,
    epoch: u64,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        let mut state = self.store.state();
        if state.epoch == self.epoch {
            state.in_flight = false;
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::config::ClientConfig;
    use crate::navigation::RecordingNavigator;
    use crate::persistence::{KeyValueStore, MemoryStore};

    fn unreachable_api() -> ApiClient {
        let mut config = ClientConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap());
        config.api.timeout = Duration::from_secs(1);
        ApiClient::new(&config.api).unwrap()
    }

    fn identity(email: &str) -> Identity {
        Identity {
            id: None,
            name: "Asha".to_string(),
            email: email.to_string(),
            token: AuthToken::new("t0k3n"),
            is_admin: false,
        }
    }

    #[test]
    fn test_restore_adopts_persisted_identity() {
        let memory = Arc::new(MemoryStore::new());
        let bridge = PersistentBridge::new(memory.clone());
        bridge.save(keys::USER, &identity("asha@example.com"));

        let session = SessionStore::restore(
            unreachable_api(),
            bridge,
            Arc::new(RecordingNavigator::default()),
        );
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.token().unwrap().expose(), "t0k3n");
    }

    #[test]
    fn test_restore_ignores_corrupt_identity() {
        let memory = Arc::new(MemoryStore::new());
        memory.write(keys::USER, "not json");

        let session = SessionStore::restore(
            unreachable_api(),
            PersistentBridge::new(memory.clone()),
            Arc::new(RecordingNavigator::default()),
        );
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(memory.read(keys::USER), None);
    }

    #[test]
    fn test_logout_when_anonymous_still_navigates() {
        let navigator = Arc::new(RecordingNavigator::default());
        let session =
            SessionStore::new(unreachable_api(), PersistentBridge::in_memory(), navigator.clone());

        session.logout();
        session.logout();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(navigator.routes(), vec![Route::login(), Route::login()]);
    }

    #[test]
    fn test_logout_clears_persisted_identity() {
        let memory = Arc::new(MemoryStore::new());
        let bridge = PersistentBridge::new(memory.clone());
        bridge.save(keys::USER, &identity("asha@example.com"));
        let session = SessionStore::restore(
            unreachable_api(),
            bridge,
            Arc::new(RecordingNavigator::default()),
        );

        session.logout();
        assert!(session.identity().is_none());
        assert_eq!(memory.read(keys::USER), None);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_previous_identity() {
        let bridge = PersistentBridge::in_memory();
        bridge.save(keys::USER, &identity("old@example.com"));
        let navigator = Arc::new(RecordingNavigator::default());
        let session = SessionStore::restore(unreachable_api(), bridge, navigator.clone());

        let err = session
            .login("new@example.com", &SecretString::from("pw".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Api(ApiError::Transport(_))));
        assert_eq!(session.error().as_deref(), Some(crate::api::TRANSPORT_MESSAGE));
        assert_eq!(session.identity().unwrap().email, "old@example.com");
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert!(navigator.routes().is_empty());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let navigator = Arc::new(RecordingNavigator::default());
        let session =
            SessionStore::new(unreachable_api(), PersistentBridge::in_memory(), navigator.clone());

        let attempt = session.begin();
        assert_eq!(session.status(), SessionStatus::Authenticating);
        session.logout();

        let err = session
            .finish(attempt.epoch, Ok(identity("late@example.com")))
            .unwrap_err();
        assert!(matches!(err, SessionError::Superseded));
        assert!(session.identity().is_none());
        assert_eq!(navigator.routes(), vec![Route::login()]);
    }

    #[test]
    fn test_newer_attempt_supersedes_older() {
        let session = SessionStore::new(
            unreachable_api(),
            PersistentBridge::in_memory(),
            Arc::new(RecordingNavigator::default()),
        );

        let first = session.begin();
        let second = session.begin();
        session.finish(second.epoch, Ok(identity("second@example.com"))).unwrap();
        assert!(session.finish(first.epoch, Ok(identity("first@example.com"))).is_err());
        assert_eq!(session.identity().unwrap().email, "second@example.com");
    }

    #[test]
    fn test_dropped_attempt_clears_in_flight() {
        let session = SessionStore::new(
            unreachable_api(),
            PersistentBridge::in_memory(),
            Arc::new(RecordingNavigator::default()),
        );

        let attempt = session.begin();
        assert_eq!(session.status(), SessionStatus::Authenticating);
        drop(attempt);
        assert_eq!(session.status(), SessionStatus::Anonymous);
    }

    #[test]
    fn test_dropped_older_attempt_leaves_newer_in_flight() {
        let session = SessionStore::new(
            unreachable_api(),
            PersistentBridge::in_memory(),
            Arc::new(RecordingNavigator::default()),
        );

        let first = session.begin();
        let second = session.begin();
        drop(first);
        assert_eq!(session.status(), SessionStatus::Authenticating);
        drop(second);
        assert_eq!(session.status(), SessionStatus::Anonymous);
    }

    #[test]
    fn test_epoch_advances_on_logout() {
        let session = SessionStore::new(
            unreachable_api(),
            PersistentBridge::in_memory(),
            Arc::new(RecordingNavigator::default()),
        );

        let before = session.epoch();
        session.logout();
        assert!(session.epoch() > before);
    }
}
