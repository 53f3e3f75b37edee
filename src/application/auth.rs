//! Authentication endpoints and the process-wide session store.

use std::sync::Arc;

use contentdesk_api_types::{SignInRequest, SignInResult, User};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    application::shell::{Shell, routes},
    infra::http::{ApiError, ApiRequest, RestClient},
};

const SIGN_IN_FAILED: &str = "로그인 실패";
const SIGN_OUT_FAILED: &str = "로그아웃 실패";
const PROFILE_FAILED: &str = "프로필 조회 실패";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthState {
    pub logged_in: bool,
    /// True until the startup profile check has answered.
    pub auth_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            logged_in: false,
            auth_loading: true,
        }
    }
}

/// What a protected screen should do for the current [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Pending,
    Allowed,
    RedirectToLogin,
}

impl AuthState {
    pub fn route_access(self) -> RouteAccess {
        if self.auth_loading {
            RouteAccess::Pending
        } else if self.logged_in {
            RouteAccess::Allowed
        } else {
            RouteAccess::RedirectToLogin
        }
    }
}

/// Shared, observable authentication state.
///
/// Written only by the sign-in, sign-out, startup profile check and session-expiry flows.
#[derive(Clone)]
pub struct AuthSession {
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.logged_in != logged_in;
            state.logged_in = logged_in;
            changed
        });
    }

    pub fn set_auth_loading(&self, auth_loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.auth_loading != auth_loading;
            state.auth_loading = auth_loading;
            changed
        });
    }

    /// Session could not be recovered: logged out, startup check settled.
    pub fn mark_expired(&self) {
        self.state.send_modify(|state| {
            state.logged_in = false;
            state.auth_loading = false;
        });
    }

    pub fn route_access(&self) -> RouteAccess {
        self.state().route_access()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AuthClient {
    rest: RestClient,
    session: AuthSession,
}

impl AuthClient {
    pub fn new(rest: RestClient, session: AuthSession) -> Self {
        Self { rest, session }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResult, ApiError> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post("auth/signin")
            .json(&body)
            .map_err(|err| ApiError::Decode {
                message: SIGN_IN_FAILED.to_string(),
                detail: err.to_string(),
            })?;
        self.rest.data(request, SIGN_IN_FAILED).await
    }

    /// Current user, or `None` when the server answers without success.
    /// Transport and authentication failures are errors.
    pub async fn fetch_profile(&self) -> Result<Option<User>, ApiError> {
        let envelope = self
            .rest
            .exchange(ApiRequest::get("auth/profile"), PROFILE_FAILED)
            .await?;
        if !envelope.is_success() {
            return Ok(None);
        }
        envelope
            .data
            .filter(|value| !value.is_null())
            .map(|value| {
                serde_json::from_value(value).map_err(|err| ApiError::Decode {
                    message: PROFILE_FAILED.to_string(),
                    detail: err.to_string(),
                })
            })
            .transpose()
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.rest
            .unit(ApiRequest::post("auth/signout"), SIGN_OUT_FAILED)
            .await
    }

    /// Startup profile check: settles `auth_loading` and sends anonymous users to the login route.
    pub async fn probe(&self, shell: &dyn Shell) -> Option<User> {
        self.session.set_auth_loading(true);
        let user = match self.fetch_profile().await {
            Ok(user) => {
                self.session.set_logged_in(user.is_some());
                user
            }
            Err(err) => {
                warn!(error = %err, "startup profile check failed");
                self.session.set_logged_in(false);
                shell.navigate(routes::LOGIN);
                None
            }
        };
        self.session.set_auth_loading(false);
        user
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        shell: &dyn Shell,
    ) -> Result<SignInResult, ApiError> {
        match self.sign_in(email, password).await {
            Ok(result) => {
                info!(user = %result.user.email, "signed in");
                self.session.set_logged_in(true);
                self.session.set_auth_loading(false);
                shell.navigate(routes::HOME);
                Ok(result)
            }
            Err(err) => {
                shell.notify(&err.to_string());
                Err(err)
            }
        }
    }

    pub async fn logout(&self, shell: &dyn Shell) -> Result<(), ApiError> {
        match self.sign_out().await {
            Ok(()) => {
                self.session.set_logged_in(false);
                shell.navigate(routes::LOGIN);
                Ok(())
            }
            Err(err) => {
                shell.notify(&err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_access_waits_for_the_profile_check() {
        let session = AuthSession::new();
        assert_eq!(session.route_access(), RouteAccess::Pending);

        session.set_auth_loading(false);
        assert_eq!(session.route_access(), RouteAccess::RedirectToLogin);

        session.set_logged_in(true);
        assert_eq!(session.route_access(), RouteAccess::Allowed);
    }

    #[test]
    fn expiry_logs_out_and_settles_loading() {
        let session = AuthSession::new();
        session.set_logged_in(true);
        session.mark_expired();
        assert_eq!(
            session.state(),
            AuthState {
                logged_in: false,
                auth_loading: false
            }
        );
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let session = AuthSession::new();
        let mut rx = session.subscribe();
        session.set_logged_in(true);
        rx.changed().await.expect("changed");
        assert!(rx.borrow().logged_in);

        session.set_logged_in(true);
        assert!(!rx.has_changed().expect("sender alive"));
    }
}
