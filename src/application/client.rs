//! Wires the transport, the session gateway and every resource client together.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use contentdesk_api_types::{GamesNews, Hero, News, PromotionBanner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    application::{
        auth::{AuthClient, AuthSession},
        company::CompanyClient,
        contacts::ContactsClient,
        content::ContentClient,
        error::AppError,
        repos::MediaUploader,
        shell::{Shell, routes},
        uploads::UploadsClient,
    },
    config::ApiSettings,
    infra::{
        error::InfraError,
        http::{HttpTransport, RestClient, SessionExpiredHook, SessionGateway, Transport},
    },
};

const MISSING_BASE_URL: &str =
    "API base URL is not configured; pass --api-url or set CONTENTDESK_API_URL";

/// Every client the dashboard needs, sharing one gateway and one auth session.
#[derive(Clone)]
pub struct AdminClient {
    gateway: SessionGateway,
    session: AuthSession,
    pub auth: AuthClient,
    pub promotions: ContentClient<PromotionBanner>,
    pub heroes: ContentClient<Hero>,
    pub games: ContentClient<GamesNews>,
    pub news: ContentClient<News>,
    pub uploads: UploadsClient,
    pub company: CompanyClient,
    pub contacts: ContactsClient,
}

impl AdminClient {
    /// Build the HTTP transport from settings. Also returns the transport so
    /// callers can persist its cookies.
    pub fn connect(
        api: &ApiSettings,
        shell: Arc<dyn Shell>,
    ) -> Result<(Self, HttpTransport), AppError> {
        let base = api
            .base_url
            .as_ref()
            .ok_or_else(|| AppError::validation(MISSING_BASE_URL))?;
        let transport = HttpTransport::new(base, api.request_timeout)?;
        let client = Self::with_transport(Arc::new(transport.clone()), shell);
        Ok((client, transport))
    }

    /// Build on any transport. Session expiry marks the session logged out
    /// and sends the shell to the login route.
    pub fn with_transport(transport: Arc<dyn Transport>, shell: Arc<dyn Shell>) -> Self {
        let session = AuthSession::new();
        let hook = SessionExpiredHook::new();
        install_expiry_handler(&hook, session.clone(), shell);

        let gateway = SessionGateway::with_hook(transport, hook);
        let rest = RestClient::new(gateway.clone());

        Self {
            auth: AuthClient::new(rest.clone(), session.clone()),
            promotions: ContentClient::new(rest.clone()),
            heroes: ContentClient::new(rest.clone()),
            games: ContentClient::new(rest.clone()),
            news: ContentClient::new(rest.clone()),
            uploads: UploadsClient::new(rest.clone()),
            company: CompanyClient::new(rest.clone()),
            contacts: ContactsClient::new(rest),
            gateway,
            session,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn gateway(&self) -> &SessionGateway {
        &self.gateway
    }

    pub fn uploader(&self) -> Arc<dyn MediaUploader> {
        Arc::new(self.uploads.clone())
    }
}

fn install_expiry_handler(hook: &SessionExpiredHook, session: AuthSession, shell: Arc<dyn Shell>) {
    hook.set(move || {
        warn!(
            target = "application::client",
            "session expired; redirecting to login"
        );
        session.mark_expired();
        shell.navigate(routes::LOGIN);
    });
}

/// On-disk form of the session cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    api_url: String,
    cookies: String,
}

/// Keeps the session cookies between command-line runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored cookies into `transport`. Cookies saved for a different
    /// API origin are ignored. Returns whether anything was restored.
    pub async fn restore(&self, transport: &HttpTransport) -> Result<bool, InfraError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        let stored: StoredSession = match serde_json::from_slice(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable session file");
                return Ok(false);
            }
        };

        if stored.api_url != transport.base().as_str() {
            debug!(
                stored = %stored.api_url,
                current = %transport.base(),
                "session file belongs to another API"
            );
            return Ok(false);
        }

        transport.restore_cookies(&stored.cookies);
        Ok(true)
    }

    /// Write the transport's current cookies. Returns `false` when there were none.
    pub async fn save(&self, transport: &HttpTransport) -> Result<bool, InfraError> {
        let Some(cookies) = transport.cookie_header() else {
            return Ok(false);
        };
        let stored = StoredSession {
            api_url: transport.base().to_string(),
            cookies,
        };
        let body = serde_json::to_vec_pretty(&stored)
            .map_err(|err| InfraError::configuration(err.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, body).await?;
        info!(path = %self.path.display(), "session saved");
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), InfraError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use reqwest::Url;

    use super::*;
    use crate::{
        application::auth::RouteAccess,
        infra::http::{ApiRequest, GatewayError, RawResponse},
    };

    struct AlwaysUnauthorized;

    #[async_trait]
    impl Transport for AlwaysUnauthorized {
        async fn execute(&self, _request: &ApiRequest) -> Result<RawResponse, GatewayError> {
            Ok(RawResponse::new(401, r#"{"code":"UNAUTHORIZED","message":"expired"}"#))
        }
    }

    #[derive(Default)]
    struct RouteLog(Mutex<Vec<String>>);

    impl Shell for RouteLog {
        fn notify(&self, _message: &str) {}

        fn confirm(&self, _question: &str) -> bool {
            true
        }

        fn navigate(&self, route: &str) {
            self.0.lock().unwrap().push(route.to_string());
        }
    }

    fn transport() -> HttpTransport {
        let base = Url::parse("http://127.0.0.1:9/api").expect("url");
        HttpTransport::new(&base, Duration::from_secs(1)).expect("client")
    }

    #[tokio::test]
    async fn failed_refresh_logs_out_and_goes_to_login() {
        let shell = Arc::new(RouteLog::default());
        let client = AdminClient::with_transport(
            Arc::new(AlwaysUnauthorized),
            shell.clone() as Arc<dyn Shell>,
        );
        client.session().set_logged_in(true);
        client.session().set_auth_loading(false);

        let err = client.heroes.get(1).await.expect_err("expired");
        assert!(err.is_auth_failure());
        assert!(!client.session().is_logged_in());
        assert_eq!(client.session().route_access(), RouteAccess::RedirectToLogin);
        assert_eq!(shell.0.lock().unwrap().clone(), vec![routes::LOGIN]);
    }

    #[test]
    fn connect_requires_a_base_url() {
        let settings = ApiSettings {
            base_url: None,
            request_timeout: Duration::from_secs(5),
        };
        let shell: Arc<dyn Shell> = Arc::new(RouteLog::default());
        let err = AdminClient::connect(&settings, shell)
            .err()
            .expect("missing url");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn session_cookies_survive_a_round_trip_through_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        let first = transport();
        assert!(!store.restore(&first).await.expect("restore"));
        first.restore_cookies("accessToken=abc; refreshToken=def");
        assert!(store.save(&first).await.expect("save"));

        let second = transport();
        assert!(store.restore(&second).await.expect("restore"));
        let header = second.cookie_header().expect("cookies");
        assert!(header.contains("accessToken=abc"));
        assert!(header.contains("refreshToken=def"));

        store.clear().await.expect("clear");
        store.clear().await.expect("clear twice");
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn cookies_for_another_origin_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        tokio::fs::write(
            &path,
            r#"{"apiUrl":"https://elsewhere.example/","cookies":"accessToken=zzz"}"#,
        )
        .await
        .expect("write");

        let transport = transport();
        assert!(!SessionStore::new(&path).restore(&transport).await.expect("restore"));
        assert!(transport.cookie_header().is_none());
    }

    #[tokio::test]
    async fn empty_jar_is_not_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(!store.save(&transport()).await.expect("save"));
        assert!(!store.path().exists());
    }
}
