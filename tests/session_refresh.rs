#![deny(clippy::all, clippy::pedantic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use contentdesk::{
    application::{client::AdminClient, shell::Shell},
    config::ApiSettings,
};
use httpmock::MockServer;
use url::Url;

const HERO: &str = r#"{"code":"SUCCESS","data":{"hero":{"id":1,"title":"Spring","createdAt":"2025-03-01T09:00:00Z","updatedAt":"2025-03-01T09:00:00Z"}}}"#;

#[derive(Default)]
struct Routes(Mutex<Vec<String>>);

impl Shell for Routes {
    fn notify(&self, _message: &str) {}

    fn confirm(&self, _question: &str) -> bool {
        false
    }

    fn navigate(&self, route: &str) {
        self.0.lock().unwrap().push(route.to_string());
    }
}

fn client(server: &MockServer, shell: Arc<Routes>) -> AdminClient {
    let settings = ApiSettings {
        base_url: Some(Url::parse(&server.url("/api")).expect("url")),
        request_timeout: Duration::from_secs(5),
    };
    let (client, _transport) = AdminClient::connect(&settings, shell).expect("client");
    client
}

#[tokio::test]
async fn unauthorized_call_is_replayed_with_the_refreshed_cookie() {
    let server = MockServer::start();
    let rejected = server.mock(|when, then| {
        when.method("GET").path("/api/heroes/1").header_missing("cookie");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"code":"UNAUTHORIZED","message":"expired"}"#);
    });
    let refresh = server.mock(|when, then| {
        when.method("POST").path("/api/auth/refresh");
        then.status(200)
            .header("set-cookie", "accessToken=fresh; Path=/")
            .header("content-type", "application/json")
            .body(r#"{"code":"SUCCESS","data":null}"#);
    });
    let accepted = server.mock(|when, then| {
        when.method("GET")
            .path("/api/heroes/1")
            .header("cookie", "accessToken=fresh");
        then.status(200)
            .header("content-type", "application/json")
            .body(HERO);
    });

    let shell = Arc::new(Routes::default());
    let client = client(&server, Arc::clone(&shell));
    let hero = client.heroes.get(1).await.expect("hero after refresh");

    assert_eq!(hero.id, 1);
    rejected.assert_calls(1);
    refresh.assert_calls(1);
    accepted.assert_calls(1);
    assert!(shell.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_refresh_expires_the_session() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/heroes/1");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method("POST").path("/api/auth/refresh");
        then.status(401);
    });

    let shell = Arc::new(Routes::default());
    let client = client(&server, Arc::clone(&shell));
    client.session().set_logged_in(true);

    let err = client.heroes.get(1).await.expect_err("expired");
    assert!(err.is_auth_failure());
    refresh.assert_calls(1);
    assert!(!client.session().is_logged_in());
    assert_eq!(shell.0.lock().unwrap().as_slice(), ["/login"]);
}
