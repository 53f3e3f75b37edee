use std::{
    sync::{
        Mutex as StdMutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use super::*;

/// Scripted server: protected paths answer 401 until a refresh succeeds.
struct ScriptedTransport {
    authorized: AtomicBool,
    refresh_succeeds: bool,
    reject_replays: bool,
    calls: StdMutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(refresh_succeeds: bool) -> Self {
        Self {
            authorized: AtomicBool::new(false),
            refresh_succeeds,
            reject_replays: false,
            calls: StdMutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn refresh_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.ends_with(REFRESH_PATH))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, GatewayError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(request.describe());

        if request.path == REFRESH_PATH {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.refresh_succeeds {
                self.authorized.store(true, Ordering::SeqCst);
                return Ok(RawResponse::new(200, r#"{"code":"SUCCESS"}"#));
            }
            return Ok(RawResponse::new(401, r#"{"code":"UNAUTHORIZED"}"#));
        }
        if request.path == "offline" {
            return Err(GatewayError::network("connection refused"));
        }
        if request.path == "missing" {
            return Ok(RawResponse::new(404, r#"{"code":"NOT_FOUND"}"#));
        }
        if self.reject_replays || !self.authorized.load(Ordering::SeqCst) {
            return Ok(RawResponse::new(401, r#"{"code":"UNAUTHORIZED"}"#));
        }
        Ok(RawResponse::new(
            200,
            format!(r#"{{"code":"SUCCESS","data":"{}"}}"#, request.path),
        ))
    }
}

fn gateway_with(transport: &Arc<ScriptedTransport>) -> (SessionGateway, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let hook = SessionExpiredHook::new();
    let counter = Arc::clone(&fired);
    hook.set(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let dyn_transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    (SessionGateway::with_hook(dyn_transport, hook), fired)
}

#[tokio::test(start_paused = true)]
async fn non_401_responses_pass_through() {
    let transport = Arc::new(ScriptedTransport::new(true));
    transport.authorized.store(true, Ordering::SeqCst);
    let (gateway, fired) = gateway_with(&transport);

    let ok = gateway.send(ApiRequest::get("news")).await.expect("ok");
    assert_eq!(ok.status, 200);
    let missing = gateway.send(ApiRequest::get("missing")).await.expect("404");
    assert_eq!(missing.status, 404);

    assert_eq!(transport.refresh_count(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn network_errors_propagate_without_refresh() {
    let transport = Arc::new(ScriptedTransport::new(true));
    let (gateway, _) = gateway_with(&transport);

    let err = gateway
        .send(ApiRequest::get("offline"))
        .await
        .expect_err("offline");
    assert_eq!(err, GatewayError::network("connection refused"));
    assert_eq!(transport.refresh_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_401s_share_one_refresh_and_replay_in_order() {
    let transport = Arc::new(ScriptedTransport::new(true));
    let (gateway, fired) = gateway_with(&transport);

    let (first, second) = tokio::join!(
        gateway.send(ApiRequest::get("promotions")),
        gateway.send(ApiRequest::get("heroes")),
    );

    assert_eq!(first.expect("first replayed").status, 200);
    assert_eq!(second.expect("second replayed").status, 200);
    assert_eq!(
        transport.calls(),
        vec![
            "GET promotions",
            "GET heroes",
            "POST auth/refresh",
            "GET promotions",
            "GET heroes",
        ]
    );
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!gateway.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn refresh_failure_fails_every_queued_request_and_fires_hook_once() {
    let transport = Arc::new(ScriptedTransport::new(false));
    let (gateway, fired) = gateway_with(&transport);

    let (a, b, c) = tokio::join!(
        gateway.send(ApiRequest::get("promotions")),
        gateway.send(ApiRequest::get("heroes")),
        gateway.send(ApiRequest::get("news")),
    );

    for result in [a, b, c] {
        assert!(matches!(result, Err(GatewayError::Refresh { .. })));
    }
    assert_eq!(transport.refresh_count(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!gateway.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn second_401_after_replay_is_final() {
    let mut scripted = ScriptedTransport::new(true);
    scripted.reject_replays = true;
    let transport = Arc::new(scripted);
    let (gateway, fired) = gateway_with(&transport);

    let err = gateway
        .send(ApiRequest::get("promotions"))
        .await
        .expect_err("still unauthorized");

    assert_eq!(err, GatewayError::SessionExpired);
    assert!(err.is_auth_failure());
    assert_eq!(transport.refresh_count(), 1);
    assert_eq!(
        transport.calls(),
        vec!["GET promotions", "POST auth/refresh", "GET promotions"]
    );
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn a_later_burst_starts_a_new_refresh() {
    let transport = Arc::new(ScriptedTransport::new(true));
    let (gateway, _) = gateway_with(&transport);

    gateway
        .send(ApiRequest::get("news"))
        .await
        .expect("first burst");
    transport.authorized.store(false, Ordering::SeqCst);
    gateway
        .send(ApiRequest::get("news"))
        .await
        .expect("second burst");

    assert_eq!(transport.refresh_count(), 2);
}

#[test]
fn hook_keeps_only_the_latest_callback() {
    let hook = SessionExpiredHook::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    hook.set(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    hook.set(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    hook.fire();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);

    hook.reset();
    hook.fire();
    assert_eq!(second.load(Ordering::SeqCst), 1);
}
