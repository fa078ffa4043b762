//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use gatekeeper::config::GatekeeperConfig;
use gatekeeper::credentials::CredentialCache;
use gatekeeper::http::HttpServer;
use gatekeeper::store::CredentialStore;

pub struct TestGatekeeper {
    pub addr: SocketAddr,
    pub cache: Arc<CredentialCache>,
    // Dropping the sender would stop the server mid-test.
    #[allow(dead_code)]
    pub shutdown: broadcast::Sender<()>,
}

impl TestGatekeeper {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Boot a gatekeeper on an ephemeral port over an in-memory store.
///
/// The returned cache handle shares the server's snapshot, so tests can
/// seed credentials and trigger reloads directly.
pub async fn start_gatekeeper<F>(configure: F) -> TestGatekeeper
where
    F: FnOnce(&mut GatekeeperConfig),
{
    let store = CredentialStore::connect("sqlite::memory:")
        .await
        .expect("in-memory store should connect");
    store.ensure_schema().await.expect("schema should apply");
    let cache = Arc::new(CredentialCache::new(store));

    let mut config = GatekeeperConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    configure(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let server = HttpServer::new(config, cache.clone());
    tokio::spawn(async move {
        let _ = server.run(listener, shutdown_rx).await;
    });

    // Give the accept loop a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestGatekeeper {
        addr,
        cache,
        shutdown: shutdown_tx,
    }
}

/// Seed one credential and make it visible to the running server.
pub async fn seed_credential(
    gatekeeper: &TestGatekeeper,
    secret: &str,
    addresses: &[&str],
    max_requests: Option<i64>,
    expires_at: Option<i64>,
) {
    gatekeeper
        .cache
        .store()
        .insert_credential(secret, None, "personal", addresses, max_requests, expires_at)
        .await
        .expect("credential should insert");
    gatekeeper.cache.reload().await.expect("reload should succeed");
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build")
}

pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
