use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use rlimit::Resource;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Warns when the open file limit could starve concurrent liveness probes,
/// each of which holds a socket open.
pub fn warn_ulimit(parallelism: usize) {
    let Ok((limit, _)) = rlimit::getrlimit(Resource::NOFILE) else {
        return;
    };
    if limit <= parallelism as u64 + 64 {
        warn!(
            "Your file limit ({limit}) is low for {parallelism} parallel probes. Consider lowering --parallelism or raising your file limit via `ulimit -n 10240`"
        );
    }
}

/// Builds the client used for both playlist downloads and liveness probes
///
/// Falls back to the crate's own identity when `user_agent` is not a valid header value.
///
/// # Panics
/// Panics when the TLS backend cannot be initialized
#[must_use]
pub fn init_http_client(user_agent: &str) -> reqwest::Client {
    let user_agent = HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
        warn!("Invalid user agent `{user_agent}`, using the default one");
        HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
    });

    let mut headers = HeaderMap::new();
    headers.insert("User-Agent", user_agent);

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Unable to build HTTP client")
}

/// Spawn a task that watches for CTRL + C signal and cancels a [`CancellationToken`] when caught
pub fn spawn_ct_watcher(ct: CancellationToken) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Caught CTRL+C signal!");
        ct.cancel();
    });
}
