use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use tempfile::TempDir;

use stackdrop::config::{Config, NotifyConfig};
use stackdrop::notify::NotifierRegistry;
use stackdrop::storage::{Clock, RandomSuffix, ReportStore};

/// A running test server writing into its own temporary traces directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub traces: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (String, StatusCode) {
        let resp = self
            .client
            .post(self.url("/"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (body, status)
    }

    /// Names of every file in the traces directory, sorted.
    pub fn report_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.traces.path())
            .expect("read traces dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn report_path(&self, name: &str) -> PathBuf {
        self.traces.path().join(name)
    }
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.0
    }
}

pub fn test_config(traces: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        traces_dir: traces.path().to_path_buf(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        notify: NotifyConfig::default(),
    }
}

/// Spawn the app with the real clock and suffix source and no notifiers.
pub async fn spawn_app() -> TestApp {
    let traces = tempfile::tempdir().expect("create traces dir");
    let app = stackdrop::build_app(test_config(&traces));
    serve(app, traces).await
}

/// Spawn the app with a pinned clock and the given notifiers.
pub async fn spawn_app_with(clock: Option<Arc<dyn Clock>>, notifiers: NotifierRegistry) -> TestApp {
    let traces = tempfile::tempdir().expect("create traces dir");
    let store = match clock {
        Some(clock) => ReportStore::with_sources(traces.path(), clock, Arc::new(RandomSuffix)),
        None => ReportStore::new(traces.path()),
    };
    let app = stackdrop::build_app_with(&test_config(&traces), store, notifiers);
    serve(app, traces).await
}

pub async fn serve(app: axum::Router, traces: TempDir) -> TestApp {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        traces,
    }
}
