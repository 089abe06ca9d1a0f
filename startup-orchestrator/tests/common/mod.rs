#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::collections::VecDeque;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use startup_orchestrator::launcher::PollPolicy;

pub const SYNCED: &str = r#"{"synced": true}"#;
pub const NOT_SYNCED: &str = r#"{"synced": false}"#;

pub fn fast_policy(timeout: Duration) -> PollPolicy {
    PollPolicy::new(Duration::from_millis(20), timeout)
}

/// An address nothing listens on.
pub fn refused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    address.to_string()
}

#[derive(Clone)]
struct Script {
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    last: Arc<Mutex<(StatusCode, String)>>,
    hits: Arc<AtomicUsize>,
}

/// Serves `/health` from a script, repeating the last reply once it runs out.
pub struct HealthServer {
    address: SocketAddr,
    hits: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl HealthServer {
    pub fn start(replies: Vec<(StatusCode, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let address = listener.local_addr().unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let script = Script {
            replies: Arc::new(Mutex::new(
                replies
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect(),
            )),
            last: Arc::new(Mutex::new((
                StatusCode::SERVICE_UNAVAILABLE,
                String::new(),
            ))),
            hits: hits.clone(),
        };

        let (tx, rx) = oneshot::channel::<()>();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let app = Router::new()
                    .route("/health", get(health))
                    .with_state(script);
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            address,
            hits,
            shutdown: Some(tx),
        }
    }

    pub fn address(&self) -> String {
        self.address.to_string()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for HealthServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn health(State(script): State<Script>) -> (StatusCode, String) {
    script.hits.fetch_add(1, Ordering::SeqCst);
    let mut last = script.last.lock().unwrap();
    if let Some(next) = script.replies.lock().unwrap().pop_front() {
        *last = next;
    }
    last.clone()
}
