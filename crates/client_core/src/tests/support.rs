use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::{api::HttpCourseApi, host::PageHost};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Alert(String),
    Confirm(String),
    Reload,
    Navigate(String),
    Celebrate,
}

pub struct RecordingHost {
    confirm_answer: bool,
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            confirm_answer: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self {
            confirm_answer: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().expect("host calls").clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == HostCall::Reload)
            .count()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: HostCall) {
        self.calls.lock().expect("host calls").push(call);
    }
}

impl PageHost for RecordingHost {
    fn alert(&self, message: &str) {
        self.push(HostCall::Alert(message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.push(HostCall::Confirm(message.to_string()));
        self.confirm_answer
    }

    fn reload(&self) {
        self.push(HostCall::Reload);
    }

    fn navigate(&self, url: &str) {
        self.push(HostCall::Navigate(url.to_string()));
    }

    fn celebrate(&self) {
        self.push(HostCall::Celebrate);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

pub type RequestLog = Arc<Mutex<Vec<Recorded>>>;

type Responder = Arc<dyn Fn(&Recorded) -> (StatusCode, Value) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    log: RequestLog,
    respond: Responder,
}

async fn record_and_reply(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    let (status, reply) = (state.respond)(&recorded);
    state.log.lock().expect("request log").push(recorded);
    (status, Json(reply))
}

/// Serves every path with `respond`, recording each request.
pub async fn spawn_mock_with<F>(respond: F) -> anyhow::Result<(Arc<HttpCourseApi>, RequestLog)>
where
    F: Fn(&Recorded) -> (StatusCode, Value) + Send + Sync + 'static,
{
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        log: Arc::clone(&log),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(record_and_reply).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let api = HttpCourseApi::new(&format!("http://{addr}"))?;
    Ok((Arc::new(api), log))
}

pub async fn spawn_mock(
    status: StatusCode,
    reply: Value,
) -> anyhow::Result<(Arc<HttpCourseApi>, RequestLog)> {
    spawn_mock_with(move |_| (status, reply.clone())).await
}

/// An API client pointed at a port nobody listens on.
pub async fn unreachable_api() -> anyhow::Result<Arc<HttpCourseApi>> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Arc::new(HttpCourseApi::new(&format!("http://{addr}"))?))
}

pub fn requests(log: &RequestLog) -> Vec<Recorded> {
    log.lock().expect("request log").clone()
}
