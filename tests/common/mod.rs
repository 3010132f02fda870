#![allow(dead_code)]

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use cashin_sync::domain::{
    error::PipelineError, id::TransactionRef, notifier::OutcomeNotifier, outcome::Outcome,
    provider::PaymentProvider, transaction::Transaction,
};
use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{net::TcpListener, time::Instant};

// ── Scripted provider ──────────────────────────────────────────────────────

pub enum CashInStep {
    Accept(&'static str),
    Fail(u16),
}

#[derive(Clone)]
pub enum FindStep {
    Found(&'static str),
    Missing,
    Fail(u16),
}

/// In-memory provider driven by a script of lookup results. Once the script
/// runs out every lookup returns `fallback`.
pub struct ScriptedProvider {
    cash_in: CashInStep,
    finds: Mutex<VecDeque<FindStep>>,
    fallback: FindStep,
    find_delay: Option<Duration>,
    pub cash_in_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub find_times: Mutex<Vec<Instant>>,
}

impl ScriptedProvider {
    pub fn new(cash_in: CashInStep, finds: Vec<FindStep>, fallback: FindStep) -> Self {
        Self {
            cash_in,
            finds: Mutex::new(finds.into()),
            fallback,
            find_delay: None,
            cash_in_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
            find_times: Mutex::new(Vec::new()),
        }
    }

    /// Accepts the debit as `reference` and confirms it with `status` on the first lookup.
    pub fn confirming(reference: &'static str, status: &'static str) -> Self {
        Self::new(CashInStep::Accept(reference), vec![], FindStep::Found(status))
    }

    /// Accepts the debit and never finds it.
    pub fn never_found(reference: &'static str) -> Self {
        Self::new(CashInStep::Accept(reference), vec![], FindStep::Missing)
    }

    pub fn with_find_delay(mut self, delay: Duration) -> Self {
        self.find_delay = Some(delay);
        self
    }

    pub fn cash_ins(&self) -> usize {
        self.cash_in_calls.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.cash_ins() + self.finds()
    }
}

fn provider_error(status: u16) -> PipelineError {
    PipelineError::Provider {
        status,
        body: format!("{{\"error\":\"boom {status}\"}}"),
    }
}

impl PaymentProvider for ScriptedProvider {
    fn cash_in<'a>(
        &'a self,
        _number: &'a str,
        _amount: &'a serde_json::Number,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            self.cash_in_calls.fetch_add(1, Ordering::SeqCst);
            match self.cash_in {
                CashInStep::Accept(reference) => Ok(Transaction::new(
                    TransactionRef::new(reference).unwrap(),
                    "pending",
                )),
                CashInStep::Fail(status) => Err(provider_error(status)),
            }
        })
    }

    fn find_transaction<'a>(
        &'a self,
        reference: &'a TransactionRef,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.find_times.lock().unwrap().push(Instant::now());
            if let Some(delay) = self.find_delay {
                tokio::time::sleep(delay).await;
            }

            let step = self
                .finds
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            match step {
                FindStep::Found(status) => Ok(Transaction::new(reference.clone(), status)),
                FindStep::Missing => Err(PipelineError::NotFound),
                FindStep::Fail(status) => Err(provider_error(status)),
            }
        })
    }
}

// ── Recording notifier ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Outcome>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Outcome> {
        self.sent.lock().unwrap().clone()
    }
}

impl OutcomeNotifier for RecordingNotifier {
    fn send<'a>(
        &'a self,
        outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(outcome.clone());
            if self.fail {
                return Err(PipelineError::Notifier(
                    "callback endpoint returned 503: unavailable".into(),
                ));
            }
            Ok(())
        })
    }
}

// ── Mock Paypack API ───────────────────────────────────────────────────────

/// (status, body) the mock answers with.
pub type Reply = (u16, String);

#[derive(Clone)]
pub struct MockPaypack {
    pub authorize_calls: Arc<AtomicUsize>,
    pub cashin_calls: Arc<AtomicUsize>,
    pub find_calls: Arc<AtomicUsize>,
    pub bearers: Arc<Mutex<Vec<String>>>,
    pub cashin_bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    pub expires: Arc<Mutex<i64>>,
    pub authorize_delay: Arc<Mutex<Duration>>,
    pub authorize_reply: Arc<Mutex<Option<Reply>>>,
    pub cashin_reply: Arc<Mutex<Reply>>,
    pub find_replies: Arc<Mutex<VecDeque<Reply>>>,
    pub find_fallback: Arc<Mutex<Reply>>,
}

impl Default for MockPaypack {
    fn default() -> Self {
        Self {
            authorize_calls: Arc::default(),
            cashin_calls: Arc::default(),
            find_calls: Arc::default(),
            bearers: Arc::default(),
            cashin_bodies: Arc::default(),
            expires: Arc::new(Mutex::new(3600)),
            authorize_delay: Arc::default(),
            authorize_reply: Arc::default(),
            cashin_reply: Arc::new(Mutex::new((
                200,
                r#"{"ref":"abc","status":"pending","amount":1000,"kind":"CASHIN","provider":"mtn"}"#
                    .into(),
            ))),
            find_replies: Arc::default(),
            find_fallback: Arc::new(Mutex::new((
                404,
                r#"{"message":"transaction not found"}"#.into(),
            ))),
        }
    }
}

impl MockPaypack {
    pub fn with_expires(self, secs: i64) -> Self {
        *self.expires.lock().unwrap() = secs;
        self
    }

    pub fn with_authorize_delay(self, delay: Duration) -> Self {
        *self.authorize_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_authorize_reply(self, status: u16, body: &str) -> Self {
        *self.authorize_reply.lock().unwrap() = Some((status, body.into()));
        self
    }

    pub fn with_cashin_reply(self, status: u16, body: &str) -> Self {
        *self.cashin_reply.lock().unwrap() = (status, body.into());
        self
    }

    pub fn with_find_replies(self, replies: Vec<(u16, &str)>) -> Self {
        *self.find_replies.lock().unwrap() =
            replies.into_iter().map(|(s, b)| (s, b.to_string())).collect();
        self
    }

    pub fn with_find_fallback(self, status: u16, body: &str) -> Self {
        *self.find_fallback.lock().unwrap() = (status, body.into());
        self
    }

    pub fn authorizations(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub fn cashins(&self) -> usize {
        self.cashin_calls.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Serve the mock on an ephemeral port and return its base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/auth/agents/authorize", post(authorize))
            .route("/api/transactions/cashin", post(cashin))
            .route("/api/transactions/find/{reference}", get(find))
            .with_state(self.clone());
        serve(app).await
    }
}

fn json_reply((status, body): Reply) -> impl IntoResponse {
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

fn record_bearer(mock: &MockPaypack, headers: &HeaderMap) {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        mock.bearers
            .lock()
            .unwrap()
            .push(value.to_str().unwrap().to_string());
    }
}

async fn authorize(State(mock): State<MockPaypack>, body: String) -> impl IntoResponse {
    let n = mock.authorize_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = *mock.authorize_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let creds: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if creds["client_id"] != "app-id" || creds["client_secret"] != "app-secret" {
        return json_reply((401, r#"{"message":"invalid credentials"}"#.into()));
    }

    let reply = mock.authorize_reply.lock().unwrap().clone();
    let reply = reply.unwrap_or_else(|| {
        let expires = *mock.expires.lock().unwrap();
        (
            200,
            serde_json::json!({
                "access": format!("token-{n}"),
                "refresh": format!("refresh-{n}"),
                "expires": expires,
            })
            .to_string(),
        )
    });
    json_reply(reply)
}

async fn cashin(
    State(mock): State<MockPaypack>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    mock.cashin_calls.fetch_add(1, Ordering::SeqCst);
    record_bearer(&mock, &headers);
    mock.cashin_bodies
        .lock()
        .unwrap()
        .push(serde_json::from_str(&body).unwrap_or_default());
    let reply = mock.cashin_reply.lock().unwrap().clone();
    json_reply(reply)
}

async fn find(
    State(mock): State<MockPaypack>,
    Path(_reference): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    mock.find_calls.fetch_add(1, Ordering::SeqCst);
    record_bearer(&mock, &headers);
    let next = mock.find_replies.lock().unwrap().pop_front();
    let reply = next.unwrap_or_else(|| mock.find_fallback.lock().unwrap().clone());
    json_reply(reply)
}

// ── Mock callback receiver ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ReceivedCallback {
    pub secret: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
pub struct MockCallback {
    pub received: Arc<Mutex<Vec<ReceivedCallback>>>,
    pub status: u16,
    pub delay: Duration,
}

impl MockCallback {
    pub fn responding(status: u16) -> Self {
        Self {
            received: Arc::default(),
            status,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn received(&self) -> Vec<ReceivedCallback> {
        self.received.lock().unwrap().clone()
    }

    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/hook", post(receive_callback))
            .with_state(self.clone());
        format!("{}/hook", serve(app).await)
    }
}

async fn receive_callback(
    State(mock): State<MockCallback>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header_str = |name: &str| {
        headers
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    mock.received.lock().unwrap().push(ReceivedCallback {
        secret: header_str("x-callback-secret"),
        content_type: header_str("content-type"),
        body: serde_json::from_str(&body).unwrap(),
    });
    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }
    (StatusCode::from_u16(mock.status).unwrap(), "downstream says hi")
}

// ── Helpers ────────────────────────────────────────────────────────────────

pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
