use {
    crate::domain::{
        error::PipelineError,
        id::TransactionRef,
        provider::PaymentProvider,
        request::validate_debit,
        transaction::{AuthResponse, Transaction, TransactionNotFound},
    },
    reqwest::{Method, StatusCode, header},
    serde_json::Number,
    std::{
        future::Future,
        pin::Pin,
        sync::{
            PoisonError, RwLock,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    },
    tokio::{sync::Mutex, time::Instant},
};

pub const DEFAULT_BASE_URL: &str = "https://payments.paypack.rw";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(5 * 60);
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

struct CachedToken {
    access: String,
    expires_at: Instant,
}

/// Paypack REST client with a process-wide bearer token cache.
pub struct PaypackClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    request_timeout: Duration,

    token: RwLock<Option<CachedToken>>,
    // Held for the whole authorize round-trip so only one exchange runs at a time.
    refresh_gate: Mutex<()>,
    exchanges: AtomicU64,
}

impl PaypackClient {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            request_timeout: REQUEST_TIMEOUT,
            token: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            exchanges: AtomicU64::new(0),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.request_timeout = timeout;
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of credential exchanges performed so far.
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    async fn cash_in_inner(
        &self,
        number: &str,
        amount: &Number,
    ) -> Result<Transaction, PipelineError> {
        let amount = validate_debit(number, Some(amount))?;

        let token = self.ensure_access_token().await?;
        let payload = serde_json::json!({
            "amount": amount,
            "number": number,
        });

        let (_, body) = self
            .do_request(Method::POST, "/api/transactions/cashin", Some(&token), Some(&payload))
            .await?;

        let txn: Transaction = serde_json::from_slice(&body)
            .map_err(|e| PipelineError::Protocol(format!("decode cashin response: {e}")))?;
        if txn.reference.is_empty() {
            return Err(PipelineError::Protocol(
                "cashin response missing reference".into(),
            ));
        }

        Ok(txn)
    }

    async fn find_transaction_inner(
        &self,
        reference: &TransactionRef,
    ) -> Result<Transaction, PipelineError> {
        if reference.is_empty() {
            return Err(PipelineError::Validation("ref is required".into()));
        }

        let token = self.ensure_access_token().await?;
        let path = format!("/api/transactions/find/{reference}");

        let (status, body) = match self.do_request(Method::GET, &path, Some(&token), None).await {
            Ok(resp) => resp,
            Err(PipelineError::Provider { status: 404, .. }) => return Err(PipelineError::NotFound),
            Err(e) => return Err(e),
        };

        if let Ok(txn) = serde_json::from_slice::<Transaction>(&body)
            && !txn.reference.is_empty()
        {
            return Ok(txn);
        }

        if let Ok(miss) = serde_json::from_slice::<TransactionNotFound>(&body)
            && !miss.message.is_empty()
        {
            return Err(PipelineError::NotFound);
        }

        Err(PipelineError::Protocol(format!(
            "unexpected transaction payload (status {status}): {}",
            String::from_utf8_lossy(&body)
        )))
    }

    async fn authorize(&self) -> Result<AuthResponse, PipelineError> {
        let payload = serde_json::json!({
            "client_id": self.app_id,
            "client_secret": self.app_secret,
        });

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        let (_, body) = self
            .do_request(Method::POST, "/api/auth/agents/authorize", None, Some(&payload))
            .await?;

        let auth: AuthResponse = serde_json::from_slice(&body)
            .map_err(|e| PipelineError::Protocol(format!("decode authorize response: {e}")))?;
        if auth.access.is_empty() {
            return Err(PipelineError::Protocol(
                "authorize response missing access token".into(),
            ));
        }

        Ok(auth)
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cached| Instant::now() < cached.expires_at)
            .map(|cached| cached.access.clone())
    }

    async fn ensure_access_token(&self) -> Result<String, PipelineError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we waited for the gate.
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let auth = self.authorize().await?;
        let lifetime = token_lifetime(auth.expires);
        tracing::debug!(lifetime_secs = lifetime.as_secs(), "paypack access token refreshed");

        let now = Instant::now();
        let expires_at = now
            .checked_add(lifetime)
            .unwrap_or_else(|| now + token_lifetime(0));
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedToken {
            access: auth.access.clone(),
            expires_at,
        });

        Ok(auth.access)
    }

    async fn do_request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, Vec<u8>), PipelineError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, url)
            .timeout(self.request_timeout)
            .header(header::ACCEPT, "application/json");

        if let Some(payload) = payload {
            req = req.json(payload);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        if status.as_u16() >= 400 {
            return Err(PipelineError::Provider {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok((status, body))
    }
}

/// Usable lifetime of a freshly issued token: the declared lifetime minus a
/// safety buffer (half the lifetime when it is shorter than the buffer).
/// Declared lifetimes are capped at thirty days.
pub fn token_lifetime(expires_secs: i64) -> Duration {
    let lifetime = if expires_secs <= 0 {
        DEFAULT_TOKEN_LIFETIME
    } else {
        Duration::from_secs(expires_secs as u64).min(MAX_TOKEN_LIFETIME)
    };

    let buffer = if lifetime <= TOKEN_EXPIRY_BUFFER {
        lifetime / 2
    } else {
        TOKEN_EXPIRY_BUFFER
    };

    lifetime - buffer
}

impl PaymentProvider for PaypackClient {
    fn cash_in<'a>(
        &'a self,
        number: &'a str,
        amount: &'a Number,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>> {
        Box::pin(self.cash_in_inner(number, amount))
    }

    fn find_transaction<'a>(
        &'a self,
        reference: &'a TransactionRef,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>> {
        Box::pin(self.find_transaction_inner(reference))
    }
}
