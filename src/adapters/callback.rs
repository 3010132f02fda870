use {
    crate::domain::{error::PipelineError, notifier::OutcomeNotifier, outcome::Outcome},
    reqwest::header,
    std::{future::Future, pin::Pin, time::Duration},
};

const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_ERROR_BODY: usize = 4096;

pub const SECRET_HEADER: &str = "X-Callback-Secret";

/// Posts finished outcomes to a single HTTPS endpoint.
pub struct HttpsCallbackSender {
    url: String,
    secret: Option<String>,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpsCallbackSender {
    pub fn new(url: impl Into<String>, secret: Option<String>) -> Result<Self, PipelineError> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(PipelineError::Config("callback URL is required".into()));
        }

        Ok(Self {
            url,
            secret: secret.filter(|s| !s.is_empty()),
            http: reqwest::Client::new(),
            timeout: DEFAULT_CALLBACK_TIMEOUT,
        })
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    async fn send_inner(&self, outcome: &Outcome) -> Result<(), PipelineError> {
        let body = serde_json::to_vec(outcome)?;

        let mut req = self
            .http
            .post(self.url.as_str())
            .timeout(self.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(secret) = &self.secret {
            req = req.header(SECRET_HEADER, secret);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PipelineError::Notifier(format!("send callback request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let data = resp.bytes().await.unwrap_or_default();
            let snippet = String::from_utf8_lossy(&data[..data.len().min(MAX_ERROR_BODY)])
                .trim()
                .to_string();
            return Err(PipelineError::Notifier(format!(
                "callback endpoint returned {}: {snippet}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

impl OutcomeNotifier for HttpsCallbackSender {
    fn send<'a>(
        &'a self,
        outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>> {
        Box::pin(self.send_inner(outcome))
    }
}
