use {
    crate::{
        adapters::paypack_client::DEFAULT_BASE_URL,
        domain::error::PipelineError,
        services::cashin_pipeline::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT},
    },
    std::{env, time::Duration},
};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub app_secret: String,
    pub base_url: String,
    pub callback_url: String,
    pub callback_secret: Option<String>,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Values are trimmed; blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| PipelineError::Config(format!("{key} must be set")))
        };

        let (app_id, app_secret) = match (get("PAYPACK_APP_ID"), get("PAYPACK_APP_SECRET")) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(PipelineError::Config(
                    "PAYPACK_APP_ID and PAYPACK_APP_SECRET must be set".into(),
                ));
            }
        };

        let base_url = get("PAYPACK_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            app_id,
            app_secret,
            base_url,
            callback_url: require("SUBSCRIPTION_CALLBACK_URL")?,
            callback_secret: get("SUBSCRIPTION_CALLBACK_SECRET"),
            poll_interval: parse_secs("CASHIN_POLL_INTERVAL_SECS", get("CASHIN_POLL_INTERVAL_SECS"))?
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            timeout: parse_secs("CASHIN_TIMEOUT_SECS", get("CASHIN_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_TIMEOUT),
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        })
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Result<Option<Duration>, PipelineError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(PipelineError::Config(format!("{key} must be greater than zero"))),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(_) => Err(PipelineError::Config(format!(
            "{key} must be a whole number of seconds, got: {raw}"
        ))),
    }
}
