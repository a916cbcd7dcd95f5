use std::env;
use std::sync::Arc;
use std::time::Duration;

use astviz_backend::{
    BackendError, InitBudget, LoaderSignals, LocalBackend, ModuleLoader, ParseBackend,
    RemoteBackend, ShareCodec, StagedLoader, build_client,
};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::store::SessionStore;

/// Which parse strategy the store runs. Switching strategies is a
/// configuration decision, never a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Remote,
    Local,
    LocalWithFallback,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub strategy: Strategy,
    pub init_budget: InitBudget,
    pub http_timeout_seconds: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8080/").expect("static URL"),
            strategy: Strategy::Remote,
            init_budget: InitBudget::default(),
            http_timeout_seconds: 30,
            log_level: "astviz=debug".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("ASTVIZ_BASE_URL") {
            match Url::parse(&base_url) {
                Ok(url) => config.base_url = url,
                Err(err) => eprintln!(
                    "Warning: Invalid ASTVIZ_BASE_URL value '{}' ({}), using default {}",
                    base_url, err, config.base_url
                ),
            }
        }

        if let Ok(strategy) = env::var("ASTVIZ_BACKEND") {
            config.strategy = match strategy.to_lowercase().as_str() {
                "remote" => Strategy::Remote,
                "local" => Strategy::Local,
                "local-fallback" => Strategy::LocalWithFallback,
                _ => {
                    eprintln!(
                        "Warning: Invalid ASTVIZ_BACKEND value '{}', using default remote",
                        strategy
                    );
                    Strategy::Remote
                }
            };
        }

        if let Ok(ms_str) = env::var("ASTVIZ_INIT_SHIM_TIMEOUT_MS") {
            if let Ok(ms) = ms_str.parse::<u64>() {
                config.init_budget.shim = Duration::from_millis(ms);
            } else {
                eprintln!(
                    "Warning: Invalid ASTVIZ_INIT_SHIM_TIMEOUT_MS value '{}', using default",
                    ms_str
                );
            }
        }

        if let Ok(ms_str) = env::var("ASTVIZ_INIT_MODULE_TIMEOUT_MS") {
            if let Ok(ms) = ms_str.parse::<u64>() {
                config.init_budget.module = Duration::from_millis(ms);
            } else {
                eprintln!(
                    "Warning: Invalid ASTVIZ_INIT_MODULE_TIMEOUT_MS value '{}', using default",
                    ms_str
                );
            }
        }

        if let Ok(seconds_str) = env::var("ASTVIZ_HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = seconds_str.parse::<u64>() {
                config.http_timeout_seconds = seconds;
            } else {
                eprintln!(
                    "Warning: Invalid ASTVIZ_HTTP_TIMEOUT_SECONDS value '{}', using default {}",
                    seconds_str, config.http_timeout_seconds
                );
            }
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("ASTVIZ_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("ASTVIZ_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid ASTVIZ_LOG_FORMAT value '{}', using default text",
                        log_format
                    );
                    LogFormat::Text
                }
            };
        }

        config
    }

    /// A staged loader sized to this configuration's init budgets. The
    /// host keeps the signal half and resolves it as the runtime shim
    /// and module binary come up.
    pub fn staged_loader(&self) -> (StagedLoader, LoaderSignals) {
        StagedLoader::new(self.init_budget)
    }

    /// Wires a session store for this configuration. Local strategies
    /// need the host-supplied module loader; without one the store
    /// degrades to the remote strategy with a warning.
    pub fn build_store(
        &self,
        loader: Option<Arc<dyn ModuleLoader>>,
    ) -> Result<SessionStore, BackendError> {
        let client = build_client(Duration::from_secs(self.http_timeout_seconds))?;
        let codec = ShareCodec::new(&self.base_url, client.clone())?;

        let backend = match (self.strategy, loader) {
            (Strategy::Remote, _) => {
                ParseBackend::Remote(RemoteBackend::new(&self.base_url, client)?)
            }
            (Strategy::Local, Some(loader)) => ParseBackend::Local(LocalBackend::new(loader)),
            (Strategy::LocalWithFallback, Some(loader)) => ParseBackend::LocalWithFallback(
                LocalBackend::new(loader),
                RemoteBackend::new(&self.base_url, client)?,
            ),
            (strategy, None) => {
                warn!(
                    "backend strategy {:?} requires a module loader, falling back to remote",
                    strategy
                );
                ParseBackend::Remote(RemoteBackend::new(&self.base_url, client)?)
            }
        };

        Ok(SessionStore::new(backend, codec))
    }
}

pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}
