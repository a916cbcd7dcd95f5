use std::sync::Arc;
use std::time::Duration;

use astviz_model::ParseResult;
use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::protocol::InputFormat;

/// The capability handed out by a [`ModuleLoader`] once bootstrap has
/// finished. Parsing is synchronous from this point on; an `{error}`
/// result from the underlying module surfaces as
/// [`BackendError::ModuleRuntime`].
pub trait ParseModule: Send + Sync {
    fn parse(&self, code: &str, format: InputFormat) -> Result<ParseResult, BackendError>;
}

/// One-time asynchronous bootstrap of an in-process parse module.
///
/// Implementations own the host-specific asset loading (runtime shim,
/// module binary); this crate treats both as opaque and only requires
/// that `load` eventually yields the parse capability or a bootstrap
/// error within a bounded budget.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ParseModule>, BackendError>;
}

/// Time budgets for the two bootstrap stages: the runtime shim becoming
/// available, and the module registering its parse entry point.
#[derive(Debug, Clone, Copy)]
pub struct InitBudget {
    pub shim: Duration,
    pub module: Duration,
}

impl Default for InitBudget {
    fn default() -> Self {
        Self {
            shim: Duration::from_secs(1),
            module: Duration::from_secs(1),
        }
    }
}

/// Host side of a [`StagedLoader`]: the embedding runtime resolves each
/// stage exactly once as its assets come up.
pub struct LoaderSignals {
    shim: watch::Sender<bool>,
    module: watch::Sender<Option<Arc<dyn ParseModule>>>,
}

impl LoaderSignals {
    /// Marks the runtime shim as loaded.
    pub fn shim_loaded(&self) {
        let _ = self.shim.send(true);
    }

    /// Registers the module's parse capability, completing bootstrap.
    pub fn register_module(&self, module: Arc<dyn ParseModule>) {
        let _ = self.module.send(Some(module));
    }
}

/// Loader over two one-shot readiness signals with independent bounded
/// budgets. A one-shot notification replaces interval polling for the
/// global entry point; the overall wait stays bounded, failing with
/// [`BackendError::InitTimeout`] or [`BackendError::ModuleNotReady`]
/// depending on which stage ran out.
pub struct StagedLoader {
    shim_ready: watch::Receiver<bool>,
    module_ready: watch::Receiver<Option<Arc<dyn ParseModule>>>,
    budget: InitBudget,
}

impl StagedLoader {
    pub fn new(budget: InitBudget) -> (Self, LoaderSignals) {
        let (shim_tx, shim_rx) = watch::channel(false);
        let (module_tx, module_rx) = watch::channel(None);
        (
            Self {
                shim_ready: shim_rx,
                module_ready: module_rx,
                budget,
            },
            LoaderSignals {
                shim: shim_tx,
                module: module_tx,
            },
        )
    }
}

#[async_trait]
impl ModuleLoader for StagedLoader {
    async fn load(&self) -> Result<Arc<dyn ParseModule>, BackendError> {
        let mut shim = self.shim_ready.clone();
        timeout(self.budget.shim, shim.wait_for(|ready| *ready))
            .await
            .map_err(|_| BackendError::InitTimeout)?
            .map_err(|_| BackendError::InitTimeout)?;
        debug!("runtime shim ready, waiting for module registration");

        let mut module = self.module_ready.clone();
        let registered = timeout(self.budget.module, module.wait_for(|m| m.is_some()))
            .await
            .map_err(|_| BackendError::ModuleNotReady)?
            .map_err(|_| BackendError::ModuleNotReady)?;

        registered.clone().ok_or(BackendError::ModuleNotReady)
    }
}

/// Local parse strategy. Bootstrap is memoized process-wide: the slot
/// mutex is held across the loader call, so concurrent callers racing
/// the first `parse` all await the same attempt and then observe the
/// cached capability. A failed bootstrap is not cached; the next call
/// retries, since asset-loading failures are plausibly transient.
#[derive(Clone)]
pub struct LocalBackend {
    loader: Arc<dyn ModuleLoader>,
    module: Arc<Mutex<Option<Arc<dyn ParseModule>>>>,
}

impl LocalBackend {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            module: Arc::new(Mutex::new(None)),
        }
    }

    async fn module(&self) -> Result<Arc<dyn ParseModule>, BackendError> {
        let mut slot = self.module.lock().await;
        if let Some(module) = slot.as_ref() {
            return Ok(Arc::clone(module));
        }

        match self.loader.load().await {
            Ok(module) => {
                debug!("parse module initialized");
                *slot = Some(Arc::clone(&module));
                Ok(module)
            }
            Err(err) => {
                warn!("parse module bootstrap failed: {}", err);
                Err(err)
            }
        }
    }

    pub async fn parse(
        &self,
        code: &str,
        format: InputFormat,
    ) -> Result<ParseResult, BackendError> {
        let module = self.module().await?;
        module.parse(code, format)
    }
}
