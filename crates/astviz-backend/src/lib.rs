//! `astviz-backend` obtains parse results for the session store, either
//! from a remote parse service over HTTP/JSON or from an in-process
//! parse module loaded once per process. It also carries the share
//! codec that turns source text into an opaque token and back.
//!
//! Both strategies sit behind [`ParseBackend`], so the orchestrator can
//! be switched between remote, local, and local-with-remote-fallback by
//! configuration alone.

mod backend;
mod error;
mod local;
mod protocol;
mod remote;
mod share;

pub use backend::ParseBackend;
pub use error::BackendError;
pub use local::{InitBudget, LoaderSignals, LocalBackend, ModuleLoader, ParseModule, StagedLoader};
pub use protocol::{InputFormat, ModuleOutput};
pub use remote::{RemoteBackend, build_client};
pub use share::ShareCodec;
