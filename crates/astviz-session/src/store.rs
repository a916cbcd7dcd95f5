use std::sync::Arc;

use astviz_backend::{BackendError, InputFormat, ParseBackend, ShareCodec};
use astviz_model::{Function, ParseError, Span, TreeNode};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::selection::{highlight_for_instruction, highlight_for_node};

/// Built-in example source shown on first load.
pub const EXAMPLE_SOURCE: &str = "package main

import \"fmt\"

func main() {
\tfmt.Println(\"Hello, World!\")
}";

/// Everything the presentation layer reads: current source text, the
/// last parse result, selections and the loading flag.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub code: String,
    pub tree: Option<TreeNode>,
    pub functions: Vec<Function>,
    pub errors: Vec<ParseError>,
    pub selected_node: Option<TreeNode>,
    pub selected_instruction: Option<usize>,
    pub loading: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            code: EXAMPLE_SOURCE.to_string(),
            tree: None,
            functions: Vec::new(),
            errors: Vec::new(),
            selected_node: None,
            selected_instruction: None,
            loading: false,
        }
    }
}

/// Single source of truth for one editing session.
///
/// The state lives behind a shared lock and is mutated only by the
/// commands below; each mutation is one atomic replace of the relevant
/// fields, and the lock is never held across an await. Overlapping
/// commands therefore apply in completion order (last write wins).
#[derive(Clone)]
pub struct SessionStore {
    backend: ParseBackend,
    codec: ShareCodec,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new(backend: ParseBackend, codec: ShareCodec) -> Self {
        Self {
            backend,
            codec,
            state: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    /// A point-in-time copy of the session state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn set_code(&self, code: impl Into<String>) {
        self.state.write().await.code = code.into();
    }

    pub async fn set_selected_node(&self, node: Option<TreeNode>) {
        self.state.write().await.selected_node = node;
    }

    pub async fn set_selected_instruction(&self, index: Option<usize>) {
        self.state.write().await.selected_instruction = index;
    }

    /// Spans to highlight in the editor for the current selections, tree
    /// node first, then instruction, mirroring the decoration order of
    /// the editing widget. A stale selection whose span no longer exists
    /// simply produces no instruction match.
    pub async fn highlights(&self) -> Vec<Span> {
        let state = self.state.read().await;
        let mut spans = Vec::new();
        if let Some(node) = &state.selected_node {
            spans.push(highlight_for_node(node));
        }
        if let Some(index) = state.selected_instruction {
            if let Some(span) = highlight_for_instruction(&state.functions, index) {
                spans.push(span);
            }
        }
        spans
    }

    /// Parses the current source text. Every failure is recovered
    /// locally into a single synthesized error pinned to the start of
    /// the document; this command never re-raises.
    pub async fn parse(&self) {
        let code = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.code.clone()
        };

        let outcome = self.backend.parse(&code, InputFormat::Single).await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(result) => {
                info!(
                    "parse finished: {} function(s), {} error(s)",
                    result.functions.len(),
                    result.errors.len()
                );
                state.tree = result.tree;
                state.functions = result.functions;
                state.errors = result.errors;
            }
            Err(err) => {
                error!("parse failed: {}", err);
                state.errors = vec![ParseError::internal(err.to_string())];
            }
        }
        state.loading = false;
    }

    /// Encodes the current source text to a share token. Failures are
    /// re-raised after the loading flag is cleared: the caller owns the
    /// transient status message and the persistence of the token (for
    /// example in the addressable `share` parameter).
    pub async fn share(&self) -> Result<String, BackendError> {
        let code = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.code.clone()
        };

        let outcome = self.codec.encode(&code).await;
        self.state.write().await.loading = false;

        match &outcome {
            Ok(token) => info!("shared session as token {}", token),
            Err(err) => error!("share failed: {}", err),
        }
        outcome
    }

    /// Restores the source text stored under `token`, then parses it.
    /// The decode and the chained parse run sequenced, never
    /// interleaved. On failure the source text is left untouched and the
    /// error list carries a single synthesized error.
    pub async fn load_from_token(&self, token: &str) {
        self.state.write().await.loading = true;

        match self.codec.decode(token).await {
            Ok(code) => {
                debug!("restored {} bytes from token {}", code.len(), token);
                {
                    let mut state = self.state.write().await;
                    state.code = code;
                    state.loading = false;
                }
                self.parse().await;
            }
            Err(err) => {
                error!("load from token failed: {}", err);
                let mut state = self.state.write().await;
                state.errors = vec![ParseError::internal(err.to_string())];
                state.loading = false;
            }
        }
    }

    /// Startup hook for the addressable `share` parameter: restores and
    /// parses the shared session when a token is present, otherwise
    /// leaves the built-in example source waiting for an explicit parse.
    pub async fn bootstrap(&self, share_param: Option<&str>) {
        if let Some(token) = share_param {
            self.load_from_token(token).await;
        }
    }
}
