use std::sync::Arc;

use astviz_backend::{
    BackendError, InputFormat, LocalBackend, ParseBackend, ParseModule, RemoteBackend, ShareCodec,
};
use astviz_model::{
    BasicBlock, Function, Instruction, ParseResult, Position, Severity, TreeNode,
    validate_block_graph,
};
use astviz_session::{INSTRUCTION_HIGHLIGHT_WIDTH, SessionStore};
use httpmock::{Method::POST, MockServer};
use reqwest::Client;
use url::Url;

const HELLO_SOURCE: &str = "package main\n\nfunc main() {}\n";

/// Stub module producing one function with two blocks (entry, exit) and
/// three instructions, the smallest interesting SSA shape.
struct StubModule;

impl ParseModule for StubModule {
    fn parse(&self, code: &str, _format: InputFormat) -> Result<ParseResult, BackendError> {
        let instruction = |index: usize, block: usize, line: u32, column: u32| Instruction {
            index,
            text: format!("t{index} = op"),
            opcode: "op".to_string(),
            position: Position::new(line, column, 0),
            block,
        };
        Ok(ParseResult {
            tree: Some(TreeNode {
                node_type: "File".to_string(),
                start: Position::new(1, 1, 0),
                end: Position::new(3, 15, code.len()),
                value: None,
                children: vec![],
            }),
            functions: vec![Function {
                name: "main".to_string(),
                package: "main".to_string(),
                location: "main.go:3:1".to_string(),
                instructions: vec![
                    instruction(0, 0, 3, 14),
                    instruction(1, 0, 3, 14),
                    instruction(2, 1, 7, 3),
                ],
                blocks: vec![
                    BasicBlock {
                        index: 0,
                        instructions: vec![0, 1],
                        successors: vec![1],
                        predecessors: vec![],
                    },
                    BasicBlock {
                        index: 1,
                        instructions: vec![2],
                        successors: vec![],
                        predecessors: vec![0],
                    },
                ],
            }],
            errors: vec![],
        })
    }
}

struct InstantLoader;

#[async_trait::async_trait]
impl astviz_backend::ModuleLoader for InstantLoader {
    async fn load(&self) -> Result<Arc<dyn ParseModule>, BackendError> {
        Ok(Arc::new(StubModule))
    }
}

fn dummy_codec() -> ShareCodec {
    let base = Url::parse("http://127.0.0.1:9/").unwrap();
    ShareCodec::new(&base, Client::new()).unwrap()
}

fn local_store() -> SessionStore {
    let backend = ParseBackend::Local(LocalBackend::new(Arc::new(InstantLoader)));
    SessionStore::new(backend, dummy_codec())
}

fn remote_store(server: &MockServer) -> SessionStore {
    let base = Url::parse(&format!("http://{}", server.address())).unwrap();
    let client = Client::new();
    let backend = ParseBackend::Remote(RemoteBackend::new(&base, client.clone()).unwrap());
    SessionStore::new(backend, ShareCodec::new(&base, client).unwrap())
}

#[tokio::test]
async fn test_parse_replaces_tree_functions_and_errors() {
    let store = local_store();
    store.set_code(HELLO_SOURCE).await;
    store.parse().await;

    let state = store.snapshot().await;
    assert_eq!(state.functions.len(), 1);
    assert_eq!(state.functions[0].blocks.len(), 2);
    assert_eq!(state.functions[0].instructions.len(), 3);
    assert!(validate_block_graph(&state.functions[0]));
    assert!(state.errors.is_empty());
    assert!(state.tree.is_some());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_parse_failure_synthesizes_single_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Parse");
            then.status(500);
        })
        .await;

    let store = remote_store(&server);
    store.parse().await;

    let state = store.snapshot().await;
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].severity, Severity::Error);
    assert_eq!(state.errors[0].position, Position::START);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_parse_failure_keeps_previous_result() {
    let server = MockServer::start_async().await;
    let ok_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Parse");
            then.status(200).json_body(serde_json::json!({
                "ast": {
                    "type": "File",
                    "start": {"line": 1, "column": 1, "offset": 0},
                    "end": {"line": 3, "column": 15, "offset": 29}
                }
            }));
        })
        .await;

    let store = remote_store(&server);
    store.parse().await;
    assert!(store.snapshot().await.tree.is_some());

    // Only the error list is replaced on failure; the last usable
    // result stays visible.
    ok_mock.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Parse");
            then.status(502);
        })
        .await;
    store.parse().await;

    let state = store.snapshot().await;
    assert_eq!(state.errors.len(), 1);
    assert!(state.tree.is_some());
}

#[tokio::test]
async fn test_load_from_unknown_token_leaves_code_unchanged() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Load");
            then.status(404);
        })
        .await;

    let store = remote_store(&server);
    let code_before = store.snapshot().await.code;
    store.load_from_token("unknown-token").await;

    let state = store.snapshot().await;
    assert!(!state.errors.is_empty());
    assert!(state.errors[0].message.contains("unknown-token"));
    assert_eq!(state.code, code_before);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_load_from_token_restores_code_and_chains_parse() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parser.v1.ParserService/Load")
                .json_body_includes(r#"{"hash": "AbC123"}"#);
            then.status(200)
                .json_body(serde_json::json!({"code": HELLO_SOURCE}));
        })
        .await;
    let parse_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parser.v1.ParserService/Parse")
                .json_body_includes(format!(r#"{{"code": {}}}"#, serde_json::json!(HELLO_SOURCE)));
            then.status(200).body("{}");
        })
        .await;

    let store = remote_store(&server);
    store.load_from_token("AbC123").await;

    let state = store.snapshot().await;
    assert_eq!(state.code, HELLO_SOURCE);
    assert!(state.errors.is_empty());
    assert!(!state.loading);
    parse_mock.assert_async().await;
}

#[tokio::test]
async fn test_share_round_trip_preserves_source() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Share");
            then.status(200)
                .json_body(serde_json::json!({"hash": "roundtrip"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/parser.v1.ParserService/Load")
                .json_body_includes(r#"{"hash": "roundtrip"}"#);
            then.status(200)
                .json_body(serde_json::json!({"code": HELLO_SOURCE}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Parse");
            then.status(200).body("{}");
        })
        .await;

    let store = remote_store(&server);
    store.set_code(HELLO_SOURCE).await;
    let token = store.share().await.unwrap();

    store.set_code("garbage").await;
    store.load_from_token(&token).await;
    assert_eq!(store.snapshot().await.code, HELLO_SOURCE);
}

#[tokio::test]
async fn test_share_failure_is_reraised_with_loading_cleared() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Share");
            then.status(503);
        })
        .await;

    let store = remote_store(&server);
    let err = store.share().await.unwrap_err();
    assert!(matches!(err, BackendError::Status(_)));
    assert!(!store.snapshot().await.loading);
}

#[tokio::test]
async fn test_selected_instruction_highlight_has_fixed_width() {
    let store = local_store();
    store.parse().await;
    store.set_selected_instruction(Some(2)).await;

    let spans = store.highlights().await;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].start, Position::new(7, 3, 0));
    assert_eq!(spans[0].end.line, 7);
    assert_eq!(spans[0].end.column, 3 + INSTRUCTION_HIGHLIGHT_WIDTH);
}

#[tokio::test]
async fn test_stale_selection_degrades_to_no_highlight() {
    let store = local_store();
    store.parse().await;
    store.set_selected_instruction(Some(42)).await;
    assert!(store.highlights().await.is_empty());
}

#[tokio::test]
async fn test_node_selection_highlights_its_own_span() {
    let store = local_store();
    store.parse().await;

    let tree = store.snapshot().await.tree.unwrap();
    let span = tree.span();
    store.set_selected_node(Some(tree)).await;

    let spans = store.highlights().await;
    assert_eq!(spans, vec![span]);
}

#[tokio::test]
async fn test_overlapping_parses_settle_with_loading_cleared() {
    let store = local_store();
    store.set_code(HELLO_SOURCE).await;

    // No generation guard: overlapping parses apply in completion
    // order. Whatever that order, the store must settle consistently.
    let calls = (0..8).map(|_| {
        let store = store.clone();
        async move { store.parse().await }
    });
    futures::future::join_all(calls).await;

    let state = store.snapshot().await;
    assert_eq!(state.functions.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_bootstrap_with_share_param_restores_session() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Load");
            then.status(200)
                .json_body(serde_json::json!({"code": HELLO_SOURCE}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/parser.v1.ParserService/Parse");
            then.status(200).body("{}");
        })
        .await;

    let store = remote_store(&server);
    store.bootstrap(Some("AbC123")).await;
    assert_eq!(store.snapshot().await.code, HELLO_SOURCE);
}

#[tokio::test]
async fn test_config_wires_local_strategy_through_staged_loader() {
    let config = astviz_session::Config {
        strategy: astviz_session::Strategy::Local,
        ..Default::default()
    };
    let (loader, signals) = config.staged_loader();
    signals.shim_loaded();
    signals.register_module(Arc::new(StubModule));

    let store = config.build_store(Some(Arc::new(loader))).unwrap();
    store.parse().await;
    assert_eq!(store.snapshot().await.functions.len(), 1);
}

#[tokio::test]
async fn test_bootstrap_without_share_param_keeps_example_source() {
    let store = local_store();
    store.bootstrap(None).await;

    let state = store.snapshot().await;
    assert_eq!(state.code, astviz_session::EXAMPLE_SOURCE);
    assert!(state.tree.is_none());
}
