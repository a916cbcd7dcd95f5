use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::ssa::Function;
use crate::tree::TreeNode;

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A parse or type-checking diagnostic reported by an engine, or
/// synthesized locally from a backend failure.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub severity: Severity,
}

impl ParseError {
    /// An error synthesized from a failure outside the analyzed source,
    /// pinned to the start of the document.
    pub fn internal(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            position: Position::START,
            severity: Severity::Error,
        }
    }
}

/// The outcome of one parse. An absent `tree` signals a parse that
/// produced no usable syntax tree. All fields default on decode so a
/// sparse response never surfaces as nulls downstream.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct ParseResult {
    #[serde(rename = "ast", default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
    #[serde(rename = "ssa", default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
}
