use astviz_model::ParseResult;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Relative endpoint paths under the service base URL.
pub(crate) const PARSE_PATH: &str = "parser.v1.ParserService/Parse";
pub(crate) const SHARE_PATH: &str = "parser.v1.ParserService/Share";
pub(crate) const LOAD_PATH: &str = "parser.v1.ParserService/Load";

/// Input layout hint forwarded unchanged to whichever engine runs:
/// a single source file or a txtar-style archive.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum InputFormat {
    #[default]
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "txtar")]
    Archive,
}

#[derive(Serialize, Debug)]
pub(crate) struct ParseRequest<'a> {
    pub code: &'a str,
    pub format: InputFormat,
}

#[derive(Serialize, Debug)]
pub(crate) struct ShareRequest<'a> {
    pub code: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ShareResponse {
    pub hash: String,
}

#[derive(Serialize, Debug)]
pub(crate) struct LoadRequest<'a> {
    pub hash: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct LoadResponse {
    pub code: String,
}

/// What an in-process parse module hands back: either a parse result or
/// an `{error}` envelope. Decoding into this tagged type right at the
/// module boundary keeps untyped values out of the rest of the system.
///
/// `Failure` must stay first: an `{error}` body would otherwise satisfy
/// `ParseResult`'s all-default shape.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ModuleOutput {
    Failure { error: String },
    Success(ParseResult),
}

impl ModuleOutput {
    pub fn into_result(self) -> Result<ParseResult, BackendError> {
        match self {
            ModuleOutput::Failure { error } => Err(BackendError::ModuleRuntime(error)),
            ModuleOutput::Success(result) => Ok(result),
        }
    }
}
