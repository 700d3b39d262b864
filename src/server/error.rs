use crate::{
    builder::BuildError,
    design::{LoadDesignError, StyleError},
    generate::GenerateError,
    pptx::PptxError,
};
use mcp_spec::handler::ToolError;

/// An error executing a tool call.
#[derive(thiserror::Error, Debug)]
pub enum ToolCallError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(serde_json::Error),

    #[error("presentation '{0}' is not open")]
    UnknownPresentation(String),

    #[error("loading design: {0}")]
    Design(#[from] LoadDesignError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Pptx(#[from] PptxError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl From<ToolCallError> for ToolError {
    fn from(error: ToolCallError) -> Self {
        match error {
            ToolCallError::UnknownTool(name) => ToolError::NotFound(name),
            ToolCallError::InvalidArguments(_) => ToolError::InvalidParameters(error.to_string()),
            other => ToolError::ExecutionError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tool_errors() {
        let invalid = serde_json::from_str::<u32>("\"x\"").expect_err("parse succeeded");
        let error = ToolError::from(ToolCallError::InvalidArguments(invalid));
        assert!(matches!(error, ToolError::InvalidParameters(_)));

        let error = ToolError::from(ToolCallError::UnknownTool("nope".into()));
        assert!(matches!(error, ToolError::NotFound(name) if name == "nope"));

        let error = ToolError::from(ToolCallError::Style(StyleError::UnknownLayout("nope".into())));
        assert!(matches!(error, ToolError::ExecutionError(message) if message == "layout 'nope' does not exist"));
    }
}
