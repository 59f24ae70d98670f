use thiserror::Error;

/// Errors raised by the peripheral tools.
///
/// The messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Invalid Base64 string")]
    InvalidBase64,

    #[error("Invalid JSON: {message} at line {line}, column {column}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid SVG format. Please check your input.")]
    InvalidSvg,

    /// The script threw, failed to parse or hit a runtime limit.
    #[error("{message}")]
    Script { message: String },

    #[error("invalid component name '{name}'")]
    InvalidComponentName { name: String },
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json appends its own position; keep only the description.
        let full = e.to_string();
        let message = match full.rfind(" at line ") {
            Some(idx) => full[..idx].to_owned(),
            None => full,
        };
        ToolError::InvalidJson {
            line: e.line(),
            column: e.column(),
            message,
        }
    }
}
