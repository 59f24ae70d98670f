//! Small synchronous utilities exposed by the toolbox next to the image
//! converter: Base64, JSON formatting, text statistics, SVG-to-component
//! conversion and sandboxed JavaScript, plus the registry that names them.

pub mod base64;
pub mod error;
pub mod json;
pub mod registry;
pub mod script;
pub mod svg;
pub mod text;

pub use error::ToolError;
pub use registry::{Category, ToolEntry, ToolId};
