//! The catalogue of tools the toolbox offers.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    #[default]
    #[strum(serialize = "image-converter")]
    ImageConverter,
    #[strum(serialize = "svg-to-react")]
    SvgToReact,
    #[strum(serialize = "code-executor")]
    CodeExecutor,
    #[strum(serialize = "base64")]
    Base64,
    #[strum(serialize = "json-formatter")]
    JsonFormatter,
    #[strum(serialize = "string-calculator")]
    StringCalculator,
}

impl ToolId {
    /// Human-facing title.
    pub fn title(self) -> &'static str {
        match self {
            ToolId::ImageConverter => "Image to WebP",
            ToolId::SvgToReact => "SVG to React",
            ToolId::CodeExecutor => "JS Code Executor",
            ToolId::Base64 => "Base64 Tool",
            ToolId::JsonFormatter => "JSON Formatter",
            ToolId::StringCalculator => "String Calculator",
        }
    }

    pub fn category(self) -> Category {
        Category::Office
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[strum(serialize = "office")]
    Office,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::Office => "Digital Office",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolEntry {
    pub id: ToolId,
    pub name: &'static str,
    pub category: Category,
}

/// Every tool, in menu order.
pub fn registry() -> Vec<ToolEntry> {
    ToolId::iter()
        .map(|id| ToolEntry {
            id,
            name: id.title(),
            category: id.category(),
        })
        .collect()
}

/// Look up a tool by id, falling back to the default tool for unknown ids.
pub fn resolve(id: &str) -> ToolId {
    id.parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_roundtrip_through_strings() {
        for entry in registry() {
            let shown = entry.id.to_string();
            assert_eq!(shown.parse::<ToolId>().unwrap(), entry.id);
        }
        assert_eq!(ToolId::JsonFormatter.to_string(), "json-formatter");
    }

    #[test]
    fn registry_lists_tools_in_menu_order() {
        let names: Vec<_> = registry().iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            [
                "Image to WebP",
                "SVG to React",
                "JS Code Executor",
                "Base64 Tool",
                "JSON Formatter",
                "String Calculator"
            ]
        );
        assert!(registry().iter().all(|e| e.category.title() == "Digital Office"));
    }

    #[test]
    fn unknown_ids_fall_back_to_the_converter() {
        assert_eq!(resolve("base64"), ToolId::Base64);
        assert_eq!(resolve("code-executor"), ToolId::CodeExecutor);
        assert_eq!(resolve("unit-converter"), ToolId::ImageConverter);
        assert_eq!(resolve(""), ToolId::ImageConverter);
    }

    #[test]
    fn entries_serialize_with_kebab_ids() {
        let json = serde_json::to_value(registry()[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "svg-to-react", "name": "SVG to React", "category": "office" })
        );
    }
}
