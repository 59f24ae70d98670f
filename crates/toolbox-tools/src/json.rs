//! JSON pretty-printing and a collapsible tree view.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ToolError;

/// Path of the top-level value in a [`JsonTree`].
pub const ROOT: &str = "root";

/// Pretty-print `input` with two-space indentation, keeping key order.
pub fn format(input: &str) -> Result<String, ToolError> {
    let value: Value = serde_json::from_str(input)?;
    Ok(format!("{value:#}"))
}

/// A parsed document plus the set of expanded container paths.
///
/// Paths are dotted: `root`, `root.<key>`, `root.<index>`, and so on down.
/// Every container starts collapsed.
#[derive(Debug, Clone)]
pub struct JsonTree {
    value: Value,
    expanded: HashSet<String>,
}

impl JsonTree {
    pub fn parse(input: &str) -> Result<Self, ToolError> {
        Ok(Self {
            value: serde_json::from_str(input)?,
            expanded: HashSet::new(),
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Two-space indented text of the whole document, for copying.
    pub fn pretty(&self) -> String {
        format!("{:#}", self.value)
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Flip `path` between expanded and collapsed; returns the new state.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_owned());
            true
        }
    }

    pub fn expand(&mut self, path: &str) {
        self.expanded.insert(path.to_owned());
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    /// Expand every non-empty container in the document.
    pub fn expand_all(&mut self) {
        let mut paths = Vec::new();
        collect_containers(&self.value, ROOT, &mut paths);
        self.expanded.extend(paths);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Text rendering of the tree in its current expansion state.
    ///
    /// Collapsed containers show as `▸ [ … ] N items`; expanded ones as `▾ [`
    /// followed by their children, one per line, indented two spaces.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(&self.value, ROOT, 0, "", "", &mut out);
        out
    }

    fn render_node(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
        label: &str,
        comma: &str,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        let (open, close, children): (&str, &str, Vec<(String, String, &Value)>) = match value {
            Value::Array(items) => (
                "[",
                "]",
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (String::new(), format!("{path}.{i}"), v))
                    .collect(),
            ),
            Value::Object(map) => (
                "{",
                "}",
                map.iter()
                    .map(|(k, v)| (format!("{}: ", Value::from(k.as_str())), format!("{path}.{k}"), v))
                    .collect(),
            ),
            scalar => {
                out.push_str(&format!("{indent}{label}{scalar}{comma}\n"));
                return;
            }
        };

        if children.is_empty() {
            out.push_str(&format!("{indent}{label}{open}{close}{comma}\n"));
            return;
        }
        if !self.is_expanded(path) {
            let noun = if children.len() == 1 { "item" } else { "items" };
            out.push_str(&format!(
                "{indent}{label}▸ {open} … {close} {} {noun}{comma}\n",
                children.len()
            ));
            return;
        }

        out.push_str(&format!("{indent}{label}▾ {open}\n"));
        let last = children.len() - 1;
        for (i, (child_label, child_path, child)) in children.iter().enumerate() {
            let sep = if i < last { "," } else { "" };
            self.render_node(child, child_path, depth + 1, child_label, sep, out);
        }
        out.push_str(&format!("{indent}{close}{comma}\n"));
    }
}

fn collect_containers(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::Array(items) if !items.is_empty() => {
            out.push(path.to_owned());
            for (i, v) in items.iter().enumerate() {
                collect_containers(v, &format!("{path}.{i}"), out);
            }
        }
        Value::Object(map) if !map.is_empty() => {
            out.push(path.to_owned());
            for (k, v) in map {
                collect_containers(v, &format!("{path}.{k}"), out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"zeta":1,"alpha":[true,null],"nested":{"s":"x\"y"},"empty":[]}"#;

    #[test]
    fn format_indents_two_spaces_and_keeps_order() {
        let out = format(r#"{"b":1,"a":[1,2]}"#).unwrap();
        assert_eq!(out, "{\n  \"b\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn format_reports_position_of_errors() {
        let err = format("{\n  \"a\": }").unwrap_err();
        match &err {
            ToolError::InvalidJson { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Invalid JSON"));
    }

    #[test]
    fn everything_starts_collapsed() {
        let tree = JsonTree::parse(DOC).unwrap();
        assert!(!tree.is_expanded(ROOT));
        assert_eq!(tree.render(), "▸ { … } 4 items\n");
    }

    #[test]
    fn toggle_flips_one_path() {
        let mut tree = JsonTree::parse(DOC).unwrap();
        assert!(tree.toggle(ROOT));
        assert_eq!(
            tree.render(),
            "▾ {\n  \"zeta\": 1,\n  \"alpha\": ▸ [ … ] 2 items,\n  \"nested\": ▸ { … } 1 item,\n  \"empty\": []\n}\n"
        );
        assert!(!tree.toggle(ROOT));
        assert_eq!(tree.render(), "▸ { … } 4 items\n");
    }

    #[test]
    fn expand_all_opens_nested_containers() {
        let mut tree = JsonTree::parse(DOC).unwrap();
        tree.expand_all();
        assert!(tree.is_expanded("root.alpha"));
        assert!(tree.is_expanded("root.nested"));
        assert!(!tree.is_expanded("root.empty"));
        assert_eq!(
            tree.render(),
            "▾ {\n  \"zeta\": 1,\n  \"alpha\": ▾ [\n    true,\n    null\n  ],\n  \"nested\": ▾ {\n    \"s\": \"x\\\"y\"\n  },\n  \"empty\": []\n}\n"
        );

        tree.collapse("root.alpha");
        assert!(tree.render().contains("\"alpha\": ▸ [ … ] 2 items,"));
        tree.collapse_all();
        assert!(!tree.is_expanded("root.nested"));
    }

    #[test]
    fn array_children_use_index_paths() {
        let mut tree = JsonTree::parse(r#"[[1],[2,3]]"#).unwrap();
        tree.expand(ROOT);
        tree.expand("root.1");
        assert_eq!(
            tree.render(),
            "▾ [\n  ▸ [ … ] 1 item,\n  ▾ [\n    2,\n    3\n  ]\n]\n"
        );
    }

    #[test]
    fn scalars_render_on_one_line() {
        let tree = JsonTree::parse("42").unwrap();
        assert_eq!(tree.render(), "42\n");
        assert_eq!(tree.pretty(), "42");
    }
}
