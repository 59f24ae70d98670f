//! SVG markup to React function component.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ToolError;

pub const DEFAULT_COMPONENT_NAME: &str = "IconComponent";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static KEBAB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-([a-z])").unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Wrap `svg` in a TypeScript React component called `name`.
///
/// The markup is collapsed onto one line, `-x` attribute spellings become
/// camelCase, `class=` becomes `className=`, and the root `<svg` gets
/// `width`, `height` and `className` props (defaults 24, 24 and `''`).
pub fn svg_to_component(svg: &str, name: &str) -> Result<String, ToolError> {
    if !svg.contains("<svg") {
        return Err(ToolError::InvalidSvg);
    }
    if !IDENTIFIER.is_match(name) {
        return Err(ToolError::InvalidComponentName {
            name: name.to_owned(),
        });
    }

    let clean = WHITESPACE.replace_all(svg, " ");
    let clean = KEBAB.replace_all(clean.trim(), |caps: &regex::Captures<'_>| {
        caps[1].to_ascii_uppercase()
    });
    let clean = clean.replace("class=", "className=");
    let clean = clean.replacen(
        "<svg",
        "<svg width={width} height={height} className={className}",
        1,
    );

    Ok(format!(
        "import React from 'react';

interface {name}Props {{
  className?: string;
  width?: number | string;
  height?: number | string;
}}

const {name}: React.FC<{name}Props> = ({{
  className = '',
  width = 24,
  height = 24
}}) => {{
  return (
    {clean}
  );
}};

export default {name};
"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
    viewBox="0 0 24 24" class="icon">
  <path stroke-width="2" stroke-linecap="round" d="M4 12h16"/>
</svg>"#;

    #[test]
    fn converts_attributes_and_injects_props() {
        let out = svg_to_component(ICON, "MenuIcon").unwrap();
        assert!(out.contains(
            r#"<svg width={width} height={height} className={className} xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" className="icon"> <path strokeWidth="2" strokeLinecap="round" d="M4 12h16"/> </svg>"#
        ));
        assert!(out.starts_with("import React from 'react';\n\ninterface MenuIconProps {"));
        assert!(out.contains("const MenuIcon: React.FC<MenuIconProps> = ({"));
        assert!(out.ends_with("export default MenuIcon;\n"));
    }

    #[test]
    fn only_the_root_svg_gets_props() {
        let out = svg_to_component("<svg><svg/></svg>", DEFAULT_COMPONENT_NAME).unwrap();
        assert_eq!(out.matches("width={width}").count(), 1);
        assert!(out.contains("<svg width={width} height={height} className={className}><svg/></svg>"));
    }

    #[test]
    fn rejects_non_svg_input() {
        let err = svg_to_component("<div/>", "X").unwrap_err();
        assert_eq!(err, ToolError::InvalidSvg);
        assert_eq!(err.to_string(), "Invalid SVG format. Please check your input.");
    }

    #[test]
    fn rejects_bad_component_names() {
        for name in ["", "1Icon", "my-icon", "a b"] {
            assert!(
                matches!(
                    svg_to_component("<svg/>", name),
                    Err(ToolError::InvalidComponentName { .. })
                ),
                "{name:?} accepted"
            );
        }
    }
}
