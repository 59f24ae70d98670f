//! Sandboxed JavaScript execution.

use boa_engine::{Context, JsError, Source};

use crate::error::ToolError;

/// Iterations any single loop may run before the script is aborted.
const LOOP_LIMIT: u64 = 1_000_000;
const RECURSION_LIMIT: usize = 512;

const OK_TAG: &str = "ok:";
const ERR_TAG: &str = "err:";

/// Run `code` as a function body and stringify what it returns.
///
/// Behaves like `String(new Function(code)())`: without a `return` the
/// result is `"undefined"`. A thrown `Error`, syntax errors included, comes
/// back as its message; any other thrown value as "An error occurred". The
/// engine has no host bindings, so scripts cannot reach files, the network
/// or the process.
pub fn execute(code: &str) -> Result<String, ToolError> {
    run(code, LOOP_LIMIT)
}

fn run(code: &str, loop_limit: u64) -> Result<String, ToolError> {
    let body = serde_json::to_string(code).map_err(|e| ToolError::Script {
        message: e.to_string(),
    })?;
    let wrapper = format!(
        r#"(function () {{
  try {{
    return "{OK_TAG}" + String(new Function({body})());
  }} catch (err) {{
    return "{ERR_TAG}" + (err instanceof Error ? err.message : "An error occurred");
  }}
}})()"#
    );

    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(loop_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(RECURSION_LIMIT);

    // Runtime-limit errors cannot be caught by the script and surface here.
    let value = context
        .eval(Source::from_bytes(wrapper.as_bytes()))
        .map_err(script_error)?;
    let text = value
        .to_string(&mut context)
        .map_err(script_error)?
        .to_std_string_escaped();

    match text.strip_prefix(OK_TAG) {
        Some(result) => Ok(result.to_owned()),
        None => Err(ToolError::Script {
            message: text.strip_prefix(ERR_TAG).unwrap_or(&text).to_owned(),
        }),
    }
}

fn script_error(e: JsError) -> ToolError {
    ToolError::Script {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<String, ToolError>) -> String {
        match result {
            Err(ToolError::Script { message }) => message,
            other => panic!("expected a script error, got {other:?}"),
        }
    }

    #[test]
    fn returns_stringified_value() {
        assert_eq!(execute("return 1 + 2").unwrap(), "3");
        assert_eq!(execute("return [1, 'a', null]").unwrap(), "1,a,");
        assert_eq!(execute("return {}").unwrap(), "[object Object]");
        assert_eq!(
            execute("let s = 0; for (let i = 1; i <= 10; i++) s += i; return s;").unwrap(),
            "55"
        );
    }

    #[test]
    fn missing_return_is_undefined() {
        assert_eq!(execute("").unwrap(), "undefined");
        assert_eq!(execute("const x = 5;").unwrap(), "undefined");
    }

    #[test]
    fn thrown_errors_report_their_message() {
        assert_eq!(message(execute("throw new Error('boom')")), "boom");
        assert!(!message(execute("null.x")).is_empty());
        assert_eq!(message(execute("throw 5")), "An error occurred");
    }

    #[test]
    fn syntax_errors_are_reported_not_raised() {
        assert!(!message(execute("return (")).is_empty());
    }

    #[test]
    fn code_cannot_escape_its_string() {
        // Quotes and newlines stay inside the function body.
        assert_eq!(execute("return \"a\\nb\" + '\"'").unwrap(), "a\nb\"");
        assert_eq!(execute("return typeof require").unwrap(), "undefined");
    }

    #[test]
    fn runaway_loops_are_stopped() {
        assert!(run("while (true) {}", 1_000).is_err());
    }
}
