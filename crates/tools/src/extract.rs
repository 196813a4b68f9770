//! Tool-call extraction — completed tool block in, structured call out.
//!
//! The input is the raw text between a tool block's open and close tags,
//! with the tool name already known from the block's open event. Inside,
//! parameters are flat `<param>…</param>` sub-tags with no further
//! nesting, matched against the tool's declared [`ToolSpec`]. Every
//! failure is a typed, human-readable [`ExtractError`]; malformed model
//! output must never panic.

use tagflow_core::error::ExtractError;
use tagflow_core::tool::ToolCall;

use crate::spec::{ParamKind, ToolRegistry, ToolSpec};

/// Extract a structured call from a completed tool block's raw content.
pub fn extract_tool_call(spec: &ToolSpec, raw: &str) -> Result<ToolCall, ExtractError> {
    let mut call = ToolCall::new(&spec.name);

    for param in &spec.params {
        let open = format!("<{}>", param.name);
        let close = format!("</{}>", param.name);

        let Some(start) = raw.find(&open) else {
            if param.required {
                return Err(ExtractError::MissingParameter {
                    tool: spec.name.clone(),
                    param: param.name.clone(),
                });
            }
            continue;
        };
        let body_start = start + open.len();
        let Some(len) = raw[body_start..].find(&close) else {
            return Err(ExtractError::UnterminatedParameter {
                tool: spec.name.clone(),
                param: param.name.clone(),
            });
        };
        let content = raw[body_start..body_start + len].trim();

        let value = match param.kind {
            ParamKind::Scalar => serde_json::Value::String(content.to_string()),
            ParamKind::Json => {
                serde_json::from_str(content).map_err(|err| ExtractError::MalformedJson {
                    tool: spec.name.clone(),
                    param: param.name.clone(),
                    reason: err.to_string(),
                })?
            }
        };
        call.params.insert(param.name.clone(), value);
    }

    Ok(call)
}

/// Registry-aware extraction: resolves the tool name first, so an
/// unrecognized tool surfaces as its own failure reason.
pub fn extract_from_registry(
    registry: &ToolRegistry,
    name: &str,
    raw: &str,
) -> Result<ToolCall, ExtractError> {
    let spec = registry
        .spec(name)
        .ok_or_else(|| ExtractError::UnknownTool(name.to_string()))?;
    extract_tool_call(spec, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ParamSpec;

    fn search_spec() -> ToolSpec {
        ToolSpec::new(
            "search",
            "Semantic knowledge-base search.",
            vec![
                ParamSpec::scalar("query"),
                ParamSpec::scalar("limit").optional(),
            ],
        )
    }

    #[test]
    fn extracts_scalar_parameter() {
        let call = extract_tool_call(&search_spec(), "<query>foo</query>").unwrap();
        assert_eq!(call.name, "search");
        assert_eq!(call.param_str("query"), Some("foo"));
        assert!(call.params.get("limit").is_none());
    }

    #[test]
    fn scalar_content_is_trimmed_verbatim() {
        let call =
            extract_tool_call(&search_spec(), "<query>  rust async traits \n</query>").unwrap();
        assert_eq!(call.param_str("query"), Some("rust async traits"));
    }

    #[test]
    fn optional_parameter_when_present() {
        let call = extract_tool_call(
            &search_spec(),
            "<query>foo</query><limit>5</limit>",
        )
        .unwrap();
        assert_eq!(call.param_str("limit"), Some("5"));
    }

    #[test]
    fn missing_required_parameter() {
        let err = extract_tool_call(&search_spec(), "<limit>5</limit>").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingParameter { ref tool, ref param }
                if tool == "search" && param == "query"
        ));
    }

    #[test]
    fn unterminated_parameter_tag() {
        let err = extract_tool_call(&search_spec(), "<query>foo").unwrap_err();
        assert!(matches!(err, ExtractError::UnterminatedParameter { .. }));
    }

    #[test]
    fn json_parameter_parses_lists() {
        let spec = ToolSpec::new(
            "lexical",
            "Keyword search.",
            vec![ParamSpec::json("terms")],
        );
        let call = extract_tool_call(&spec, r#"<terms>["alpha", "beta"]</terms>"#).unwrap();
        assert_eq!(
            call.params["terms"],
            serde_json::json!(["alpha", "beta"])
        );
    }

    #[test]
    fn malformed_json_is_descriptive_failure() {
        let spec = ToolSpec::new(
            "lexical",
            "Keyword search.",
            vec![ParamSpec::json("terms")],
        );
        let err = extract_tool_call(&spec, "<terms>[not json</terms>").unwrap_err();
        match err {
            ExtractError::MalformedJson { tool, param, reason } => {
                assert_eq!(tool, "lexical");
                assert_eq!(param, "terms");
                assert!(!reason.is_empty());
            }
            other => panic!("expected malformed json, got {other}"),
        }
    }

    #[test]
    fn undeclared_sub_tags_are_ignored() {
        let call = extract_tool_call(
            &search_spec(),
            "<query>foo</query><mystery>bar</mystery>",
        )
        .unwrap();
        assert_eq!(call.params.len(), 1);
    }

    #[test]
    fn unknown_tool_via_registry() {
        let registry = ToolRegistry::new();
        let err = extract_from_registry(&registry, "ghost", "<x>y</x>").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownTool(name) if name == "ghost"));
    }
}
