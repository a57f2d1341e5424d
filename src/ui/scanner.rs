use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;

/// Substring whose presence means a buffer may carry a renderable tool call.
pub const TOOL_NAME_PREFIX: &str = "show_component_";
pub const TOOL_ENVELOPE_TYPE: &str = "tool";

static ENVELOPE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\s*"type"\s*:\s*"tool"\s*,"#).expect("envelope pattern should compile")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallFragment {
    /// Component name with the `show_component_` prefix removed.
    pub kind_name: String,
    pub args: Map<String, Value>,
    /// Byte range of the whole object inside the scanned buffer.
    pub span: Range<usize>,
}

pub fn contains_marker(text: &str) -> bool {
    text.contains(TOOL_NAME_PREFIX)
}

/// Finds every complete tool-call object in `text`, left to right.
///
/// Candidates start at each `{"type":"tool",` envelope. A candidate whose braces
/// do not close inside the buffer, or whose text is not valid JSON, is skipped and
/// scanning resumes right after its opening brace, so one broken fragment never
/// hides the ones around it. A valid object is consumed whole, which makes an
/// outer object win over any envelope embedded inside it.
pub fn scan(text: &str) -> Vec<ToolCallFragment> {
    let mut fragments = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let Some(found) = ENVELOPE_START.find_at(text, cursor) else {
            break;
        };
        let start = found.start();

        let Some(end) = matching_close(text, start) else {
            tracing::debug!(position = start, "tool call not closed yet");
            cursor = start + 1;
            continue;
        };

        let value: Value = match serde_json::from_str(&text[start..end]) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(position = start, "skipping malformed tool call: {err}");
                cursor = start + 1;
                continue;
            }
        };

        match fragment_from_value(value, start..end) {
            Some(fragment) => fragments.push(fragment),
            None => tracing::debug!(position = start, "ignoring non-renderable tool object"),
        }
        cursor = end;
    }

    fragments
}

fn fragment_from_value(value: Value, span: Range<usize>) -> Option<ToolCallFragment> {
    let Value::Object(mut envelope) = value else {
        return None;
    };
    if envelope.get("type").and_then(Value::as_str) != Some(TOOL_ENVELOPE_TYPE) {
        return None;
    }
    let kind_name = envelope
        .get("name")
        .and_then(Value::as_str)?
        .strip_prefix(TOOL_NAME_PREFIX)?
        .to_string();
    let Some(Value::Object(args)) = envelope.remove("args") else {
        return None;
    };
    Some(ToolCallFragment {
        kind_name,
        args,
        span,
    })
}

/// Byte offset just past the brace closing the object opened at `start`.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Assistant text with the tool-call JSON removed, for the message list.
pub fn display_text(text: &str) -> String {
    let fragments = scan(text);
    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0;
    for fragment in &fragments {
        cleaned.push_str(&text[cursor..fragment.span.start]);
        cursor = fragment.span.end;
    }
    cleaned.push_str(&text[cursor..]);

    let cleaned = cleaned
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if cleaned.is_empty() && contains_marker(text) {
        "Generated interactive components".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str, args: Value) -> String {
        format!(r#"{{"type":"tool","name":"show_component_{name}","args":{args}}}"#)
    }

    fn kinds(fragments: &[ToolCallFragment]) -> Vec<&str> {
        fragments
            .iter()
            .map(|fragment| fragment.kind_name.as_str())
            .collect()
    }

    #[test]
    fn finds_multiple_fragments_on_one_line_and_across_lines() {
        let text = format!(
            "Here you go: {} and {}\n{}",
            tool("MetricCard", json!({"title": "Revenue"})),
            tool("StatusBadge", json!({"label": "Health"})),
            "{\"type\":\"tool\",\n  \"name\":\"show_component_GraphCard\",\n  \"args\":{\n    \"title\":\"Trend\"\n  }\n}"
        );
        let fragments = scan(&text);
        assert_eq!(kinds(&fragments), vec!["MetricCard", "StatusBadge", "GraphCard"]);
        assert_eq!(fragments[0].args.get("title"), Some(&json!("Revenue")));
        assert_eq!(fragments[2].args.get("title"), Some(&json!("Trend")));
    }

    #[test]
    fn braces_and_quotes_inside_strings_do_not_end_the_object() {
        let fragment = tool(
            "InsightCard",
            json!({"title": "Q1 {draft} \"final\" \\ done }", "insight": "x"}),
        );
        let text = format!("prefix {fragment} suffix");
        let fragments = scan(&text);
        assert_eq!(fragments.len(), 1);
        assert_eq!(
            fragments[0].args.get("title"),
            Some(&json!("Q1 {draft} \"final\" \\ done }"))
        );
        assert_eq!(&text[fragments[0].span.clone()], fragment);
    }

    #[test]
    fn malformed_fragment_between_valid_ones_is_isolated() {
        let text = format!(
            "{}\n{}\n{}",
            tool("MetricCard", json!({"title": "A"})),
            r#"{"type":"tool","name":"show_component_MetricCard","args":{"title":}}"#,
            tool("MetricCard", json!({"title": "B"})),
        );
        let fragments = scan(&text);
        let titles: Vec<_> = fragments
            .iter()
            .map(|fragment| fragment.args.get("title").cloned())
            .collect();
        assert_eq!(titles, vec![Some(json!("A")), Some(json!("B"))]);
    }

    #[test]
    fn unclosed_fragment_does_not_swallow_later_fragments() {
        let text = format!(
            "{}\n{}",
            r#"{"type":"tool","name":"show_component_MetricCard","args":{"title":"lost""#,
            tool("GraphCard", json!({"title": "kept"})),
        );
        let fragments = scan(&text);
        assert_eq!(kinds(&fragments), vec!["GraphCard"]);
    }

    #[test]
    fn truncated_buffer_yields_nothing() {
        let text = r#"Here's your data: {"type":"tool","name":"show_component_MetricCard","args":{"title":"Re"#;
        assert!(scan(text).is_empty());
        assert!(contains_marker(text));
    }

    #[test]
    fn embedded_envelope_resolves_to_outer_object() {
        let text = r#"{"type":"tool","name":"show_component_InsightCard","args":{"title":"Outer","example":{"type":"tool","name":"show_component_MetricCard","args":{}}}}"#;
        let fragments = scan(text);
        assert_eq!(kinds(&fragments), vec!["InsightCard"]);
        assert_eq!(fragments[0].span, 0..text.len());
    }

    #[test]
    fn non_renderable_objects_are_discarded() {
        let text = format!(
            "{} {} {} {}",
            r#"{"type":"tool","name":"lookup_weather","args":{}}"#,
            r#"{"type":"tool","name":"show_component_MetricCard","args":"oops"}"#,
            r#"{"type":"tool","name":"show_component_MetricCard"}"#,
            tool("AlertList", json!({})),
        );
        assert_eq!(kinds(&scan(&text)), vec!["AlertList"]);
    }

    #[test]
    fn envelope_match_tolerates_whitespace() {
        let text = r#"{ "type" : "tool", "name": "show_component_StatusBadge", "args": {"label": "API"} }"#;
        assert_eq!(kinds(&scan(text)), vec!["StatusBadge"]);
    }

    #[test]
    fn multibyte_text_around_fragments_is_handled() {
        let text = format!(
            "Résumé – 📈 {} fin ✅",
            tool("MetricCard", json!({"title": "Umsatz €"}))
        );
        let fragments = scan(&text);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].args.get("title"), Some(&json!("Umsatz €")));
    }

    #[test]
    fn display_text_strips_tool_json() {
        let text = format!(
            "Tesla revenue metrics analysis:\n{}\n{}",
            tool("MetricCard", json!({"title": "A"})),
            tool("GraphCard", json!({"title": "B"})),
        );
        assert_eq!(display_text(&text), "Tesla revenue metrics analysis:");

        let only_tools = tool("MetricCard", json!({"title": "A"}));
        assert_eq!(display_text(&only_tools), "Generated interactive components");
        assert_eq!(display_text("plain answer"), "plain answer");
    }
}
