use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Args keys starting with this marker are bookkeeping and never reach props.
pub const PRIVATE_FIELD_PREFIX: char = '_';
const ORIGIN_SUBJECT_FIELD: &str = "_company";
const ORIGIN_CONTEXT_FIELD: &str = "_queryContext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Metric,
    Graph,
    Table,
    Comparison,
    Insight,
    Alert,
    Status,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        Self::Metric,
        Self::Graph,
        Self::Table,
        Self::Comparison,
        Self::Insight,
        Self::Alert,
        Self::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Graph => "graph",
            Self::Table => "table",
            Self::Comparison => "comparison",
            Self::Insight => "insight",
            Self::Alert => "alert",
            Self::Status => "status",
        }
    }

    /// Component name used by the tool-call wire format.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Metric => "MetricCard",
            Self::Graph => "GraphCard",
            Self::Table => "BusinessSummaryTable",
            Self::Comparison => "ComparisonCard",
            Self::Insight => "InsightCard",
            Self::Alert => "AlertList",
            Self::Status => "StatusBadge",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provenance carried in private args, kept beside the props instead of in them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_context: Option<String>,
}

/// Removes every private field from `args`, lifting the provenance ones into an [`Origin`].
pub fn split_origin(args: &Map<String, Value>) -> (Map<String, Value>, Origin) {
    let mut cleaned = Map::new();
    let mut origin = Origin::default();
    for (key, value) in args {
        if !key.starts_with(PRIVATE_FIELD_PREFIX) {
            cleaned.insert(key.clone(), value.clone());
            continue;
        }
        match key.as_str() {
            ORIGIN_SUBJECT_FIELD => origin.subject = non_empty_text(value),
            ORIGIN_CONTEXT_FIELD => origin.query_context = non_empty_text(value),
            _ => {}
        }
    }
    (cleaned, origin)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    #[default]
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    #[default]
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Better,
    Worse,
    Same,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricProps {
    pub title: String,
    pub value: String,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub precision: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphProps {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub item: String,
    pub value: String,
    pub status: StatusLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProps {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetric {
    pub name: String,
    pub left_value: String,
    pub right_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonProps {
    pub title: String,
    pub left_label: String,
    pub left_value: String,
    pub right_label: String,
    pub right_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_change: Option<String>,
    pub verdict: Verdict,
    pub metrics: Vec<ComparisonMetric>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightProps {
    pub title: String,
    pub insight: String,
    pub severity: Severity,
    pub recommendations: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub level: AlertLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertListProps {
    pub title: String,
    pub alerts: Vec<AlertItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusProps {
    pub label: String,
    pub status: StatusLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidatedProps {
    Metric(MetricProps),
    Graph(GraphProps),
    Table(TableProps),
    Comparison(ComparisonProps),
    Insight(InsightProps),
    Alert(AlertListProps),
    Status(StatusProps),
}

impl ValidatedProps {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Metric(_) => ComponentKind::Metric,
            Self::Graph(_) => ComponentKind::Graph,
            Self::Table(_) => ComponentKind::Table,
            Self::Comparison(_) => ComponentKind::Comparison,
            Self::Insight(_) => ComponentKind::Insight,
            Self::Alert(_) => ComponentKind::Alert,
            Self::Status(_) => ComponentKind::Status,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Metric(props) => &props.title,
            Self::Graph(props) => &props.title,
            Self::Table(props) => &props.title,
            Self::Comparison(props) => &props.title,
            Self::Insight(props) => &props.title,
            Self::Alert(props) => &props.title,
            Self::Status(props) => &props.label,
        }
    }

    /// The value that, with kind and title, identifies the same logical component.
    pub fn primary_value(&self) -> String {
        match self {
            Self::Metric(props) => props.value.clone(),
            Self::Status(props) => format!(
                "{}|{}",
                status_token(props.status),
                props.value.as_deref().unwrap_or("")
            ),
            Self::Comparison(props) => format!("{}|{}", props.left_value, props.right_value),
            Self::Insight(props) => props.insight.clone(),
            Self::Graph(_) | Self::Table(_) | Self::Alert(_) => self.to_map_value().to_string(),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match self.to_map_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn to_map_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn status_token(status: StatusLevel) -> &'static str {
    match status {
        StatusLevel::Success => "success",
        StatusLevel::Warning => "warning",
        StatusLevel::Error => "error",
    }
}

/// Lenient, never-failing props normalization for one component kind.
pub fn validate(kind: ComponentKind, args: &Map<String, Value>) -> ValidatedProps {
    match kind {
        ComponentKind::Metric => ValidatedProps::Metric(validate_metric(args)),
        ComponentKind::Graph => ValidatedProps::Graph(validate_graph(args)),
        ComponentKind::Table => ValidatedProps::Table(validate_table(args)),
        ComponentKind::Comparison => ValidatedProps::Comparison(validate_comparison(args)),
        ComponentKind::Insight => ValidatedProps::Insight(validate_insight(args)),
        ComponentKind::Alert => ValidatedProps::Alert(validate_alert_list(args)),
        ComponentKind::Status => ValidatedProps::Status(validate_status(args)),
    }
}

fn validate_metric(args: &Map<String, Value>) -> MetricProps {
    MetricProps {
        title: text_or(args, "title", "Business Metric"),
        value: text_or(args, "value", "N/A"),
        trend: args
            .get("trend")
            .and_then(Value::as_str)
            .map(normalize_trend)
            .unwrap_or_default(),
        change: optional_text(args, "change"),
        period: optional_text(args, "period"),
        subtitle: optional_text(args, "subtitle"),
        unit: optional_text(args, "unit"),
        color: optional_text(args, "color"),
        precision: number_in_range(args, "precision", 0.0, 4.0, 2.0) as u8,
    }
}

fn validate_graph(args: &Map<String, Value>) -> GraphProps {
    GraphProps {
        title: text_or(args, "title", "Business Trend"),
        chart_type: args
            .get("type")
            .and_then(Value::as_str)
            .map(normalize_chart_type)
            .unwrap_or_default(),
        data: object_list(args, "data")
            .map(|point| DataPoint {
                label: text_or(point, "label", ""),
                value: point
                    .get("value")
                    .and_then(lenient_number)
                    .unwrap_or(0.0),
            })
            .collect(),
        x_axis_label: optional_text(args, "xAxisLabel"),
        y_axis_label: optional_text(args, "yAxisLabel"),
    }
}

fn validate_table(args: &Map<String, Value>) -> TableProps {
    let columns = string_list(args, "columns");
    TableProps {
        title: text_or(args, "title", "Business Summary"),
        columns: if columns.is_empty() {
            vec!["Metric".to_string(), "Value".to_string(), "Status".to_string()]
        } else {
            columns
        },
        rows: object_list(args, "rows")
            .map(|row| TableRow {
                item: text_or(row, "item", "Metric"),
                value: text_or(row, "value", "N/A"),
                status: row
                    .get("status")
                    .and_then(Value::as_str)
                    .map(normalize_row_status)
                    .unwrap_or_default(),
                change: optional_text(row, "change"),
            })
            .collect(),
    }
}

fn validate_comparison(args: &Map<String, Value>) -> ComparisonProps {
    ComparisonProps {
        title: text_or(args, "title", "Business Comparison"),
        left_label: text_or(args, "leftLabel", "Current Period"),
        left_value: text_or(args, "leftValue", "$50,000"),
        right_label: text_or(args, "rightLabel", "Previous Period"),
        right_value: text_or(args, "rightValue", "$45,000"),
        difference: optional_text(args, "difference"),
        percentage_change: optional_text(args, "percentageChange"),
        verdict: args
            .get("verdict")
            .and_then(Value::as_str)
            .map(normalize_verdict)
            .unwrap_or_default(),
        metrics: object_list(args, "metrics")
            .map(|metric| ComparisonMetric {
                name: text_or(metric, "name", "Metric"),
                left_value: text_or(metric, "leftValue", "N/A"),
                right_value: text_or(metric, "rightValue", "N/A"),
                change: optional_text(metric, "change"),
            })
            .collect(),
        insights: string_list(args, "insights"),
    }
}

fn validate_insight(args: &Map<String, Value>) -> InsightProps {
    InsightProps {
        title: text_or(args, "title", "Business Insight"),
        insight: text_or(
            args,
            "insight",
            "Analyzing business performance data reveals opportunities for optimization.",
        ),
        severity: args
            .get("severity")
            .and_then(Value::as_str)
            .map(normalize_severity)
            .unwrap_or_default(),
        recommendations: string_list(args, "recommendations"),
        confidence: number_in_range(args, "confidence", 0.0, 100.0, 85.0),
    }
}

fn validate_alert_list(args: &Map<String, Value>) -> AlertListProps {
    AlertListProps {
        title: text_or(args, "title", "Business Alerts"),
        alerts: object_list(args, "alerts")
            .map(|alert| AlertItem {
                title: text_or(alert, "title", "System Alert"),
                description: optional_text(alert, "description"),
                level: alert
                    .get("level")
                    .and_then(Value::as_str)
                    .map(normalize_alert_level)
                    .unwrap_or_default(),
                timestamp: optional_text(alert, "timestamp"),
                action: optional_text(alert, "action"),
            })
            .collect(),
    }
}

fn validate_status(args: &Map<String, Value>) -> StatusProps {
    StatusProps {
        label: text_or(args, "label", "Business Status"),
        status: args
            .get("status")
            .and_then(Value::as_str)
            .map(normalize_badge_status)
            .unwrap_or_default(),
        value: optional_text(args, "value"),
        description: optional_text(args, "description"),
    }
}

fn normalized(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

fn any_word_starts_with(normalized: &str, stems: &[&str]) -> bool {
    words(normalized).any(|word| stems.iter().any(|stem| word.starts_with(stem)))
}

fn any_word_is(normalized: &str, terms: &[&str]) -> bool {
    terms.contains(&normalized) || words(normalized).any(|word| terms.contains(&word))
}

pub fn normalize_trend(raw: &str) -> Trend {
    let value = normalized(raw);
    if any_word_starts_with(
        &value,
        &[
            "up", "increas", "positive", "grow", "rise", "rising", "rose", "gain", "climb",
            "surg", "improv",
        ],
    ) {
        Trend::Up
    } else if any_word_starts_with(
        &value,
        &[
            "down", "decreas", "negative", "declin", "drop", "fall", "fell", "plummet", "loss",
            "lost", "shrink", "lower", "dip", "slump",
        ],
    ) {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

pub fn normalize_badge_status(raw: &str) -> StatusLevel {
    let value = normalized(raw);
    if any_word_is(
        &value,
        &["success", "healthy", "good", "optimal", "excellent", "ok", "operational"],
    ) {
        StatusLevel::Success
    } else if any_word_is(
        &value,
        &["warning", "caution", "moderate", "watch", "degraded"],
    ) {
        StatusLevel::Warning
    } else if any_word_is(
        &value,
        &["error", "critical", "failing", "failed", "poor", "bad", "down", "offline"],
    ) {
        StatusLevel::Error
    } else {
        StatusLevel::Success
    }
}

pub fn normalize_row_status(raw: &str) -> StatusLevel {
    let value = normalized(raw);
    if any_word_is(&value, &["success", "good", "positive", "achieved"]) {
        StatusLevel::Success
    } else if any_word_is(&value, &["warning", "caution", "watch", "moderate"]) {
        StatusLevel::Warning
    } else if any_word_is(&value, &["error", "critical", "negative", "missed"]) {
        StatusLevel::Error
    } else {
        StatusLevel::Success
    }
}

pub fn normalize_chart_type(raw: &str) -> ChartType {
    let value = normalized(raw);
    let has_any = |terms: &[&str]| terms.iter().any(|term| value.contains(term));
    if has_any(&["pie", "share", "percentage", "proportion"]) {
        ChartType::Pie
    } else if has_any(&["bar", "column", "comparison", "ranking"]) {
        ChartType::Bar
    } else {
        ChartType::Line
    }
}

pub fn normalize_severity(raw: &str) -> Severity {
    let value = normalized(raw);
    if any_word_is(&value, &["positive", "good", "favorable", "opportunity"]) {
        Severity::Positive
    } else if any_word_is(
        &value,
        &["negative", "bad", "unfavorable", "risk", "critical"],
    ) {
        Severity::Negative
    } else {
        Severity::Neutral
    }
}

pub fn normalize_verdict(raw: &str) -> Verdict {
    let value = normalized(raw);
    if any_word_is(&value, &["better", "improved"])
        || value.contains("increase")
        || value.contains("positive")
    {
        Verdict::Better
    } else if any_word_is(&value, &["worse", "declined"])
        || value.contains("decrease")
        || value.contains("negative")
    {
        Verdict::Worse
    } else if any_word_is(&value, &["same", "unchanged", "stable", "equal"]) {
        Verdict::Same
    } else {
        Verdict::Better
    }
}

pub fn normalize_alert_level(raw: &str) -> AlertLevel {
    let value = normalized(raw);
    if any_word_is(&value, &["critical", "urgent", "emergency", "high"]) {
        AlertLevel::Critical
    } else if any_word_is(&value, &["warning", "alert", "caution", "medium"]) {
        AlertLevel::Warning
    } else {
        AlertLevel::Info
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn text_or(args: &Map<String, Value>, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(non_empty_text)
        .unwrap_or_else(|| default.to_string())
}

fn optional_text(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(non_empty_text)
}

fn string_list(args: &Map<String, Value>, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(non_empty_text).collect())
        .unwrap_or_default()
}

fn object_list<'a>(
    args: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    args.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Parses numbers given as JSON numbers or as text such as `"$1,250.50"` or `"+12%"`.
pub fn lenient_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let cleaned: String = text
                .chars()
                .filter(|ch| !matches!(ch, '$' | '€' | '£' | '%' | ',') && !ch.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn number_in_range(args: &Map<String, Value>, key: &str, min: f64, max: f64, default: f64) -> f64 {
    args.get(key)
        .and_then(lenient_number)
        .filter(|value| (min..=max).contains(value))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("fixture should be an object")
    }

    fn metric(value: Value) -> MetricProps {
        match validate(ComponentKind::Metric, &args(value)) {
            ValidatedProps::Metric(props) => props,
            other => panic!("expected metric props, got {other:?}"),
        }
    }

    #[test]
    fn fuzzy_trend_normalization() {
        assert_eq!(metric(json!({"trend": "Increasing"})).trend, Trend::Up);
        assert_eq!(metric(json!({"trend": "plummeted"})).trend, Trend::Down);
        assert_eq!(metric(json!({"trend": "???"})).trend, Trend::Neutral);
        assert_eq!(metric(json!({"trend": "  Strong GROWTH "})).trend, Trend::Up);
        assert_eq!(metric(json!({"trend": "supply constrained"})).trend, Trend::Neutral);
        assert_eq!(metric(json!({})).trend, Trend::Neutral);
    }

    #[test]
    fn missing_metric_fields_get_defaults() {
        let props = metric(json!({"title": "   ", "value": 245000}));
        assert_eq!(props.title, "Business Metric");
        assert_eq!(props.value, "245000");
        assert_eq!(props.precision, 2);
        assert!(props.change.is_none());
    }

    #[test]
    fn lenient_numbers_strip_symbols_and_enforce_ranges() {
        assert_eq!(lenient_number(&json!("$1,250.50")), Some(1250.5));
        assert_eq!(lenient_number(&json!("+12%")), Some(12.0));
        assert_eq!(lenient_number(&json!("n/a")), None);
        assert_eq!(lenient_number(&json!(true)), None);

        let insight = validate(
            ComponentKind::Insight,
            &args(json!({"confidence": "140%"})),
        );
        match insight {
            ValidatedProps::Insight(props) => assert_eq!(props.confidence, 85.0),
            other => panic!("expected insight props, got {other:?}"),
        }
        assert_eq!(metric(json!({"precision": "3"})).precision, 3);
        assert_eq!(metric(json!({"precision": 9})).precision, 2);
    }

    #[test]
    fn graph_points_are_normalized_element_wise() {
        let props = validate(
            ComponentKind::Graph,
            &args(json!({
                "title": "Revenue Trend",
                "type": "Area",
                "data": [
                    {"label": "Q1", "value": "$85.5"},
                    {"label": "Q2", "value": "oops"},
                    "not an object",
                    {"value": 3}
                ]
            })),
        );
        let ValidatedProps::Graph(graph) = props else {
            panic!("expected graph props");
        };
        assert_eq!(graph.chart_type, ChartType::Line);
        assert_eq!(
            graph.data,
            vec![
                DataPoint {
                    label: "Q1".to_string(),
                    value: 85.5
                },
                DataPoint {
                    label: "Q2".to_string(),
                    value: 0.0
                },
                DataPoint {
                    label: String::new(),
                    value: 3.0
                },
            ]
        );
        assert_eq!(normalize_chart_type("Market share"), ChartType::Pie);
        assert_eq!(normalize_chart_type("bar chart"), ChartType::Bar);
    }

    #[test]
    fn absent_arrays_become_empty_and_columns_default() {
        let ValidatedProps::Table(table) = validate(ComponentKind::Table, &Map::new()) else {
            panic!("expected table props");
        };
        assert!(table.rows.is_empty());
        assert_eq!(table.columns, vec!["Metric", "Value", "Status"]);

        let ValidatedProps::Alert(alerts) =
            validate(ComponentKind::Alert, &args(json!({"alerts": null})))
        else {
            panic!("expected alert props");
        };
        assert!(alerts.alerts.is_empty());
        assert_eq!(alerts.title, "Business Alerts");
    }

    #[test]
    fn enum_fields_fall_back_to_safe_defaults() {
        assert_eq!(normalize_badge_status("Healthy"), StatusLevel::Success);
        assert_eq!(normalize_badge_status("degraded"), StatusLevel::Warning);
        assert_eq!(normalize_badge_status("FAILING"), StatusLevel::Error);
        assert_eq!(normalize_badge_status("mystery"), StatusLevel::Success);
        assert_eq!(normalize_row_status("missed"), StatusLevel::Error);
        assert_eq!(normalize_severity("Opportunity"), Severity::Positive);
        assert_eq!(normalize_severity("risk"), Severity::Negative);
        assert_eq!(normalize_severity("hmm"), Severity::Neutral);
        assert_eq!(normalize_verdict("revenue increased"), Verdict::Better);
        assert_eq!(normalize_verdict("Declined"), Verdict::Worse);
        assert_eq!(normalize_verdict("unchanged"), Verdict::Same);
        assert_eq!(normalize_verdict("???"), Verdict::Better);
        assert_eq!(normalize_alert_level("URGENT"), AlertLevel::Critical);
        assert_eq!(normalize_alert_level("medium"), AlertLevel::Warning);
        assert_eq!(normalize_alert_level(""), AlertLevel::Info);
    }

    #[test]
    fn private_fields_are_stripped_and_origin_lifted() {
        let raw = args(json!({
            "title": "Tesla Revenue",
            "_tambo_displayMessage": "Rendering",
            "_tambo_id": "abc",
            "_company": "Tesla",
            "_queryContext": "show tesla revenue"
        }));
        let (cleaned, origin) = split_origin(&raw);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.keys().all(|key| !key.starts_with('_')));
        assert_eq!(origin.subject.as_deref(), Some("Tesla"));
        assert_eq!(origin.query_context.as_deref(), Some("show tesla revenue"));
    }

    #[test]
    fn revalidating_canonical_props_is_stable() {
        let first = validate(
            ComponentKind::Comparison,
            &args(json!({
                "title": "Q1 vs Q2",
                "leftValue": 200000,
                "verdict": "improved",
                "metrics": [{"name": "Margin", "leftValue": "12%", "rightValue": "14%"}]
            })),
        );
        let second = validate(ComponentKind::Comparison, &first.to_map());
        assert_eq!(first, second);
        assert_eq!(first.to_map().get("leftValue"), Some(&json!("200000")));
        assert_eq!(first.to_map().get("verdict"), Some(&json!("better")));
    }
}
