use crate::config::DashboardConfig;
use crate::error::AssistantError;
use crate::event::AppEvent;
use crate::ui::intent::{display_name, subjects_in};
use crate::ui::scanner::{TOOL_ENVELOPE_TYPE, TOOL_NAME_PREFIX};
use crate::ui::schema::ComponentKind;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::mpsc;
use tokio::runtime::Handle;
use tokio::time::{self, Duration};

const QUERY_CONTEXT_CHARS: usize = 50;

/// Offline stand-in for the chat backend. Fabricates a reply with embedded tool
/// calls and streams it back in small chunks.
#[derive(Clone)]
pub struct DemoAssistant {
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    chunk_delay: Duration,
    chunk_chars: usize,
}

impl DemoAssistant {
    pub fn new(tx: mpsc::Sender<AppEvent>, config: &DashboardConfig) -> Result<Self, AssistantError> {
        let runtime_handle =
            Handle::try_current().map_err(|err| AssistantError::RuntimeUnavailable(err.to_string()))?;
        Ok(Self {
            tx,
            runtime_handle,
            chunk_delay: config.demo_chunk_delay(),
            chunk_chars: config.demo_chunk_chars.max(1),
        })
    }

    pub fn send(&self, message_id: String, prompt: String) {
        let tx = self.tx.clone();
        let delay = self.chunk_delay;
        let chunk_chars = self.chunk_chars;

        self.runtime_handle.spawn(async move {
            let reply = compose_reply(&prompt);
            tracing::debug!(message = %message_id, len = reply.len(), "streaming demo reply");
            for chunk in chunk_text(&reply, chunk_chars) {
                time::sleep(delay).await;
                let event = AppEvent::StreamDelta {
                    message_id: message_id.clone(),
                    text: chunk,
                };
                if tx.send(event).is_err() {
                    tracing::debug!(message = %message_id, "app closed while streaming");
                    return;
                }
            }
            let _ = tx.send(AppEvent::StreamEnd { message_id });
        });
    }
}

fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[derive(Serialize)]
struct ToolCall {
    #[serde(rename = "type")]
    envelope: &'static str,
    name: String,
    args: Value,
}

impl ToolCall {
    fn new(kind: ComponentKind, args: Value) -> Self {
        Self {
            envelope: TOOL_ENVELOPE_TYPE,
            name: format!("{TOOL_NAME_PREFIX}{}", kind.wire_name()),
            args,
        }
    }
}

/// Figures derived deterministically from a company name.
#[derive(Debug, Clone, PartialEq)]
struct CompanyProfile {
    name: String,
    color: &'static str,
    base_revenue: u32,
    growth: u32,
}

impl CompanyProfile {
    fn for_name(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let hash: u32 = lowered.chars().map(u32::from).sum();
        Self {
            name: display_name(raw),
            color: company_color(&lowered, hash),
            base_revenue: 100 + hash % 900,
            growth: 5 + hash % 20,
        }
    }

    fn revenue_billions(&self) -> f64 {
        f64::from(self.base_revenue) / 10.0
    }

    fn revenue(&self) -> String {
        format!("${:.1}B", self.revenue_billions())
    }

    fn growth_label(&self, offset: i64) -> String {
        format!("{:+}%", i64::from(self.growth) + offset)
    }

    fn segments(&self) -> [(&'static str, f64, String); 3] {
        let base = f64::from(self.base_revenue);
        [
            ("Core Business", base * 0.6 / 10.0, self.growth_label(0)),
            ("Digital Services", base * 0.3 / 10.0, self.growth_label(5)),
            ("Other Ventures", base * 0.1 / 10.0, self.growth_label(-2)),
        ]
    }
}

fn company_color(lowered: &str, hash: u32) -> &'static str {
    match lowered {
        "amazon" | "nike" => "orange",
        "microsoft" | "facebook" | "walmart" | "pepsi" | "disney" | "samsung" | "intel"
        | "ibm" | "salesforce" => "blue",
        "google" | "tesla" | "red chief" | "coca-cola" | "netflix" | "amd" | "oracle" => "red",
        "apple" => "gray",
        "meta" => "purple",
        "adidas" | "sony" => "black",
        "campus x" => "green",
        _ => ["blue", "green", "red", "purple", "orange"][(hash % 5) as usize],
    }
}

/// Builds the full reply text for `prompt`: a prose header followed by one
/// tool-call object per line.
pub fn compose_reply(prompt: &str) -> String {
    let lowered = prompt.to_lowercase();
    let has_any = |terms: &[&str]| terms.iter().any(|term| lowered.contains(term));
    let companies = subjects_in(prompt);
    let primary = CompanyProfile::for_name(companies.first().map(String::as_str).unwrap_or("business"));
    let context: String = prompt.chars().take(QUERY_CONTEXT_CHARS).collect();
    let name = primary.name.clone();

    let with_origin = |mut args: Value, company: &str| {
        if let Some(map) = args.as_object_mut() {
            map.insert("_company".to_string(), json!(company));
            map.insert("_queryContext".to_string(), json!(context));
        }
        args
    };

    let (header, calls) = if has_any(&["revenue", "metric"]) {
        let segments = primary.segments();
        let calls = vec![
            ToolCall::new(
                ComponentKind::Metric,
                with_origin(
                    json!({
                        "title": format!("{name} Annual Revenue"),
                        "value": primary.revenue(),
                        "trend": "up",
                        "change": primary.growth_label(0),
                        "subtitle": "Current Year",
                        "color": primary.color,
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Metric,
                with_origin(
                    json!({
                        "title": format!("{name} Quarterly Growth"),
                        "value": primary.growth_label(0),
                        "trend": "up",
                        "change": primary.growth_label(0),
                        "subtitle": "QoQ Change",
                        "color": primary.color,
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Graph,
                with_origin(
                    json!({
                        "title": format!("{name} Revenue Trend"),
                        "type": "line",
                        "data": ([0.85, 0.92, 0.96, 1.0]
                            .iter()
                            .enumerate()
                            .map(|(index, factor)| json!({
                                "label": format!("Q{}", index + 1),
                                "value": (primary.revenue_billions() * factor * 10.0).round() / 10.0,
                            }))
                            .collect::<Vec<_>>()),
                        "yAxisLabel": "Revenue ($B)",
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Table,
                with_origin(
                    json!({
                        "title": format!("{name} Business Segments"),
                        "columns": ["Segment", "Revenue", "Growth", "Status"],
                        "rows": segments
                            .iter()
                            .map(|(segment, value, growth)| json!({
                                "item": segment,
                                "value": format!("${value:.1}B"),
                                "change": growth,
                                "status": if growth.starts_with('+') { "success" } else { "warning" },
                            }))
                            .collect::<Vec<_>>(),
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Insight,
                with_origin(
                    json!({
                        "title": format!("{name} Business Insight"),
                        "insight": format!(
                            "{name} shows strong revenue growth of {} with digital services leading at {}. Core business remains stable while new ventures show promising traction.",
                            primary.growth_label(0),
                            segments[1].2
                        ),
                        "severity": "positive",
                        "recommendations": [
                            "Expand digital services offerings",
                            "Optimize core business operations",
                            "Invest in high-growth ventures"
                        ],
                    }),
                    &name,
                ),
            ),
        ];
        (format!("{name} revenue metrics analysis:"), calls)
    } else if has_any(&["growth", "trend"]) {
        let data: Vec<Value> = (0..8u32)
            .map(|quarter| {
                json!({
                    "label": format!("Q{}", quarter + 1),
                    "value": 100 + quarter * 15 + (primary.base_revenue + quarter * 7) % 20,
                })
            })
            .collect();
        let calls = vec![
            ToolCall::new(
                ComponentKind::Metric,
                with_origin(
                    json!({
                        "title": format!("{name} YoY Growth"),
                        "value": primary.growth_label(0),
                        "trend": "up",
                        "change": primary.growth_label(0),
                        "color": primary.color,
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Graph,
                with_origin(
                    json!({
                        "title": format!("{name} Growth Trajectory"),
                        "type": "area",
                        "data": data,
                        "yAxisLabel": "Growth Index",
                    }),
                    &name,
                ),
            ),
        ];
        (format!("{name} growth analysis:"), calls)
    } else if has_any(&["compare", "vs", "versus"]) && companies.len() >= 2 {
        let left = CompanyProfile::for_name(&companies[0]);
        let right = CompanyProfile::for_name(&companies[1]);
        let (a, b) = (left.revenue_billions(), right.revenue_billions());
        let joined = companies.join(",");
        let calls = vec![ToolCall::new(
            ComponentKind::Comparison,
            with_origin(
                json!({
                    "title": format!("{} vs {}", left.name, right.name),
                    "leftLabel": left.name,
                    "leftValue": left.revenue(),
                    "rightLabel": right.name,
                    "rightValue": right.revenue(),
                    "difference": format!("${:.1}B", (a - b).abs()),
                    "percentageChange": format!("{:.1}%", (a / b - 1.0) * 100.0),
                    "verdict": if a > b { "better" } else { "worse" },
                }),
                &joined,
            ),
        )];
        let names: Vec<String> = companies.iter().map(|company| display_name(company)).collect();
        (format!("{} comparison:", names.join(" vs ")), calls)
    } else if has_any(&["alert", "warning"]) {
        let calls = vec![ToolCall::new(
            ComponentKind::Alert,
            with_origin(
                json!({
                    "title": format!("{name} Alerts"),
                    "alerts": [
                        {
                            "title": "Revenue below forecast",
                            "description": format!("{name} quarterly revenue is tracking under plan."),
                            "level": "warning",
                            "action": "Review regional pipeline",
                        },
                        {
                            "title": "Growth target met",
                            "description": format!("Year over year growth reached {}.", primary.growth_label(0)),
                            "level": "info",
                        }
                    ],
                }),
                &name,
            ),
        )];
        (format!("{name} alert summary:"), calls)
    } else if has_any(&["status", "health"]) {
        let calls = vec![ToolCall::new(
            ComponentKind::Status,
            with_origin(
                json!({
                    "label": format!("{name} Business Health"),
                    "status": if primary.growth >= 10 { "healthy" } else { "warning" },
                    "value": primary.growth_label(0),
                    "description": "Based on year over year growth",
                }),
                &name,
            ),
        )];
        (format!("{name} status overview:"), calls)
    } else {
        let calls = vec![
            ToolCall::new(
                ComponentKind::Metric,
                with_origin(
                    json!({
                        "title": format!("{name} Performance"),
                        "value": primary.revenue(),
                        "trend": "up",
                        "change": primary.growth_label(0),
                        "color": primary.color,
                    }),
                    &name,
                ),
            ),
            ToolCall::new(
                ComponentKind::Insight,
                with_origin(
                    json!({
                        "title": format!("{name} Business Outlook"),
                        "insight": format!("{name} demonstrates strong market position with consistent growth across segments. Digital transformation initiatives are showing positive results."),
                        "severity": "positive",
                        "recommendations": [
                            "Continue digital innovation",
                            "Expand market reach",
                            "Optimize operational efficiency"
                        ],
                    }),
                    &name,
                ),
            ),
        ];
        (format!("{name} business analysis:"), calls)
    };

    let mut reply = header;
    reply.push('\n');
    for call in calls {
        match serde_json::to_string(&call) {
            Ok(line) => {
                reply.push('\n');
                reply.push_str(&line);
            }
            Err(err) => tracing::warn!("failed to encode demo tool call: {err}"),
        }
    }
    reply
}
