use crate::theme::Theme;
use crate::ui::event::DashboardAction;
use crate::ui::scanner::TOOL_NAME_PREFIX;
use crate::ui::schema::{
    AlertListProps, ChartType, ComparisonProps, ComponentKind, GraphProps, InsightProps,
    MetricProps, StatusLevel, StatusProps, TableProps, Trend, ValidatedProps, Verdict,
};
use crate::ui::workspace::WorkspaceComponent;
use eframe::egui::{self, RichText};
use std::collections::BTreeMap;

pub struct ComponentRegistry {
    kinds_by_name: BTreeMap<&'static str, ComponentKind>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            kinds_by_name: ComponentKind::ALL
                .into_iter()
                .map(|kind| (kind.wire_name(), kind))
                .collect(),
        }
    }

    /// Maps a wire component name such as `MetricCard` to its kind.
    pub fn resolve(&self, kind_name: &str) -> Option<ComponentKind> {
        let kind = self.kinds_by_name.get(kind_name).copied();
        if kind.is_none() {
            tracing::debug!(name = kind_name, "unknown component name");
        }
        kind
    }

    /// Like [`resolve`](Self::resolve) but takes the full `show_component_*` tool name.
    pub fn resolve_tool(&self, tool_name: &str) -> Option<ComponentKind> {
        self.resolve(tool_name.strip_prefix(TOOL_NAME_PREFIX)?)
    }

    /// Grid columns a card of `kind` spans.
    pub fn column_span(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Metric => 1,
            _ => 2,
        }
    }

    pub fn render_component(
        &self,
        component: &WorkspaceComponent,
        ui: &mut egui::Ui,
        theme: &Theme,
        emit: &mut dyn FnMut(DashboardAction),
    ) {
        let props = component.validated_props();
        theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(props.title())
                        .color(theme.text_primary)
                        .size(14.0)
                        .strong(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let remove = egui::Button::new(
                        RichText::new("✕").color(theme.text_muted).size(12.0),
                    )
                    .fill(theme.surface_2)
                    .stroke(theme.subtle_button_stroke())
                    .corner_radius(egui::CornerRadius::same(theme.radius_8));
                    if ui.add(remove).on_hover_text("Remove component").clicked() {
                        emit(DashboardAction::RemoveComponent {
                            component_id: component.id.clone(),
                        });
                    }
                    if let Some(subject) = &component.origin.subject {
                        ui.label(RichText::new(subject).color(theme.text_muted).size(11.0));
                    }
                });
            });
            ui.add_space(theme.spacing_8);

            match &props {
                ValidatedProps::Metric(metric) => render_metric(metric, ui, theme),
                ValidatedProps::Graph(graph) => render_graph(graph, ui, theme),
                ValidatedProps::Table(table) => render_table(&component.id, table, ui, theme),
                ValidatedProps::Comparison(comparison) => {
                    render_comparison(&component.id, comparison, ui, theme)
                }
                ValidatedProps::Insight(insight) => render_insight(insight, ui, theme),
                ValidatedProps::Alert(alerts) => render_alerts(alerts, ui, theme),
                ValidatedProps::Status(status) => render_status(status, ui, theme),
            }
        });
    }
}

fn muted(text: impl Into<String>, theme: &Theme) -> RichText {
    RichText::new(text).color(theme.text_muted).size(12.0)
}

fn bullet_list(items: &[String], ui: &mut egui::Ui, theme: &Theme) {
    for item in items {
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(theme.accent_primary, "•");
            ui.label(RichText::new(item).color(theme.text_primary).size(13.0));
        });
    }
}

fn metric_value(metric: &MetricProps) -> String {
    let value = match metric.value.trim().parse::<f64>() {
        Ok(number) => format!("{:.*}", usize::from(metric.precision), number),
        Err(_) => metric.value.clone(),
    };
    match &metric.unit {
        Some(unit) => format!("{value} {unit}"),
        None => value,
    }
}

fn render_metric(metric: &MetricProps, ui: &mut egui::Ui, theme: &Theme) {
    ui.label(
        RichText::new(metric_value(metric))
            .color(theme.text_primary)
            .size(26.0)
            .strong(),
    );
    let color = theme.trend_color(metric.trend);
    let arrow = match metric.trend {
        Trend::Up => "▲",
        Trend::Down => "▼",
        Trend::Neutral => "■",
    };
    ui.horizontal(|ui| {
        ui.colored_label(color, arrow);
        if let Some(change) = &metric.change {
            ui.label(RichText::new(change).color(color).size(13.0));
        }
        if let Some(period) = &metric.period {
            ui.label(muted(period, theme));
        }
    });
    if let Some(subtitle) = &metric.subtitle {
        ui.label(muted(subtitle, theme));
    }
}

fn render_graph(graph: &GraphProps, ui: &mut egui::Ui, theme: &Theme) {
    if graph.data.is_empty() {
        ui.label(muted("No data points", theme));
        return;
    }
    let max = graph
        .data
        .iter()
        .map(|point| point.value)
        .fold(f64::MIN, f64::max)
        .max(f64::EPSILON);

    match graph.chart_type {
        ChartType::Line => {
            let desired = egui::vec2(ui.available_width(), 120.0);
            let (rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
            let step = if graph.data.len() > 1 {
                rect.width() / (graph.data.len() - 1) as f32
            } else {
                0.0
            };
            let points: Vec<egui::Pos2> = graph
                .data
                .iter()
                .enumerate()
                .map(|(index, point)| {
                    let ratio = (point.value / max).clamp(0.0, 1.0) as f32;
                    egui::pos2(
                        rect.left() + step * index as f32,
                        rect.bottom() - ratio * rect.height(),
                    )
                })
                .collect();
            let painter = ui.painter();
            painter.add(egui::Shape::line(
                points.clone(),
                egui::Stroke::new(2.0, theme.accent_primary),
            ));
            for point in points {
                painter.circle_filled(point, 3.0, theme.accent_primary);
            }
            ui.horizontal_wrapped(|ui| {
                for point in &graph.data {
                    ui.label(muted(format!("{} {:.1}", point.label, point.value), theme));
                }
            });
        }
        ChartType::Bar | ChartType::Pie => {
            let total: f64 = graph.data.iter().map(|point| point.value.max(0.0)).sum();
            for point in &graph.data {
                let (fraction, caption) = if graph.chart_type == ChartType::Pie && total > 0.0 {
                    let share = point.value.max(0.0) / total;
                    (share, format!("{} {:.0}%", point.label, share * 100.0))
                } else {
                    (point.value / max, format!("{} {:.1}", point.label, point.value))
                };
                ui.add(
                    egui::ProgressBar::new(fraction.clamp(0.0, 1.0) as f32)
                        .text(caption)
                        .fill(theme.accent_muted),
                );
            }
        }
    }

    let axes = [graph.x_axis_label.as_deref(), graph.y_axis_label.as_deref()];
    let axes: Vec<&str> = axes.into_iter().flatten().collect();
    if !axes.is_empty() {
        ui.label(muted(axes.join(" / "), theme));
    }
}

fn render_table(id: &str, table: &TableProps, ui: &mut egui::Ui, theme: &Theme) {
    if table.rows.is_empty() {
        ui.label(muted("No rows", theme));
        return;
    }
    egui::Grid::new(("table", id))
        .striped(true)
        .spacing(egui::vec2(theme.spacing_16, theme.spacing_8))
        .show(ui, |ui| {
            for column in &table.columns {
                ui.label(muted(column, theme).strong());
            }
            ui.end_row();
            for row in &table.rows {
                ui.label(RichText::new(&row.item).color(theme.text_primary));
                ui.label(RichText::new(&row.value).color(theme.text_primary));
                if table.columns.len() > 3 {
                    ui.label(muted(row.change.as_deref().unwrap_or("—"), theme));
                }
                ui.colored_label(theme.status_color(row.status), "●");
                ui.end_row();
            }
        });
}

fn render_comparison(id: &str, comparison: &ComparisonProps, ui: &mut egui::Ui, theme: &Theme) {
    ui.columns(2, |columns| {
        columns[0].label(muted(&comparison.left_label, theme));
        columns[0].label(
            RichText::new(&comparison.left_value)
                .color(theme.text_primary)
                .size(20.0)
                .strong(),
        );
        columns[1].label(muted(&comparison.right_label, theme));
        columns[1].label(
            RichText::new(&comparison.right_value)
                .color(theme.text_primary)
                .size(20.0)
                .strong(),
        );
    });

    let color = theme.verdict_color(comparison.verdict);
    let verdict = match comparison.verdict {
        Verdict::Better => "better",
        Verdict::Worse => "worse",
        Verdict::Same => "same",
    };
    ui.horizontal(|ui| {
        ui.colored_label(color, verdict);
        if let Some(difference) = &comparison.difference {
            ui.label(muted(format!("Δ {difference}"), theme));
        }
        if let Some(change) = &comparison.percentage_change {
            ui.label(muted(change, theme));
        }
    });

    if !comparison.metrics.is_empty() {
        ui.add_space(theme.spacing_4);
        egui::Grid::new(("comparison", id))
            .striped(true)
            .show(ui, |ui| {
                for metric in &comparison.metrics {
                    ui.label(RichText::new(&metric.name).color(theme.text_primary));
                    ui.label(&metric.left_value);
                    ui.label(&metric.right_value);
                    ui.label(muted(metric.change.as_deref().unwrap_or(""), theme));
                    ui.end_row();
                }
            });
    }
    bullet_list(&comparison.insights, ui, theme);
}

fn render_insight(insight: &InsightProps, ui: &mut egui::Ui, theme: &Theme) {
    let color = theme.severity_color(insight.severity);
    ui.horizontal_wrapped(|ui| {
        ui.colored_label(color, "▌");
        ui.label(RichText::new(&insight.insight).color(theme.text_primary).size(13.0));
    });
    if !insight.recommendations.is_empty() {
        ui.add_space(theme.spacing_4);
        ui.label(muted("Recommendations", theme));
        bullet_list(&insight.recommendations, ui, theme);
    }
    ui.add(
        egui::ProgressBar::new((insight.confidence / 100.0) as f32)
            .text(format!("Confidence {:.0}%", insight.confidence)),
    );
}

fn render_alerts(list: &AlertListProps, ui: &mut egui::Ui, theme: &Theme) {
    if list.alerts.is_empty() {
        ui.label(muted("No active alerts", theme));
        return;
    }
    for alert in &list.alerts {
        let color = theme.alert_color(alert.level);
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(color, "●");
            ui.label(RichText::new(&alert.title).color(theme.text_primary).size(13.0));
            if let Some(timestamp) = &alert.timestamp {
                ui.label(muted(timestamp, theme));
            }
        });
        if let Some(description) = &alert.description {
            ui.label(muted(description, theme));
        }
        if let Some(action) = &alert.action {
            ui.label(RichText::new(format!("→ {action}")).color(color).size(12.0));
        }
    }
}

fn render_status(status: &StatusProps, ui: &mut egui::Ui, theme: &Theme) {
    let color = theme.status_color(status.status);
    ui.horizontal(|ui| {
        ui.colored_label(color, "●");
        let text = status.value.as_deref().unwrap_or(match status.status {
            StatusLevel::Success => "Healthy",
            StatusLevel::Warning => "Needs attention",
            StatusLevel::Error => "Failing",
        });
        ui.label(RichText::new(text).color(color).size(14.0));
    });
    if let Some(description) = &status.description {
        ui.label(muted(description, theme));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_seven_wire_names() {
        let registry = ComponentRegistry::new();
        for kind in ComponentKind::ALL {
            assert_eq!(registry.resolve(kind.wire_name()), Some(kind));
        }
        assert_eq!(registry.resolve("BusinessSummaryTable"), Some(ComponentKind::Table));
        assert_eq!(registry.resolve("PieChart"), None);
    }

    #[test]
    fn resolve_tool_requires_prefix() {
        let registry = ComponentRegistry::new();
        assert_eq!(
            registry.resolve_tool("show_component_StatusBadge"),
            Some(ComponentKind::Status)
        );
        assert_eq!(registry.resolve_tool("StatusBadge"), None);
    }

    #[test]
    fn metric_cards_span_one_column() {
        let registry = ComponentRegistry::new();
        assert_eq!(registry.column_span(ComponentKind::Metric), 1);
        assert_eq!(registry.column_span(ComponentKind::Table), 2);
    }

    #[test]
    fn numeric_metric_values_respect_precision_and_unit() {
        let mut metric = MetricProps {
            title: "Latency".to_string(),
            value: "12.3456".to_string(),
            trend: Trend::Neutral,
            change: None,
            period: None,
            subtitle: None,
            unit: Some("ms".to_string()),
            color: None,
            precision: 1,
        };
        assert_eq!(metric_value(&metric), "12.3 ms");
        metric.value = "$4.2B".to_string();
        metric.unit = None;
        assert_eq!(metric_value(&metric), "$4.2B");
    }
}
