use crate::ui::schema::{AlertLevel, Severity, StatusLevel, Trend, Verdict};
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// Slate palette with an indigo accent, tuned for dense metric cards.
#[derive(Debug, Clone)]
pub struct Theme {
    pub canvas: Color32,
    pub sidebar_fill: Color32,
    pub surface_2: Color32,
    pub surface_hover: Color32,
    pub top_bar_fill: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub positive: Color32,
    pub caution: Color32,
    pub negative: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub outline: Color32,
    /// Left-edge accents cycled through by query groups.
    pub group_accents: [Color32; 5],
    pub spacing_4: f32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    /// Width of one grid column; cards span one or two.
    pub grid_column_width: f32,
    pub radius_8: u8,
    pub card_radius: u8,
    pub button_height: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            canvas: Color32::from_rgb(0x0B, 0x12, 0x20),
            sidebar_fill: Color32::from_rgb(0x11, 0x18, 0x27),
            surface_2: Color32::from_rgb(0x1E, 0x29, 0x3B),
            surface_hover: Color32::from_rgb(0x27, 0x34, 0x49),
            top_bar_fill: Color32::from_rgb(0x0F, 0x17, 0x2A),
            accent_primary: Color32::from_rgb(0x63, 0x66, 0xF1),
            accent_muted: Color32::from_rgb(0x4F, 0x46, 0xE5),
            positive: Color32::from_rgb(0x10, 0xB9, 0x81),
            caution: Color32::from_rgb(0xFB, 0xBF, 0x24),
            negative: Color32::from_rgb(0xF4, 0x3F, 0x5E),
            text_primary: Color32::from_rgb(0xF1, 0xF5, 0xF9),
            text_muted: Color32::from_rgb(0x94, 0xA3, 0xB8),
            outline: Color32::from_rgba_premultiplied(148, 163, 184, 28),
            group_accents: [
                Color32::from_rgb(0x63, 0x66, 0xF1),
                Color32::from_rgb(0x10, 0xB9, 0x81),
                Color32::from_rgb(0xF5, 0x9E, 0x0B),
                Color32::from_rgb(0x06, 0xB6, 0xD4),
                Color32::from_rgb(0xD9, 0x46, 0xEF),
            ],
            spacing_4: 4.0,
            spacing_8: 8.0,
            spacing_12: 12.0,
            spacing_16: 16.0,
            grid_column_width: 260.0,
            radius_8: 8,
            card_radius: 10,
            button_height: 32.0,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.canvas;
        visuals.window_fill = self.sidebar_fill;
        visuals.extreme_bg_color = self.canvas;
        visuals.override_text_color = Some(self.text_primary);
        visuals.hyperlink_color = self.accent_primary;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.window_stroke = Stroke::new(1.0, self.outline);
        visuals.window_corner_radius = CornerRadius::same(self.card_radius);

        let fills = [
            (&mut visuals.widgets.noninteractive, self.surface_2),
            (&mut visuals.widgets.inactive, self.surface_2),
            (&mut visuals.widgets.hovered, self.surface_hover),
            (&mut visuals.widgets.active, self.accent_muted),
            (&mut visuals.widgets.open, self.surface_hover),
        ];
        for (widget, fill) in fills {
            widget.bg_fill = fill;
            widget.weak_bg_fill = fill;
            widget.bg_stroke = Stroke::NONE;
            widget.fg_stroke.color = self.text_primary;
            widget.corner_radius = CornerRadius::same(self.radius_8);
        }

        ctx.style_mut(|style| {
            style.visuals = visuals;
            style.spacing.item_spacing = egui::vec2(self.spacing_8, self.spacing_8);
            style.spacing.button_padding = egui::vec2(self.spacing_12, 6.0);
            for (text_style, font) in [
                (TextStyle::Heading, FontId::proportional(18.0)),
                (TextStyle::Body, FontId::proportional(13.5)),
                (TextStyle::Button, FontId::proportional(13.0)),
                (TextStyle::Monospace, FontId::monospace(12.5)),
                (TextStyle::Small, FontId::proportional(11.5)),
            ] {
                style.text_styles.insert(text_style, font);
            }
        });
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_2)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.card_radius))
            .stroke(Stroke::new(1.0, self.outline))
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.canvas)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_8))
            .stroke(Stroke::new(1.0, self.outline))
    }

    pub fn status_color(&self, status: StatusLevel) -> Color32 {
        match status {
            StatusLevel::Success => self.positive,
            StatusLevel::Warning => self.caution,
            StatusLevel::Error => self.negative,
        }
    }

    pub fn trend_color(&self, trend: Trend) -> Color32 {
        match trend {
            Trend::Up => self.positive,
            Trend::Down => self.negative,
            Trend::Neutral => self.text_muted,
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color32 {
        match severity {
            Severity::Positive => self.positive,
            Severity::Neutral => self.accent_primary,
            Severity::Negative => self.negative,
        }
    }

    pub fn verdict_color(&self, verdict: Verdict) -> Color32 {
        match verdict {
            Verdict::Better => self.positive,
            Verdict::Worse => self.negative,
            Verdict::Same => self.text_muted,
        }
    }

    pub fn alert_color(&self, level: AlertLevel) -> Color32 {
        match level {
            AlertLevel::Critical => self.negative,
            AlertLevel::Warning => self.caution,
            AlertLevel::Info => self.accent_primary,
        }
    }

    pub fn group_accent(&self, index: usize) -> Color32 {
        self.group_accents[index % self.group_accents.len()]
    }

    /// Frame for a selected query group: same card, outlined in its accent.
    pub fn selected_frame(&self, accent: Color32) -> Frame {
        self.card_frame().stroke(Stroke::new(1.5, accent))
    }

    pub fn subtle_button_stroke(&self) -> Stroke {
        Stroke::new(1.0, self.outline)
    }
}
