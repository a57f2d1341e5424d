use crate::assistant::DemoAssistant;
use crate::config::DashboardConfig;
use crate::event::{AppEvent, DiagnosticsLog};
use crate::session::store::StateStore;
use crate::session::{Message, Role, Thread};
use crate::theme::Theme;
use crate::ui::dashboard::Dashboard;
use crate::ui::event::DashboardAction;
use crate::ui::query_groups::{relative_age, QueryGroup};
use crate::ui::registry::ComponentRegistry;
use crate::ui::runtime::ExtractionRuntime;
use crate::ui::scanner::display_text;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupView {
    ByRequest,
    BySubject,
}

pub struct DashboardApp {
    rx: Receiver<AppEvent>,
    assistant: DemoAssistant,
    theme: Theme,
    registry: ComponentRegistry,
    thread: Thread,
    runtime: ExtractionRuntime,
    dashboard: Dashboard,
    storage: StateStore,
    input_buffer: String,
    streaming_message: Option<String>,
    diagnostics_log: DiagnosticsLog,
    group_view: GroupView,
    scroll_to_bottom: bool,
}

impl DashboardApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        assistant: DemoAssistant,
        config: &DashboardConfig,
        storage: StateStore,
    ) -> Self {
        let mut app = Self {
            rx,
            assistant,
            theme: Theme::default(),
            registry: ComponentRegistry::new(),
            thread: Thread::default(),
            runtime: ExtractionRuntime::from_config(config),
            dashboard: Dashboard::new(config),
            storage,
            input_buffer: String::new(),
            streaming_message: None,
            diagnostics_log: DiagnosticsLog::default(),
            group_view: GroupView::ByRequest,
            scroll_to_bottom: false,
        };

        if let Err(err) = app.dashboard.load(&app.storage) {
            app.log_diagnostic(format!("failed to restore dashboard: {err}"));
        }
        app
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.diagnostics_log.push(format!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            message
        ));
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() {
            return;
        }

        let user_id = format!("msg_{}", uuid::Uuid::new_v4().simple());
        let reply_id = format!("msg_{}", uuid::Uuid::new_v4().simple());
        self.thread.push(Message::new(user_id, Role::User, prompt.clone()));
        self.assistant.send(reply_id.clone(), prompt);
        self.streaming_message = Some(reply_id);
        self.input_buffer.clear();
        self.scroll_to_bottom = true;
        ctx.request_repaint();
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::StreamDelta { message_id, text } => {
                self.thread.append_delta(&message_id, Role::Assistant, &text);
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
            AppEvent::StreamEnd { message_id } => {
                if self.streaming_message.as_deref() == Some(message_id.as_str()) {
                    self.streaming_message = None;
                }
                ctx.request_repaint();
            }
            AppEvent::AssistantError(message) => {
                self.log_diagnostic(format!("assistant error: {message}"));
                self.streaming_message = None;
            }
        }
    }

    /// Feeds the thread through extraction and persists whatever changed.
    fn run_extraction(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.runtime.observe_thread(&self.thread, now);
        self.runtime.poll(now, &self.thread, &mut self.dashboard);

        if let Some(deadline) = self.runtime.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    fn persist_if_dirty(&mut self) {
        if let Err(err) = self.dashboard.save_if_changed(&self.storage) {
            self.log_diagnostic(format!("failed to persist dashboard: {err}"));
        }
    }

    fn render_top_bar(&self, ctx: &egui::Context, actions: &mut Vec<DashboardAction>) {
        let theme = &self.theme;
        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme.top_bar_fill)
                    .inner_margin(egui::Margin::symmetric(theme.spacing_16 as i8, theme.spacing_8 as i8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong("Insightboard");
                    ui.separator();
                    let workspace = self.dashboard.workspace();
                    ui.label(
                        RichText::new(format!("{} components", workspace.len()))
                            .color(theme.text_muted),
                    );
                    for (kind, count) in workspace.counts_by_kind() {
                        ui.label(RichText::new(format!("{kind} {count}")).color(theme.text_muted).size(12.0));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let clear = egui::Button::new(RichText::new("Clear all").color(theme.text_primary))
                            .fill(theme.surface_2)
                            .stroke(theme.subtle_button_stroke())
                            .corner_radius(egui::CornerRadius::same(theme.radius_8))
                            .min_size(egui::vec2(0.0, theme.button_height));
                        if ui.add_enabled(!workspace.is_empty(), clear).clicked() {
                            actions.push(DashboardAction::ClearAll);
                        }
                    });
                });
            });
    }

    fn render_group_card(
        &self,
        group: &QueryGroup,
        ui: &mut egui::Ui,
        actions: &mut Vec<DashboardAction>,
    ) {
        let theme = &self.theme;
        let accent = theme.group_accent(group.accent);
        let active = self
            .dashboard
            .groups()
            .active()
            .is_some_and(|current| current.id == group.id);
        let frame = if active {
            theme.selected_frame(accent)
        } else {
            theme.card_frame()
        };

        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.colored_label(accent, "▌");
                let query = ui.add(
                    egui::Label::new(RichText::new(format!("\"{}\"", group.user_query)).color(theme.text_primary))
                        .wrap()
                        .sense(egui::Sense::click()),
                );
                if query.clicked() {
                    actions.push(DashboardAction::ActivateGroup {
                        group_id: Some(group.id.clone()),
                    });
                }
            });
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!(
                        "{} · {} components · {}",
                        group.subject,
                        group.component_ids.len(),
                        relative_age(&group.created_at, chrono::Utc::now())
                    ))
                    .color(theme.text_muted)
                    .size(11.0),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").on_hover_text("Remove group").clicked() {
                        actions.push(DashboardAction::RemoveGroup {
                            group_id: group.id.clone(),
                        });
                    }
                    let toggle = if group.collapsed { "▸" } else { "▾" };
                    if ui.small_button(toggle).on_hover_text("Collapse or expand").clicked() {
                        actions.push(DashboardAction::ToggleGroup {
                            group_id: group.id.clone(),
                        });
                    }
                });
            });
        });
    }

    fn render_left_panel(&mut self, ctx: &egui::Context, actions: &mut Vec<DashboardAction>) {
        let mut view = self.group_view;
        egui::SidePanel::left("query_groups")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading("Query Groups");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut view, GroupView::ByRequest, "By request");
                    ui.selectable_value(&mut view, GroupView::BySubject, "By subject");
                });
                let showing_all = self.dashboard.groups().active().is_none();
                if ui.selectable_label(showing_all, "All components").clicked() {
                    actions.push(DashboardAction::ActivateGroup { group_id: None });
                }
                ui.separator();

                let groups = self.dashboard.groups();
                if groups.is_empty() {
                    ui.label(RichText::new("Ask a question to create a group").color(self.theme.text_muted));
                    return;
                }

                ScrollArea::vertical().id_salt("query_group_list").show(ui, |ui| match view {
                    GroupView::ByRequest => {
                        for group in groups.groups() {
                            self.render_group_card(group, ui, actions);
                            ui.add_space(self.theme.spacing_4);
                        }
                    }
                    GroupView::BySubject => {
                        for subject in groups.subjects() {
                            egui::CollapsingHeader::new(subject)
                                .id_salt(("subject", subject))
                                .default_open(true)
                                .show(ui, |ui| {
                                    for group in groups.groups().iter().filter(|group| group.subject == subject) {
                                        self.render_group_card(group, ui, actions);
                                        ui.add_space(self.theme.spacing_4);
                                    }
                                });
                        }
                    }
                });
            });
        self.group_view = view;
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        let mut send_now = false;
        egui::SidePanel::right("chat_panel")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.heading("Chat");
                ui.separator();

                let transcript_height = (ui.available_height() - 170.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("chat_transcript")
                    .max_height(transcript_height)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in self.thread.messages() {
                            let (speaker, body) = match message.role {
                                Role::User => ("You", message.text().into_owned()),
                                Role::Assistant => ("Assistant", display_text(&message.text())),
                                Role::System => continue,
                            };
                            ui.label(RichText::new(speaker).color(self.theme.text_muted).size(12.0));
                            ui.label(body);
                            ui.add_space(self.theme.spacing_8);
                        }
                        if self.scroll_to_bottom {
                            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        }
                    });
                self.scroll_to_bottom = false;

                ui.separator();
                egui::CollapsingHeader::new("Diagnostics")
                    .default_open(false)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt("diagnostics_log")
                            .max_height(90.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for entry in self.diagnostics_log.iter() {
                                    ui.label(entry);
                                }
                                for action in self.dashboard.action_log() {
                                    ui.label(RichText::new(action.to_log_line()).monospace().size(11.0));
                                }
                            });
                    });

                ui.separator();
                let streaming = self.streaming_message.is_some();
                let hint = if streaming {
                    "Waiting for response..."
                } else {
                    "Ask about revenue, growth, comparisons..."
                };
                self.theme.composer_frame().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let response = ui.add_enabled(
                            !streaming,
                            egui::TextEdit::singleline(&mut self.input_buffer)
                                .desired_width(ui.available_width() - 70.0)
                                .hint_text(hint),
                        );
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            send_now = true;
                        }
                        let clicked = ui
                            .add_enabled(
                                !streaming && !self.input_buffer.trim().is_empty(),
                                egui::Button::new("Send"),
                            )
                            .clicked();
                        send_now |= clicked;
                    });
                });
            });

        if send_now && self.streaming_message.is_none() {
            self.submit_prompt(ctx);
        }
    }

    fn render_grid(&self, ctx: &egui::Context, actions: &mut Vec<DashboardAction>) {
        let theme = &self.theme;
        egui::CentralPanel::default().show(ctx, |ui| {
            let components = self.dashboard.visible_components();
            if components.is_empty() {
                let message = match self.dashboard.groups().active() {
                    Some(group) if group.collapsed => "This group is collapsed",
                    _ => "Generated components will appear here",
                };
                ui.label(RichText::new(message).color(theme.text_muted));
                return;
            }

            let gap = theme.spacing_12;
            let available = ui.available_width();
            let columns = ((available + gap) / (theme.grid_column_width + gap)).floor().max(1.0) as usize;
            let column_width = (available - gap * (columns as f32 - 1.0)) / columns as f32;

            ScrollArea::vertical().id_salt("component_grid").show(ui, |ui| {
                ui.spacing_mut().item_spacing = egui::vec2(gap, gap);
                ui.horizontal_wrapped(|ui| {
                    for component in components {
                        let span = self.registry.column_span(component.kind).min(columns);
                        let width = column_width * span as f32 + gap * (span as f32 - 1.0);
                        ui.allocate_ui(egui::vec2(width, 0.0), |ui| {
                            ui.set_width(width);
                            self.registry
                                .render_component(component, ui, theme, &mut |action| actions.push(action));
                        });
                    }
                });
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.run_extraction(ctx);

        let mut actions = Vec::new();
        self.render_top_bar(ctx, &mut actions);
        self.render_left_panel(ctx, &mut actions);
        self.render_chat_panel(ctx);
        self.render_grid(ctx, &mut actions);

        for action in actions {
            self.dashboard.apply(action);
        }
        self.persist_if_dirty();
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        self.runtime.shutdown();
        self.persist_if_dirty();
    }
}
