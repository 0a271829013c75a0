// Reusable UI components
// Badges, buttons, JSON display and the store activity log

use crate::state::{Mutation, Role};
use eframe::egui;
use serde_json::Value;
use std::collections::VecDeque;

/// Render a status badge with colored text
/// Colors: active/completed (green), pending/running (yellow), failed (red), other (gray)
pub fn status_badge(ui: &mut egui::Ui, status: Option<&str>) {
    let status = status.unwrap_or("unknown");
    let color = match status {
        "active" | "completed" | "healthy" => egui::Color32::from_rgb(0, 180, 0),
        "pending" | "running" | "queued" => egui::Color32::from_rgb(220, 180, 0),
        "failed" | "error" | "inactive" => egui::Color32::from_rgb(220, 0, 0),
        _ => egui::Color32::GRAY,
    };
    ui.colored_label(color, status);
}

/// Render the signed-in role
pub fn role_badge(ui: &mut egui::Ui, role: Role) {
    let color = match role {
        Role::Admin => egui::Color32::from_rgb(200, 120, 0),
        Role::User => egui::Color32::from_rgb(0, 140, 220),
        Role::Guest => egui::Color32::GRAY,
    };
    ui.colored_label(color, egui::RichText::new(role.as_str()).strong());
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).strong())
}

/// Render a destructive action button (red)
pub fn danger_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).color(egui::Color32::from_rgb(220, 0, 0)))
}

/// Pretty-printed JSON in a monospace block
pub fn json_view(ui: &mut egui::Ui, value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    egui::Frame::none()
        .fill(ui.visuals().extreme_bg_color)
        .inner_margin(8.0)
        .rounding(4.0)
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).monospace().size(12.0));
        });
}

/// Labelled single-line text field
pub fn labelled_field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
    ui.end_row();
}

/// Store activity log
/// Keeps the most recent committed mutations for display
pub struct ActivityLog {
    /// Buffer of formatted lines, oldest first
    lines: VecDeque<String>,
    /// Maximum number of lines to keep (0 = unlimited)
    max_lines: usize,
    /// Whether to auto-scroll to bottom
    auto_scroll: bool,
    /// Hide REQUEST_STARTED / REQUEST_SETTLED noise
    hide_loading: bool,
}

impl ActivityLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
            auto_scroll: true,
            hide_loading: true,
        }
    }

    /// Record a committed mutation
    pub fn record(&mut self, mutation: &Mutation) {
        if self.hide_loading
            && matches!(mutation, Mutation::RequestStarted | Mutation::RequestSettled)
        {
            return;
        }
        let summary = mutation.summary();
        let line = if summary.is_empty() {
            mutation.name().to_string()
        } else {
            format!("{}  {}", mutation.name(), summary)
        };
        self.add_line(line);
    }

    /// Add a free-form line to the log
    pub fn add_line(&mut self, line: String) {
        self.lines.push_back(line);
        if self.max_lines > 0 && self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Render the log in a scrollable area
    pub fn render(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Activity").heading());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    self.clear();
                }
                ui.checkbox(&mut self.auto_scroll, "Auto-scroll");
                ui.checkbox(&mut self.hide_loading, "Hide loading");
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_source("activity_log_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing = egui::vec2(4.0, 2.0);
                for line in &self.lines {
                    ui.label(egui::RichText::new(line).size(12.0).monospace());
                }
                if self.auto_scroll && !self.lines.is_empty() {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(500)
    }
}
