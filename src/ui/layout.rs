// Main application layout
// Menu bar, session header, error banner, navigation sidebar, activity log and the routed view

use super::components::*;
use super::console::Console;
use super::views::render_view;
use crate::router::View;
use crate::state::State;
use eframe::egui;
use std::sync::PoisonError;

/// Sidebar entries: label, path, view highlighted when current
const NAV_ITEMS: [(&str, &str, View); 3] = [
    ("Dashboard", "/", View::Dashboard),
    ("Agents", "/agents", View::AgentList),
    ("Register Agent", "/register-agent", View::AgentRegister),
];

/// Render one frame of the console
pub fn render_app_layout(ctx: &egui::Context, console: &mut Console) {
    console.process();
    // Owned copy so views never hold the store lock while acting
    let state = console.store().snapshot();

    render_menu_bar(ctx, console);
    render_header(ctx, console, &state);

    if console.activity_visible {
        egui::TopBottomPanel::bottom("activity_panel")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                let activity = console.activity();
                let mut log = activity.lock().unwrap_or_else(PoisonError::into_inner);
                log.render(ui);
            });
    }

    if console.sidebar_visible {
        render_sidebar(ctx, console);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .id_source("view_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                render_view(ui, console, &state);
            });
    });
}

fn render_menu_bar(ctx: &egui::Context, console: &mut Console) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Register Agent").clicked() {
                    console.start_registration();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    let visuals = if dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    };
                    ctx.set_visuals(visuals);
                }
                ui.separator();
                ui.checkbox(&mut console.sidebar_visible, "Sidebar");
                ui.checkbox(&mut console.activity_visible, "Activity Log");
            });

            ui.menu_button("Session", |ui| {
                if console.store().is_authenticated() {
                    if ui.button("Log Out").clicked() {
                        console.logout();
                        ui.close_menu();
                    }
                } else if ui.button("Log In").clicked() {
                    console.request_navigation("/login");
                    ui.close_menu();
                }
            });
        });
    });
}

// Back button, session badge, loading spinner, then the error banner and notice
fn render_header(ctx: &egui::Context, console: &mut Console, state: &State) {
    egui::TopBottomPanel::top("session_header").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.add_enabled_ui(console.can_go_back(), |ui| {
                if ui.button("◀ Back").clicked() {
                    console.back();
                }
            });
            ui.label(egui::RichText::new(console.route().full_path()).monospace().weak());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match &state.user {
                    Some(user) => {
                        if ui.button("Log Out").clicked() {
                            console.logout();
                        }
                        role_badge(ui, user.role);
                        ui.label(user.id.as_str());
                    }
                    None => {
                        if primary_button(ui, "Log In").clicked() {
                            console.request_navigation("/login");
                        }
                    }
                }
                if state.loading() {
                    ui.spinner();
                }
            });
        });

        if let Some(error) = &state.global_error {
            ui.add_space(4.0);
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(90, 20, 20))
                .inner_margin(6.0)
                .rounding(4.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(
                            egui::Color32::from_rgb(255, 200, 200),
                            egui::RichText::new(&error.message).strong(),
                        );
                        ui.label(egui::RichText::new(&error.details).color(egui::Color32::LIGHT_GRAY));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Dismiss").clicked() {
                                console.dismiss_error();
                            }
                        });
                    });
                });
        }

        let mut dismissed = false;
        if let Some(notice) = &console.notice {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(notice).italics());
                dismissed = ui.small_button("✕").clicked();
            });
        }
        if dismissed {
            console.notice = None;
        }
        ui.add_space(4.0);
    });
}

fn render_sidebar(ctx: &egui::Context, console: &mut Console) {
    egui::SidePanel::left("nav_sidebar")
        .resizable(true)
        .default_width(180.0)
        .min_width(140.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Agent Console");
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            let current = console.route().view();
            for (label, path, view) in NAV_ITEMS {
                if ui.selectable_label(current == view, label).clicked() {
                    if view == View::AgentRegister {
                        console.start_registration();
                    } else {
                        console.request_navigation(path);
                    }
                }
            }
        });
}
