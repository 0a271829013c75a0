// Route views
// One render function per view; each reads a state snapshot and acts through the console

use super::components::*;
use super::console::Console;
use crate::api::{Agent, AuthType, Execution};
use crate::router::{agent_path, execution_path, executions_path, View};
use crate::state::State;
use eframe::egui;
use serde_json::Value;

/// Render the view for the current route
pub fn render_view(ui: &mut egui::Ui, console: &mut Console, state: &State) {
    let route = console.route().clone();
    ui.heading(route.view().title());
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    match route.view() {
        View::Dashboard => render_dashboard(ui, console, state),
        View::AgentList => render_agent_list(ui, console, state),
        View::AgentDetail => {
            let agent_id = route.param("agentId").unwrap_or_default().to_string();
            render_agent_detail(ui, console, state, &agent_id);
        }
        View::ExecutionList => {
            let agent_id = route.param("agentId").unwrap_or_default().to_string();
            render_execution_list(ui, console, state, &agent_id);
        }
        View::ExecutionDetail => render_execution_detail(ui, state),
        View::AgentRegister => render_register(ui, console),
        View::Login => render_login(ui, console),
    }
}

fn render_dashboard(ui: &mut egui::Ui, console: &mut Console, state: &State) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading(egui::RichText::new("Welcome to Agent Console").size(24.0));
        ui.add_space(16.0);
        match &state.user {
            Some(user) => {
                ui.label(format!("Signed in as {}", user.id));
            }
            None => {
                ui.label("Browse registered agents, or log in to run them");
            }
        }
        ui.add_space(24.0);
        ui.label(
            egui::RichText::new(format!("{} agents loaded", state.agents.len()))
                .weak()
                .size(14.0),
        );
        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if primary_button(ui, "Browse Agents").clicked() {
                console.request_navigation("/agents");
            }
            if ui.button("Register Agent").clicked() {
                console.start_registration();
            }
        });
    });
}

fn render_agent_list(ui: &mut egui::Ui, console: &mut Console, state: &State) {
    egui::Grid::new("agent_search")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            labelled_field(ui, "Search", &mut console.search.query);
            labelled_field(ui, "Tags", &mut console.search.tags);
            labelled_field(ui, "Capabilities", &mut console.search.capabilities);
            labelled_field(ui, "Author", &mut console.search.author);
        });
    ui.horizontal(|ui| {
        if primary_button(ui, "Search").clicked() {
            console.refresh_agents();
        }
        if ui.button("Reset").clicked() {
            console.search = Default::default();
            console.refresh_agents();
        }
    });
    ui.add_space(8.0);

    if state.agents.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(egui::RichText::new("No agents").italics().weak().size(14.0));
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_source("agent_list_scroll")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for agent in &state.agents {
                agent_row(ui, console, agent);
                ui.add_space(4.0);
            }
        });
}

fn agent_row(ui: &mut egui::Ui, console: &mut Console, agent: &Agent) {
    let row_id = ui.id().with(("agent_row", &agent.id));
    let frame = egui::Frame::none()
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(6.0);
    let row = frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(agent.name().unwrap_or(&agent.id)).strong());
            if let Some(version) = agent.version() {
                ui.label(egui::RichText::new(version).weak());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                status_badge(ui, agent.status());
            });
        });
        if let Some(description) = agent.description() {
            ui.label(egui::RichText::new(description).size(13.0));
        }
        let tags = agent.tags();
        if !tags.is_empty() {
            ui.label(egui::RichText::new(tags.join(" · ")).weak().size(12.0));
        }
    });

    let interact = ui.interact(row.response.rect, row_id, egui::Sense::click());
    if interact.hovered() {
        ui.painter().rect_stroke(
            row.response.rect,
            egui::Rounding::same(4.0),
            egui::Stroke::new(1.0, ui.visuals().widgets.hovered.bg_stroke.color),
        );
    }
    if interact.clicked() {
        console.request_navigation(agent_path(&agent.id));
    }
}

fn render_agent_detail(ui: &mut egui::Ui, console: &mut Console, state: &State, agent_id: &str) {
    // Detail fetch may still be running; fall back to the list entry
    let agent = state
        .agent_detail
        .as_ref()
        .filter(|agent| agent.id == agent_id)
        .or_else(|| state.agent_by_id(agent_id));
    let Some(agent) = agent else {
        ui.label(egui::RichText::new("Loading agent...").weak());
        return;
    };

    ui.horizontal(|ui| {
        ui.heading(egui::RichText::new(agent.name().unwrap_or(&agent.id)).size(20.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            status_badge(ui, agent.status());
        });
    });
    ui.add_space(8.0);

    egui::Grid::new("agent_detail")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("ID:").strong());
            ui.label(egui::RichText::new(&agent.id).monospace());
            ui.end_row();
            for (label, value) in [
                ("Version:", agent.version()),
                ("Author:", agent.author()),
                ("Description:", agent.description()),
            ] {
                ui.label(egui::RichText::new(label).strong());
                ui.label(value.unwrap_or("-"));
                ui.end_row();
            }
            ui.label(egui::RichText::new("Capabilities:").strong());
            ui.label(agent.capability_names().join(", "));
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.spacing_mut().button_padding = egui::vec2(12.0, 8.0);
        if ui.button("Executions").clicked() {
            console.request_navigation(executions_path(&agent.id));
        }
        if state.is_authenticated() {
            if ui.button("Edit").clicked() {
                console.start_edit(agent);
            }
            if state.is_admin() && danger_button(ui, "Delete").clicked() {
                console.delete_agent(&agent.id);
            }
        }
    });

    ui.add_space(12.0);
    ui.separator();
    ui.collapsing("Execute", |ui| {
        if !state.is_authenticated() {
            ui.label(egui::RichText::new("Log in to run this agent").weak());
            return;
        }
        ui.label("Input data (JSON object)");
        ui.add(
            egui::TextEdit::multiline(&mut console.execute.input_data)
                .code_editor()
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        ui.label("Execution parameters (optional JSON object)");
        ui.add(
            egui::TextEdit::multiline(&mut console.execute.execution_parameters)
                .code_editor()
                .desired_rows(2)
                .desired_width(f32::INFINITY),
        );
        if let Some(error) = &console.execute.error {
            ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error.as_str());
        }
        if primary_button(ui, "Run").clicked() {
            console.execute_agent(&agent.id);
        }
    });

    ui.collapsing("Raw record", |ui| {
        json_view(ui, &Value::Object(agent.fields.clone()));
    });
}

fn render_execution_list(ui: &mut egui::Ui, console: &mut Console, state: &State, agent_id: &str) {
    ui.horizontal(|ui| {
        ui.label("Agent");
        if ui.link(agent_id).clicked() {
            console.request_navigation(agent_path(agent_id));
        }
    });
    ui.add_space(8.0);

    if state.executions.is_empty() {
        ui.label(egui::RichText::new("No executions").italics().weak());
        return;
    }

    egui::Grid::new("execution_list")
        .num_columns(3)
        .striped(true)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Execution").strong());
            ui.label(egui::RichText::new("Status").strong());
            ui.label(egui::RichText::new("Created").strong());
            ui.end_row();
            for execution in &state.executions {
                if ui.link(execution.id.as_str()).clicked() {
                    console.request_navigation(execution_path(agent_id, &execution.id));
                }
                status_badge(ui, execution.status());
                ui.label(execution.created_at().unwrap_or("-"));
                ui.end_row();
            }
        });
}

fn render_execution_detail(ui: &mut egui::Ui, state: &State) {
    let Some(execution) = &state.execution_detail else {
        ui.label(egui::RichText::new("Loading execution...").weak());
        return;
    };
    execution_summary(ui, execution);
    ui.add_space(8.0);
    if let Some(result) = execution.result() {
        ui.label(egui::RichText::new("Result").strong());
        json_view(ui, result);
    }
    ui.collapsing("Raw record", |ui| {
        json_view(ui, &Value::Object(execution.fields.clone()));
    });
}

fn execution_summary(ui: &mut egui::Ui, execution: &Execution) {
    egui::Grid::new("execution_detail")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("ID:").strong());
            ui.label(egui::RichText::new(&execution.id).monospace());
            ui.end_row();
            ui.label(egui::RichText::new("Agent:").strong());
            ui.label(execution.agent_id().unwrap_or("-"));
            ui.end_row();
            ui.label(egui::RichText::new("Status:").strong());
            status_badge(ui, execution.status());
            ui.end_row();
            ui.label(egui::RichText::new("Created:").strong());
            ui.label(execution.created_at().unwrap_or("-"));
            ui.end_row();
        });
}

fn render_register(ui: &mut egui::Ui, console: &mut Console) {
    if let Some(agent_id) = &console.register.editing {
        ui.label(egui::RichText::new(format!("Editing {}", agent_id)).weak());
        ui.add_space(4.0);
    }

    let form = &mut console.register;
    egui::Grid::new("register_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            labelled_field(ui, "Name", &mut form.name);
            labelled_field(ui, "Description", &mut form.description);
            labelled_field(ui, "Version", &mut form.version);
            labelled_field(ui, "Author", &mut form.author);
            labelled_field(ui, "Contact email", &mut form.contact_email);
            labelled_field(ui, "Homepage URL", &mut form.homepage_url);
            labelled_field(ui, "API endpoint", &mut form.api_endpoint);

            ui.label("Auth type");
            egui::ComboBox::from_id_source("auth_type")
                .selected_text(form.auth_type.as_str())
                .show_ui(ui, |ui| {
                    for auth_type in AuthType::all() {
                        ui.selectable_value(&mut form.auth_type, auth_type, auth_type.as_str());
                    }
                });
            ui.end_row();

            labelled_field(ui, "Pricing model", &mut form.pricing_model);
            labelled_field(ui, "Tags", &mut form.tags);

            ui.label("Capabilities");
            ui.add(
                egui::TextEdit::multiline(&mut form.capabilities)
                    .hint_text("name: description (one per line)")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );
            ui.end_row();
        });

    if let Some(error) = &form.error {
        ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error.as_str());
    }
    ui.add_space(8.0);
    let label = if form.editing.is_some() {
        "Save Changes"
    } else {
        "Register"
    };
    if primary_button(ui, label).clicked() {
        console.submit_registration();
    }
}

fn render_login(ui: &mut egui::Ui, console: &mut Console) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.set_max_width(360.0);
        ui.label("Enter your API key");
        ui.add_space(8.0);
        let field = ui.add(
            egui::TextEdit::singleline(&mut console.login.api_key)
                .password(true)
                .desired_width(f32::INFINITY),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);

        if let Some(error) = &console.login.error {
            ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error.as_str());
            ui.add_space(8.0);
        }

        ui.add_enabled_ui(!console.login.submitting, |ui| {
            if (primary_button(ui, "Log In").clicked() || submitted) && !console.login.submitting {
                console.submit_login();
            }
        });
        if console.login.submitting {
            ui.spinner();
        }
    });
}
