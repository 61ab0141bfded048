// Main application layout
// Handles the login gate, panels, modal dialogs and overall UI structure

use super::components::*;
use super::forms::{Confirm, Forms, UiCommand};
use super::sections;
use crate::state::{AppState, Section};
use eframe::egui;

/// Render the login screen
/// Returns the commands raised this frame
pub fn render_login(ctx: &egui::Context, forms: &mut Forms) -> Vec<UiCommand> {
    let mut commands = Vec::new();

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.heading("Subscriber Dashboard");
            ui.add_space(16.0);

            let response = ui.add_enabled(
                !forms.login_locked,
                egui::TextEdit::singleline(&mut forms.password)
                    .password(true)
                    .hint_text("Password")
                    .desired_width(240.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.add_space(8.0);
            let enabled = !forms.login_locked && !forms.login_in_flight;
            let label = if forms.login_in_flight { "Logging in..." } else { "Login" };
            if primary_button(ui, label, enabled).clicked() || (submitted && enabled) {
                commands.push(UiCommand::Login);
            }

            if let Some(error) = &forms.login_error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error);
            }
            if let Some(info) = &forms.attempts_info {
                ui.label(egui::RichText::new(info).weak());
            }
        });
    });

    commands
}

/// Render the authenticated dashboard
/// Includes sidebar, top bar, active section, dialogs and activity log
pub fn render_app_layout(
    ctx: &egui::Context,
    state: &mut AppState,
    forms: &mut Forms,
    log: &mut ActivityLog,
    api_url: &str,
) -> Vec<UiCommand> {
    let mut commands = Vec::new();

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        forms.close_modals();
    }

    render_sidebar(ctx, state, forms);
    render_top_bar(ctx, state, &mut commands);

    egui::TopBottomPanel::bottom("activity_log")
        .resizable(true)
        .default_height(140.0)
        .show(ctx, |ui| log.render(ui));

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.add_space(8.0);
        match state.ui.current_section {
            Section::Dashboard => sections::render_dashboard(ui, state),
            Section::Audience => sections::render_audience(ui, state, forms, &mut commands),
            Section::Compose => sections::render_compose(ui, forms, &mut commands),
            Section::Threads => sections::render_threads(ui, state, forms, &mut commands),
            Section::ApiInfo => sections::render_api_info(ui, api_url),
        }
    });

    render_add_modal(ctx, forms, &mut commands);
    render_confirm(ctx, forms, &mut commands);

    commands
}

/// Left navigation with the logout button pinned at the bottom
fn render_sidebar(ctx: &egui::Context, state: &mut AppState, forms: &mut Forms) {
    egui::SidePanel::left("nav_sidebar")
        .resizable(false)
        .exact_width(170.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("📧 Mailer");
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            for section in Section::ALL {
                let selected = state.ui.current_section == section;
                if ui.selectable_label(selected, section.nav_label()).clicked() {
                    state.switch_section(section);
                }
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.add_space(8.0);
                if danger_button(ui, "Logout", true).clicked() {
                    forms.confirm = Some(Confirm::Logout);
                }
            });
        });
}

/// Title, system status and the sync button
fn render_top_bar(ctx: &egui::Context, state: &AppState, commands: &mut Vec<UiCommand>) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(state.ui.current_section.title());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if state.is_loading {
                    ui.spinner();
                } else if ui.button("⟳ Sync").clicked() {
                    commands.push(UiCommand::Sync);
                }
                ui.separator();
                status_indicator(ui, state.stats.system_status);
            });
        });
    });
}

fn render_add_modal(ctx: &egui::Context, forms: &mut Forms, commands: &mut Vec<UiCommand>) {
    if !forms.show_add_modal {
        return;
    }

    let mut open = true;
    egui::Window::new("Add Subscriber")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("add_subscriber_form")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut forms.new_name);
                    ui.end_row();
                    ui.label("Email");
                    ui.text_edit_singleline(&mut forms.new_email);
                    ui.end_row();
                });
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if forms.adding { "Adding..." } else { "Add" };
                if primary_button(ui, label, !forms.adding).clicked() {
                    commands.push(UiCommand::AddSubscriber);
                }
                if forms.adding {
                    ui.spinner();
                }
                if ui.button("Cancel").clicked() {
                    forms.reset_add_modal();
                }
            });
        });

    if !open {
        forms.reset_add_modal();
    }
}

fn render_confirm(ctx: &egui::Context, forms: &mut Forms, commands: &mut Vec<UiCommand>) {
    let Some(confirm) = forms.confirm.clone() else {
        return;
    };

    let mut answer = None;
    egui::Window::new("Confirm")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(confirm.message());
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if primary_button(ui, "Yes", true).clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
            });
        });

    match answer {
        Some(true) => {
            forms.confirm = None;
            commands.push(confirmed_command(confirm));
        }
        Some(false) => forms.confirm = None,
        None => {}
    }
}

/// Command to run once a dialog is accepted
pub fn confirmed_command(confirm: Confirm) -> UiCommand {
    match confirm {
        Confirm::Logout => UiCommand::Logout,
        Confirm::Unsubscribe(email) => UiCommand::Unsubscribe(email),
        Confirm::BatchDelete(_) => UiCommand::BatchDelete,
        Confirm::Import(entries) => UiCommand::SubmitImport(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImportEntry;

    #[test]
    fn test_confirmed_commands() {
        assert_eq!(confirmed_command(Confirm::Logout), UiCommand::Logout);
        assert_eq!(confirmed_command(Confirm::BatchDelete(4)), UiCommand::BatchDelete);
        assert_eq!(
            confirmed_command(Confirm::Unsubscribe("a@x.com".to_string())),
            UiCommand::Unsubscribe("a@x.com".to_string())
        );

        let entries = vec![ImportEntry::new("A", "a@x.com")];
        assert_eq!(
            confirmed_command(Confirm::Import(entries.clone())),
            UiCommand::SubmitImport(entries)
        );
    }
}
