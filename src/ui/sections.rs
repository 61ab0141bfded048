// Section views
// One render function per sidebar section

use super::components::*;
use super::forms::{Confirm, Forms, UiCommand};
use crate::state::AppState;
use crate::view::{self, SortColumn};
use eframe::egui;

/// Stats cards and quota bar
pub fn render_dashboard(ui: &mut egui::Ui, state: &AppState) {
    let stats = &state.stats;
    ui.horizontal_wrapped(|ui| {
        stat_card(ui, "Total Subscribers", stats.total);
        stat_card(ui, "Active Subscribers", stats.active);
        stat_card(ui, "Total Opens", stats.total_opens);
        stat_card(ui, "Total Clicks", stats.total_clicks);
        stat_card(ui, "Remaining Emails", stats.remaining_emails);
    });

    ui.add_space(16.0);
    ui.label(egui::RichText::new("Email Quota").strong());
    quota_bar(ui, view::quota_usage(stats));
}

/// Subscriber table with search, sorting, pagination and batch actions
pub fn render_audience(
    ui: &mut egui::Ui,
    state: &mut AppState,
    forms: &mut Forms,
    commands: &mut Vec<UiCommand>,
) {
    render_audience_toolbar(ui, state, forms, commands);
    ui.add_space(8.0);

    if state.ui.selected_count() > 0 {
        ui.horizontal(|ui| {
            ui.label(format!("{} selected", state.ui.selected_count()));
            let deleting = forms.batch_deleting;
            let label = if deleting { "Deleting..." } else { "Delete Selected" };
            if danger_button(ui, label, !deleting).clicked() {
                forms.confirm = Some(Confirm::BatchDelete(state.ui.selected_count()));
            }
            if ui.button("Clear Selection").clicked() {
                state.ui.clear_selection();
            }
        });
        ui.add_space(8.0);
    }

    // Owned copies so the table can mutate UI state while drawing
    let page = view::compute_visible_rows(&state.subscribers, &state.ui);
    let rows: Vec<_> = page.rows.iter().map(|s| (*s).clone()).collect();
    let (current, total_pages) = (page.page, page.total_pages);
    let (prev_enabled, next_enabled, show_pagination) =
        (page.prev_enabled(), page.next_enabled(), page.show_pagination());
    let is_empty = page.is_empty();
    state.ui.current_page = current;

    if is_empty {
        ui.vertical_centered(|ui| {
            ui.add_space(32.0);
            ui.label(egui::RichText::new("No subscribers found").weak().italics());
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_source("subscriber_table_scroll")
        .max_height(ui.available_height() - 48.0)
        .show(ui, |ui| {
            egui::Grid::new("subscriber_table")
                .striped(true)
                .num_columns(9)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    let mut all_checked = rows.iter().all(|s| state.ui.is_selected(&s.email));
                    if ui.checkbox(&mut all_checked, "").changed() {
                        state
                            .ui
                            .select_all(rows.iter().map(|s| s.email.as_str()), all_checked);
                    }
                    ui.strong("Name");
                    ui.strong("Email");
                    ui.strong("Status");
                    ui.strong("Date");
                    if ui.button(sort_header(state, SortColumn::Opens, "Opens")).clicked() {
                        state.ui.toggle_sort(SortColumn::Opens);
                    }
                    if ui.button(sort_header(state, SortColumn::Clicks, "Clicks")).clicked() {
                        state.ui.toggle_sort(SortColumn::Clicks);
                    }
                    ui.strong("Click Rate");
                    ui.strong("Actions");
                    ui.end_row();

                    for sub in &rows {
                        let mut checked = state.ui.is_selected(&sub.email);
                        if ui.checkbox(&mut checked, "").changed() {
                            state.ui.toggle_selection(&sub.email, checked);
                        }
                        ui.label(egui::RichText::new(&sub.name).strong());
                        ui.label(&sub.email);
                        if status_badge(ui, sub.status).clicked() {
                            commands.push(UiCommand::UpdateStatus {
                                email: sub.email.clone(),
                                status: sub.status.toggled(),
                            });
                        }
                        ui.label(sub.date.as_deref().unwrap_or("N/A"));
                        ui.label(sub.opens.to_string());
                        ui.label(sub.clicks.to_string());
                        ui.label(format!("{}%", view::format_click_rate(sub)));
                        ui.horizontal(|ui| {
                            if ui.small_button("✉").on_hover_text("Quick Compose").clicked() {
                                commands.push(UiCommand::QuickCompose(sub.email.clone()));
                            }
                            if ui.small_button("💬").on_hover_text("View Threads").clicked() {
                                commands.push(UiCommand::OpenThread(sub.email.clone()));
                            }
                            if ui.small_button("🗑").on_hover_text("Delete Subscriber").clicked() {
                                forms.confirm = Some(Confirm::Unsubscribe(sub.email.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
        });

    if show_pagination {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(prev_enabled, egui::Button::new("◀ Prev")).clicked() {
                state.ui.prev_page();
            }
            ui.label(format!("Page {} of {}", current, total_pages));
            if ui.add_enabled(next_enabled, egui::Button::new("Next ▶")).clicked() {
                state.ui.next_page(total_pages);
            }
        });
    }
}

fn sort_header(state: &AppState, column: SortColumn, label: &str) -> String {
    match state.ui.sort {
        Some(sort) if sort.column == column => format!("{} {}", label, sort.direction.arrow()),
        _ => label.to_string(),
    }
}

fn render_audience_toolbar(
    ui: &mut egui::Ui,
    state: &mut AppState,
    forms: &mut Forms,
    commands: &mut Vec<UiCommand>,
) {
    ui.horizontal_wrapped(|ui| {
        let mut search = state.ui.search_term.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .hint_text("Search name or email")
                .desired_width(220.0),
        );
        if response.changed() {
            state.ui.set_search(search);
        }

        if primary_button(ui, "+ Add Subscriber", true).clicked() {
            forms.show_add_modal = true;
        }
        if ui.button("Export CSV").clicked() {
            commands.push(UiCommand::ExportCsv);
        }
    });

    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        ui.label("From");
        ui.add(
            egui::TextEdit::singleline(&mut forms.date_start)
                .hint_text("YYYY-MM-DD")
                .desired_width(100.0),
        );
        ui.label("To");
        ui.add(
            egui::TextEdit::singleline(&mut forms.date_end)
                .hint_text("YYYY-MM-DD")
                .desired_width(100.0),
        );
        if ui.button("Set Range").clicked() {
            state.ui.set_date_range(&forms.date_start, &forms.date_end);
        }

        ui.separator();
        ui.label("Import");
        ui.add(
            egui::TextEdit::singleline(&mut forms.import_path)
                .hint_text("path/to/subscribers.csv or .json")
                .desired_width(240.0),
        );
        if ui
            .add_enabled(!forms.import_path.trim().is_empty(), egui::Button::new("Import"))
            .clicked()
        {
            commands.push(UiCommand::ParseImport);
        }
    });
}

/// Compose form
pub fn render_compose(ui: &mut egui::Ui, forms: &mut Forms, commands: &mut Vec<UiCommand>) {
    egui::Grid::new("compose_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("To");
            ui.add(egui::TextEdit::singleline(&mut forms.compose.to).desired_width(360.0));
            ui.end_row();

            ui.label("Sender Name");
            ui.add(egui::TextEdit::singleline(&mut forms.compose.sender_name).desired_width(360.0));
            ui.end_row();

            ui.label("Subject");
            ui.add(egui::TextEdit::singleline(&mut forms.compose.subject).desired_width(360.0));
            ui.end_row();

            ui.label("Body");
            ui.add(
                egui::TextEdit::multiline(&mut forms.compose.body)
                    .desired_rows(10)
                    .desired_width(360.0),
            );
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let label = if forms.sending { "Sending..." } else { "Send Email" };
        if primary_button(ui, label, !forms.sending).clicked() {
            commands.push(UiCommand::SendEmail);
        }
        if forms.sending {
            ui.spinner();
        }
    });
}

/// Conversation lookup and history
pub fn render_threads(
    ui: &mut egui::Ui,
    state: &AppState,
    forms: &mut Forms,
    commands: &mut Vec<UiCommand>,
) {
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut forms.thread_email)
                .hint_text("subscriber@example.com")
                .desired_width(260.0),
        );
        if primary_button(ui, "Load Threads", !forms.loading_thread).clicked()
            && !forms.thread_email.trim().is_empty()
        {
            commands.push(UiCommand::LoadConversation(forms.thread_email.trim().to_string()));
        }
        if forms.loading_thread {
            ui.spinner();
        }
    });
    ui.add_space(12.0);

    let history = state
        .conversation
        .as_ref()
        .map(|c| c.history.as_slice())
        .unwrap_or_default();

    if history.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("💬 No conversations found");
            ui.label(egui::RichText::new("Start a conversation with this subscriber").weak());
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_source("threads_scroll")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for msg in history {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&msg.from).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let stamp = view::format_timestamp(msg.timestamp);
                            ui.label(egui::RichText::new(stamp).small().weak());
                        });
                    });
                    ui.label(egui::RichText::new(&msg.subject).strong());
                    ui.label(egui::RichText::new(view::preview_body(&msg.body)).weak());
                });
                ui.add_space(8.0);
            }
        });
}

/// Endpoint information
pub fn render_api_info(ui: &mut egui::Ui, base_url: &str) {
    ui.label(egui::RichText::new("Backend Endpoint").strong());
    ui.add_space(4.0);
    ui.label(egui::RichText::new(base_url).monospace());
    ui.add_space(12.0);
    ui.label("GET actions: login, logout, getDashboard, getConversation, unsubscribe");
    ui.label("POST actions: addSubscriber, sendEmail, updateStatus, importSubscribers");
}
