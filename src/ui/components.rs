// Reusable UI components
// Provides common UI elements for the dashboard

use crate::actions::{Notice, NoticeLevel};
use crate::api::{SubscriberStatus, SystemStatus};
use crate::view::{self, QuotaLevel, QuotaUsage};
use eframe::egui;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

const GREEN: egui::Color32 = egui::Color32::from_rgb(0, 180, 0);
const AMBER: egui::Color32 = egui::Color32::from_rgb(220, 160, 0);
const RED: egui::Color32 = egui::Color32::from_rgb(220, 0, 0);
const BLUE: egui::Color32 = egui::Color32::from_rgb(60, 130, 240);

fn level_color(level: NoticeLevel) -> egui::Color32 {
    match level {
        NoticeLevel::Success => GREEN,
        NoticeLevel::Warning => AMBER,
        NoticeLevel::Error => RED,
    }
}

/// Clickable status badge; a click asks for the opposite status
pub fn status_badge(ui: &mut egui::Ui, status: SubscriberStatus) -> egui::Response {
    let color = match status {
        SubscriberStatus::Active => GREEN,
        SubscriberStatus::Unsubscribed => RED,
    };
    ui.add(
        egui::Label::new(egui::RichText::new(view::status_badge_label(status)).color(color))
            .sense(egui::Sense::click()),
    )
    .on_hover_text(format!("Click to mark {}", status.toggled()))
}

/// Green/red dot with the system status label
pub fn status_indicator(ui: &mut egui::Ui, status: SystemStatus) {
    let color = match status {
        SystemStatus::Online => GREEN,
        SystemStatus::Offline => RED,
    };
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, color);
        ui.label(view::system_status_label(status));
    });
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    ui.add_enabled(enabled, egui::Button::new(egui::RichText::new(text).strong()))
}

/// Render a destructive action button (red)
pub fn danger_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    ui.add_enabled(enabled, egui::Button::new(egui::RichText::new(text).color(RED)))
}

/// One stats card: big number over a caption
pub fn stat_card(ui: &mut egui::Ui, caption: &str, value: u64) {
    ui.group(|ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(caption).weak());
            ui.label(egui::RichText::new(value.to_string()).size(24.0).strong().color(BLUE));
        });
    });
}

/// Quota progress bar coloured by usage band
pub fn quota_bar(ui: &mut egui::Ui, usage: QuotaUsage) {
    let fill = match usage.level {
        QuotaLevel::Normal => BLUE,
        QuotaLevel::Warning => AMBER,
        QuotaLevel::Danger => RED,
    };
    ui.add(
        egui::ProgressBar::new((usage.percent_used / 100.0) as f32)
            .fill(fill)
            .text(format!("{:.0}% of quota used", usage.percent_used)),
    );
}

/// Stack of transient notifications in the bottom-right corner
#[derive(Debug, Default)]
pub struct Toasts {
    items: VecDeque<(Notice, Instant)>,
}

impl Toasts {
    /// Queue a toast
    pub fn push(&mut self, notice: Notice) {
        self.items.push_back((notice, Instant::now()));
    }

    /// Number of visible toasts
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Most recent toast
    pub fn last(&self) -> Option<&Notice> {
        self.items.back().map(|(notice, _)| notice)
    }

    /// Whether no toast is visible
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop expired toasts
    pub fn expire(&mut self, now: Instant) {
        self.items
            .retain(|(_, shown)| now.duration_since(*shown) < TOAST_LIFETIME);
    }

    /// Draw the live toasts
    pub fn render(&mut self, ctx: &egui::Context) {
        self.expire(Instant::now());
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .show(ctx, |ui| {
                for (notice, _) in &self.items {
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.5, level_color(notice.level)))
                        .show(ui, |ui| {
                            let color = level_color(notice.level);
                            ui.label(egui::RichText::new(&notice.message).color(color));
                        });
                    ui.add_space(4.0);
                }
            });
        // Wake up again to remove expired toasts
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/// Activity log display area
/// Keeps a scrollable history of every notification
pub struct ActivityLog {
    /// Buffer of output lines
    lines: Vec<String>,
    /// Maximum number of lines to keep (0 = unlimited)
    max_lines: usize,
    /// Whether to auto-scroll to bottom
    auto_scroll: bool,
}

impl ActivityLog {
    /// Create a new activity log
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_lines,
            auto_scroll: true,
        }
    }

    /// Add a line to the log, prefixed with the local time
    pub fn add_line(&mut self, line: String) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.lines.push(format!("[{}] {}", stamp, line));
        if self.max_lines > 0 && self.lines.len() > self.max_lines {
            self.lines.remove(0);
        }
    }

    /// Lines currently held
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Clear all output
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Render the log in a scrollable area
    pub fn render(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Activity").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    self.clear();
                }
                ui.checkbox(&mut self.auto_scroll, "Auto-scroll");
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_source("activity_log_scroll")
            .auto_shrink([false; 2])
            .max_height(120.0)
            .show(ui, |ui| {
                for line in &self.lines {
                    ui.label(
                        egui::RichText::new(line)
                            .size(12.0)
                            .family(egui::FontFamily::Monospace),
                    );
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_log_is_bounded() {
        let mut log = ActivityLog::new(2);
        log.add_line("one".to_string());
        log.add_line("two".to_string());
        log.add_line("three".to_string());
        assert_eq!(log.lines().len(), 2);
        assert!(log.lines()[0].ends_with("two"));
        assert!(log.lines()[1].ends_with("three"));
    }

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::default();
        toasts.push(Notice::success("saved"));
        assert_eq!(toasts.len(), 1);

        toasts.expire(Instant::now() + TOAST_LIFETIME + Duration::from_millis(1));
        assert!(toasts.is_empty());
    }
}
