/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::notice::Severity;
use relm4::abstractions::Toaster;
use relm4::adw;
use relm4::gtk;
use relm4::gtk::pango;

/// Window-wide messages that do not belong to a single tab.
#[derive(Default)]
pub struct ToastManager {
    toaster: Toaster,
}

impl ToastManager {
    fn create_label(&self, msg: &str, severity: Severity) -> gtk::Label {
        let icon = match severity {
            Severity::Error => "✖",
            _ => "✓",
        };

        gtk::Label::builder()
            .wrap(true)
            .wrap_mode(pango::WrapMode::WordChar)
            .max_width_chars(70)
            .use_markup(true)
            .label(format!(
                "<span foreground='{}'><b>{icon}</b></span> {}",
                severity.color(),
                gtk::glib::markup_escape_text(msg)
            ))
            .build()
    }

    /// Errors stay until dismissed, anything else times out.
    pub fn show(&self, msg: &str, severity: Severity) {
        let (timeout, priority) = match severity {
            Severity::Error => (0, adw::ToastPriority::High),
            _ => (3, adw::ToastPriority::Normal),
        };

        let toast = adw::Toast::builder()
            .custom_title(&self.create_label(msg, severity))
            .timeout(timeout)
            .priority(priority)
            .build();

        self.toaster.add_toast(toast);
    }

    pub fn overlay_widget(&self) -> &adw::ToastOverlay {
        self.toaster.overlay_widget()
    }
}
