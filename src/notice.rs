/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use std::time::Duration;

/// How long a flashed notice stays on screen.
pub const FLASH_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Neutral,
    Info,
    Success,
    Error,
}

impl Severity {
    /// Pango color used to render the notice.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Neutral => "white",
            Severity::Info => "deepskyblue",
            Severity::Success => "lime",
            Severity::Error => "red",
        }
    }
}

/// Identifies one flash; a hide carrying an older token is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashToken(u64);

/// Status line shown under a tab's editor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Notice {
    text: String,
    severity: Severity,
    visible: bool,
    generation: u64,
}

impl Notice {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show a notice that stays until something replaces it.
    pub fn show(&mut self, text: impl Into<String>, severity: Severity) {
        self.set(text.into(), severity);
    }

    /// Show a notice that should disappear after [`FLASH_DURATION`].
    pub fn flash(&mut self, text: impl Into<String>, severity: Severity) -> FlashToken {
        self.set(text.into(), severity);
        FlashToken(self.generation)
    }

    /// Hide the notice if it is still the one `token` was issued for.
    pub fn expire(&mut self, token: FlashToken) -> bool {
        if token.0 != self.generation || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.text.clear();
        self.severity = Severity::Neutral;
        self.visible = false;
    }

    fn set(&mut self, text: String, severity: Severity) {
        self.generation += 1;
        self.text = text;
        self.severity = severity;
        self.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_then_expire_hides() {
        let mut notice = Notice::default();
        let token = notice.flash("Configuration updated!", Severity::Success);
        assert!(notice.is_visible());

        assert!(notice.expire(token));
        assert!(!notice.is_visible());
        assert!(!notice.expire(token));
    }

    #[test]
    fn stale_token_does_not_hide_newer_notice() {
        let mut notice = Notice::default();
        let old = notice.flash("wg0 is up", Severity::Success);
        notice.show("Error: permission denied", Severity::Error);

        assert!(!notice.expire(old));
        assert!(notice.is_visible());
        assert_eq!(notice.severity(), Severity::Error);
    }

    #[test]
    fn newer_flash_survives_older_timer() {
        let mut notice = Notice::default();
        let first = notice.flash("wg0 is down", Severity::Success);
        let second = notice.flash("wg0 is up", Severity::Success);

        assert!(!notice.expire(first));
        assert_eq!(notice.text(), "wg0 is up");
        assert!(notice.expire(second));
    }

    #[test]
    fn clear_invalidates_pending_flash() {
        let mut notice = Notice::default();
        let token = notice.flash("saved", Severity::Success);
        notice.clear();

        assert!(!notice.expire(token));
        assert_eq!(notice, Notice { generation: 2, ..Default::default() });
    }
}
