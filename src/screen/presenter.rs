//! UI presentation port.
//!
//! The core never renders. It tells the presenter what to show and where
//! to go; the platform decides how.

use crate::location::FixQuality;

use super::messages::UserMessage;

#[cfg_attr(test, mockall::automock)]
pub trait Presenter: Send + Sync {
    fn show_busy(&self);

    fn hide_busy(&self);

    fn show_alert(&self, title: &str, message: &str);

    fn navigate_to_registration(&self);

    fn navigate_back(&self);

    /// Accuracy readout above the map; poor fixes are highlighted.
    fn show_accuracy(&self, accuracy_meters: f64, quality: FixQuality);
}

/// Show a [`UserMessage`] as an alert.
pub fn present(presenter: &dyn Presenter, message: &UserMessage) {
    presenter.show_alert(&message.title, &message.message);
}
