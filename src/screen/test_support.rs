//! Presenter that records every call, for screen tests.

use parking_lot::Mutex;

use crate::location::FixQuality;

use super::presenter::Presenter;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    ShowBusy,
    HideBusy,
    Alert(String, String),
    NavigateToRegistration,
    NavigateBack,
    Accuracy(f64, FixQuality),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<UiCall>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: UiCall) {
        self.calls.lock().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn show_busy(&self) {
        self.record(UiCall::ShowBusy);
    }

    fn hide_busy(&self) {
        self.record(UiCall::HideBusy);
    }

    fn show_alert(&self, title: &str, message: &str) {
        self.record(UiCall::Alert(title.to_string(), message.to_string()));
    }

    fn navigate_to_registration(&self) {
        self.record(UiCall::NavigateToRegistration);
    }

    fn navigate_back(&self) {
        self.record(UiCall::NavigateBack);
    }

    fn show_accuracy(&self, accuracy_meters: f64, quality: FixQuality) {
        self.record(UiCall::Accuracy(accuracy_meters, quality));
    }
}
