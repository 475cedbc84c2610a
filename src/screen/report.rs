//! Report screen controller.
//!
//! Owns the address form and the busy flag, checks the identity gate on
//! entry, and runs one submission at a time:
//! 1. Identity lookup (no identity -> registration)
//! 2. Form validation
//! 3. Payload snapshot with the latest fix
//! 4. Submission, with the busy flag raised
//! 5. One alert for the outcome

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::{PersistenceError, ValidationError};
use crate::location::{LocationProvider, LocationSampler, SamplerNotice};
use crate::logging::structured::LogContext;
use crate::pipeline::{ReportBuilder, SubmissionClient};
use crate::routing::SubmissionOutcome;
use crate::storage::{Identity, IdentityStore};
use crate::validation::{AddressForm, FieldId, FieldValidation};

use super::messages::UserMessage;
use super::presenter::{present, Presenter};

/// Result of the startup gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Ready(Identity),
    RegistrationRequired,
}

/// Why a submit was refused before anything was sent.
#[derive(Debug, Error)]
pub enum SubmitRejected {
    #[error("no local identity; registration required")]
    RegistrationRequired,

    #[error("a submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub struct ReportScreen {
    form: AddressForm,
    sampler: LocationSampler,
    store: Arc<dyn IdentityStore>,
    client: SubmissionClient,
    builder: ReportBuilder,
    presenter: Arc<dyn Presenter>,
    busy: watch::Sender<bool>,
    ctx: LogContext,
}

impl ReportScreen {
    pub fn new(
        sampler: LocationSampler,
        store: Arc<dyn IdentityStore>,
        client: SubmissionClient,
        builder: ReportBuilder,
        presenter: Arc<dyn Presenter>,
        ctx: &LogContext,
    ) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            form: AddressForm::new(),
            sampler,
            store,
            client,
            builder,
            presenter,
            busy,
            ctx: ctx.clone(),
        }
    }

    /// Startup gate: route to registration when no identity exists.
    ///
    /// An unreadable store is treated like an empty one; registering
    /// again replaces whatever is there.
    pub fn enter(&self) -> GateDecision {
        match self.store.get() {
            Ok(Some(identity)) => {
                log::info!("{} GATE_PASSED account={}", self.ctx, identity.id);
                GateDecision::Ready(identity)
            }
            Ok(None) => {
                log::info!("{} GATE_REGISTRATION_REQUIRED reason=no_identity", self.ctx);
                self.presenter.navigate_to_registration();
                GateDecision::RegistrationRequired
            }
            Err(e) => {
                log::error!("{} GATE_REGISTRATION_REQUIRED reason=store_error error={}", self.ctx, e);
                self.presenter.navigate_to_registration();
                GateDecision::RegistrationRequired
            }
        }
    }

    /// Start location sampling and forward its notices to the presenter.
    ///
    /// Returns the sampler's pump task on the first call. The forwarder
    /// runs until the sampler is dropped.
    pub async fn start_location(
        &self,
        provider: Arc<dyn LocationProvider>,
    ) -> Option<JoinHandle<()>> {
        if self.sampler.is_started() {
            return None;
        }
        spawn_notice_forwarder(self.sampler.subscribe(), self.presenter.clone());
        self.sampler.start(provider).await
    }

    pub fn sampler(&self) -> &LocationSampler {
        &self.sampler
    }

    pub fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Keystroke-level text change.
    pub fn set_text(&mut self, field: FieldId, text: &str) {
        self.form.set_text(field, text);
    }

    /// Edit-completion event for a field.
    pub fn complete_edit(&mut self, field: FieldId) -> FieldValidation {
        self.form.complete_edit(field)
    }

    /// `set_text` followed by `complete_edit`.
    pub fn edit(&mut self, field: FieldId, text: &str) -> FieldValidation {
        self.form.edit(field, text)
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Observable busy flag.
    pub fn busy_updates(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    /// Drives the submit button.
    ///
    /// Reads the validation evaluated at each field's last edit
    /// completion; text set since then is not considered until the edit
    /// completes. [`ReportScreen::submit`] applies the same check and then
    /// re-validates the live text.
    pub fn submit_enabled(&self) -> bool {
        self.form.is_ready_to_submit() && !self.is_busy()
    }

    pub fn show_about(&self) {
        crate::log_debug!(self.ctx, "ABOUT_SHOWN", fix_quality = self.sampler.fix_quality());
        present(self.presenter.as_ref(), &UserMessage::about());
    }

    /// Build and send one report.
    ///
    /// Returns the outcome once the presenter has been told about it.
    pub async fn submit(&self) -> Result<SubmissionOutcome, SubmitRejected> {
        let identity = match self.store.get() {
            Ok(Some(identity)) => identity,
            Err(e) => {
                log::error!("{} REPORT_BLOCKED reason=store_error error={}", self.ctx, e);
                present(self.presenter.as_ref(), &UserMessage::report_failed());
                return Err(SubmitRejected::Persistence(e));
            }
            Ok(None) => {
                log::warn!("{} REPORT_BLOCKED reason=no_identity", self.ctx);
                self.presenter.navigate_to_registration();
                return Err(SubmitRejected::RegistrationRequired);
            }
        };

        if let Some(field) = FieldId::REQUIRED
            .into_iter()
            .find(|field| !self.form.validation(*field).valid)
        {
            log::info!("{} REPORT_BLOCKED reason=not_ready field={}", self.ctx, field);
            return Err(SubmitRejected::Invalid(ValidationError {
                field,
                message: self.form.validation(field).message.unwrap_or_default(),
            }));
        }

        let fix = self.sampler.current_fix();
        let payload = self
            .builder
            .build_validated(&self.form, fix.as_ref(), &identity)
            .map_err(|e| {
                log::info!("{} REPORT_BLOCKED reason=invalid field={}", self.ctx, e.field);
                e
            })?;

        if fix.is_none() {
            log::warn!("{} REPORT_WITHOUT_FIX coordinate=zero", self.ctx);
        }

        if !self.acquire_busy() {
            log::warn!("{} REPORT_BLOCKED reason=in_flight", self.ctx);
            return Err(SubmitRejected::InFlight);
        }
        self.presenter.show_busy();

        let outcome = self.client.submit(&payload).await;

        self.busy.send_replace(false);
        self.presenter.hide_busy();
        present(self.presenter.as_ref(), &UserMessage::from(&outcome));

        Ok(outcome)
    }

    /// Check-and-set on the busy flag.
    fn acquire_busy(&self) -> bool {
        self.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        })
    }
}

/// Forward sampler notices to the presenter until the sampler goes away.
pub fn spawn_notice_forwarder(
    mut notices: broadcast::Receiver<SamplerNotice>,
    presenter: Arc<dyn Presenter>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(notice) => handle_notice(presenter.as_ref(), &notice),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("LOCATION_NOTICES_LAGGED skipped={}", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Translate one sampler notice into presenter calls.
pub fn handle_notice(presenter: &dyn Presenter, notice: &SamplerNotice) {
    match notice {
        SamplerNotice::AuthorizationDenied => {
            present(presenter, &UserMessage::location_disabled());
        }
        SamplerNotice::FixUpdated {
            accuracy_meters,
            quality,
        } => presenter.show_accuracy(*accuracy_meters, *quality),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::TransportError;
    use crate::location::{FixQuality, LocationFix};
    use crate::pipeline::{MockTransport, ResponseReceived};
    use crate::screen::presenter::MockPresenter;
    use crate::screen::test_support::{RecordingPresenter, UiCall};
    use crate::storage::InMemoryIdentityStore;

    const ENDPOINT: &str = "http://collector.test/api/0.0.5/location_sample/create";

    fn ctx() -> LogContext {
        LogContext::new("test-session")
    }

    fn identity() -> Identity {
        Identity {
            id: "device-1".to_string(),
            accepts_open_license: true,
            first_name: "Anna".to_string(),
            last_name: "Svensson".to_string(),
            email: "anna@example.se".to_string(),
            updated_at: Utc::now(),
        }
    }

    fn screen(
        store: Arc<dyn IdentityStore>,
        transport: MockTransport,
        presenter: Arc<dyn Presenter>,
    ) -> ReportScreen {
        let client = SubmissionClient::new(Arc::new(transport), ENDPOINT, &ctx());
        ReportScreen::new(
            LocationSampler::new(&ctx()),
            store,
            client,
            ReportBuilder::new("insamlingsappen-ios", "1.0"),
            presenter,
            &ctx(),
        )
    }

    fn fill_valid(screen: &mut ReportScreen) {
        screen.edit(FieldId::PostalCode, "12345");
        screen.edit(FieldId::PostalTown, "Stockholm");
        screen.edit(FieldId::StreetName, "Main Street");
        screen.edit(FieldId::HouseNumber, "1");
    }

    #[test]
    fn test_gate_routes_to_registration_when_empty() {
        let mut presenter = MockPresenter::new();
        presenter.expect_navigate_to_registration().times(1).return_const(());

        let screen = screen(
            Arc::new(InMemoryIdentityStore::new()),
            MockTransport::new(),
            Arc::new(presenter),
        );
        assert_eq!(screen.enter(), GateDecision::RegistrationRequired);
    }

    #[test]
    fn test_gate_passes_with_identity() {
        let presenter = MockPresenter::new();
        let screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            MockTransport::new(),
            Arc::new(presenter),
        );
        assert!(matches!(screen.enter(), GateDecision::Ready(i) if i.id == "device-1"));
    }

    #[test]
    fn test_submit_enabled_follows_form() {
        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            MockTransport::new(),
            Arc::new(MockPresenter::new()),
        );
        assert!(!screen.submit_enabled());
        fill_valid(&mut screen);
        assert!(screen.submit_enabled());
    }

    #[tokio::test]
    async fn test_submit_without_identity_never_sends() {
        let mut presenter = MockPresenter::new();
        presenter.expect_navigate_to_registration().times(1).return_const(());
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);

        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::new()),
            transport,
            Arc::new(presenter),
        );
        fill_valid(&mut screen);

        assert!(matches!(
            screen.submit().await,
            Err(SubmitRejected::RegistrationRequired)
        ));
    }

    #[tokio::test]
    async fn test_submit_invalid_form_never_sends() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);

        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            transport,
            Arc::new(MockPresenter::new()),
        );
        fill_valid(&mut screen);
        screen.edit(FieldId::PostalCode, "123");

        match screen.submit().await {
            Err(SubmitRejected::Invalid(e)) => assert_eq!(e.field, FieldId::PostalCode),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_waits_for_edit_completion() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);

        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            transport,
            Arc::new(RecordingPresenter::default()),
        );
        screen.set_text(FieldId::PostalCode, "12345");
        screen.set_text(FieldId::PostalTown, "Stockholm");
        screen.set_text(FieldId::StreetName, "Main Street");
        screen.set_text(FieldId::HouseNumber, "1");
        assert!(!screen.submit_enabled());

        match screen.submit().await {
            Err(SubmitRejected::Invalid(e)) => {
                assert_eq!(e.field, FieldId::PostalCode);
                assert_eq!(e.message, "wrong digit count in postal code");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_uses_latest_fix_and_reports_once() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|_, body| {
                let value: serde_json::Value = serde_json::from_slice(body).unwrap();
                value["coordinate"]["latitude"] == 59.5 && value["coordinate"]["accuracy"] == 90.0
            })
            .times(1)
            .returning(|_, _| {
                Ok(ResponseReceived {
                    status: 200,
                    body: br#"{"identity":"r9"}"#.to_vec(),
                })
            });

        let presenter = Arc::new(RecordingPresenter::default());
        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            transport,
            presenter.clone(),
        );
        fill_valid(&mut screen);
        screen.sampler().on_fix_received(LocationFix::new(59.0, 18.0, 5.0, 1.0));
        // Worse accuracy, still wins.
        screen.sampler().on_fix_received(LocationFix::new(59.5, 18.5, 90.0, 1.0));

        let outcome = screen.submit().await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Success {
                report_id: "r9".to_string()
            }
        );
        assert_eq!(
            presenter.calls(),
            vec![
                UiCall::ShowBusy,
                UiCall::HideBusy,
                UiCall::Alert("Tack".to_string(), "Tack för din rapport. (nr. r9)".to_string()),
            ]
        );
        assert!(!screen.is_busy());
    }

    #[tokio::test]
    async fn test_network_error_alerts_and_clears_busy() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .times(1)
            .returning(|_, _| Err(TransportError::Connect("refused".to_string())));

        let presenter = Arc::new(RecordingPresenter::default());
        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            transport,
            presenter.clone(),
        );
        fill_valid(&mut screen);
        let busy = screen.busy_updates();

        let outcome = screen.submit().await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::NetworkError);
        assert!(!*busy.borrow());
        assert_eq!(
            presenter.calls().last(),
            Some(&UiCall::Alert(
                "Fel".to_string(),
                "Kunde inte skapa rapport. Försök senare.".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_busy_flag_blocks_second_submit() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);

        let mut screen = screen(
            Arc::new(InMemoryIdentityStore::with_identity(identity())),
            transport,
            Arc::new(RecordingPresenter::default()),
        );
        fill_valid(&mut screen);
        assert!(screen.acquire_busy());
        assert!(!screen.submit_enabled());

        assert!(matches!(screen.submit().await, Err(SubmitRejected::InFlight)));
    }

    #[test]
    fn test_notices_reach_presenter() {
        let presenter = RecordingPresenter::default();
        handle_notice(&presenter, &SamplerNotice::AuthorizationDenied);
        handle_notice(
            &presenter,
            &SamplerNotice::FixUpdated {
                accuracy_meters: 75.0,
                quality: FixQuality::Poor,
            },
        );

        assert_eq!(
            presenter.calls(),
            vec![
                UiCall::Alert(
                    "Platsinformation avstängd".to_string(),
                    "För att detta ska lira behöver vi få information om din plats.".to_string()
                ),
                UiCall::Accuracy(75.0, FixQuality::Poor),
            ]
        );
    }
}
