//! Registration screen controller.
//!
//! Prefills from an existing identity, holds the licence switch and sends
//! the profile. On success the presenter navigates back; on anything else
//! it shows one failure alert and the user stays here.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::logging::structured::LogContext;
use crate::pipeline::RegistrationClient;
use crate::routing::RegistrationOutcome;
use crate::storage::{IdentityStore, Profile};

use super::messages::registration_message;
use super::presenter::{present, Presenter};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveRejected {
    #[error("the open licence has not been accepted")]
    LicenseNotAccepted,

    #[error("a registration is already in flight")]
    InFlight,
}

pub struct RegistrationScreen {
    profile: Profile,
    license_locked: bool,
    client: RegistrationClient,
    presenter: Arc<dyn Presenter>,
    busy: watch::Sender<bool>,
    ctx: LogContext,
}

impl RegistrationScreen {
    /// Open the screen, prefilling from the stored identity if there is one.
    pub fn open(
        store: &dyn IdentityStore,
        client: RegistrationClient,
        presenter: Arc<dyn Presenter>,
        ctx: &LogContext,
    ) -> Self {
        let existing = match store.get() {
            Ok(existing) => existing,
            Err(e) => {
                log::warn!("{} PROFILE_PREFILL_FAILED error={}", ctx, e);
                None
            }
        };

        let (profile, license_locked) = match existing {
            Some(identity) => (Profile::from_identity(&identity), true),
            None => (Profile::default(), false),
        };
        log::debug!("{} REGISTRATION_OPENED prefilled={}", ctx, license_locked);

        let (busy, _) = watch::channel(false);
        Self {
            profile,
            license_locked,
            client,
            presenter,
            busy,
            ctx: ctx.clone(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn set_first_name(&mut self, value: &str) {
        self.profile.first_name = value.to_string();
    }

    pub fn set_last_name(&mut self, value: &str) {
        self.profile.last_name = value.to_string();
    }

    pub fn set_email(&mut self, value: &str) {
        self.profile.email = value.to_string();
    }

    /// Toggle the licence switch. Locked on once an identity exists.
    pub fn set_license_accepted(&mut self, accepted: bool) {
        if self.license_locked {
            return;
        }
        self.profile.accepts_open_license = accepted;
    }

    pub fn is_license_locked(&self) -> bool {
        self.license_locked
    }

    /// Drives the save button.
    pub fn can_submit(&self) -> bool {
        self.profile.accepts_open_license && !*self.busy.borrow()
    }

    pub fn busy_updates(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    /// Register and react to the outcome.
    pub async fn save(&self) -> Result<RegistrationOutcome, SaveRejected> {
        if !self.profile.accepts_open_license {
            log::info!("{} REGISTRATION_BLOCKED reason=license", self.ctx);
            return Err(SaveRejected::LicenseNotAccepted);
        }

        let acquired = self.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        if !acquired {
            return Err(SaveRejected::InFlight);
        }
        self.presenter.show_busy();

        let outcome = self.client.register(self.profile.clone()).await;

        self.busy.send_replace(false);
        self.presenter.hide_busy();
        crate::log_info!(
            self.ctx,
            "REGISTRATION_SAVE_COMPLETE",
            outcome = outcome.as_str(),
            license_locked = self.license_locked,
        );

        match registration_message(&outcome) {
            None => self.presenter.navigate_back(),
            Some(message) => present(self.presenter.as_ref(), &message),
        }

        Ok(outcome)
    }
}
