//! Account registration.
//!
//! Registers the device's pseudonymous account and, only once the service
//! confirms it, replaces the local identity record.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::logging::structured::LogContext;
use crate::routing::{interpret_account_response, RegistrationOutcome};
use crate::security::pii::{fingerprint, mask_email};
use crate::storage::{IdentityStore, Profile};

use super::context::{AttemptContext, AttemptKind};
use super::transport::Transport;

/// Body sent to the account endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest<'a> {
    pub identity: &'a str,
    pub accepting_cc_zero: bool,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

pub struct RegistrationClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn IdentityStore>,
    endpoint: String,
    device_id: String,
    ctx: LogContext,
}

impl RegistrationClient {
    /// `device_id` is used for a first registration; without one a random
    /// id is generated here and reused for every attempt by this client.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn IdentityStore>,
        endpoint: &str,
        device_id: Option<&str>,
        ctx: &LogContext,
    ) -> Self {
        let device_id = device_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string().to_uppercase());
        Self {
            transport,
            store,
            endpoint: endpoint.to_string(),
            device_id,
            ctx: ctx.clone(),
        }
    }

    /// The id to register: the stored identity's, else this device's.
    pub fn account_id(&self) -> String {
        match self.store.get() {
            Ok(Some(identity)) => identity.id,
            Ok(None) => self.device_id.clone(),
            Err(e) => {
                log::warn!("{} IDENTITY_READ_FAILED error={}", self.ctx, e);
                self.device_id.clone()
            }
        }
    }

    /// Register `profile` and replace the local identity on success.
    ///
    /// A profile that has not accepted the open licence is refused before
    /// anything is sent.
    pub async fn register(&self, profile: Profile) -> RegistrationOutcome {
        let attempt = AttemptContext::new(&self.ctx, AttemptKind::Registration);
        let ctx = attempt.log_context();

        if !profile.accepts_open_license {
            log::warn!("{} ACCOUNT_REGISTER_BLOCKED reason=license", ctx);
            return RegistrationOutcome::LicenseNotAccepted;
        }

        let account_id = self.account_id();

        let request = AccountRequest {
            identity: &account_id,
            accepting_cc_zero: true,
            first_name: &profile.first_name,
            last_name: &profile.last_name,
        };
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(e) => {
                log::error!("{} ACCOUNT_ENCODE_FAILED error={}", ctx, e);
                return RegistrationOutcome::NetworkError;
            }
        };

        log::info!(
            "{} ACCOUNT_REGISTER_START endpoint={} account={} name_fp={} email={}",
            ctx,
            self.endpoint,
            account_id,
            fingerprint(&format!("{} {}", profile.first_name, profile.last_name)),
            mask_email(&profile.email)
        );

        let result = self.transport.post_json(&self.endpoint, body).await;
        if let Err(kind) = interpret_account_response(result, ctx) {
            log::warn!(
                "{} ACCOUNT_REGISTER_COMPLETE outcome={} elapsed_ms={}",
                ctx,
                kind.as_str(),
                attempt.elapsed_ms()
            );
            return RegistrationOutcome::from(kind);
        }

        let identity = profile.into_identity(&account_id, Utc::now());
        match self.store.replace(identity.clone()) {
            Ok(()) => {
                log::info!(
                    "{} IDENTITY_REPLACED account={} elapsed_ms={}",
                    ctx,
                    account_id,
                    attempt.elapsed_ms()
                );
                RegistrationOutcome::Success(identity)
            }
            Err(e) => {
                log::error!("{} IDENTITY_WRITE_FAILED account={} error={}", ctx, account_id, e);
                RegistrationOutcome::PersistenceError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::pipeline::transport::{MockTransport, ResponseReceived};
    use crate::storage::{InMemoryIdentityStore, MockIdentityStore};

    fn profile() -> Profile {
        Profile {
            first_name: "Anna".to_string(),
            last_name: "Svensson".to_string(),
            email: "anna@example.se".to_string(),
            accepts_open_license: true,
        }
    }

    fn responding(body: &'static str) -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(1).returning(move |_, _| {
            Ok(ResponseReceived {
                status: 200,
                body: body.as_bytes().to_vec(),
            })
        });
        transport
    }

    fn client(transport: MockTransport, store: Arc<dyn IdentityStore>) -> RegistrationClient {
        RegistrationClient::new(
            Arc::new(transport),
            store,
            "http://collector.test/api/0.0.5/account/set",
            Some("DEVICE-1"),
            &LogContext::new("test-session"),
        )
    }

    #[test]
    fn test_request_wire_shape() {
        let request = AccountRequest {
            identity: "DEVICE-1",
            accepting_cc_zero: true,
            first_name: "Anna",
            last_name: "Svensson",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "identity": "DEVICE-1",
                "acceptingCcZero": true,
                "firstName": "Anna",
                "lastName": "Svensson"
            })
        );
    }

    #[tokio::test]
    async fn test_success_replaces_identity() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let outcome = client(responding(r#"{"success":true}"#), store.clone())
            .register(profile())
            .await;

        let stored = store.get().unwrap().expect("identity stored");
        assert_eq!(outcome, RegistrationOutcome::Success(stored.clone()));
        assert_eq!(stored.id, "DEVICE-1");
        assert_eq!(stored.first_name, "Anna");
        assert_eq!(stored.email, "anna@example.se");
    }

    #[tokio::test]
    async fn test_unaccepted_license_never_sends() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);
        let existing = profile().into_identity("EXISTING-ID", Utc::now());
        let store = Arc::new(InMemoryIdentityStore::with_identity(existing.clone()));

        let mut declined = profile();
        declined.accepts_open_license = false;
        let outcome = client(transport, store.clone()).register(declined).await;

        assert_eq!(outcome, RegistrationOutcome::LicenseNotAccepted);
        assert_eq!(store.get().unwrap(), Some(existing));
    }

    #[tokio::test]
    async fn test_stored_identity_matches_wire_license() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|_, body| {
                let value: serde_json::Value = serde_json::from_slice(body).unwrap();
                value["acceptingCcZero"] == true
            })
            .times(1)
            .returning(|_, _| {
                Ok(ResponseReceived {
                    status: 200,
                    body: br#"{"success":true}"#.to_vec(),
                })
            });
        let store = Arc::new(InMemoryIdentityStore::new());

        let outcome = client(transport, store.clone()).register(profile()).await;

        assert!(outcome.is_success());
        assert!(store.get().unwrap().unwrap().accepts_open_license);
    }

    #[tokio::test]
    async fn test_rejection_leaves_store_untouched() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let outcome = client(responding(r#"{"success":false}"#), store.clone())
            .register(profile())
            .await;

        assert_eq!(outcome, RegistrationOutcome::ServerRejected);
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_reregistration_keeps_account_id() {
        let store = Arc::new(InMemoryIdentityStore::new());
        store
            .replace(profile().into_identity("EXISTING-ID", Utc::now()))
            .unwrap();

        let mut renamed = profile();
        renamed.first_name = "Annika".to_string();
        let outcome = client(responding(r#"{"success":true}"#), store.clone())
            .register(renamed)
            .await;

        assert!(outcome.is_success());
        let stored = store.get().unwrap().unwrap();
        assert_eq!(stored.id, "EXISTING-ID");
        assert_eq!(stored.first_name, "Annika");
    }

    #[tokio::test]
    async fn test_write_failure_is_persistence_error() {
        let mut store = MockIdentityStore::new();
        store.expect_get().returning(|| Ok(None));
        store
            .expect_replace()
            .times(1)
            .returning(|_| Err(PersistenceError::Store("disk full".to_string())));

        let outcome = client(responding(r#"{"success":true}"#), Arc::new(store))
            .register(profile())
            .await;
        assert_eq!(outcome, RegistrationOutcome::PersistenceError);
    }

    #[tokio::test]
    async fn test_generated_device_id_is_stable() {
        let store: Arc<dyn IdentityStore> = Arc::new(InMemoryIdentityStore::new());
        let client = RegistrationClient::new(
            Arc::new(MockTransport::new()),
            store,
            "http://collector.test/api/0.0.5/account/set",
            None,
            &LogContext::new("test-session"),
        );
        let first = client.account_id();
        assert_eq!(first, client.account_id());
        assert!(Uuid::parse_str(&first).is_ok());
    }
}
