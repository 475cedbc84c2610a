//! Location provider port.
//!
//! The platform's location manager sits behind [`LocationProvider`]. It
//! answers the authorization request and hands out a single event stream.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::models::{AuthorizationStatus, LocationEvent};

/// Buffer size for provider event channels.
pub const EVENT_BUFFER: usize = 32;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for "while in use" access and report the resulting state.
    async fn request_when_in_use_authorization(&self) -> AuthorizationStatus;

    /// Stream of fixes and authorization changes, in delivery order.
    fn subscribe(&self) -> mpsc::Receiver<LocationEvent>;
}

/// Provider backed by an in-process channel.
///
/// Whoever holds the paired sender plays the platform: the CLI pushes a
/// single fix from its arguments, tests push whatever sequence they need.
#[derive(Debug)]
pub struct ChannelLocationProvider {
    authorization: AuthorizationStatus,
    receiver: Mutex<Option<mpsc::Receiver<LocationEvent>>>,
}

impl ChannelLocationProvider {
    pub fn new(authorization: AuthorizationStatus) -> (Self, mpsc::Sender<LocationEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let provider = Self {
            authorization,
            receiver: Mutex::new(Some(rx)),
        };
        (provider, tx)
    }
}

#[async_trait]
impl LocationProvider for ChannelLocationProvider {
    async fn request_when_in_use_authorization(&self) -> AuthorizationStatus {
        self.authorization
    }

    fn subscribe(&self) -> mpsc::Receiver<LocationEvent> {
        match self.receiver.lock().take() {
            Some(rx) => rx,
            None => {
                // Already handed out; give the caller a closed stream.
                let (_, rx) = mpsc::channel(1);
                rx
            }
        }
    }
}
