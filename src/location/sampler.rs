//! Latest-fix sampler.
//!
//! Consumes a provider's event stream on one task, in delivery order. The
//! newest fix always replaces the stored one; there is no history and no
//! smoothing. Accuracy is classified for display but never gates anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::logging::structured::LogContext;

use super::models::{
    AuthorizationStatus, FixQuality, LocationEvent, LocationFix, MapRegion, SamplerNotice,
    DEFAULT_REGION,
};
use super::provider::LocationProvider;

/// Capacity of the notice channel; slow listeners miss old notices.
const NOTICE_BUFFER: usize = 16;

#[derive(Debug)]
struct SamplerInner {
    latest: RwLock<Option<LocationFix>>,
    authorization: RwLock<AuthorizationStatus>,
    started: AtomicBool,
    notices: broadcast::Sender<SamplerNotice>,
    ctx: LogContext,
}

/// Cheap to clone; clones share the same latest fix.
#[derive(Debug, Clone)]
pub struct LocationSampler {
    inner: Arc<SamplerInner>,
}

impl LocationSampler {
    pub fn new(ctx: &LogContext) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_BUFFER);
        Self {
            inner: Arc::new(SamplerInner {
                latest: RwLock::new(None),
                authorization: RwLock::new(AuthorizationStatus::NotDetermined),
                started: AtomicBool::new(false),
                notices,
                ctx: ctx.clone(),
            }),
        }
    }

    /// Request authorization and start consuming the provider's stream.
    ///
    /// Returns the pump task on the first call and `None` on every later
    /// call. The task ends when the provider closes its stream.
    pub async fn start(&self, provider: Arc<dyn LocationProvider>) -> Option<JoinHandle<()>> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            log::debug!("{} LOCATION_ALREADY_STARTED", self.inner.ctx);
            return None;
        }

        let status = provider.request_when_in_use_authorization().await;
        log::info!("{} LOCATION_AUTHORIZATION_REQUESTED status={:?}", self.inner.ctx, status);
        self.on_authorization_changed(status);

        let mut events = provider.subscribe();
        let sampler = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                sampler.apply(event);
            }
            log::info!("{} LOCATION_STREAM_CLOSED", sampler.inner.ctx);
        });

        Some(handle)
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Apply one provider event.
    pub fn apply(&self, event: LocationEvent) {
        match event {
            LocationEvent::FixReceived(fix) => self.on_fix_received(fix),
            LocationEvent::AuthorizationChanged(status) => self.on_authorization_changed(status),
        }
    }

    /// Replace the stored fix; last write wins.
    pub fn on_fix_received(&self, fix: LocationFix) {
        let quality = fix.quality();
        let accuracy_meters = fix.horizontal_accuracy_meters;

        if quality == FixQuality::Poor {
            log::warn!("{} LOCATION_FIX_POOR {}", self.inner.ctx, fix_log_fields(&fix));
        } else {
            log::debug!("{} LOCATION_FIX_RECEIVED {}", self.inner.ctx, fix_log_fields(&fix));
        }

        *self.inner.latest.write() = Some(fix);
        self.notify(SamplerNotice::FixUpdated {
            accuracy_meters,
            quality,
        });
    }

    pub fn on_authorization_changed(&self, status: AuthorizationStatus) {
        let previous = std::mem::replace(&mut *self.inner.authorization.write(), status);
        if previous != status {
            log::info!(
                "{} LOCATION_AUTHORIZATION_CHANGED from={:?} to={:?}",
                self.inner.ctx,
                previous,
                status
            );
        }
        if status.is_denied() {
            self.on_authorization_denied();
        }
    }

    /// Raise the denied notice. The stored fix, if any, is kept.
    pub fn on_authorization_denied(&self) {
        log::warn!("{} LOCATION_AUTHORIZATION_DENIED", self.inner.ctx);
        self.notify(SamplerNotice::AuthorizationDenied);
    }

    pub fn current_fix(&self) -> Option<LocationFix> {
        self.inner.latest.read().clone()
    }

    pub fn authorization(&self) -> AuthorizationStatus {
        *self.inner.authorization.read()
    }

    pub fn fix_quality(&self) -> FixQuality {
        self.inner
            .latest
            .read()
            .as_ref()
            .map(LocationFix::quality)
            .unwrap_or(FixQuality::Missing)
    }

    /// A fix exists and is within the accuracy threshold.
    pub fn has_usable_fix(&self) -> bool {
        self.fix_quality() == FixQuality::Good
    }

    /// Where the map collaborator should centre.
    pub fn map_region(&self) -> MapRegion {
        self.inner
            .latest
            .read()
            .as_ref()
            .map(MapRegion::around)
            .unwrap_or(DEFAULT_REGION)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SamplerNotice> {
        self.inner.notices.subscribe()
    }

    fn notify(&self, notice: SamplerNotice) {
        // No listeners is fine.
        let _ = self.inner.notices.send(notice);
    }
}

/// Loggable summary of a fix. Coordinates stay out of the log.
fn fix_log_fields(fix: &LocationFix) -> String {
    format!(
        "accuracy_m={} quality={:?}",
        fix.horizontal_accuracy_meters,
        fix.quality()
    )
}
