use crate::domain::{CacheTarget, InvalidationRequest};
use crate::ports::CacheInvalidator;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to one requested target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: CacheTarget,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl TargetOutcome {
    fn ok(target: CacheTarget) -> Self {
        Self {
            target,
            succeeded: true,
            error: None,
        }
    }

    fn failed(target: CacheTarget, error: String) -> Self {
        Self {
            target,
            succeeded: false,
            error: Some(error),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one target's invalidation. Errors and panics become a failed outcome.
pub async fn dispatch_to_target(
    invalidator: Option<Arc<dyn CacheInvalidator>>,
    target: CacheTarget,
    request: &InvalidationRequest,
) -> TargetOutcome {
    let Some(invalidator) = invalidator else {
        warn!("Target {} requested but not configured", target);
        let error = shared::Error::NotConfigured(target.to_string());
        return TargetOutcome::failed(target, error.to_string());
    };

    let call = invalidator.invalidate(request.keys(), request.patterns(), request.force);
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(true)) => {
            debug!("Target {} invalidated", target);
            TargetOutcome::ok(target)
        }
        Ok(Ok(false)) => {
            warn!("Target {} reported an unsuccessful invalidation", target);
            TargetOutcome::failed(target, format!("{}: invalidation was not successful", target))
        }
        Ok(Err(e)) => {
            warn!("Target {} failed: {}", target, e);
            TargetOutcome::failed(target, format!("{}: {}", target, e))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Target {} panicked during invalidation: {}", target, message);
            TargetOutcome::failed(target, format!("{}: invalidator panicked: {}", target, message))
        }
    }
}

/// Health probe isolated to a single target
pub async fn probe_health(invalidator: Arc<dyn CacheInvalidator>) -> (CacheTarget, bool) {
    let target = invalidator.target();
    match AssertUnwindSafe(invalidator.health_check()).catch_unwind().await {
        Ok(healthy) => (target, healthy),
        Err(payload) => {
            warn!(
                "Health check for {} panicked: {}",
                target,
                panic_message(payload.as_ref())
            );
            (target, false)
        }
    }
}
