use crate::auth::{ApiKeySet, WebhookSigner};
use crate::domain::{CacheTarget, InvalidationRequest, InvalidationResult, InvalidationStatus};
use crate::notify::WebhookNotifier;
use crate::planes::control::history::InvalidationHistory;
use crate::planes::data::{dispatch_to_target, probe_health};
use crate::ports::{CacheInvalidator, InvalidatorFactory};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use shared::config::Config;
use shared::Result;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// Snapshot served by the stats endpoint
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    pub targets_configured: Vec<CacheTarget>,
    pub health_status: BTreeMap<CacheTarget, bool>,
    /// Entries currently held in history
    pub recent_requests: usize,
    /// Requests processed since start-up, including evicted ones
    pub total_requests: u64,
    pub webhook_configured: bool,
    pub api_keys_configured: usize,
}

/// CacheManager fans one request out to every named target and aggregates the outcome.
///
/// Each invalidator owns its own state, so there is no manager-wide lock. The
/// history buffer is the only shared mutable resource.
#[derive(Clone)]
pub struct CacheManager {
    invalidators: Arc<BTreeMap<CacheTarget, Arc<dyn CacheInvalidator>>>,
    api_keys: Arc<ApiKeySet>,
    signer: WebhookSigner,
    history: Arc<Mutex<InvalidationHistory>>,
    total_requests: Arc<AtomicU64>,
    notifier: WebhookNotifier,
    tasks: TaskTracker,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("targets", &self.configured_targets())
            .field("api_keys", &self.api_keys.len())
            .field("signer", &self.signer)
            .finish()
    }
}

impl CacheManager {
    /// Build the manager once at start-up. LOCAL is always present.
    pub fn from_config(config: &Config, factory: &dyn InvalidatorFactory) -> Result<Self> {
        let mut invalidators: BTreeMap<CacheTarget, Arc<dyn CacheInvalidator>> = BTreeMap::new();

        for invalidator in factory.create_from_config(config)? {
            let target = invalidator.target();
            if invalidators.insert(target, invalidator).is_some() {
                warn!("Target {} configured twice, keeping the last one", target);
            }
        }

        if !invalidators.contains_key(&CacheTarget::Local) {
            info!("LOCAL not configured, installing fallback in-process invalidator");
            invalidators.insert(CacheTarget::Local, factory.create_fallback());
        }

        let signer = WebhookSigner::new(config.webhook_secret.clone());
        let tasks = TaskTracker::new();
        let notifier = WebhookNotifier::new(config.notify_timeout, signer.clone(), tasks.clone())?;

        info!(
            "CacheManager ready: targets={:?}, api_keys={}, webhook_verification={}",
            invalidators.keys().collect::<Vec<_>>(),
            config.api_keys.len(),
            signer.is_enabled()
        );

        Ok(Self {
            invalidators: Arc::new(invalidators),
            api_keys: Arc::new(ApiKeySet::new(config.api_keys.iter().cloned())),
            signer,
            history: Arc::new(Mutex::new(InvalidationHistory::new(config.max_history))),
            total_requests: Arc::new(AtomicU64::new(0)),
            notifier,
            tasks,
        })
    }

    pub fn verify_api_key(&self, key: &str) -> bool {
        self.api_keys.verify(key)
    }

    /// Always true when no webhook secret is configured
    pub fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        self.signer.verify(body, signature)
    }

    pub fn webhook_verification_enabled(&self) -> bool {
        self.signer.is_enabled()
    }

    pub fn configured_targets(&self) -> Vec<CacheTarget> {
        self.invalidators.keys().copied().collect()
    }

    pub fn invalidator(&self, target: CacheTarget) -> Option<Arc<dyn CacheInvalidator>> {
        self.invalidators.get(&target).cloned()
    }

    /// Invalidate every target named by the request and record the outcome.
    ///
    /// The work runs on a tracked task: if the caller goes away, target
    /// operations still finish and the result still lands in history.
    pub async fn invalidate_cache(&self, request: InvalidationRequest) -> InvalidationResult {
        let manager = self.clone();
        let request_id = request.request_id();
        let targets: Vec<CacheTarget> = request.targets.iter().copied().collect();

        match self
            .tasks
            .spawn(async move { manager.run_invalidation(request).await })
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!("Invalidation task {} aborted: {}", request_id, e);
                InvalidationResult {
                    request_id,
                    status: InvalidationStatus::Failed,
                    targets_processed: targets.into_iter().map(|t| (t, false)).collect(),
                    keys_invalidated: 0,
                    errors: vec![format!("invalidation task aborted: {}", e)],
                    duration_ms: 0.0,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    async fn run_invalidation(&self, request: InvalidationRequest) -> InvalidationResult {
        let started = Instant::now();
        let request_id = request.request_id();

        info!(
            "Invalidation {} started: targets={:?}, keys={}, patterns={}, force={}, reason={:?}, initiated_by={:?}",
            request_id,
            request.targets,
            request.keys().len(),
            request.patterns().len(),
            request.force,
            request.reason,
            request.initiated_by
        );

        let outcomes = join_all(
            request
                .targets
                .iter()
                .map(|target| dispatch_to_target(self.invalidator(*target), *target, &request)),
        )
        .await;

        let mut targets_processed = BTreeMap::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            targets_processed.insert(outcome.target, outcome.succeeded);
            errors.extend(outcome.error);
        }

        let result = InvalidationResult {
            status: InvalidationStatus::aggregate(&targets_processed),
            keys_invalidated: InvalidationResult::estimate_keys_invalidated(
                &request,
                &targets_processed,
            ),
            request_id,
            targets_processed,
            errors,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            timestamp: Utc::now(),
        };

        self.history.lock().await.record(result.clone());
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        info!(
            "Invalidation {} finished: status={}, keys_invalidated~{}, duration_ms={:.2}",
            result.request_id, result.status, result.keys_invalidated, result.duration_ms
        );

        if let Some(url) = request.webhook_url {
            self.notifier.notify_detached(url, result.clone());
        }

        result
    }

    /// Probe every configured target; one failure only affects its own entry
    pub async fn health_check(&self) -> BTreeMap<CacheTarget, bool> {
        join_all(self.invalidators.values().cloned().map(probe_health))
            .await
            .into_iter()
            .collect()
    }

    pub async fn get_cache_stats(&self) -> CacheStats {
        let health_status = self.health_check().await;
        let recent_requests = self.history.lock().await.len();

        CacheStats {
            targets_configured: self.configured_targets(),
            health_status,
            recent_requests,
            total_requests: self.total_requests.load(Ordering::Relaxed),
            webhook_configured: self.signer.is_enabled(),
            api_keys_configured: self.api_keys.len(),
        }
    }

    /// Most recent first, at most 200 entries regardless of `limit`
    pub async fn get_invalidation_history(&self, limit: usize) -> Vec<InvalidationResult> {
        self.history.lock().await.recent(limit)
    }

    /// Wait for in-flight invalidations and notifications, bounded by `grace`
    pub async fn shutdown(&self, grace: Duration) {
        self.tasks.close();
        if tokio::time::timeout(grace, self.tasks.wait()).await.is_err() {
            warn!(
                "Shutdown grace period elapsed with {} task(s) still running",
                self.tasks.len()
            );
        } else {
            info!("CacheManager drained");
        }
    }
}
