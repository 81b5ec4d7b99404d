use crate::core::session::{BeginRequest, SessionStore};
use crate::core::shaping::merge_results;
use crate::domain::model::PrivacySettings;
use crate::domain::ports::{EvaluationBackend, PlaceholderProvider};
use crate::domain::result::EvaluationResult;
use crate::utils::error::{PriEvalError, SurfacedError};
use std::sync::Arc;

/// 一次觸發的結果
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// An evaluation was already in flight; nothing was sent.
    Skipped,
    Succeeded(Arc<EvaluationResult>),
    Failed(SurfacedError),
    /// The session was reset while the requests were in flight.
    Discarded,
}

impl TriggerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TriggerOutcome::Succeeded(_))
    }
}

/// Runs the policy and dataset evaluations and publishes the merged result.
pub struct EvaluationOrchestrator<B: EvaluationBackend, P: PlaceholderProvider> {
    store: SessionStore,
    backend: B,
    placeholders: P,
}

impl<B: EvaluationBackend, P: PlaceholderProvider> EvaluationOrchestrator<B, P> {
    pub fn new(store: SessionStore, backend: B, placeholders: P) -> Self {
        Self {
            store,
            backend,
            placeholders,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn set_privacy_settings(&self, settings: PrivacySettings) {
        tracing::debug!(
            "Privacy settings: encryption={}, distribution={}",
            settings.encryption_type,
            settings.distribution_type
        );
        self.store.update(|s| s.set_settings(settings));
    }

    /// 清除檔案、預覽、結果與錯誤，回到 Idle
    pub fn reset(&self) {
        tracing::info!("🔄 Resetting evaluation session");
        self.store.update(|s| s.reset());
    }

    pub async fn evaluate(&self) -> TriggerOutcome {
        self.run(None::<fn(&EvaluationResult)>).await
    }

    /// Same as [`evaluate`](Self::evaluate), calling `on_complete` once the
    /// result has been published.
    pub async fn evaluate_then<F>(&self, on_complete: F) -> TriggerOutcome
    where
        F: FnOnce(&EvaluationResult),
    {
        self.run(Some(on_complete)).await
    }

    async fn run<F>(&self, on_complete: Option<F>) -> TriggerOutcome
    where
        F: FnOnce(&EvaluationResult),
    {
        let job = match self.store.update(|s| s.begin_request()) {
            BeginRequest::AlreadyRequesting => {
                tracing::info!("⏳ Evaluation already in progress, skipping");
                return TriggerOutcome::Skipped;
            }
            BeginRequest::Rejected(error) => {
                tracing::error!("❌ {}", error);
                return TriggerOutcome::Failed(error);
            }
            BeginRequest::Started(job) => job,
        };

        let mut guard = RequestGuard::new(&self.store, job.epoch);

        tracing::info!(
            "🚀 Starting evaluation: policy '{}', data '{}'",
            job.policy.name(),
            job.data.name()
        );

        // 兩個請求都結束後才檢查結果
        let (policy_outcome, metrics_outcome) = tokio::join!(
            self.backend.evaluate_policy(&job.policy),
            self.backend.compute_metrics(&job.data)
        );

        let outcome = match (policy_outcome, metrics_outcome) {
            (Ok(report), Ok(metrics)) => {
                tracing::info!("📡 Both evaluation services responded");
                let result = merge_results(report, metrics, job.settings, &self.placeholders);
                Ok(Arc::new(result))
            }
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => {
                tracing::error!("❌ Evaluation failed: {}", e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                Err(SurfacedError::from(&e))
            }
            (Err(policy_err), Err(metrics_err)) => {
                tracing::error!("❌ Both evaluation services failed: {}; {}", policy_err, metrics_err);
                Err(combine_failures(&policy_err, &metrics_err))
            }
        };

        if !guard.settle(outcome.clone()) {
            tracing::warn!("Session was reset during evaluation, discarding outcome");
            return TriggerOutcome::Discarded;
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "✅ Evaluation complete: compliance score {:.1} ({})",
                    result.compliance_score,
                    result.risk_level.label()
                );
                if let Some(callback) = on_complete {
                    callback(&result);
                }
                TriggerOutcome::Succeeded(result)
            }
            Err(error) => TriggerOutcome::Failed(error),
        }
    }
}

fn combine_failures(primary: &PriEvalError, secondary: &PriEvalError) -> SurfacedError {
    let mut surfaced = SurfacedError::from(primary);
    surfaced.message = format!("{} (also: {})", surfaced.message, secondary);
    surfaced
}

/// Clears the Requesting flag on every exit path, including the evaluation
/// future being dropped before both requests settle.
struct RequestGuard<'a> {
    store: &'a SessionStore,
    epoch: u64,
    settled: bool,
}

impl<'a> RequestGuard<'a> {
    fn new(store: &'a SessionStore, epoch: u64) -> Self {
        Self {
            store,
            epoch,
            settled: false,
        }
    }

    fn settle(&mut self, outcome: Result<Arc<EvaluationResult>, SurfacedError>) -> bool {
        self.settled = true;
        let epoch = self.epoch;
        self.store.update(|s| s.complete(epoch, outcome))
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Evaluation dropped before completion");
            let epoch = self.epoch;
            self.store.update(|s| s.abandon(epoch));
        }
    }
}
