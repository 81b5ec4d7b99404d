use crate::domain::model::{
    EvaluationRequestState, FilePreview, PrivacySettings, UploadedFile,
};
use crate::domain::result::EvaluationResult;
use crate::utils::error::{PriEvalError, SurfacedError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything the client knows about the current session.
///
/// Readers get a cloned snapshot; writes happen only through the crate's
/// upload handler and orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    policy_file: Option<UploadedFile>,
    data_file: Option<UploadedFile>,
    policy_preview: FilePreview,
    data_preview: FilePreview,
    settings: PrivacySettings,
    request_state: EvaluationRequestState,
    result: Option<Arc<EvaluationResult>>,
    error: Option<SurfacedError>,
    // 觸發前的終態，future 被丟棄時還原
    prior_state: EvaluationRequestState,
    prior_error: Option<SurfacedError>,
    policy_generation: u64,
    data_generation: u64,
    request_epoch: u64,
}

/// 開始評估時的判斷結果
#[derive(Debug)]
pub(crate) enum BeginRequest {
    AlreadyRequesting,
    Rejected(SurfacedError),
    Started(EvaluationJob),
}

/// 一次評估所需的輸入，取自開始當下的狀態
#[derive(Debug)]
pub(crate) struct EvaluationJob {
    pub epoch: u64,
    pub policy: UploadedFile,
    pub data: UploadedFile,
    pub settings: PrivacySettings,
}

impl SessionState {
    pub fn policy_file(&self) -> Option<&UploadedFile> {
        self.policy_file.as_ref()
    }

    pub fn data_file(&self) -> Option<&UploadedFile> {
        self.data_file.as_ref()
    }

    pub fn policy_preview(&self) -> &FilePreview {
        &self.policy_preview
    }

    pub fn data_preview(&self) -> &FilePreview {
        &self.data_preview
    }

    pub fn settings(&self) -> PrivacySettings {
        self.settings
    }

    pub fn request_state(&self) -> EvaluationRequestState {
        self.request_state
    }

    pub fn is_loading(&self) -> bool {
        self.request_state == EvaluationRequestState::Requesting
    }

    pub fn result(&self) -> Option<&Arc<EvaluationResult>> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&SurfacedError> {
        self.error.as_ref()
    }

    pub(crate) fn replace_policy_file(&mut self, file: UploadedFile) -> u64 {
        self.policy_file = Some(file);
        self.policy_preview = FilePreview::Empty;
        self.policy_generation += 1;
        self.policy_generation
    }

    pub(crate) fn replace_data_file(&mut self, file: UploadedFile) -> u64 {
        self.data_file = Some(file);
        self.data_preview = FilePreview::Empty;
        self.data_generation += 1;
        self.data_generation
    }

    /// 只有檔案未被替換時才寫入預覽
    pub(crate) fn store_policy_preview(&mut self, generation: u64, preview: FilePreview) -> bool {
        if generation != self.policy_generation || self.policy_file.is_none() {
            return false;
        }
        self.policy_preview = preview;
        true
    }

    pub(crate) fn store_data_preview(&mut self, generation: u64, preview: FilePreview) -> bool {
        if generation != self.data_generation || self.data_file.is_none() {
            return false;
        }
        self.data_preview = preview;
        true
    }

    pub(crate) fn set_settings(&mut self, settings: PrivacySettings) {
        self.settings = settings;
    }

    pub(crate) fn begin_request(&mut self) -> BeginRequest {
        if self.request_state == EvaluationRequestState::Requesting {
            return BeginRequest::AlreadyRequesting;
        }

        let (policy, data) = match (&self.policy_file, &self.data_file) {
            (Some(policy), Some(data)) => (policy.clone(), data.clone()),
            (policy, data) => {
                let err = PriEvalError::MissingFiles {
                    policy_missing: policy.is_none(),
                    data_missing: data.is_none(),
                };
                let surfaced = SurfacedError::from(&err);
                self.fail(surfaced.clone());
                return BeginRequest::Rejected(surfaced);
            }
        };

        self.prior_state = self.request_state;
        self.prior_error = self.error.take();
        self.request_epoch += 1;
        self.request_state = EvaluationRequestState::Requesting;

        BeginRequest::Started(EvaluationJob {
            epoch: self.request_epoch,
            policy,
            data,
            settings: self.settings,
        })
    }

    /// Publishes the outcome of request `epoch`. Returns false when the
    /// session was reset (or restarted) while the request was in flight.
    pub(crate) fn complete(
        &mut self,
        epoch: u64,
        outcome: std::result::Result<Arc<EvaluationResult>, SurfacedError>,
    ) -> bool {
        if epoch != self.request_epoch || self.request_state != EvaluationRequestState::Requesting {
            return false;
        }
        self.prior_error = None;

        match outcome {
            Ok(result) => {
                self.request_state = EvaluationRequestState::Succeeded;
                self.result = Some(result);
                self.error = None;
            }
            Err(error) => self.fail(error),
        }
        true
    }

    /// 評估 future 在完成前被丟棄：回到觸發前的狀態
    pub(crate) fn abandon(&mut self, epoch: u64) {
        if epoch == self.request_epoch && self.request_state == EvaluationRequestState::Requesting {
            self.request_state = self.prior_state;
            self.error = self.prior_error.take();
        }
    }

    pub(crate) fn reset(&mut self) {
        self.policy_file = None;
        self.data_file = None;
        self.policy_preview = FilePreview::Empty;
        self.data_preview = FilePreview::Empty;
        self.result = None;
        self.error = None;
        self.request_state = EvaluationRequestState::Idle;
        self.prior_state = EvaluationRequestState::Idle;
        self.prior_error = None;
        self.policy_generation += 1;
        self.data_generation += 1;
        self.request_epoch += 1;
    }

    fn fail(&mut self, error: SurfacedError) {
        self.request_state = EvaluationRequestState::Failed;
        self.error = Some(error);
        self.result = None;
    }
}

/// Shared handle to the session, injected into the upload handler and the
/// orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn request_state(&self) -> EvaluationRequestState {
        self.lock().request_state
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> parking_lot::MutexGuard<'_, SessionState> {
        self.inner.lock()
    }
}
