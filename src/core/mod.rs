pub mod orchestrator;
pub mod placeholders;
pub mod preview;
pub mod session;
pub mod shaping;
pub mod upload;

pub use crate::domain::model::{
    DistributionType, EncryptionType, EvaluationRequestState, FilePreview, PreviewRow,
    PrivacySettings, UploadedFile,
};
pub use crate::domain::ports::{
    ConfigProvider, DistributionProfile, EvaluationBackend, PlaceholderProvider, Storage,
};
pub use crate::domain::result::EvaluationResult;
pub use crate::utils::error::Result;
