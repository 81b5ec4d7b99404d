use crate::core::preview::{self, PreviewOptions};
use crate::core::session::SessionStore;
use crate::core::Storage;
use crate::domain::model::{FilePreview, UploadedFile};
use crate::utils::error::Result;
use std::path::Path;

/// 接收政策文件與資料檔，並產生預覽
pub struct UploadHandler {
    store: SessionStore,
    options: PreviewOptions,
}

impl UploadHandler {
    pub fn new(store: SessionStore, options: PreviewOptions) -> Self {
        Self { store, options }
    }

    /// Replaces the policy file and recomputes its text preview.
    pub async fn set_policy_file(&self, file: UploadedFile) {
        tracing::info!("📄 Policy file set: {} ({} bytes)", file.name(), file.len());
        let content = file.shared_content();
        let generation = self.store.update(|s| s.replace_policy_file(file));

        let max_chars = self.options.policy_chars;
        let preview = decode_off_executor(move || preview::text_preview(&content, max_chars)).await;

        if !self.store.update(|s| s.store_policy_preview(generation, preview)) {
            tracing::debug!("Policy file replaced during preview, dropping stale preview");
        }
    }

    /// Replaces the data file and recomputes its table preview.
    pub async fn set_data_file(&self, file: UploadedFile) {
        tracing::info!("📊 Data file set: {} ({} bytes)", file.name(), file.len());
        let content = file.shared_content();
        let generation = self.store.update(|s| s.replace_data_file(file));

        let max_rows = self.options.data_rows;
        let preview = decode_off_executor(move || preview::table_preview(&content, max_rows)).await;

        let row_count = preview.rows().len();
        if self.store.update(|s| s.store_data_preview(generation, preview)) {
            tracing::debug!("Data preview ready with {} rows", row_count);
        } else {
            tracing::debug!("Data file replaced during preview, dropping stale preview");
        }
    }

    pub async fn load_policy_file<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let file = read_upload(storage, path).await?;
        self.set_policy_file(file).await;
        Ok(())
    }

    pub async fn load_data_file<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let file = read_upload(storage, path).await?;
        self.set_data_file(file).await;
        Ok(())
    }
}

async fn read_upload<S: Storage>(storage: &S, path: &str) -> Result<UploadedFile> {
    let content = storage.read_file(path).await?;
    let name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);
    Ok(UploadedFile::new(name, content))
}

async fn decode_off_executor<F>(decode: F) -> FilePreview
where
    F: FnOnce() -> FilePreview + Send + 'static,
{
    match tokio::task::spawn_blocking(decode).await {
        Ok(preview) => preview,
        Err(e) => {
            tracing::debug!("Preview task did not finish: {}", e);
            FilePreview::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_files_populates_previews() {
        let store = SessionStore::new();
        let handler = UploadHandler::new(store.clone(), PreviewOptions::default());

        handler
            .set_policy_file(UploadedFile::new("policy.txt", "We protect your data."))
            .await;
        handler
            .set_data_file(UploadedFile::new("data.csv", "a,b\n1,2\n3,4"))
            .await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.policy_preview().as_text(), Some("We protect your data."));
        assert_eq!(snapshot.data_preview().rows().len(), 2);
        assert_eq!(snapshot.data_file().map(|f| f.name()), Some("data.csv"));
    }

    #[tokio::test]
    async fn test_replacing_file_replaces_preview() {
        let store = SessionStore::new();
        let handler = UploadHandler::new(store.clone(), PreviewOptions::default());

        handler.set_data_file(UploadedFile::new("a.csv", "x\n1\n2")).await;
        handler.set_data_file(UploadedFile::new("b.json", r#"{"y":true}"#)).await;

        let snapshot = store.snapshot();
        let rows = snapshot.data_preview().rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("x").is_none());
        assert_eq!(rows[0].get("y"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn test_respects_preview_options() {
        let store = SessionStore::new();
        let options = PreviewOptions {
            policy_chars: 4,
            data_rows: 1,
        };
        let handler = UploadHandler::new(store.clone(), options);

        handler.set_policy_file(UploadedFile::new("p.txt", "abcdefgh")).await;
        handler.set_data_file(UploadedFile::new("d.csv", "k\n1\n2\n3")).await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.policy_preview().as_text(), Some("abcd..."));
        assert_eq!(snapshot.data_preview().rows().len(), 1);
    }
}
