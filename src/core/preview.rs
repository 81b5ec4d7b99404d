//! Best-effort previews of uploaded files.
//!
//! Nothing here is used for the evaluation itself. Decoding problems produce
//! an empty preview rather than an error.

use crate::domain::model::{FilePreview, PreviewRow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLICY_PREVIEW_CHARS: usize = 500;
pub const DEFAULT_DATA_PREVIEW_ROWS: usize = 5;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewOptions {
    pub policy_chars: usize,
    pub data_rows: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            policy_chars: DEFAULT_POLICY_PREVIEW_CHARS,
            data_rows: DEFAULT_DATA_PREVIEW_ROWS,
        }
    }
}

/// 政策文件預覽：截斷到 `max_chars` 個字元
pub fn text_preview(content: &[u8], max_chars: usize) -> FilePreview {
    let Ok(text) = std::str::from_utf8(content) else {
        tracing::debug!("Policy file is not valid UTF-8, skipping preview");
        return FilePreview::Empty;
    };

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => FilePreview::Text(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => FilePreview::Text(text.to_string()),
    }
}

/// 資料檔預覽：先試 JSON，失敗再當作逗號分隔文字
pub fn table_preview(content: &[u8], max_rows: usize) -> FilePreview {
    let Ok(text) = std::str::from_utf8(content) else {
        tracing::debug!("Data file is not valid UTF-8, skipping preview");
        return FilePreview::Empty;
    };

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => {
            FilePreview::Table(items.into_iter().take(max_rows).map(row_from_value).collect())
        }
        Ok(value) => FilePreview::Table(vec![row_from_value(value)]),
        Err(_) => delimited_preview(text, max_rows),
    }
}

fn row_from_value(value: serde_json::Value) -> PreviewRow {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        other => {
            let mut row = PreviewRow::new();
            row.insert("value", other);
            row
        }
    }
}

/// Header line plus up to `max_rows` data lines, split on bare commas.
/// Quotes are not interpreted, so quoted commas shift later columns.
fn delimited_preview(text: &str, max_rows: usize) -> FilePreview {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader
        .records()
        .map_while(|record| record.ok())
        .filter(|record| record.iter().any(|field| !field.is_empty()));

    let Some(headers) = records.next() else {
        return FilePreview::Empty;
    };
    let headers: Vec<String> = headers.iter().map(str::to_string).collect();

    let rows = records
        .take(max_rows)
        .map(|record| {
            headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let value = record.get(index).unwrap_or("").to_string();
                    (header.clone(), serde_json::Value::String(value))
                })
                .collect()
        })
        .collect();

    FilePreview::Table(rows)
}
