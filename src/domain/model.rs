use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 使用者上傳的檔案：內容 + 檔名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    content: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn shared_content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// One preview row. Keeps column order as it appeared in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewRow {
    fields: Vec<(String, serde_json::Value)>,
}

impl PreviewRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for PreviewRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, serde_json::Value)> for PreviewRow {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        let mut row = PreviewRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum FilePreview {
    #[default]
    Empty,
    Text(String),
    Table(Vec<PreviewRow>),
}

impl FilePreview {
    pub fn is_empty(&self) -> bool {
        match self {
            FilePreview::Empty => true,
            FilePreview::Text(text) => text.is_empty(),
            FilePreview::Table(rows) => rows.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilePreview::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn rows(&self) -> &[PreviewRow] {
        match self {
            FilePreview::Table(rows) => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EvaluationRequestState {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionType {
    #[default]
    Asymmetric,
    Symmetric,
    Hybrid,
    #[serde(rename = "None")]
    NoEncryption,
}

impl EncryptionType {
    /// Symmetric 與未加密都視為弱
    pub fn is_weak(&self) -> bool {
        matches!(self, EncryptionType::Symmetric | EncryptionType::NoEncryption)
    }

    pub fn strength(&self) -> &'static str {
        match self {
            EncryptionType::Asymmetric | EncryptionType::Hybrid => "Strong",
            EncryptionType::Symmetric => "Moderate",
            EncryptionType::NoEncryption => "None",
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EncryptionType::Asymmetric => "Asymmetric",
            EncryptionType::Symmetric => "Symmetric",
            EncryptionType::Hybrid => "Hybrid",
            EncryptionType::NoEncryption => "None",
        };
        f.write_str(label)
    }
}

impl FromStr for EncryptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asymmetric" => Ok(EncryptionType::Asymmetric),
            "symmetric" => Ok(EncryptionType::Symmetric),
            "hybrid" => Ok(EncryptionType::Hybrid),
            "none" => Ok(EncryptionType::NoEncryption),
            other => Err(format!(
                "unknown encryption type '{}', expected asymmetric, symmetric, hybrid or none",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionType {
    #[default]
    Centralized,
    Federated,
    Distributed,
}

impl DistributionType {
    pub fn is_centralized(&self) -> bool {
        matches!(self, DistributionType::Centralized)
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DistributionType::Centralized => "Centralized",
            DistributionType::Federated => "Federated",
            DistributionType::Distributed => "Distributed",
        };
        f.write_str(label)
    }
}

impl FromStr for DistributionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "centralized" => Ok(DistributionType::Centralized),
            "federated" => Ok(DistributionType::Federated),
            "distributed" => Ok(DistributionType::Distributed),
            other => Err(format!(
                "unknown distribution type '{}', expected centralized, federated or distributed",
                other
            )),
        }
    }
}

/// 使用者選擇的系統設定，評估時直接採用
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub encryption_type: EncryptionType,
    pub distribution_type: DistributionType,
}
