use serde::{Deserialize, Serialize};

/// A persisted translation. Text and language fields never change after save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: i32,
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// A translation that has not been saved yet (no id assigned)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTranslation {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl NewTranslation {
    pub fn with_id(self, id: i32) -> Translation {
        Translation {
            id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTranslationRequest {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
}
