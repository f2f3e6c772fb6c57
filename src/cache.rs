use crate::model::Translation;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Translations keyed by target language.
///
/// Entries have no expiry and no size bound. Nothing invalidates them: once a
/// language is cached, later saves and deletes for it are not reflected until
/// the process restarts.
#[derive(Debug, Default)]
pub struct TargetLangCache {
    entries: Mutex<HashMap<String, Vec<Translation>>>,
}

impl TargetLangCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target_lang: &str) -> Option<Vec<Translation>> {
        self.entries.lock().get(target_lang).cloned()
    }

    /// Replace whatever is cached for `target_lang`
    pub fn put(&self, target_lang: &str, translations: Vec<Translation>) {
        self.entries
            .lock()
            .insert(target_lang.to_string(), translations);
    }
}
