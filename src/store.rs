use crate::error::StoreError;
use crate::model::{NewTranslation, Translation};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Persistence for translation records. There is no update operation.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Insert a record and return it with its assigned id
    async fn save(&self, translation: NewTranslation) -> Result<Translation, StoreError>;

    async fn find_all(&self) -> Result<Vec<Translation>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Translation>, StoreError>;

    async fn find_by_target_lang(&self, target_lang: &str)
        -> Result<Vec<Translation>, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no record has this id
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

/// Process-local store, used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    rows: BTreeMap<i32, Translation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn save(&self, translation: NewTranslation) -> Result<Translation, StoreError> {
        let mut state = self.inner.lock();
        state.next_id += 1;
        let saved = translation.with_id(state.next_id);
        state.rows.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Translation>, StoreError> {
        Ok(self.inner.lock().rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Translation>, StoreError> {
        Ok(self.inner.lock().rows.get(&id).cloned())
    }

    async fn find_by_target_lang(
        &self,
        target_lang: &str,
    ) -> Result<Vec<Translation>, StoreError> {
        Ok(self
            .inner
            .lock()
            .rows
            .values()
            .filter(|t| t.target_lang == target_lang)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        match self.inner.lock().rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_translation(text: &str, target_lang: &str) -> NewTranslation {
        NewTranslation {
            original_text: text.to_string(),
            translated_text: format!("{} ({})", text, target_lang),
            source_lang: "en".to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_increasing_ids() {
        let store = MemoryStore::new();

        let first = store.save(new_translation("one", "fr")).await.unwrap();
        let second = store.save(new_translation("two", "fr")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.original_text, "two");
    }

    #[tokio::test]
    async fn test_find_all_in_id_order() {
        let store = MemoryStore::new();
        store.save(new_translation("a", "fr")).await.unwrap();
        store.save(new_translation("b", "de")).await.unwrap();
        store.save(new_translation("c", "fr")).await.unwrap();

        let all = store.find_all().await.unwrap();

        let texts: Vec<_> = all.iter().map(|t| t.original_text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_find_by_target_lang_filters() {
        let store = MemoryStore::new();
        store.save(new_translation("a", "fr")).await.unwrap();
        store.save(new_translation("b", "de")).await.unwrap();
        store.save(new_translation("c", "fr")).await.unwrap();

        let french = store.find_by_target_lang("fr").await.unwrap();

        assert_eq!(french.len(), 2);
        assert!(french.iter().all(|t| t.target_lang == "fr"));
        assert!(store.find_by_target_lang("it").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = MemoryStore::new();
        let saved = store.save(new_translation("a", "fr")).await.unwrap();

        store.delete_by_id(saved.id).await.unwrap();

        assert!(store.find_by_id(saved.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_by_id(saved.id).await,
            Err(StoreError::NotFound(id)) if id == saved.id
        ));
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.save(new_translation("a", "fr")).await.unwrap();
        store.delete_by_id(first.id).await.unwrap();

        let second = store.save(new_translation("b", "fr")).await.unwrap();

        assert_ne!(first.id, second.id);
    }
}
