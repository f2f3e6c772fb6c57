use crate::cache::TargetLangCache;
use crate::error::ServiceError;
use crate::model::{BulkTranslationRequest, NewTranslation, Translation};
use crate::provider::Translator;
use crate::store::TranslationStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Translates text, writes results through to the store, and serves
/// by-language lookups from the cache.
#[derive(Clone)]
pub struct TranslationService {
    translator: Arc<dyn Translator>,
    store: Arc<dyn TranslationStore>,
    cache: Arc<TargetLangCache>,
}

impl TranslationService {
    pub fn new(
        translator: Arc<dyn Translator>,
        store: Arc<dyn TranslationStore>,
        cache: Arc<TargetLangCache>,
    ) -> Self {
        Self {
            translator,
            store,
            cache,
        }
    }

    pub async fn translate_and_save(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Translation, ServiceError> {
        let translated_text = self
            .translator
            .translate(text, source_lang, target_lang)
            .await
            .inspect_err(|e| warn!("{} -> {}: {}", source_lang, target_lang, e))?;

        let saved = self
            .store
            .save(NewTranslation {
                original_text: text.to_string(),
                translated_text,
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            })
            .await?;

        Ok(saved)
    }

    /// Translate each text in order, saving as it goes.
    ///
    /// Stops at the first failure. Items saved before the failure stay saved.
    pub async fn translate_bulk(
        &self,
        request: &BulkTranslationRequest,
    ) -> Result<Vec<Translation>, ServiceError> {
        let mut saved = Vec::with_capacity(request.texts.len());
        for text in &request.texts {
            saved.push(
                self.translate_and_save(text, &request.source_lang, &request.target_lang)
                    .await?,
            );
        }
        Ok(saved)
    }

    /// Cache-aside lookup. The cached list is not refreshed by later saves
    /// or deletes.
    pub async fn get_translations_by_target_lang(
        &self,
        target_lang: &str,
    ) -> Result<Vec<Translation>, ServiceError> {
        if let Some(cached) = self.cache.get(target_lang) {
            debug!("Cache hit for {} ({} translations)", target_lang, cached.len());
            return Ok(cached);
        }

        debug!("Cache miss for {}", target_lang);
        let translations = self.store.find_by_target_lang(target_lang).await?;
        self.cache.put(target_lang, translations.clone());

        Ok(translations)
    }

    pub async fn get_all_translations(&self) -> Result<Vec<Translation>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get_translation_by_id(
        &self,
        id: i32,
    ) -> Result<Option<Translation>, ServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Leaves any cached list containing this record untouched
    pub async fn delete_translation_by_id(&self, id: i32) -> Result<(), ServiceError> {
        Ok(self.store.delete_by_id(id).await?)
    }
}
