use crate::error::{ServiceError, StoreError};
use crate::logging::log_calls;
use crate::model::{BulkTranslationRequest, Translation, TranslationRequest};
use crate::service::TranslationService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

/// Build the HTTP router around a translation service
pub fn router(service: TranslationService) -> Router {
    let api = Router::new()
        .route(
            "/api/translations",
            get(get_all_translations).post(translate_and_save),
        )
        .route("/api/translations/bulk", post(translate_bulk))
        .route(
            "/api/translations/lang/:target_lang",
            get(get_translations_by_target_lang),
        )
        .route(
            "/api/translations/:id",
            get(get_translation_by_id).delete(delete_translation_by_id),
        )
        .route_layer(middleware::from_fn(log_calls))
        .with_state(service);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn translate_and_save(
    State(service): State<TranslationService>,
    Json(request): Json<TranslationRequest>,
) -> Result<(StatusCode, Json<Translation>), ServiceError> {
    let saved = service
        .translate_and_save(&request.text, &request.source_lang, &request.target_lang)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn translate_bulk(
    State(service): State<TranslationService>,
    Json(request): Json<BulkTranslationRequest>,
) -> Result<(StatusCode, Json<Vec<Translation>>), ServiceError> {
    let saved = service.translate_bulk(&request).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn get_all_translations(
    State(service): State<TranslationService>,
) -> Result<Json<Vec<Translation>>, ServiceError> {
    Ok(Json(service.get_all_translations().await?))
}

async fn get_translations_by_target_lang(
    State(service): State<TranslationService>,
    Path(target_lang): Path<String>,
) -> Result<Json<Vec<Translation>>, ServiceError> {
    Ok(Json(
        service.get_translations_by_target_lang(&target_lang).await?,
    ))
}

async fn get_translation_by_id(
    State(service): State<TranslationService>,
    Path(id): Path<i32>,
) -> Result<Json<Translation>, ServiceError> {
    service
        .get_translation_by_id(id)
        .await?
        .map(Json)
        .ok_or(ServiceError::Store(StoreError::NotFound(id)))
}

async fn delete_translation_by_id(
    State(service): State<TranslationService>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    service.delete_translation_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
