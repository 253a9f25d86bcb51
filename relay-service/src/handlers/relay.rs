//! The four relay endpoints.
//!
//! Each handler validates its body, builds the system prompt from the
//! endpoint profile and forwards one generation to the provider.

use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::utils::ValidatedJson;

use crate::models::{
    CreateRequest, MediaProcessRequest, RelayResponse, SubGenRequest, TranslateRequest,
};
use crate::services::metrics::record_generation;
use crate::services::providers::{Content, GenerationRequest, Part, UserContent};
use crate::startup::AppState;

/// POST /api/media-process: transcription or recap of inline media.
#[tracing::instrument(skip(state, request))]
pub async fn media_process(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<MediaProcessRequest>,
) -> Result<Json<RelayResponse>, AppError> {
    let profile = &state.profile.media_process;
    let task = request.task();

    let content = UserContent::Media(vec![Content::user(vec![
        Part::inline_data(request.mime_type, request.media),
        Part::text(profile.file_instruction.clone()),
    ])]);

    relay(
        &state,
        "media-process",
        GenerationRequest {
            model: profile.model.clone(),
            system_prompt: profile.system_prompt(task),
            content,
        },
    )
    .await
}

/// POST /api/translate
#[tracing::instrument(skip(state, request))]
pub async fn translate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TranslateRequest>,
) -> Result<Json<RelayResponse>, AppError> {
    let profile = &state.profile.translate;
    let system_prompt = profile.system_prompt(request.kind(), &request.target_lang);

    relay(
        &state,
        "translate",
        GenerationRequest {
            model: profile.model.clone(),
            system_prompt,
            content: UserContent::Text(request.text),
        },
    )
    .await
}

/// POST /api/create: novels, social scripts or any other named content.
#[tracing::instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateRequest>,
) -> Result<Json<RelayResponse>, AppError> {
    let profile = &state.profile.create;
    let system_prompt = profile.system_prompt(&request.kind(), &request.topic, &request.lang);

    relay(
        &state,
        "create",
        GenerationRequest {
            model: profile.model.clone(),
            system_prompt,
            content: UserContent::Text(request.topic),
        },
    )
    .await
}

/// POST /api/sub-gen: SRT subtitles from text.
#[tracing::instrument(skip(state, request))]
pub async fn sub_gen(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SubGenRequest>,
) -> Result<Json<RelayResponse>, AppError> {
    let profile = &state.profile.sub_gen;

    relay(
        &state,
        "sub-gen",
        GenerationRequest {
            model: profile.model.clone(),
            system_prompt: profile.system_prompt(),
            content: UserContent::Text(request.text),
        },
    )
    .await
}

async fn relay(
    state: &AppState,
    endpoint: &'static str,
    request: GenerationRequest,
) -> Result<Json<RelayResponse>, AppError> {
    let model = request.model.clone();

    match state.provider.generate(request).await {
        Ok(result) => {
            record_generation(endpoint, true);
            tracing::info!(endpoint, model = %model, result_len = result.len(), "Generation completed");
            Ok(Json(RelayResponse { result }))
        }
        Err(e) => {
            record_generation(endpoint, false);
            tracing::error!(endpoint, model = %model, error = %e, "Generation failed");
            Err(AppError::Upstream(e.to_string()))
        }
    }
}
