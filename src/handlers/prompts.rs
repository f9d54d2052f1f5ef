use crate::{
    error::{ConfessError, Result},
    models::{NewPrompt, PromptSaved},
    routes::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

/// POST /api/prompts — stores a prompt whose creation was confirmed on-chain.
pub async fn create_prompt(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewPrompt>, JsonRejection>,
) -> Result<(StatusCode, Json<PromptSaved>)> {
    let Json(prompt) = payload.map_err(|e| ConfessError::BadRequest(e.body_text()))?;
    prompt
        .validate()
        .map_err(|e| ConfessError::BadRequest(e.to_string()))?;

    state
        .prompts
        .create_prompt(&prompt)
        .await
        .map_err(ConfessError::StoreError)?;

    tracing::info!("Prompt {} created by fid {}", prompt.id, prompt.author_fid);

    Ok((
        StatusCode::CREATED,
        Json(PromptSaved {
            success: true,
            id: prompt.id,
            expires_at: prompt.expires_at,
        }),
    ))
}
