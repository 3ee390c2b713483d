use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::instrument;

use crate::{
    auth::gate::AuthUser,
    classifications::{
        dto::{parse_sample_date, MushroomClassificationDto},
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/classifications/identify",
            post(identify).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
        .route(
            "/classifications/mushroom-instances",
            get(list_mushroom_instances),
        )
        .route("/classifications/images/:id", get(get_image))
}

/// POST /classifications/identify (multipart)
/// Parts: `mushroomImage` (file) and `mushroomDate` (yyyy-MM-dd-HH-mm-ss-SSS).
#[instrument(skip(state, multipart))]
pub async fn identify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<MushroomClassificationDto>, ApiError> {
    let mut image: Option<(Bytes, Option<String>, String)> = None;
    let mut date: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("mushroomImage") => {
                let content_type = field.content_type().map(str::to_string);
                let original_name = field.file_name().unwrap_or("mushroom").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;
                image = Some((data, content_type, original_name));
            }
            Some("mushroomDate") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;
                date = Some(value);
            }
            _ => {}
        }
    }

    let (data, content_type, original_name) = image.ok_or(ApiError::MissingPart)?;
    let date = date.ok_or(ApiError::MissingPart)?;
    let sample_taken_at = parse_sample_date(&date)?;

    let dto = services::classify_for_user(
        &state,
        user_id,
        data,
        content_type,
        &original_name,
        sample_taken_at,
    )
    .await?;
    Ok(Json(dto))
}

#[instrument(skip(state))]
pub async fn list_mushroom_instances(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MushroomClassificationDto>>, ApiError> {
    let instances = services::list_for_user(&state, user_id).await?;
    Ok(Json(instances))
}

#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = services::get_owned_instance(&state, id, user_id).await?;
    let bytes = services::read_image(&state, user_id, &instance.image_name).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
