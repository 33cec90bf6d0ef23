use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use nutrigenie_common::Error;
use nutrigenie_core::calories::{ActivityLevel, Profile, Sex};
use nutrigenie_core::prompt;
use nutrigenie_core::sections::{SectionedResponse, sectioned_response};
use nutrigenie_providers::{GenerationRequest, ImagePayload};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RecommendRequest {
    pub condition: String,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub model: String,
    pub result: SectionedResponse,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub mime_type: String,
}

#[derive(Deserialize)]
pub struct CaloriesRequest {
    pub age: u32,
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: String,
}

#[derive(Serialize)]
pub struct CaloriesResponse {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub daily_calories: u32,
}

#[derive(Deserialize)]
pub struct RecipesRequest {
    #[serde(default)]
    pub dietary_preference: String,
    #[serde(default)]
    pub health_goal: String,
    pub ingredients: String,
}

#[derive(Deserialize)]
pub struct ShoppingListRequest {
    pub planned_recipes: String,
    pub available_ingredients: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

fn error_status(e: &Error) -> StatusCode {
    match e {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Provider(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_json(e: &Error) -> (StatusCode, Json<serde_json::Value>) {
    (
        error_status(e),
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}

fn feature_disabled(name: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("{name} is disabled") })),
    )
        .into_response()
}

/// POST /api/recommend — dietary recommendations for a health concern.
pub async fn recommend(
    State(state): State<SharedState>,
    Json(body): Json<RecommendRequest>,
) -> impl IntoResponse {
    let instruction = match prompt::recommendation(&body.condition) {
        Ok(p) => p,
        Err(e) => return error_json(&e).into_response(),
    };

    let request = GenerationRequest::text(instruction);
    match state.provider.generate(&request).await {
        Ok(response) => {
            state.record_search(body.condition.trim(), &response.text);
            let result = sectioned_response(&response.text, &prompt::RECOMMENDATION_SECTIONS);
            Json(RecommendResponse {
                query: body.condition.trim().to_string(),
                model: response.model,
                result,
            })
            .into_response()
        }
        Err(e) => {
            warn!("recommendation request failed: {e}");
            error_json(&e).into_response()
        }
    }
}

/// POST /api/analyze — calorie breakdown for a meal photo.
pub async fn analyze(
    State(state): State<SharedState>,
    Json(body): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if !state.config.features.image_analysis {
        return feature_disabled("image analysis");
    }

    let data = match BASE64.decode(body.image.as_bytes()) {
        Ok(data) => data,
        Err(e) => {
            let err = Error::Validation(format!("image is not valid base64: {e}"));
            return error_json(&err).into_response();
        }
    };

    let request = GenerationRequest::text(prompt::meal_analysis()).with_image(ImagePayload {
        mime_type: body.mime_type.clone(),
        data,
    });

    match state.provider.generate(&request).await {
        Ok(response) => {
            state.record_search(&format!("meal image ({})", body.mime_type), &response.text);
            Json(serde_json::json!({
                "model": response.model,
                "text": response.text,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("image analysis request failed: {e}");
            error_json(&e).into_response()
        }
    }
}

/// POST /api/calories — deterministic daily calorie estimate, no provider call.
pub async fn calories(Json(body): Json<CaloriesRequest>) -> impl IntoResponse {
    let parsed: Result<(Sex, ActivityLevel), Error> = body
        .sex
        .parse::<Sex>()
        .and_then(|sex| body.activity.parse::<ActivityLevel>().map(|a| (sex, a)));

    let (sex, activity) = match parsed {
        Ok(pair) => pair,
        Err(e) => return error_json(&e).into_response(),
    };

    let profile = Profile {
        age: body.age,
        sex,
        height_cm: body.height_cm,
        weight_kg: body.weight_kg,
        activity,
    };

    match nutrigenie_core::calories::daily_calories(&profile) {
        Ok(kcal) => Json(CaloriesResponse {
            bmr: profile.bmr(),
            activity_multiplier: activity.multiplier(),
            daily_calories: kcal,
        })
        .into_response(),
        Err(e) => error_json(&e).into_response(),
    }
}

/// POST /api/recipes — recipe suggestions from preferences and pantry contents.
pub async fn recipes(
    State(state): State<SharedState>,
    Json(body): Json<RecipesRequest>,
) -> impl IntoResponse {
    if !state.config.features.recipes {
        return feature_disabled("recipe suggestions");
    }

    let instruction =
        match prompt::recipes(&body.dietary_preference, &body.health_goal, &body.ingredients) {
            Ok(p) => p,
            Err(e) => return error_json(&e).into_response(),
        };

    let request = GenerationRequest::text(instruction);
    match state.provider.generate(&request).await {
        Ok(response) => {
            state.record_search(
                &format!("recipes: {}", body.ingredients.trim()),
                &response.text,
            );
            Json(serde_json::json!({
                "model": response.model,
                "text": response.text,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("recipe request failed: {e}");
            error_json(&e).into_response()
        }
    }
}

/// POST /api/shopping-list — missing-ingredient list for planned recipes.
pub async fn shopping_list(
    State(state): State<SharedState>,
    Json(body): Json<ShoppingListRequest>,
) -> impl IntoResponse {
    if !state.config.features.shopping_list {
        return feature_disabled("shopping list generation");
    }

    let instruction =
        match prompt::shopping_list(&body.planned_recipes, &body.available_ingredients) {
            Ok(p) => p,
            Err(e) => return error_json(&e).into_response(),
        };

    let request = GenerationRequest::text(instruction);
    match state.provider.generate(&request).await {
        Ok(response) => {
            state.record_search(
                &format!("shopping list: {}", body.planned_recipes.trim()),
                &response.text,
            );
            Json(serde_json::json!({
                "model": response.model,
                "text": response.text,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("shopping list request failed: {e}");
            error_json(&e).into_response()
        }
    }
}

/// GET /api/history — saved searches, newest first.
pub async fn history(
    State(state): State<SharedState>,
    Query(params): Query<HistoryQuery>,
) -> impl IntoResponse {
    let result = match params.limit {
        Some(limit) => state.history.recent(limit),
        None => state.history.list_all(),
    };

    match result {
        Ok(records) => Json(serde_json::json!({ "searches": records })).into_response(),
        Err(e) => error_json(&e).into_response(),
    }
}
