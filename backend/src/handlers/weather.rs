//! HTTP handler for the drying-yard weather check

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppResult;
use crate::external::OpenMeteoClient;
use crate::AppState;

/// Detect the current sky condition over the cooperative's drying yard
pub async fn current_weather(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let weather = &state.config.weather;
    let client = OpenMeteoClient::new(weather.api_endpoint.clone());
    let detected = client
        .current_conditions(weather.latitude, weather.longitude)
        .await?;
    Ok(Json(detected))
}
