//! Weather API client for the drying-yard condition check
//!
//! Integrates with the Open-Meteo current-weather endpoint and classifies
//! the reported WMO code into the sky conditions the cooperative plans
//! around.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use shared::SkyCondition;

/// Weather API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

/// Current conditions over the drying yard
#[derive(Debug, Clone, Serialize)]
pub struct DetectedWeather {
    pub condition: SkyCondition,
    pub weather_code: u32,
    pub temperature_celsius: Decimal,
    pub wind_speed_kmh: Decimal,
}

/// Open-Meteo API response for current weather
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature: f64,
    windspeed: f64,
    weathercode: u32,
}

impl OpenMeteoClient {
    /// Create a new OpenMeteoClient
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch current conditions by GPS coordinates
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<DetectedWeather> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current_weather=true",
            self.base_url, latitude, longitude
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("weather request failed: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            tracing::warn!("weather API returned {}", response.status());
            return Err(AppError::WeatherServiceUnavailable);
        }

        let data: OpenMeteoResponse = response.json().await.map_err(|e| {
            tracing::warn!("failed to parse weather response: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        Ok(DetectedWeather {
            condition: SkyCondition::from_wmo_code(data.current_weather.weathercode),
            weather_code: data.current_weather.weathercode,
            temperature_celsius: Decimal::from_f64_retain(data.current_weather.temperature)
                .unwrap_or_default(),
            wind_speed_kmh: Decimal::from_f64_retain(data.current_weather.windspeed)
                .unwrap_or_default(),
        })
    }
}
