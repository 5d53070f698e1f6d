//! Irrigation decision rules.
//!
//! Pure functions over a sensor snapshot and optional weather. The first
//! matching soil rule decides, weather then adjusts the decision and appends
//! advisories that never change it.

use crate::models::{Recommendation, SensorSnapshot, WeatherAdvice, WeatherSnapshot};

/// Upper bound on a single irrigation run.
pub const MAX_IRRIGATION_MS: u32 = 300_000;

const WINDY_SPEED: f32 = 10.0;
const WIND_DURATION_FACTOR: f64 = 1.5;

/// Soil rules in priority order: `(duration_ms, reason)` of the first match.
fn soil_rule(sensor: &SensorSnapshot) -> Option<(u32, &'static str)> {
    if sensor.moisture < 30.0 {
        Some((60_000, "Soil moisture is critically low"))
    } else if sensor.moisture < 50.0 && sensor.temperature > 25.0 {
        Some((30_000, "Low moisture with high temperature"))
    } else if sensor.humidity < 40.0 && sensor.temperature > 30.0 {
        Some((45_000, "Low humidity with high temperature"))
    } else {
        None
    }
}

pub fn evaluate(sensor: &SensorSnapshot, weather: Option<&WeatherSnapshot>) -> Recommendation {
    let mut recommendation = match soil_rule(sensor) {
        Some((duration_ms, reason)) => Recommendation {
            should_irrigate: true,
            duration_ms,
            reason: reason.to_string(),
            weather_considerations: Vec::new(),
        },
        None => Recommendation {
            should_irrigate: false,
            duration_ms: 0,
            reason: "Soil conditions are adequate".to_string(),
            weather_considerations: Vec::new(),
        },
    };

    let Some(weather) = weather else {
        return recommendation;
    };

    // Rain suppresses even a critically dry reading.
    if weather.mentions("rain") {
        recommendation.should_irrigate = false;
        recommendation
            .weather_considerations
            .push("Rain expected - skipping irrigation".to_string());
    }

    if weather.wind_speed > WINDY_SPEED {
        let scaled = (f64::from(recommendation.duration_ms) * WIND_DURATION_FACTOR)
            .min(f64::from(MAX_IRRIGATION_MS));
        recommendation.duration_ms = scaled as u32;
        recommendation
            .weather_considerations
            .push("High winds - increasing irrigation time".to_string());
    }

    recommendation.weather_considerations.extend(advisories(weather));
    recommendation
}

pub fn interpret_weather(weather: &WeatherSnapshot) -> WeatherAdvice {
    WeatherAdvice {
        current_conditions: format!(
            "{}°C, {}% humidity, {}",
            weather.temperature.round(),
            weather.humidity,
            capitalize(&weather.description)
        ),
        advice: advisories(weather),
    }
}

fn advisories(weather: &WeatherSnapshot) -> Vec<String> {
    let mut advice = Vec::new();

    let temperature = weather.temperature;
    if temperature < 5.0 {
        advice.push("Cold conditions - protect sensitive crops from frost damage");
    } else if temperature > 35.0 {
        advice.push("High temperatures - increase irrigation frequency, provide shade for sensitive crops");
    } else if temperature > 25.0 && temperature < 35.0 {
        advice.push("Optimal growing conditions for most crops");
    }

    if weather.humidity > 85.0 {
        advice.push("High humidity - watch for fungal diseases, improve air circulation");
    } else if weather.humidity < 30.0 {
        advice.push("Low humidity - increase watering frequency, consider mulching");
    }

    if weather.mentions("rain") {
        advice.push("Reduce irrigation, ensure proper drainage to prevent waterlogging");
    } else if weather.mentions("clear") || weather.mentions("sunny") {
        advice.push("Clear skies - normal irrigation schedule, monitor soil moisture");
    } else if weather.mentions("cloud") {
        advice.push("Cloudy conditions - reduced evaporation, adjust irrigation accordingly");
    }

    if weather.wind_speed > 8.0 {
        advice.push("Windy conditions - increase watering to compensate for evaporation");
    }

    if weather.pressure.is_some_and(|pressure| pressure < 1000.0) {
        advice.push("Low pressure - possible weather changes, monitor closely");
    }

    advice.into_iter().map(String::from).collect()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
