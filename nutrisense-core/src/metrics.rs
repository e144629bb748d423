//! Pure calculators for walking metrics.

use crate::models::Gender;

/// Metabolic equivalent used for walking.
pub const WALKING_MET: f64 = 3.5;
/// Weight assumed when the profile has none.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
/// Average walking pace used for up-front estimates.
pub const WALKING_SPEED_KMH: f64 = 4.8;

const STRIDE_MALE_M: f64 = 0.78;
const STRIDE_FEMALE_M: f64 = 0.70;
const STRIDE_DEFAULT_M: f64 = 0.75;

pub fn stride_length_m(gender: Gender) -> f64 {
    match gender {
        Gender::Male => STRIDE_MALE_M,
        Gender::Female => STRIDE_FEMALE_M,
        Gender::Unspecified => STRIDE_DEFAULT_M,
    }
}

/// Estimated step count for walking `distance_km`.
pub fn estimate_steps(distance_km: f64, gender: Gender) -> u64 {
    let steps = (distance_km * 1000.0 / stride_length_m(gender)).round();
    if steps.is_finite() && steps > 0.0 {
        steps as u64
    } else {
        0
    }
}

/// Calories burned per second at the given intensity.
pub fn calorie_rate_per_second(met: f64, weight_kg: f64) -> f64 {
    met * weight_kg / 3600.0
}

/// Whole calories burned over `elapsed_secs`, never negative.
pub fn calories_burned(met: f64, weight_kg: f64, elapsed_secs: u64) -> u64 {
    let calories = (met * weight_kg * elapsed_secs as f64 / 3600.0).round();
    if calories.is_finite() && calories > 0.0 {
        calories as u64
    } else {
        0
    }
}

/// Calories expected for walking `distance_km` at the average pace.
pub fn estimate_walk_calories(distance_km: f64, weight_kg: f64) -> u64 {
    let calories = (WALKING_MET * weight_kg * distance_km / WALKING_SPEED_KMH).round();
    if calories.is_finite() && calories > 0.0 {
        calories as u64
    } else {
        0
    }
}

/// Renders milliseconds as `MM:SS`. Minutes are not capped at 59.
pub fn format_elapsed(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
