use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::workout::{PartialSummary, Sport, WorkoutSummary};

/// Heart-rate values above this are treated as sensor noise.
pub const MAX_HEART_RATE_BPM: u16 = 250;

pub fn is_plausible_heart_rate(bpm: u16) -> bool {
    bpm > 0 && bpm <= MAX_HEART_RATE_BPM
}

/// Checks the summary invariants and normalizes it into the stored shape.
///
/// An implausible maximum means the average was computed from a bad sample,
/// so both heart-rate fields are dropped together.
pub fn validate(
    partial: PartialSummary,
    filename: &str,
    uploaded_at: DateTime<Utc>,
) -> Result<WorkoutSummary, ValidationError> {
    let (avg_heart_rate, max_heart_rate) = match partial.max_heart_rate {
        Some(max) if !is_plausible_heart_rate(max) => (None, None),
        max => (
            partial
                .avg_heart_rate
                .filter(|hr| hr.is_finite() && *hr > 0.0 && *hr <= f64::from(MAX_HEART_RATE_BPM)),
            max,
        ),
    };

    if partial.duration < 0 {
        return Err(violated(
            "duration",
            format!("must not be negative (got {})", partial.duration),
        ));
    }

    if let Some(distance) = partial.distance {
        if !distance.is_finite() || distance < 0.0 {
            return Err(violated(
                "distance",
                format!("must be a non-negative number (got {distance})"),
            ));
        }
    }

    if let (Some(avg), Some(max)) = (avg_heart_rate, max_heart_rate) {
        if avg > f64::from(max) {
            return Err(violated(
                "avg_heart_rate",
                format!("average {avg:.1} exceeds maximum {max}"),
            ));
        }
    }

    Ok(WorkoutSummary {
        filename: filename.to_string(),
        sport: partial
            .sport_code
            .map_or(Sport::Unknown, Sport::from_fit_code),
        duration: partial.duration,
        distance: partial.distance.map(round_to_centimeters),
        avg_heart_rate: avg_heart_rate.map(|hr| hr.round() as u16),
        max_heart_rate,
        calories: partial.calories,
        uploaded_at,
    })
}

fn violated(field: &'static str, reason: String) -> ValidationError {
    ValidationError::InvariantViolated { field, reason }
}

fn round_to_centimeters(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}
