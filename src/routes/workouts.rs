use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;
use crate::store::WorkoutStore;
use crate::types::workout::StoredWorkout;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/workouts", get(list_workouts))
        .route("/api/workouts/chart", get(chart))
        .route("/api/workouts/:id", get(get_workout).delete(delete_workout))
}

async fn list_workouts(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredWorkout>>, AppError> {
    Ok(Json(state.store.list_all().await?))
}

async fn get_workout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoredWorkout>, AppError> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.store.delete(id).await? {
        tracing::info!("Deleted workout {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(id))
    }
}

/// Parallel series for the dashboard charts, oldest upload first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub duration_minutes: Vec<f64>,
    pub distance_km: Vec<Option<f64>>,
    pub avg_heart_rate: Vec<Option<u16>>,
}

impl ChartSeries {
    pub fn from_workouts(workouts: &[StoredWorkout]) -> Self {
        let mut series = ChartSeries::default();
        for workout in workouts.iter().rev() {
            let summary = &workout.summary;
            series
                .labels
                .push(summary.uploaded_at.format("%Y-%m-%d").to_string());
            series
                .duration_minutes
                .push(round_one_decimal(summary.duration as f64 / 60.0));
            series
                .distance_km
                .push(summary.distance.map(|m| round_one_decimal(m / 1000.0)));
            series.avg_heart_rate.push(summary.avg_heart_rate);
        }
        series
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

async fn chart(State(state): State<AppState>) -> Result<Json<ChartSeries>, AppError> {
    let workouts = state.store.list_all().await?;
    Ok(Json(ChartSeries::from_workouts(&workouts)))
}
