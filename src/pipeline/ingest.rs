use chrono::{DateTime, SubsecRound, Utc};

use crate::error::IngestError;
use crate::pipeline::{decode, summarize, validate};
use crate::store::WorkoutStore;
use crate::types::activity::RawActivityFile;
use crate::types::workout::{StoredWorkout, WorkoutSummary};

/// Runs the pure stages (decode, summarize, validate) without touching storage.
pub fn extract_summary(
    file: RawActivityFile<'_>,
    uploaded_at: DateTime<Utc>,
) -> Result<WorkoutSummary, IngestError> {
    let activity = decode::decode(file.bytes)?;
    let partial = summarize::summarize(&activity.metadata, &activity.records);
    let summary = validate::validate(partial, file.filename, uploaded_at)?;
    Ok(summary)
}

/// Decodes, summarizes, and validates `file`, then persists the result with a
/// single `create` call. Nothing is written when an earlier stage fails.
pub async fn ingest<S: WorkoutStore>(
    store: &S,
    file: RawActivityFile<'_>,
) -> Result<StoredWorkout, IngestError> {
    let summary = extract_summary(file, Utc::now().trunc_subsecs(0))?;

    let id = store
        .create(&summary)
        .await
        .map_err(IngestError::PersistenceFailed)?;

    tracing::info!(
        id,
        filename = %summary.filename,
        sport = %summary.sport,
        duration = summary.duration,
        "Stored workout"
    );

    Ok(StoredWorkout { id, summary })
}
