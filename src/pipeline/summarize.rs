use crate::pipeline::validate::is_plausible_heart_rate;
use crate::types::activity::{DecodedRecord, SessionMetadata};
use crate::types::workout::PartialSummary;

/// Reduces a decoded activity to its summary fields. Missing telemetry
/// yields absent fields; this stage has no failure mode.
///
/// Heart-rate samples outside the plausible range are skipped so a single
/// sensor glitch cannot skew the average.
pub fn summarize(metadata: &SessionMetadata, records: &[DecodedRecord]) -> PartialSummary {
    let duration = match metadata.total_elapsed_time {
        Some(seconds) => seconds.round() as i64,
        None => elapsed_between_records(records),
    };

    let mut hr_sum = 0u64;
    let mut hr_count = 0u64;
    let mut max_hr: Option<u16> = None;

    for hr in records
        .iter()
        .filter_map(|r| r.heart_rate)
        .filter(|hr| is_plausible_heart_rate(*hr))
    {
        hr_sum += u64::from(hr);
        hr_count += 1;
        max_hr = Some(max_hr.map_or(hr, |max| max.max(hr)));
    }

    let avg_heart_rate = if hr_count > 0 {
        Some(hr_sum as f64 / hr_count as f64)
    } else {
        None
    };

    PartialSummary {
        sport_code: metadata.sport_code,
        duration,
        distance: metadata.total_distance,
        avg_heart_rate,
        max_heart_rate: max_hr,
        calories: metadata.total_calories,
    }
}

fn elapsed_between_records(records: &[DecodedRecord]) -> i64 {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) => i64::from(last.timestamp) - i64::from(first.timestamp),
        _ => 0,
    }
}
