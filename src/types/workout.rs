use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Running,
    Cycling,
    Swimming,
    Walking,
    Hiking,
    Rowing,
    Training,
    Unknown,
}

impl Sport {
    /// Maps a FIT `sport` enumeration value onto the supported set.
    pub fn from_fit_code(code: u8) -> Self {
        match code {
            1 => Sport::Running,
            2 => Sport::Cycling,
            5 => Sport::Swimming,
            10 => Sport::Training,
            11 => Sport::Walking,
            15 => Sport::Rowing,
            17 => Sport::Hiking,
            _ => Sport::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Running => "running",
            Sport::Cycling => "cycling",
            Sport::Swimming => "swimming",
            Sport::Walking => "walking",
            Sport::Hiking => "hiking",
            Sport::Rowing => "rowing",
            Sport::Training => "training",
            Sport::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = std::convert::Infallible;

    /// Unrecognized names read back as `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "running" => Sport::Running,
            "cycling" => Sport::Cycling,
            "swimming" => Sport::Swimming,
            "walking" => Sport::Walking,
            "hiking" => Sport::Hiking,
            "rowing" => Sport::Rowing,
            "training" => Sport::Training,
            _ => Sport::Unknown,
        })
    }
}

/// Summarizer output before validation and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSummary {
    pub sport_code: Option<u8>,
    pub duration: i64,
    pub distance: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    pub max_heart_rate: Option<u16>,
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub filename: String,
    pub sport: Sport,
    /// Seconds.
    pub duration: i64,
    /// Meters, centimeter precision.
    pub distance: Option<f64>,
    pub avg_heart_rate: Option<u16>,
    pub max_heart_rate: Option<u16>,
    pub calories: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWorkout {
    pub id: i64,
    #[serde(flatten)]
    pub summary: WorkoutSummary,
}
