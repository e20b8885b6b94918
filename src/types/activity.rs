use serde::{Deserialize, Serialize};

/// An uploaded file as handed over by the upload boundary.
#[derive(Debug, Clone, Copy)]
pub struct RawActivityFile<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> RawActivityFile<'a> {
    pub fn new(filename: &'a str, bytes: &'a [u8]) -> Self {
        Self { filename, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_fit_extension(&self) -> bool {
        match self.filename.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case("fit"),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// One timestamped sample. `timestamp` is seconds from session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedRecord {
    pub timestamp: u32,
    pub heart_rate: Option<u16>,
    pub speed: Option<f64>,
    pub elevation: Option<f64>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Raw FIT `sport` enumeration value.
    pub sport_code: Option<u8>,
    pub total_elapsed_time: Option<f64>,
    pub total_distance: Option<f64>,
    pub total_calories: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedActivity {
    pub metadata: SessionMetadata,
    pub records: Vec<DecodedRecord>,
}
