//! Builds FIT files byte by byte for tests.
#![allow(dead_code)]

use fitlog_rs::pipeline::decode::crc16;

pub const UINT8: u8 = 0x02;
pub const ENUM: u8 = 0x00;
pub const UINT16: u8 = 0x84;
pub const SINT32: u8 = 0x85;
pub const UINT32: u8 = 0x86;

pub const MESG_FILE_ID: u16 = 0;
pub const MESG_SPORT: u16 = 12;
pub const MESG_SESSION: u16 = 18;
pub const MESG_RECORD: u16 = 20;
pub const MESG_EVENT: u16 = 21;

/// Seconds since 1989-12-31T00:00:00Z; an arbitrary 2021 morning.
pub const START: u32 = 1_000_000_000;

pub struct FitBuilder {
    header_size: u8,
    data: Vec<u8>,
}

impl Default for FitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitBuilder {
    pub fn new() -> Self {
        Self {
            header_size: 14,
            data: Vec::new(),
        }
    }

    pub fn with_short_header() -> Self {
        Self {
            header_size: 12,
            data: Vec::new(),
        }
    }

    /// `fields` are `(field number, size, base type)` triples.
    pub fn define(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> &mut Self {
        self.data.push(0x40 | local);
        self.data.extend_from_slice(&[0, 0]);
        self.data.extend_from_slice(&global.to_le_bytes());
        self.push_fields(fields);
        self
    }

    pub fn define_big_endian(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> &mut Self {
        self.data.push(0x40 | local);
        self.data.extend_from_slice(&[0, 1]);
        self.data.extend_from_slice(&global.to_be_bytes());
        self.push_fields(fields);
        self
    }

    /// `developer` are `(field number, size, developer data index)` triples.
    pub fn define_with_developer(
        &mut self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        developer: &[(u8, u8, u8)],
    ) -> &mut Self {
        self.data.push(0x40 | 0x20 | local);
        self.data.extend_from_slice(&[0, 0]);
        self.data.extend_from_slice(&global.to_le_bytes());
        self.push_fields(fields);
        self.data.push(developer.len() as u8);
        for &(number, size, index) in developer {
            self.data.extend_from_slice(&[number, size, index]);
        }
        self
    }

    fn push_fields(&mut self, fields: &[(u8, u8, u8)]) {
        self.data.push(fields.len() as u8);
        for &(number, size, base_type) in fields {
            self.data.extend_from_slice(&[number, size, base_type]);
        }
    }

    pub fn data(&mut self, local: u8, payload: &[u8]) -> &mut Self {
        self.data.push(local & 0x0F);
        self.data.extend_from_slice(payload);
        self
    }

    pub fn compressed(&mut self, local: u8, time_offset: u8, payload: &[u8]) -> &mut Self {
        self.data.push(0x80 | ((local & 0x03) << 5) | (time_offset & 0x1F));
        self.data.extend_from_slice(payload);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn file_id(&mut self, local: u8) -> &mut Self {
        self.define(
            local,
            MESG_FILE_ID,
            &[(0, 1, ENUM), (1, 2, UINT16), (4, 4, UINT32)],
        );
        let mut payload = vec![4];
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(&START.to_le_bytes());
        self.data(local, &payload)
    }

    pub fn define_record(&mut self, local: u8) -> &mut Self {
        self.define(
            local,
            MESG_RECORD,
            &[
                (253, 4, UINT32),
                (0, 4, SINT32),
                (1, 4, SINT32),
                (2, 2, UINT16),
                (3, 1, UINT8),
                (6, 2, UINT16),
            ],
        )
    }

    pub fn record(&mut self, local: u8, sample: &Sample) -> &mut Self {
        let payload = sample.encode();
        self.data(local, &payload)
    }

    pub fn define_session(&mut self, local: u8) -> &mut Self {
        self.define(
            local,
            MESG_SESSION,
            &[
                (253, 4, UINT32),
                (2, 4, UINT32),
                (5, 1, ENUM),
                (7, 4, UINT32),
                (9, 4, UINT32),
                (11, 2, UINT16),
            ],
        )
    }

    pub fn session(&mut self, local: u8, session: &Session) -> &mut Self {
        let payload = session.encode();
        self.data(local, &payload)
    }

    pub fn body(&self) -> &[u8] {
        &self.data
    }

    pub fn build(&self) -> Vec<u8> {
        let mut file = Vec::with_capacity(usize::from(self.header_size) + self.data.len() + 2);
        file.push(self.header_size);
        file.push(0x20);
        file.extend_from_slice(&2132u16.to_le_bytes());
        file.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        file.extend_from_slice(b".FIT");
        if self.header_size == 14 {
            let crc = crc16(&file);
            file.extend_from_slice(&crc.to_le_bytes());
        }
        file.extend_from_slice(&self.data);
        let crc = crc16(&file);
        file.extend_from_slice(&crc.to_le_bytes());
        file
    }
}

/// One `record` message in real-world units; `None` encodes the invalid sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sample {
    pub timestamp: u32,
    pub lat_deg: Option<f64>,
    pub lon_deg: Option<f64>,
    pub altitude_m: Option<f64>,
    pub heart_rate: Option<u8>,
    pub speed_mps: Option<f64>,
}

impl Sample {
    pub fn at(timestamp: u32) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn hr(mut self, bpm: u8) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(17);
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&semicircles(self.lat_deg).to_le_bytes());
        out.extend_from_slice(&semicircles(self.lon_deg).to_le_bytes());
        let altitude = self
            .altitude_m
            .map_or(u16::MAX, |m| ((m + 500.0) * 5.0).round() as u16);
        out.extend_from_slice(&altitude.to_le_bytes());
        out.push(self.heart_rate.unwrap_or(u8::MAX));
        let speed = self
            .speed_mps
            .map_or(u16::MAX, |s| (s * 1000.0).round() as u16);
        out.extend_from_slice(&speed.to_le_bytes());
        out
    }
}

fn semicircles(degrees: Option<f64>) -> i32 {
    degrees.map_or(i32::MAX, |d| (d * 2_147_483_648.0 / 180.0).round() as i32)
}

/// One `session` message; `None` encodes the invalid sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    pub start_time: Option<u32>,
    pub sport: Option<u8>,
    pub elapsed_ms: Option<u32>,
    pub distance_cm: Option<u32>,
    pub calories: Option<u16>,
}

impl Session {
    fn encode(&self) -> Vec<u8> {
        let start = self.start_time.unwrap_or(START);
        let end = start + self.elapsed_ms.unwrap_or(0) / 1000;
        let mut out = Vec::with_capacity(19);
        out.extend_from_slice(&end.to_le_bytes());
        out.extend_from_slice(&self.start_time.unwrap_or(u32::MAX).to_le_bytes());
        out.push(self.sport.unwrap_or(u8::MAX));
        out.extend_from_slice(&self.elapsed_ms.unwrap_or(u32::MAX).to_le_bytes());
        out.extend_from_slice(&self.distance_cm.unwrap_or(u32::MAX).to_le_bytes());
        out.extend_from_slice(&self.calories.unwrap_or(u16::MAX).to_le_bytes());
        out
    }
}

/// A 45-minute, 8.4 km run sampled every 10 s with heart rate rising 120 → 168.
pub fn morning_run() -> Vec<u8> {
    let mut fit = FitBuilder::new();
    fit.file_id(0).define_record(1);
    for i in 0..=270u32 {
        let sample = Sample {
            timestamp: START + i * 10,
            lat_deg: Some(59.9139 + f64::from(i) * 0.0001),
            lon_deg: Some(10.7522),
            altitude_m: Some(20.0 + f64::from(i % 30)),
            heart_rate: Some((120 + 48 * i / 270) as u8),
            speed_mps: Some(3.11),
        };
        fit.record(1, &sample);
    }
    fit.define_session(2).session(
        2,
        &Session {
            start_time: Some(START),
            sport: Some(1),
            elapsed_ms: Some(2_700_000),
            distance_cm: Some(840_000),
            calories: Some(612),
        },
    );
    fit.build()
}

/// A 30-minute ride with no heart-rate sensor.
pub fn ride_without_heart_rate() -> Vec<u8> {
    let mut fit = FitBuilder::new();
    fit.file_id(0).define_record(1);
    for i in 0..=180u32 {
        let sample = Sample {
            timestamp: START + i * 10,
            lat_deg: Some(48.8566),
            lon_deg: Some(2.3522 + f64::from(i) * 0.0005),
            altitude_m: Some(35.0),
            heart_rate: None,
            speed_mps: Some(8.0),
        };
        fit.record(1, &sample);
    }
    fit.define_session(2).session(
        2,
        &Session {
            start_time: Some(START),
            sport: Some(2),
            elapsed_ms: Some(1_800_000),
            distance_cm: Some(1_440_000),
            calories: Some(450),
        },
    );
    fit.build()
}
