use std::collections::HashMap;
use std::ops::Add;

use crate::error::DecodeError;
use crate::pipeline::decode::crc::crc16;
use crate::pipeline::decode::profile::{self, mesg, record, session, sport};
use crate::types::activity::{DecodedActivity, DecodedRecord, Position, SessionMetadata};

const SIGNATURE: &[u8; 4] = b".FIT";
const CRC_SIZE: usize = 2;

const COMPRESSED_HEADER: u8 = 0x80;
const DEFINITION_HEADER: u8 = 0x40;
const DEVELOPER_DATA: u8 = 0x20;

pub fn decode(bytes: &[u8]) -> Result<DecodedActivity, DecodeError> {
    let header = FileHeader::read(bytes)?;

    let data_end = header
        .header_size
        .checked_add(header.data_size)
        .ok_or_else(|| DecodeError::InvalidFormat("data size overflows".to_string()))?;
    let file_end = data_end + CRC_SIZE;
    if bytes.len() < file_end {
        return Err(DecodeError::Truncated {
            offset: bytes.len(),
        });
    }

    let expected = u16::from_le_bytes([bytes[data_end], bytes[data_end + 1]]);
    let actual = crc16(&bytes[..data_end]);
    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }

    if bytes.len() > file_end {
        tracing::debug!(
            trailing = bytes.len() - file_end,
            "Ignoring bytes after the first FIT file"
        );
    }

    let mut walker = MessageWalker::new(bytes, header.header_size, data_end);
    walker.walk()?;
    Ok(walker.finish())
}

#[derive(Debug, Clone, Copy)]
struct FileHeader {
    header_size: usize,
    data_size: usize,
}

impl FileHeader {
    fn read(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some(&header_size) = bytes.first() else {
            return Err(DecodeError::Truncated { offset: 0 });
        };

        let header_size = usize::from(header_size);
        if header_size != 12 && header_size != 14 {
            return Err(DecodeError::InvalidFormat(format!(
                "unsupported header size {header_size}"
            )));
        }

        if bytes.len() < header_size {
            return Err(DecodeError::Truncated {
                offset: bytes.len(),
            });
        }

        if &bytes[8..12] != SIGNATURE {
            return Err(DecodeError::InvalidFormat(
                "missing .FIT signature".to_string(),
            ));
        }

        // A zero header CRC means the writer did not compute one.
        if header_size == 14 {
            let expected = u16::from_le_bytes([bytes[12], bytes[13]]);
            if expected != 0 {
                let actual = crc16(&bytes[..12]);
                if expected != actual {
                    return Err(DecodeError::ChecksumMismatch { expected, actual });
                }
            }
        }

        let data_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

        Ok(Self {
            header_size,
            data_size,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldDefinition {
    number: u8,
    size: usize,
    base_type: u8,
}

#[derive(Debug, Clone)]
struct MessageDefinition {
    global: u16,
    big_endian: bool,
    fields: Vec<FieldDefinition>,
    developer_size: usize,
}

impl MessageDefinition {
    fn data_size(&self) -> usize {
        self.fields.iter().map(|f| f.size).sum::<usize>() + self.developer_size
    }

    fn read_fields(&self, payload: &[u8]) -> FieldValues {
        let mut values = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for field in &self.fields {
            let bytes = &payload[offset..offset + field.size];
            offset += field.size;
            if let Some(value) = profile::read_value(bytes, field.base_type, self.big_endian) {
                values.push((field.number, value));
            }
        }
        FieldValues(values)
    }
}

/// Valid field values of one data message, keyed by field number.
struct FieldValues(Vec<(u8, i64)>);

impl FieldValues {
    fn get(&self, number: u8) -> Option<i64> {
        self.0
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, value)| *value)
    }

    fn get_u32(&self, number: u8) -> Option<u32> {
        self.get(number).and_then(|v| u32::try_from(v).ok())
    }
}

struct MessageWalker<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    definitions: HashMap<u8, MessageDefinition>,
    last_timestamp: Option<u32>,
    records: Vec<DecodedRecord>,
    metadata: SessionMetadata,
    session_start: Option<u32>,
    fallback_sport: Option<u8>,
    sessions: usize,
    skipped: usize,
    untimed: usize,
}

impl<'a> MessageWalker<'a> {
    fn new(bytes: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            bytes,
            pos: start,
            end,
            definitions: HashMap::new(),
            last_timestamp: None,
            records: Vec::new(),
            metadata: SessionMetadata::default(),
            session_start: None,
            fallback_sport: None,
            sessions: 0,
            skipped: 0,
            untimed: 0,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.end)
            .ok_or(DecodeError::Truncated { offset: self.end })?;
        self.pos = end;
        let bytes = self.bytes;
        Ok(&bytes[start..end])
    }

    fn walk(&mut self) -> Result<(), DecodeError> {
        while self.pos < self.end {
            let header = self.take(1)?[0];

            if header & COMPRESSED_HEADER != 0 {
                let local = (header >> 5) & 0x03;
                let timestamp = self
                    .last_timestamp
                    .map(|last| roll_timestamp(last, header & 0x1F));
                if timestamp.is_some() {
                    self.last_timestamp = timestamp;
                }
                self.read_data(local, timestamp)?;
            } else if header & DEFINITION_HEADER != 0 {
                self.read_definition(header & 0x0F, header & DEVELOPER_DATA != 0)?;
            } else {
                self.read_data(header & 0x0F, None)?;
            }
        }
        Ok(())
    }

    fn read_definition(&mut self, local: u8, has_developer_fields: bool) -> Result<(), DecodeError> {
        let fixed = self.take(5)?;
        let big_endian = match fixed[1] {
            0 => false,
            1 => true,
            other => {
                return Err(DecodeError::InvalidFormat(format!(
                    "unknown architecture {other}"
                )))
            }
        };
        let global = if big_endian {
            u16::from_be_bytes([fixed[2], fixed[3]])
        } else {
            u16::from_le_bytes([fixed[2], fixed[3]])
        };

        let count = usize::from(fixed[4]);
        let fields = self
            .take(count * 3)?
            .chunks_exact(3)
            .map(|chunk| FieldDefinition {
                number: chunk[0],
                size: usize::from(chunk[1]),
                base_type: chunk[2],
            })
            .collect();

        let mut developer_size = 0;
        if has_developer_fields {
            let count = usize::from(self.take(1)?[0]);
            developer_size = self
                .take(count * 3)?
                .chunks_exact(3)
                .map(|chunk| usize::from(chunk[1]))
                .sum();
        }

        self.definitions.insert(
            local,
            MessageDefinition {
                global,
                big_endian,
                fields,
                developer_size,
            },
        );
        Ok(())
    }

    fn read_data(&mut self, local: u8, compressed: Option<u32>) -> Result<(), DecodeError> {
        let size = self
            .definitions
            .get(&local)
            .map(MessageDefinition::data_size)
            .ok_or_else(|| {
                DecodeError::InvalidFormat(format!(
                    "data message for undefined local type {local} at byte {}",
                    self.pos - 1
                ))
            })?;
        let payload = self.take(size)?;

        let definition = &self.definitions[&local];
        let global = definition.global;
        let fields = definition.read_fields(payload);

        let explicit = fields.get_u32(profile::TIMESTAMP);
        if explicit.is_some() {
            self.last_timestamp = explicit;
        }
        let timestamp = explicit.or(compressed);

        match global {
            mesg::RECORD => self.push_record(timestamp, &fields),
            mesg::SESSION => self.push_session(&fields),
            mesg::SPORT => {
                if self.fallback_sport.is_none() {
                    self.fallback_sport = fields.get(sport::SPORT).and_then(|v| u8::try_from(v).ok());
                }
            }
            _ => self.skipped += 1,
        }
        Ok(())
    }

    fn push_record(&mut self, timestamp: Option<u32>, fields: &FieldValues) {
        let Some(timestamp) = timestamp else {
            self.untimed += 1;
            return;
        };

        let heart_rate = fields
            .get(record::HEART_RATE)
            .and_then(|v| u16::try_from(v).ok())
            .filter(|&hr| hr > 0);
        let speed = fields
            .get(record::ENHANCED_SPEED)
            .or_else(|| fields.get(record::SPEED))
            .map(|raw| profile::unscale(raw, 1000.0, 0.0));
        let elevation = fields
            .get(record::ENHANCED_ALTITUDE)
            .or_else(|| fields.get(record::ALTITUDE))
            .map(|raw| profile::unscale(raw, 5.0, 500.0));
        let lat = fields
            .get(record::POSITION_LAT)
            .and_then(|v| i32::try_from(v).ok());
        let lon = fields
            .get(record::POSITION_LONG)
            .and_then(|v| i32::try_from(v).ok());
        let position = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Position {
                lat: profile::semicircles_to_degrees(lat),
                lon: profile::semicircles_to_degrees(lon),
            }),
            _ => None,
        };

        self.records.push(DecodedRecord {
            timestamp,
            heart_rate,
            speed,
            elevation,
            position,
        });
    }

    fn push_session(&mut self, fields: &FieldValues) {
        self.sessions += 1;

        if let Some(start) = fields.get_u32(session::START_TIME) {
            self.session_start = Some(self.session_start.map_or(start, |s| s.min(start)));
        }
        if self.metadata.sport_code.is_none() {
            self.metadata.sport_code = fields
                .get(session::SPORT)
                .and_then(|v| u8::try_from(v).ok());
        }

        accumulate(
            &mut self.metadata.total_elapsed_time,
            fields
                .get(session::TOTAL_ELAPSED_TIME)
                .map(|raw| profile::unscale(raw, 1000.0, 0.0)),
        );
        accumulate(
            &mut self.metadata.total_distance,
            fields
                .get(session::TOTAL_DISTANCE)
                .map(|raw| profile::unscale(raw, 100.0, 0.0)),
        );
        accumulate(
            &mut self.metadata.total_calories,
            fields.get_u32(session::TOTAL_CALORIES),
        );
    }

    fn finish(mut self) -> DecodedActivity {
        if self.metadata.sport_code.is_none() {
            self.metadata.sport_code = self.fallback_sport;
        }

        let first = self.records.iter().map(|r| r.timestamp).min();
        let base = match (self.session_start, first) {
            (Some(start), Some(first)) if start <= first => start,
            (_, Some(first)) => first,
            _ => 0,
        };
        for record in &mut self.records {
            record.timestamp -= base;
        }
        self.records.sort_by_key(|r| r.timestamp);

        tracing::debug!(
            records = self.records.len(),
            sessions = self.sessions,
            skipped = self.skipped,
            untimed = self.untimed,
            "Decoded FIT activity"
        );

        DecodedActivity {
            metadata: self.metadata,
            records: self.records,
        }
    }
}

/// Expands a 5-bit compressed time offset against the last full timestamp.
fn roll_timestamp(last: u32, offset: u8) -> u32 {
    let delta = u32::from(offset).wrapping_sub(last & 0x1F) & 0x1F;
    last.wrapping_add(delta)
}

fn accumulate<T: Copy + Add<Output = T>>(total: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *total = Some(match *total {
            Some(sum) => sum + value,
            None => value,
        });
    }
}
