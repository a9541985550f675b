use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// A booked meeting as persisted by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub required_seats: u64,
}

// Fields needed to create a meeting; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub required_seats: u64,
}

/// Body of `POST /schedule_meeting`.
///
/// Timestamps may carry a UTC offset (`2022-01-01T09:00:00+02:00`) or not
/// (`2022-01-01T09:00:00`). The offset is dropped and the wall-clock time kept,
/// so both examples above describe the same naive instant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeetingRequest {
    #[serde(deserialize_with = "deserialize_naive")]
    pub start_time: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_naive")]
    pub end_time: NaiveDateTime,
    pub required_seats: u64,
}

impl From<MeetingRequest> for NewMeeting {
    fn from(request: MeetingRequest) -> Self {
        Self {
            start_time: request.start_time,
            end_time: request.end_time,
            required_seats: request.required_seats,
        }
    }
}

// Response structure for a single meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingResponse {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub required_seats: u64,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        Self {
            id: meeting.id,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            required_seats: meeting.required_seats,
        }
    }
}

// Response structure for the development delete endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub id: i64,
}

// Accepted layouts with a UTC offset, tried after RFC 3339
const OFFSET_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M%:z",
];

// Accepted layouts without an offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp, discarding any offset.
///
/// Seconds are optional, the date and time may be separated by `T` or a space,
/// and the offset may be `Z`, `+HH:MM` or `+HHMM`.
pub fn parse_naive_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_local());
    }

    if let Some(with_offset) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Ok(with_offset.naive_local());
    }

    let without_zulu = value
        .strip_suffix(|c: char| c == 'Z' || c == 'z')
        .unwrap_or(value);
    NAIVE_FORMATS.iter().skip(1).fold(
        NaiveDateTime::parse_from_str(without_zulu, NAIVE_FORMATS[0]),
        |parsed, format| parsed.or_else(|_| NaiveDateTime::parse_from_str(without_zulu, format)),
    )
}

fn deserialize_naive<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_naive_timestamp(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}
