use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::meeting::{Meeting, NewMeeting};

const HEADERS: [&str; 4] = ["id", "start_time", "end_time", "required_seats"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("meeting store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("meeting store CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("meeting store {path} has unexpected header row: {found}")]
    UnexpectedHeader { path: String, found: String },
    #[error("meeting store id counter {path} is corrupt: {value}")]
    CorruptCounter { path: String, value: String },
    #[error("meeting store lock poisoned")]
    LockPoisoned,
}

/// Persistence contract for meeting records.
///
/// `get` reports a missing id as `Ok(None)`; callers decide what absence means.
#[cfg_attr(test, mockall::automock)]
pub trait MeetingRepository: Send + Sync {
    /// All meetings in id order.
    fn list(&self) -> Result<Vec<Meeting>, StoreError>;

    fn get(&self, id: i64) -> Result<Option<Meeting>, StoreError>;

    /// Assign an id, persist the record and return it.
    fn create(&self, meeting: NewMeeting) -> Result<Meeting, StoreError>;

    fn delete(&self, meeting: &Meeting) -> Result<(), StoreError>;
}

// Mutable state shared by every file operation; holding the guard is holding the file
struct StoreState {
    next_id: i64,
}

/// Meeting store backed by a CSV file with a header row.
///
/// The next id to hand out is kept in a sidecar file (`<csv>.next_id`), so ids
/// stay unique across restarts even when the newest meeting was deleted.
pub struct CsvMeetingStore {
    csv_path: PathBuf,
    counter_path: PathBuf,
    state: Mutex<StoreState>,
}

impl CsvMeetingStore {
    /// Open the store at `csv_path`, creating the file and its directory if needed.
    ///
    /// An existing but empty file gets its header row written.
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let csv_path = csv_path.as_ref().to_path_buf();
        let counter_path = sidecar_path(&csv_path, "next_id");

        let is_empty = match fs::metadata(&csv_path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Creating new meetings database file at {}", csv_path.display());
                if let Some(dir) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(dir)?;
                }
                true
            }
            Err(e) => return Err(e.into()),
        };

        if is_empty {
            let file = File::create(&csv_path)?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(HEADERS)?;
            writer.flush()?;
        }

        let existing = read_all(&csv_path)?;
        let after_max = existing.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let next_id = after_max.max(read_counter(&counter_path)?.unwrap_or(1));
        debug!(
            "Loaded {} meetings from {}, next id {}",
            existing.len(),
            csv_path.display(),
            next_id
        );

        Ok(Self {
            csv_path,
            counter_path,
            state: Mutex::new(StoreState { next_id }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.csv_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl MeetingRepository for CsvMeetingStore {
    fn list(&self) -> Result<Vec<Meeting>, StoreError> {
        let _lock = self.lock()?;
        let mut meetings = read_all(&self.csv_path)?;
        meetings.sort_by_key(|m| m.id);
        Ok(meetings)
    }

    fn get(&self, id: i64) -> Result<Option<Meeting>, StoreError> {
        let _lock = self.lock()?;
        Ok(read_all(&self.csv_path)?.into_iter().find(|m| m.id == id))
    }

    fn create(&self, meeting: NewMeeting) -> Result<Meeting, StoreError> {
        let mut state = self.lock()?;

        let record = Meeting {
            id: state.next_id,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            required_seats: meeting.required_seats,
        };

        // Reserve the id before the row lands so a crash in between only skips an id
        write_atomically(&self.counter_path, |file| {
            writeln!(file, "{}", record.id + 1)?;
            Ok(())
        })?;

        let file = OpenOptions::new().append(true).open(&self.csv_path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(&record)?;
        writer.flush()?;

        state.next_id = record.id + 1;

        info!(
            meeting_id = record.id,
            "Stored meeting {} - {} ({} seats)",
            record.start_time,
            record.end_time,
            record.required_seats
        );

        Ok(record)
    }

    fn delete(&self, meeting: &Meeting) -> Result<(), StoreError> {
        let _lock = self.lock()?;

        let meetings = read_all(&self.csv_path)?;
        let before = meetings.len();
        let remaining: Vec<Meeting> = meetings.into_iter().filter(|m| m.id != meeting.id).collect();

        if remaining.len() == before {
            warn!(meeting_id = meeting.id, "Meeting to delete is not in the store");
            return Ok(());
        }

        // Write all records to a temporary file and swap it in
        write_atomically(&self.csv_path, |file| {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(HEADERS)?;
            for record in &remaining {
                writer.serialize(record)?;
            }
            writer.flush()?;
            Ok(())
        })?;

        info!(meeting_id = meeting.id, "Deleted meeting");
        Ok(())
    }
}

fn sidecar_path(csv_path: &Path, suffix: &str) -> PathBuf {
    let mut name = csv_path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

// Write `path` through a temporary sibling file and rename it into place
fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> Result<(), StoreError>,
{
    let tmp_path = sidecar_path(path, "tmp");
    let mut file = File::create(&tmp_path)?;

    let written = write(&mut file).and_then(|()| file.sync_all().map_err(StoreError::from));
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(e);
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_counter(counter_path: &Path) -> Result<Option<i64>, StoreError> {
    let raw = match fs::read_to_string(counter_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    raw.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StoreError::CorruptCounter {
            path: counter_path.display().to_string(),
            value: raw.trim().to_string(),
        })
}

fn read_all(csv_path: &Path) -> Result<Vec<Meeting>, StoreError> {
    let file = match File::open(csv_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?;
    if headers.iter().ne(HEADERS) {
        return Err(StoreError::UnexpectedHeader {
            path: csv_path.display().to_string(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut meetings = Vec::new();
    for result in reader.deserialize() {
        meetings.push(result?);
    }

    Ok(meetings)
}
