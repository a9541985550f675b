use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::config::RoomConfig;
use crate::error::BookingError;
use crate::models::meeting::{Meeting, MeetingRequest, NewMeeting};
use crate::services::overlap::has_overlap;
use crate::services::store::{MeetingRepository, StoreError};

/// Validates and records bookings for the conference room.
///
/// `schedule` reads every stored meeting, scans for an overlap and then
/// inserts. Without `serialize_bookings` nothing guards that sequence, so two
/// concurrent requests for the same slot can both pass the scan and both be
/// stored. With it, a mutex is held from the scan until the insert completes.
pub struct BookingService {
    room: RoomConfig,
    store: Arc<dyn MeetingRepository>,
    booking_lock: Option<Mutex<()>>,
}

impl BookingService {
    pub fn new(room: RoomConfig, store: Arc<dyn MeetingRepository>, serialize_bookings: bool) -> Self {
        Self {
            room,
            store,
            booking_lock: serialize_bookings.then(|| Mutex::new(())),
        }
    }

    /// Accept the meeting if the room can seat it and its interval is free.
    ///
    /// A meeting needing no seats is invalid. Capacity is checked next and
    /// rejects even when the store is empty.
    /// The first stored meeting that overlaps ends the scan. Rejections leave
    /// the store untouched.
    pub fn schedule(&self, request: MeetingRequest) -> Result<Meeting, BookingError> {
        if request.required_seats == 0 {
            return Err(BookingError::InvalidRequest(
                "required_seats must be a positive integer".to_string(),
            ));
        }

        if request.required_seats > u64::from(self.room.total_seats) {
            warn!(
                required_seats = request.required_seats,
                total_seats = self.room.total_seats,
                "Rejecting booking: not enough seats"
            );
            return Err(BookingError::InsufficientCapacity);
        }

        let candidate = NewMeeting::from(request);

        let _guard = match &self.booking_lock {
            Some(lock) => Some(lock.lock().map_err(|_| StoreError::LockPoisoned)?),
            None => None,
        };

        let existing_meetings = self.store.list()?;
        debug!(
            "Checking {} - {} against {} existing meetings",
            candidate.start_time,
            candidate.end_time,
            existing_meetings.len()
        );

        let conflict = existing_meetings.iter().any(|existing| {
            has_overlap(
                candidate.start_time,
                candidate.end_time,
                existing.start_time,
                existing.end_time,
            )
        });

        if conflict {
            warn!(
                "Rejecting booking {} - {}: overlaps an existing meeting",
                candidate.start_time, candidate.end_time
            );
            return Err(BookingError::OverlapConflict);
        }

        let meeting = self.store.create(candidate)?;
        info!(
            meeting_id = meeting.id,
            "Booked meeting {} - {} for {} seats",
            meeting.start_time,
            meeting.end_time,
            meeting.required_seats
        );

        Ok(meeting)
    }

    pub fn list(&self) -> Result<Vec<Meeting>, BookingError> {
        Ok(self.store.list()?)
    }

    /// Remove a meeting by id, reporting an unknown id as `NotFound`.
    pub fn delete(&self, id: i64) -> Result<Meeting, BookingError> {
        let meeting = self.store.get(id)?.ok_or_else(|| {
            warn!(meeting_id = id, "Delete requested for unknown meeting");
            BookingError::NotFound(id)
        })?;

        self.store.delete(&meeting)?;
        info!(meeting_id = id, "Meeting deleted");

        Ok(meeting)
    }
}
