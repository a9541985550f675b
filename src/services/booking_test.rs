#[cfg(test)]
mod booking_tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use mockall::predicate::eq;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::tempdir;

    use crate::config::RoomConfig;
    use crate::error::BookingError;
    use crate::models::meeting::{Meeting, MeetingRequest, NewMeeting};
    use crate::services::booking::BookingService;
    use crate::services::store::{
        CsvMeetingStore, MeetingRepository, MockMeetingRepository, StoreError,
    };

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn request(start: (u32, u32), end: (u32, u32), seats: u64) -> MeetingRequest {
        MeetingRequest {
            start_time: at(start.0, start.1),
            end_time: at(end.0, end.1),
            required_seats: seats,
        }
    }

    fn stored(id: i64, start: (u32, u32), end: (u32, u32), seats: u64) -> Meeting {
        Meeting {
            id,
            start_time: at(start.0, start.1),
            end_time: at(end.0, end.1),
            required_seats: seats,
        }
    }

    fn csv_service(capacity: u32, dir: &tempfile::TempDir) -> BookingService {
        let store = CsvMeetingStore::new(dir.path().join("meetings.csv")).unwrap();
        BookingService::new(RoomConfig::new(capacity), Arc::new(store), false)
    }

    // CSV store whose `list` returns only once every caller has read
    struct LockstepStore {
        inner: CsvMeetingStore,
        barrier: Barrier,
    }

    impl MeetingRepository for LockstepStore {
        fn list(&self) -> Result<Vec<Meeting>, StoreError> {
            let meetings = self.inner.list()?;
            self.barrier.wait();
            Ok(meetings)
        }

        fn get(&self, id: i64) -> Result<Option<Meeting>, StoreError> {
            self.inner.get(id)
        }

        fn create(&self, meeting: NewMeeting) -> Result<Meeting, StoreError> {
            self.inner.create(meeting)
        }

        fn delete(&self, meeting: &Meeting) -> Result<(), StoreError> {
            self.inner.delete(meeting)
        }
    }

    #[test]
    fn test_zero_seats_rejected_before_store_is_read() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list().times(0);
        mock.expect_create().times(0);

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let result = service.schedule(request((9, 0), (10, 0), 0));

        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
    }

    #[test]
    fn test_seat_count_beyond_u32_is_insufficient_capacity() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list().times(0);

        let service = BookingService::new(RoomConfig::new(u32::MAX), Arc::new(mock), false);
        let result = service.schedule(request((9, 0), (10, 0), u64::from(u32::MAX) + 1));

        assert!(matches!(result, Err(BookingError::InsufficientCapacity)));
    }

    #[test]
    fn test_capacity_checked_before_store_is_read() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list().times(0);
        mock.expect_create().times(0);

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let result = service.schedule(request((9, 0), (10, 0), 150));

        assert!(matches!(result, Err(BookingError::InsufficientCapacity)));
    }

    #[test]
    fn test_exact_capacity_is_accepted() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list().times(1).returning(|| Ok(Vec::new()));
        mock.expect_create().times(1).returning(|new| {
            Ok(Meeting {
                id: 1,
                start_time: new.start_time,
                end_time: new.end_time,
                required_seats: new.required_seats,
            })
        });

        let service = BookingService::new(RoomConfig::new(10), Arc::new(mock), false);
        let meeting = service.schedule(request((9, 0), (10, 0), 10)).unwrap();

        assert_eq!(meeting.id, 1);
        assert_eq!(meeting.required_seats, 10);
    }

    #[test]
    fn test_overlap_rejects_without_writing() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list()
            .times(1)
            .returning(|| Ok(vec![stored(1, (9, 0), (10, 0), 5)]));
        mock.expect_create().times(0);

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let result = service.schedule(request((9, 30), (10, 30), 3));

        assert!(matches!(result, Err(BookingError::OverlapConflict)));
    }

    #[test]
    fn test_touching_meeting_is_rejected() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list()
            .returning(|| Ok(vec![stored(1, (9, 0), (10, 0), 5)]));
        mock.expect_create().times(0);

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let result = service.schedule(request((10, 0), (11, 0), 3));

        assert!(matches!(result, Err(BookingError::OverlapConflict)));
    }

    #[test]
    fn test_store_failure_propagates() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_list()
            .returning(|| Err(StoreError::LockPoisoned));

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let result = service.schedule(request((9, 0), (10, 0), 5));

        assert!(matches!(result, Err(BookingError::Store(_))));
    }

    #[test]
    fn test_delete_missing_meeting_is_not_found() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_get().with(eq(7)).times(1).returning(|_| Ok(None));
        mock.expect_delete().times(0);

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);

        assert!(matches!(service.delete(7), Err(BookingError::NotFound(7))));
    }

    #[test]
    fn test_delete_existing_meeting() {
        let mut mock = MockMeetingRepository::new();
        mock.expect_get()
            .with(eq(1))
            .returning(|_| Ok(Some(stored(1, (9, 0), (10, 0), 5))));
        mock.expect_delete()
            .withf(|meeting: &Meeting| meeting.id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = BookingService::new(RoomConfig::default(), Arc::new(mock), false);
        let deleted = service.delete(1).unwrap();

        assert_eq!(deleted.id, 1);
    }

    #[test]
    fn test_booking_scenario_against_csv_store() {
        let dir = tempdir().unwrap();
        let service = csv_service(100, &dir);

        let a = service.schedule(request((9, 0), (10, 0), 5)).unwrap();

        let b = service.schedule(request((9, 30), (10, 30), 3));
        assert!(matches!(b, Err(BookingError::OverlapConflict)));

        let c = service.schedule(request((10, 0), (11, 0), 150));
        assert!(matches!(c, Err(BookingError::InsufficientCapacity)));

        let d = service.schedule(request((11, 0), (12, 0), 5)).unwrap();

        assert_eq!(service.list().unwrap(), vec![a, d]);
    }

    #[test]
    fn test_capacity_rejected_on_empty_store() {
        let dir = tempdir().unwrap();
        let service = csv_service(4, &dir);

        let result = service.schedule(request((9, 0), (10, 0), 5));

        assert!(matches!(result, Err(BookingError::InsufficientCapacity)));
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_frees_the_slot() {
        let dir = tempdir().unwrap();
        let service = csv_service(100, &dir);

        let first = service.schedule(request((9, 0), (10, 0), 5)).unwrap();
        service.delete(first.id).unwrap();

        let again = service.schedule(request((9, 0), (10, 0), 5)).unwrap();
        assert_ne!(again.id, first.id);
        assert_eq!(service.list().unwrap(), vec![again]);
    }

    #[test]
    fn test_serialized_bookings_admit_one_of_many_racing_requests() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn MeetingRepository> =
            Arc::new(CsvMeetingStore::new(dir.path().join("meetings.csv")).unwrap());
        let service = Arc::new(BookingService::new(RoomConfig::default(), store, true));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.schedule(request((9, 0), (10, 0), 5)))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_unserialized_bookings_can_double_book() {
        let dir = tempdir().unwrap();
        let store = LockstepStore {
            inner: CsvMeetingStore::new(dir.path().join("meetings.csv")).unwrap(),
            barrier: Barrier::new(2),
        };
        let service = Arc::new(BookingService::new(
            RoomConfig::default(),
            Arc::new(store),
            false,
        ));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.schedule(request((9, 0), (10, 0), 5)))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        // Both requests scanned an empty store before either inserted
        let meetings = CsvMeetingStore::new(dir.path().join("meetings.csv"))
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(meetings.len(), 2);
        assert_eq!(meetings[0].start_time, meetings[1].start_time);
    }
}
