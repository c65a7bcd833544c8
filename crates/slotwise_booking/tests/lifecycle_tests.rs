
use chrono::Duration;
use fixtures::*;
use slotwise_booking::token::generate_token;
use slotwise_booking::BookingError;
use slotwise_common::models::{AppointmentStatus, BlockedDate, WorkingHours};
use slotwise_db::{AppointmentRepository, SqlAppointmentRepository};

#[tokio::test]
async fn test_booked_slot_disappears_from_availability() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);

    let before = service.available_slots(date).await.unwrap();
    assert!(before.available);
    assert_eq!(before.slots.len(), 16);
    assert!(before.calendar_configured);

    let confirmation = service
        .create_appointment(booking(date, "10:00", "Ada"))
        .await
        .unwrap();
    assert_eq!(confirmation.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(confirmation.appointment.duration_minutes, 30);
    assert_eq!(
        confirmation.manage_url,
        format!("{BASE_URL}/booking/manage?token={}", confirmation.token)
    );

    let after = service.available_slots(date).await.unwrap();
    assert_eq!(after.slots.len(), 15);
    assert!(!after.slots.contains(&"10:00".to_string()));

    let events = gateway.events();
    assert_eq!(events.len(), 1);
    let event = events.values().next().unwrap();
    assert_eq!(event.attendee_email, "ada@example.com");
    assert_eq!(event.end - event.start, Duration::minutes(30));
    assert_eq!(confirmation.meeting_join_url, event.meeting_join_url);
}

#[tokio::test]
async fn test_double_booking_is_a_conflict() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);

    service
        .create_appointment(booking(date, "11:00", "Ada"))
        .await
        .unwrap();
    let second = service
        .create_appointment(booking(date, "11:00", "Grace"))
        .await;
    assert!(matches!(second, Err(BookingError::SlotConflict)));
    // The pre-check stops the second attempt before the calendar is touched
    assert_eq!(gateway.events().len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_yield_one_booking() {
    let gateway = FakeGateway::new();
    let (service, db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(4);

    let (first, second) = tokio::join!(
        service.create_appointment(booking(date, "14:00", "Ada")),
        service.create_appointment(booking(date, "14:00", "Grace")),
    );
    let outcomes = [first, second];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(BookingError::SlotConflict)))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);

    let active = SqlAppointmentRepository::new(db)
        .list_active_on(date)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(gateway.events().len(), 1);
}

#[tokio::test]
async fn test_insert_conflict_deletes_the_new_event() {
    let gateway = FakeGateway::new();
    let (service, db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(5);
    gateway.race_on_create(db.clone(), stored_appointment(date, "09:30", &generate_token()));

    let result = service
        .create_appointment(booking(date, "09:30", "Ada"))
        .await;
    assert!(matches!(result, Err(BookingError::SlotConflict)));
    assert!(gateway.events().is_empty());
    assert_eq!(gateway.deleted(), vec!["evt-1".to_string()]);
}

#[tokio::test]
async fn test_gateway_failures_on_create_persist_nothing() {
    let cases = [
        (Failure::Auth, "gateway_auth_failure"),
        (Failure::Write, "gateway_write_failure"),
        (Failure::MissingLink, "gateway_write_failure"),
        (Failure::NotConfigured, "configuration_missing"),
    ];
    for (failure, kind) in cases {
        let gateway = FakeGateway::new();
        let (service, db) = booking_service(gateway.clone(), None).await;
        let date = weekday_ahead(3);
        gateway.fail_create(failure);

        let err = service
            .create_appointment(booking(date, "09:00", "Ada"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kind, "{failure:?}");

        let active = SqlAppointmentRepository::new(db)
            .list_active_on(date)
            .await
            .unwrap();
        assert!(active.is_empty());
    }
}

#[tokio::test]
async fn test_create_rejects_invalid_slots() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let date = weekday_ahead(3);

    let off_grid = service
        .create_appointment(booking(date, "09:10", "Ada"))
        .await;
    assert!(matches!(off_grid, Err(BookingError::Validation(_))));

    let after_hours = service
        .create_appointment(booking(date, "17:00", "Ada"))
        .await;
    assert!(matches!(after_hours, Err(BookingError::Validation(_))));

    let too_far = service
        .create_appointment(booking(today() + Duration::days(60), "09:00", "Ada"))
        .await;
    assert!(matches!(too_far, Err(BookingError::Validation(_))));

    let past = service
        .create_appointment(booking(today() - Duration::days(1), "09:00", "Ada"))
        .await;
    assert!(matches!(past, Err(BookingError::PastAppointment)));

    let mut bad_guest = booking(date, "09:00", "Ada");
    bad_guest.guest.email = "not-an-email".to_string();
    assert!(matches!(
        service.create_appointment(bad_guest).await,
        Err(BookingError::Validation(_))
    ));
}

#[tokio::test]
async fn test_cancel_twice_reports_already_cancelled() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);
    let confirmation = service
        .create_appointment(booking(date, "15:00", "Ada"))
        .await
        .unwrap();

    let cancelled = service.cancel_appointment(&confirmation.token).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(gateway.events().is_empty());
    let freed = service.available_slots(date).await.unwrap();
    assert!(freed.slots.contains(&"15:00".to_string()));

    let again = service.cancel_appointment(&confirmation.token).await;
    assert!(matches!(again, Err(BookingError::AlreadyCancelled)));

    let row = service
        .get_appointment_by_token(&confirmation.token)
        .await
        .unwrap();
    assert_eq!(row.status, AppointmentStatus::Cancelled);
    assert_eq!(row.updated_at, cancelled.updated_at);
}

#[tokio::test]
async fn test_cancel_survives_calendar_failure() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let confirmation = service
        .create_appointment(booking(weekday_ahead(3), "15:30", "Ada"))
        .await
        .unwrap();
    gateway.fail_delete(Failure::Write);

    let cancelled = service.cancel_appointment(&confirmation.token).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(gateway.events().len(), 1);
}

async fn restore_storage(db: &slotwise_db::DbClient) {
    db.execute("ALTER TABLE appointments_offline RENAME TO appointments")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancel_reports_success_when_reread_fails() {
    let gateway = FakeGateway::new();
    let (service, db) = booking_service(gateway.clone(), None).await;
    let confirmation = service
        .create_appointment(booking(weekday_ahead(3), "14:00", "Ada"))
        .await
        .unwrap();
    gateway.storage_outage_after_write(db.clone());

    let cancelled = service.cancel_appointment(&confirmation.token).await.unwrap();
    assert_eq!(cancelled.id, confirmation.appointment.id);
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    restore_storage(&db).await;
    let stored = SqlAppointmentRepository::new(db)
        .find_by_token(&confirmation.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_reschedule_reports_success_when_reread_fails() {
    let gateway = FakeGateway::new();
    let (service, db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);
    let confirmation = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    gateway.storage_outage_after_write(db.clone());

    let moved = service
        .reschedule_appointment(&confirmation.token, date, hm("13:00"))
        .await
        .unwrap();
    assert_eq!(moved.appointment_time, hm("13:00"));
    assert_eq!(moved.meeting_join_url, confirmation.appointment.meeting_join_url);

    restore_storage(&db).await;
    let stored = SqlAppointmentRepository::new(db)
        .find_by_token(&confirmation.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.appointment_time, hm("13:00"));
}

#[tokio::test]
async fn test_reschedule_moves_booking_and_keeps_event() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let first_day = weekday_ahead(3);
    let second_day = weekday_ahead(7);
    let confirmation = service
        .create_appointment(booking(first_day, "09:00", "Ada"))
        .await
        .unwrap();
    let event_id = confirmation.appointment.meeting_id.clone().unwrap();

    let moved = service
        .reschedule_appointment(&confirmation.token, second_day, hm("10:30"))
        .await
        .unwrap();
    assert_eq!(moved.id, confirmation.appointment.id);
    assert_eq!(moved.appointment_date, second_day);
    assert_eq!(moved.appointment_time, hm("10:30"));
    assert_eq!(moved.meeting_id.as_deref(), Some(event_id.as_str()));
    assert_eq!(moved.meeting_join_url, confirmation.appointment.meeting_join_url);
    assert_eq!(moved.status, AppointmentStatus::Confirmed);

    let first = service.available_slots(first_day).await.unwrap();
    assert!(first.slots.contains(&"09:00".to_string()));
    let second = service.available_slots(second_day).await.unwrap();
    assert!(!second.slots.contains(&"10:30".to_string()));

    let events = gateway.events();
    assert_eq!(events.len(), 1);
    let event = &events[&event_id];
    let expected_start = second_day
        .and_time(hm("10:30"))
        .and_local_timezone(TIMEZONE)
        .unwrap()
        .with_timezone(&chrono::Utc);
    assert_eq!(event.start, expected_start);
}

#[tokio::test]
async fn test_reschedule_adopts_refreshed_link() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let confirmation = service
        .create_appointment(booking(weekday_ahead(3), "09:00", "Ada"))
        .await
        .unwrap();
    gateway.refresh_link_on_patch("https://meet.google.com/new-link");

    let moved = service
        .reschedule_appointment(&confirmation.token, weekday_ahead(3), hm("11:00"))
        .await
        .unwrap();
    assert_eq!(
        moved.meeting_join_url.as_deref(),
        Some("https://meet.google.com/new-link")
    );
}

#[tokio::test]
async fn test_reschedule_survives_patch_failure() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);
    let confirmation = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    gateway.fail_patch(Failure::Auth);

    let moved = service
        .reschedule_appointment(&confirmation.token, date, hm("13:00"))
        .await
        .unwrap();
    assert_eq!(moved.appointment_time, hm("13:00"));
    assert_eq!(moved.meeting_join_url, confirmation.appointment.meeting_join_url);
}

#[tokio::test]
async fn test_reschedule_into_taken_slot_conflicts() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let date = weekday_ahead(3);
    let ada = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    service
        .create_appointment(booking(date, "10:00", "Grace"))
        .await
        .unwrap();

    let result = service
        .reschedule_appointment(&ada.token, date, hm("10:00"))
        .await;
    assert!(matches!(result, Err(BookingError::SlotConflict)));
    let unchanged = service.get_appointment_by_token(&ada.token).await.unwrap();
    assert_eq!(unchanged.appointment_time, hm("09:00"));
}

#[tokio::test]
async fn test_reschedule_to_same_slot_is_allowed() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let date = weekday_ahead(3);
    let ada = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    let same = service
        .reschedule_appointment(&ada.token, date, hm("09:00"))
        .await
        .unwrap();
    assert_eq!(same.appointment_time, hm("09:00"));
}

#[tokio::test]
async fn test_manage_link_errors() {
    let (service, db) = booking_service(FakeGateway::new(), None).await;

    let unknown = generate_token();
    assert!(matches!(
        service.get_appointment_by_token(&unknown).await,
        Err(BookingError::NotFound)
    ));
    assert!(matches!(
        service.cancel_appointment("garbage").await,
        Err(BookingError::NotFound)
    ));

    let past_token = generate_token();
    insert_directly(
        &db,
        stored_appointment(today() - Duration::days(2), "09:00", &past_token),
    )
    .await;
    assert!(service.get_appointment_by_token(&past_token).await.is_ok());
    assert!(matches!(
        service.cancel_appointment(&past_token).await,
        Err(BookingError::PastAppointment)
    ));
    assert!(matches!(
        service
            .reschedule_appointment(&past_token, weekday_ahead(3), hm("09:00"))
            .await,
        Err(BookingError::PastAppointment)
    ));
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let ada = service
        .create_appointment(booking(weekday_ahead(3), "09:00", "Ada"))
        .await
        .unwrap();
    service.cancel_appointment(&ada.token).await.unwrap();
    assert!(matches!(
        service
            .reschedule_appointment(&ada.token, weekday_ahead(4), hm("09:00"))
            .await,
        Err(BookingError::AlreadyCancelled)
    ));
}

#[tokio::test]
async fn test_unconfigured_calendar_degrades_reads_only() {
    let (service, db) = booking_service(FakeGateway::unconfigured(), None).await;
    let date = weekday_ahead(3);
    insert_directly(&db, stored_appointment(date, "09:00", &generate_token())).await;

    let busy = service.fetch_busy_periods(date).await.unwrap();
    assert!(busy.periods.is_empty());
    assert!(!busy.configured);

    let day = service.available_slots(date).await.unwrap();
    assert!(!day.calendar_configured);
    assert_eq!(day.slots.len(), 15);
    assert!(!day.slots.contains(&"09:00".to_string()));

    let create = service
        .create_appointment(booking(date, "10:00", "Ada"))
        .await;
    assert!(matches!(create, Err(BookingError::ConfigurationMissing(_))));
}

#[tokio::test]
async fn test_busy_periods_shape_availability() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);
    let start = date
        .and_time(hm("12:00"))
        .and_local_timezone(TIMEZONE)
        .unwrap()
        .with_timezone(&chrono::Utc);
    gateway.set_busy(vec![(start, start + Duration::hours(1))]);

    let busy = service.fetch_busy_periods(date).await.unwrap();
    assert!(busy.configured);
    assert_eq!(busy.periods.len(), 1);

    let day = service.available_slots(date).await.unwrap();
    assert_eq!(day.slots.len(), 14);
    assert!(!day.slots.contains(&"12:00".to_string()));
    assert!(!day.slots.contains(&"12:30".to_string()));
}

#[tokio::test]
async fn test_busy_lookup_failure_shows_local_slots() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    gateway.fail_busy(Failure::Read);

    let day = service.available_slots(weekday_ahead(3)).await.unwrap();
    assert_eq!(day.slots.len(), 16);
    assert!(day.calendar_configured);
}

#[tokio::test]
async fn test_blocked_and_closed_days_have_no_slots() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let date = weekday_ahead(3);
    service
        .block_date(BlockedDate {
            blocked_date: date,
            reason: Some("  holiday ".to_string()),
        })
        .await
        .unwrap();

    let day = service.available_slots(date).await.unwrap();
    assert!(!day.available);
    assert!(day.slots.is_empty());
    let blocked = service.blocked_dates().await.unwrap();
    assert_eq!(blocked[0].reason.as_deref(), Some("holiday"));

    service.unblock_date(date).await.unwrap();
    assert!(service.available_slots(date).await.unwrap().available);
    assert!(matches!(
        service.unblock_date(date).await,
        Err(BookingError::NotFound)
    ));

    let day_of_week = slotwise_common::models::day_of_week(date);
    service
        .update_working_hours(WorkingHours {
            day_of_week,
            start_time: hm("09:00"),
            end_time: hm("17:00"),
            is_available: false,
        })
        .await
        .unwrap();
    assert!(service.available_slots(date).await.unwrap().slots.is_empty());
}

#[tokio::test]
async fn test_settings_changes_apply_to_slots() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let mut settings = service.settings().await.unwrap();
    settings.appointment_duration_minutes = 60;
    settings.buffer_minutes = 15;
    service.update_settings(settings.clone()).await.unwrap();

    let day = service.available_slots(weekday_ahead(3)).await.unwrap();
    assert_eq!(day.duration_minutes, 60);
    // 09:00, 10:15, 11:30, 12:45, 14:00, 15:15
    assert_eq!(day.slots.len(), 6);

    settings.timezone = "Nowhere/Special".to_string();
    assert!(matches!(
        service.update_settings(settings).await,
        Err(BookingError::Validation(_))
    ));
}

#[tokio::test]
async fn test_available_dates_follow_working_hours() {
    let (service, _db) = booking_service(FakeGateway::new(), None).await;
    let from = today();
    let to = from + Duration::days(13);
    let listed = service.available_dates(from, to).await.unwrap();
    assert!(listed.dates.len() >= 9);
    assert!(listed
        .dates
        .iter()
        .all(|d| !matches!(chrono::Datelike::weekday(d), chrono::Weekday::Sat | chrono::Weekday::Sun)));
    assert!(matches!(
        service.available_dates(to, from).await,
        Err(BookingError::Validation(_))
    ));
}

#[tokio::test]
async fn test_emails_are_best_effort() {
    let notifier = FakeNotifier::new();
    let (service, _db) = booking_service(FakeGateway::new(), Some(notifier.clone())).await;
    let date = weekday_ahead(3);
    let ada = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    service
        .reschedule_appointment(&ada.token, date, hm("09:30"))
        .await
        .unwrap();
    service.cancel_appointment(&ada.token).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|m| m.to == "ada@example.com"));
    assert!(sent[0].body.contains(&ada.manage_url));
    assert!(sent[0].body.contains(&ada.meeting_join_url));
    assert!(sent[1].subject.contains("moved"));
    assert!(sent[2].subject.contains("cancelled"));

    let (failing_service, _db) =
        booking_service(FakeGateway::new(), Some(FakeNotifier::failing())).await;
    assert!(failing_service
        .create_appointment(booking(date, "09:00", "Grace"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_assessment_is_linked_when_present() {
    let (service, db) = booking_service(FakeGateway::new(), None).await;
    db.execute(
        "INSERT INTO assessment_responses (id, appointment_id, created_at) \
         VALUES ('assess-1', NULL, '2025-01-01T00:00:00Z')",
    )
    .await
    .unwrap();

    let mut request = booking(weekday_ahead(3), "09:00", "Ada");
    request.assessment_id = Some("assess-1".to_string());
    let ada = service.create_appointment(request).await.unwrap();
    assert_eq!(ada.appointment.assessment_id.as_deref(), Some("assess-1"));

    // An unknown assessment does not block the booking
    let mut request = booking(weekday_ahead(3), "09:30", "Grace");
    request.assessment_id = Some("missing".to_string());
    assert!(service.create_appointment(request).await.is_ok());
}

#[tokio::test]
async fn test_reconcile_deletes_only_stale_orphans() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    let date = weekday_ahead(3);
    let ada = service
        .create_appointment(booking(date, "09:00", "Ada"))
        .await
        .unwrap();
    let kept_id = ada.appointment.meeting_id.clone().unwrap();

    let at = |time: &str| {
        date.and_time(hm(time))
            .and_local_timezone(TIMEZONE)
            .unwrap()
            .with_timezone(&chrono::Utc)
    };
    gateway.add_owned_event("orphan-old", at("11:00"), Duration::hours(2), "confirmed");
    gateway.add_owned_event("orphan-new", at("12:00"), Duration::minutes(1), "confirmed");
    gateway.add_owned_event("gone", at("13:00"), Duration::hours(2), "cancelled");

    let report = service
        .reconcile_orphaned_events(today(), date)
        .await
        .unwrap();
    assert_eq!(report.scanned, 4);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped_recent, 1);

    let remaining = gateway.events();
    assert!(remaining.contains_key(&kept_id));
    assert!(!remaining.contains_key("orphan-old"));
    assert!(remaining.contains_key("orphan-new"));
}

#[tokio::test]
async fn test_reconcile_listing_failure_is_a_read_failure() {
    let gateway = FakeGateway::new();
    let (service, _db) = booking_service(gateway.clone(), None).await;
    gateway.fail_list(Failure::Read);

    let err = service
        .reconcile_orphaned_events(today(), weekday_ahead(3))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::GatewayReadFailure(_)));
    assert_eq!(err.kind(), "gateway_read_failure");
}

#[tokio::test]
async fn test_reconcile_needs_configured_calendar() {
    let (service, _db) = booking_service(FakeGateway::unconfigured(), None).await;
    let result = service.reconcile_orphaned_events(today(), today()).await;
    assert!(matches!(result, Err(BookingError::ConfigurationMissing(_))));
}
