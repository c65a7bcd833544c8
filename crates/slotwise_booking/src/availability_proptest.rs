#[cfg(test)]
mod tests {
    use crate::availability::{candidate_slots, compute_slots, SchedulingContext};
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use proptest::prelude::*;
    use slotwise_common::models::{AdminSettings, Appointment, AppointmentStatus, WorkingHours};

    fn context(duration: i64, buffer: i64, start_hour: u32, end_hour: u32) -> SchedulingContext {
        let settings = AdminSettings {
            appointment_duration_minutes: duration,
            buffer_minutes: buffer,
            advance_booking_days: 60,
            default_monthly_capacity: 20,
            timezone: "Europe/Zurich".to_string(),
        };
        let hours = (0..=6)
            .map(|day| WorkingHours {
                day_of_week: day,
                start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap(),
                is_available: true,
            })
            .collect();
        SchedulingContext::new(settings, hours, Vec::new()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 4, 0, 0).unwrap()
    }

    fn target_date(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap() + Duration::days(offset)
    }

    fn appointment_at(date: NaiveDate, time: NaiveTime, minutes: i64) -> Appointment {
        Appointment {
            id: format!("{date}-{time}"),
            appointment_date: date,
            appointment_time: time,
            duration_minutes: minutes,
            guest_name: "Guest".to_string(),
            guest_email: "guest@example.com".to_string(),
            guest_phone: None,
            notes: None,
            status: AppointmentStatus::Confirmed,
            cancel_token: "token".to_string(),
            meeting_id: None,
            meeting_join_url: None,
            assessment_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    proptest! {
        // Every candidate fits inside the working window and they are evenly spaced
        #[test]
        fn test_candidates_fit_working_hours(
            duration in 5..180i64,
            buffer in 0..60i64,
            start_hour in 0..12u32,
            end_hour in 12..24u32,
            offset in 0..30i64,
        ) {
            let ctx = context(duration, buffer, start_hour, end_hour);
            let date = target_date(offset);
            let slots = candidate_slots(&ctx, date, now());
            let open = date.and_time(NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap());
            let close = date.and_time(NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap());

            for slot in &slots {
                let start = date.and_time(*slot);
                prop_assert!(start >= open);
                prop_assert!(start + Duration::minutes(duration) <= close);
            }
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], Duration::minutes(duration + buffer));
            }
        }

        // A booked slot never comes back, and nothing offered overlaps a booking
        #[test]
        fn test_booked_slot_is_never_offered(
            duration in 15..120i64,
            pick in 0..64usize,
            offset in 0..30i64,
        ) {
            let ctx = context(duration, 0, 8, 18);
            let date = target_date(offset);
            let candidates = candidate_slots(&ctx, date, now());
            prop_assume!(!candidates.is_empty());
            let chosen = candidates[pick % candidates.len()];

            let booked = vec![appointment_at(date, chosen, duration)];
            let slots = compute_slots(&ctx, date, now(), &booked, &[]);
            prop_assert!(!slots.contains(&chosen));
            prop_assert_eq!(slots.len(), candidates.len() - 1);
        }

        // Computed slots are always a subset of the candidates, in order
        #[test]
        fn test_slots_are_ordered_subset_of_candidates(
            duration in 15..90i64,
            busy_start_min in 0..(24 * 60i64),
            busy_len in 1..240i64,
            offset in 0..30i64,
        ) {
            let ctx = context(duration, 0, 7, 19);
            let date = target_date(offset);
            let (day_start, _) = ctx.day_window(date).unwrap();
            let busy_start = day_start + Duration::minutes(busy_start_min);
            let busy = vec![(busy_start, busy_start + Duration::minutes(busy_len))];

            let candidates = candidate_slots(&ctx, date, now());
            let slots = compute_slots(&ctx, date, now(), &[], &busy);
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
            for slot in &slots {
                prop_assert!(candidates.contains(slot));
                let start = ctx.to_utc(date, *slot).unwrap();
                let end = start + Duration::minutes(duration);
                prop_assert!(!(start < busy[0].1 && busy[0].0 < end));
            }
        }
    }
}
