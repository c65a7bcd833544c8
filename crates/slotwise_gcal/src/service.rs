// --- File: crates/slotwise_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarGateway`].
//!
//! Events created here carry the private extended property
//! `booking_source=slotwise`, which is how the reconciliation sweep tells
//! them apart from everything else in the calendar.

use crate::auth::{self, GoogleClients, HubType};
use chrono::{DateTime, Utc};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime, EventExtendedProperties, FreeBusyRequest, FreeBusyRequestItem,
};
use slotwise_common::services::{
    BoxFuture, BusyInterval, CalendarGateway, CreatedEvent, GatewayError, NewCalendarEvent,
    OwnedEvent, PatchedEvent,
};
use slotwise_config::GcalConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SOURCE_PROPERTY: &str = "booking_source";
pub const SOURCE_VALUE: &str = "slotwise";

struct ConnectedCalendar {
    hub: HubType,
    calendar_id: String,
}

/// Google Calendar gateway bound to one calendar.
///
/// Built with [`GoogleCalendarService::unconfigured`] it answers every call
/// with [`GatewayError::NotConfigured`], which lets the site run (and show
/// local availability) before credentials are provisioned.
#[derive(Clone)]
pub struct GoogleCalendarService {
    calendar: Option<Arc<ConnectedCalendar>>,
    reason: String,
}

impl GoogleCalendarService {
    pub fn new(hub: HubType, calendar_id: String) -> Self {
        Self {
            calendar: Some(Arc::new(ConnectedCalendar { hub, calendar_id })),
            reason: String::new(),
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            calendar: None,
            reason: reason.into(),
        }
    }

    /// Connect with `config`, falling back to the unconfigured gateway when the
    /// settings are incomplete or the key cannot be loaded.
    ///
    /// The token source of a successful connection is returned alongside so
    /// the mail sender can reuse the same authenticator.
    pub async fn from_config(
        config: &GcalConfig,
    ) -> (Self, Option<Box<dyn google_calendar3::common::GetToken>>) {
        match auth::connect(config).await {
            Ok(GoogleClients {
                hub,
                calendar_id,
                token_source,
            }) => (Self::new(hub, calendar_id), Some(token_source)),
            Err(e) => {
                warn!("Google Calendar disabled: {}", e);
                (Self::unconfigured(e.to_string()), None)
            }
        }
    }

    fn connected(&self) -> Result<Arc<ConnectedCalendar>, GatewayError> {
        self.calendar
            .clone()
            .ok_or_else(|| GatewayError::NotConfigured(self.reason.clone()))
    }
}

/// HTTP status carried by an API error, if any.
pub(crate) fn api_status(err: &google_calendar3::Error) -> Option<u16> {
    match err {
        google_calendar3::Error::BadRequest(body) => body
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok()),
        google_calendar3::Error::Failure(response) => Some(response.status().as_u16()),
        _ => None,
    }
}

/// Token problems (and 401s) are authentication failures; the rest is
/// attributed to the operation that failed.
pub(crate) fn classify(err: google_calendar3::Error, write: bool) -> GatewayError {
    let status = api_status(&err);
    let message = err.to_string();
    match (&err, status) {
        (google_calendar3::Error::MissingToken(_), _) | (_, Some(401)) => GatewayError::Auth(message),
        _ if write => GatewayError::Write(message),
        _ => GatewayError::Read(message),
    }
}

/// The join link Google put on the event: `hangoutLink`, or the video entry
/// point of the conference data.
pub(crate) fn meeting_link(event: &Event) -> Option<String> {
    let direct = event
        .hangout_link
        .as_deref()
        .filter(|link| !link.is_empty())
        .map(str::to_string);
    direct.or_else(|| {
        event
            .conference_data
            .as_ref()?
            .entry_points
            .as_ref()?
            .iter()
            .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
            .and_then(|ep| ep.uri.clone())
    })
}

fn event_time(at: DateTime<Utc>, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date_time: Some(at),
        time_zone: Some(time_zone.to_string()),
        ..Default::default()
    }
}

pub(crate) fn build_event(event: &NewCalendarEvent, request_id: String) -> Event {
    let mut private = HashMap::new();
    private.insert(SOURCE_PROPERTY.to_string(), SOURCE_VALUE.to_string());

    Event {
        summary: Some(event.summary.clone()),
        description: event.description.clone(),
        start: Some(event_time(event.start_time, &event.time_zone)),
        end: Some(event_time(event.end_time, &event.time_zone)),
        attendees: Some(vec![EventAttendee {
            email: Some(event.attendee_email.clone()),
            display_name: event.attendee_name.clone(),
            ..Default::default()
        }]),
        conference_data: Some(ConferenceData {
            create_request: Some(CreateConferenceRequest {
                request_id: Some(request_id),
                conference_solution_key: Some(ConferenceSolutionKey {
                    type_: Some("hangoutsMeet".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        extended_properties: Some(EventExtendedProperties {
            private: Some(private),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl CalendarGateway for GoogleCalendarService {
    fn is_configured(&self) -> bool {
        self.calendar.is_some()
    }

    fn get_busy_times(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, GatewayError> {
        Box::pin(async move {
            let calendar = self.connected()?;
            let req = FreeBusyRequest {
                time_min: Some(start_time),
                time_max: Some(end_time),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar.calendar_id.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy) = calendar
                .hub
                .freebusy()
                .query(req)
                .doit()
                .await
                .map_err(|e| classify(e, false))?;

            let mut busy: Vec<BusyInterval> = freebusy
                .calendars
                .and_then(|mut calendars| calendars.remove(&calendar.calendar_id))
                .and_then(|cal| cal.busy)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|period| match (period.start, period.end) {
                    (Some(start), Some(end)) => Some((start, end)),
                    _ => {
                        debug!("Skipping busy period without bounds: {:?}", period);
                        None
                    }
                })
                .collect();
            busy.sort_by_key(|interval| interval.0);
            Ok(busy)
        })
    }

    fn create_event(&self, event: NewCalendarEvent) -> BoxFuture<'_, CreatedEvent, GatewayError> {
        Box::pin(async move {
            let calendar = self.connected()?;
            let request = build_event(&event, uuid::Uuid::new_v4().to_string());

            let (_response, created) = calendar
                .hub
                .events()
                .insert(request, &calendar.calendar_id)
                .conference_data_version(1)
                .send_updates("all")
                .doit()
                .await
                .map_err(|e| classify(e, true))?;

            let event_id = created
                .id
                .clone()
                .ok_or_else(|| GatewayError::Write("Created event has no id".to_string()))?;

            match meeting_link(&created) {
                Some(meeting_join_url) => {
                    info!("Created calendar event {}", event_id);
                    Ok(CreatedEvent {
                        event_id,
                        meeting_join_url,
                    })
                }
                None => {
                    warn!("Event {} came back without a conference link, removing it", event_id);
                    if let Err(e) = calendar
                        .hub
                        .events()
                        .delete(&calendar.calendar_id, &event_id)
                        .send_updates("none")
                        .doit()
                        .await
                    {
                        warn!("Could not remove event {}: {}", event_id, e);
                    }
                    Err(GatewayError::MissingConferenceLink { event_id })
                }
            }
        })
    }

    fn patch_event_window(
        &self,
        event_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        time_zone: &str,
    ) -> BoxFuture<'_, PatchedEvent, GatewayError> {
        let event_id = event_id.to_string();
        let time_zone = time_zone.to_string();

        Box::pin(async move {
            let calendar = self.connected()?;
            let patch = Event {
                start: Some(event_time(start_time, &time_zone)),
                end: Some(event_time(end_time, &time_zone)),
                ..Default::default()
            };

            let (_response, updated) = calendar
                .hub
                .events()
                .patch(patch, &calendar.calendar_id, &event_id)
                .conference_data_version(1)
                .send_updates("all")
                .doit()
                .await
                .map_err(|e| classify(e, true))?;

            info!("Moved calendar event {}", event_id);
            Ok(PatchedEvent {
                meeting_join_url: meeting_link(&updated),
                event_id: updated.id.unwrap_or(event_id),
            })
        })
    }

    fn delete_event(&self, event_id: &str) -> BoxFuture<'_, (), GatewayError> {
        let event_id = event_id.to_string();

        Box::pin(async move {
            let calendar = self.connected()?;
            let result = calendar
                .hub
                .events()
                .delete(&calendar.calendar_id, &event_id)
                .send_updates("all")
                .doit()
                .await;

            match result {
                Ok(_) => {
                    info!("Deleted calendar event {}", event_id);
                    Ok(())
                }
                Err(e) if matches!(api_status(&e), Some(404) | Some(410)) => {
                    debug!("Calendar event {} was already gone", event_id);
                    Ok(())
                }
                Err(e) => Err(classify(e, true)),
            }
        })
    }

    fn list_owned_events(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<OwnedEvent>, GatewayError> {
        Box::pin(async move {
            let calendar = self.connected()?;
            let marker = format!("{SOURCE_PROPERTY}={SOURCE_VALUE}");
            let mut owned = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = calendar
                    .hub
                    .events()
                    .list(&calendar.calendar_id)
                    .add_private_extended_property(&marker)
                    .time_min(start_time)
                    .time_max(end_time)
                    .single_events(true)
                    .show_deleted(false);
                if let Some(token) = page_token.as_deref() {
                    request = request.page_token(token);
                }

                let (_response, page) = request.doit().await.map_err(|e| classify(e, false))?;

                for event in page.items.unwrap_or_default() {
                    let Some(event_id) = event.id else { continue };
                    owned.push(OwnedEvent {
                        event_id,
                        start_time: event.start.and_then(|s| s.date_time),
                        created_at: event.created,
                        status: event.status.unwrap_or_else(|| "confirmed".to_string()),
                    });
                }

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }

            debug!("Found {} owned calendar events", owned.len());
            Ok(owned)
        })
    }
}
