//! Google Calendar API v3 Client
//!
//! Provides methods for interacting with Google Calendar API:
//! - List calendars
//! - List/get events
//! - Create/update/delete events

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use super::common::segment;
use crate::common::AppResult;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const ITEMS: ListField = ListField::new("items", "maxResults");

pub struct CalendarApi {
    client: GoogleClient,
}

super::google_api_wrapper!(CalendarApi);

/// Fields for creating or patching an event; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub summary: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub attendees: Option<Vec<String>>,
}

impl EventDraft {
    /// Overlay the provided fields onto an event resource
    pub fn apply_to(&self, event: &mut Value) {
        if let Some(s) = &self.summary {
            event["summary"] = json!(s);
        }
        if let Some(st) = &self.start {
            event["start"] = event_time(st);
        }
        if let Some(e) = &self.end {
            event["end"] = event_time(e);
        }
        if let Some(loc) = &self.location {
            event["location"] = json!(loc);
        }
        if let Some(desc) = &self.description {
            event["description"] = json!(desc);
        }
        if let Some(attendees) = &self.attendees {
            event["attendees"] = attendees.iter().map(|email| json!({ "email": email })).collect();
        }
    }
}

impl CalendarApi {
    /// List all calendars for the authenticated user
    pub async fn list_calendars(&self) -> AppResult<Vec<Value>> {
        info!("Listing Google calendars");

        let url = format!("{}/users/me/calendarList", CALENDAR_API_BASE);
        let calendars = self.client.get_paginated(&url, &[], ITEMS, None).await?;

        debug!("Retrieved {} calendars", calendars.len());
        Ok(calendars)
    }

    /// List events in a calendar
    ///
    /// # Arguments
    /// * `calendar_id` - Calendar ID (use "primary" for user's primary calendar)
    /// * `time_min` - Lower bound (RFC3339 timestamp, e.g., "2026-02-08T00:00:00Z")
    /// * `time_max` - Upper bound (RFC3339 timestamp)
    /// * `max_results` - Maximum number of events to return
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
        max_results: Option<usize>,
    ) -> AppResult<Vec<Value>> {
        info!("Listing events for calendar: {}", calendar_id);

        let mut query_params = vec![];
        if let Some(min) = time_min {
            query_params.push(("timeMin", min.to_string()));
        }
        if let Some(max) = time_max {
            query_params.push(("timeMax", max.to_string()));
        }

        // Order by start time
        query_params.push(("orderBy", "startTime".to_string()));
        query_params.push(("singleEvents", "true".to_string()));

        let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE, segment(calendar_id));
        let events = self
            .client
            .get_paginated(&url, &query_params, ITEMS, max_results)
            .await?;

        debug!("Retrieved {} events", events.len());
        Ok(events)
    }

    /// Get a specific event by ID
    pub async fn get_event(&self, calendar_id: &str, event_id: &str) -> AppResult<Value> {
        info!("Fetching event: {} from calendar: {}", event_id, calendar_id);

        self.client.get(&event_url(calendar_id, event_id), &[]).await
    }

    /// Create a new event
    pub async fn create_event(&self, calendar_id: &str, draft: &EventDraft) -> AppResult<Value> {
        info!("Creating event in calendar: {}", calendar_id);

        let mut event = json!({});
        draft.apply_to(&mut event);

        let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE, segment(calendar_id));
        let response = self.client.post(&url, &event).await?;

        info!("Event created successfully");
        Ok(response)
    }

    /// Update an existing event, keeping fields the draft leaves unset
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> AppResult<Value> {
        info!("Updating event: {} in calendar: {}", event_id, calendar_id);

        // First, get the existing event
        let mut event = self.get_event(calendar_id, event_id).await?;
        draft.apply_to(&mut event);

        let response = self
            .client
            .put(&event_url(calendar_id, event_id), &[], &event)
            .await?;

        info!("Event updated successfully");
        Ok(response)
    }

    /// Delete an event
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> AppResult<()> {
        info!("Deleting event: {} from calendar: {}", event_id, calendar_id);

        self.client.delete(&event_url(calendar_id, event_id)).await?;

        info!("Event deleted successfully");
        Ok(())
    }
}

fn event_url(calendar_id: &str, event_id: &str) -> String {
    format!(
        "{}/calendars/{}/events/{}",
        CALENDAR_API_BASE,
        segment(calendar_id),
        segment(event_id)
    )
}

/// Convert a datetime string into Google Calendar's start/end shape.
/// Supports both RFC3339 timestamps and date-only formats.
pub fn event_time(dt: &str) -> Value {
    // Check if it's a date-only format (YYYY-MM-DD)
    if dt.len() == 10 && !dt.contains('T') {
        json!({ "date": dt })
    } else {
        json!({ "dateTime": dt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_with_timestamp() {
        let result = event_time("2026-02-08T15:00:00Z");
        assert_eq!(result["dateTime"], "2026-02-08T15:00:00Z");
        assert!(result.get("date").is_none());
    }

    #[test]
    fn test_event_time_with_date_only() {
        let result = event_time("2026-02-08");
        assert_eq!(result["date"], "2026-02-08");
    }

    #[test]
    fn test_draft_only_touches_given_fields() {
        let mut event = json!({
            "summary": "Standup",
            "location": "Room 4",
            "start": {"dateTime": "2026-02-08T09:00:00Z"}
        });
        let draft = EventDraft {
            location: Some("Room 7".to_string()),
            attendees: Some(vec!["ana@example.com".to_string()]),
            ..EventDraft::default()
        };
        draft.apply_to(&mut event);

        assert_eq!(event["summary"], "Standup");
        assert_eq!(event["location"], "Room 7");
        assert_eq!(event["start"]["dateTime"], "2026-02-08T09:00:00Z");
        assert_eq!(event["attendees"], json!([{"email": "ana@example.com"}]));
    }
}
