//! Google Calendar Handler

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::common::{
    done, list_response, optional_string, optional_string_array, optional_usize, require_string, string_with_default,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::calendar_api::EventDraft;
use crate::google::CalendarApi;

const EVENT_ID: ParamSpec = ParamSpec::arg("event-id", "Event ID");
const CALENDAR: ParamSpec = ParamSpec::text("calendar", "Calendar ID (default from config, usually \"primary\")");
const LOCATION: ParamSpec = ParamSpec::text("location", "Where");
const DESCRIPTION: ParamSpec = ParamSpec::text("description", "Event description");
const ATTENDEES: ParamSpec = ParamSpec::list("attendees", "Attendee emails");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "calendar",
        action: "calendars",
        about: "List calendars",
        params: &[],
    },
    CommandSpec {
        namespace: "calendar",
        action: "events",
        about: "List upcoming events",
        params: &[
            CALENDAR,
            ParamSpec::text("from", "Start of window, RFC 3339 (default: now)"),
            ParamSpec::text("to", "End of window, RFC 3339"),
            ParamSpec::number("max-results", "Maximum number of events").default("25"),
        ],
    },
    CommandSpec {
        namespace: "calendar",
        action: "get",
        about: "Show an event",
        params: &[EVENT_ID, CALENDAR],
    },
    CommandSpec {
        namespace: "calendar",
        action: "create",
        about: "Create an event (YYYY-MM-DD for all-day)",
        params: &[
            ParamSpec::text("summary", "Title").required(),
            ParamSpec::text("start", "Start, RFC 3339 or YYYY-MM-DD").required(),
            ParamSpec::text("end", "End, RFC 3339 or YYYY-MM-DD").required(),
            LOCATION,
            DESCRIPTION,
            ATTENDEES,
            CALENDAR,
        ],
    },
    CommandSpec {
        namespace: "calendar",
        action: "update",
        about: "Change fields of an existing event",
        params: &[
            EVENT_ID,
            ParamSpec::text("summary", "Title"),
            ParamSpec::text("start", "Start, RFC 3339 or YYYY-MM-DD"),
            ParamSpec::text("end", "End, RFC 3339 or YYYY-MM-DD"),
            LOCATION,
            DESCRIPTION,
            ATTENDEES,
            CALENDAR,
        ],
    },
    CommandSpec {
        namespace: "calendar",
        action: "delete",
        about: "Delete an event",
        params: &[EVENT_ID, CALENDAR],
    },
];

/// Handle Google Calendar commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    let calendar = CalendarApi::new(ctx.google().await?);
    let calendar_id = string_with_default(params, "calendar", &ctx.config().default_calendar);

    match action {
        "calendars" => {
            let calendars = calendar.list_calendars().await?;
            let calendars = calendars
                .iter()
                .map(|c| {
                    json!({
                        "id": c.get("id"),
                        "summary": c.get("summary"),
                        "primary": c.get("primary").and_then(|v| v.as_bool()).unwrap_or(false),
                        "accessRole": c.get("accessRole"),
                        "timeZone": c.get("timeZone"),
                    })
                })
                .collect();
            Ok(list_response("calendars", calendars))
        }
        "events" => {
            let from = optional_string(params, "from")
                .map(String::from)
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
            info!("Listing events from {}", from);

            let events = calendar
                .list_events(
                    calendar_id,
                    Some(&from),
                    optional_string(params, "to"),
                    optional_usize(params, "max-results"),
                )
                .await?;
            Ok(list_response("events", events.iter().map(summarize_event).collect()))
        }
        "get" => {
            let event = calendar
                .get_event(calendar_id, require_string(params, "event-id")?)
                .await?;
            Ok(summarize_event(&event))
        }
        "create" => {
            let draft = event_draft(params);
            for field in ["summary", "start", "end"] {
                require_string(params, field)?;
            }
            let event = calendar.create_event(calendar_id, &draft).await?;
            Ok(summarize_event(&event))
        }
        "update" => {
            let event_id = require_string(params, "event-id")?;
            let draft = event_draft(params);
            if is_empty(&draft) {
                return Err(AppError::invalid_input("nothing to update"));
            }
            let event = calendar.update_event(calendar_id, event_id, &draft).await?;
            Ok(summarize_event(&event))
        }
        "delete" => {
            let event_id = require_string(params, "event-id")?;
            calendar.delete_event(calendar_id, event_id).await?;
            Ok(done(json!({ "id": event_id })))
        }
        _ => Err(AppError::not_found(format!("unknown command: calendar {}", action))),
    }
}

fn event_draft(params: &Value) -> EventDraft {
    let text = |key| optional_string(params, key).map(String::from);
    EventDraft {
        summary: text("summary"),
        start: text("start"),
        end: text("end"),
        location: text("location"),
        description: text("description"),
        attendees: optional_string_array(params, "attendees"),
    }
}

fn is_empty(draft: &EventDraft) -> bool {
    draft.summary.is_none()
        && draft.start.is_none()
        && draft.end.is_none()
        && draft.location.is_none()
        && draft.description.is_none()
        && draft.attendees.is_none()
}

fn summarize_event(event: &Value) -> Value {
    let when = |key: &str| {
        event
            .get(key)
            .and_then(|t| t.get("dateTime").or_else(|| t.get("date")))
            .cloned()
    };
    let attendees: Vec<Value> = event
        .get("attendees")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|a| a.get("email").cloned()).collect())
        .unwrap_or_default();

    json!({
        "id": event.get("id"),
        "summary": event.get("summary"),
        "start": when("start"),
        "end": when("end"),
        "location": event.get("location"),
        "status": event.get("status"),
        "attendees": attendees,
        "htmlLink": event.get("htmlLink"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_draft_from_params() {
        let draft = event_draft(&json!({
            "summary": "Standup",
            "start": "2026-03-02",
            "attendees": ["a@example.com"]
        }));
        assert_eq!(draft.summary.as_deref(), Some("Standup"));
        assert_eq!(draft.attendees, Some(vec!["a@example.com".to_string()]));
        assert!(draft.end.is_none());
        assert!(!is_empty(&draft));
        assert!(is_empty(&event_draft(&json!({"event-id": "e1"}))));
    }

    #[test]
    fn test_summarize_event() {
        let event = json!({
            "id": "e1",
            "summary": "Offsite",
            "start": {"date": "2026-03-02"},
            "end": {"dateTime": "2026-03-03T17:00:00Z"},
            "attendees": [{"email": "a@example.com"}, {"displayName": "no email"}]
        });
        let summary = summarize_event(&event);
        assert_eq!(summary["start"], "2026-03-02");
        assert_eq!(summary["end"], "2026-03-03T17:00:00Z");
        assert_eq!(summary["attendees"], json!(["a@example.com"]));
    }
}
