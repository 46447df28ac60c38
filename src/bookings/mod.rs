//! Appointment-booking webhook (Cal.com `BOOKING_CREATED` payloads).

pub mod repo;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{error::AppError, state::AppState};

pub use repo::BookingRepo;

pub const NO_VIDEO: &str = "Physical attendance required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: Option<Value>,
    pub event_title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub organizer: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_username: Option<String>,
    pub attendee: Option<String>,
    pub attendee_email: Option<String>,
    pub video_call_url: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

fn text(v: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(v, |cur, key| cur.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

impl Booking {
    /// Pulls the fields we keep out of a webhook body. Missing fields stay `None`.
    pub fn from_webhook(body: &Value) -> Result<Self, AppError> {
        let empty = match body {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            _ => false,
        };
        if empty {
            return Err(AppError::validation("body", "No JSON data provided"));
        }
        let payload = body.get("payload").unwrap_or(&Value::Null);
        let attendee = payload
            .get("attendees")
            .and_then(|a| a.get(0))
            .unwrap_or(&Value::Null);

        Ok(Self {
            booking_id: payload.get("bookingId").filter(|v| !v.is_null()).cloned(),
            event_title: text(payload, &["eventTitle"]),
            start_time: text(payload, &["startTime"]),
            end_time: text(payload, &["endTime"]),
            organizer: text(payload, &["organizer", "name"]),
            organizer_email: text(payload, &["organizer", "email"]),
            organizer_username: text(payload, &["organizer", "username"]),
            attendee: text(attendee, &["name"]),
            attendee_email: text(attendee, &["email"]),
            video_call_url: text(payload, &["metadata", "videoCallUrl"])
                .unwrap_or_else(|| NO_VIDEO.to_string()),
            status: text(payload, &["status"]),
            created_at: text(body, &["createdAt"]),
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum BookingOutcome {
    Attached {
        message: &'static str,
        booking_id: Option<Value>,
        event_title: Option<String>,
        attendee: Option<String>,
        video_call_url: String,
    },
    Unclaimed {
        message: &'static str,
        booking_id: Option<Value>,
    },
}

pub async fn ingest(st: &AppState, body: &Value) -> Result<BookingOutcome, AppError> {
    let booking = Booking::from_webhook(body)?;
    let owner = match booking.attendee_email.as_deref() {
        Some(email) => st.bookings.user_by_email(email).await?,
        None => None,
    };
    match owner {
        Some(user_id) => {
            st.bookings.append(user_id, &booking).await?;
            info!(user_id = %user_id, booking_id = ?booking.booking_id, "booking attached");
            Ok(BookingOutcome::Attached {
                message: "Webhook processed successfully",
                booking_id: booking.booking_id,
                event_title: booking.event_title,
                attendee: booking.attendee,
                video_call_url: booking.video_call_url,
            })
        }
        None => {
            st.bookings.store_unclaimed(&booking).await?;
            info!(email = ?booking.attendee_email, "booking has no owner; stored as unclaimed");
            Ok(BookingOutcome::Unclaimed {
                message: "Booking stored temporarily - no owner found for email",
                booking_id: booking.booking_id,
            })
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/appointment-booking", post(appointment_booking))
}

#[instrument(skip(state, body))]
pub async fn appointment_booking(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<BookingOutcome>, AppError> {
    let body = body.map(|Json(v)| v).unwrap_or_else(|| json!(null));
    Ok(Json(ingest(&state, &body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn webhook(email: &str, video: Option<&str>) -> Value {
        let mut payload = json!({
            "bookingId": 4412,
            "eventTitle": "Nutrition consult",
            "startTime": "2025-04-02T09:00:00Z",
            "endTime": "2025-04-02T09:30:00Z",
            "organizer": { "name": "Dr. Otieno", "email": "otieno@clinic.test", "username": "otieno" },
            "attendees": [{ "name": "Njeri", "email": email }],
            "status": "ACCEPTED"
        });
        if let Some(url) = video {
            payload["metadata"] = json!({ "videoCallUrl": url });
        }
        json!({ "triggerEvent": "BOOKING_CREATED", "createdAt": "2025-04-01T10:00:00Z", "payload": payload })
    }

    #[test]
    fn extracts_booking_fields() {
        let b = Booking::from_webhook(&webhook("njeri@mail.test", Some("https://meet.test/x"))).unwrap();
        assert_eq!(b.booking_id, Some(json!(4412)));
        assert_eq!(b.organizer_username.as_deref(), Some("otieno"));
        assert_eq!(b.attendee.as_deref(), Some("Njeri"));
        assert_eq!(b.video_call_url, "https://meet.test/x");
        assert_eq!(b.created_at.as_deref(), Some("2025-04-01T10:00:00Z"));
    }

    #[test]
    fn missing_video_means_in_person() {
        let b = Booking::from_webhook(&webhook("a@b.test", None)).unwrap();
        assert_eq!(b.video_call_url, NO_VIDEO);
    }

    #[test]
    fn empty_body_rejected() {
        for body in [json!(null), json!({})] {
            let err = Booking::from_webhook(&body).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn known_attendee_gets_the_booking() {
        let h = testing::harness();
        let user = Uuid::new_v4();
        h.store.insert_user_email(user, "njeri@mail.test");

        let out = ingest(&h.state, &webhook("njeri@mail.test", None)).await.unwrap();
        assert!(matches!(out, BookingOutcome::Attached { .. }));
        ingest(&h.state, &webhook("njeri@mail.test", None)).await.unwrap();
        assert_eq!(h.store.bookings_for(user).len(), 2);
        assert!(h.store.unclaimed_bookings().is_empty());
    }

    #[tokio::test]
    async fn unknown_attendee_is_parked() {
        let h = testing::harness();
        let out = ingest(&h.state, &webhook("stranger@mail.test", None)).await.unwrap();
        let body = serde_json::to_value(&out).unwrap();
        assert_eq!(
            body["message"],
            "Booking stored temporarily - no owner found for email"
        );
        assert_eq!(body["booking_id"], 4412);
        assert_eq!(h.store.unclaimed_bookings().len(), 1);
    }
}
