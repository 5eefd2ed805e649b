// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Carelink workspace.
//!
//! Wire types mirror the telemedicine backend's REST contract (camelCase
//! field names, lowercase status strings). Appointment status transitions
//! are owned by the backend; this client only reads them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Prefix marking a locally generated, not-yet-confirmed message id.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Unique identifier for an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

/// Unique identifier for a patient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

/// Unique identifier for a doctor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(pub String);

/// Unique identifier for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Appointment lifecycle status.
///
/// A closed enumeration of the backend's raw status strings, so an invalid
/// status fails at deserialization instead of leaking into chat rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
}

/// Role of a message author.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Patient,
    Doctor,
}

/// An appointment record, read-only from the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    /// Calendar date of the appointment.
    pub date: NaiveDate,
    /// Display time as the backend stores it, e.g. `"10:00 AM"`.
    pub time: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Parses `date` + `time` into the scheduled start.
    ///
    /// Returns `None` when the display time string cannot be interpreted;
    /// callers treat an unparseable schedule as "outside the time window".
    pub fn scheduled_start(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::parse_from_str(self.time.trim(), "%I:%M %p").ok()?;
        Some(self.date.and_time(time))
    }

    /// True if the given user id is one of the two participants.
    pub fn involves(&self, user_id: &str) -> bool {
        self.patient_id.0 == user_id || self.doctor_id.0 == user_id
    }
}

/// A chat message bound to an appointment.
///
/// Lifecycle: created locally as a temp entry on send, confirmed by the
/// server (real `id`, server-assigned `created_at`), immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub appointment_id: AppointmentId,
    pub sender_id: String,
    pub sender_role: SenderRole,
    pub content: String,
    /// Server-assigned RFC 3339 timestamp; `None` on temp entries until
    /// the server confirms the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Server-owned read flag.
    #[serde(default)]
    pub read: bool,
    /// Client-generated id echoed by the server, used to match a confirmed
    /// message against its optimistic temp entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ChatMessage {
    /// True for optimistically inserted entries not yet confirmed by the server.
    pub fn is_temp(&self) -> bool {
        self.id.0.starts_with(TEMP_ID_PREFIX)
    }
}

/// An outbound message as posted to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    /// Client-generated correlation id the server echoes back on the
    /// created message and in subsequent list responses.
    pub correlation_id: String,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Derived chat availability verdict for one appointment. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAvailability {
    /// Whether sending messages is currently permitted.
    pub can_chat: bool,
    /// Whether the current time falls inside the messaging window.
    /// Advisory only; drives banner text, never gates `can_chat`.
    pub is_in_time_window: bool,
    /// Human-readable explanation of the current state.
    pub time_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_wire_form_is_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Cancelled);
    }

    #[test]
    fn unknown_status_fails_deserialization() {
        let result = serde_json::from_str::<AppointmentStatus>("\"archived\"");
        assert!(result.is_err());
    }

    #[test]
    fn status_display_round_trips() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Rejected,
        ] {
            let s = status.to_string();
            assert_eq!(AppointmentStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn sender_role_parses_from_lowercase() {
        assert_eq!(SenderRole::from_str("patient").unwrap(), SenderRole::Patient);
        assert_eq!(SenderRole::from_str("doctor").unwrap(), SenderRole::Doctor);
        assert!(SenderRole::from_str("admin").is_err());
    }

    fn appointment(time: &str) -> Appointment {
        Appointment {
            id: AppointmentId("a1".into()),
            patient_id: PatientId("p1".into()),
            doctor_id: DoctorId("d1".into()),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: time.into(),
            status: AppointmentStatus::Confirmed,
        }
    }

    #[test]
    fn scheduled_start_parses_display_time() {
        let start = appointment("10:00 AM").scheduled_start().unwrap();
        assert_eq!(start.to_string(), "2026-03-14 10:00:00");

        let afternoon = appointment("2:30 PM").scheduled_start().unwrap();
        assert_eq!(afternoon.to_string(), "2026-03-14 14:30:00");
    }

    #[test]
    fn scheduled_start_rejects_garbage_time() {
        assert!(appointment("sometime soon").scheduled_start().is_none());
        assert!(appointment("").scheduled_start().is_none());
    }

    #[test]
    fn involves_matches_both_participants() {
        let appt = appointment("10:00 AM");
        assert!(appt.involves("p1"));
        assert!(appt.involves("d1"));
        assert!(!appt.involves("p2"));
    }

    #[test]
    fn temp_message_detection() {
        let mut msg = ChatMessage {
            id: MessageId(format!("{TEMP_ID_PREFIX}abc123")),
            appointment_id: AppointmentId("a1".into()),
            sender_id: "p1".into(),
            sender_role: SenderRole::Patient,
            content: "hello".into(),
            created_at: None,
            read: false,
            correlation_id: Some("c1".into()),
        };
        assert!(msg.is_temp());
        msg.id = MessageId("m1".into());
        assert!(!msg.is_temp());
    }

    #[test]
    fn chat_message_deserializes_camel_case() {
        let json = r#"{
            "id": "m1",
            "appointmentId": "a1",
            "senderId": "p1",
            "senderRole": "patient",
            "content": "Hi doctor",
            "createdAt": "2026-03-14T10:00:00Z",
            "read": true
        }"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.appointment_id, AppointmentId("a1".into()));
        assert_eq!(msg.sender_role, SenderRole::Patient);
        assert!(msg.read);
        assert!(msg.correlation_id.is_none());
    }

    #[test]
    fn outgoing_message_gets_unique_correlation_ids() {
        let a = OutgoingMessage::new("one");
        let b = OutgoingMessage::new("two");
        assert_ne!(a.correlation_id, b.correlation_id);
    }
}
