// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory backend double for session and client tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use carelink_core::error::CarelinkError;
use carelink_core::traits::{AppointmentStore, MessageTransport};
use carelink_core::types::{
    Appointment, AppointmentId, ChatMessage, MessageId, OutgoingMessage, SenderRole,
};
use tokio::sync::{Mutex, Notify};

/// In-memory stand-in for the telemedicine backend.
///
/// Stores appointments and per-appointment message logs behind async mutexes.
/// Tests can inject failures per operation and gate fetch/send calls so a
/// request can be held mid-flight while the test drives the session.
#[derive(Debug, Default)]
pub struct MockBackend {
    appointments: Mutex<Vec<Appointment>>,
    messages: Mutex<HashMap<AppointmentId, Vec<ChatMessage>>>,

    sender_id: Mutex<String>,
    sender_role: Mutex<Option<SenderRole>>,

    fail_list: AtomicBool,
    fail_fetch: AtomicBool,
    fail_send: AtomicBool,

    list_count: AtomicU64,
    fetch_count: AtomicU64,
    send_count: AtomicU64,

    hold_fetch: AtomicBool,
    fetch_started: Notify,
    fetch_release: Notify,
    hold_send: AtomicBool,
    send_started: Notify,
    send_release: Notify,

    next_message_id: AtomicU64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with appointments; sent messages are attributed to
    /// `sender_id` with the given role.
    pub fn with_appointments(
        appointments: Vec<Appointment>,
        sender_id: &str,
        sender_role: SenderRole,
    ) -> Self {
        Self {
            appointments: Mutex::new(appointments),
            sender_id: Mutex::new(sender_id.to_string()),
            sender_role: Mutex::new(Some(sender_role)),
            ..Self::default()
        }
    }

    pub async fn push_appointment(&self, appointment: Appointment) {
        self.appointments.lock().await.push(appointment);
    }

    /// Insert a message as if it arrived server-side (e.g. from the
    /// counterpart), bypassing the send path.
    pub async fn insert_message(&self, message: ChatMessage) {
        self.messages
            .lock()
            .await
            .entry(message.appointment_id.clone())
            .or_default()
            .push(message);
    }

    pub async fn stored_messages(&self, appointment_id: &AppointmentId) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .await
            .get(appointment_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn list_count(&self) -> u64 {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// When gated, the next `fetch_messages` call signals `wait_fetch_started`
    /// and blocks until `release_fetch`.
    pub fn gate_fetch(&self, gated: bool) {
        self.hold_fetch.store(gated, Ordering::SeqCst);
    }

    pub async fn wait_fetch_started(&self) {
        self.fetch_started.notified().await;
    }

    pub fn release_fetch(&self) {
        self.fetch_release.notify_one();
    }

    /// When gated, the next `send_message` call signals `wait_send_started`
    /// and blocks until `release_send`.
    pub fn gate_send(&self, gated: bool) {
        self.hold_send.store(gated, Ordering::SeqCst);
    }

    pub async fn wait_send_started(&self) {
        self.send_started.notified().await;
    }

    pub fn release_send(&self) {
        self.send_release.notify_one();
    }

    fn transport_error(operation: &str) -> CarelinkError {
        CarelinkError::Transport {
            message: format!("injected {operation} failure"),
            source: None,
        }
    }
}

#[async_trait]
impl AppointmentStore for MockBackend {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, CarelinkError> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::transport_error("list"));
        }
        Ok(self.appointments.lock().await.clone())
    }
}

#[async_trait]
impl MessageTransport for MockBackend {
    async fn fetch_messages(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ChatMessage>, CarelinkError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.hold_fetch.load(Ordering::SeqCst) {
            self.fetch_started.notify_one();
            self.fetch_release.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::transport_error("fetch"));
        }
        Ok(self.stored_messages(appointment_id).await)
    }

    async fn send_message(
        &self,
        appointment_id: &AppointmentId,
        outgoing: &OutgoingMessage,
    ) -> Result<ChatMessage, CarelinkError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        if self.hold_send.load(Ordering::SeqCst) {
            self.send_started.notify_one();
            self.send_release.notified().await;
        }
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Self::transport_error("send"));
        }

        let n = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        let message = ChatMessage {
            id: MessageId(format!("m{n}")),
            appointment_id: appointment_id.clone(),
            sender_id: self.sender_id.lock().await.clone(),
            sender_role: self
                .sender_role
                .lock()
                .await
                .unwrap_or(SenderRole::Patient),
            content: outgoing.content.clone(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            read: false,
            correlation_id: Some(outgoing.correlation_id.clone()),
        };
        self.messages
            .lock()
            .await
            .entry(appointment_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_core::types::AppointmentStatus;
    use chrono::NaiveDate;

    fn appointment(id: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: AppointmentId(id.to_string()),
            patient_id: carelink_core::types::PatientId("p1".to_string()),
            doctor_id: carelink_core::types::DoctorId("d1".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: "10:00 AM".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn send_echoes_correlation_id_and_persists() {
        let backend = MockBackend::with_appointments(
            vec![appointment("a1", AppointmentStatus::Confirmed)],
            "p1",
            SenderRole::Patient,
        );
        let outgoing = OutgoingMessage::new("hello");
        let id = AppointmentId("a1".to_string());

        let message = backend.send_message(&id, &outgoing).await.unwrap();
        assert_eq!(message.correlation_id.as_deref(), Some(outgoing.correlation_id.as_str()));
        assert_eq!(backend.stored_messages(&id).await.len(), 1);
        assert_eq!(backend.send_count(), 1);
    }

    #[tokio::test]
    async fn injected_fetch_failure_propagates() {
        let backend = MockBackend::new();
        backend.set_fail_fetch(true);
        let err = backend
            .fetch_messages(&AppointmentId("a1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CarelinkError::Transport { .. }));
    }

    #[tokio::test]
    async fn gated_fetch_blocks_until_released() {
        let backend = std::sync::Arc::new(MockBackend::new());
        backend.gate_fetch(true);

        let task = tokio::spawn({
            let backend = backend.clone();
            async move {
                backend
                    .fetch_messages(&AppointmentId("a1".to_string()))
                    .await
            }
        });

        backend.wait_fetch_started().await;
        assert!(!task.is_finished());
        backend.release_fetch();
        assert!(task.await.unwrap().unwrap().is_empty());
    }
}
