// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message fetch/send transport for one appointment's chat thread.

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::types::{AppointmentId, ChatMessage, OutgoingMessage};

/// Transport for an appointment's message thread.
///
/// The server's list order is authoritative; `fetch_messages` returns the
/// full thread and callers replace their view wholesale.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Fetches the ordered message list for an appointment.
    async fn fetch_messages(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ChatMessage>, CarelinkError>;

    /// Sends a message, returning the server-confirmed record.
    ///
    /// The confirmed message echoes the outgoing correlation id so the
    /// caller can retire its optimistic temp entry deterministically.
    async fn send_message(
        &self,
        appointment_id: &AppointmentId,
        outgoing: &OutgoingMessage,
    ) -> Result<ChatMessage, CarelinkError>;
}
