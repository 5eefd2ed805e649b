// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Carelink telemedicine chat client.
//!
//! Provides the error type, domain/wire types, and the adapter traits
//! (`AppointmentStore`, `MessageTransport`) that the chat session logic
//! is written against. Concrete backends (REST client, test mocks) live
//! in sibling crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CarelinkError;
pub use traits::{AppointmentStore, MessageTransport};
pub use types::{
    Appointment, AppointmentId, AppointmentStatus, ChatAvailability, ChatMessage, DoctorId,
    MessageId, OutgoingMessage, PatientId, SenderRole,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_traits_are_object_safe() {
        // The session holds these as Arc<dyn Trait>; this won't compile if
        // either trait loses object safety.
        fn _store(_: &dyn AppointmentStore) {}
        fn _transport(_: &dyn MessageTransport) {}
    }

    #[test]
    fn error_variants_construct() {
        let _ = CarelinkError::Unauthorized;
        let _ = CarelinkError::Forbidden;
        let _ = CarelinkError::NotFound("appointment a1".into());
        let _ = CarelinkError::Validation("empty content".into());
        let _ = CarelinkError::SendInFlight;
        let _ = CarelinkError::ChatUnavailable("pending".into());
    }
}
