// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to the appointment store.

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::types::Appointment;

/// Read-only view of the backend's appointment records.
///
/// The backend owns all status transitions; this trait never mutates.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Lists all appointments visible to the authenticated user.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, CarelinkError>;
}
