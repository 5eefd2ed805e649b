// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment chat availability and message synchronization.
//!
//! Chat between a patient and a doctor is gated on a confirmed appointment.
//! [`availability`] decides whether chat is open for a given appointment,
//! [`session::ChatSession`] keeps the local message list synchronized with
//! the backend by polling, and [`poller::PeriodicTask`] is the cancellable
//! timer underneath.

pub mod availability;
pub mod poller;
pub mod session;

pub use availability::{evaluate, select_appointment, WindowPolicy};
pub use poller::PeriodicTask;
pub use session::{ChatSession, ChatTarget, SessionOptions, SessionState};
