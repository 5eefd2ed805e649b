// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat availability rules.
//!
//! Sending is permitted exactly when the appointment is confirmed. The time
//! window around the scheduled start is advisory: it drives the banner text
//! shown to the user but never gates sending, since consultations routinely
//! run long or start early.

use carelink_core::types::{Appointment, AppointmentStatus, ChatAvailability};
use chrono::{Duration, NaiveDateTime};

/// Advisory messaging window around the scheduled start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Minutes before the scheduled start when the window opens.
    pub before_minutes: i64,
    /// Minutes after the scheduled start when the window closes.
    pub after_minutes: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            before_minutes: 15,
            after_minutes: 60,
        }
    }
}

impl WindowPolicy {
    /// Window bounds for an appointment, `None` when the schedule is
    /// unparseable.
    pub fn bounds(&self, appointment: &Appointment) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = appointment.scheduled_start()?;
        Some((
            start - Duration::minutes(self.before_minutes),
            start + Duration::minutes(self.after_minutes),
        ))
    }
}

/// Evaluates chat availability for one appointment at the given time.
pub fn evaluate(
    appointment: &Appointment,
    now: NaiveDateTime,
    policy: &WindowPolicy,
) -> ChatAvailability {
    match appointment.status {
        AppointmentStatus::Confirmed => evaluate_confirmed(appointment, now, policy),
        AppointmentStatus::Pending => ChatAvailability {
            can_chat: false,
            is_in_time_window: false,
            time_message: "This appointment has not been confirmed yet. Chat becomes available \
                           once the doctor confirms it."
                .to_string(),
        },
        AppointmentStatus::Completed => ChatAvailability {
            can_chat: false,
            is_in_time_window: false,
            time_message: "This appointment has been completed. Chat is closed.".to_string(),
        },
        AppointmentStatus::Cancelled => ChatAvailability {
            can_chat: false,
            is_in_time_window: false,
            time_message: "This appointment was cancelled. Chat is not available.".to_string(),
        },
        AppointmentStatus::Rejected => ChatAvailability {
            can_chat: false,
            is_in_time_window: false,
            time_message: "This appointment was declined. Chat is not available.".to_string(),
        },
    }
}

fn evaluate_confirmed(
    appointment: &Appointment,
    now: NaiveDateTime,
    policy: &WindowPolicy,
) -> ChatAvailability {
    let Some((window_start, window_end)) = policy.bounds(appointment) else {
        return ChatAvailability {
            can_chat: true,
            is_in_time_window: false,
            time_message: format!(
                "Chat is open, but the appointment time ({}) could not be interpreted.",
                appointment.time
            ),
        };
    };

    if now < window_start {
        ChatAvailability {
            can_chat: true,
            is_in_time_window: false,
            time_message: format!(
                "Your appointment is scheduled for {} on {}. The consultation window opens \
                 {} minutes before.",
                appointment.time.trim(),
                appointment.date,
                policy.before_minutes
            ),
        }
    } else if now <= window_end {
        ChatAvailability {
            can_chat: true,
            is_in_time_window: true,
            time_message: format!(
                "Chat is open for your {} appointment on {}.",
                appointment.time.trim(),
                appointment.date
            ),
        }
    } else {
        ChatAvailability {
            can_chat: true,
            is_in_time_window: false,
            time_message: "The consultation window for this appointment has ended.".to_string(),
        }
    }
}

/// Availability when no appointment exists with the counterpart.
pub fn no_appointment() -> ChatAvailability {
    ChatAvailability {
        can_chat: false,
        is_in_time_window: false,
        time_message: "No active appointments with this contact. Chat is available during \
                       confirmed appointments."
            .to_string(),
    }
}

/// Picks the appointment that should back a chat with `counterpart_id`.
///
/// Considers confirmed appointments involving the counterpart, ordered by
/// scheduled start (unparseable schedules last). Returns the earliest one
/// whose window has not yet closed, falling back to the most recent past
/// appointment so the user can still review the conversation. Candidates
/// with an unparseable schedule are used only when no dated candidate
/// exists at all.
pub fn select_appointment<'a>(
    appointments: &'a [Appointment],
    counterpart_id: &str,
    now: NaiveDateTime,
    policy: &WindowPolicy,
) -> Option<&'a Appointment> {
    let mut candidates: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Confirmed && a.involves(counterpart_id))
        .collect();
    candidates.sort_by_key(|a| {
        let start = a.scheduled_start();
        (start.is_none(), start)
    });

    candidates
        .iter()
        .find(|a| matches!(policy.bounds(a), Some((_, end)) if now <= end))
        .or_else(|| {
            candidates
                .iter()
                .rev()
                .find(|a| a.scheduled_start().is_some())
        })
        .copied()
        .or_else(|| candidates.last().copied())
}
