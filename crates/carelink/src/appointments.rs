// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelink appointments` - list appointments with chat availability.

use carelink_chat::{availability, WindowPolicy};
use carelink_config::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_core::traits::AppointmentStore;
use carelink_core::types::AppointmentStatus;
use tracing::warn;

pub async fn run(config: &CarelinkConfig) -> Result<(), CarelinkError> {
    let client = crate::build_client(config)?;
    let policy = WindowPolicy {
        before_minutes: config.chat.window_before_minutes,
        after_minutes: config.chat.window_after_minutes,
    };

    let appointments = client.list_appointments().await?;
    if appointments.is_empty() {
        println!("No appointments.");
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    for appointment in &appointments {
        let verdict = availability::evaluate(appointment, now, &policy);
        let chat = if verdict.can_chat {
            "chat open"
        } else {
            "chat closed"
        };

        let unread = if appointment.status == AppointmentStatus::Confirmed {
            match client.unread_count(&appointment.id).await {
                Ok(0) => String::new(),
                Ok(n) => format!("  ({n} unread)"),
                Err(err) => {
                    warn!(appointment_id = %appointment.id, error = %err, "unread count failed");
                    String::new()
                }
            }
        } else {
            String::new()
        };

        println!(
            "{}  {} {:<8}  {:<9}  [{}]{}",
            appointment.id,
            appointment.date,
            appointment.time.trim(),
            appointment.status,
            chat,
            unread
        );
        println!("    {}", verdict.time_message);
    }

    Ok(())
}
