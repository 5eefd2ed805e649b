// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the Carelink telemedicine backend.
//!
//! Implements [`carelink_core::AppointmentStore`] and
//! [`carelink_core::MessageTransport`] over the backend's HTTP contract,
//! with bearer authentication and a per-request timeout.

pub mod client;

pub use client::ApiClient;
