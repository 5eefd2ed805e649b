// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits decoupling chat logic from the concrete backend.

pub mod store;
pub mod transport;

pub use store::AppointmentStore;
pub use transport::MessageTransport;
