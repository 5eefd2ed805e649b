// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for Carelink crates.
//!
//! [`MockBackend`] is an in-memory implementation of the appointment and
//! message adapter traits, with fault injection and hold gates for
//! deterministic concurrency tests.

pub mod mock_backend;

pub use mock_backend::MockBackend;
