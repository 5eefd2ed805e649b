// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session state machine.
//!
//! A [`ChatSession`] binds a conversation to one appointment, keeps the
//! local message list synchronized with the backend through a polling loop,
//! and applies optimistic inserts on send with rollback on failure.
//!
//! State machine: `Closed -> Loading -> (Polling | Unavailable) -> Closed`.
//! Re-opening from any state first tears the previous cycle down. Every
//! open/close bumps a generation counter; background work holds the
//! generation it was started under and discards its result when the counter
//! has moved on, so a response that completes after `close` never mutates
//! the next session's state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use carelink_core::error::CarelinkError;
use carelink_core::traits::{AppointmentStore, MessageTransport};
use carelink_core::types::{
    AppointmentId, ChatAvailability, ChatMessage, MessageId, OutgoingMessage, SenderRole,
    TEMP_ID_PREFIX,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::availability::{self, WindowPolicy};
use crate::poller::PeriodicTask;

/// What to open a chat against.
#[derive(Debug, Clone)]
pub enum ChatTarget {
    /// A specific appointment.
    Appointment(AppointmentId),
    /// The other participant's user id; the session picks the backing
    /// appointment itself.
    Counterpart(String),
}

/// Session tuning and identity of the local user.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub window: WindowPolicy,
    /// Local user's id, used as `sender_id` on optimistic entries.
    pub self_id: String,
    pub self_role: SenderRole,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
            window: WindowPolicy::default(),
            self_id: String::new(),
            self_role: SenderRole::Patient,
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Closed,
    Loading,
    /// Open with chat blocked; `availability` explains why.
    Unavailable,
    /// Open with the polling loop running.
    Polling,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    messages: Vec<ChatMessage>,
    availability: Option<ChatAvailability>,
    appointment_id: Option<AppointmentId>,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            state: SessionState::Closed,
            messages: Vec::new(),
            availability: None,
            appointment_id: None,
        }
    }
}

impl SessionInner {
    fn reset(&mut self, state: SessionState) {
        self.state = state;
        self.messages.clear();
        self.availability = None;
        self.appointment_id = None;
    }
}

/// An appointment-bound chat conversation.
///
/// All methods take `&self`; the session is designed to sit behind an `Arc`
/// shared between the UI task and the polling loop.
pub struct ChatSession {
    store: Arc<dyn AppointmentStore>,
    transport: Arc<dyn MessageTransport>,
    options: SessionOptions,
    inner: Arc<Mutex<SessionInner>>,
    /// Bumped on every open and close; background work started under an
    /// older value discards its result.
    generation: Arc<AtomicU64>,
    /// Single in-flight send guard.
    sending: AtomicBool,
    poller: Mutex<Option<PeriodicTask>>,
    /// Serializes open/close so they cannot interleave.
    lifecycle: Mutex<()>,
}

impl ChatSession {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        transport: Arc<dyn MessageTransport>,
        options: SessionOptions,
    ) -> Self {
        Self {
            store,
            transport,
            options,
            inner: Arc::new(Mutex::new(SessionInner::default())),
            generation: Arc::new(AtomicU64::new(0)),
            sending: AtomicBool::new(false),
            poller: Mutex::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Snapshot of the current message list, server order with any pending
    /// optimistic entries at the end.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().await.messages.clone()
    }

    pub async fn availability(&self) -> Option<ChatAvailability> {
        self.inner.lock().await.availability.clone()
    }

    /// Opens the session against a target, tearing down any previous cycle.
    ///
    /// Evaluates availability from the appointment list; when chat is
    /// permitted the polling loop is started (first fetch fires
    /// immediately), otherwise the session parks in `Unavailable`.
    /// The verdict is returned either way.
    pub async fn open(&self, target: ChatTarget) -> Result<ChatAvailability, CarelinkError> {
        let _lifecycle = self.lifecycle.lock().await;

        if let Some(task) = self.poller.lock().await.take() {
            task.cancel().await;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.lock().await.reset(SessionState::Loading);

        let appointments = match self.store.list_appointments().await {
            Ok(appointments) => appointments,
            Err(err) => {
                self.inner.lock().await.reset(SessionState::Closed);
                return Err(err);
            }
        };

        let now = chrono::Local::now().naive_local();
        let selected = match &target {
            ChatTarget::Appointment(id) => appointments.iter().find(|a| &a.id == id),
            ChatTarget::Counterpart(counterpart) => availability::select_appointment(
                &appointments,
                counterpart,
                now,
                &self.options.window,
            ),
        };

        let verdict = match selected {
            Some(appointment) => availability::evaluate(appointment, now, &self.options.window),
            None => availability::no_appointment(),
        };

        {
            let mut inner = self.inner.lock().await;
            inner.availability = Some(verdict.clone());
            if verdict.can_chat {
                let appointment_id = selected
                    .map(|a| a.id.clone())
                    .ok_or_else(|| CarelinkError::Internal("chat permitted without appointment".into()))?;
                inner.appointment_id = Some(appointment_id);
                inner.state = SessionState::Polling;
            } else {
                inner.state = SessionState::Unavailable;
            }
        }

        if verdict.can_chat {
            if let Some(appointment) = selected {
                info!(appointment_id = %appointment.id, "chat session opened, polling");
                self.start_poller(generation, appointment.id.clone()).await;
            }
        } else {
            debug!(reason = %verdict.time_message, "chat session opened, unavailable");
        }

        Ok(verdict)
    }

    async fn start_poller(&self, generation: u64, appointment_id: AppointmentId) {
        let transport = Arc::clone(&self.transport);
        let inner = Arc::clone(&self.inner);
        let counter = Arc::clone(&self.generation);
        let task = PeriodicTask::spawn("chat-poll", self.options.poll_interval, move || {
            poll_tick(
                Arc::clone(&transport),
                Arc::clone(&inner),
                Arc::clone(&counter),
                generation,
                appointment_id.clone(),
            )
        });
        *self.poller.lock().await = Some(task);
    }

    /// Runs one synchronization pass outside the timer, e.g. when the UI
    /// regains focus. No-op unless the session is polling.
    pub async fn poll(&self) {
        let (generation, appointment_id) = {
            let inner = self.inner.lock().await;
            match (inner.state, &inner.appointment_id) {
                (SessionState::Polling, Some(id)) => {
                    (self.generation.load(Ordering::SeqCst), id.clone())
                }
                _ => return,
            }
        };
        poll_tick(
            Arc::clone(&self.transport),
            Arc::clone(&self.inner),
            Arc::clone(&self.generation),
            generation,
            appointment_id,
        )
        .await;
    }

    /// Sends a message with an optimistic local insert.
    ///
    /// The entry appears in [`messages`](Self::messages) immediately under a
    /// `temp-` id and is replaced by the server copy on the reconciliation
    /// poll that follows a successful send. On failure the entry is removed
    /// and the content comes back inside [`CarelinkError::SendFailed`] so
    /// the caller can restore the user's input.
    ///
    /// At most one send may be in flight; concurrent calls get
    /// [`CarelinkError::SendInFlight`].
    pub async fn send(&self, content: &str) -> Result<ChatMessage, CarelinkError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CarelinkError::Validation(
                "message content must not be empty".into(),
            ));
        }
        if self
            .sending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CarelinkError::SendInFlight);
        }
        let result = self.send_inner(content).await;
        self.sending.store(false, Ordering::SeqCst);
        result
    }

    async fn send_inner(&self, content: &str) -> Result<ChatMessage, CarelinkError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let outgoing = OutgoingMessage::new(content);

        let appointment_id = {
            let mut inner = self.inner.lock().await;
            if inner.state != SessionState::Polling {
                let reason = inner
                    .availability
                    .as_ref()
                    .map(|a| a.time_message.clone())
                    .unwrap_or_else(|| "no open chat session".into());
                return Err(CarelinkError::ChatUnavailable(reason));
            }
            let appointment_id = inner
                .appointment_id
                .clone()
                .ok_or_else(|| CarelinkError::Internal("polling without appointment".into()))?;

            // created_at stays empty until the server assigns it on the
            // confirmed copy.
            inner.messages.push(ChatMessage {
                id: MessageId(format!("{TEMP_ID_PREFIX}{}", outgoing.correlation_id)),
                appointment_id: appointment_id.clone(),
                sender_id: self.options.self_id.clone(),
                sender_role: self.options.self_role,
                content: content.to_string(),
                created_at: None,
                read: false,
                correlation_id: Some(outgoing.correlation_id.clone()),
            });
            appointment_id
        };

        match self.transport.send_message(&appointment_id, &outgoing).await {
            Ok(confirmed) => {
                // Reconcile right away so the temp entry is replaced by the
                // server copy without waiting for the next timer tick.
                if self.generation.load(Ordering::SeqCst) == generation {
                    poll_tick(
                        Arc::clone(&self.transport),
                        Arc::clone(&self.inner),
                        Arc::clone(&self.generation),
                        generation,
                        appointment_id,
                    )
                    .await;
                }
                Ok(confirmed)
            }
            Err(err) => {
                let mut inner = self.inner.lock().await;
                if self.generation.load(Ordering::SeqCst) == generation {
                    inner.messages.retain(|m| {
                        !(m.is_temp()
                            && m.correlation_id.as_deref() == Some(outgoing.correlation_id.as_str()))
                    });
                }
                Err(CarelinkError::SendFailed {
                    content: content.to_string(),
                    source: Box::new(err),
                })
            }
        }
    }

    /// Closes the session: stops the polling loop, clears local state, and
    /// invalidates any in-flight work. Safe to call repeatedly.
    pub async fn close(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        if let Some(task) = self.poller.lock().await.take() {
            task.cancel().await;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.lock().await.reset(SessionState::Closed);
        debug!("chat session closed");
    }
}

/// One synchronization pass: fetch the server's message list and merge it
/// with any optimistic entries the server has not echoed yet.
///
/// Fetch failures are logged and skipped; the next tick retries. A result
/// arriving under a stale generation is discarded without touching state.
async fn poll_tick(
    transport: Arc<dyn MessageTransport>,
    inner: Arc<Mutex<SessionInner>>,
    counter: Arc<AtomicU64>,
    generation: u64,
    appointment_id: AppointmentId,
) {
    let fetched = match transport.fetch_messages(&appointment_id).await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(appointment_id = %appointment_id, error = %err, "message poll failed");
            return;
        }
    };

    let mut inner = inner.lock().await;
    if counter.load(Ordering::SeqCst) != generation {
        debug!(appointment_id = %appointment_id, "discarding poll result for stale session");
        return;
    }
    if inner.state != SessionState::Polling {
        return;
    }

    let echoed: HashSet<String> = fetched
        .iter()
        .filter_map(|m| m.correlation_id.clone())
        .collect();
    let holdover: Vec<ChatMessage> = inner
        .messages
        .iter()
        .filter(|m| {
            m.is_temp()
                && m.correlation_id
                    .as_ref()
                    .is_none_or(|c| !echoed.contains(c))
        })
        .cloned()
        .collect();

    inner.messages = fetched;
    inner.messages.extend(holdover);
}
