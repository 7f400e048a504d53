//! In-process event bus.
//!
//! This module is the embedded [`EventSource`]: it owns listener
//! registrations and delivers published `ChangeEvent`s from a dedicated
//! worker thread. Publishers enqueue using a bounded channel and never
//! block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};

use crate::error::RegistrationError;
use crate::event::{ChangeEvent, EventKind};
use crate::guid::ElementGuid;

use super::traits::{ChangeListener, EventSource};

/// Bus queue sizing.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Max queued events before publishers start dropping.
    pub event_queue_capacity: usize,
    /// Max queued control messages (registrations).
    pub control_queue_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 4096,
            control_queue_capacity: 256,
        }
    }
}

#[derive(Debug)]
enum ControlMsg {
    Register {
        registration: ListenerRegistration,
        reply: Sender<Result<(), RegistrationError>>,
    },
}

struct ListenerRegistration {
    listener: Arc<dyn ChangeListener>,
    kinds: Vec<EventKind>,
    type_names: Vec<String>,
    instance: Option<ElementGuid>,
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("kinds", &self.kinds)
            .field("type_names", &self.type_names)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl ListenerRegistration {
    fn matches(&self, event: &ChangeEvent) -> bool {
        if !self.kinds.contains(&event.kind) {
            return false;
        }
        if !self.type_names.iter().any(|t| *t == event.subject_type_name) {
            return false;
        }
        match self.instance {
            None => true,
            Some(guid) => guid == event.subject_guid,
        }
    }
}

/// Embedded event source: owns listener registrations and delivers events.
///
/// Runs a dedicated worker thread. [`InProcessEventBus::publish`] enqueues
/// with a non-blocking `try_send` so repository-side callers are never
/// stalled by slow listeners; overflow is counted, not blocked on.
#[derive(Debug)]
pub struct InProcessEventBus {
    control_tx: Sender<ControlMsg>,
    publish_tx: Sender<ChangeEvent>,
    dropped_events: AtomicU64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl InProcessEventBus {
    /// Starts the bus worker.
    #[must_use]
    pub fn new(cfg: BusConfig) -> Self {
        let (control_tx, control_rx) =
            bounded::<ControlMsg>(cfg.control_queue_capacity.max(1));
        let (publish_tx, publish_rx) =
            bounded::<ChangeEvent>(cfg.event_queue_capacity.max(1));

        let join = thread::Builder::new()
            .name("metawatch-bus".to_string())
            .spawn(move || worker_loop(control_rx, publish_rx))
            .expect("failed to spawn metawatch bus worker");

        Self {
            control_tx,
            publish_tx,
            dropped_events: AtomicU64::new(0),
            join: Mutex::new(Some(join)),
        }
    }

    /// Non-blocking event publication.
    ///
    /// Events that do not fit the queue are dropped and counted.
    pub fn publish(&self, event: ChangeEvent) {
        match self.publish_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(event_id = %event.event_id, "event bus queue full, event dropped");
            }
        }
    }

    /// Number of events dropped at the publish edge.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

impl EventSource for InProcessEventBus {
    fn register_listener(
        &self,
        listener: Arc<dyn ChangeListener>,
        kinds: &[EventKind],
        type_names: &[String],
        instance: Option<ElementGuid>,
    ) -> Result<(), RegistrationError> {
        let registration = ListenerRegistration {
            listener,
            kinds: kinds.to_vec(),
            type_names: type_names.to_vec(),
            instance,
        };

        let (reply_tx, reply_rx) = bounded::<Result<(), RegistrationError>>(1);
        self.control_tx
            .send(ControlMsg::Register {
                registration,
                reply: reply_tx,
            })
            .map_err(|_| RegistrationError::Unavailable {
                message: "event bus worker has stopped".to_string(),
            })?;

        // Wait for the worker to acknowledge the registration.
        reply_rx.recv().map_err(|_| RegistrationError::Unavailable {
            message: "event bus worker has stopped".to_string(),
        })?
    }
}

impl Drop for InProcessEventBus {
    fn drop(&mut self) {
        // Close channels first so the worker can terminate, then detach.
        // Joining here could block behind a listener that is still running.
        let (dummy_control_tx, _) = bounded::<ControlMsg>(1);
        drop(std::mem::replace(&mut self.control_tx, dummy_control_tx));

        let (dummy_publish_tx, _) = bounded::<ChangeEvent>(1);
        drop(std::mem::replace(&mut self.publish_tx, dummy_publish_tx));

        if let Ok(mut guard) = self.join.lock() {
            if let Some(handle) = guard.take() {
                drop(handle);
            }
        }
    }
}

fn worker_loop(control_rx: Receiver<ControlMsg>, publish_rx: Receiver<ChangeEvent>) {
    let mut registrations: Vec<ListenerRegistration> = Vec::new();

    let mut control_closed = false;
    let mut publish_closed = false;

    loop {
        select! {
            recv(control_rx) -> msg => {
                match msg {
                    Ok(ControlMsg::Register { registration, reply }) => {
                        registrations.push(registration);
                        let _ = reply.send(Ok(()));
                    }
                    Err(_) => {
                        control_closed = true;
                    }
                }
            }
            recv(publish_rx) -> msg => {
                match msg {
                    Ok(event) => {
                        for registration in &registrations {
                            if !registration.matches(&event) {
                                continue;
                            }
                            // A listener error is not fatal to delivery: the
                            // listener keeps being called until its execution
                            // completes or the host shuts the bus down.
                            if let Err(err) = registration.listener.process_event(&event) {
                                tracing::warn!(
                                    event_id = %event.event_id,
                                    error = %err,
                                    "listener failed to process event"
                                );
                            }
                        }
                    }
                    Err(_) => {
                        publish_closed = true;
                    }
                }
            }
        }

        if control_closed && publish_closed {
            break;
        }
    }
}
