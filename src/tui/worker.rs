//! Background worker for provider-bound work.
//!
//! Weather, generation and image calls can take seconds. They run on a
//! worker thread and report back over a channel so the TUI main loop keeps
//! drawing.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::application::{ChatOutcome, ClothingAdvice, Dashboard, PersonalizedAdvice};
use crate::domain::{Conditions, UserProfile};

/// Messages from a worker to the UI.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Dashboard assembled
    Dashboard(Box<Dashboard>),
    /// Profile saved
    Profile(Box<UserProfile>),
    /// Clothing recommendation with the conditions it was based on
    Clothing {
        advice: Box<ClothingAdvice>,
        conditions: Box<Conditions>,
    },
    /// One streamed chat fragment
    ChatChunk(String),
    /// Chat turn finished
    ChatDone(ChatOutcome),
    /// One-shot advice ready
    Advice(Box<PersonalizedAdvice>),
    /// The job failed; messages are user-facing
    Error(Vec<String>),
}

/// Handle to a running worker.
pub struct WorkerHandle {
    /// Receiver for worker events
    pub events_rx: Receiver<WorkerEvent>,
    /// Thread handle (for joining)
    _handle: JoinHandle<()>,
}

/// Spawns background jobs.
pub struct Worker;

impl Worker {
    /// Run `job` on a new thread. The job reports through the sender it is
    /// given; dropping it ends the stream of events.
    pub fn spawn<F>(job: F) -> WorkerHandle
    where
        F: FnOnce(&Sender<WorkerEvent>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            job(&tx);
        });

        WorkerHandle {
            events_rx: rx,
            _handle: handle,
        }
    }
}
