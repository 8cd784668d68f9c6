//! Event system for progress tracking
//!
//! Services emit events while uploading media and submitting posts so that a
//! front end can show progress without polling. The bus is a
//! `tokio::sync::broadcast` channel: any number of subscribers, and emitting
//! never blocks. With nobody subscribed, events are dropped.
//!
//! # Example
//!
//! ```no_run
//! use libbuzzconnect::service::events::{Event, EventBus};
//!
//! # async fn example() {
//! let bus = EventBus::new(100);
//! let mut receiver = bus.subscribe();
//!
//! bus.emit(Event::MediaUploadStarted { count: 2 });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::PlatformResult;

pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast channel shared by all services
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` is the number of events buffered per subscriber before a
    /// lagging subscriber starts missing the oldest ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Local files are being sent to the backend
    MediaUploadStarted { count: usize },

    MediaUploadCompleted { count: usize },

    /// Upload failed; the files stay staged locally
    MediaUploadFailed { error: String },

    /// A file was imported from a cloud integration
    MediaImported { integration: String, name: String },

    SubmitStarted {
        platforms: Vec<String>,
        scheduled: bool,
    },

    /// The backend accepted the post
    PostCreated {
        post_id: Option<String>,
        scheduled_date: Option<String>,
    },

    PublishCompleted {
        post_id: String,
        results: Vec<PlatformResult>,
        message: String,
    },

    SubmitFailed { error: String },
}
