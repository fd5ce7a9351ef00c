//! Best-effort event bus.
//!
//! Publishing never fails from the caller's point of view: every sink error
//! is a transport failure that the bus logs at debug level and drops. There
//! is no retry and no ordering guarantee across sinks.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::{
    error::{KeelError, Result},
    models::Event,
};

/// Why a sink could not take an event.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("no subscribers are listening")]
    Closed,
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A subscriber of the event bus.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event) -> std::result::Result<(), SinkError>;
}

/// Fan-out publisher over zero or more sinks.
#[derive(Clone, Default)]
pub struct EventBus {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Publishes `{topic, data}` to every sink, discarding sink errors.
    pub fn publish(&self, topic: &str, data: Value) {
        let event = Event::new(topic, data);
        for sink in &self.sinks {
            if let Err(e) = sink.emit(&event) {
                debug!("Dropped event {topic}: {e}");
            }
        }
    }
}

/// Writes every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &Event) -> std::result::Result<(), SinkError> {
        info!(target: "keel::events", "{} {}", event.topic, event.data);
        Ok(())
    }
}

/// Forwards events to in-process subscribers over a broadcast channel.
pub struct ChannelSink {
    sender: broadcast::Sender<Event>,
}

impl ChannelSink {
    /// Creates the sink together with its first receiver.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<Event>) {
        let (sender, receiver) = broadcast::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &Event) -> std::result::Result<(), SinkError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| SinkError::Closed)
    }
}

/// Appends each event as one JSON line to a file.
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| KeelError::FileSystem {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for JsonLinesSink {
    fn emit(&self, event: &Event) -> std::result::Result<(), SinkError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        let mut file = self
            .file
            .lock()
            .map_err(|_| {
                SinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "event file lock poisoned",
                ))
            })?;
        file.write_all(&line)?;
        Ok(())
    }
}
