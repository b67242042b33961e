//! Subscriber bookkeeping and the broadcast fan-out.
//!
//! Connections register here on accept and start out silent; the `start`
//! command flips them to listening. Every document is serialized once,
//! framed with a trailing ETX byte and queued to each listening
//! subscriber's writer task. A subscriber whose queue is closed gets
//! evicted on the spot.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Result;

/// Frame terminator appended after every serialized document.
pub const ETX: u8 = 0x03;

/// One serialized document plus its terminator, shared across queues.
pub type Frame = Arc<[u8]>;

struct Subscriber {
    id: u64,
    listening: bool,
    frames: UnboundedSender<Frame>,
}

struct Inner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// The shared subscriber list.
pub struct Registry {
    inner: Mutex<Inner>,
}

fn frame(doc: &Value) -> Result<Frame> {
    let mut bytes = serde_json::to_vec(doc)?;
    bytes.push(ETX);
    Ok(bytes.into())
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            inner: Mutex::new(Inner {
                next_id: 1,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Register a connection. It receives nothing until it is marked
    /// listening; the returned stream feeds its writer task.
    pub fn subscribe(&self) -> (u64, UnboundedReceiver<Frame>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            listening: false,
            frames: sender,
        });
        debug!(id, "subscriber registered");
        (id, receiver)
    }

    /// Drop a subscriber and close its frame stream.
    pub fn unsubscribe(&self, id: u64) {
        let mut inner = self.inner.lock();
        if let Some(position) = inner.subscribers.iter().position(|s| s.id == id) {
            inner.subscribers.swap_remove(position);
            debug!(id, "subscriber removed");
        }
    }

    /// Flip a subscriber to listening. `false` when the id is gone.
    pub fn mark_listening(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.subscribers.iter_mut().find(|s| s.id == id) {
            Some(subscriber) => {
                subscriber.listening = true;
                true
            }
            None => false,
        }
    }

    /// Queue `doc` to every listening subscriber, evicting the dead ones.
    /// Returns the bytes queued over all deliveries, terminator included.
    pub fn broadcast(&self, doc: &Value) -> Result<usize> {
        let frame = frame(doc)?;
        let mut bytes = 0;
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|subscriber| {
            if !subscriber.listening {
                return true;
            }
            if subscriber.frames.send(Arc::clone(&frame)).is_err() {
                debug!(id = subscriber.id, "evicting dead subscriber");
                return false;
            }
            bytes += frame.len();
            true
        });
        Ok(bytes)
    }

    /// Queue `doc` to one subscriber regardless of its listening state.
    /// Returns the bytes queued, 0 when the subscriber is gone.
    pub fn send_to(&self, id: u64, doc: &Value) -> Result<usize> {
        let frame = frame(doc)?;
        let mut inner = self.inner.lock();
        let Some(position) = inner.subscribers.iter().position(|s| s.id == id) else {
            return Ok(0);
        };
        if inner.subscribers[position]
            .frames
            .send(Arc::clone(&frame))
            .is_err()
        {
            inner.subscribers.swap_remove(position);
            debug!(id, "evicting dead subscriber");
            return Ok(0);
        }
        Ok(frame.len())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}
