//! Display sinks: where a bridge's inbound bytes and diagnostics land.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::state::BridgeState;

/// Receives everything a bridge wants displayed.
///
/// `write` gets remote output and inline diagnostics, in arrival order.
/// `state_changed` fires once per lifecycle transition.
pub trait DisplaySink: Send {
    fn write(&mut self, bytes: &[u8]);

    fn state_changed(&mut self, _state: BridgeState) {}
}

/// Bounded in-memory sink. Clones share the same buffer, so a view can keep
/// a handle while the bridge owns another.
#[derive(Clone)]
pub struct Scrollback {
    inner: Arc<Mutex<ScrollbackInner>>,
}

struct ScrollbackInner {
    bytes: VecDeque<u8>,
    limit: usize,
    transitions: Vec<BridgeState>,
}

impl Scrollback {
    /// Keep at most `limit` bytes; older output is discarded first.
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScrollbackInner {
                bytes: VecDeque::new(),
                limit: limit.max(1),
                transitions: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScrollbackInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.lock().bytes.iter().copied().collect()
    }

    /// Buffer contents decoded lossily as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bytes.is_empty()
    }

    /// Most recent state reported by the bridge, if any.
    pub fn state(&self) -> Option<BridgeState> {
        self.lock().transitions.last().copied()
    }

    /// Every state reported so far, oldest first.
    pub fn transitions(&self) -> Vec<BridgeState> {
        self.lock().transitions.clone()
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(256 * 1024)
    }
}

impl DisplaySink for Scrollback {
    fn write(&mut self, bytes: &[u8]) {
        let mut inner = self.lock();
        inner.bytes.extend(bytes);
        let overflow = inner.bytes.len().saturating_sub(inner.limit);
        if overflow > 0 {
            inner.bytes.drain(..overflow);
        }
    }

    fn state_changed(&mut self, state: BridgeState) {
        self.lock().transitions.push(state);
    }
}
