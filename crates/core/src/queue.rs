use std::collections::{HashSet, VecDeque};

use crate::message::{IncomingMessage, MessageId};

/// Arrival-ordered backlog of messages waiting to be written
///
/// Duplicates are rejected against the last enqueued id and a bounded window of
/// recently seen ids. The window evicts oldest-first, so a redelivery older than
/// `window` distinct ids is accepted again.
#[derive(Debug, Clone)]
pub struct MessageQueue {
    pending: VecDeque<IncomingMessage>,
    last_id: Option<MessageId>,
    seen: HashSet<MessageId>,
    seen_order: VecDeque<MessageId>,
    window: usize,
}

impl MessageQueue {
    pub fn new(window: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            last_id: None,
            seen: HashSet::new(),
            seen_order: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Append `message` to the tail unless its id was already seen
    ///
    /// Returns `false` when the message was dropped as a duplicate.
    pub fn enqueue(&mut self, message: IncomingMessage) -> bool {
        if self.is_duplicate(&message.id) {
            return false;
        }

        self.remember(message.id.clone());
        self.last_id = Some(message.id.clone());
        self.pending.push_back(message);
        true
    }

    pub fn dequeue(&mut self) -> Option<IncomingMessage> {
        self.pending.pop_front()
    }

    pub fn is_duplicate(&self, id: &MessageId) -> bool {
        self.last_id.as_ref() == Some(id) || self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn last_id(&self) -> Option<&MessageId> {
        self.last_id.as_ref()
    }

    fn remember(&mut self, id: MessageId) {
        if !self.seen.insert(id.clone()) {
            return;
        }
        self.seen_order.push_back(id);

        while self.seen_order.len() > self.window {
            if let Some(evicted) = self.seen_order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(1024)
    }
}
