use std::collections::HashMap;

use racing_coach_contracts::{CoachingMessage, MessageCategory, SecondaryMessage};
use racing_coach_rate_limiter::TokenBucket;
use racing_coach_ring_buffer::RingBuffer;

use crate::config::{MessageOrigin, QueueConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    Enqueued,
    Combined,
    SuppressedDuplicate,
    SuppressedCooldown,
    RejectedInvalid { reason: String },
    DroppedAtCapacity,
}

struct Pending {
    message: CoachingMessage,
    enqueued_at_s: f64,
}

/// Bounded priority queue ordered by (priority desc, timestamp asc),
/// with the admission pipeline and rate-limited dispatch from spec
/// §4.14.
pub struct MessageQueue {
    config: QueueConfig,
    category_cooldowns_s: HashMap<MessageCategory, f64>,
    pending: Vec<Pending>,
    last_text_frontend_s: HashMap<String, f64>,
    last_text_backend_s: HashMap<String, f64>,
    last_category_dispatch_s: HashMap<MessageCategory, f64>,
    dispatch_bucket: TokenBucket,
    history: RingBuffer<CoachingMessage>,
}

impl MessageQueue {
    pub fn new(config: QueueConfig) -> Self {
        let dispatch_rate_per_s = 1.0 / config.dispatch_interval.as_secs_f64();
        let dispatch_bucket = TokenBucket::new(config.dispatch_burst, dispatch_rate_per_s);
        let history = RingBuffer::new(config.history_capacity);
        Self {
            config,
            category_cooldowns_s: HashMap::new(),
            pending: Vec::new(),
            last_text_frontend_s: HashMap::new(),
            last_text_backend_s: HashMap::new(),
            last_category_dispatch_s: HashMap::new(),
            dispatch_bucket,
            history,
        }
    }

    pub fn set_category_cooldown(&mut self, category: MessageCategory, cooldown_s: f64) {
        self.category_cooldowns_s.insert(category, cooldown_s);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs the full admission pipeline for one candidate message.
    pub fn admit(&mut self, message: CoachingMessage, origin: MessageOrigin, now_s: f64) -> AdmissionOutcome {
        if let Err(reason) = schema_check(&message) {
            return AdmissionOutcome::RejectedInvalid { reason };
        }

        let is_critical = message.priority >= self.config.critical_priority;

        if !is_critical && self.is_duplicate(&message, origin, now_s) {
            return AdmissionOutcome::SuppressedDuplicate;
        }

        if let Some(index) = self.combinable_index(&message, now_s) {
            self.record_text(origin, &message.text, now_s);
            self.combine_into(index, message);
            return AdmissionOutcome::Combined;
        }

        if !is_critical && !self.cooldown_elapsed(message.category, now_s) {
            return AdmissionOutcome::SuppressedCooldown;
        }

        self.record_text(origin, &message.text, now_s);
        self.last_category_dispatch_s.insert(message.category, now_s);

        if self.pending.len() >= self.config.capacity {
            if !self.drop_lowest_priority_oldest() {
                return AdmissionOutcome::DroppedAtCapacity;
            }
        }

        self.pending.push(Pending {
            message,
            enqueued_at_s: now_s,
        });
        self.sort_pending();

        AdmissionOutcome::Enqueued
    }

    /// Pulls the next message if the dispatch token bucket allows it,
    /// publishing it to the recent-history ring.
    pub fn try_dispatch(&mut self) -> Option<CoachingMessage> {
        if self.pending.is_empty() || !self.dispatch_bucket.try_acquire() {
            return None;
        }
        let next = self.pending.remove(0);
        self.history.push(next.message.clone());
        Some(next.message)
    }

    pub fn recent_history(&self) -> Vec<CoachingMessage> {
        self.history.iter().cloned().collect()
    }

    fn is_duplicate(&self, message: &CoachingMessage, origin: MessageOrigin, now_s: f64) -> bool {
        let (table, window) = match origin {
            MessageOrigin::Frontend => (&self.last_text_frontend_s, self.config.dedup_window_frontend_s),
            MessageOrigin::Backend => (&self.last_text_backend_s, self.config.dedup_window_backend_s),
        };
        match table.get(&message.text) {
            Some(last) => now_s - last < window,
            None => false,
        }
    }

    fn record_text(&mut self, origin: MessageOrigin, text: &str, now_s: f64) {
        let table = match origin {
            MessageOrigin::Frontend => &mut self.last_text_frontend_s,
            MessageOrigin::Backend => &mut self.last_text_backend_s,
        };
        table.insert(text.to_string(), now_s);
    }

    fn cooldown_elapsed(&self, category: MessageCategory, now_s: f64) -> bool {
        let cooldown = self
            .category_cooldowns_s
            .get(&category)
            .copied()
            .unwrap_or(self.config.default_category_cooldown_s);
        match self.last_category_dispatch_s.get(&category) {
            Some(last) => now_s - last >= cooldown,
            None => true,
        }
    }

    fn combinable_index(&self, message: &CoachingMessage, now_s: f64) -> Option<usize> {
        self.pending.iter().position(|pending| {
            pending.message.category == message.category
                && now_s - pending.enqueued_at_s <= self.config.combination_window_s
                && shared_keyword_count(&pending.message.text, &message.text) >= 2
        })
    }

    fn combine_into(&mut self, index: usize, message: CoachingMessage) {
        let Some(pending) = self.pending.get_mut(index) else {
            return;
        };
        pending.message.priority = pending.message.priority.max(message.priority);
        pending.message.confidence = (pending.message.confidence + message.confidence) / 2.0;
        pending.message.secondary.push(SecondaryMessage {
            text: message.text,
            category: message.category,
        });
        self.sort_pending();
    }

    fn drop_lowest_priority_oldest(&mut self) -> bool {
        let Some((worst_index, _)) = self
            .pending
            .iter()
            .enumerate()
            .min_by(|a, b| {
                a.1.message
                    .priority
                    .cmp(&b.1.message.priority)
                    .then(b.1.enqueued_at_s.partial_cmp(&a.1.enqueued_at_s).unwrap_or(std::cmp::Ordering::Equal))
            })
        else {
            return false;
        };
        self.pending.remove(worst_index);
        true
    }

    fn sort_pending(&mut self) {
        self.pending.sort_by(|a, b| {
            b.message
                .priority
                .cmp(&a.message.priority)
                .then(a.enqueued_at_s.partial_cmp(&b.enqueued_at_s).unwrap_or(std::cmp::Ordering::Equal))
        });
    }
}

fn schema_check(message: &CoachingMessage) -> Result<(), String> {
    if message.text.trim().is_empty() {
        return Err("message text must not be empty".to_string());
    }
    Ok(())
}

fn shared_keyword_count(a: &str, b: &str) -> usize {
    let words_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let words_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    words_a.intersection(&words_b).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn message(text: &str, category: MessageCategory, priority: u8) -> CoachingMessage {
        CoachingMessage {
            id: "m1".into(),
            text: text.to_string(),
            category,
            priority,
            confidence: 0.8,
            secondary: Vec::new(),
            improvement_potential_s: None,
            timestamp_s: 0.0,
            audio_payload_base64: None,
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        let mut queue = MessageQueue::new(QueueConfig::default());
        let outcome = queue.admit(message("", MessageCategory::Braking, 5), MessageOrigin::Backend, 0.0);
        assert!(matches!(outcome, AdmissionOutcome::RejectedInvalid { .. }));
    }

    #[test]
    fn duplicate_text_within_window_is_suppressed() {
        let mut queue = MessageQueue::new(QueueConfig::default());
        queue.admit(message("brake later", MessageCategory::Braking, 5), MessageOrigin::Backend, 0.0);
        let outcome = queue.admit(message("brake later", MessageCategory::Throttle, 5), MessageOrigin::Backend, 3.0);
        assert_eq!(outcome, AdmissionOutcome::SuppressedDuplicate);
    }

    #[test]
    fn critical_priority_bypasses_duplicate_suppression() {
        let mut queue = MessageQueue::new(QueueConfig::default());
        queue.admit(message("brake later", MessageCategory::Braking, 9), MessageOrigin::Backend, 0.0);
        // Past the combination window too, so this exercises dedup bypass
        // specifically rather than semantic combination.
        let outcome = queue.admit(message("brake later", MessageCategory::Braking, 9), MessageOrigin::Backend, 4.0);
        assert_eq!(outcome, AdmissionOutcome::Enqueued);
    }

    #[test]
    fn similar_messages_in_the_same_category_combine() {
        let mut queue = MessageQueue::new(QueueConfig::default());
        queue.admit(message("brake later into turn one", MessageCategory::Braking, 5), MessageOrigin::Backend, 0.0);
        let outcome = queue.admit(
            message("brake later into turn two", MessageCategory::Braking, 7),
            MessageOrigin::Backend,
            1.0,
        );
        assert_eq!(outcome, AdmissionOutcome::Combined);
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(queue.pending[0].message.priority, 7);
    }

    #[test]
    fn category_cooldown_suppresses_rapid_non_combinable_messages() {
        let mut queue = MessageQueue::new(QueueConfig::default());
        queue.admit(message("brake later", MessageCategory::Braking, 5), MessageOrigin::Backend, 0.0);
        let outcome = queue.admit(message("lift off early", MessageCategory::Braking, 5), MessageOrigin::Backend, 5.0);
        assert_eq!(outcome, AdmissionOutcome::SuppressedCooldown);
    }

    #[test]
    fn capacity_drops_lowest_priority_oldest() {
        let mut config = QueueConfig::default();
        config.capacity = 1;
        config.default_category_cooldown_s = 0.0;
        let mut queue = MessageQueue::new(config);

        queue.admit(message("low priority note", MessageCategory::General, 2), MessageOrigin::Backend, 0.0);
        let outcome = queue.admit(message("urgent safety note", MessageCategory::Safety, 9), MessageOrigin::Backend, 1.0);

        assert_eq!(outcome, AdmissionOutcome::Enqueued);
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(queue.pending[0].message.category, MessageCategory::Safety);
    }

    #[test]
    fn dispatch_respects_rate_limit_then_refills() {
        let mut config = QueueConfig::default();
        config.dispatch_interval = std::time::Duration::from_millis(1);
        config.dispatch_burst = 1;
        let mut queue = MessageQueue::new(config);
        queue.admit(message("first", MessageCategory::General, 5), MessageOrigin::Backend, 0.0);
        queue.admit(message("second", MessageCategory::Strategy, 5), MessageOrigin::Backend, 0.0);

        let first = queue.try_dispatch();
        assert!(first.is_some());
        assert_eq!(queue.recent_history().len(), 1);
    }
}
