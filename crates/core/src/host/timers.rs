// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer queue backing the reactor

use super::{Task, TimerId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Entry {
    fire_at: Instant,
    id: TimerId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap: earliest first, ties in scheduling order
        Reverse((self.fire_at, self.id)).cmp(&Reverse((other.fire_at, other.id)))
    }
}

/// One-shot timers ordered by deadline
///
/// Cancellation removes the task immediately; its heap entry is discarded
/// lazily when it reaches the top.
#[derive(Default)]
pub struct TimerQueue {
    entries: BinaryHeap<Entry>,
    tasks: HashMap<TimerId, Task>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer
    pub fn schedule(&mut self, fire_at: Instant, task: Task) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(Entry { fire_at, id });
        self.tasks.insert(id, task);
        id
    }

    /// Hold a timer that never comes due
    ///
    /// It counts as pending and can be cancelled, but never fires.
    pub fn park(&mut self, task: Task) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.tasks.insert(id, task);
        id
    }

    /// Cancel a scheduled timer, handing back its task if it was still pending
    pub fn cancel(&mut self, id: TimerId) -> Option<Task> {
        self.tasks.remove(&id)
    }

    /// Pop the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, Task)> {
        while let Some(entry) = self.entries.peek() {
            if entry.fire_at > now {
                return None;
            }

            let entry = self.entries.pop()?;

            // Skip cancelled timers
            if let Some(task) = self.tasks.remove(&entry.id) {
                return Some((entry.id, task));
            }
        }
        None
    }

    /// Get the next fire time, if any
    pub fn next_fire_time(&mut self) -> Option<Instant> {
        while let Some(entry) = self.entries.peek() {
            if self.tasks.contains_key(&entry.id) {
                return Some(entry.fire_at);
            }
            self.entries.pop();
        }
        None
    }

    /// Check if any timer is still pending
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
