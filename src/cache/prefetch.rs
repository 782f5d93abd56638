//! Predictive prefetch queue for neighbor quantum states.
//!
//! After a foreground request the session enqueues the states a user
//! is most likely to ask for next. The queue holds work descriptions
//! only; the session drains it one item at a time so a host scheduler
//! can interleave draining with foreground work.

use std::collections::VecDeque;

use tracing::debug;

use crate::field::DistributionMode;
use crate::orbital::QuantumState;
use crate::sampling::ThemeMode;

/// Drain order: other m of the same subshell first, adjacent shells
/// next, adjacent subshells last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrefetchPriority {
    High,
    Medium,
    Low,
}

/// One unit of background work: sample this state and cache it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchItem {
    pub atomic_number: u32,
    pub state: QuantumState,
    pub count: usize,
    pub mode: DistributionMode,
    pub theme: ThemeMode,
    pub priority: PrefetchPriority,
}

/// Neighbor states of one quantum state, paired with their priority.
/// Invalid combinations are dropped; m is clamped when a subshell
/// step shrinks its range.
pub fn neighbor_states(state: QuantumState) -> Vec<(QuantumState, PrefetchPriority)> {
    let mut neighbors: Vec<(QuantumState, PrefetchPriority)> = Vec::new();
    let push = |n: u32, l: u32, m: i32, priority: PrefetchPriority,
                neighbors: &mut Vec<(QuantumState, PrefetchPriority)>| {
        if let Ok(candidate) = QuantumState::new(n, l, m, state.spin) {
            if candidate != state && !neighbors.iter().any(|(s, _)| *s == candidate) {
                neighbors.push((candidate, priority));
            }
        }
    };

    let l = state.l as i32;
    for m in -l..=l {
        if m != state.m {
            push(state.n, state.l, m, PrefetchPriority::High, &mut neighbors);
        }
    }
    if state.n > 1 {
        let clamped = state.m.clamp(-(state.n as i32 - 2), state.n as i32 - 2);
        push(state.n - 1, state.l.min(state.n - 2), clamped, PrefetchPriority::Medium, &mut neighbors);
    }
    push(state.n + 1, state.l, state.m, PrefetchPriority::Medium, &mut neighbors);
    if state.l > 0 {
        let down = state.l - 1;
        let clamped = state.m.clamp(-(down as i32), down as i32);
        push(state.n, down, clamped, PrefetchPriority::Low, &mut neighbors);
    }
    if state.l + 1 < state.n {
        push(state.n, state.l + 1, state.m, PrefetchPriority::Low, &mut neighbors);
    }

    neighbors
}

/// Bounded FIFO of prefetch work, priority-sorted at enqueue time.
pub struct PrefetchQueue {
    items: VecDeque<PrefetchItem>,
    limit: usize,
}

impl PrefetchQueue {
    pub fn new(limit: usize) -> Self {
        Self { items: VecDeque::new(), limit: limit.max(1) }
    }

    /// Queue the neighbors of `state`, skipping states the supplied
    /// predicate reports as already cached and states already
    /// pending, until the queue limit is reached.
    pub fn enqueue_neighbors<F>(
        &mut self,
        atomic_number: u32,
        state: QuantumState,
        count: usize,
        mode: DistributionMode,
        theme: ThemeMode,
        is_cached: F,
    ) -> usize
    where
        F: Fn(&QuantumState) -> bool,
    {
        let mut neighbors = neighbor_states(state);
        neighbors.sort_by_key(|(_, priority)| *priority);

        let mut queued = 0;
        for (candidate, priority) in neighbors {
            if self.items.len() >= self.limit {
                break;
            }
            if is_cached(&candidate) {
                continue;
            }
            let pending = self.items.iter().any(|item| {
                item.atomic_number == atomic_number
                    && item.state == candidate
                    && item.count == count
                    && item.mode == mode
                    && item.theme == theme
            });
            if pending {
                continue;
            }
            self.items.push_back(PrefetchItem {
                atomic_number,
                state: candidate,
                count,
                mode,
                theme,
                priority,
            });
            queued += 1;
        }
        debug!(z = atomic_number, %state, queued, pending = self.items.len(), "prefetch neighbors queued");
        queued
    }

    /// Next unit of work, highest priority first.
    pub fn pop(&mut self) -> Option<PrefetchItem> {
        self.items.pop_front()
    }

    /// Drop all pending work. Called when the foreground target
    /// changes and queued neighbors are no longer relevant.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            debug!(dropped = self.items.len(), "prefetch queue cleared");
        }
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
