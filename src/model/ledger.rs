use std::collections::VecDeque;

use crate::common::collections::HashSet;
use crate::sys::ax::pid_t;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub pid: pid_t,
    pub number: u32,
}

impl WindowKey {
    pub fn new(pid: pid_t, number: u32) -> Self { WindowKey { pid, number } }
}

/// Windows that have already been centered automatically.
///
/// Bounded FIFO: once more than `capacity` keys are recorded, the oldest is
/// dropped. Re-recording a key does not refresh its position.
#[derive(Debug)]
pub struct CenteredLedger {
    order: VecDeque<WindowKey>,
    members: HashSet<WindowKey>,
    capacity: usize,
}

impl CenteredLedger {
    pub const DEFAULT_CAPACITY: usize = 200;

    pub fn new(capacity: usize) -> Self {
        CenteredLedger {
            order: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            members: HashSet::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn contains(&self, key: &WindowKey) -> bool { self.members.contains(key) }

    /// Returns `false` if the key was already present.
    pub fn record(&mut self, key: WindowKey) -> bool {
        if !self.members.insert(key) {
            return false;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        true
    }

    /// Drops every key belonging to a process that has exited.
    pub fn forget_process(&mut self, pid: pid_t) {
        self.order.retain(|key| key.pid != pid);
        self.members.retain(|key| key.pid != pid);
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

impl Default for CenteredLedger {
    fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}
