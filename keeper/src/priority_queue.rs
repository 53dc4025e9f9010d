//! Priority queue for tracking position health (min-heap by health)

use bookkeeper::{Address, PoolId, Signed, U256};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

pub type PositionKey = (PoolId, Address);

/// Position health snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionHealth {
    pub pool: PoolId,
    pub owner: Address,
    /// Collateral value minus debt value (rad)
    pub health: Signed,
    /// Locked collateral at the safety-margin price (rad)
    pub collateral_value: U256,
    /// Debt share times accumulated rate (rad)
    pub debt_value: U256,
}

impl PositionHealth {
    pub fn key(&self) -> PositionKey {
        (self.pool, self.owner)
    }

    /// Strictly below the threshold; zero threshold selects unsafe positions
    pub fn needs_liquidation(&self, threshold: Signed) -> bool {
        self.health < threshold
    }
}

/// Health-based priority queue (min-heap: lowest health first)
pub struct HealthQueue {
    queue: PriorityQueue<PositionKey, Reverse<Signed>>,
    map: HashMap<PositionKey, PositionHealth>,
}

impl HealthQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update position health
    pub fn push(&mut self, health: PositionHealth) {
        let key = health.key();
        let priority = Reverse(health.health);
        self.map.insert(key, health);
        self.queue.push(key, priority);
    }

    /// Pop position with lowest health
    pub fn pop(&mut self) -> Option<PositionHealth> {
        let (key, _priority) = self.queue.pop()?;
        self.map.remove(&key)
    }

    pub fn peek(&self) -> Option<&PositionHealth> {
        let (key, _priority) = self.queue.peek()?;
        self.map.get(key)
    }

    pub fn remove(&mut self, key: &PositionKey) -> Option<PositionHealth> {
        self.queue.remove(key);
        self.map.remove(key)
    }

    pub fn get(&self, key: &PositionKey) -> Option<&PositionHealth> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &PositionKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Positions below the health threshold, worst first
    pub fn get_liquidatable(&self, threshold: Signed) -> Vec<PositionHealth> {
        let mut liquidatable: Vec<PositionHealth> = self
            .map
            .values()
            .filter(|h| h.needs_liquidation(threshold))
            .cloned()
            .collect();
        liquidatable.sort_by(|a, b| a.health.cmp(&b.health).then_with(|| a.key().cmp(&b.key())));
        liquidatable
    }
}

impl Default for HealthQueue {
    fn default() -> Self {
        Self::new()
    }
}
