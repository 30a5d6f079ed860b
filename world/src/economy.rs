//! Money and loss bookkeeping.

use tower_defense_core::EconomySnapshot;

#[derive(Clone, Debug)]
pub(crate) struct Economy {
    money: u32,
    kill_count: u32,
    leaked_count: u32,
    leak_limit: u32,
}

impl Economy {
    pub(crate) fn new(starting_money: u32, leak_limit: u32) -> Self {
        Self {
            money: starting_money,
            kill_count: 0,
            leaked_count: 0,
            leak_limit,
        }
    }

    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    pub(crate) fn can_afford(&self, cost: u32) -> bool {
        self.money >= cost
    }

    /// Debits `cost`. Callers check `can_afford` first.
    pub(crate) fn debit(&mut self, cost: u32) {
        self.money = self.money.saturating_sub(cost);
    }

    /// Books a kill and credits `reward`.
    pub(crate) fn record_kill(&mut self, reward: u32) {
        self.kill_count = self.kill_count.saturating_add(1);
        self.money = self.money.saturating_add(reward);
    }

    /// Books a leak and returns the new leak count.
    pub(crate) fn record_leak(&mut self) -> u32 {
        self.leaked_count = self.leaked_count.saturating_add(1);
        self.leaked_count
    }

    pub(crate) fn leaked_count(&self) -> u32 {
        self.leaked_count
    }

    pub(crate) fn leak_limit_reached(&self) -> bool {
        self.leaked_count >= self.leak_limit
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            money: self.money,
            kill_count: self.kill_count,
            leaked_count: self.leaked_count,
            leak_limit: self.leak_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affordability_tracks_remaining_money() {
        let mut economy = Economy::new(30, 10);
        assert!(economy.can_afford(20));
        economy.debit(20);
        assert!(!economy.can_afford(20));
        assert_eq!(economy.money(), 10);
        assert!(economy.can_afford(10));
        economy.debit(10);
        assert_eq!(economy.money(), 0);
    }

    #[test]
    fn kills_credit_reward() {
        let mut economy = Economy::new(0, 10);
        economy.record_kill(10);
        economy.record_kill(10);
        let snapshot = economy.snapshot();
        assert_eq!(snapshot.money, 20);
        assert_eq!(snapshot.kill_count, 2);
    }

    #[test]
    fn leak_limit_is_reached_at_threshold() {
        let mut economy = Economy::new(0, 2);
        assert_eq!(economy.record_leak(), 1);
        assert!(!economy.leak_limit_reached());
        assert_eq!(economy.record_leak(), 2);
        assert!(economy.leak_limit_reached());
    }

    #[test]
    fn zero_leak_limit_is_reached_immediately() {
        assert!(Economy::new(0, 0).leak_limit_reached());
    }
}
