//! In-memory currency collaborator.

use brewhouse_core::Wallet;

/// Simple coin purse backing the placement committer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Purse {
    coins: u64,
}

impl Purse {
    /// Creates a purse holding `coins`.
    #[must_use]
    pub const fn new(coins: u64) -> Self {
        Self { coins }
    }
}

impl Wallet for Purse {
    fn balance(&self) -> u64 {
        self.coins
    }

    fn debit(&mut self, amount: u64) -> bool {
        match self.coins.checked_sub(amount) {
            Some(remaining) => {
                self.coins = remaining;
                true
            }
            None => false,
        }
    }

    fn credit(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }
}
