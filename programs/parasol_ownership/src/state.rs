// programs/parasol_ownership/src/state.rs

use anchor_lang::prelude::*;
use parasol_core::math::{entitlement, from_scaled, REWARD_SCALE};

// =============================================================================
// OWNERSHIP TOKEN STATE
// =============================================================================
// A fixed-supply unit ledger representing claims on pool owner revenue.
// The full supply is minted to the pool deployer and is freely transferable;
// the owner slice of every insurance purchase is distributed pro-rata over
// whoever holds the units at that moment.
//
// Debt is signed: a transfer shifts `amount * acc` of debt from sender to
// recipient, which preserves both sides' pending reward exactly without
// forcing a harvest. A sender who already harvested can push their debt
// below zero; the negative balance is simply stored credit.

/// Ownership ledger for one pool
/// PDA seeds: ["ownership", pool]
#[account]
#[derive(InitSpace)]
pub struct OwnershipConfig {
    /// Pool this ledger belongs to
    pub pool: Pubkey,

    /// Registrar config PDA allowed to notify rewards (CPI signer)
    pub registrar: Pubkey,

    /// Reward asset mint (the pool's asset)
    pub asset_mint: Pubkey,

    /// Token account holding undistributed owner revenue
    pub reward_vault: Pubkey,

    /// Fixed unit supply; sum of holder balances forever
    pub total_supply: u64,

    /// Bump seed
    pub bump: u8,
}

impl OwnershipConfig {
    pub const SEED_PREFIX: &'static [u8] = b"ownership";
    pub const VAULT_SEED: &'static [u8] = b"own_vault";
}

/// Per-asset reward accumulator
/// PDA seeds: ["own_reward", ownership, mint]
#[account]
#[derive(InitSpace)]
pub struct OwnerRewardState {
    /// Asset this accumulator distributes
    pub mint: Pubkey,

    /// Reward per unit, REWARD_SCALE fixed-point
    pub acc_per_share: u128,

    /// Total entitlement, scaled; the `total(asset)` surface.
    /// `total_entitled - sum(debt)` equals the undistributed balance.
    pub total_entitled: u128,

    /// Revenue paid out all-time (token units)
    pub total_harvested: u64,

    /// Bump seed
    pub bump: u8,
}

impl OwnerRewardState {
    pub const SEED_PREFIX: &'static [u8] = b"own_reward";

    /// Accrued-but-unclaimed revenue for a holder.
    pub fn pending(&self, balance: u64, debt: i128) -> u64 {
        let entitled = entitlement(balance, self.acc_per_share) as i128;
        from_scaled(entitled.saturating_sub(debt).max(0) as u128)
    }

    /// Distribute `amount` pro-rata over the fixed supply.
    pub fn notify(&mut self, amount: u64, total_supply: u64) {
        if total_supply == 0 {
            return;
        }
        let delta = (amount as u128)
            .saturating_mul(REWARD_SCALE)
            .checked_div(total_supply as u128)
            .unwrap_or(0);
        self.acc_per_share = self.acc_per_share.saturating_add(delta);
        self.total_entitled = self
            .total_entitled
            .saturating_add(delta.saturating_mul(total_supply as u128));
    }

    /// Settle a holder against the accumulator: returns payout and new debt.
    pub fn settle(&mut self, balance: u64, debt: i128) -> (u64, i128) {
        let entitled = entitlement(balance, self.acc_per_share) as i128;
        let payout = from_scaled(entitled.saturating_sub(debt).max(0) as u128);
        self.total_harvested = self.total_harvested.saturating_add(payout);
        (payout, entitled)
    }

    /// Debt shifted by a transfer of `amount` units.
    pub fn transfer_debt(&self, amount: u64) -> i128 {
        entitlement(amount, self.acc_per_share) as i128
    }

    /// `total(asset)` surface in token units.
    pub fn total_assets(&self) -> u64 {
        from_scaled(self.total_entitled)
    }
}

/// Ownership unit balance
/// PDA seeds: ["holder", ownership, owner]
#[account]
#[derive(InitSpace)]
pub struct HolderAccount {
    /// Holder wallet
    pub owner: Pubkey,

    /// Unit balance
    pub balance: u64,

    /// Bump seed
    pub bump: u8,
}

impl HolderAccount {
    pub const SEED_PREFIX: &'static [u8] = b"holder";
}

/// Per (asset, holder) signed reward debt
/// PDA seeds: ["own_debt", ownership, mint, owner]
#[account]
#[derive(InitSpace)]
pub struct HolderDebt {
    /// Holder wallet
    pub owner: Pubkey,

    /// Asset mint
    pub mint: Pubkey,

    /// Signed debt against the accumulator, REWARD_SCALE fixed-point
    pub debt: i128,

    /// Bump seed
    pub bump: u8,
}

impl HolderDebt {
    pub const SEED_PREFIX: &'static [u8] = b"own_debt";
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parasol_core::{ONE_UNIT, OWNERSHIP_SUPPLY};

    struct Harness {
        state: OwnerRewardState,
        vault: u64,
        holders: Vec<(u64, i128)>, // (balance, debt)
    }

    impl Harness {
        const DUST_BOUND: u64 = 64;

        // full supply starts with holder 0, as minted at pool deploy
        fn new(holders: usize) -> Self {
            let mut h = Harness {
                state: OwnerRewardState {
                    mint: Pubkey::default(),
                    acc_per_share: 0,
                    total_entitled: 0,
                    total_harvested: 0,
                    bump: 255,
                },
                vault: 0,
                holders: vec![(0, 0); holders],
            };
            h.holders[0].0 = OWNERSHIP_SUPPLY;
            h
        }

        fn notify(&mut self, amount: u64) {
            self.state.notify(amount, OWNERSHIP_SUPPLY);
            self.vault += amount;
            self.assert_invariant();
        }

        fn transfer(&mut self, from: usize, to: usize, amount: u64) {
            assert!(self.holders[from].0 >= amount);
            let shift = self.state.transfer_debt(amount);
            self.holders[from].0 -= amount;
            self.holders[from].1 -= shift;
            self.holders[to].0 += amount;
            self.holders[to].1 += shift;
            self.assert_invariant();
        }

        fn harvest(&mut self, i: usize) -> u64 {
            let (balance, debt) = self.holders[i];
            let (payout, settled) = self.state.settle(balance, debt);
            self.vault -= payout;
            self.holders[i].1 = settled;
            self.assert_invariant();
            payout
        }

        fn assert_invariant(&self) {
            let supply: u64 = self.holders.iter().map(|(b, _)| b).sum();
            assert_eq!(supply, OWNERSHIP_SUPPLY, "fixed supply violated");

            let debt_sum: i128 = self.holders.iter().map(|(_, d)| d).sum();
            let outstanding =
                from_scaled((self.state.total_entitled as i128 - debt_sum).max(0) as u128);
            assert!(
                self.vault >= outstanding && self.vault - outstanding <= Self::DUST_BOUND,
                "ledger invariant broken: vault={} outstanding={}",
                self.vault,
                outstanding
            );
        }
    }

    #[test]
    fn test_sole_holder_collects_everything() {
        let mut h = Harness::new(1);
        h.notify(40 * ONE_UNIT);
        assert_eq!(h.harvest(0), 40 * ONE_UNIT);
        assert_eq!(h.state.pending(h.holders[0].0, h.holders[0].1), 0);
    }

    #[test]
    fn test_split_holdings_split_revenue() {
        let mut h = Harness::new(3);
        // deployer keeps 7000, sells 1000 and 2000 (the deploy-time spread)
        h.transfer(0, 1, 1_000 * ONE_UNIT);
        h.transfer(0, 2, 2_000 * ONE_UNIT);
        h.notify(100 * ONE_UNIT);
        assert_eq!(h.harvest(0), 70 * ONE_UNIT);
        assert_eq!(h.harvest(1), 10 * ONE_UNIT);
        assert_eq!(h.harvest(2), 20 * ONE_UNIT);
    }

    #[test]
    fn test_transfer_preserves_pending_on_both_sides() {
        let mut h = Harness::new(2);
        h.notify(50 * ONE_UNIT);
        let pending_before = h.state.pending(h.holders[0].0, h.holders[0].1);
        // moving half the units after accrual moves no accrued revenue
        h.transfer(0, 1, OWNERSHIP_SUPPLY / 2);
        let p0 = h.state.pending(h.holders[0].0, h.holders[0].1);
        let p1 = h.state.pending(h.holders[1].0, h.holders[1].1);
        assert_eq!(p0, pending_before);
        assert_eq!(p1, 0);
    }

    #[test]
    fn test_recipient_earns_from_transfer_onward() {
        let mut h = Harness::new(2);
        h.notify(50 * ONE_UNIT);
        h.transfer(0, 1, OWNERSHIP_SUPPLY / 2);
        h.notify(50 * ONE_UNIT);
        assert_eq!(h.harvest(0), 75 * ONE_UNIT);
        assert_eq!(h.harvest(1), 25 * ONE_UNIT);
    }

    #[test]
    fn test_accrued_revenue_survives_selling_all_units() {
        let mut h = Harness::new(2);
        h.transfer(0, 1, OWNERSHIP_SUPPLY / 2);
        h.notify(10 * ONE_UNIT);
        // holder 1 sends everything back after accrual; the debt shift
        // pushes their debt negative, i.e. stored credit
        h.transfer(1, 0, OWNERSHIP_SUPPLY / 2);
        assert!(h.holders[1].1 < 0);
        assert_eq!(h.state.pending(h.holders[1].0, h.holders[1].1), 5 * ONE_UNIT);
        assert_eq!(h.harvest(1), 5 * ONE_UNIT);
        assert_eq!(h.harvest(0), 5 * ONE_UNIT);
    }

    #[test]
    fn test_total_assets_tracks_notified_revenue() {
        let mut h = Harness::new(1);
        let before = h.state.total_assets();
        h.notify(33 * ONE_UNIT);
        assert_eq!(h.state.total_assets() - before, 33 * ONE_UNIT);
    }

    #[test]
    fn test_harvest_twice_pays_nothing_more() {
        let mut h = Harness::new(1);
        h.notify(25 * ONE_UNIT);
        assert_eq!(h.harvest(0), 25 * ONE_UNIT);
        assert_eq!(h.harvest(0), 0);
    }

    #[test]
    fn test_invariant_over_interleaved_sequence() {
        let mut h = Harness::new(3);
        h.transfer(0, 1, 1_000 * ONE_UNIT);
        h.notify(17 * ONE_UNIT);
        h.transfer(0, 2, 2_000 * ONE_UNIT);
        h.notify(41 * ONE_UNIT);
        h.harvest(1);
        h.transfer(2, 1, 500 * ONE_UNIT);
        h.notify(9 * ONE_UNIT);
        h.harvest(0);
        h.harvest(1);
        h.harvest(2);
        // everyone settled; only dust remains
        assert!(h.vault <= Harness::DUST_BOUND);
    }
}
