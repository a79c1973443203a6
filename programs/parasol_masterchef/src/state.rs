// programs/parasol_masterchef/src/state.rs

use anchor_lang::prelude::*;
use parasol_core::math::{entitlement, from_scaled, REWARD_SCALE};

// =============================================================================
// MASTERCHEF STATE
// =============================================================================
// Debt-based pro-rata reward accounting for pool investors. Shares held here
// always mirror the pool's share supply: the pool deposits/withdraws shares
// on behalf of investors via CPI, and the registrar notifies the instant
// reward slice of every insurance purchase.

/// Masterchef instance serving one insurance pool
/// PDA seeds: ["masterchef", pool]
#[account]
#[derive(InitSpace)]
pub struct Masterchef {
    /// Pool PDA allowed to move shares (CPI signer)
    pub pool: Pubkey,

    /// Registrar config PDA allowed to notify rewards (CPI signer)
    pub registrar: Pubkey,

    /// Reward asset mint (the pool's asset)
    pub asset_mint: Pubkey,

    /// Token account holding undistributed rewards
    pub reward_vault: Pubkey,

    /// Total shares across all investors; mirrors pool.total_shares
    pub total_shares: u64,

    /// Bump seed
    pub bump: u8,
}

impl Masterchef {
    pub const SEED_PREFIX: &'static [u8] = b"masterchef";
    pub const VAULT_SEED: &'static [u8] = b"mc_vault";
}

/// Per-asset reward accumulator
/// PDA seeds: ["reward_state", masterchef, mint]
#[account]
#[derive(InitSpace)]
pub struct RewardState {
    /// Asset this accumulator distributes
    pub mint: Pubkey,

    /// Reward per share, REWARD_SCALE fixed-point
    pub acc_per_share: u128,

    /// Total entitlement outstanding plus harvested, scaled.
    /// Maintained so that `total_entitled - sum(debt)` equals the
    /// undistributed reward balance at all times.
    pub total_entitled: u128,

    /// Rewards paid out all-time (token units)
    pub total_harvested: u64,

    /// Bump seed
    pub bump: u8,
}

impl RewardState {
    pub const SEED_PREFIX: &'static [u8] = b"reward_state";

    /// Accrued-but-unclaimed reward for an investor position.
    pub fn pending(&self, shares: u64, debt: u128) -> u64 {
        from_scaled(entitlement(shares, self.acc_per_share).saturating_sub(debt))
    }

    /// Distribute `amount` pro-rata over `total_shares` current shares.
    /// Callers must reject a notify against an empty ledger.
    pub fn notify(&mut self, amount: u64, total_shares: u64) {
        if total_shares == 0 {
            return;
        }
        let delta = (amount as u128)
            .saturating_mul(REWARD_SCALE)
            .checked_div(total_shares as u128)
            .unwrap_or(0);
        self.acc_per_share = self.acc_per_share.saturating_add(delta);
        self.total_entitled = self
            .total_entitled
            .saturating_add(delta.saturating_mul(total_shares as u128));
    }

    /// Settle a position against the accumulator: returns the payout and
    /// the new debt. Leaves the position with zero pending.
    pub fn settle(&mut self, shares: u64, debt: u128) -> (u64, u128) {
        let entitled = entitlement(shares, self.acc_per_share);
        let payout = from_scaled(entitled.saturating_sub(debt));
        self.total_harvested = self.total_harvested.saturating_add(payout);
        (payout, entitled)
    }

    /// Account for a share increase: new shares carry no claim on rewards
    /// accrued before they existed.
    pub fn on_shares_added(&mut self, added: u64, debt: u128) -> u128 {
        let delta = entitlement(added, self.acc_per_share);
        self.total_entitled = self.total_entitled.saturating_add(delta);
        debt.saturating_add(delta)
    }

    /// Account for a share decrease after a settle.
    pub fn on_shares_removed(&mut self, removed: u64, debt: u128) -> u128 {
        let delta = entitlement(removed, self.acc_per_share);
        self.total_entitled = self.total_entitled.saturating_sub(delta);
        debt.saturating_sub(delta)
    }

    /// `totalAssets` surface: total entitlement in token units.
    pub fn total_assets(&self) -> u64 {
        from_scaled(self.total_entitled)
    }
}

/// Investor share mirror
/// PDA seeds: ["investor", masterchef, owner]
#[account]
#[derive(InitSpace)]
pub struct InvestorAccount {
    /// Investor wallet
    pub owner: Pubkey,

    /// Shares mirrored from the pool
    pub shares: u64,

    /// Bump seed
    pub bump: u8,
}

impl InvestorAccount {
    pub const SEED_PREFIX: &'static [u8] = b"investor";
}

/// Per (asset, investor) reward debt
/// PDA seeds: ["debt", masterchef, mint, owner]
#[account]
#[derive(InitSpace)]
pub struct InvestorDebt {
    /// Investor wallet
    pub owner: Pubkey,

    /// Asset mint
    pub mint: Pubkey,

    /// Debt against the accumulator, REWARD_SCALE fixed-point
    pub debt: u128,

    /// Bump seed
    pub bump: u8,
}

impl InvestorDebt {
    pub const SEED_PREFIX: &'static [u8] = b"debt";
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parasol_core::ONE_UNIT;

    // Minimal in-memory mirror of the instruction flow: a vault balance,
    // a set of positions, and the ledger invariant checked after each step.
    struct Harness {
        state: RewardState,
        total_shares: u64,
        vault: u64,
        positions: Vec<(u64, u128)>, // (shares, debt)
    }

    impl Harness {
        fn new(investors: usize) -> Self {
            Harness {
                state: RewardState {
                    mint: Pubkey::default(),
                    acc_per_share: 0,
                    total_entitled: 0,
                    total_harvested: 0,
                    bump: 255,
                },
                total_shares: 0,
                vault: 0,
                positions: vec![(0, 0); investors],
            }
        }

        fn notify(&mut self, amount: u64) {
            assert!(self.total_shares > 0, "notify against empty ledger");
            self.state.notify(amount, self.total_shares);
            self.vault += amount;
            self.assert_invariant();
        }

        fn deposit(&mut self, i: usize, amount: u64) -> u64 {
            let (shares, debt) = self.positions[i];
            let (payout, settled) = self.state.settle(shares, debt);
            self.vault -= payout;
            let new_debt = self.state.on_shares_added(amount, settled);
            self.positions[i] = (shares + amount, new_debt);
            self.total_shares += amount;
            self.assert_invariant();
            payout
        }

        fn withdraw(&mut self, i: usize, amount: u64) -> u64 {
            let (shares, debt) = self.positions[i];
            assert!(shares >= amount);
            let (payout, settled) = self.state.settle(shares, debt);
            self.vault -= payout;
            let new_debt = self.state.on_shares_removed(amount, settled);
            self.positions[i] = (shares - amount, new_debt);
            self.total_shares -= amount;
            self.assert_invariant();
            payout
        }

        fn harvest(&mut self, i: usize) -> u64 {
            let (shares, debt) = self.positions[i];
            let (payout, settled) = self.state.settle(shares, debt);
            self.vault -= payout;
            self.positions[i] = (shares, settled);
            self.assert_invariant();
            payout
        }

        // total(asset) - sum(debt) == vault balance, up to fixed-point dust
        // (each settle and notify may strand < 1 raw unit in the vault)
        const DUST_BOUND: u64 = 64;

        fn assert_invariant(&self) {
            let debt_sum: u128 = self.positions.iter().map(|(_, d)| d).sum();
            let outstanding = from_scaled(self.state.total_entitled.saturating_sub(debt_sum));
            assert!(
                self.vault >= outstanding && self.vault - outstanding <= Self::DUST_BOUND,
                "ledger invariant broken: vault={} outstanding={}",
                self.vault,
                outstanding
            );
        }
    }

    #[test]
    fn test_single_investor_full_cycle() {
        let mut h = Harness::new(1);
        h.deposit(0, 400 * ONE_UNIT);
        h.notify(60 * ONE_UNIT);
        assert_eq!(h.state.pending(h.positions[0].0, h.positions[0].1), 60 * ONE_UNIT);
        let paid = h.harvest(0);
        assert_eq!(paid, 60 * ONE_UNIT);
        assert_eq!(h.state.pending(h.positions[0].0, h.positions[0].1), 0);
    }

    #[test]
    fn test_pro_rata_split_between_investors() {
        let mut h = Harness::new(2);
        h.deposit(0, 300 * ONE_UNIT);
        h.deposit(1, 100 * ONE_UNIT);
        h.notify(80 * ONE_UNIT);
        assert_eq!(h.harvest(0), 60 * ONE_UNIT);
        assert_eq!(h.harvest(1), 20 * ONE_UNIT);
    }

    #[test]
    fn test_late_depositor_earns_nothing_retroactively() {
        let mut h = Harness::new(2);
        h.deposit(0, 100 * ONE_UNIT);
        h.notify(50 * ONE_UNIT);
        h.deposit(1, 100 * ONE_UNIT);
        assert_eq!(h.state.pending(h.positions[1].0, h.positions[1].1), 0);
        h.notify(50 * ONE_UNIT);
        assert_eq!(h.harvest(0), 75 * ONE_UNIT);
        assert_eq!(h.harvest(1), 25 * ONE_UNIT);
    }

    #[test]
    fn test_deposit_harvests_pending_first() {
        let mut h = Harness::new(1);
        h.deposit(0, 100 * ONE_UNIT);
        h.notify(30 * ONE_UNIT);
        // the second deposit pays out the accrued 30 before mirroring shares
        let paid = h.deposit(0, 100 * ONE_UNIT);
        assert_eq!(paid, 30 * ONE_UNIT);
        assert_eq!(h.state.pending(h.positions[0].0, h.positions[0].1), 0);
    }

    #[test]
    fn test_withdraw_pays_accrued_rewards() {
        let mut h = Harness::new(2);
        h.deposit(0, 100 * ONE_UNIT);
        h.deposit(1, 100 * ONE_UNIT);
        h.notify(40 * ONE_UNIT);
        let paid = h.withdraw(0, 100 * ONE_UNIT);
        assert_eq!(paid, 20 * ONE_UNIT);
        assert_eq!(h.total_shares, 100 * ONE_UNIT);
        // remaining investor keeps an intact claim
        assert_eq!(h.harvest(1), 20 * ONE_UNIT);
    }

    #[test]
    fn test_total_assets_tracks_notified_amounts() {
        let mut h = Harness::new(2);
        h.deposit(0, 250 * ONE_UNIT);
        let before = h.state.total_assets();
        h.notify(33 * ONE_UNIT);
        assert_eq!(h.state.total_assets() - before, 33 * ONE_UNIT);
        // share changes keep total/debt in lockstep, not the delta surface
        h.deposit(1, 50 * ONE_UNIT);
        h.notify(11 * ONE_UNIT);
        let debt_sum: u128 = h.positions.iter().map(|(_, d)| d).sum();
        let outstanding = from_scaled(h.state.total_entitled.saturating_sub(debt_sum));
        assert!(h.vault - outstanding <= Harness::DUST_BOUND);
    }

    #[test]
    fn test_invariant_over_interleaved_sequence() {
        let mut h = Harness::new(4);
        h.deposit(0, 400 * ONE_UNIT);
        h.notify(10 * ONE_UNIT);
        h.deposit(1, 100 * ONE_UNIT);
        h.notify(25 * ONE_UNIT);
        h.withdraw(0, 200 * ONE_UNIT);
        h.deposit(2, 200 * ONE_UNIT);
        h.notify(7 * ONE_UNIT);
        h.harvest(1);
        h.deposit(3, 50 * ONE_UNIT);
        h.notify(13 * ONE_UNIT);
        h.withdraw(2, 200 * ONE_UNIT);
        h.withdraw(1, 100 * ONE_UNIT);
        h.withdraw(3, 50 * ONE_UNIT);
        h.withdraw(0, 200 * ONE_UNIT);
        assert_eq!(h.total_shares, 0);
        // every position settled; vault retains only fixed-point dust
        assert!(h.vault <= Harness::DUST_BOUND);
    }

    #[test]
    fn test_notify_with_no_shares_is_inert() {
        let mut state = RewardState {
            mint: Pubkey::default(),
            acc_per_share: 0,
            total_entitled: 0,
            total_harvested: 0,
            bump: 255,
        };
        state.notify(1_000_000, 0);
        assert_eq!(state.acc_per_share, 0);
        assert_eq!(state.total_entitled, 0);
    }

    #[test]
    fn test_pending_is_zero_right_after_settle() {
        let mut h = Harness::new(1);
        h.deposit(0, 123 * ONE_UNIT);
        h.notify(77 * ONE_UNIT);
        h.harvest(0);
        assert_eq!(h.state.pending(h.positions[0].0, h.positions[0].1), 0);
    }
}
