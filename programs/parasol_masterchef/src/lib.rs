// programs/parasol_masterchef/src/lib.rs
//
// Parasol Masterchef Program
// ==========================
// Debt-based pro-rata reward distributor for pool investors:
// - Mirrors pool share balances (pool-only CPI)
// - Receives the instant-reward slice of every insurance purchase
// - Settles pending rewards on every share movement
// - Permissionless harvest to the investor's own token account

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("CHJ4Bdc9wqKy6pjSiC3URjs53iDQpn58MPeAgLQVqRW1");

#[program]
pub mod parasol_masterchef {
    use super::*;

    /// Create the masterchef mirror for a pool (registrar CPI)
    pub fn initialize_masterchef(ctx: Context<InitializeMasterchef>) -> Result<()> {
        instructions::initialize::initialize_masterchef(ctx)
    }

    /// Mirror a pool share deposit (pool CPI); settles pending first
    pub fn deposit_shares(ctx: Context<DepositShares>, amount: u64) -> Result<()> {
        instructions::shares::deposit_shares(ctx, amount)
    }

    /// Mirror a pool share withdrawal (pool CPI); settles pending first
    pub fn withdraw_shares(ctx: Context<WithdrawShares>, amount: u64) -> Result<()> {
        instructions::shares::withdraw_shares(ctx, amount)
    }

    /// Credit an instant-reward slice to the ledger (registrar CPI)
    pub fn notify_reward(ctx: Context<NotifyReward>, amount: u64) -> Result<()> {
        instructions::rewards::notify_reward(ctx, amount)
    }

    /// Pay out an investor's accrued reward
    pub fn harvest(ctx: Context<Harvest>) -> Result<()> {
        instructions::rewards::harvest(ctx)
    }
}
