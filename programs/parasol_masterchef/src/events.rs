// programs/parasol_masterchef/src/events.rs

use anchor_lang::prelude::*;

/// Emitted when a masterchef instance is created for a pool
#[event]
pub struct MasterchefInitialized {
    pub pool: Pubkey,
    pub asset_mint: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the pool mirrors a share deposit
#[event]
pub struct SharesDeposited {
    pub investor: Pubkey,
    pub amount: u64,
    pub total_shares: u64,
    pub harvested: u64,
    pub timestamp: i64,
}

/// Emitted when the pool mirrors a share withdrawal
#[event]
pub struct SharesWithdrawn {
    pub investor: Pubkey,
    pub amount: u64,
    pub total_shares: u64,
    pub harvested: u64,
    pub timestamp: i64,
}

/// Emitted when the registrar distributes an instant reward slice
#[event]
pub struct RewardNotified {
    pub mint: Pubkey,
    pub amount: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Emitted when an investor's pending reward is paid out
#[event]
pub struct RewardHarvested {
    pub investor: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
