// programs/parasol_ownership/src/events.rs

use anchor_lang::prelude::*;

/// Emitted when the ownership ledger is created for a pool
#[event]
pub struct OwnershipInitialized {
    pub pool: Pubkey,
    pub initial_holder: Pubkey,
    pub total_supply: u64,
    pub timestamp: i64,
}

/// Emitted when ownership units move between holders
#[event]
pub struct UnitsTransferred {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when the registrar distributes an owner revenue slice
#[event]
pub struct OwnerRevenueNotified {
    pub mint: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when a holder's accrued revenue is paid out
#[event]
pub struct OwnerRevenueHarvested {
    pub holder: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
