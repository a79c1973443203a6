// programs/parasol_ownership/src/lib.rs
//
// Parasol Ownership Program
// =========================
// Fixed-supply ownership units representing claims on pool owner revenue:
// - Full supply minted to the pool deployer, freely transferable
// - Owner slice of every insurance purchase distributed pro-rata
// - Transfers shift reward debt so pending revenue is never lost
// - Permissionless harvest to the holder's own token account

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("7b2bnKcX2jBZ5VoV9HE7i1HWsFLTUbsLDNLuSjLBsnpo");

#[program]
pub mod parasol_ownership {
    use super::*;

    /// Create the ownership ledger for a pool (registrar CPI)
    pub fn initialize_ownership(ctx: Context<InitializeOwnership>) -> Result<()> {
        instructions::initialize::initialize_ownership(ctx)
    }

    /// Move ownership units between holders
    pub fn transfer_units(ctx: Context<TransferUnits>, amount: u64) -> Result<()> {
        instructions::transfer::transfer_units(ctx, amount)
    }

    /// Credit an owner revenue slice to the ledger (registrar CPI)
    pub fn notify_owner_revenue(ctx: Context<NotifyOwnerRevenue>, amount: u64) -> Result<()> {
        instructions::rewards::notify_owner_revenue(ctx, amount)
    }

    /// Pay out a holder's accrued revenue
    pub fn harvest_owner_revenue(ctx: Context<HarvestOwnerRevenue>) -> Result<()> {
        instructions::rewards::harvest_owner_revenue(ctx)
    }
}
