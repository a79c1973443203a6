// programs/parasol_pool/src/events.rs

use crate::state::Ruling;
use anchor_lang::prelude::*;
use parasol_core::Node;

/// Emitted when a pool is created
#[event]
pub struct PoolInitialized {
    pub node: Node,
    pub owner: Pubkey,
    pub asset_mint: Pubkey,
    pub expiration: i64,
    pub withdrawal_fee_bps: u16,
    pub timestamp: i64,
}

/// Emitted when an investor deposits assets for shares
#[event]
pub struct Deposited {
    pub investor: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Emitted when an investor redeems shares for assets
#[event]
pub struct Redeemed {
    pub investor: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub total_shares: u64,
    pub after_expiration: bool,
    pub timestamp: i64,
}

/// Emitted when the registrar registers a purchased insurance
#[event]
pub struct InsuranceRegistered {
    pub node: Node,
    pub buyer: Pubkey,
    pub price: u64,
    pub expiration: i64,
    pub timestamp: i64,
}

/// Emitted when the allowlist changes
#[event]
pub struct TrustedPartySet {
    pub party: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

/// Emitted when a claim pays out (either path)
#[event]
pub struct ClaimFinalized {
    pub node: Node,
    pub claim_id: u64,
    pub recipient: Pubkey,
    pub amount: u64,
    pub via_arbitration: bool,
    pub timestamp: i64,
}

/// Emitted when an arbitration claim is raised
#[event]
pub struct ClaimDisputeRaised {
    pub node: Node,
    pub claim_id: u64,
    pub dispute_id: u64,
    pub proxy: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when the arbitrable proxy records a ruling
#[event]
pub struct ClaimRulingRecorded {
    pub node: Node,
    pub claim_id: u64,
    pub ruling: Ruling,
    pub timestamp: i64,
}

/// Emitted when a disputed claim is rejected on finalize
#[event]
pub struct ClaimRejected {
    pub node: Node,
    pub claim_id: u64,
    pub timestamp: i64,
}
