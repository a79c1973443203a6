// programs/parasol_registrar/src/events.rs

use crate::state::PurchaseRuling;
use anchor_lang::prelude::*;
use parasol_core::Node;

/// Emitted when the registrar is initialized
#[event]
pub struct RegistrarInitialized {
    pub authority: Pubkey,
    pub factory_fee_bps: u16,
    pub timestamp: i64,
}

/// Emitted when a pool (plus masterchef and ownership ledger) is deployed
#[event]
pub struct PoolDeployed {
    pub node: Node,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub masterchef: Pubkey,
    pub ownership: Pubkey,
    pub asset_mint: Pubkey,
    pub owner_share_bps: u16,
    pub withdrawal_fee_bps: u16,
    pub instant_reward_bps: u16,
    pub expiration: i64,
    pub timestamp: i64,
}

/// Emitted when a node owner flips an arbitrable proxy
#[event]
pub struct TrustedProxySet {
    pub node: Node,
    pub party: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

/// Emitted when an insurance sale lands (either path)
#[event]
pub struct InsurancePurchased {
    pub node: Node,
    pub pool_node: Node,
    pub buyer: Pubkey,
    pub price: u64,
    pub expiration: i64,
    pub factory_slice: u64,
    pub owner_slice: u64,
    pub masterchef_slice: u64,
    pub pool_slice: u64,
    pub via_arbitration: bool,
    pub timestamp: i64,
}

/// Emitted when an arbitration purchase is raised
#[event]
pub struct PurchaseDisputeRaised {
    pub node: Node,
    pub pool_node: Node,
    pub buyer: Pubkey,
    pub price: u64,
    pub dispute_id: u64,
    pub proxy: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the arbitrable proxy records a purchase ruling
#[event]
pub struct PurchaseRulingRecorded {
    pub node: Node,
    pub dispute_id: u64,
    pub ruling: PurchaseRuling,
    pub timestamp: i64,
}

/// Emitted when a disputed purchase is rejected and refunded
#[event]
pub struct PurchaseRejected {
    pub node: Node,
    pub buyer: Pubkey,
    pub refunded: u64,
    pub timestamp: i64,
}
