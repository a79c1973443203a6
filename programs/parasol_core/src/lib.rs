// programs/parasol_core/src/lib.rs
//
// Parasol Core - Shared Constants and Utilities
// =============================================
//
// This module provides:
// - Basis-point arithmetic used by the fee engine and revenue splitter
// - Fixed-point helpers for the accumulator-and-debt reward ledgers
// - The `Node` namehash type identifying insured resources
// - Ed25519 pre-instruction introspection for signed approvals
// - Cross-program shared constants

use anchor_lang::prelude::*;

declare_id!("DHGQUHAXRvEiHA4J3JhxKdSLkqvyKPyZYaciLfMA5yok");

// =============================================================================
// SUBMODULES
// =============================================================================

/// Basis-point and fixed-point arithmetic
pub mod math;

/// Ed25519 signed-approval verification
pub mod sigverify;

pub use math::{apply_fee, bps_of, gross_up, mul_div, REWARD_SCALE};

// =============================================================================
// SHARED TYPES
// =============================================================================

/// A namehash identifying a named resource. Pools, insurances and claims
/// are all keyed by a node.
pub type Node = [u8; 32];

// =============================================================================
// PROTOCOL CONSTANTS
// =============================================================================

/// Denominator for all basis-point rates (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Standard token decimals used by pool shares and ownership units
pub const UNIT_DECIMALS: u8 = 9;

/// One whole unit at standard decimals
pub const ONE_UNIT: u64 = 1_000_000_000;

/// Fixed ownership supply minted to a pool deployer: 10,000 units.
/// The owner revenue ledger distributes pro-rata over this supply.
pub const OWNERSHIP_SUPPLY: u64 = 10_000 * ONE_UNIT;
