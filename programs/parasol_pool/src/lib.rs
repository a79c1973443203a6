// programs/parasol_pool/src/lib.rs
//
// Parasol Pool Program
// ====================
// The share-accounting vault and claim ledger:
// - Investor deposits mint shares 1:1; purchases fund the vault without
//   minting, so the share ratio carries profit and loss
// - Redemption fee applies before expiration only; loss is passed through
//   by ratio; after expiration payout is pure ratio
// - Claims pay out through a signed approval or a two-phase arbitration
//   flow and never touch share supply
// - Share movements are mirrored into the masterchef reward ledger by CPI

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("J65pg6g7caJvSvfGBsuwzzYiyxR1EJePP1NGuaPqRK6C");

#[program]
pub mod parasol_pool {
    use super::*;

    // ==================== REGISTRAR SURFACE ====================

    /// Create a pool (registrar CPI, part of deploy)
    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        params: InitializePoolParams,
    ) -> Result<()> {
        instructions::initialize::initialize_pool(ctx, params)
    }

    /// Record a purchased insurance (registrar CPI)
    pub fn register_insurance(
        ctx: Context<RegisterInsurance>,
        params: RegisterInsuranceParams,
    ) -> Result<()> {
        instructions::initialize::register_insurance(ctx, params)
    }

    /// Manage the approver / arbitrable-proxy allowlist (registrar CPI)
    pub fn set_trusted_party(
        ctx: Context<SetTrustedParty>,
        params: SetTrustedPartyParams,
    ) -> Result<()> {
        instructions::initialize::set_trusted_party(ctx, params)
    }

    // ==================== INVESTOR SURFACE ====================

    /// Deposit assets for shares, minted 1:1
    pub fn deposit(ctx: Context<Deposit>, assets: u64) -> Result<()> {
        instructions::vault::deposit(ctx, assets)
    }

    /// Redeem shares for assets at the current preview
    pub fn redeem(ctx: Context<Redeem>, shares: u64) -> Result<()> {
        instructions::vault::redeem(ctx, shares)
    }

    // ==================== CLAIMS ====================

    /// Finalize a claim under a trusted approver's signed approval
    pub fn claim_with_signature(
        ctx: Context<ClaimWithSignature>,
        params: ClaimWithSignatureParams,
    ) -> Result<()> {
        instructions::claims::claim_with_signature(ctx, params)
    }

    /// Raise a claim dispute bound to a trusted arbitrable proxy
    pub fn claim_with_arbitration(
        ctx: Context<ClaimWithArbitration>,
        params: ClaimWithArbitrationParams,
    ) -> Result<()> {
        instructions::claims::claim_with_arbitration(ctx, params)
    }

    /// Post the external arbitrator's ruling (trusted proxy only)
    pub fn record_claim_ruling(
        ctx: Context<RecordClaimRuling>,
        params: RecordClaimRulingParams,
    ) -> Result<()> {
        instructions::claims::record_claim_ruling(ctx, params)
    }

    /// Execute a ruled dispute exactly once
    pub fn claim_finalize(ctx: Context<ClaimFinalize>, params: ClaimFinalizeParams) -> Result<()> {
        instructions::claims::claim_finalize(ctx, params)
    }
}
