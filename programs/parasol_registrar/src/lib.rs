// programs/parasol_registrar/src/lib.rs
//
// Parasol Registrar Program
// =========================
// The factory and sales desk for insurance pools:
// - Deploys one pool + masterchef + ownership ledger per node
// - Sells insurances against deployed pools, with a signed approval or
//   through a two-phase arbitration flow with escrow
// - Splits every sale between factory, pool owners, investor instant
//   rewards and the pool vault
// - Lets node owners manage the trusted arbitrable proxy allowlist

use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("HynmZCjBZ5eHXL48Z7db6CwiCjh6KMXnCHXrsP11Vzdd");

#[program]
pub mod parasol_registrar {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Initialize the registrar (factory owner + fee)
    pub fn initialize_registrar(
        ctx: Context<InitializeRegistrar>,
        params: InitializeRegistrarParams,
    ) -> Result<()> {
        instructions::initialize::initialize_registrar(ctx, params)
    }

    /// Deploy a node's pool, masterchef and ownership ledger
    pub fn deploy_pool(ctx: Context<DeployPool>, params: DeployPoolParams) -> Result<()> {
        instructions::deploy::deploy_pool(ctx, params)
    }

    /// Manage a pool's trusted approver / arbitrable proxy allowlist
    pub fn set_trusted_arbitrable_proxy(
        ctx: Context<SetTrustedArbitrableProxy>,
        params: SetTrustedProxyParams,
    ) -> Result<()> {
        instructions::deploy::set_trusted_arbitrable_proxy(ctx, params)
    }

    // ==================== SALES ====================

    /// Buy an insurance under a trusted approver's signed approval
    pub fn buy_insurance_with_signature(
        ctx: Context<BuyInsuranceWithSignature>,
        params: BuyInsuranceParams,
    ) -> Result<()> {
        instructions::purchase::buy_insurance_with_signature(ctx, params)
    }

    /// Escrow a purchase and raise a dispute with a trusted proxy
    pub fn buy_insurance_with_arbitration(
        ctx: Context<BuyInsuranceWithArbitration>,
        params: BuyInsuranceWithArbitrationParams,
    ) -> Result<()> {
        instructions::arbitration::buy_insurance_with_arbitration(ctx, params)
    }

    /// Post the external arbitrator's ruling (trusted proxy only)
    pub fn record_purchase_ruling(
        ctx: Context<RecordPurchaseRuling>,
        params: RecordPurchaseRulingParams,
    ) -> Result<()> {
        instructions::arbitration::record_purchase_ruling(ctx, params)
    }

    /// Execute a ruled purchase exactly once
    pub fn buy_insurance_finalize(
        ctx: Context<BuyInsuranceFinalize>,
        params: BuyInsuranceFinalizeParams,
    ) -> Result<()> {
        instructions::arbitration::buy_insurance_finalize(ctx, params)
    }
}
