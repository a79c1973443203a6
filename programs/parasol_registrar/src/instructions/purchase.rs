// programs/parasol_registrar/src/instructions/purchase.rs
//
// Insurance Sales (Signature Path)
// ================================
// A trusted approver signs off the sale off-chain; the buyer lands the
// approval and the payment in one transaction. The price is split on the
// spot: factory fee to the factory owner, owner share to the ownership
// ledger, an instant-reward cut of the remainder to investors (when any
// exist), and the rest into the pool vault. No shares are minted by a
// sale; it simply raises the pool's asset balance.

use crate::errors::RegistrarError;
use crate::events::InsurancePurchased;
use crate::state::{
    compute_split, purchase_approval_digest, Insurance, InsuranceState, PoolInfo, PurchaseRuling,
    RegistrarConfig, RevenueSplit, UsedApprovalNonce,
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as tx_instructions;
use anchor_spl::token::{self, Token, TokenAccount};
use parasol_core::sigverify;
use parasol_core::Node;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct BuyInsuranceParams {
    pub node: Node,
    pub pool_node: Node,
    pub price: u64,
    pub expiration: i64,
    pub approver: Pubkey,
    pub nonce: u64,
    pub deadline: i64,
}

#[derive(Accounts)]
#[instruction(params: BuyInsuranceParams)]
pub struct BuyInsuranceWithSignature<'info> {
    #[account(
        seeds = [RegistrarConfig::SEED_PREFIX],
        bump = registrar_config.bump,
    )]
    pub registrar_config: Account<'info, RegistrarConfig>,

    #[account(
        seeds = [PoolInfo::SEED_PREFIX, params.pool_node.as_ref()],
        bump = pool_info.bump,
    )]
    pub pool_info: Account<'info, PoolInfo>,

    #[account(
        init_if_needed,
        payer = buyer,
        space = 8 + Insurance::INIT_SPACE,
        seeds = [Insurance::SEED_PREFIX, params.node.as_ref()],
        bump
    )]
    pub insurance: Account<'info, Insurance>,

    /// Existence of this account is the consumed-nonce bit; a replay
    /// fails at init
    #[account(
        init,
        payer = buyer,
        space = 8 + UsedApprovalNonce::INIT_SPACE,
        seeds = [
            UsedApprovalNonce::SEED_PREFIX,
            params.approver.as_ref(),
            &params.nonce.to_le_bytes()
        ],
        bump
    )]
    pub used_nonce: Account<'info, UsedApprovalNonce>,

    #[account(
        seeds = [
            parasol_pool::state::TrustedParty::SEED_PREFIX,
            pool_info.pool.as_ref(),
            params.approver.as_ref()
        ],
        bump = trusted.bump,
        seeds::program = parasol_pool::ID,
        constraint = trusted.enabled @ RegistrarError::UntrustedApprover
    )]
    pub trusted: Account<'info, parasol_pool::state::TrustedParty>,

    #[account(
        constraint = pool.key() == pool_info.pool @ RegistrarError::AccountMismatch
    )]
    pub pool: Account<'info, parasol_pool::state::Pool>,

    #[account(
        mut,
        constraint = pool_vault.key() == pool.vault @ RegistrarError::InvalidVault
    )]
    pub pool_vault: Account<'info, TokenAccount>,

    #[account(
        constraint = masterchef.key() == pool_info.masterchef @ RegistrarError::AccountMismatch
    )]
    pub masterchef: Account<'info, parasol_masterchef::state::Masterchef>,

    #[account(
        mut,
        constraint = masterchef_vault.key() == masterchef.reward_vault @ RegistrarError::InvalidVault
    )]
    pub masterchef_vault: Account<'info, TokenAccount>,

    /// CHECK: validated by the masterchef program in the notify CPI
    #[account(mut)]
    pub masterchef_reward_state: UncheckedAccount<'info>,

    #[account(
        constraint = ownership.key() == pool_info.ownership @ RegistrarError::AccountMismatch
    )]
    pub ownership: Account<'info, parasol_ownership::state::OwnershipConfig>,

    #[account(
        mut,
        constraint = ownership_vault.key() == ownership.reward_vault @ RegistrarError::InvalidVault
    )]
    pub ownership_vault: Account<'info, TokenAccount>,

    /// CHECK: validated by the ownership program in the notify CPI
    #[account(mut)]
    pub ownership_reward_state: UncheckedAccount<'info>,

    /// Factory owner's wallet for the factory slice
    #[account(
        mut,
        constraint = factory_token_account.owner == registrar_config.authority @ RegistrarError::OwnerMismatch,
        constraint = factory_token_account.mint == pool_info.asset_mint @ RegistrarError::MintMismatch
    )]
    pub factory_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = buyer_token_account.owner == buyer.key() @ RegistrarError::OwnerMismatch,
        constraint = buyer_token_account.mint == pool_info.asset_mint @ RegistrarError::MintMismatch
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    /// CHECK: policy record, created/updated by the pool program CPI
    #[account(mut)]
    pub policy: UncheckedAccount<'info>,

    /// CHECK: instructions sysvar, used to introspect the Ed25519
    /// approval placed before this instruction
    #[account(address = tx_instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    #[account(mut)]
    pub buyer: Signer<'info>,

    pub pool_program: Program<'info, parasol_pool::program::ParasolPool>,
    pub masterchef_program: Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    pub ownership_program: Program<'info, parasol_ownership::program::ParasolOwnership>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn buy_insurance_with_signature(
    ctx: Context<BuyInsuranceWithSignature>,
    params: BuyInsuranceParams,
) -> Result<()> {
    require!(params.price > 0, RegistrarError::ZeroPrice);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        !ctx.accounts.pool.is_expired(now),
        RegistrarError::PoolExpired
    );
    require!(params.expiration > now, RegistrarError::ExpirationInPast);
    require!(now <= params.deadline, RegistrarError::SignatureExpired);

    // A non-zero price marks a real previous record on this node
    if ctx.accounts.insurance.price > 0 {
        require!(
            ctx.accounts.insurance.can_replace(now),
            RegistrarError::AlreadyInsured
        );
    }

    let digest = purchase_approval_digest(
        &ctx.accounts.registrar_config.key(),
        &params.node,
        &params.pool_node,
        params.price,
        params.expiration,
        params.nonce,
        params.deadline,
    );
    require!(
        sigverify::preceding_ed25519_verifies(
            &ctx.accounts.instructions_sysvar,
            &params.approver.to_bytes(),
            &digest,
        ),
        RegistrarError::InvalidSignature
    );

    let used_nonce = &mut ctx.accounts.used_nonce;
    used_nonce.approver = params.approver;
    used_nonce.nonce = params.nonce;
    used_nonce.bump = ctx.bumps.used_nonce;

    // Split and move the payment, straight from the buyer
    let split = compute_split(
        params.price,
        ctx.accounts.pool_info.factory_fee_bps,
        ctx.accounts.pool_info.owner_share_bps,
        ctx.accounts.pool_info.instant_reward_bps,
        ctx.accounts.masterchef.total_shares > 0,
    );

    pay_from_buyer(&ctx, &ctx.accounts.factory_token_account, split.factory)?;
    pay_from_buyer(&ctx, &ctx.accounts.ownership_vault, split.owner)?;
    pay_from_buyer(&ctx, &ctx.accounts.masterchef_vault, split.masterchef)?;
    pay_from_buyer(&ctx, &ctx.accounts.pool_vault, split.pool)?;

    notify_distributors(
        &ctx.accounts.registrar_config,
        &ctx.accounts.masterchef,
        &ctx.accounts.masterchef_reward_state,
        &ctx.accounts.masterchef_program,
        &ctx.accounts.ownership,
        &ctx.accounts.ownership_reward_state,
        &ctx.accounts.ownership_program,
        &split,
    )?;

    register_policy(
        &ctx.accounts.registrar_config,
        &ctx.accounts.pool,
        &ctx.accounts.policy,
        &ctx.accounts.buyer,
        &ctx.accounts.pool_program,
        &ctx.accounts.system_program,
        params.node,
        ctx.accounts.buyer.key(),
        params.price,
        params.expiration,
    )?;

    let insurance = &mut ctx.accounts.insurance;
    insurance.node = params.node;
    insurance.pool_node = params.pool_node;
    insurance.buyer = ctx.accounts.buyer.key();
    insurance.price = params.price;
    insurance.expiration = params.expiration;
    insurance.state = InsuranceState::Active;
    insurance.dispute_id = 0;
    insurance.proxy = Pubkey::default();
    insurance.ruling = PurchaseRuling::None;
    insurance.approved_at = now;
    insurance.bump = ctx.bumps.insurance;

    emit!(InsurancePurchased {
        node: params.node,
        pool_node: params.pool_node,
        buyer: ctx.accounts.buyer.key(),
        price: params.price,
        expiration: params.expiration,
        factory_slice: split.factory,
        owner_slice: split.owner,
        masterchef_slice: split.masterchef,
        pool_slice: split.pool,
        via_arbitration: false,
        timestamp: now,
    });

    Ok(())
}

fn pay_from_buyer<'info>(
    ctx: &Context<BuyInsuranceWithSignature<'info>>,
    destination: &Account<'info, TokenAccount>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            token::Transfer {
                from: ctx.accounts.buyer_token_account.to_account_info(),
                to: destination.to_account_info(),
                authority: ctx.accounts.buyer.to_account_info(),
            },
        ),
        amount,
    )
}

/// Advance the reward accumulators for the slices just deposited into
/// their vaults. Shared by the signature path and dispute finalization.
#[allow(clippy::too_many_arguments)]
pub(crate) fn notify_distributors<'info>(
    registrar_config: &Account<'info, RegistrarConfig>,
    masterchef: &Account<'info, parasol_masterchef::state::Masterchef>,
    masterchef_reward_state: &UncheckedAccount<'info>,
    masterchef_program: &Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    ownership: &Account<'info, parasol_ownership::state::OwnershipConfig>,
    ownership_reward_state: &UncheckedAccount<'info>,
    ownership_program: &Program<'info, parasol_ownership::program::ParasolOwnership>,
    split: &RevenueSplit,
) -> Result<()> {
    let config_bump = registrar_config.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[RegistrarConfig::SEED_PREFIX, &[config_bump]]];

    if split.owner > 0 {
        parasol_ownership::cpi::notify_owner_revenue(
            CpiContext::new_with_signer(
                ownership_program.to_account_info(),
                parasol_ownership::cpi::accounts::NotifyOwnerRevenue {
                    ownership: ownership.to_account_info(),
                    reward_state: ownership_reward_state.to_account_info(),
                    registrar_authority: registrar_config.to_account_info(),
                },
                signer_seeds,
            ),
            split.owner,
        )?;
    }

    if split.masterchef > 0 {
        parasol_masterchef::cpi::notify_reward(
            CpiContext::new_with_signer(
                masterchef_program.to_account_info(),
                parasol_masterchef::cpi::accounts::NotifyReward {
                    masterchef: masterchef.to_account_info(),
                    reward_state: masterchef_reward_state.to_account_info(),
                    registrar_authority: registrar_config.to_account_info(),
                },
                signer_seeds,
            ),
            split.masterchef,
        )?;
    }

    Ok(())
}

/// Push the sold insurance into the pool so claims can be gated on it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn register_policy<'info>(
    registrar_config: &Account<'info, RegistrarConfig>,
    pool: &Account<'info, parasol_pool::state::Pool>,
    policy: &UncheckedAccount<'info>,
    payer: &Signer<'info>,
    pool_program: &Program<'info, parasol_pool::program::ParasolPool>,
    system_program: &Program<'info, System>,
    node: Node,
    buyer: Pubkey,
    price: u64,
    expiration: i64,
) -> Result<()> {
    let config_bump = registrar_config.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[RegistrarConfig::SEED_PREFIX, &[config_bump]]];

    parasol_pool::cpi::register_insurance(
        CpiContext::new_with_signer(
            pool_program.to_account_info(),
            parasol_pool::cpi::accounts::RegisterInsurance {
                pool: pool.to_account_info(),
                policy: policy.to_account_info(),
                registrar: registrar_config.to_account_info(),
                payer: payer.to_account_info(),
                system_program: system_program.to_account_info(),
            },
            signer_seeds,
        ),
        parasol_pool::instructions::RegisterInsuranceParams {
            node,
            buyer,
            price,
            expiration,
        },
    )
}
