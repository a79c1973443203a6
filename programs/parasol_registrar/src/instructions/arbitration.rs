// programs/parasol_registrar/src/instructions/arbitration.rs
//
// Insurance Sales (Arbitration Path)
// ==================================
// Two-phase: the buyer escrows the price and raises a dispute bound to a
// trusted arbitrable proxy; once the proxy posts the external
// arbitrator's ruling, anyone may finalize exactly once. A favorable
// ruling executes the same revenue split as the signature path, from
// escrow; an unfavorable ruling refunds the buyer.

use crate::errors::RegistrarError;
use crate::events::{InsurancePurchased, PurchaseDisputeRaised, PurchaseRejected, PurchaseRulingRecorded};
use crate::instructions::purchase::{notify_distributors, register_policy};
use crate::state::{
    compute_split, Insurance, InsuranceState, PoolInfo, PurchaseRuling, RegistrarConfig,
};
use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount};
use parasol_core::Node;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct BuyInsuranceWithArbitrationParams {
    pub node: Node,
    pub pool_node: Node,
    pub price: u64,
    pub expiration: i64,
    pub proxy: Pubkey,
}

#[derive(Accounts)]
#[instruction(params: BuyInsuranceWithArbitrationParams)]
pub struct BuyInsuranceWithArbitration<'info> {
    #[account(
        mut,
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

    #[account(
        seeds = [
            parasol_pool::state::TrustedParty::SEED_PREFIX,
            pool_info.pool.as_ref(),
            params.proxy.as_ref()
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
        constraint = asset_mint.key() == pool_info.asset_mint @ RegistrarError::MintMismatch
    )]
    pub asset_mint: Account<'info, Mint>,

    /// Escrow holding the price while the dispute is pending
    #[account(
        init_if_needed,
        payer = buyer,
        seeds = [Insurance::ESCROW_SEED, insurance.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = registrar_config,
    )]
    pub escrow: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = buyer_token_account.owner == buyer.key() @ RegistrarError::OwnerMismatch,
        constraint = buyer_token_account.mint == pool_info.asset_mint @ RegistrarError::MintMismatch
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub buyer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn buy_insurance_with_arbitration(
    ctx: Context<BuyInsuranceWithArbitration>,
    params: BuyInsuranceWithArbitrationParams,
) -> Result<()> {
    require!(params.price > 0, RegistrarError::ZeroPrice);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        !ctx.accounts.pool.is_expired(now),
        RegistrarError::PoolExpired
    );
    require!(params.expiration > now, RegistrarError::ExpirationInPast);

    if ctx.accounts.insurance.price > 0 {
        require!(
            ctx.accounts.insurance.can_replace(now),
            RegistrarError::AlreadyInsured
        );
    }

    // Escrow the full price until the ruling lands
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            token::Transfer {
                from: ctx.accounts.buyer_token_account.to_account_info(),
                to: ctx.accounts.escrow.to_account_info(),
                authority: ctx.accounts.buyer.to_account_info(),
            },
        ),
        params.price,
    )?;

    let config = &mut ctx.accounts.registrar_config;
    let dispute_id = config.next_dispute_id;
    config.next_dispute_id = config.next_dispute_id.saturating_add(1);

    let insurance = &mut ctx.accounts.insurance;
    insurance.node = params.node;
    insurance.pool_node = params.pool_node;
    insurance.buyer = ctx.accounts.buyer.key();
    insurance.price = params.price;
    insurance.expiration = params.expiration;
    insurance.state = InsuranceState::PendingDispute;
    insurance.dispute_id = dispute_id;
    insurance.proxy = params.proxy;
    insurance.ruling = PurchaseRuling::None;
    insurance.approved_at = 0;
    insurance.bump = ctx.bumps.insurance;

    emit!(PurchaseDisputeRaised {
        node: params.node,
        pool_node: params.pool_node,
        buyer: ctx.accounts.buyer.key(),
        price: params.price,
        dispute_id,
        proxy: params.proxy,
        timestamp: now,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct RecordPurchaseRulingParams {
    pub node: Node,
    pub approve: bool,
}

/// The trusted arbitrable proxy posts the external arbitrator's ruling.
#[derive(Accounts)]
#[instruction(params: RecordPurchaseRulingParams)]
pub struct RecordPurchaseRuling<'info> {
    #[account(
        mut,
        seeds = [Insurance::SEED_PREFIX, params.node.as_ref()],
        bump = insurance.bump,
    )]
    pub insurance: Account<'info, Insurance>,

    #[account(
        constraint = proxy.key() == insurance.proxy @ RegistrarError::Unauthorised
    )]
    pub proxy: Signer<'info>,
}

pub fn record_purchase_ruling(
    ctx: Context<RecordPurchaseRuling>,
    params: RecordPurchaseRulingParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let insurance = &mut ctx.accounts.insurance;

    require!(insurance.can_rule(), RegistrarError::DisputeAlreadyResolved);

    insurance.ruling = if params.approve {
        PurchaseRuling::Approved
    } else {
        PurchaseRuling::Rejected
    };

    emit!(PurchaseRulingRecorded {
        node: insurance.node,
        dispute_id: insurance.dispute_id,
        ruling: insurance.ruling,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct BuyInsuranceFinalizeParams {
    pub node: Node,
}

#[derive(Accounts)]
#[instruction(params: BuyInsuranceFinalizeParams)]
pub struct BuyInsuranceFinalize<'info> {
    #[account(
        seeds = [RegistrarConfig::SEED_PREFIX],
        bump = registrar_config.bump,
    )]
    pub registrar_config: Account<'info, RegistrarConfig>,

    #[account(
        mut,
        seeds = [Insurance::SEED_PREFIX, params.node.as_ref()],
        bump = insurance.bump,
    )]
    pub insurance: Account<'info, Insurance>,

    #[account(
        seeds = [PoolInfo::SEED_PREFIX, insurance.pool_node.as_ref()],
        bump = pool_info.bump,
    )]
    pub pool_info: Account<'info, PoolInfo>,

    #[account(
        mut,
        seeds = [Insurance::ESCROW_SEED, insurance.key().as_ref()],
        bump,
    )]
    pub escrow: Account<'info, TokenAccount>,

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

    /// Refund destination on an unfavorable ruling
    #[account(
        mut,
        constraint = buyer_token_account.owner == insurance.buyer @ RegistrarError::OwnerMismatch,
        constraint = buyer_token_account.mint == pool_info.asset_mint @ RegistrarError::MintMismatch
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    /// CHECK: policy record, created/updated by the pool program CPI
    #[account(mut)]
    pub policy: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub pool_program: Program<'info, parasol_pool::program::ParasolPool>,
    pub masterchef_program: Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    pub ownership_program: Program<'info, parasol_ownership::program::ParasolOwnership>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn buy_insurance_finalize(
    ctx: Context<BuyInsuranceFinalize>,
    params: BuyInsuranceFinalizeParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    {
        let insurance = &ctx.accounts.insurance;
        require!(
            insurance.state == InsuranceState::PendingDispute,
            RegistrarError::AlreadyFinalized
        );
        require!(
            insurance.ruling != PurchaseRuling::None,
            RegistrarError::RulingNotGiven
        );
    }

    let price = ctx.accounts.insurance.price;

    if ctx.accounts.insurance.ruling == PurchaseRuling::Approved {
        let split = compute_split(
            price,
            ctx.accounts.pool_info.factory_fee_bps,
            ctx.accounts.pool_info.owner_share_bps,
            ctx.accounts.pool_info.instant_reward_bps,
            ctx.accounts.masterchef.total_shares > 0,
        );

        pay_from_escrow(&ctx, &ctx.accounts.factory_token_account, split.factory)?;
        pay_from_escrow(&ctx, &ctx.accounts.ownership_vault, split.owner)?;
        pay_from_escrow(&ctx, &ctx.accounts.masterchef_vault, split.masterchef)?;
        pay_from_escrow(&ctx, &ctx.accounts.pool_vault, split.pool)?;

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

        let (node, buyer, expiration) = {
            let insurance = &ctx.accounts.insurance;
            (insurance.node, insurance.buyer, insurance.expiration)
        };
        register_policy(
            &ctx.accounts.registrar_config,
            &ctx.accounts.pool,
            &ctx.accounts.policy,
            &ctx.accounts.payer,
            &ctx.accounts.pool_program,
            &ctx.accounts.system_program,
            node,
            buyer,
            price,
            expiration,
        )?;

        let insurance = &mut ctx.accounts.insurance;
        insurance.state = InsuranceState::Active;
        insurance.approved_at = now;

        emit!(InsurancePurchased {
            node: insurance.node,
            pool_node: insurance.pool_node,
            buyer: insurance.buyer,
            price,
            expiration: insurance.expiration,
            factory_slice: split.factory,
            owner_slice: split.owner,
            masterchef_slice: split.masterchef,
            pool_slice: split.pool,
            via_arbitration: true,
            timestamp: now,
        });
    } else {
        pay_from_escrow(&ctx, &ctx.accounts.buyer_token_account, price)?;

        let insurance = &mut ctx.accounts.insurance;
        insurance.state = InsuranceState::Rejected;

        emit!(PurchaseRejected {
            node: insurance.node,
            buyer: insurance.buyer,
            refunded: price,
            timestamp: now,
        });
    }

    Ok(())
}

fn pay_from_escrow<'info>(
    ctx: &Context<BuyInsuranceFinalize<'info>>,
    destination: &Account<'info, TokenAccount>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let config_bump = ctx.accounts.registrar_config.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[RegistrarConfig::SEED_PREFIX, &[config_bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            token::Transfer {
                from: ctx.accounts.escrow.to_account_info(),
                to: destination.to_account_info(),
                authority: ctx.accounts.registrar_config.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}
