// programs/parasol_pool/src/instructions/claims.rs
//
// Claim Ledger
// ============
// Two paths into the ledger:
// - Signature path: a trusted approver signs (pool, node, claim id,
//   recipient, amount, nonce, deadline); a valid, unexpired, unused-nonce
//   approval finalizes the claim atomically.
// - Arbitration path: the claim is raised against a trusted arbitrable
//   proxy, the proxy records a ruling, and a separate finalize executes
//   the ruling exactly once.
// Claims only ever reduce pool assets; share supply is untouched.

use crate::errors::PoolError;
use crate::events::{ClaimDisputeRaised, ClaimFinalized, ClaimRejected, ClaimRulingRecorded};
use crate::state::{
    claim_approval_digest, Claim, ClaimCounter, ClaimState, InsurancePolicy, Pool, Ruling,
    TrustedParty, UsedNonce,
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as tx_instructions;
use anchor_spl::token::{self, Token, TokenAccount};
use parasol_core::sigverify;
use parasol_core::Node;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ClaimWithSignatureParams {
    pub node: Node,
    pub recipient: Pubkey,
    pub amount: u64,
    pub approver: Pubkey,
    pub nonce: u64,
    pub deadline: i64,
}

#[derive(Accounts)]
#[instruction(params: ClaimWithSignatureParams)]
pub struct ClaimWithSignature<'info> {
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        constraint = vault.key() == pool.vault @ PoolError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        seeds = [InsurancePolicy::SEED_PREFIX, pool.key().as_ref(), params.node.as_ref()],
        bump = policy.bump,
        constraint = policy.active @ PoolError::InsuranceNotActive
    )]
    pub policy: Account<'info, InsurancePolicy>,

    #[account(
        init_if_needed,
        payer = claimant,
        space = 8 + ClaimCounter::INIT_SPACE,
        seeds = [ClaimCounter::SEED_PREFIX, pool.key().as_ref(), params.node.as_ref()],
        bump
    )]
    pub claim_counter: Account<'info, ClaimCounter>,

    #[account(
        init,
        payer = claimant,
        space = 8 + Claim::INIT_SPACE,
        seeds = [
            Claim::SEED_PREFIX,
            pool.key().as_ref(),
            params.node.as_ref(),
            &claim_counter.latest_claim_id.saturating_add(1).to_le_bytes()
        ],
        bump
    )]
    pub claim: Account<'info, Claim>,

    /// Existence of this account is the consumed-nonce bit; a replay
    /// fails at init
    #[account(
        init,
        payer = claimant,
        space = 8 + UsedNonce::INIT_SPACE,
        seeds = [
            UsedNonce::SEED_PREFIX,
            pool.key().as_ref(),
            params.approver.as_ref(),
            &params.nonce.to_le_bytes()
        ],
        bump
    )]
    pub used_nonce: Account<'info, UsedNonce>,

    #[account(
        seeds = [TrustedParty::SEED_PREFIX, pool.key().as_ref(), params.approver.as_ref()],
        bump = trusted.bump,
        constraint = trusted.enabled @ PoolError::UntrustedApprover
    )]
    pub trusted: Account<'info, TrustedParty>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == pool.asset_mint @ PoolError::MintMismatch,
        constraint = recipient_token_account.owner == params.recipient @ PoolError::OwnerMismatch
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    /// CHECK: instructions sysvar, used to introspect the Ed25519
    /// approval placed before this instruction
    #[account(address = tx_instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    #[account(mut)]
    pub claimant: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn claim_with_signature(
    ctx: Context<ClaimWithSignature>,
    params: ClaimWithSignatureParams,
) -> Result<()> {
    require!(params.amount > 0, PoolError::ZeroAmount);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(!ctx.accounts.pool.is_expired(now), PoolError::PoolExpired);
    require!(
        now < ctx.accounts.policy.expiration,
        PoolError::InsuranceExpired
    );
    require!(now <= params.deadline, PoolError::SignatureExpired);
    require!(
        ctx.accounts.vault.amount >= params.amount,
        PoolError::InsufficientPoolAssets
    );

    let claim_id = ctx.accounts.claim_counter.latest_claim_id.saturating_add(1);
    let pool_key = ctx.accounts.pool.key();

    // The approver's capability binds every field of this payout
    let digest = claim_approval_digest(
        &pool_key,
        &params.node,
        claim_id,
        &params.recipient,
        params.amount,
        params.nonce,
        params.deadline,
    );
    require!(
        sigverify::preceding_ed25519_verifies(
            &ctx.accounts.instructions_sysvar,
            &params.approver.to_bytes(),
            &digest,
        ),
        PoolError::InvalidSignature
    );

    // Consume the nonce
    let used_nonce = &mut ctx.accounts.used_nonce;
    used_nonce.approver = params.approver;
    used_nonce.nonce = params.nonce;
    used_nonce.bump = ctx.bumps.used_nonce;

    // Ledger updates complete before the payout leaves the vault
    let counter = &mut ctx.accounts.claim_counter;
    counter.node = params.node;
    counter.latest_claim_id = claim_id;
    counter.bump = ctx.bumps.claim_counter;

    let claim = &mut ctx.accounts.claim;
    claim.node = params.node;
    claim.claim_id = claim_id;
    claim.recipient = params.recipient;
    claim.amount = params.amount;
    claim.approver = params.approver;
    claim.dispute_id = 0;
    claim.state = ClaimState::Finalized;
    claim.ruling = Ruling::Approved;
    claim.raised_at = now;
    claim.resolved_at = now;
    claim.bump = ctx.bumps.claim;

    let pool = &mut ctx.accounts.pool;
    pool.total_claimed = pool.total_claimed.saturating_add(params.amount);

    pay_claim(
        &ctx.accounts.pool,
        &ctx.accounts.vault,
        &ctx.accounts.recipient_token_account,
        &ctx.accounts.token_program,
        params.amount,
    )?;

    emit!(ClaimFinalized {
        node: params.node,
        claim_id,
        recipient: params.recipient,
        amount: params.amount,
        via_arbitration: false,
        timestamp: now,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ClaimWithArbitrationParams {
    pub node: Node,
    pub recipient: Pubkey,
    pub amount: u64,
    pub proxy: Pubkey,
}

#[derive(Accounts)]
#[instruction(params: ClaimWithArbitrationParams)]
pub struct ClaimWithArbitration<'info> {
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        seeds = [InsurancePolicy::SEED_PREFIX, pool.key().as_ref(), params.node.as_ref()],
        bump = policy.bump,
        constraint = policy.active @ PoolError::InsuranceNotActive
    )]
    pub policy: Account<'info, InsurancePolicy>,

    #[account(
        init_if_needed,
        payer = claimant,
        space = 8 + ClaimCounter::INIT_SPACE,
        seeds = [ClaimCounter::SEED_PREFIX, pool.key().as_ref(), params.node.as_ref()],
        bump
    )]
    pub claim_counter: Account<'info, ClaimCounter>,

    #[account(
        init,
        payer = claimant,
        space = 8 + Claim::INIT_SPACE,
        seeds = [
            Claim::SEED_PREFIX,
            pool.key().as_ref(),
            params.node.as_ref(),
            &claim_counter.latest_claim_id.saturating_add(1).to_le_bytes()
        ],
        bump
    )]
    pub claim: Account<'info, Claim>,

    #[account(
        seeds = [TrustedParty::SEED_PREFIX, pool.key().as_ref(), params.proxy.as_ref()],
        bump = trusted.bump,
        constraint = trusted.enabled @ PoolError::UntrustedApprover
    )]
    pub trusted: Account<'info, TrustedParty>,

    #[account(mut)]
    pub claimant: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn claim_with_arbitration(
    ctx: Context<ClaimWithArbitration>,
    params: ClaimWithArbitrationParams,
) -> Result<()> {
    require!(params.amount > 0, PoolError::ZeroAmount);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(!ctx.accounts.pool.is_expired(now), PoolError::PoolExpired);
    require!(
        now < ctx.accounts.policy.expiration,
        PoolError::InsuranceExpired
    );

    let claim_id = ctx.accounts.claim_counter.latest_claim_id.saturating_add(1);

    let pool = &mut ctx.accounts.pool;
    let dispute_id = pool.next_dispute_id;
    pool.next_dispute_id = pool.next_dispute_id.saturating_add(1);

    let counter = &mut ctx.accounts.claim_counter;
    counter.node = params.node;
    counter.latest_claim_id = claim_id;
    counter.bump = ctx.bumps.claim_counter;

    let claim = &mut ctx.accounts.claim;
    claim.node = params.node;
    claim.claim_id = claim_id;
    claim.recipient = params.recipient;
    claim.amount = params.amount;
    claim.approver = params.proxy;
    claim.dispute_id = dispute_id;
    claim.state = ClaimState::DisputeRaised;
    claim.ruling = Ruling::None;
    claim.raised_at = now;
    claim.resolved_at = 0;
    claim.bump = ctx.bumps.claim;

    emit!(ClaimDisputeRaised {
        node: params.node,
        claim_id,
        dispute_id,
        proxy: params.proxy,
        amount: params.amount,
        timestamp: now,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct RecordClaimRulingParams {
    pub node: Node,
    pub claim_id: u64,
    pub approve: bool,
}

/// The trusted arbitrable proxy posts the external arbitrator's ruling.
#[derive(Accounts)]
#[instruction(params: RecordClaimRulingParams)]
pub struct RecordClaimRuling<'info> {
    #[account(
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [
            Claim::SEED_PREFIX,
            pool.key().as_ref(),
            params.node.as_ref(),
            &params.claim_id.to_le_bytes()
        ],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    #[account(
        constraint = proxy.key() == claim.approver @ PoolError::Unauthorised
    )]
    pub proxy: Signer<'info>,
}

pub fn record_claim_ruling(
    ctx: Context<RecordClaimRuling>,
    params: RecordClaimRulingParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let claim = &mut ctx.accounts.claim;

    require!(claim.can_rule(), PoolError::DisputeAlreadyResolved);

    claim.ruling = if params.approve {
        Ruling::Approved
    } else {
        Ruling::Rejected
    };
    claim.resolved_at = clock.unix_timestamp;

    emit!(ClaimRulingRecorded {
        node: claim.node,
        claim_id: claim.claim_id,
        ruling: claim.ruling,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ClaimFinalizeParams {
    pub node: Node,
    pub claim_id: u64,
}

/// Execute a ruled dispute exactly once. A favorable ruling pays the
/// recipient; an unfavorable one closes the claim with no payout. Either
/// way a second finalize fails.
#[derive(Accounts)]
#[instruction(params: ClaimFinalizeParams)]
pub struct ClaimFinalize<'info> {
    #[account(
        mut,
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        constraint = vault.key() == pool.vault @ PoolError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [
            Claim::SEED_PREFIX,
            pool.key().as_ref(),
            params.node.as_ref(),
            &params.claim_id.to_le_bytes()
        ],
        bump = claim.bump,
    )]
    pub claim: Account<'info, Claim>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == pool.asset_mint @ PoolError::MintMismatch,
        constraint = recipient_token_account.owner == claim.recipient @ PoolError::OwnerMismatch
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn claim_finalize(ctx: Context<ClaimFinalize>, params: ClaimFinalizeParams) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    {
        let claim = &ctx.accounts.claim;
        require!(
            claim.state == ClaimState::DisputeRaised,
            PoolError::AlreadyFinalized
        );
        require!(claim.ruling != Ruling::None, PoolError::RulingNotGiven);
    }

    if ctx.accounts.claim.ruling == Ruling::Approved {
        let amount = ctx.accounts.claim.amount;
        require!(
            ctx.accounts.vault.amount >= amount,
            PoolError::InsufficientPoolAssets
        );

        let claim = &mut ctx.accounts.claim;
        claim.state = ClaimState::Finalized;
        claim.resolved_at = now;

        let pool = &mut ctx.accounts.pool;
        pool.total_claimed = pool.total_claimed.saturating_add(amount);

        pay_claim(
            &ctx.accounts.pool,
            &ctx.accounts.vault,
            &ctx.accounts.recipient_token_account,
            &ctx.accounts.token_program,
            amount,
        )?;

        emit!(ClaimFinalized {
            node: params.node,
            claim_id: params.claim_id,
            recipient: ctx.accounts.claim.recipient,
            amount,
            via_arbitration: true,
            timestamp: now,
        });
    } else {
        let claim = &mut ctx.accounts.claim;
        claim.state = ClaimState::Rejected;
        claim.resolved_at = now;

        emit!(ClaimRejected {
            node: params.node,
            claim_id: params.claim_id,
            timestamp: now,
        });
    }

    Ok(())
}

fn pay_claim<'info>(
    pool: &Account<'info, Pool>,
    vault: &Account<'info, TokenAccount>,
    destination: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    amount: u64,
) -> Result<()> {
    let seeds = &[
        Pool::SEED_PREFIX,
        pool.registrar.as_ref(),
        pool.node.as_ref(),
        &[pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            token::Transfer {
                from: vault.to_account_info(),
                to: destination.to_account_info(),
                authority: pool.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}
