// programs/parasol_pool/src/instructions/vault.rs
//
// Deposit / Redeem
// ================
// Shares mint 1:1 against deposited assets. Redemption pays out by the
// preview rules (fee in profit, ratio + fee in loss, pure ratio after
// expiration). Every share movement is mirrored into the masterchef via
// CPI so the reward ledger and the pool never disagree on supply.

use crate::errors::PoolError;
use crate::events::{Deposited, Redeemed};
use crate::state::{Pool, ShareAccount};
use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount};

#[derive(Accounts)]
pub struct Deposit<'info> {
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
        init_if_needed,
        payer = investor,
        space = 8 + ShareAccount::INIT_SPACE,
        seeds = [ShareAccount::SEED_PREFIX, pool.key().as_ref(), investor.key().as_ref()],
        bump
    )]
    pub share_account: Account<'info, ShareAccount>,

    #[account(
        mut,
        constraint = investor_token_account.mint == pool.asset_mint @ PoolError::MintMismatch,
        constraint = investor_token_account.owner == investor.key() @ PoolError::OwnerMismatch
    )]
    pub investor_token_account: Account<'info, TokenAccount>,

    /// CHECK: masterchef PDA, pinned to the pool and fully validated by
    /// the masterchef program in the mirror CPI
    #[account(
        mut,
        constraint = masterchef.key() == pool.masterchef @ PoolError::InvalidMasterchef
    )]
    pub masterchef: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_reward_state: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_investor: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_investor_debt: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_reward_vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub investor: Signer<'info>,

    pub masterchef_program: Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn deposit(ctx: Context<Deposit>, assets: u64) -> Result<()> {
    require!(assets > 0, PoolError::ZeroAmount);

    let clock = Clock::get()?;
    require!(
        !ctx.accounts.pool.is_expired(clock.unix_timestamp),
        PoolError::PoolExpired
    );

    // Pull assets into the vault
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            token::Transfer {
                from: ctx.accounts.investor_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.investor.to_account_info(),
            },
        ),
        assets,
    )?;

    // Mint shares 1:1
    let share_account = &mut ctx.accounts.share_account;
    if share_account.amount == 0 && share_account.owner == Pubkey::default() {
        share_account.owner = ctx.accounts.investor.key();
        share_account.bump = ctx.bumps.share_account;
    }
    share_account.amount = share_account.amount.saturating_add(assets);

    let pool = &mut ctx.accounts.pool;
    pool.total_shares = pool.total_shares.saturating_add(assets);
    pool.total_deposited = pool.total_deposited.saturating_add(assets);
    let total_shares = pool.total_shares;

    // Mirror into the masterchef; settles the investor's pending reward
    mirror_deposit(&ctx, assets)?;

    emit!(Deposited {
        investor: ctx.accounts.investor.key(),
        assets,
        shares: assets,
        total_shares,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

fn mirror_deposit(ctx: &Context<Deposit>, amount: u64) -> Result<()> {
    let pool = &ctx.accounts.pool;
    let seeds = &[
        Pool::SEED_PREFIX,
        pool.registrar.as_ref(),
        pool.node.as_ref(),
        &[pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    parasol_masterchef::cpi::deposit_shares(
        CpiContext::new_with_signer(
            ctx.accounts.masterchef_program.to_account_info(),
            parasol_masterchef::cpi::accounts::DepositShares {
                masterchef: ctx.accounts.masterchef.to_account_info(),
                reward_state: ctx.accounts.masterchef_reward_state.to_account_info(),
                investor_account: ctx.accounts.masterchef_investor.to_account_info(),
                investor_debt: ctx.accounts.masterchef_investor_debt.to_account_info(),
                reward_vault: ctx.accounts.masterchef_reward_vault.to_account_info(),
                investor_token_account: ctx.accounts.investor_token_account.to_account_info(),
                pool_authority: ctx.accounts.pool.to_account_info(),
                investor: ctx.accounts.investor.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}

#[derive(Accounts)]
pub struct Redeem<'info> {
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
        seeds = [ShareAccount::SEED_PREFIX, pool.key().as_ref(), investor.key().as_ref()],
        bump = share_account.bump,
        constraint = share_account.owner == investor.key() @ PoolError::OwnerMismatch
    )]
    pub share_account: Account<'info, ShareAccount>,

    #[account(
        mut,
        constraint = investor_token_account.mint == pool.asset_mint @ PoolError::MintMismatch,
        constraint = investor_token_account.owner == investor.key() @ PoolError::OwnerMismatch
    )]
    pub investor_token_account: Account<'info, TokenAccount>,

    /// CHECK: masterchef PDA, pinned to the pool and fully validated by
    /// the masterchef program in the mirror CPI
    #[account(
        mut,
        constraint = masterchef.key() == pool.masterchef @ PoolError::InvalidMasterchef
    )]
    pub masterchef: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_reward_state: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_investor: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_investor_debt: UncheckedAccount<'info>,

    /// CHECK: validated by the masterchef program
    #[account(mut)]
    pub masterchef_reward_vault: UncheckedAccount<'info>,

    pub investor: Signer<'info>,

    pub masterchef_program: Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    pub token_program: Program<'info, Token>,
}

pub fn redeem(ctx: Context<Redeem>, shares: u64) -> Result<()> {
    require!(shares > 0, PoolError::ZeroAmount);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        ctx.accounts.share_account.amount >= shares,
        PoolError::InsufficientShares
    );

    // Payout at the pre-burn state; redemption is allowed after expiration
    // and is then fee-free by construction
    let total_assets = ctx.accounts.vault.amount;
    let payout = ctx.accounts.pool.preview_redeem(shares, total_assets, now);
    let after_expiration = ctx.accounts.pool.is_expired(now);

    // Burn before any transfer leaves the program
    let share_account = &mut ctx.accounts.share_account;
    share_account.amount = share_account.amount.saturating_sub(shares);
    let pool = &mut ctx.accounts.pool;
    pool.total_shares = pool.total_shares.saturating_sub(shares);
    let total_shares = pool.total_shares;

    if payout > 0 {
        let pool = &ctx.accounts.pool;
        let seeds = &[
            Pool::SEED_PREFIX,
            pool.registrar.as_ref(),
            pool.node.as_ref(),
            &[pool.bump],
        ];
        let signer_seeds = &[&seeds[..]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                token::Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.investor_token_account.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer_seeds,
            ),
            payout,
        )?;
    }

    // Mirror the burn into the masterchef; settles pending reward
    mirror_withdraw(&ctx, shares)?;

    emit!(Redeemed {
        investor: ctx.accounts.investor.key(),
        shares,
        assets: payout,
        total_shares,
        after_expiration,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

fn mirror_withdraw(ctx: &Context<Redeem>, amount: u64) -> Result<()> {
    let pool = &ctx.accounts.pool;
    let seeds = &[
        Pool::SEED_PREFIX,
        pool.registrar.as_ref(),
        pool.node.as_ref(),
        &[pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    parasol_masterchef::cpi::withdraw_shares(
        CpiContext::new_with_signer(
            ctx.accounts.masterchef_program.to_account_info(),
            parasol_masterchef::cpi::accounts::WithdrawShares {
                masterchef: ctx.accounts.masterchef.to_account_info(),
                reward_state: ctx.accounts.masterchef_reward_state.to_account_info(),
                investor_account: ctx.accounts.masterchef_investor.to_account_info(),
                investor_debt: ctx.accounts.masterchef_investor_debt.to_account_info(),
                reward_vault: ctx.accounts.masterchef_reward_vault.to_account_info(),
                investor_token_account: ctx.accounts.investor_token_account.to_account_info(),
                pool_authority: ctx.accounts.pool.to_account_info(),
                investor: ctx.accounts.investor.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}
