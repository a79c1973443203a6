// programs/parasol_masterchef/src/instructions/shares.rs
//
// Share Mirroring
// ===============
// The pool program is the only caller: every pool deposit/redeem CPIs here
// so that masterchef.total_shares == pool.total_shares at all times. Both
// directions settle the investor's pending reward before touching shares,
// which is what keeps the debt ledger exact.

use crate::errors::MasterchefError;
use crate::events::{SharesDeposited, SharesWithdrawn};
use crate::state::{InvestorAccount, InvestorDebt, Masterchef, RewardState};
use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount};

#[derive(Accounts)]
pub struct DepositShares<'info> {
    #[account(
        mut,
        seeds = [Masterchef::SEED_PREFIX, masterchef.pool.as_ref()],
        bump = masterchef.bump,
    )]
    pub masterchef: Account<'info, Masterchef>,

    #[account(
        mut,
        seeds = [
            RewardState::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, RewardState>,

    #[account(
        init_if_needed,
        payer = investor,
        space = 8 + InvestorAccount::INIT_SPACE,
        seeds = [InvestorAccount::SEED_PREFIX, masterchef.key().as_ref(), investor.key().as_ref()],
        bump
    )]
    pub investor_account: Account<'info, InvestorAccount>,

    #[account(
        init_if_needed,
        payer = investor,
        space = 8 + InvestorDebt::INIT_SPACE,
        seeds = [
            InvestorDebt::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref(),
            investor.key().as_ref()
        ],
        bump
    )]
    pub investor_debt: Account<'info, InvestorDebt>,

    #[account(
        mut,
        constraint = reward_vault.key() == masterchef.reward_vault @ MasterchefError::InvalidVault
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Destination for any pending reward settled by this deposit
    #[account(
        mut,
        constraint = investor_token_account.mint == masterchef.asset_mint @ MasterchefError::MintMismatch,
        constraint = investor_token_account.owner == investor.key() @ MasterchefError::OwnerMismatch
    )]
    pub investor_token_account: Account<'info, TokenAccount>,

    /// Pool PDA signing the mirror CPI
    #[account(
        constraint = pool_authority.key() == masterchef.pool @ MasterchefError::Unauthorised
    )]
    pub pool_authority: Signer<'info>,

    #[account(mut)]
    pub investor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn deposit_shares(ctx: Context<DepositShares>, amount: u64) -> Result<()> {
    require!(amount > 0, MasterchefError::ZeroAmount);

    let clock = Clock::get()?;
    let reward_state = &mut ctx.accounts.reward_state;
    let investor_account = &mut ctx.accounts.investor_account;
    let investor_debt = &mut ctx.accounts.investor_debt;

    // Settle pending before the position changes
    let (payout, settled) = reward_state.settle(investor_account.shares, investor_debt.debt);
    if payout > 0 {
        transfer_from_vault(
            &ctx.accounts.masterchef,
            &ctx.accounts.reward_vault,
            &ctx.accounts.investor_token_account,
            &ctx.accounts.token_program,
            payout,
        )?;
    }

    investor_debt.debt = reward_state.on_shares_added(amount, settled);
    if investor_account.shares == 0 {
        investor_account.owner = ctx.accounts.investor.key();
        investor_account.bump = ctx.bumps.investor_account;
        investor_debt.owner = ctx.accounts.investor.key();
        investor_debt.mint = ctx.accounts.masterchef.asset_mint;
        investor_debt.bump = ctx.bumps.investor_debt;
    }
    investor_account.shares = investor_account.shares.saturating_add(amount);

    let masterchef = &mut ctx.accounts.masterchef;
    masterchef.total_shares = masterchef.total_shares.saturating_add(amount);

    emit!(SharesDeposited {
        investor: ctx.accounts.investor.key(),
        amount,
        total_shares: masterchef.total_shares,
        harvested: payout,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct WithdrawShares<'info> {
    #[account(
        mut,
        seeds = [Masterchef::SEED_PREFIX, masterchef.pool.as_ref()],
        bump = masterchef.bump,
    )]
    pub masterchef: Account<'info, Masterchef>,

    #[account(
        mut,
        seeds = [
            RewardState::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, RewardState>,

    #[account(
        mut,
        seeds = [InvestorAccount::SEED_PREFIX, masterchef.key().as_ref(), investor.key().as_ref()],
        bump = investor_account.bump,
        constraint = investor_account.owner == investor.key() @ MasterchefError::OwnerMismatch
    )]
    pub investor_account: Account<'info, InvestorAccount>,

    #[account(
        mut,
        seeds = [
            InvestorDebt::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref(),
            investor.key().as_ref()
        ],
        bump = investor_debt.bump,
    )]
    pub investor_debt: Account<'info, InvestorDebt>,

    #[account(
        mut,
        constraint = reward_vault.key() == masterchef.reward_vault @ MasterchefError::InvalidVault
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = investor_token_account.mint == masterchef.asset_mint @ MasterchefError::MintMismatch,
        constraint = investor_token_account.owner == investor.key() @ MasterchefError::OwnerMismatch
    )]
    pub investor_token_account: Account<'info, TokenAccount>,

    /// Pool PDA signing the mirror CPI
    #[account(
        constraint = pool_authority.key() == masterchef.pool @ MasterchefError::Unauthorised
    )]
    pub pool_authority: Signer<'info>,

    pub investor: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn withdraw_shares(ctx: Context<WithdrawShares>, amount: u64) -> Result<()> {
    require!(amount > 0, MasterchefError::ZeroAmount);

    let clock = Clock::get()?;
    let reward_state = &mut ctx.accounts.reward_state;
    let investor_account = &mut ctx.accounts.investor_account;
    let investor_debt = &mut ctx.accounts.investor_debt;

    require!(
        investor_account.shares >= amount,
        MasterchefError::InsufficientShares
    );

    let (payout, settled) = reward_state.settle(investor_account.shares, investor_debt.debt);
    if payout > 0 {
        transfer_from_vault(
            &ctx.accounts.masterchef,
            &ctx.accounts.reward_vault,
            &ctx.accounts.investor_token_account,
            &ctx.accounts.token_program,
            payout,
        )?;
    }

    investor_debt.debt = reward_state.on_shares_removed(amount, settled);
    investor_account.shares = investor_account.shares.saturating_sub(amount);

    let masterchef = &mut ctx.accounts.masterchef;
    masterchef.total_shares = masterchef.total_shares.saturating_sub(amount);

    emit!(SharesWithdrawn {
        investor: ctx.accounts.investor.key(),
        amount,
        total_shares: masterchef.total_shares,
        harvested: payout,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub(crate) fn transfer_from_vault<'info>(
    masterchef: &Account<'info, Masterchef>,
    vault: &Account<'info, TokenAccount>,
    destination: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    amount: u64,
) -> Result<()> {
    let seeds = &[
        Masterchef::SEED_PREFIX,
        masterchef.pool.as_ref(),
        &[masterchef.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            token::Transfer {
                from: vault.to_account_info(),
                to: destination.to_account_info(),
                authority: masterchef.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}
