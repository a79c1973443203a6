// programs/parasol_registrar/src/instructions/initialize.rs

use crate::errors::RegistrarError;
use crate::events::RegistrarInitialized;
use crate::state::RegistrarConfig;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeRegistrarParams {
    pub factory_fee_bps: u16,
}

#[derive(Accounts)]
pub struct InitializeRegistrar<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + RegistrarConfig::INIT_SPACE,
        seeds = [RegistrarConfig::SEED_PREFIX],
        bump
    )]
    pub registrar_config: Account<'info, RegistrarConfig>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_registrar(
    ctx: Context<InitializeRegistrar>,
    params: InitializeRegistrarParams,
) -> Result<()> {
    let clock = Clock::get()?;

    require!(
        params.factory_fee_bps <= RegistrarConfig::MAX_FACTORY_FEE_BPS,
        RegistrarError::InvalidFeeConfiguration
    );

    let config = &mut ctx.accounts.registrar_config;
    config.authority = ctx.accounts.authority.key();
    config.factory_fee_bps = params.factory_fee_bps;
    config.pools_deployed = 0;
    config.next_dispute_id = 1;
    config.bump = ctx.bumps.registrar_config;

    emit!(RegistrarInitialized {
        authority: config.authority,
        factory_fee_bps: config.factory_fee_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
