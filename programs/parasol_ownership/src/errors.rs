// programs/parasol_ownership/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum OwnershipError {
    #[msg("Unauthorised: caller lacks permission")]
    Unauthorised,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Insufficient ownership units")]
    InsufficientBalance,

    #[msg("Token account does not match the expected vault")]
    InvalidVault,

    #[msg("Token account mint does not match the reward asset")]
    MintMismatch,

    #[msg("Account owner mismatch")]
    OwnerMismatch,

    #[msg("Cannot transfer units to yourself")]
    SelfTransfer,
}
