// programs/parasol_masterchef/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum MasterchefError {
    #[msg("Unauthorised: caller lacks permission")]
    Unauthorised,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Insufficient mirrored shares")]
    InsufficientShares,

    #[msg("Cannot notify a reward with no shares outstanding")]
    NoSharesOutstanding,

    #[msg("Token account does not match the expected vault")]
    InvalidVault,

    #[msg("Token account mint does not match the reward asset")]
    MintMismatch,

    #[msg("Account owner mismatch")]
    OwnerMismatch,
}
