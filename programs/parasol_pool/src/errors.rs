// programs/parasol_pool/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum PoolError {
    #[msg("Unauthorised: caller lacks permission")]
    Unauthorised,

    #[msg("Pool has expired")]
    PoolExpired,

    #[msg("Expiration must be in the future")]
    ExpirationInPast,

    #[msg("Withdrawal fee must be below 100%")]
    InvalidFeeConfiguration,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Insufficient share balance")]
    InsufficientShares,

    #[msg("Claim exceeds pool assets")]
    InsufficientPoolAssets,

    #[msg("No active insurance for this node")]
    InsuranceNotActive,

    #[msg("Insurance has expired")]
    InsuranceExpired,

    #[msg("Approval signature has expired")]
    SignatureExpired,

    #[msg("Missing or invalid Ed25519 approval instruction")]
    InvalidSignature,

    #[msg("Approver is not a trusted party for this pool")]
    UntrustedApprover,

    #[msg("Dispute already has a ruling")]
    DisputeAlreadyResolved,

    #[msg("No ruling has been given for this dispute")]
    RulingNotGiven,

    #[msg("Claim already finalized")]
    AlreadyFinalized,

    #[msg("Token account does not match the expected vault")]
    InvalidVault,

    #[msg("Token account mint does not match the pool asset")]
    MintMismatch,

    #[msg("Account owner mismatch")]
    OwnerMismatch,

    #[msg("Masterchef account does not match the pool")]
    InvalidMasterchef,
}
