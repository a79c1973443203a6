// programs/parasol_registrar/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum RegistrarError {
    #[msg("Unauthorised: caller lacks permission")]
    Unauthorised,

    #[msg("Price must be greater than zero")]
    ZeroPrice,

    #[msg("Pool has expired")]
    PoolExpired,

    #[msg("Expiration must be in the future")]
    ExpirationInPast,

    #[msg("Fee configuration exceeds 100%")]
    InvalidFeeConfiguration,

    #[msg("Node already carries an active or pending insurance")]
    AlreadyInsured,

    #[msg("Missing or invalid Ed25519 approval instruction")]
    InvalidSignature,

    #[msg("Approval signature has expired")]
    SignatureExpired,

    #[msg("Approver is not a trusted party for this pool")]
    UntrustedApprover,

    #[msg("Dispute already has a ruling")]
    DisputeAlreadyResolved,

    #[msg("No ruling has been given for this dispute")]
    RulingNotGiven,

    #[msg("Purchase already finalized")]
    AlreadyFinalized,

    #[msg("Token account does not match the expected vault")]
    InvalidVault,

    #[msg("Token account mint does not match the pool asset")]
    MintMismatch,

    #[msg("Account owner mismatch")]
    OwnerMismatch,

    #[msg("Account does not match the pool deployment record")]
    AccountMismatch,
}
