// programs/parasol_pool/src/state.rs

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use parasol_core::math::{apply_fee, gross_up, mul_div};
use parasol_core::Node;

// =============================================================================
// POOL STATE
// =============================================================================
// A vault holding one asset against which insurances are written. Investors
// deposit the asset for shares minted 1:1; insurance purchases raise the
// asset balance without minting, so the share ratio (assets / shares) is the
// pool's profit-and-loss gauge. Claims burn assets without touching shares.

/// Insurance pool vault
/// PDA seeds: ["pool", registrar, node]
#[account]
#[derive(InitSpace)]
pub struct Pool {
    /// Namehash this pool was deployed for
    pub node: [u8; 32],

    /// Node owner at deploy time
    pub owner: Pubkey,

    /// Registrar config PDA allowed to register insurances and trusted
    /// parties (CPI signer)
    pub registrar: Pubkey,

    /// Asset mint the vault holds
    pub asset_mint: Pubkey,

    /// Token account holding pool assets (authority = this PDA)
    pub vault: Pubkey,

    /// Masterchef mirror for this pool
    pub masterchef: Pubkey,

    /// Share supply; mirrored into the masterchef on every change
    pub total_shares: u64,

    /// After this timestamp: no purchases, no deposits, no claims, and
    /// withdrawals pay out by share ratio with no fee
    pub expiration: i64,

    /// Withdrawal fee in basis points, waived after expiration
    pub withdrawal_fee_bps: u16,

    /// Share of the pool slice paid instantly to investors on every
    /// purchase, basis points. Consumed by the registrar's splitter;
    /// recorded here as part of the pool's terms.
    pub instant_reward_bps: u16,

    /// Assets deposited by investors all-time
    pub total_deposited: u64,

    /// Assets paid out to claims all-time
    pub total_claimed: u64,

    /// Next dispute id handed to an arbitration claim
    pub next_dispute_id: u64,

    /// Bump seed
    pub bump: u8,
}

impl Pool {
    pub const SEED_PREFIX: &'static [u8] = b"pool";
    pub const VAULT_SEED: &'static [u8] = b"pool_vault";

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiration
    }

    /// Deposits always mint 1:1. A purchase funds the pool without
    /// minting, so depositors never get a premium for entering; they
    /// simply accept the current ratio on the way out.
    pub fn preview_deposit(&self, assets: u64) -> u64 {
        assets
    }

    pub fn preview_mint(&self, shares: u64) -> u64 {
        shares
    }

    /// Assets paid for redeeming `shares`:
    /// - before expiration, in profit (assets > shares): fee only
    /// - before expiration, in loss: scale by share ratio, then fee
    /// - after expiration: share ratio only, no fee
    /// An empty pool previews 0.
    pub fn preview_redeem(&self, shares: u64, total_assets: u64, now: i64) -> u64 {
        if self.is_expired(now) {
            return mul_div(shares, total_assets, self.total_shares);
        }
        if total_assets > self.total_shares {
            apply_fee(shares, self.withdrawal_fee_bps)
        } else {
            apply_fee(
                mul_div(shares, total_assets, self.total_shares),
                self.withdrawal_fee_bps,
            )
        }
    }

    /// Shares needed to withdraw `assets`; the inverse of preview_redeem.
    pub fn preview_withdraw(&self, assets: u64, total_assets: u64, now: i64) -> u64 {
        if self.is_expired(now) {
            return mul_div(assets, self.total_shares, total_assets);
        }
        if total_assets > self.total_shares {
            gross_up(assets, self.withdrawal_fee_bps)
        } else {
            gross_up(
                mul_div(assets, self.total_shares, total_assets),
                self.withdrawal_fee_bps,
            )
        }
    }
}

/// Investor share balance
/// PDA seeds: ["shares", pool, owner]
#[account]
#[derive(InitSpace)]
pub struct ShareAccount {
    /// Investor wallet
    pub owner: Pubkey,

    /// Share balance
    pub amount: u64,

    /// Bump seed
    pub bump: u8,
}

impl ShareAccount {
    pub const SEED_PREFIX: &'static [u8] = b"shares";
}

/// Active insurance registered against the pool, pushed by the registrar
/// when a purchase lands
/// PDA seeds: ["policy", pool, node]
#[account]
#[derive(InitSpace)]
pub struct InsurancePolicy {
    /// Insured namehash
    pub node: [u8; 32],

    /// Buyer wallet
    pub buyer: Pubkey,

    /// Price paid
    pub price: u64,

    /// Claims are rejected at or after this timestamp
    pub expiration: i64,

    /// Cleared when the policy is replaced or voided
    pub active: bool,

    /// Bump seed
    pub bump: u8,
}

impl InsurancePolicy {
    pub const SEED_PREFIX: &'static [u8] = b"policy";
}

/// Per-node claim counter; increases by exactly 1 per claim accepted into
/// the ledger
/// PDA seeds: ["claim_counter", pool, node]
#[account]
#[derive(InitSpace)]
pub struct ClaimCounter {
    /// Insured namehash
    pub node: [u8; 32],

    /// Id of the most recent claim
    pub latest_claim_id: u64,

    /// Bump seed
    pub bump: u8,
}

impl ClaimCounter {
    pub const SEED_PREFIX: &'static [u8] = b"claim_counter";
}

/// Claim lifecycle. The signature path lands directly in Finalized; the
/// arbitration path walks DisputeRaised -> (ruling) -> Finalized/Rejected.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum ClaimState {
    /// Raised and awaiting an external ruling
    DisputeRaised,
    /// Paid out; terminal
    Finalized,
    /// Ruled against; terminal, no payout
    Rejected,
}

/// Arbitrator ruling recorded on a disputed claim
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum Ruling {
    None,
    Approved,
    Rejected,
}

/// A claim against the pool
/// PDA seeds: ["claim", pool, node, claim_id]
#[account]
#[derive(InitSpace)]
pub struct Claim {
    /// Insured namehash
    pub node: [u8; 32],

    /// Sequential id under the node
    pub claim_id: u64,

    /// Wallet paid on finalization
    pub recipient: Pubkey,

    /// Asset amount claimed
    pub amount: u64,

    /// Approver (signature path) or arbitrable proxy (dispute path)
    pub approver: Pubkey,

    /// Dispute id handed out at raise time; 0 for the signature path
    pub dispute_id: u64,

    /// Lifecycle state
    pub state: ClaimState,

    /// Ruling recorded by the proxy
    pub ruling: Ruling,

    /// Raised timestamp
    pub raised_at: i64,

    /// Ruling / finalization timestamp
    pub resolved_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl Claim {
    pub const SEED_PREFIX: &'static [u8] = b"claim";

    /// A ruling may land exactly once, on an open dispute.
    pub fn can_rule(&self) -> bool {
        self.state == ClaimState::DisputeRaised && self.ruling == Ruling::None
    }

    /// Finalize requires an open dispute with a ruling present.
    pub fn can_finalize(&self) -> bool {
        self.state == ClaimState::DisputeRaised && self.ruling != Ruling::None
    }
}

/// Replay guard for signed approvals; existence of the account is the
/// "nonce consumed" bit
/// PDA seeds: ["nonce", pool, approver, nonce]
#[account]
#[derive(InitSpace)]
pub struct UsedNonce {
    /// Approver the nonce belongs to
    pub approver: Pubkey,

    /// Consumed nonce
    pub nonce: u64,

    /// Bump seed
    pub bump: u8,
}

impl UsedNonce {
    pub const SEED_PREFIX: &'static [u8] = b"nonce";
}

/// Approver / arbitrable-proxy allowlist entry, managed through the
/// registrar by the node owner
/// PDA seeds: ["trusted", pool, party]
#[account]
#[derive(InitSpace)]
pub struct TrustedParty {
    /// Allowlisted key
    pub party: Pubkey,

    /// Currently trusted
    pub enabled: bool,

    /// Bump seed
    pub bump: u8,
}

impl TrustedParty {
    pub const SEED_PREFIX: &'static [u8] = b"trusted";
}

// =============================================================================
// SIGNED-APPROVAL DIGEST
// =============================================================================

/// Domain separator for claim approvals
const CLAIM_APPROVAL_DOMAIN: &[u8] = b"parasol:claim:v1";

/// Canonical message an approver signs to authorize a claim. Binds the
/// pool, node, sequential claim id, recipient, amount, nonce and deadline
/// so a signature authorizes exactly one payout.
pub fn claim_approval_digest(
    pool: &Pubkey,
    node: &Node,
    claim_id: u64,
    recipient: &Pubkey,
    amount: u64,
    nonce: u64,
    deadline: i64,
) -> [u8; 32] {
    keccak::hashv(&[
        CLAIM_APPROVAL_DOMAIN,
        pool.as_ref(),
        node.as_ref(),
        &claim_id.to_le_bytes(),
        recipient.as_ref(),
        &amount.to_le_bytes(),
        &nonce.to_le_bytes(),
        &deadline.to_le_bytes(),
    ])
    .to_bytes()
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parasol_core::ONE_UNIT;

    const EXPIRATION: i64 = 1_700_000_000;
    const BEFORE: i64 = EXPIRATION - 1000;
    const AFTER: i64 = EXPIRATION + 1000;

    fn pool(total_shares: u64, fee_bps: u16) -> Pool {
        Pool {
            node: [1u8; 32],
            owner: Pubkey::default(),
            registrar: Pubkey::default(),
            asset_mint: Pubkey::default(),
            vault: Pubkey::default(),
            masterchef: Pubkey::default(),
            total_shares,
            expiration: EXPIRATION,
            withdrawal_fee_bps: fee_bps,
            instant_reward_bps: 800,
            total_deposited: 0,
            total_claimed: 0,
            next_dispute_id: 0,
            bump: 255,
        }
    }

    // =========================================================================
    // DEPOSIT / MINT PREVIEWS
    // =========================================================================

    #[test]
    fn test_deposit_and_mint_are_identity() {
        let p = pool(500 * ONE_UNIT, 1000);
        for amount in [0, 1, ONE_UNIT, 123_456_789, u64::MAX] {
            assert_eq!(p.preview_deposit(amount), amount);
            assert_eq!(p.preview_mint(amount), amount);
        }
    }

    // =========================================================================
    // REDEEM / WITHDRAW PREVIEWS
    // =========================================================================

    #[test]
    fn test_redeem_in_profit_pays_fee_only() {
        // assets 600 vs shares 500: profit, ratio untouched
        let p = pool(500 * ONE_UNIT, 1000);
        let out = p.preview_redeem(100 * ONE_UNIT, 600 * ONE_UNIT, BEFORE);
        assert_eq!(out, 90 * ONE_UNIT);
    }

    #[test]
    fn test_withdraw_in_profit_grosses_up_fee() {
        let p = pool(500 * ONE_UNIT, 1000);
        let shares = p.preview_withdraw(90 * ONE_UNIT, 600 * ONE_UNIT, BEFORE);
        assert_eq!(shares, 100 * ONE_UNIT);
    }

    #[test]
    fn test_redeem_in_loss_scales_then_fees() {
        // assets 400 vs shares 500: ratio 0.8, then 10% fee
        let p = pool(500 * ONE_UNIT, 1000);
        let out = p.preview_redeem(100 * ONE_UNIT, 400 * ONE_UNIT, BEFORE);
        assert_eq!(out, 72 * ONE_UNIT);
    }

    #[test]
    fn test_withdraw_in_loss_inverts_ratio_and_fee() {
        let p = pool(500 * ONE_UNIT, 1000);
        // to receive 72 assets at ratio 0.8 and 10% fee: 72 / 0.8 / 0.9 = 100
        let shares = p.preview_withdraw(72 * ONE_UNIT, 400 * ONE_UNIT, BEFORE);
        assert_eq!(shares, 100 * ONE_UNIT);
    }

    #[test]
    fn test_redeem_at_par_uses_loss_branch() {
        // assets == shares is not profit; ratio 1 so fee is the only loss
        let p = pool(500 * ONE_UNIT, 1000);
        let out = p.preview_redeem(100 * ONE_UNIT, 500 * ONE_UNIT, BEFORE);
        assert_eq!(out, 90 * ONE_UNIT);
    }

    #[test]
    fn test_redeem_after_expiration_is_ratio_only() {
        let p = pool(500 * ONE_UNIT, 1000);
        // loss ratio 0.8, fee waived
        assert_eq!(
            p.preview_redeem(100 * ONE_UNIT, 400 * ONE_UNIT, AFTER),
            80 * ONE_UNIT
        );
        // profit ratio 1.2 passes through to the redeemer
        assert_eq!(
            p.preview_redeem(100 * ONE_UNIT, 600 * ONE_UNIT, AFTER),
            120 * ONE_UNIT
        );
    }

    #[test]
    fn test_withdraw_after_expiration_is_ratio_only() {
        let p = pool(500 * ONE_UNIT, 1000);
        assert_eq!(
            p.preview_withdraw(80 * ONE_UNIT, 400 * ONE_UNIT, AFTER),
            100 * ONE_UNIT
        );
    }

    #[test]
    fn test_boundary_instant_counts_as_expired() {
        let p = pool(500 * ONE_UNIT, 1000);
        assert!(p.is_expired(EXPIRATION));
        assert_eq!(
            p.preview_redeem(100 * ONE_UNIT, 500 * ONE_UNIT, EXPIRATION),
            100 * ONE_UNIT
        );
    }

    #[test]
    fn test_empty_pool_previews_zero() {
        let p = pool(0, 1000);
        assert_eq!(p.preview_redeem(ONE_UNIT, 0, BEFORE), 0);
        assert_eq!(p.preview_withdraw(ONE_UNIT, 0, BEFORE), 0);
        assert_eq!(p.preview_redeem(ONE_UNIT, 0, AFTER), 0);
        assert_eq!(p.preview_withdraw(ONE_UNIT, 0, AFTER), 0);
    }

    #[test]
    fn test_shareless_pool_with_assets_previews_fee_only() {
        // all shares withdrawn but purchase revenue remains: assets > shares
        let p = pool(0, 1000);
        assert_eq!(
            p.preview_redeem(ONE_UNIT, 50 * ONE_UNIT, BEFORE),
            apply_fee(ONE_UNIT, 1000)
        );
        assert_eq!(
            p.preview_withdraw(ONE_UNIT, 50 * ONE_UNIT, BEFORE),
            gross_up(ONE_UNIT, 1000)
        );
    }

    #[test]
    fn test_zero_fee_pool_round_trips_exactly() {
        let p = pool(500 * ONE_UNIT, 0);
        assert_eq!(
            p.preview_redeem(100 * ONE_UNIT, 500 * ONE_UNIT, BEFORE),
            100 * ONE_UNIT
        );
        assert_eq!(
            p.preview_withdraw(100 * ONE_UNIT, 500 * ONE_UNIT, BEFORE),
            100 * ONE_UNIT
        );
    }

    #[test]
    fn test_withdraw_sequence_mirrors_pool_lifecycle() {
        // The canonical lifecycle: deposits at par, purchases push the pool
        // into profit, claims push it into loss, expiry waives the fee.
        let fee = 750u16;
        let p0 = pool(400 * ONE_UNIT, fee);

        // purchases landed 60 in the vault on top of 400 deposited
        let in_profit = p0.preview_redeem(200 * ONE_UNIT, 460 * ONE_UNIT, BEFORE);
        assert_eq!(in_profit, apply_fee(200 * ONE_UNIT, fee));

        // claims drained the vault to 300 against 400 shares
        let in_loss = p0.preview_redeem(200 * ONE_UNIT, 300 * ONE_UNIT, BEFORE);
        assert_eq!(
            in_loss,
            apply_fee(mul_div(200 * ONE_UNIT, 300, 400), fee)
        );

        // after expiry the same position pays pure ratio
        let after = p0.preview_redeem(200 * ONE_UNIT, 300 * ONE_UNIT, AFTER);
        assert_eq!(after, mul_div(200 * ONE_UNIT, 300, 400));
        assert!(after > in_loss);
    }

    // =========================================================================
    // CLAIM STATE MACHINE
    // =========================================================================

    fn disputed_claim() -> Claim {
        Claim {
            node: [2u8; 32],
            claim_id: 1,
            recipient: Pubkey::default(),
            amount: ONE_UNIT,
            approver: Pubkey::default(),
            dispute_id: 7,
            state: ClaimState::DisputeRaised,
            ruling: Ruling::None,
            raised_at: BEFORE,
            resolved_at: 0,
            bump: 255,
        }
    }

    #[test]
    fn test_open_dispute_accepts_one_ruling() {
        let mut claim = disputed_claim();
        assert!(claim.can_rule());
        assert!(!claim.can_finalize());

        claim.ruling = Ruling::Approved;
        assert!(!claim.can_rule());
        assert!(claim.can_finalize());
    }

    #[test]
    fn test_finalized_claim_is_terminal() {
        let mut claim = disputed_claim();
        claim.ruling = Ruling::Approved;
        claim.state = ClaimState::Finalized;
        assert!(!claim.can_rule());
        assert!(!claim.can_finalize());
    }

    #[test]
    fn test_rejected_claim_is_terminal() {
        let mut claim = disputed_claim();
        claim.ruling = Ruling::Rejected;
        claim.state = ClaimState::Rejected;
        assert!(!claim.can_rule());
        assert!(!claim.can_finalize());
    }

    // =========================================================================
    // APPROVAL DIGEST
    // =========================================================================

    #[test]
    fn test_digest_is_deterministic() {
        let pool_key = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let node = [3u8; 32];
        let a = claim_approval_digest(&pool_key, &node, 1, &recipient, 500, 42, BEFORE);
        let b = claim_approval_digest(&pool_key, &node, 1, &recipient, 500, 42, BEFORE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_binds_every_field() {
        let pool_key = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let node = [3u8; 32];
        let base = claim_approval_digest(&pool_key, &node, 1, &recipient, 500, 42, BEFORE);

        assert_ne!(
            base,
            claim_approval_digest(&Pubkey::new_unique(), &node, 1, &recipient, 500, 42, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &[4u8; 32], 1, &recipient, 500, 42, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &node, 2, &recipient, 500, 42, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &node, 1, &Pubkey::new_unique(), 500, 42, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &node, 1, &recipient, 501, 42, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &node, 1, &recipient, 500, 43, BEFORE)
        );
        assert_ne!(
            base,
            claim_approval_digest(&pool_key, &node, 1, &recipient, 500, 42, AFTER)
        );
    }
}
