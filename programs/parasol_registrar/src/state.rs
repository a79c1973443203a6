// programs/parasol_registrar/src/state.rs

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use parasol_core::math::bps_of;
use parasol_core::Node;

// =============================================================================
// REGISTRAR STATE
// =============================================================================
// The factory and sales desk: deploys one pool (plus masterchef and
// ownership ledger) per node, sells insurances against deployed pools and
// splits every sale between the factory, the pool owners, the investor
// reward ledger and the pool vault.

/// Global registrar configuration
/// PDA seeds: ["registrar_config"]
#[account]
#[derive(InitSpace)]
pub struct RegistrarConfig {
    /// Factory owner; receives the factory slice of every sale
    pub authority: Pubkey,

    /// Factory fee on every sale, basis points
    pub factory_fee_bps: u16,

    /// Pools deployed all-time
    pub pools_deployed: u64,

    /// Next dispute id handed to an arbitration purchase
    pub next_dispute_id: u64,

    /// Bump seed
    pub bump: u8,
}

impl RegistrarConfig {
    pub const SEED_PREFIX: &'static [u8] = b"registrar_config";

    pub const DEFAULT_FACTORY_FEE_BPS: u16 = 250; // 2.5%
    pub const MAX_FACTORY_FEE_BPS: u16 = 1000; // 10%
}

/// Per-node deployment record; the `poolInformation(node)` surface
/// PDA seeds: ["pool_info", node]
#[account]
#[derive(InitSpace)]
pub struct PoolInfo {
    /// Namehash the pool was deployed for
    pub node: [u8; 32],

    /// Node owner; may manage trusted arbitrable proxies
    pub owner: Pubkey,

    /// Pool PDA
    pub pool: Pubkey,

    /// Masterchef PDA
    pub masterchef: Pubkey,

    /// Ownership ledger PDA
    pub ownership: Pubkey,

    /// Asset mint the pool holds
    pub asset_mint: Pubkey,

    /// Factory fee snapshotted at deploy, basis points
    pub factory_fee_bps: u16,

    /// Owner revenue share of every sale, basis points
    pub owner_share_bps: u16,

    /// Share of the pool slice paid instantly to investors, basis points
    pub instant_reward_bps: u16,

    /// Pool expiration
    pub expiration: i64,

    /// Bump seed
    pub bump: u8,
}

impl PoolInfo {
    pub const SEED_PREFIX: &'static [u8] = b"pool_info";
}

/// Purchase lifecycle. The signature path lands directly in Active; the
/// arbitration path walks PendingDispute -> (ruling) -> Active/Rejected.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum InsuranceState {
    PendingDispute,
    Active,
    Rejected,
}

/// Arbitrator ruling recorded on a disputed purchase
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum PurchaseRuling {
    None,
    Approved,
    Rejected,
}

/// Latest insurance sold against a node; the `insurances(node)` surface
/// PDA seeds: ["insurance", node]
#[account]
#[derive(InitSpace)]
pub struct Insurance {
    /// Insured namehash
    pub node: [u8; 32],

    /// Node of the pool underwriting this insurance
    pub pool_node: [u8; 32],

    /// Buyer wallet
    pub buyer: Pubkey,

    /// Price paid (escrowed while a dispute is pending)
    pub price: u64,

    /// Insurance expiration
    pub expiration: i64,

    /// Lifecycle state
    pub state: InsuranceState,

    /// Dispute id handed out at raise time; 0 for the signature path
    pub dispute_id: u64,

    /// Arbitrable proxy bound to a disputed purchase
    pub proxy: Pubkey,

    /// Ruling recorded by the proxy
    pub ruling: PurchaseRuling,

    /// Activation timestamp
    pub approved_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl Insurance {
    pub const SEED_PREFIX: &'static [u8] = b"insurance";
    pub const ESCROW_SEED: &'static [u8] = b"escrow";

    /// A ruling may land exactly once, on an open dispute.
    pub fn can_rule(&self) -> bool {
        self.state == InsuranceState::PendingDispute && self.ruling == PurchaseRuling::None
    }

    /// Finalize requires an open dispute with a ruling present.
    pub fn can_finalize(&self) -> bool {
        self.state == InsuranceState::PendingDispute && self.ruling != PurchaseRuling::None
    }

    /// A node can be (re)insured when no purchase is pending and any
    /// previous cover has lapsed.
    pub fn can_replace(&self, now: i64) -> bool {
        match self.state {
            InsuranceState::PendingDispute => false,
            InsuranceState::Rejected => true,
            InsuranceState::Active => now >= self.expiration,
        }
    }
}

/// Replay guard for signed purchase approvals; existence of the account
/// is the "nonce consumed" bit
/// PDA seeds: ["nonce", approver, nonce]
#[account]
#[derive(InitSpace)]
pub struct UsedApprovalNonce {
    /// Approver the nonce belongs to
    pub approver: Pubkey,

    /// Consumed nonce
    pub nonce: u64,

    /// Bump seed
    pub bump: u8,
}

impl UsedApprovalNonce {
    pub const SEED_PREFIX: &'static [u8] = b"nonce";
}

// =============================================================================
// REVENUE SPLIT
// =============================================================================

/// How one sale's price is divided. Always sums to the price.
#[derive(Debug, PartialEq, Eq)]
pub struct RevenueSplit {
    /// To the factory owner's wallet
    pub factory: u64,
    /// To the ownership ledger vault
    pub owner: u64,
    /// To the masterchef reward vault
    pub masterchef: u64,
    /// To the pool vault
    pub pool: u64,
}

/// Split a sale: factory and owner slices come off the top; the rest is
/// the pool slice, from which investors take an instant-reward cut when
/// any shares exist. With no investors the whole pool slice lands in the
/// vault.
pub fn compute_split(
    price: u64,
    factory_fee_bps: u16,
    owner_share_bps: u16,
    instant_reward_bps: u16,
    masterchef_has_shares: bool,
) -> RevenueSplit {
    let factory = bps_of(price, factory_fee_bps);
    let owner = bps_of(price, owner_share_bps);
    let pool_slice = price.saturating_sub(factory).saturating_sub(owner);

    let masterchef = if masterchef_has_shares {
        bps_of(pool_slice, instant_reward_bps)
    } else {
        0
    };

    RevenueSplit {
        factory,
        owner,
        masterchef,
        pool: pool_slice.saturating_sub(masterchef),
    }
}

// =============================================================================
// SIGNED-APPROVAL DIGEST
// =============================================================================

/// Domain separator for purchase approvals
const PURCHASE_APPROVAL_DOMAIN: &[u8] = b"parasol:purchase:v1";

/// Canonical message an approver signs to authorize an insurance sale.
pub fn purchase_approval_digest(
    registrar: &Pubkey,
    node: &Node,
    pool_node: &Node,
    price: u64,
    expiration: i64,
    nonce: u64,
    deadline: i64,
) -> [u8; 32] {
    keccak::hashv(&[
        PURCHASE_APPROVAL_DOMAIN,
        registrar.as_ref(),
        node.as_ref(),
        pool_node.as_ref(),
        &price.to_le_bytes(),
        &expiration.to_le_bytes(),
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

    // =========================================================================
    // REVENUE SPLIT
    // =========================================================================

    #[test]
    fn test_split_sums_to_price() {
        for (fee, share, reward) in [
            (250u16, 4000u16, 800u16),
            (0, 0, 0),
            (1000, 500, 10000),
            (250, 9750 - 250, 1),
            (997, 503, 7919),
        ] {
            for price in [1u64, 99, 100 * ONE_UNIT, 123_456_789_123] {
                for has_shares in [false, true] {
                    let split = compute_split(price, fee, share, reward, has_shares);
                    assert_eq!(
                        split.factory + split.owner + split.masterchef + split.pool,
                        price,
                        "split must conserve the price"
                    );
                }
            }
        }
    }

    #[test]
    fn test_split_forty_percent_owner_example() {
        // 40% owner share, 2.5% factory fee on a 100-token sale
        let split = compute_split(100 * ONE_UNIT, 250, 4000, 800, false);
        assert_eq!(split.factory, 2_500_000_000);
        assert_eq!(split.owner, 40 * ONE_UNIT);
        assert_eq!(split.masterchef, 0);
        assert_eq!(split.pool, 57_500_000_000);
    }

    #[test]
    fn test_split_without_investors_skips_masterchef() {
        let split = compute_split(100 * ONE_UNIT, 250, 4000, 800, false);
        assert_eq!(split.masterchef, 0);
        let with = compute_split(100 * ONE_UNIT, 250, 4000, 800, true);
        assert!(with.masterchef > 0);
        assert_eq!(with.pool + with.masterchef, split.pool);
    }

    #[test]
    fn test_split_instant_reward_comes_off_pool_slice() {
        // 8% instant reward applies to the pool slice, not the price
        let split = compute_split(100 * ONE_UNIT, 250, 4000, 800, true);
        let pool_slice = 57_500_000_000u64;
        assert_eq!(split.masterchef, pool_slice * 800 / 10000);
        assert_eq!(split.pool, pool_slice - split.masterchef);
    }

    #[test]
    fn test_split_full_instant_reward_drains_pool_slice() {
        let split = compute_split(100 * ONE_UNIT, 250, 4000, 10000, true);
        assert_eq!(split.pool, 0);
        assert_eq!(split.masterchef, 57_500_000_000);
    }

    // =========================================================================
    // PURCHASE STATE MACHINE
    // =========================================================================

    fn disputed_purchase() -> Insurance {
        Insurance {
            node: [5u8; 32],
            pool_node: [6u8; 32],
            buyer: Pubkey::default(),
            price: ONE_UNIT,
            expiration: 2_000_000_000,
            state: InsuranceState::PendingDispute,
            dispute_id: 3,
            proxy: Pubkey::default(),
            ruling: PurchaseRuling::None,
            approved_at: 0,
            bump: 255,
        }
    }

    #[test]
    fn test_pending_purchase_accepts_one_ruling() {
        let mut ins = disputed_purchase();
        assert!(ins.can_rule());
        assert!(!ins.can_finalize());
        ins.ruling = PurchaseRuling::Approved;
        assert!(!ins.can_rule());
        assert!(ins.can_finalize());
    }

    #[test]
    fn test_active_purchase_is_terminal_for_finalize() {
        let mut ins = disputed_purchase();
        ins.ruling = PurchaseRuling::Approved;
        ins.state = InsuranceState::Active;
        assert!(!ins.can_finalize());
        assert!(!ins.can_rule());
    }

    #[test]
    fn test_replacement_rules() {
        let now = 1_500_000_000i64;

        let pending = disputed_purchase();
        assert!(!pending.can_replace(now));

        let mut active = disputed_purchase();
        active.state = InsuranceState::Active;
        assert!(!active.can_replace(now));
        // lapsed cover can be replaced
        assert!(active.can_replace(active.expiration));

        let mut rejected = disputed_purchase();
        rejected.state = InsuranceState::Rejected;
        assert!(rejected.can_replace(now));
    }

    // =========================================================================
    // APPROVAL DIGEST
    // =========================================================================

    #[test]
    fn test_purchase_digest_binds_every_field() {
        let registrar = Pubkey::new_unique();
        let node = [7u8; 32];
        let pool_node = [8u8; 32];
        let base =
            purchase_approval_digest(&registrar, &node, &pool_node, 100, 2_000_000_000, 9, 1_900_000_000);

        assert_eq!(
            base,
            purchase_approval_digest(&registrar, &node, &pool_node, 100, 2_000_000_000, 9, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &[9u8; 32], &pool_node, 100, 2_000_000_000, 9, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &node, &[9u8; 32], 100, 2_000_000_000, 9, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &node, &pool_node, 101, 2_000_000_000, 9, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &node, &pool_node, 100, 2_000_000_001, 9, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &node, &pool_node, 100, 2_000_000_000, 10, 1_900_000_000)
        );
        assert_ne!(
            base,
            purchase_approval_digest(&registrar, &node, &pool_node, 100, 2_000_000_000, 9, 1_900_000_001)
        );
    }
}
