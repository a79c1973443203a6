// programs/parasol_core/src/math.rs

use crate::BPS_DENOMINATOR;

/// Fixed-point scale for reward-ledger accumulators (acc-per-share and
/// debt are carried at this precision).
pub const REWARD_SCALE: u128 = 1_000_000_000_000; // 1e12

/// Floor of `amount * numerator / denominator` with a u128 intermediate.
/// Returns 0 when the denominator is 0.
pub fn mul_div(amount: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    ((amount as u128)
        .saturating_mul(numerator as u128)
        .checked_div(denominator as u128)
        .unwrap_or(0)) as u64
}

/// The `bps` fraction of `amount` (e.g. bps_of(price, factory_fee_bps)).
pub fn bps_of(amount: u64, bps: u16) -> u64 {
    mul_div(amount, bps as u64, BPS_DENOMINATOR)
}

/// Net amount after deducting a basis-point fee: `amount * (10000 - bps) / 10000`.
pub fn apply_fee(amount: u64, fee_bps: u16) -> u64 {
    mul_div(
        amount,
        BPS_DENOMINATOR.saturating_sub(fee_bps as u64),
        BPS_DENOMINATOR,
    )
}

/// Gross amount whose net-of-fee value is `amount`:
/// `amount * 10000 / (10000 - bps)`. The inverse of [`apply_fee`].
pub fn gross_up(amount: u64, fee_bps: u16) -> u64 {
    mul_div(
        amount,
        BPS_DENOMINATOR,
        BPS_DENOMINATOR.saturating_sub(fee_bps as u64),
    )
}

/// Entitlement of `shares` at accumulator `acc_per_share`, in scaled units.
pub fn entitlement(shares: u64, acc_per_share: u128) -> u128 {
    (shares as u128).saturating_mul(acc_per_share)
}

/// Descale a REWARD_SCALE-scaled value back to token units (floor).
pub fn from_scaled(value: u128) -> u64 {
    (value / REWARD_SCALE) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_of_basic() {
        // 40% owner share of a 100-token purchase
        assert_eq!(bps_of(100_000_000_000, 4000), 40_000_000_000);
        // 2.5% factory fee
        assert_eq!(bps_of(100_000_000_000, 250), 2_500_000_000);
    }

    #[test]
    fn test_bps_of_zero_and_full() {
        assert_eq!(bps_of(1_000_000, 0), 0);
        assert_eq!(bps_of(1_000_000, 10000), 1_000_000);
    }

    #[test]
    fn test_apply_fee() {
        // 10% withdrawal fee on 1 unit
        assert_eq!(apply_fee(1_000_000_000, 1000), 900_000_000);
        assert_eq!(apply_fee(1_000_000_000, 0), 1_000_000_000);
    }

    #[test]
    fn test_gross_up_inverts_apply_fee() {
        // gross_up is the preview_withdraw direction: shares needed so that
        // apply_fee(shares) pays the requested assets (up to flooring)
        let fee = 750u16;
        let assets = 123_456_789u64;
        let gross = gross_up(assets, fee);
        let net = apply_fee(gross, fee);
        assert!(assets.saturating_sub(net) <= 1);
    }

    #[test]
    fn test_gross_up_full_fee_is_zero() {
        // A 100% fee has no finite gross; helper saturates to 0 rather
        // than dividing by zero. Pool init rejects fee >= 10000 anyway.
        assert_eq!(gross_up(1_000_000, 10000), 0);
    }

    #[test]
    fn test_mul_div_large_values_no_overflow() {
        // near-u64-max amounts survive the u128 intermediate
        let amount = u64::MAX / 2;
        assert_eq!(mul_div(amount, 10000, 10000), amount);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(mul_div(1_000_000, 1, 0), 0);
    }

    #[test]
    fn test_entitlement_round_trip() {
        let acc = 3 * REWARD_SCALE / 2; // 1.5 tokens per share
        let shares = 400_000_000_000u64;
        assert_eq!(from_scaled(entitlement(shares, acc)), 600_000_000_000);
    }
}
