use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError};

/// Rounding direction for share/asset conversions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// `a * b / c` with a u128 intermediate and explicit rounding
pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> Result<u64> {
    require!(c > 0, VaultError::DivisionByZero);

    let product = a.checked_mul(b).ok_or(error!(VaultError::MathOverflow))?;
    let mut quotient = product / c;
    if rounding == Rounding::Up && product % c != 0 {
        quotient = quotient
            .checked_add(1)
            .ok_or(error!(VaultError::MathOverflow))?;
    }

    u64::try_from(quotient).map_err(|_| error!(VaultError::MathOverflow))
}

/// Shares equivalent to `assets` against `total_assets` / `total_shares`
///
/// shares = assets * (total_shares + VIRTUAL_SHARES) / (total_assets + VIRTUAL_ASSETS)
///
/// The virtual offsets keep the empty vault well defined and make a
/// donation-based price inflation cost the attacker ~VIRTUAL_SHARES times
/// what it steals.
pub fn assets_to_shares(
    assets: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    mul_div(
        assets as u128,
        (total_shares as u128) + VIRTUAL_SHARES,
        (total_assets as u128) + VIRTUAL_ASSETS,
        rounding,
    )
}

/// Assets equivalent to `shares` against `total_assets` / `total_shares`
///
/// assets = shares * (total_assets + VIRTUAL_ASSETS) / (total_shares + VIRTUAL_SHARES)
pub fn shares_to_assets(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
    rounding: Rounding,
) -> Result<u64> {
    mul_div(
        shares as u128,
        (total_assets as u128) + VIRTUAL_ASSETS,
        (total_shares as u128) + VIRTUAL_SHARES,
        rounding,
    )
}

/// Fee shares skimmed on every mint
///
/// The manager's cut is rounded up and the treasury's cut rounded down, so
/// a mint smaller than the divisor still pays the manager one share while
/// the treasury absorbs the rounding loss. Every minting path goes through
/// `FeeSplit::for_minted`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub manager: u64,
    pub treasury: u64,
}

impl FeeSplit {
    pub fn for_minted(shares: u64, fee_divisor: u64) -> Result<Self> {
        require!(fee_divisor > 0, VaultError::InvalidFeeDivisor);

        Ok(Self {
            manager: shares.div_ceil(fee_divisor),
            treasury: shares / fee_divisor,
        })
    }

    pub fn total(&self) -> Result<u64> {
        self.manager
            .checked_add(self.treasury)
            .ok_or(error!(VaultError::MathOverflow))
    }
}

/// Minimum acceptable output for `expected` under a slippage tolerance
pub fn min_out(expected: u64, slippage_bps: u16) -> Result<u64> {
    require!(
        slippage_bps as u64 <= BPS_DENOMINATOR,
        VaultError::InvalidSlippage
    );
    mul_div(
        expected as u128,
        (BPS_DENOMINATOR - slippage_bps as u64) as u128,
        BPS_DENOMINATOR as u128,
        Rounding::Down,
    )
}

/// Integer square root (floor)
pub fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }

    // Newton iteration from an over-estimate converges monotonically
    let mut x = 1u128 << ((128 - value.leading_zeros()).div_ceil(2));
    loop {
        let y = (x + value / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vault_uses_virtual_offset() {
        // Empty vault: 1 asset -> 1000 shares
        assert_eq!(assets_to_shares(1, 0, 0, Rounding::Down).unwrap(), 1_000);
        assert_eq!(shares_to_assets(1_000, 0, 0, Rounding::Down).unwrap(), 1);
    }

    #[test]
    fn test_rounding_directions() {
        // 10 * (3 + 1000) / (7 + 1) = 1253.75
        assert_eq!(assets_to_shares(10, 7, 3, Rounding::Down).unwrap(), 1253);
        assert_eq!(assets_to_shares(10, 7, 3, Rounding::Up).unwrap(), 1254);

        // 5 * 8 / 1003 = 0.0398...
        assert_eq!(shares_to_assets(5, 7, 3, Rounding::Down).unwrap(), 0);
        assert_eq!(shares_to_assets(5, 7, 3, Rounding::Up).unwrap(), 1);
    }

    #[test]
    fn test_round_trip_never_creates_value() {
        let cases = [
            (1u64, 0u64, 0u64),
            (999, 1_000_000, 1_000_000_000),
            (12_345, 777_777, 123_456_789),
            (u32::MAX as u64, 3, 5_000),
        ];
        for (assets, total_assets, total_shares) in cases {
            let shares = assets_to_shares(assets, total_assets, total_shares, Rounding::Down).unwrap();
            let back = shares_to_assets(shares, total_assets, total_shares, Rounding::Down).unwrap();
            assert!(back <= assets, "round trip created value: {} -> {}", assets, back);
        }
    }

    #[test]
    fn test_mul_div_overflow_and_zero() {
        assert!(mul_div(u128::MAX, 2, 1, Rounding::Down).is_err());
        assert!(mul_div(1, 1, 0, Rounding::Down).is_err());
        // Fits u128 but not u64
        assert!(mul_div(u64::MAX as u128, 4, 1, Rounding::Down).is_err());
    }

    #[test]
    fn test_fee_split_asymmetric_rounding() {
        let fees = FeeSplit::for_minted(2_500, 1_000).unwrap();
        assert_eq!(fees, FeeSplit { manager: 3, treasury: 2 });

        // Below the divisor the manager still earns one share
        let small = FeeSplit::for_minted(999, 1_000).unwrap();
        assert_eq!(small, FeeSplit { manager: 1, treasury: 0 });

        // Exact multiples round identically
        let exact = FeeSplit::for_minted(5_000, 1_000).unwrap();
        assert_eq!(exact, FeeSplit { manager: 5, treasury: 5 });

        assert_eq!(FeeSplit::for_minted(0, 1_000).unwrap().total().unwrap(), 0);
        assert!(FeeSplit::for_minted(10, 0).is_err());
    }

    #[test]
    fn test_min_out() {
        assert_eq!(min_out(10_000, 100).unwrap(), 9_900);
        assert_eq!(min_out(10_000, 0).unwrap(), 10_000);
        assert_eq!(min_out(3, 5_000).unwrap(), 1);
        assert!(min_out(1, 10_001).is_err());
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(1_000_000_000_000), 1_000_000);
        let big = (u64::MAX as u128) * (u64::MAX as u128);
        assert_eq!(isqrt(big), u64::MAX as u128);
    }
}
