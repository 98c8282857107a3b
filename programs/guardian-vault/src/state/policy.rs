use anchor_lang::prelude::*;

use crate::{
    constants::PER_MILLE,
    errors::VaultError,
    math::{mul_div, Rounding},
    strategy::StrategyKind,
};

/// Split of managed assets between idle holding and each strategy,
/// in parts per thousand
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct AllocationPolicy {
    pub hold: u16,
    pub lending: u16,
    pub liquidity_pool: u16,
}

impl AllocationPolicy {
    pub const HOLD_ALL: Self = Self {
        hold: PER_MILLE,
        lending: 0,
        liquidity_pool: 0,
    };

    pub fn new(hold: u16, lending: u16, liquidity_pool: u16) -> Self {
        Self {
            hold,
            lending,
            liquidity_pool,
        }
    }

    /// Weights summed without overflow
    pub fn total(&self) -> u32 {
        self.hold as u32 + self.lending as u32 + self.liquidity_pool as u32
    }

    pub fn validate(&self) -> Result<()> {
        require_eq!(self.total(), PER_MILLE as u32, VaultError::InvalidAllocation);
        Ok(())
    }

    pub fn weight(&self, kind: StrategyKind) -> u16 {
        match kind {
            StrategyKind::Lending => self.lending,
            StrategyKind::LiquidityPool => self.liquidity_pool,
        }
    }

    /// Assets to deploy into `kind` out of `investable` (floored)
    pub fn target_for(&self, kind: StrategyKind, investable: u64) -> Result<u64> {
        mul_div(
            investable as u128,
            self.weight(kind) as u128,
            PER_MILLE as u128,
            Rounding::Down,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_must_sum_to_one_thousand() {
        assert!(AllocationPolicy::new(200, 500, 300).validate().is_ok());
        assert!(AllocationPolicy::HOLD_ALL.validate().is_ok());
        assert!(AllocationPolicy::new(200, 500, 299).validate().is_err());
        assert!(AllocationPolicy::new(1_000, 1, 0).validate().is_err());
        assert!(AllocationPolicy::new(u16::MAX, u16::MAX, 2).validate().is_err());
    }

    #[test]
    fn test_targets_floor() {
        let policy = AllocationPolicy::new(333, 333, 334);
        assert_eq!(policy.target_for(StrategyKind::Lending, 1_000).unwrap(), 333);
        assert_eq!(policy.target_for(StrategyKind::LiquidityPool, 10).unwrap(), 3);
        assert_eq!(policy.target_for(StrategyKind::Lending, 0).unwrap(), 0);
    }
}
