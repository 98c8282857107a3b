use anchor_lang::prelude::*;

use crate::{state::AllocationPolicy, strategy::StrategyKind};

/// Event emitted when the registry is created
#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub governance_mint: Pubkey,
    pub fee_divisor: u64,
    pub stake_amount: u64,
    pub credential_amount: u64,
    pub timestamp: i64,
}

/// Event emitted when governance adds a vaultable asset
#[event]
pub struct AssetSupported {
    pub registry: Pubkey,
    pub asset_mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub timestamp: i64,
}

#[event]
pub struct FeeDivisorUpdated {
    pub registry: Pubkey,
    pub old_fee_divisor: u64,
    pub new_fee_divisor: u64,
    pub timestamp: i64,
}

#[event]
pub struct LendingMarketCreated {
    pub market: Pubkey,
    pub asset_mint: Pubkey,
    pub custody: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct LiquidityPoolCreated {
    pub pool: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub lp_supply: u64,
    pub fee_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when external yield lands in a lending market
#[event]
pub struct InterestAccrued {
    pub market: Pubkey,
    pub amount: u64,
    pub total_liquidity: u64,
    pub receipt_supply: u64,
    pub timestamp: i64,
}

/// Event emitted when a manager registers and their vault is created
#[event]
pub struct VaultRegistered {
    pub registry: Pubkey,
    pub vault: Pubkey,
    pub manager: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub share_name: String,
    pub share_symbol: String,
    pub fee_divisor: u64,
    pub stake_amount: u64,
    pub credential_amount: u64,
    pub policy: AllocationPolicy,
    pub timestamp: i64,
}

/// Event emitted for every deposit, including the registration stake
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub manager_fee_shares: u64,
    pub treasury_fee_shares: u64,
    pub to_escrow: bool,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when exact shares are minted
#[event]
pub struct SharesMinted {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub manager_fee_shares: u64,
    pub treasury_fee_shares: u64,
    pub to_escrow: bool,
    pub total_shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_burned: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct Redeemed {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_burned: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Base asset moved into a strategy
///
/// `base_amount` and `counter_amount` are always in the vault's own
/// orientation, whatever the pool's canonical ordering.
#[event]
pub struct StrategyInvested {
    pub vault: Pubkey,
    pub strategy: StrategyKind,
    pub base_mint: Pubkey,
    pub counter_mint: Pubkey,
    pub asset_amount: u64,
    pub base_amount: u64,
    pub counter_amount: u64,
    pub position_delta: u64,
    pub position: u64,
    pub timestamp: i64,
}

/// Strategy position unwound back to idle
#[event]
pub struct StrategyDivested {
    pub vault: Pubkey,
    pub strategy: StrategyKind,
    pub base_mint: Pubkey,
    pub counter_mint: Pubkey,
    pub asset_amount: u64,
    pub base_amount: u64,
    pub counter_amount: u64,
    pub position_delta: u64,
    pub position: u64,
    pub timestamp: i64,
}

#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub manager: Pubkey,
    pub idle_assets: u64,
    pub lending_receipts: u64,
    pub pool_lp: u64,
    pub timestamp: i64,
}

#[event]
pub struct PolicyUpdated {
    pub vault: Pubkey,
    pub manager: Pubkey,
    pub old_policy: AllocationPolicy,
    pub new_policy: AllocationPolicy,
    pub timestamp: i64,
}

#[event]
pub struct VaultConfigured {
    pub vault: Pubkey,
    pub deposit_limit: u64,
    pub max_slippage_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct VaultDeactivated {
    pub vault: Pubkey,
    pub registry: Pubkey,
    pub idle_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a manager leaves through the registry
#[event]
pub struct ManagerExited {
    pub registry: Pubkey,
    pub vault: Pubkey,
    pub manager: Pubkey,
    pub credential_burned: u64,
    pub shares_redeemed: u64,
    pub assets_returned: u64,
    pub timestamp: i64,
}
