
// Constants for the Guardian Vault program

/// Seed for the registry PDA (one per program)
pub const REGISTRY_SEED: &[u8] = b"registry";

/// Seed for the governance credential mint PDA
/// Full seed: ["governance_mint", registry]
pub const GOVERNANCE_MINT_SEED: &[u8] = b"governance_mint";

/// Seed for manager registry entries
/// Full seed: ["manager", manager, asset_mint]
pub const MANAGER_ENTRY_SEED: &[u8] = b"manager";

/// Seed for vault PDAs, also the vault's token authority
/// Full seed: ["vault", manager, asset_mint, index (u64 little-endian)]
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for the share mint PDA
/// Full seed: ["shares", vault]
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for the vault's idle asset custody account
/// Full seed: ["custody", vault]
pub const VAULT_CUSTODY_SEED: &[u8] = b"custody";

/// Seed for the share account holding manager-owned shares
/// Full seed: ["manager_escrow", vault]
pub const MANAGER_ESCROW_SEED: &[u8] = b"manager_escrow";

/// Seed for lending market PDAs
/// Full seed: ["lending_market", asset_mint]
pub const LENDING_MARKET_SEED: &[u8] = b"lending_market";

/// Seed for liquidity pool PDAs
/// Full seed: ["liquidity_pool", mint_a, mint_b]
pub const LIQUIDITY_POOL_SEED: &[u8] = b"liquidity_pool";

/// Seed for venue custody token accounts
/// Full seed: ["venue_custody", venue, mint]
pub const VENUE_CUSTODY_SEED: &[u8] = b"venue_custody";

/// Allocation weights are expressed in parts per thousand
pub const PER_MILLE: u16 = 1_000;

/// Basis point denominator for slippage and pool fees
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Share decimals exceed asset decimals by this offset
pub const DECIMALS_OFFSET: u8 = 3;

/// Virtual shares added to the supply in every conversion (10^DECIMALS_OFFSET)
pub const VIRTUAL_SHARES: u128 = 1_000;

/// Virtual assets added to total managed assets in every conversion
pub const VIRTUAL_ASSETS: u128 = 1;

/// Default manager/treasury fee divisor (0.1% + 0.1%)
pub const DEFAULT_FEE_DIVISOR: u64 = 1_000;

/// Smallest fee divisor governance may configure (5% + 5%)
pub const MIN_FEE_DIVISOR: u64 = 20;

/// Default slippage tolerance for strategy swaps and liquidity moves
pub const DEFAULT_MAX_SLIPPAGE_BPS: u16 = 100;

/// Upper bound a manager may configure for slippage tolerance
pub const MAX_SLIPPAGE_BPS: u16 = 1_000;

/// Upper bound for a liquidity pool swap fee
pub const MAX_POOL_FEE_BPS: u16 = 1_000;

/// Maximum number of supported assets in the registry
pub const MAX_SUPPORTED_ASSETS: usize = 8;

/// Maximum asset name length
pub const MAX_NAME_LEN: usize = 24;

/// Maximum asset symbol length
pub const MAX_SYMBOL_LEN: usize = 8;

/// Prefix for share token names ("Guardian USD Coin")
pub const SHARE_NAME_PREFIX: &str = "Guardian ";

/// Prefix for share token symbols ("gUSDC")
pub const SHARE_SYMBOL_PREFIX: &str = "g";
