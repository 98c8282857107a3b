// Guardian Vault - manager-run pooled vault over lending and liquidity-pool strategies
// Security: Every share-price-sensitive operation resyncs strategy positions first
// Architecture: Registry creates vaults; vaults deploy capital through strategy adapters

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod strategy;

use instructions::*;
use state::AllocationPolicy;

declare_id!("GuARDvAu1tpVmXq8Dn3cYkLh6RwTsZ4oBeFgNjKxHiQ");

#[program]
pub mod guardian_vault {
    use super::*;

    /// Create the registry and its governance credential mint
    ///
    /// Security considerations:
    /// - Rejects a fee divisor below the minimum (zero included)
    /// - Canonical pair mints must differ
    pub fn initialize_registry(
        ctx: Context<InitializeRegistry>,
        fee_divisor: u64,
        stake_amount: u64,
        credential_amount: u64,
    ) -> Result<()> {
        instructions::initialize_registry::handler(ctx, fee_divisor, stake_amount, credential_amount)
    }

    /// Allow vaults over an asset, with the labels its share token uses
    pub fn add_supported_asset(
        ctx: Context<AddSupportedAsset>,
        name: String,
        symbol: String,
    ) -> Result<()> {
        instructions::governance::add_supported_asset_handler(ctx, name, symbol)
    }

    /// Change the fee divisor given to newly registered vaults
    ///
    /// Security considerations:
    /// - Governance-only (has_one constraint)
    /// - Rejects zero and anything below MIN_FEE_DIVISOR
    pub fn set_fee_divisor(ctx: Context<SetFeeDivisor>, fee_divisor: u64) -> Result<()> {
        instructions::governance::set_fee_divisor_handler(ctx, fee_divisor)
    }

    pub fn create_lending_market(ctx: Context<CreateLendingMarket>) -> Result<()> {
        instructions::venues::create_lending_market_handler(ctx)
    }

    /// Open and seed a constant-product pool; mints must be in canonical order
    pub fn create_liquidity_pool(
        ctx: Context<CreateLiquidityPool>,
        fee_bps: u16,
        seed_a: u64,
        seed_b: u64,
    ) -> Result<()> {
        instructions::venues::create_liquidity_pool_handler(ctx, fee_bps, seed_a, seed_b)
    }

    /// Permissionless: pays yield into a lending market
    pub fn accrue_lending_interest(ctx: Context<AccrueLendingInterest>, amount: u64) -> Result<()> {
        instructions::venues::accrue_interest_handler(ctx, amount)
    }

    /// Register a manager, create their vault and deposit the stake
    ///
    /// Security considerations:
    /// - One vault per (manager, asset), enforced by the entry PDA
    /// - Share labels come from the registry entry for this asset
    /// - Stake goes through the same deposit path, fees included
    /// - Mints the governance credential to the manager
    pub fn register_manager(ctx: Context<RegisterManager>, policy: AllocationPolicy) -> Result<()> {
        instructions::register_manager::handler(ctx, policy)
    }

    /// Deactivate the vault, burn the credential, redeem escrowed manager
    /// shares and close the entry, atomically
    pub fn exit_manager(ctx: Context<ExitManager>) -> Result<()> {
        instructions::exit_manager::handler(ctx)
    }

    /// Deposit exact assets and receive shares
    ///
    /// Security considerations:
    /// - Divests every strategy before pricing
    /// - Manager and treasury fee shares minted on every deposit
    /// - `min_shares_out` bounds the caller's shares
    pub fn deposit(ctx: Context<Deposit>, amount: u64, min_shares_out: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount, min_shares_out)
    }

    /// Mint exact shares; same resync and fees as `deposit`
    pub fn mint_shares(ctx: Context<Deposit>, shares: u64, max_assets_in: u64) -> Result<()> {
        instructions::deposit::mint_handler(ctx, shares, max_assets_in)
    }

    /// Withdraw exact assets; rejected for the manager
    pub fn withdraw(ctx: Context<Withdraw>, assets: u64, max_shares_in: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, assets, max_shares_in)
    }

    /// Redeem exact shares; rejected for the manager
    pub fn redeem(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64) -> Result<()> {
        instructions::withdraw::redeem_handler(ctx, shares, min_assets_out)
    }

    /// Divest everything and reinvest per the current policy
    pub fn rebalance(ctx: Context<ManageVault>) -> Result<()> {
        instructions::manage::rebalance_handler(ctx)
    }

    /// Replace the allocation policy (weights sum to 1000) and rebalance
    pub fn update_policy(ctx: Context<ManageVault>, policy: AllocationPolicy) -> Result<()> {
        instructions::manage::update_policy_handler(ctx, policy)
    }

    pub fn configure_vault(
        ctx: Context<ConfigureVault>,
        deposit_limit: u64,
        max_slippage_bps: u16,
    ) -> Result<()> {
        instructions::manage::configure_handler(ctx, deposit_limit, max_slippage_bps)
    }
}
