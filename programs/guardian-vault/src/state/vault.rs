use anchor_lang::prelude::*;

use super::{AllocationPolicy, RegistryCapability};
use crate::{
    constants::*,
    errors::VaultError,
    math::{assets_to_shares, mul_div, shares_to_assets, FeeSplit, Rounding},
    strategy::{StrategyKind, Venues},
};

/// One vault per (manager, asset) pair
///
/// Security considerations:
/// - Every share-price-sensitive operation divests all strategies first,
///   so conversions always run against the true managed total
/// - `idle_assets` is tracked internally and always equals the custody
///   balance; tokens sent to custody directly are not counted
/// - `locked` is persisted before any token CPI and rejects nested entry
/// - `active` only ever goes from true to false, and only through a
///   `RegistryCapability`
#[account]
#[derive(Default, InitSpace)]
pub struct Vault {
    /// Manager ("guardian") controlling the allocation policy
    pub manager: Pubkey,

    /// Registry that created this vault; the only party able to deactivate it
    pub registry: Pubkey,

    /// Registration number within the registry, part of the PDA seeds
    pub index: u64,

    /// Base asset
    pub asset_mint: Pubkey,

    /// Asset paired with the base asset in the liquidity pool
    pub counter_mint: Pubkey,

    pub share_mint: Pubkey,

    /// Idle base asset custody
    pub custody: Pubkey,

    /// Share account holding every manager-owned share
    pub manager_escrow: Pubkey,

    /// Treasury share account receiving the treasury fee
    pub treasury: Pubkey,

    pub lending_market: Pubkey,
    pub liquidity_pool: Pubkey,

    /// "Guardian <asset name>"
    #[max_len(33)]
    pub share_name: String,

    /// "g<asset symbol>"
    #[max_len(9)]
    pub share_symbol: String,

    /// Fee shares per mint: manager ceil(k / d), treasury floor(k / d)
    pub fee_divisor: u64,

    pub policy: AllocationPolicy,

    /// Maximum assets accepted by a single deposit or mint
    pub deposit_limit: u64,

    /// Slippage bound for every pool swap, add and remove
    pub max_slippage_bps: u16,

    pub idle_assets: u64,
    pub total_shares: u64,

    /// Lending receipts held
    pub lending_receipts: u64,

    /// Pool liquidity units held
    pub pool_lp: u64,

    pub active: bool,
    pub locked: bool,

    pub bump: u8,
    pub share_mint_bump: u8,
    pub custody_bump: u8,
    pub escrow_bump: u8,
}

/// Parameters fixed when the registry creates a vault
#[derive(Clone, Debug, Default)]
pub struct VaultConfig {
    pub manager: Pubkey,
    pub registry: Pubkey,
    pub index: u64,
    pub asset_mint: Pubkey,
    pub counter_mint: Pubkey,
    pub share_mint: Pubkey,
    pub custody: Pubkey,
    pub manager_escrow: Pubkey,
    pub treasury: Pubkey,
    pub lending_market: Pubkey,
    pub liquidity_pool: Pubkey,
    pub share_name: String,
    pub share_symbol: String,
    pub fee_divisor: u64,
    pub policy: AllocationPolicy,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Invest,
    Divest,
}

/// One strategy movement performed during an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyMovement {
    pub kind: StrategyKind,
    pub direction: Direction,
    /// Base asset that left (invest) or returned to (divest) idle
    pub assets: u64,
    /// Base leg supplied to or taken from the position
    pub base_amount: u64,
    /// Counter leg supplied to or taken from the position
    pub counter_amount: u64,
    pub position_delta: u64,
    pub position_after: u64,
}

pub type Journal = Vec<StrategyMovement>;

/// Shares created by a deposit or mint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Issuance {
    pub assets: u64,
    /// Shares owed to the caller
    pub shares: u64,
    pub fees: FeeSplit,
    /// Caller is the manager: shares go to the escrow, not the caller
    pub to_escrow: bool,
}

impl Issuance {
    pub fn minted(&self) -> Result<u64> {
        self.shares
            .checked_add(self.fees.total()?)
            .ok_or(error!(VaultError::MathOverflow))
    }
}

/// Shares burned and assets paid out by a withdrawal-class operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Release {
    pub assets: u64,
    pub shares: u64,
}

impl Vault {
    pub fn init(&mut self, config: VaultConfig) -> Result<()> {
        config.policy.validate()?;
        require_gte!(
            config.fee_divisor,
            MIN_FEE_DIVISOR,
            VaultError::InvalidFeeDivisor
        );

        self.manager = config.manager;
        self.registry = config.registry;
        self.index = config.index;
        self.asset_mint = config.asset_mint;
        self.counter_mint = config.counter_mint;
        self.share_mint = config.share_mint;
        self.custody = config.custody;
        self.manager_escrow = config.manager_escrow;
        self.treasury = config.treasury;
        self.lending_market = config.lending_market;
        self.liquidity_pool = config.liquidity_pool;
        self.share_name = config.share_name;
        self.share_symbol = config.share_symbol;
        self.fee_divisor = config.fee_divisor;
        self.policy = config.policy;
        self.deposit_limit = u64::MAX;
        self.max_slippage_bps = DEFAULT_MAX_SLIPPAGE_BPS;
        self.idle_assets = 0;
        self.total_shares = 0;
        self.lending_receipts = 0;
        self.pool_lp = 0;
        self.active = true;
        self.locked = false;
        Ok(())
    }

    /// Acquire the in-progress guard for one operation
    pub fn enter(&mut self) -> Result<()> {
        require!(!self.locked, VaultError::ReentrantCall);
        self.locked = true;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.locked = false;
    }

    /// PDA signer seeds for custody transfers and share mint authority
    ///
    /// `index` is `self.index.to_le_bytes()`.
    pub fn signer_seeds<'a>(&'a self, index: &'a [u8; 8]) -> [&'a [u8]; 5] {
        [
            VAULT_SEED,
            self.manager.as_ref(),
            self.asset_mint.as_ref(),
            index,
            std::slice::from_ref(&self.bump),
        ]
    }

    pub fn position(&self, kind: StrategyKind) -> u64 {
        match kind {
            StrategyKind::Lending => self.lending_receipts,
            StrategyKind::LiquidityPool => self.pool_lp,
        }
    }

    fn position_mut(&mut self, kind: StrategyKind) -> &mut u64 {
        match kind {
            StrategyKind::Lending => &mut self.lending_receipts,
            StrategyKind::LiquidityPool => &mut self.pool_lp,
        }
    }

    /// Idle assets plus the current valuation of every position
    pub fn total_managed_assets(&self, venues: &mut Venues) -> Result<u64> {
        let mut total = self.idle_assets;
        for kind in StrategyKind::ALL {
            let position = self.position(kind);
            if position == 0 {
                continue;
            }
            let strategy = venues.adapter(
                kind,
                self.asset_mint,
                self.counter_mint,
                self.max_slippage_bps,
            )?;
            total = total
                .checked_add(strategy.valuate(position)?)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Assets `shares` currently redeem for
    pub fn preview_redeem(&self, shares: u64, venues: &mut Venues) -> Result<u64> {
        let total_assets = self.total_managed_assets(venues)?;
        shares_to_assets(shares, total_assets, self.total_shares, Rounding::Down)
    }

    /// Unwind every strategy position back to idle
    pub fn divest_all(&mut self, venues: &mut Venues, journal: &mut Journal) -> Result<()> {
        for kind in StrategyKind::ALL {
            let position = self.position(kind);
            if position == 0 {
                continue;
            }

            let mut strategy = venues.adapter(
                kind,
                self.asset_mint,
                self.counter_mint,
                self.max_slippage_bps,
            )?;
            let valuation = strategy.valuate(position)?;
            let out = strategy.divest(position)?;
            if out.assets > valuation {
                msg!(
                    "{:?} divest returned {} against a valuation of {}",
                    kind,
                    out.assets,
                    valuation
                );
                return err!(VaultError::ImplausibleValuation);
            }

            *self.position_mut(kind) = 0;
            self.idle_assets = self
                .idle_assets
                .checked_add(out.assets)
                .ok_or(VaultError::MathOverflow)?;

            journal.push(StrategyMovement {
                kind,
                direction: Direction::Divest,
                assets: out.assets,
                base_amount: out.base_amount,
                counter_amount: out.counter_amount,
                position_delta: position,
                position_after: 0,
            });
        }
        Ok(())
    }

    /// Deploy the idle balance according to the current policy
    ///
    /// Targets are floored per strategy, so rounding dust and anything a
    /// venue cannot absorb stays idle.
    pub fn invest_idle(&mut self, venues: &mut Venues, journal: &mut Journal) -> Result<()> {
        let investable = self.idle_assets;
        for kind in StrategyKind::ALL {
            let target = self.policy.target_for(kind, investable)?;
            if target == 0 {
                continue;
            }

            let mut strategy = venues.adapter(
                kind,
                self.asset_mint,
                self.counter_mint,
                self.max_slippage_bps,
            )?;
            let investment = strategy.invest(target)?;
            let consumed = investment.consumed(target);
            if consumed == 0 {
                continue;
            }

            self.idle_assets = self
                .idle_assets
                .checked_sub(consumed)
                .ok_or(VaultError::InsufficientIdleAssets)?;
            let position = self.position_mut(kind);
            *position = position
                .checked_add(investment.position_delta)
                .ok_or(VaultError::MathOverflow)?;
            let position_after = *position;

            journal.push(StrategyMovement {
                kind,
                direction: Direction::Invest,
                assets: consumed,
                base_amount: investment.base_amount,
                counter_amount: investment.counter_amount,
                position_delta: investment.position_delta,
                position_after,
            });
        }
        Ok(())
    }

    /// Divest everything and return the resynchronized managed total
    fn resync(&mut self, venues: &mut Venues, journal: &mut Journal) -> Result<u64> {
        self.divest_all(venues, journal)?;
        Ok(self.idle_assets)
    }

    pub fn deposit(
        &mut self,
        caller: &Pubkey,
        assets: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Issuance> {
        require!(self.active, VaultError::VaultInactive);
        require!(assets > 0, VaultError::ZeroAmount);
        require_gte!(
            self.deposit_limit,
            assets,
            VaultError::DepositExceedsLimit
        );

        let total_assets = self.resync(venues, journal)?;
        let shares = assets_to_shares(assets, total_assets, self.total_shares, Rounding::Down)?;
        self.issue(caller, assets, shares, total_assets, venues, journal)
    }

    /// Mint exactly `shares`, charging the assets they are worth (rounded up)
    pub fn mint(
        &mut self,
        caller: &Pubkey,
        shares: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Issuance> {
        require!(self.active, VaultError::VaultInactive);
        require!(shares > 0, VaultError::ShareAmountZero);

        let total_assets = self.resync(venues, journal)?;
        let assets = shares_to_assets(shares, total_assets, self.total_shares, Rounding::Up)?;
        require!(assets > 0, VaultError::ZeroAmount);
        require_gte!(
            self.deposit_limit,
            assets,
            VaultError::DepositExceedsLimit
        );
        self.issue(caller, assets, shares, total_assets, venues, journal)
    }

    /// Single minting path: fee shares, conservation check, reinvest
    fn issue(
        &mut self,
        caller: &Pubkey,
        assets: u64,
        shares: u64,
        total_assets: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Issuance> {
        require!(shares > 0, VaultError::ShareAmountZero);

        let fees = FeeSplit::for_minted(shares, self.fee_divisor)?;
        let total_shares = self
            .total_shares
            .checked_add(shares)
            .and_then(|s| s.checked_add(fees.manager))
            .and_then(|s| s.checked_add(fees.treasury))
            .ok_or(VaultError::MathOverflow)?;
        let total_after = total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;

        // The new shares must not redeem for more than was paid in
        let redeemable = shares_to_assets(shares, total_after, total_shares, Rounding::Down)?;
        if redeemable > assets {
            msg!(
                "{} shares would redeem {} for {} contributed",
                shares,
                redeemable,
                assets
            );
            return err!(VaultError::ConservationViolation);
        }

        self.idle_assets = self
            .idle_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_shares = total_shares;

        self.invest_idle(venues, journal)?;

        Ok(Issuance {
            assets,
            shares,
            fees,
            to_escrow: *caller == self.manager,
        })
    }

    /// Burn the shares worth `assets` (rounded up) and pay `assets` out
    pub fn withdraw(
        &mut self,
        caller: &Pubkey,
        assets: u64,
        holder_shares: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Release> {
        self.reject_manager(caller)?;
        require!(assets > 0, VaultError::ZeroAmount);

        let total_assets = self.resync(venues, journal)?;
        let shares = assets_to_shares(assets, total_assets, self.total_shares, Rounding::Up)?;
        self.release(assets, shares, holder_shares, venues, journal)
    }

    /// Burn exactly `shares` and pay out what they are worth (rounded down)
    pub fn redeem(
        &mut self,
        caller: &Pubkey,
        shares: u64,
        holder_shares: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Release> {
        self.reject_manager(caller)?;
        require!(shares > 0, VaultError::ShareAmountZero);

        let total_assets = self.resync(venues, journal)?;
        let assets = shares_to_assets(shares, total_assets, self.total_shares, Rounding::Down)?;
        require!(assets > 0, VaultError::ZeroAmount);
        self.release(assets, shares, holder_shares, venues, journal)
    }

    fn release(
        &mut self,
        assets: u64,
        shares: u64,
        holder_shares: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Release> {
        if shares > holder_shares {
            msg!("Burn of {} shares exceeds balance {}", shares, holder_shares);
            return err!(VaultError::InsufficientShares);
        }
        require_gte!(self.total_shares, shares, VaultError::InsufficientShares);
        require_gte!(
            self.idle_assets,
            assets,
            VaultError::InsufficientIdleAssets
        );

        self.total_shares -= shares;
        self.idle_assets -= assets;

        if self.active {
            self.invest_idle(venues, journal)?;
        }

        Ok(Release { assets, shares })
    }

    pub fn rebalance(
        &mut self,
        caller: &Pubkey,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<()> {
        self.require_manager(caller)?;
        require!(self.active, VaultError::VaultInactive);
        if !self.has_drifted(venues)? {
            msg!("Positions within tolerance of the policy");
            return Ok(());
        }
        self.divest_all(venues, journal)?;
        self.invest_idle(venues, journal)
    }

    /// Whether any position is further from its policy target than the
    /// slippage bound allows
    ///
    /// Targets are taken against the current managed total and capped by
    /// what the venue would accept on a fresh investment.
    pub fn has_drifted(&self, venues: &mut Venues) -> Result<bool> {
        let total = self.total_managed_assets(venues)?;
        for kind in StrategyKind::ALL {
            let position = self.position(kind);
            let target = self.policy.target_for(kind, total)?;
            if position == 0 && target == 0 {
                continue;
            }

            let strategy = venues.adapter(
                kind,
                self.asset_mint,
                self.counter_mint,
                self.max_slippage_bps,
            )?;
            let target = target.min(strategy.capacity(position)?);
            let value = if position == 0 {
                0
            } else {
                strategy.valuate(position)?
            };
            let tolerance = mul_div(
                target as u128,
                self.max_slippage_bps as u128,
                BPS_DENOMINATOR as u128,
                Rounding::Down,
            )?;
            if value.abs_diff(target) > tolerance {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Replace the policy and rebalance onto it
    ///
    /// The previous policy is left untouched unless the new one is valid.
    pub fn update_policy(
        &mut self,
        caller: &Pubkey,
        policy: AllocationPolicy,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<()> {
        self.require_manager(caller)?;
        require!(self.active, VaultError::VaultInactive);
        policy.validate()?;

        self.policy = policy;
        self.divest_all(venues, journal)?;
        self.invest_idle(venues, journal)
    }

    pub fn configure(
        &mut self,
        caller: &Pubkey,
        deposit_limit: u64,
        max_slippage_bps: u16,
    ) -> Result<()> {
        self.require_manager(caller)?;
        require!(self.active, VaultError::VaultInactive);
        require!(deposit_limit > 0, VaultError::ZeroAmount);
        require_gte!(
            MAX_SLIPPAGE_BPS,
            max_slippage_bps,
            VaultError::InvalidSlippage
        );

        self.deposit_limit = deposit_limit;
        self.max_slippage_bps = max_slippage_bps;
        Ok(())
    }

    /// One-way switch to inactive; everything is brought back to idle so
    /// remaining holders can always withdraw
    pub fn deactivate(
        &mut self,
        capability: &RegistryCapability,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<()> {
        self.check_registry(capability)?;
        require!(self.active, VaultError::VaultAlreadyInactive);

        self.divest_all(venues, journal)?;
        self.active = false;
        Ok(())
    }

    /// Redeem escrowed manager shares; reachable only through the registry
    pub fn redeem_manager_stake(
        &mut self,
        capability: &RegistryCapability,
        shares: u64,
        venues: &mut Venues,
        journal: &mut Journal,
    ) -> Result<Release> {
        self.check_registry(capability)?;
        if shares == 0 {
            return Ok(Release::default());
        }

        let total_assets = self.resync(venues, journal)?;
        let assets = shares_to_assets(shares, total_assets, self.total_shares, Rounding::Down)?;
        self.release(assets, shares, shares, venues, journal)
    }

    fn require_manager(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.manager, VaultError::NotManager);
        Ok(())
    }

    fn reject_manager(&self, caller: &Pubkey) -> Result<()> {
        require!(*caller != self.manager, VaultError::ManagerExitOnly);
        Ok(())
    }

    fn check_registry(&self, capability: &RegistryCapability) -> Result<()> {
        require_keys_eq!(
            capability.registry(),
            self.registry,
            VaultError::NotRegistry
        );
        Ok(())
    }
}
