use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, MintTo, TokenAccount, Transfer};

use crate::{constants::*, errors::VaultError, events::*, state::*, strategy::Venues};

/// Strategy venues carried by every vault operation that may resync
///
/// Security: Venue PDAs are validated by seeds here; that they are the
/// vault's own venues is checked by `validate` before the engine runs.
#[derive(Accounts)]
pub struct StrategyVenues<'info> {
    #[account(
        mut,
        seeds = [LENDING_MARKET_SEED, lending_market.asset_mint.as_ref()],
        bump = lending_market.bump,
    )]
    pub lending_market: Box<Account<'info, LendingMarket>>,

    #[account(
        mut,
        address = lending_market.custody @ VaultError::InvalidVenue,
    )]
    pub lending_custody: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [
            LIQUIDITY_POOL_SEED,
            liquidity_pool.mint_a.as_ref(),
            liquidity_pool.mint_b.as_ref(),
        ],
        bump = liquidity_pool.bump,
    )]
    pub liquidity_pool: Box<Account<'info, LiquidityPool>>,

    /// Pool custody holding the vault's base asset
    #[account(mut)]
    pub pool_base_custody: Box<Account<'info, TokenAccount>>,
}

/// Venue balances as tracked by venue state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VenueSnapshot {
    pub lending: u64,
    pub pool_base: u64,
    pub pool_counter: u64,
}

/// Net base asset owed between vault custody and each venue
///
/// Positive: vault -> venue. Negative: venue -> vault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VenueFlows {
    pub lending: i128,
    pub pool: i128,
}

impl VenueFlows {
    pub fn between(before: VenueSnapshot, after: VenueSnapshot) -> Result<Self> {
        // Counter legs are swapped inside the pool and must net to zero
        require_eq!(
            before.pool_counter,
            after.pool_counter,
            VaultError::ConservationViolation
        );
        Ok(Self {
            lending: after.lending as i128 - before.lending as i128,
            pool: after.pool_base as i128 - before.pool_base as i128,
        })
    }
}

fn flow_amount(flow: i128) -> Result<u64> {
    u64::try_from(flow.unsigned_abs()).map_err(|_| error!(VaultError::MathOverflow))
}

impl<'info> StrategyVenues<'info> {
    pub fn validate(&self, vault: &Vault) -> Result<()> {
        require_keys_eq!(
            self.lending_market.key(),
            vault.lending_market,
            VaultError::InvalidVenue
        );
        require_keys_eq!(
            self.liquidity_pool.key(),
            vault.liquidity_pool,
            VaultError::InvalidVenue
        );
        require_keys_eq!(
            self.pool_base_custody.key(),
            self.liquidity_pool.custody_for(&vault.asset_mint)?,
            VaultError::InvalidVenue
        );
        Ok(())
    }

    pub fn snapshot(&self, vault: &Vault) -> Result<VenueSnapshot> {
        Ok(VenueSnapshot {
            lending: self.lending_market.total_liquidity,
            pool_base: self.liquidity_pool.reserve_of(&vault.asset_mint)?,
            pool_counter: self.liquidity_pool.reserve_of(&vault.counter_mint)?,
        })
    }

    /// Mutable venue state for the engine
    pub fn engine(&mut self) -> Venues<'_> {
        Venues::new(&mut self.lending_market, &mut self.liquidity_pool)
    }

    /// Venue -> vault legs, signed by the venue PDAs
    pub fn pull(
        &self,
        flows: &VenueFlows,
        vault_custody: &AccountInfo<'info>,
        token_program: &AccountInfo<'info>,
    ) -> Result<()> {
        if flows.lending < 0 {
            let market = &self.lending_market;
            let seeds: &[&[u8]] = &[
                LENDING_MARKET_SEED,
                market.asset_mint.as_ref(),
                &[market.bump],
            ];
            transfer_tokens(
                token_program,
                &self.lending_custody.to_account_info(),
                vault_custody,
                &market.to_account_info(),
                &[seeds],
                flow_amount(flows.lending)?,
            )?;
        }

        if flows.pool < 0 {
            let pool = &self.liquidity_pool;
            let seeds: &[&[u8]] = &[
                LIQUIDITY_POOL_SEED,
                pool.mint_a.as_ref(),
                pool.mint_b.as_ref(),
                &[pool.bump],
            ];
            transfer_tokens(
                token_program,
                &self.pool_base_custody.to_account_info(),
                vault_custody,
                &pool.to_account_info(),
                &[seeds],
                flow_amount(flows.pool)?,
            )?;
        }
        Ok(())
    }

    /// Vault -> venue legs, signed by the vault PDA
    pub fn push(
        &self,
        flows: &VenueFlows,
        vault_custody: &AccountInfo<'info>,
        vault: &AccountInfo<'info>,
        vault_signer: &[&[&[u8]]],
        token_program: &AccountInfo<'info>,
    ) -> Result<()> {
        if flows.lending > 0 {
            transfer_tokens(
                token_program,
                vault_custody,
                &self.lending_custody.to_account_info(),
                vault,
                vault_signer,
                flow_amount(flows.lending)?,
            )?;
        }
        if flows.pool > 0 {
            transfer_tokens(
                token_program,
                vault_custody,
                &self.pool_base_custody.to_account_info(),
                vault,
                vault_signer,
                flow_amount(flows.pool)?,
            )?;
        }
        Ok(())
    }
}

pub fn transfer_tokens<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    signer: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        Transfer {
            from: from.clone(),
            to: to.clone(),
            authority: authority.clone(),
        },
        signer,
    );
    token::transfer(cpi_ctx, amount).map_err(|e| {
        msg!("Transfer of {} failed: {:?}", amount, e);
        error!(VaultError::TransferFailed)
    })
}

pub fn mint_tokens<'info>(
    token_program: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    signer: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        MintTo {
            mint: mint.clone(),
            to: to.clone(),
            authority: authority.clone(),
        },
        signer,
    );
    token::mint_to(cpi_ctx, amount).map_err(|e| {
        msg!("Mint of {} failed: {:?}", amount, e);
        error!(VaultError::TransferFailed)
    })
}

pub fn burn_tokens<'info>(
    token_program: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    signer: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        Burn {
            mint: mint.clone(),
            from: from.clone(),
            authority: authority.clone(),
        },
        signer,
    );
    token::burn(cpi_ctx, amount).map_err(|e| {
        msg!("Burn of {} failed: {:?}", amount, e);
        error!(VaultError::TransferFailed)
    })
}

/// Emit one event per strategy movement, labelled in the vault's orientation
pub fn emit_movements(vault_key: Pubkey, vault: &Vault, journal: &Journal) -> Result<()> {
    let timestamp = Clock::get()?.unix_timestamp;
    for movement in journal {
        match movement.direction {
            Direction::Invest => emit!(StrategyInvested {
                vault: vault_key,
                strategy: movement.kind,
                base_mint: vault.asset_mint,
                counter_mint: vault.counter_mint,
                asset_amount: movement.assets,
                base_amount: movement.base_amount,
                counter_amount: movement.counter_amount,
                position_delta: movement.position_delta,
                position: movement.position_after,
                timestamp,
            }),
            Direction::Divest => emit!(StrategyDivested {
                vault: vault_key,
                strategy: movement.kind,
                base_mint: vault.asset_mint,
                counter_mint: vault.counter_mint,
                asset_amount: movement.assets,
                base_amount: movement.base_amount,
                counter_amount: movement.counter_amount,
                position_delta: movement.position_delta,
                position: movement.position_after,
                timestamp,
            }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flows_are_signed_by_direction() {
        let before = VenueSnapshot {
            lending: 1_000,
            pool_base: 500,
            pool_counter: 700,
        };
        let after = VenueSnapshot {
            lending: 400,
            pool_base: 900,
            pool_counter: 700,
        };
        let flows = VenueFlows::between(before, after).unwrap();
        assert_eq!(flows, VenueFlows { lending: -600, pool: 400 });
        assert_eq!(flow_amount(flows.lending).unwrap(), 600);
    }

    #[test]
    fn test_counter_reserve_must_net_to_zero() {
        let before = VenueSnapshot {
            lending: 0,
            pool_base: 0,
            pool_counter: 700,
        };
        let after = VenueSnapshot {
            pool_counter: 699,
            ..before
        };
        assert!(VenueFlows::between(before, after).is_err());
    }
}
