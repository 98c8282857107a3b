use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use super::settlement::*;
use crate::{constants::*, errors::*, events::*, state::*};

/// Manager operations that move capital between idle and strategies
///
/// The manager check happens in the engine so the error is a typed
/// `NotManager` rather than a seeds mismatch.
#[derive(Accounts)]
pub struct ManageVault<'info> {
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [
            VAULT_SEED,
            vault.manager.as_ref(),
            vault.asset_mint.as_ref(),
            &vault.index.to_le_bytes(),
        ],
        bump = vault.bump,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        address = vault.custody @ VaultError::InvalidOwner,
    )]
    pub vault_custody: Box<Account<'info, TokenAccount>>,

    pub venues: StrategyVenues<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn rebalance_handler(ctx: Context<ManageVault>) -> Result<()> {
    reallocate(ctx, None)
}

pub fn update_policy_handler(ctx: Context<ManageVault>, policy: AllocationPolicy) -> Result<()> {
    reallocate(ctx, Some(policy))
}

fn reallocate(ctx: Context<ManageVault>, policy: Option<AllocationPolicy>) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let manager = accounts.manager.key();
    let vault_key = accounts.vault.key();
    let old_policy = accounts.vault.policy;

    accounts.venues.validate(&accounts.vault)?;
    accounts.vault.enter()?;

    let before = accounts.venues.snapshot(&accounts.vault)?;
    let mut journal = Journal::new();
    {
        let mut venues = accounts.venues.engine();
        match policy {
            Some(policy) => {
                accounts
                    .vault
                    .update_policy(&manager, policy, &mut venues, &mut journal)?
            }
            None => accounts
                .vault
                .rebalance(&manager, &mut venues, &mut journal)?,
        }
    }
    let flows = VenueFlows::between(before, accounts.venues.snapshot(&accounts.vault)?)?;
    accounts.vault.exit(&crate::ID)?;

    let token_program = accounts.token_program.to_account_info();
    let custody = accounts.vault_custody.to_account_info();
    accounts.venues.pull(&flows, &custody, &token_program)?;
    {
        let index = accounts.vault.index.to_le_bytes();
        let seeds = accounts.vault.signer_seeds(&index);
        let signer = &[&seeds[..]];
        let vault_info = accounts.vault.to_account_info();
        accounts
            .venues
            .push(&flows, &custody, &vault_info, signer, &token_program)?;
    }

    accounts.vault.leave();

    emit_movements(vault_key, &accounts.vault, &journal)?;
    let timestamp = Clock::get()?.unix_timestamp;
    if let Some(policy) = policy {
        emit!(PolicyUpdated {
            vault: vault_key,
            manager,
            old_policy,
            new_policy: policy,
            timestamp,
        });
    }
    emit!(Rebalanced {
        vault: vault_key,
        manager,
        idle_assets: accounts.vault.idle_assets,
        lending_receipts: accounts.vault.lending_receipts,
        pool_lp: accounts.vault.pool_lp,
        timestamp,
    });

    Ok(())
}

/// Per-vault limits
#[derive(Accounts)]
pub struct ConfigureVault<'info> {
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [
            VAULT_SEED,
            vault.manager.as_ref(),
            vault.asset_mint.as_ref(),
            &vault.index.to_le_bytes(),
        ],
        bump = vault.bump,
    )]
    pub vault: Box<Account<'info, Vault>>,
}

pub fn configure_handler(
    ctx: Context<ConfigureVault>,
    deposit_limit: u64,
    max_slippage_bps: u16,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    vault.configure(&ctx.accounts.manager.key(), deposit_limit, max_slippage_bps)?;

    msg!(
        "Vault configured: deposit limit {}, max slippage {} bps",
        deposit_limit,
        max_slippage_bps
    );

    emit!(VaultConfigured {
        vault: vault.key(),
        deposit_limit,
        max_slippage_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
