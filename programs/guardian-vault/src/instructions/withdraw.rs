use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use super::settlement::*;
use crate::{constants::*, errors::*, events::*, state::*};

/// Burn shares and take assets out of the vault
///
/// Shared by `withdraw` (exact assets) and `redeem` (exact shares). Allowed
/// on inactive vaults; never allowed for the manager.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share holder
    /// Security: Must be signer, authority over the burned shares
    pub user: Signer<'info>,

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
        address = vault.share_mint @ VaultError::InvalidMint,
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        address = vault.custody @ VaultError::InvalidOwner,
    )]
    pub vault_custody: Box<Account<'info, TokenAccount>>,

    /// User's asset token account (destination)
    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Box<Account<'info, TokenAccount>>,

    /// User's share token account (burned from)
    #[account(
        mut,
        constraint = user_share_account.mint == vault.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Box<Account<'info, TokenAccount>>,

    pub venues: StrategyVenues<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Clone, Copy)]
enum Request {
    Assets { assets: u64, max_shares_in: u64 },
    Shares { shares: u64, min_assets_out: u64 },
}

pub fn handler(ctx: Context<Withdraw>, assets: u64, max_shares_in: u64) -> Result<()> {
    leave_vault(
        ctx,
        Request::Assets {
            assets,
            max_shares_in,
        },
    )
}

pub fn redeem_handler(ctx: Context<Withdraw>, shares: u64, min_assets_out: u64) -> Result<()> {
    leave_vault(
        ctx,
        Request::Shares {
            shares,
            min_assets_out,
        },
    )
}

fn leave_vault(ctx: Context<Withdraw>, request: Request) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let user = accounts.user.key();
    let vault_key = accounts.vault.key();
    let holder_shares = accounts.user_share_account.amount;

    // CHECKS
    accounts.venues.validate(&accounts.vault)?;
    accounts.vault.enter()?;

    // EFFECTS: Resync, burn, reinvest the rest while active
    let before = accounts.venues.snapshot(&accounts.vault)?;
    let mut journal = Journal::new();
    let released = {
        let mut venues = accounts.venues.engine();
        match request {
            Request::Assets { assets, .. } => accounts.vault.withdraw(
                &user,
                assets,
                holder_shares,
                &mut venues,
                &mut journal,
            )?,
            Request::Shares { shares, .. } => accounts.vault.redeem(
                &user,
                shares,
                holder_shares,
                &mut venues,
                &mut journal,
            )?,
        }
    };
    match request {
        Request::Assets { max_shares_in, .. } => {
            require_gte!(max_shares_in, released.shares, VaultError::SlippageExceeded)
        }
        Request::Shares { min_assets_out, .. } => {
            require_gte!(released.assets, min_assets_out, VaultError::SlippageExceeded)
        }
    }
    let flows = VenueFlows::between(before, accounts.venues.snapshot(&accounts.vault)?)?;
    accounts.vault.exit(&crate::ID)?;

    // INTERACTIONS: venues in, burn, pay out, venues out
    let token_program = accounts.token_program.to_account_info();
    let custody = accounts.vault_custody.to_account_info();
    accounts.venues.pull(&flows, &custody, &token_program)?;

    burn_tokens(
        &token_program,
        &accounts.share_mint.to_account_info(),
        &accounts.user_share_account.to_account_info(),
        &accounts.user.to_account_info(),
        &[],
        released.shares,
    )?;

    {
        let index = accounts.vault.index.to_le_bytes();
        let seeds = accounts.vault.signer_seeds(&index);
        let signer = &[&seeds[..]];
        let vault_info = accounts.vault.to_account_info();

        transfer_tokens(
            &token_program,
            &custody,
            &accounts.user_asset_account.to_account_info(),
            &vault_info,
            signer,
            released.assets,
        )?;
        accounts
            .venues
            .push(&flows, &custody, &vault_info, signer, &token_program)?;
    }

    accounts.vault.leave();

    emit_movements(vault_key, &accounts.vault, &journal)?;
    let timestamp = Clock::get()?.unix_timestamp;
    match request {
        Request::Assets { .. } => emit!(Withdrawn {
            vault: vault_key,
            user,
            asset_amount: released.assets,
            shares_burned: released.shares,
            total_shares: accounts.vault.total_shares,
            timestamp,
        }),
        Request::Shares { .. } => emit!(Redeemed {
            vault: vault_key,
            user,
            asset_amount: released.assets,
            shares_burned: released.shares,
            total_shares: accounts.vault.total_shares,
            timestamp,
        }),
    }

    Ok(())
}
