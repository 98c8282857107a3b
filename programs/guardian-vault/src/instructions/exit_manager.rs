use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use super::settlement::*;
use crate::{constants::*, errors::*, events::*, state::*};

/// Manager exit through the registry
///
/// In one instruction: deactivate the vault, burn the credential minted at
/// registration, redeem every escrowed manager share, close the entry.
#[derive(Accounts)]
pub struct ExitManager<'info> {
    #[account(mut)]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Box<Account<'info, Registry>>,

    /// Security: Closed to the manager once the exit completes
    #[account(
        mut,
        close = manager,
        seeds = [MANAGER_ENTRY_SEED, manager.key().as_ref(), manager_entry.asset_mint.as_ref()],
        bump = manager_entry.bump,
        has_one = manager @ VaultError::NotManager,
        has_one = vault @ VaultError::NotManager,
    )]
    pub manager_entry: Box<Account<'info, ManagerEntry>>,

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

    #[account(
        mut,
        address = vault.manager_escrow @ VaultError::InvalidOwner,
    )]
    pub manager_escrow: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        address = registry.governance_mint @ VaultError::InvalidMint,
    )]
    pub governance_mint: Box<Account<'info, Mint>>,

    /// Security: Credential is burned with the manager's signature
    #[account(
        mut,
        constraint = manager_governance_account.mint == registry.governance_mint @ VaultError::InvalidMint,
        constraint = manager_governance_account.owner == manager.key() @ VaultError::InvalidOwner,
    )]
    pub manager_governance_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = manager_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = manager_asset_account.owner == manager.key() @ VaultError::InvalidOwner,
    )]
    pub manager_asset_account: Box<Account<'info, TokenAccount>>,

    pub venues: StrategyVenues<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ExitManager>) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let manager = accounts.manager.key();
    let registry_key = accounts.registry.key();
    let vault_key = accounts.vault.key();
    let escrowed = accounts.manager_escrow.amount;

    // CHECKS
    accounts.venues.validate(&accounts.vault)?;
    accounts.vault.enter()?;

    // EFFECTS: Deactivate, then redeem the whole escrow
    let capability = Registry::capability(&accounts.registry);
    let before = accounts.venues.snapshot(&accounts.vault)?;
    let mut journal = Journal::new();
    let released = {
        let mut venues = accounts.venues.engine();
        accounts
            .vault
            .deactivate(&capability, &mut venues, &mut journal)?;
        accounts
            .vault
            .redeem_manager_stake(&capability, escrowed, &mut venues, &mut journal)?
    };
    let flows = VenueFlows::between(before, accounts.venues.snapshot(&accounts.vault)?)?;

    let credential = accounts
        .registry
        .discharge(&mut accounts.manager_entry)?;
    accounts.vault.exit(&crate::ID)?;

    // INTERACTIONS: venues in, credential burn, share burn, payout
    let token_program = accounts.token_program.to_account_info();
    let custody = accounts.vault_custody.to_account_info();
    accounts.venues.pull(&flows, &custody, &token_program)?;

    burn_tokens(
        &token_program,
        &accounts.governance_mint.to_account_info(),
        &accounts.manager_governance_account.to_account_info(),
        &accounts.manager.to_account_info(),
        &[],
        credential,
    )?;

    {
        let index = accounts.vault.index.to_le_bytes();
        let seeds = accounts.vault.signer_seeds(&index);
        let signer = &[&seeds[..]];
        let vault_info = accounts.vault.to_account_info();

        burn_tokens(
            &token_program,
            &accounts.share_mint.to_account_info(),
            &accounts.manager_escrow.to_account_info(),
            &vault_info,
            signer,
            released.shares,
        )?;
        transfer_tokens(
            &token_program,
            &custody,
            &accounts.manager_asset_account.to_account_info(),
            &vault_info,
            signer,
            released.assets,
        )?;
        accounts
            .venues
            .push(&flows, &custody, &vault_info, signer, &token_program)?;
    }

    accounts.vault.leave();

    msg!(
        "Manager {} exited vault {}: {} shares for {} assets",
        manager,
        vault_key,
        released.shares,
        released.assets
    );

    emit_movements(vault_key, &accounts.vault, &journal)?;
    let timestamp = Clock::get()?.unix_timestamp;
    emit!(VaultDeactivated {
        vault: vault_key,
        registry: registry_key,
        idle_assets: accounts.vault.idle_assets,
        total_shares: accounts.vault.total_shares,
        timestamp,
    });
    emit!(ManagerExited {
        registry: registry_key,
        vault: vault_key,
        manager,
        credential_burned: credential,
        shares_redeemed: released.shares,
        assets_returned: released.assets,
        timestamp,
    });

    Ok(())
}
