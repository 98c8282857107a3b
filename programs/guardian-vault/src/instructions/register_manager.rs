use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use super::settlement::*;
use crate::{constants::*, errors::*, events::*, state::*};

/// Register a manager for one asset and create their vault
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Manager must be signer and pays the stake
/// ✅ 2. ACCOUNT OWNERSHIP: Registry, entry, vault, mints and custody are PDAs
/// ✅ 3. UNIQUENESS: ManagerEntry PDA allows one live vault per (manager, asset)
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Share mint and custody owned by the vault PDA
/// ✅ 8. BUSINESS LOGIC: Stake enters through the regular deposit path
/// ✅ 10. EVENTS: Emits VaultRegistered and Deposited
#[derive(Accounts)]
pub struct RegisterManager<'info> {
    #[account(mut)]
    pub manager: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        init,
        payer = manager,
        space = 8 + ManagerEntry::INIT_SPACE,
        seeds = [MANAGER_ENTRY_SEED, manager.key().as_ref(), asset_mint.key().as_ref()],
        bump
    )]
    pub manager_entry: Box<Account<'info, ManagerEntry>>,

    #[account(
        init,
        payer = manager,
        space = 8 + Vault::INIT_SPACE,
        seeds = [
            VAULT_SEED,
            manager.key().as_ref(),
            asset_mint.key().as_ref(),
            &registry.vault_count.to_le_bytes(),
        ],
        bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub asset_mint: Box<Account<'info, Mint>>,

    /// Share mint PDA
    /// Security: Mint authority is the vault PDA
    #[account(
        init,
        payer = manager,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals.saturating_add(DECIMALS_OFFSET),
        mint::authority = vault,
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = manager,
        seeds = [VAULT_CUSTODY_SEED, vault.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = vault,
    )]
    pub vault_custody: Box<Account<'info, TokenAccount>>,

    /// Manager share escrow
    /// Security: Owned by the vault PDA; drained only by exit_manager
    #[account(
        init,
        payer = manager,
        seeds = [MANAGER_ESCROW_SEED, vault.key().as_ref()],
        bump,
        token::mint = share_mint,
        token::authority = vault,
    )]
    pub manager_escrow: Box<Account<'info, TokenAccount>>,

    /// CHECK: Matched against registry.treasury
    #[account(address = registry.treasury @ VaultError::InvalidOwner)]
    pub treasury: UncheckedAccount<'info>,

    #[account(
        init,
        payer = manager,
        associated_token::mint = share_mint,
        associated_token::authority = treasury,
    )]
    pub treasury_share_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [GOVERNANCE_MINT_SEED, registry.key().as_ref()],
        bump = registry.governance_mint_bump,
    )]
    pub governance_mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = manager,
        associated_token::mint = governance_mint,
        associated_token::authority = manager,
    )]
    pub manager_governance_account: Box<Account<'info, TokenAccount>>,

    /// Source of the stake
    #[account(
        mut,
        constraint = manager_asset_account.mint == asset_mint.key() @ VaultError::InvalidMint,
        constraint = manager_asset_account.owner == manager.key() @ VaultError::InvalidOwner,
    )]
    pub manager_asset_account: Box<Account<'info, TokenAccount>>,

    pub venues: StrategyVenues<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RegisterManager>, policy: AllocationPolicy) -> Result<()> {
    let bumps = &ctx.bumps;
    let (vault_bump, share_mint_bump, custody_bump, escrow_bump, entry_bump) = (
        bumps.vault,
        bumps.share_mint,
        bumps.vault_custody,
        bumps.manager_escrow,
        bumps.manager_entry,
    );
    let accounts = &mut *ctx.accounts;
    let manager = accounts.manager.key();
    let asset_mint = accounts.asset_mint.key();
    let registry_key = accounts.registry.key();
    let vault_key = accounts.vault.key();

    // CHECKS: Supported asset, venues over the right assets
    policy.validate()?;
    let (share_name, share_symbol) = accounts.registry.share_labels(&asset_mint)?;
    let counter_mint = accounts.registry.counter_mint(&asset_mint);
    require_keys_eq!(
        accounts.venues.lending_market.asset_mint,
        asset_mint,
        VaultError::InvalidVenue
    );
    require!(
        accounts.venues.liquidity_pool.contains(&asset_mint)
            && accounts.venues.liquidity_pool.contains(&counter_mint),
        VaultError::InvalidPoolPair
    );

    // EFFECTS: Vault, then the stake through the deposit path
    let fee_divisor = accounts.registry.fee_divisor;
    let stake_amount = accounts.registry.stake_amount;

    accounts.vault.init(VaultConfig {
        manager,
        registry: registry_key,
        index: accounts.registry.vault_count,
        asset_mint,
        counter_mint,
        share_mint: accounts.share_mint.key(),
        custody: accounts.vault_custody.key(),
        manager_escrow: accounts.manager_escrow.key(),
        treasury: accounts.treasury_share_account.key(),
        lending_market: accounts.venues.lending_market.key(),
        liquidity_pool: accounts.venues.liquidity_pool.key(),
        share_name: share_name.clone(),
        share_symbol: share_symbol.clone(),
        fee_divisor,
        policy,
    })?;
    accounts.vault.bump = vault_bump;
    accounts.vault.share_mint_bump = share_mint_bump;
    accounts.vault.custody_bump = custody_bump;
    accounts.vault.escrow_bump = escrow_bump;

    accounts.venues.validate(&accounts.vault)?;
    accounts.vault.enter()?;

    let before = accounts.venues.snapshot(&accounts.vault)?;
    let mut journal = Journal::new();
    let issued = {
        let mut venues = accounts.venues.engine();
        accounts
            .vault
            .deposit(&manager, stake_amount, &mut venues, &mut journal)?
    };
    let flows = VenueFlows::between(before, accounts.venues.snapshot(&accounts.vault)?)?;

    let entry = &mut accounts.manager_entry;
    entry.manager = manager;
    entry.asset_mint = asset_mint;
    entry.vault = vault_key;
    entry.registered_at = Clock::get()?.unix_timestamp;
    entry.bump = entry_bump;
    let credential_amount = accounts.registry.enroll(entry)?;

    accounts.vault.exit(&crate::ID)?;

    // INTERACTIONS: stake in, venues in, shares, venues out, credential
    let token_program = accounts.token_program.to_account_info();
    let custody = accounts.vault_custody.to_account_info();
    transfer_tokens(
        &token_program,
        &accounts.manager_asset_account.to_account_info(),
        &custody,
        &accounts.manager.to_account_info(),
        &[],
        issued.assets,
    )?;
    accounts.venues.pull(&flows, &custody, &token_program)?;

    {
        let index = accounts.vault.index.to_le_bytes();
        let seeds = accounts.vault.signer_seeds(&index);
        let signer = &[&seeds[..]];
        let vault_info = accounts.vault.to_account_info();
        let share_mint = accounts.share_mint.to_account_info();
        let escrow = accounts.manager_escrow.to_account_info();

        mint_tokens(
            &token_program,
            &share_mint,
            &escrow,
            &vault_info,
            signer,
            issued.shares,
        )?;
        mint_tokens(
            &token_program,
            &share_mint,
            &escrow,
            &vault_info,
            signer,
            issued.fees.manager,
        )?;
        mint_tokens(
            &token_program,
            &share_mint,
            &accounts.treasury_share_account.to_account_info(),
            &vault_info,
            signer,
            issued.fees.treasury,
        )?;
        accounts
            .venues
            .push(&flows, &custody, &vault_info, signer, &token_program)?;
    }

    {
        let seeds = accounts.registry.signer_seeds();
        mint_tokens(
            &token_program,
            &accounts.governance_mint.to_account_info(),
            &accounts.manager_governance_account.to_account_info(),
            &accounts.registry.to_account_info(),
            &[&seeds[..]],
            credential_amount,
        )?;
    }

    accounts.vault.leave();

    msg!(
        "Manager {} registered vault {} ({})",
        manager,
        vault_key,
        share_symbol
    );

    emit_movements(vault_key, &accounts.vault, &journal)?;
    let timestamp = Clock::get()?.unix_timestamp;
    emit!(VaultRegistered {
        registry: registry_key,
        vault: vault_key,
        manager,
        asset_mint,
        share_mint: accounts.vault.share_mint,
        share_name,
        share_symbol,
        fee_divisor,
        stake_amount,
        credential_amount,
        policy,
        timestamp,
    });
    emit!(Deposited {
        vault: vault_key,
        user: manager,
        asset_amount: issued.assets,
        shares_minted: issued.shares,
        manager_fee_shares: issued.fees.manager,
        treasury_fee_shares: issued.fees.treasury,
        to_escrow: issued.to_escrow,
        total_shares: accounts.vault.total_shares,
        timestamp,
    });

    Ok(())
}
