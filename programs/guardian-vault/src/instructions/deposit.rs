use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use super::settlement::*;
use crate::{constants::*, errors::*, events::*, state::*};

/// Deposit assets into the vault and receive shares
///
/// Shared by `deposit` (exact assets) and `mint_shares` (exact shares).
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Vault PDA validated with seeds, venues by seeds and vault keys
/// ✅ 6. MATH SAFETY: Checked u128 conversions with explicit rounding
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Resync, account, reinvest before any CPI
/// ✅ 9. REENTRANCY: Vault lock persisted before CPIs
/// ✅ 10. EVENTS: Emits Deposited / SharesMinted and strategy movements
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    /// Security: Must be signer, pays for the share account if needed
    #[account(mut)]
    pub user: Signer<'info>,

    /// Vault PDA
    /// Security: Validated by seeds
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

    /// Share mint
    /// Security: Must match vault.share_mint
    #[account(
        mut,
        address = vault.share_mint @ VaultError::InvalidMint,
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    /// Idle asset custody
    /// Security: Must match vault.custody
    #[account(
        mut,
        address = vault.custody @ VaultError::InvalidOwner,
    )]
    pub vault_custody: Box<Account<'info, TokenAccount>>,

    /// Escrow receiving manager fee shares
    #[account(
        mut,
        address = vault.manager_escrow @ VaultError::InvalidOwner,
    )]
    pub manager_escrow: Box<Account<'info, TokenAccount>>,

    /// Treasury share account receiving treasury fee shares
    #[account(
        mut,
        address = vault.treasury @ VaultError::InvalidOwner,
    )]
    pub treasury_share_account: Box<Account<'info, TokenAccount>>,

    /// User's asset token account (source)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Box<Account<'info, TokenAccount>>,

    /// User's share token account (destination)
    #[account(
        init_if_needed,
        payer = user,
        associated_token::mint = share_mint,
        associated_token::authority = user,
    )]
    pub user_share_account: Box<Account<'info, TokenAccount>>,

    pub venues: StrategyVenues<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Clone, Copy)]
enum Contribution {
    Assets { amount: u64, min_shares_out: u64 },
    Shares { shares: u64, max_assets_in: u64 },
}

pub fn handler(ctx: Context<Deposit>, amount: u64, min_shares_out: u64) -> Result<()> {
    contribute(
        ctx,
        Contribution::Assets {
            amount,
            min_shares_out,
        },
    )
}

pub fn mint_handler(ctx: Context<Deposit>, shares: u64, max_assets_in: u64) -> Result<()> {
    contribute(
        ctx,
        Contribution::Shares {
            shares,
            max_assets_in,
        },
    )
}

fn contribute(ctx: Context<Deposit>, contribution: Contribution) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let user = accounts.user.key();
    let vault_key = accounts.vault.key();

    // CHECKS: Venues must belong to this vault, no operation in flight
    accounts.venues.validate(&accounts.vault)?;
    accounts.vault.enter()?;

    // EFFECTS: Resync, price, mint fees, reinvest
    let before = accounts.venues.snapshot(&accounts.vault)?;
    let mut journal = Journal::new();
    let issued = {
        let mut venues = accounts.venues.engine();
        match contribution {
            Contribution::Assets { amount, .. } => {
                accounts.vault.deposit(&user, amount, &mut venues, &mut journal)?
            }
            Contribution::Shares { shares, .. } => {
                accounts.vault.mint(&user, shares, &mut venues, &mut journal)?
            }
        }
    };
    match contribution {
        Contribution::Assets { min_shares_out, .. } => {
            require_gte!(issued.shares, min_shares_out, VaultError::SlippageExceeded)
        }
        Contribution::Shares { max_assets_in, .. } => {
            require_gte!(max_assets_in, issued.assets, VaultError::SlippageExceeded)
        }
    }
    let flows = VenueFlows::between(before, accounts.venues.snapshot(&accounts.vault)?)?;
    accounts.vault.exit(&crate::ID)?;

    // INTERACTIONS: user in, venues in, mint, venues out
    let token_program = accounts.token_program.to_account_info();
    let custody = accounts.vault_custody.to_account_info();
    transfer_tokens(
        &token_program,
        &accounts.user_asset_account.to_account_info(),
        &custody,
        &accounts.user.to_account_info(),
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

        let recipient = if issued.to_escrow {
            escrow.clone()
        } else {
            accounts.user_share_account.to_account_info()
        };
        mint_tokens(&token_program, &share_mint, &recipient, &vault_info, signer, issued.shares)?;
        mint_tokens(&token_program, &share_mint, &escrow, &vault_info, signer, issued.fees.manager)?;
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

    accounts.vault.leave();

    emit_movements(vault_key, &accounts.vault, &journal)?;
    let timestamp = Clock::get()?.unix_timestamp;
    match contribution {
        Contribution::Assets { .. } => emit!(Deposited {
            vault: vault_key,
            user,
            asset_amount: issued.assets,
            shares_minted: issued.shares,
            manager_fee_shares: issued.fees.manager,
            treasury_fee_shares: issued.fees.treasury,
            to_escrow: issued.to_escrow,
            total_shares: accounts.vault.total_shares,
            timestamp,
        }),
        Contribution::Shares { .. } => emit!(SharesMinted {
            vault: vault_key,
            user,
            asset_amount: issued.assets,
            shares_minted: issued.shares,
            manager_fee_shares: issued.fees.manager,
            treasury_fee_shares: issued.fees.treasury,
            to_escrow: issued.to_escrow,
            total_shares: accounts.vault.total_shares,
            timestamp,
        }),
    }

    Ok(())
}
