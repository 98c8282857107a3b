use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token};

use crate::{constants::*, errors::*, events::*, state::*};

/// Create the manager/vault registry and its governance credential mint
#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    /// Governance authority
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Registry PDA (one per program)
    #[account(
        init,
        payer = authority,
        space = 8 + Registry::INIT_SPACE,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    /// Governance credential mint PDA
    /// Security: Mint authority is the registry PDA
    #[account(
        init,
        payer = authority,
        seeds = [GOVERNANCE_MINT_SEED, registry.key().as_ref()],
        bump,
        mint::decimals = 0,
        mint::authority = registry,
    )]
    pub governance_mint: Box<Account<'info, Mint>>,

    /// Treasury wallet; owns every vault's treasury share account
    /// CHECK: Any wallet may receive treasury fee shares
    pub treasury: UncheckedAccount<'info>,

    /// First canonical pairable asset
    pub primary_mint: Box<Account<'info, Mint>>,

    /// Second canonical pairable asset
    #[account(
        constraint = secondary_mint.key() != primary_mint.key() @ VaultError::InvalidPoolPair,
    )]
    pub secondary_mint: Box<Account<'info, Mint>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeRegistry>,
    fee_divisor: u64,
    stake_amount: u64,
    credential_amount: u64,
) -> Result<()> {
    // CHECKS
    Registry::validate_fee_divisor(fee_divisor)?;
    require!(stake_amount > 0, VaultError::ZeroAmount);
    require!(credential_amount > 0, VaultError::ZeroAmount);

    // EFFECTS
    let registry = &mut ctx.accounts.registry;
    registry.authority = ctx.accounts.authority.key();
    registry.treasury = ctx.accounts.treasury.key();
    registry.governance_mint = ctx.accounts.governance_mint.key();
    registry.primary_mint = ctx.accounts.primary_mint.key();
    registry.secondary_mint = ctx.accounts.secondary_mint.key();
    registry.fee_divisor = fee_divisor;
    registry.stake_amount = stake_amount;
    registry.credential_amount = credential_amount;
    registry.manager_count = 0;
    registry.vault_count = 0;
    registry.supported_assets = Vec::new();
    registry.bump = ctx.bumps.registry;
    registry.governance_mint_bump = ctx.bumps.governance_mint;

    emit!(RegistryInitialized {
        registry: registry.key(),
        authority: registry.authority,
        treasury: registry.treasury,
        governance_mint: registry.governance_mint,
        fee_divisor,
        stake_amount,
        credential_amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
