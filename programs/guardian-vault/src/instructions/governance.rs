use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::{constants::*, errors::*, events::*, state::*};

/// Governance-gated registry configuration
#[derive(Accounts)]
pub struct AddSupportedAsset<'info> {
    /// Governance authority
    /// Security: Must be signer and match registry.authority
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ VaultError::NotGovernance,
    )]
    pub registry: Box<Account<'info, Registry>>,

    pub asset_mint: Box<Account<'info, Mint>>,
}

pub fn add_supported_asset_handler(
    ctx: Context<AddSupportedAsset>,
    name: String,
    symbol: String,
) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    let asset_mint = ctx.accounts.asset_mint.key();

    registry.add_supported_asset(asset_mint, name.clone(), symbol.clone())?;

    emit!(AssetSupported {
        registry: registry.key(),
        asset_mint,
        name,
        symbol,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetFeeDivisor<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ VaultError::NotGovernance,
    )]
    pub registry: Box<Account<'info, Registry>>,
}

/// Applies to vaults registered afterwards; existing vaults keep theirs
pub fn set_fee_divisor_handler(ctx: Context<SetFeeDivisor>, fee_divisor: u64) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    let old_fee_divisor = registry.set_fee_divisor(fee_divisor)?;

    msg!("Fee divisor {} -> {}", old_fee_divisor, fee_divisor);

    emit!(FeeDivisorUpdated {
        registry: registry.key(),
        old_fee_divisor,
        new_fee_divisor: fee_divisor,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
