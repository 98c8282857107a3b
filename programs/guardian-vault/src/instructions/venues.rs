use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use super::settlement::transfer_tokens;
use crate::{constants::*, errors::*, events::*, math::isqrt, state::*};

/// Open the lending market for one asset
#[derive(Accounts)]
pub struct CreateLendingMarket<'info> {
    /// Governance authority
    /// Security: Must be signer and match registry.authority
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ VaultError::NotGovernance,
    )]
    pub registry: Box<Account<'info, Registry>>,

    pub asset_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = authority,
        space = 8 + LendingMarket::INIT_SPACE,
        seeds = [LENDING_MARKET_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub lending_market: Box<Account<'info, LendingMarket>>,

    /// Market custody; its balance always equals `total_liquidity`
    #[account(
        init,
        payer = authority,
        seeds = [VENUE_CUSTODY_SEED, lending_market.key().as_ref(), asset_mint.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = lending_market,
    )]
    pub custody: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn create_lending_market_handler(ctx: Context<CreateLendingMarket>) -> Result<()> {
    let market = &mut ctx.accounts.lending_market;
    market.authority = ctx.accounts.authority.key();
    market.asset_mint = ctx.accounts.asset_mint.key();
    market.custody = ctx.accounts.custody.key();
    market.total_liquidity = 0;
    market.receipt_supply = 0;
    market.bump = ctx.bumps.lending_market;
    market.custody_bump = ctx.bumps.custody;

    emit!(LendingMarketCreated {
        market: market.key(),
        asset_mint: market.asset_mint,
        custody: market.custody,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Open a constant-product pool over a canonical pair and seed it
#[derive(Accounts)]
pub struct CreateLiquidityPool<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ VaultError::NotGovernance,
    )]
    pub registry: Box<Account<'info, Registry>>,

    /// Security: Pair must be passed in canonical order
    #[account(
        constraint = mint_a.key() < mint_b.key() @ VaultError::InvalidPoolPair,
    )]
    pub mint_a: Box<Account<'info, Mint>>,

    pub mint_b: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = authority,
        space = 8 + LiquidityPool::INIT_SPACE,
        seeds = [LIQUIDITY_POOL_SEED, mint_a.key().as_ref(), mint_b.key().as_ref()],
        bump
    )]
    pub liquidity_pool: Box<Account<'info, LiquidityPool>>,

    #[account(
        init,
        payer = authority,
        seeds = [VENUE_CUSTODY_SEED, liquidity_pool.key().as_ref(), mint_a.key().as_ref()],
        bump,
        token::mint = mint_a,
        token::authority = liquidity_pool,
    )]
    pub custody_a: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = authority,
        seeds = [VENUE_CUSTODY_SEED, liquidity_pool.key().as_ref(), mint_b.key().as_ref()],
        bump,
        token::mint = mint_b,
        token::authority = liquidity_pool,
    )]
    pub custody_b: Box<Account<'info, TokenAccount>>,

    /// Source of the side-a seed liquidity
    #[account(
        mut,
        constraint = authority_account_a.mint == mint_a.key() @ VaultError::InvalidMint,
        constraint = authority_account_a.owner == authority.key() @ VaultError::InvalidOwner,
    )]
    pub authority_account_a: Box<Account<'info, TokenAccount>>,

    /// Source of the side-b seed liquidity
    #[account(
        mut,
        constraint = authority_account_b.mint == mint_b.key() @ VaultError::InvalidMint,
        constraint = authority_account_b.owner == authority.key() @ VaultError::InvalidOwner,
    )]
    pub authority_account_b: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn create_liquidity_pool_handler(
    ctx: Context<CreateLiquidityPool>,
    fee_bps: u16,
    seed_a: u64,
    seed_b: u64,
) -> Result<()> {
    // CHECKS
    require_gte!(MAX_POOL_FEE_BPS, fee_bps, VaultError::InvalidPoolFee);
    require!(seed_a > 0 && seed_b > 0, VaultError::ZeroAmount);
    let lp_supply = u64::try_from(isqrt(seed_a as u128 * seed_b as u128))
        .map_err(|_| error!(VaultError::MathOverflow))?;

    // EFFECTS
    let pool = &mut ctx.accounts.liquidity_pool;
    pool.authority = ctx.accounts.authority.key();
    pool.mint_a = ctx.accounts.mint_a.key();
    pool.mint_b = ctx.accounts.mint_b.key();
    pool.custody_a = ctx.accounts.custody_a.key();
    pool.custody_b = ctx.accounts.custody_b.key();
    pool.reserve_a = seed_a;
    pool.reserve_b = seed_b;
    pool.lp_supply = lp_supply;
    pool.fee_bps = fee_bps;
    pool.bump = ctx.bumps.liquidity_pool;
    pool.custody_a_bump = ctx.bumps.custody_a;
    pool.custody_b_bump = ctx.bumps.custody_b;

    // INTERACTIONS
    let token_program = ctx.accounts.token_program.to_account_info();
    let authority = ctx.accounts.authority.to_account_info();
    transfer_tokens(
        &token_program,
        &ctx.accounts.authority_account_a.to_account_info(),
        &ctx.accounts.custody_a.to_account_info(),
        &authority,
        &[],
        seed_a,
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.authority_account_b.to_account_info(),
        &ctx.accounts.custody_b.to_account_info(),
        &authority,
        &[],
        seed_b,
    )?;

    let pool = &ctx.accounts.liquidity_pool;
    emit!(LiquidityPoolCreated {
        pool: pool.key(),
        mint_a: pool.mint_a,
        mint_b: pool.mint_b,
        reserve_a: pool.reserve_a,
        reserve_b: pool.reserve_b,
        lp_supply,
        fee_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Pay external yield into a lending market (permissionless)
#[derive(Accounts)]
pub struct AccrueLendingInterest<'info> {
    pub payer: Signer<'info>,

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
    pub custody: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = payer_asset_account.mint == lending_market.asset_mint @ VaultError::InvalidMint,
        constraint = payer_asset_account.owner == payer.key() @ VaultError::InvalidOwner,
    )]
    pub payer_asset_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

pub fn accrue_interest_handler(ctx: Context<AccrueLendingInterest>, amount: u64) -> Result<()> {
    require!(amount > 0, VaultError::ZeroAmount);

    let market = &mut ctx.accounts.lending_market;
    market.accrue_interest(amount)?;

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.payer_asset_account.to_account_info(),
        &ctx.accounts.custody.to_account_info(),
        &ctx.accounts.payer.to_account_info(),
        &[],
        amount,
    )?;

    let market = &ctx.accounts.lending_market;
    emit!(InterestAccrued {
        market: market.key(),
        amount,
        total_liquidity: market.total_liquidity,
        receipt_supply: market.receipt_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
