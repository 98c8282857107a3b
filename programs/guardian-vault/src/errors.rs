use anchor_lang::prelude::*;

/// Custom error codes for the Guardian Vault program
///
/// Numeric context (offending amounts, expected keys) is logged by the
/// `require_*!` macros or an explicit `msg!` right before the error returns.
#[error_code]
pub enum VaultError {
    // Preconditions
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Vault is inactive - only withdrawals are permitted")]
    VaultInactive,

    #[msg("Vault is already inactive")]
    VaultAlreadyInactive,

    #[msg("Manager has already exited")]
    ManagerAlreadyExited,

    #[msg("Only the vault manager can perform this action")]
    NotManager,

    #[msg("Only the registry can perform this action")]
    NotRegistry,

    #[msg("Only the governance authority can perform this action")]
    NotGovernance,

    #[msg("Allocation weights must sum to exactly 1000")]
    InvalidAllocation,

    #[msg("Deposit exceeds the vault deposit limit")]
    DepositExceedsLimit,

    #[msg("Manager shares can only leave the vault through the registry exit")]
    ManagerExitOnly,

    #[msg("Vault operation already in progress")]
    ReentrantCall,

    // Share accounting
    #[msg("Share amount rounds to zero")]
    ShareAmountZero,

    #[msg("Insufficient shares for this operation")]
    InsufficientShares,

    #[msg("Insufficient idle assets in the vault")]
    InsufficientIdleAssets,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Operation would create value out of rounding")]
    ConservationViolation,

    // Strategy venues
    #[msg("Insufficient liquidity in the external market")]
    InsufficientLiquidity,

    #[msg("Strategy returned more than its valuation")]
    ImplausibleValuation,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Venue does not belong to this vault")]
    InvalidVenue,

    #[msg("Liquidity pool does not contain the vault's asset pair")]
    InvalidPoolPair,

    // Configuration
    #[msg("Fee divisor is below the allowed minimum")]
    InvalidFeeDivisor,

    #[msg("Slippage tolerance exceeds the allowed maximum")]
    InvalidSlippage,

    #[msg("Pool fee exceeds the allowed maximum")]
    InvalidPoolFee,

    #[msg("Asset is not supported by the registry")]
    UnsupportedAsset,

    #[msg("Asset is already supported")]
    AssetAlreadySupported,

    #[msg("Supported asset list is full")]
    RegistryFull,

    #[msg("Name too long")]
    NameTooLong,

    #[msg("Symbol too long")]
    SymbolTooLong,

    // Accounts
    #[msg("Invalid token mint")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    // Math
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,
}
