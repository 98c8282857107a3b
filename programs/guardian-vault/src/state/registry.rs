use anchor_lang::prelude::*;

use crate::{constants::*, errors::VaultError, strategy::counter_asset};

/// Manager/vault registry
///
/// Security considerations:
/// - `authority` is the governance key; every configuration setter checks it
/// - The fee divisor can never drop below `MIN_FEE_DIVISOR` (zero included)
/// - Holds no funds: stakes flow straight into the new vault
#[account]
#[derive(Default, InitSpace)]
pub struct Registry {
    /// Governance authority
    pub authority: Pubkey,

    /// Wallet owning every vault's treasury share account
    pub treasury: Pubkey,

    /// Governance credential mint (authority: this registry PDA)
    pub governance_mint: Pubkey,

    /// Canonical pairable assets; every vault pairs against one of them
    pub primary_mint: Pubkey,
    pub secondary_mint: Pubkey,

    /// Fee divisor given to vaults registered from now on
    pub fee_divisor: u64,

    /// Base asset a manager deposits when registering
    pub stake_amount: u64,

    /// Governance credential minted per registration
    pub credential_amount: u64,

    /// Live manager entries
    pub manager_count: u64,

    /// Vaults ever created; the next vault's index
    pub vault_count: u64,

    #[max_len(8)]
    pub supported_assets: Vec<SupportedAsset>,

    pub bump: u8,
    pub governance_mint_bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct SupportedAsset {
    pub mint: Pubkey,

    /// e.g. "USD Coin"
    #[max_len(24)]
    pub name: String,

    /// e.g. "USDC"
    #[max_len(8)]
    pub symbol: String,
}

/// Proof that the caller is acting as a specific registry
///
/// Only obtainable from a loaded registry account; vault operations
/// reserved for the registry (deactivation, manager stake redemption)
/// require one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryCapability {
    registry: Pubkey,
}

impl RegistryCapability {
    pub fn registry(&self) -> Pubkey {
        self.registry
    }
}

/// (manager, asset) -> vault
///
/// PDA uniqueness enforces one live vault per manager per asset; the entry
/// is closed on exit, after which the manager may register again into a
/// fresh vault.
#[account]
#[derive(Default, InitSpace)]
pub struct ManagerEntry {
    pub manager: Pubkey,
    pub asset_mint: Pubkey,
    pub vault: Pubkey,

    /// Index of `vault` within the registry
    pub vault_index: u64,

    /// Credential minted at registration, burned in full on exit
    pub credential_minted: u64,

    pub registered_at: i64,
    pub exited: bool,
    pub bump: u8,
}

impl Registry {
    pub fn validate_fee_divisor(fee_divisor: u64) -> Result<()> {
        if fee_divisor < MIN_FEE_DIVISOR {
            msg!(
                "Fee divisor {} below minimum {}",
                fee_divisor,
                MIN_FEE_DIVISOR
            );
            return err!(VaultError::InvalidFeeDivisor);
        }
        Ok(())
    }

    pub fn set_fee_divisor(&mut self, fee_divisor: u64) -> Result<u64> {
        Self::validate_fee_divisor(fee_divisor)?;
        let old = self.fee_divisor;
        self.fee_divisor = fee_divisor;
        Ok(old)
    }

    pub fn add_supported_asset(&mut self, mint: Pubkey, name: String, symbol: String) -> Result<()> {
        require!(name.len() <= MAX_NAME_LEN, VaultError::NameTooLong);
        require!(symbol.len() <= MAX_SYMBOL_LEN, VaultError::SymbolTooLong);
        require!(
            !self.supported_assets.iter().any(|a| a.mint == mint),
            VaultError::AssetAlreadySupported
        );
        require!(
            self.supported_assets.len() < MAX_SUPPORTED_ASSETS,
            VaultError::RegistryFull
        );

        self.supported_assets.push(SupportedAsset { mint, name, symbol });
        Ok(())
    }

    pub fn supported(&self, mint: &Pubkey) -> Result<&SupportedAsset> {
        self.supported_assets
            .iter()
            .find(|a| a.mint == *mint)
            .ok_or(error!(VaultError::UnsupportedAsset))
    }

    /// Share token (name, symbol) for a vault over `mint`
    pub fn share_labels(&self, mint: &Pubkey) -> Result<(String, String)> {
        let asset = self.supported(mint)?;
        Ok((
            format!("{}{}", SHARE_NAME_PREFIX, asset.name),
            format!("{}{}", SHARE_SYMBOL_PREFIX, asset.symbol),
        ))
    }

    /// Pool counterparty for a vault over `asset`
    pub fn counter_mint(&self, asset: &Pubkey) -> Pubkey {
        counter_asset(asset, &self.primary_mint, &self.secondary_mint)
    }

    pub fn capability(registry: &Account<Registry>) -> RegistryCapability {
        RegistryCapability {
            registry: registry.key(),
        }
    }

    /// Record a registration into `entry`, which already names its manager,
    /// asset and vault; returns the credential amount to mint
    pub fn enroll(&mut self, entry: &mut ManagerEntry) -> Result<u64> {
        entry.vault_index = self.vault_count;
        entry.credential_minted = self.credential_amount;
        entry.exited = false;

        self.vault_count = self
            .vault_count
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
        self.manager_count = self
            .manager_count
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
        Ok(entry.credential_minted)
    }

    /// Record an exit; returns the credential amount to burn
    pub fn discharge(&mut self, entry: &mut ManagerEntry) -> Result<u64> {
        require!(!entry.exited, VaultError::ManagerAlreadyExited);
        self.manager_count = self
            .manager_count
            .checked_sub(1)
            .ok_or(VaultError::MathOverflow)?;
        entry.exited = true;
        Ok(std::mem::take(&mut entry.credential_minted))
    }

    pub fn signer_seeds(&self) -> [&[u8]; 2] {
        [REGISTRY_SEED, std::slice::from_ref(&self.bump)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry {
            fee_divisor: DEFAULT_FEE_DIVISOR,
            primary_mint: Pubkey::new_unique(),
            secondary_mint: Pubkey::new_unique(),
            ..Registry::default()
        }
    }

    #[test]
    fn test_fee_divisor_bounds() {
        let mut r = registry();
        assert!(r.set_fee_divisor(0).is_err());
        assert!(r.set_fee_divisor(MIN_FEE_DIVISOR - 1).is_err());
        assert_eq!(r.fee_divisor, DEFAULT_FEE_DIVISOR);

        assert_eq!(r.set_fee_divisor(MIN_FEE_DIVISOR).unwrap(), DEFAULT_FEE_DIVISOR);
        assert_eq!(r.fee_divisor, MIN_FEE_DIVISOR);
    }

    #[test]
    fn test_share_labels_follow_asset() {
        let mut r = registry();
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        r.add_supported_asset(usdc, "USD Coin".to_string(), "USDC".to_string())
            .unwrap();
        r.add_supported_asset(sol, "Wrapped SOL".to_string(), "wSOL".to_string())
            .unwrap();

        assert_eq!(
            r.share_labels(&sol).unwrap(),
            ("Guardian Wrapped SOL".to_string(), "gwSOL".to_string())
        );
        assert_eq!(
            r.share_labels(&usdc).unwrap(),
            ("Guardian USD Coin".to_string(), "gUSDC".to_string())
        );
        assert!(r.share_labels(&Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_supported_asset_limits() {
        let mut r = registry();
        let mint = Pubkey::new_unique();
        r.add_supported_asset(mint, "A".to_string(), "A".to_string())
            .unwrap();
        assert!(r
            .add_supported_asset(mint, "A".to_string(), "A".to_string())
            .is_err());
        assert!(r
            .add_supported_asset(Pubkey::new_unique(), "x".repeat(MAX_NAME_LEN + 1), "B".to_string())
            .is_err());
        assert!(r
            .add_supported_asset(Pubkey::new_unique(), "B".to_string(), "y".repeat(MAX_SYMBOL_LEN + 1))
            .is_err());

        for _ in 1..MAX_SUPPORTED_ASSETS {
            r.add_supported_asset(Pubkey::new_unique(), "C".to_string(), "C".to_string())
                .unwrap();
        }
        assert!(r
            .add_supported_asset(Pubkey::new_unique(), "D".to_string(), "D".to_string())
            .is_err());
    }

    #[test]
    fn test_enroll_and_discharge_track_credentials() {
        let mut r = Registry {
            credential_amount: 1_000_000,
            ..registry()
        };
        let mut first = ManagerEntry::default();
        let mut second = ManagerEntry::default();

        assert_eq!(r.enroll(&mut first).unwrap(), 1_000_000);
        r.credential_amount = 2_000_000;
        assert_eq!(r.enroll(&mut second).unwrap(), 2_000_000);
        assert_eq!((first.vault_index, second.vault_index), (0, 1));
        assert_eq!((r.manager_count, r.vault_count), (2, 2));

        // Burns what was minted at registration, not the current amount
        assert_eq!(r.discharge(&mut first).unwrap(), 1_000_000);
        assert_eq!(first.credential_minted, 0);
        assert!(first.exited);
        assert_eq!((r.manager_count, r.vault_count), (1, 2));
    }

    #[test]
    fn test_discharge_twice_rejected() {
        let mut r = Registry {
            credential_amount: 500,
            ..registry()
        };
        let mut entry = ManagerEntry::default();
        r.enroll(&mut entry).unwrap();
        r.discharge(&mut entry).unwrap();

        match r.discharge(&mut entry) {
            Err(anchor_lang::error::Error::AnchorError(e)) => assert_eq!(
                e.error_code_number,
                u32::from(VaultError::ManagerAlreadyExited)
            ),
            other => panic!("expected ManagerAlreadyExited, got {:?}", other),
        }
        assert_eq!(r.manager_count, 0);
    }

    #[test]
    fn test_reregistration_gets_a_new_vault_index() {
        let mut r = registry();
        let mut entry = ManagerEntry::default();
        r.enroll(&mut entry).unwrap();
        let first = entry.vault_index;
        r.discharge(&mut entry).unwrap();

        // Entry account is closed and recreated on the next registration
        let mut entry = ManagerEntry::default();
        r.enroll(&mut entry).unwrap();
        assert_ne!(entry.vault_index, first);
        assert_eq!(r.manager_count, 1);
    }

    #[test]
    fn test_counter_mint_for_pairable_assets() {
        let r = registry();
        let other = Pubkey::new_unique();
        assert_eq!(r.counter_mint(&r.primary_mint), r.secondary_mint);
        assert_eq!(r.counter_mint(&r.secondary_mint), r.primary_mint);
        assert_eq!(r.counter_mint(&other), r.primary_mint);
    }
}
