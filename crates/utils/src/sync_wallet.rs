use anyhow::Result;
use mr_types::{account::AccountId, Address};

use crate::{signer::Signer, wallet::EthWallet};

/// Message whose L1 signature seeds the rollup signing key.
pub const SIGNER_SEED_MESSAGE: &str =
    "Access Massbit rollup account.\n\nOnly sign this message for a trusted client!";

/// Rollup wallet: an L1 key plus the signing key derived from it.
#[derive(Clone, Debug)]
pub struct SyncWallet {
    eth: EthWallet,
    signer: Signer,
    account_id: Option<AccountId>,
}

impl SyncWallet {
    pub fn from_eth_signer(eth: EthWallet) -> Result<Self> {
        let seed = eth.personal_sign(SIGNER_SEED_MESSAGE.as_bytes())?;
        let signer = Signer::from_seed(&seed)?;
        Ok(SyncWallet {
            eth,
            signer,
            account_id: None,
        })
    }

    pub fn address(&self) -> Address {
        self.eth.address()
    }

    pub fn eth_wallet(&self) -> &EthWallet {
        &self.eth
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn set_account_id(&mut self, account_id: AccountId) {
        self.account_id = Some(account_id);
    }

    /// Swap in another signing key, returning the previous one.
    pub fn replace_signer(&mut self, signer: Signer) -> Signer {
        std::mem::replace(&mut self.signer, signer)
    }
}
