use std::fmt;

use alloy_signer_local::{coins_bip39::English, MnemonicBuilder};
use anyhow::{anyhow, ensure, Context, Result};
use mr_types::{Address, H256};
use rand::{rngs::OsRng, RngCore};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};

use crate::{eth_tx::LegacyTransaction, hasher::keccak256};

/// An L1 account key.
#[derive(Clone)]
pub struct EthWallet {
    privkey: SecretKey,
    address: Address,
}

impl fmt::Debug for EthWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl EthWallet {
    pub fn from_privkey(privkey: &H256) -> Result<Self> {
        let privkey = SecretKey::from_slice(privkey.as_bytes())
            .map_err(|err| anyhow!("Invalid secp256k1 secret key format, error: {}", err))?;
        let address = privkey_to_eth_address(&privkey);
        Ok(EthWallet { privkey, address })
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_privkey_str(privkey: &str) -> Result<Self> {
        let content = privkey.trim().trim_start_matches("0x");
        ensure!(content.len() == 64, "invalid privkey length");
        let mut decoded = [0u8; 32];
        hex::decode_to_slice(content, &mut decoded).context("decode privkey")?;
        Self::from_privkey(&decoded.into())
    }

    pub fn from_mnemonic(phrase: &str, derivation_path: &str) -> Result<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(derivation_path)
            .with_context(|| format!("invalid derivation path {}", derivation_path))?
            .build()
            .context("derive wallet from mnemonic")?;
        let privkey = H256::from_slice(signer.credential().to_bytes().as_slice());
        Self::from_privkey(&privkey)
    }

    pub fn random() -> Result<Self> {
        let mut rng = OsRng;
        loop {
            let mut key = [0u8; 32];
            rng.fill_bytes(&mut key);
            // out of range keys are astronomically rare, just draw again
            if let Ok(wallet) = Self::from_privkey(&key.into()) {
                return Ok(wallet);
            }
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn privkey(&self) -> H256 {
        H256::from_slice(&self.privkey.secret_bytes())
    }

    /// Sign a 32 bytes digest; the last byte is the recovery id (0 or 1).
    pub fn sign_message(&self, msg: [u8; 32]) -> Result<[u8; 65]> {
        let msg = Message::from_slice(&msg)?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&msg, &self.privkey);
        let (recid, compact) = signature.serialize_compact();
        let mut inner = [0u8; 65];
        inner[..64].copy_from_slice(&compact);
        inner[64] = recid.to_i32() as u8;
        Ok(inner)
    }

    /// EIP-191 `personal_sign`, `v` is 27 or 28.
    pub fn personal_sign(&self, message: &[u8]) -> Result<[u8; 65]> {
        let mut signature = self.sign_message(hash_message(message).into())?;
        signature[64] += 27;
        Ok(signature)
    }

    /// Sign and RLP encode, ready for `eth_sendRawTransaction`.
    pub fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<Vec<u8>> {
        let signature = self.sign_message(tx.signing_hash().into())?;
        Ok(tx.encode_signed(&signature))
    }
}

pub fn privkey_to_eth_address(privkey: &SecretKey) -> Address {
    let pubkey = PublicKey::from_secret_key_global(privkey);
    pubkey_to_eth_address(&pubkey)
}

pub fn pubkey_to_eth_address(pubkey: &PublicKey) -> Address {
    let hash = keccak256(&pubkey.serialize_uncompressed()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Digest signed by `personal_sign`.
pub fn hash_message(message: &[u8]) -> H256 {
    let mut data = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    data.extend_from_slice(message);
    keccak256(data)
}

/// Recover the address that produced a `personal_sign` signature.
pub fn recover_personal_signer(message: &[u8], signature: &[u8]) -> Result<Address> {
    ensure!(signature.len() == 65, "invalid signature length");
    let v = signature[64];
    let recid = RecoveryId::from_i32(i32::from(if v >= 27 { v - 27 } else { v }))?;
    let signature = RecoverableSignature::from_compact(&signature[..64], recid)?;
    let msg = Message::from_slice(hash_message(message).as_bytes())?;
    let pubkey = SECP256K1.recover_ecdsa(&msg, &signature)?;
    Ok(pubkey_to_eth_address(&pubkey))
}
