use std::fmt;

use anyhow::{anyhow, ensure, Result};
use mr_types::{account::PubKeyHash, bytes::JsonBytes, tx::TxSignature, H256};
use rand::{rngs::OsRng, RngCore};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};

use crate::hasher::keccak256;

/// Rollup signing key, independent from the L1 key of the account.
#[derive(Clone)]
pub struct Signer {
    privkey: SecretKey,
    pub_key: PublicKey,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("pub_key_hash", &self.pub_key_hash())
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// Deterministically derive a key from seed material; the same seed
    /// always gives the same key.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        ensure!(seed.len() >= 32, "seed is too short");
        let mut key = keccak256(seed);
        loop {
            if let Ok(privkey) = SecretKey::from_slice(key.as_bytes()) {
                return Ok(Self::from_secret(privkey));
            }
            key = keccak256(key);
        }
    }

    pub fn random() -> Result<Self> {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(&seed)
    }

    fn from_secret(privkey: SecretKey) -> Self {
        let pub_key = PublicKey::from_secret_key_global(&privkey);
        Signer { privkey, pub_key }
    }

    pub fn pub_key_hash(&self) -> PubKeyHash {
        pub_key_hash(&self.pub_key)
    }

    pub fn sign(&self, signing_bytes: &[u8]) -> Result<TxSignature> {
        let msg = Message::from_slice(keccak256(signing_bytes).as_bytes())?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&msg, &self.privkey);
        let (recid, compact) = signature.serialize_compact();
        let mut sig = compact.to_vec();
        sig.push(recid.to_i32() as u8);
        Ok(TxSignature {
            pub_key: JsonBytes::from_vec(self.pub_key.serialize_uncompressed().to_vec()),
            signature: JsonBytes::from_vec(sig),
        })
    }
}

pub fn pub_key_hash(pub_key: &PublicKey) -> PubKeyHash {
    let hash: H256 = keccak256(&pub_key.serialize_uncompressed()[1..]);
    let mut inner = [0u8; 20];
    inner.copy_from_slice(&hash.as_bytes()[12..]);
    PubKeyHash(inner)
}

/// Check a signature over `signing_bytes` and return the hash of the key
/// that made it.
pub fn verify_signature(signing_bytes: &[u8], signature: &TxSignature) -> Result<PubKeyHash> {
    let sig = signature.signature.as_bytes();
    ensure!(sig.len() == 65, "invalid signature length");
    let pub_key = PublicKey::from_slice(signature.pub_key.as_bytes())?;
    let recid = RecoveryId::from_i32(i32::from(sig[64]))?;
    let recoverable = RecoverableSignature::from_compact(&sig[..64], recid)?;
    let msg = Message::from_slice(keccak256(signing_bytes).as_bytes())?;
    let recovered = SECP256K1.recover_ecdsa(&msg, &recoverable)?;
    if recovered != pub_key {
        return Err(anyhow!("signature does not match the public key"));
    }
    Ok(pub_key_hash(&pub_key))
}
