use mr_types::{Address, H256, U256};
use rlp::RlpStream;

use crate::hasher::keccak256;

/// Pre-London transaction, replay protected with EIP-155.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn rlp_append_fields(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas_limit);
        match self.to {
            Some(ref to) => s.append(to),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&self.data);
    }

    pub fn signing_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(9);
        self.rlp_append_fields(&mut s);
        s.append(&self.chain_id);
        s.append(&0u8);
        s.append(&0u8);
        keccak256(s.out())
    }

    /// Encode with a `[r || s || recovery_id]` signature over `signing_hash`.
    pub fn encode_signed(&self, signature: &[u8; 65]) -> Vec<u8> {
        let v = signature[64] as u64 + self.chain_id * 2 + 35;
        let r = U256::from_big_endian(&signature[..32]);
        let s_value = U256::from_big_endian(&signature[32..64]);

        let mut s = RlpStream::new_list(9);
        self.rlp_append_fields(&mut s);
        s.append(&v);
        s.append(&r);
        s.append(&s_value);
        s.out().to_vec()
    }
}
