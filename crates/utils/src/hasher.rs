use mr_types::H256;
use sha3::{Digest, Keccak256};

pub struct EthHasher {
    hasher: Keccak256,
}

impl Default for EthHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl EthHasher {
    pub fn new() -> Self {
        Self {
            hasher: Keccak256::new(),
        }
    }

    pub fn update(mut self, data: impl AsRef<[u8]>) -> Self {
        self.hasher.update(data);
        self
    }

    pub fn finalize(self) -> H256 {
        let buf = self.hasher.finalize();
        let result: [u8; 32] = buf.into();
        result.into()
    }
}

pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    EthHasher::new().update(data).finalize()
}
