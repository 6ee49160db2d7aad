use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// Byte string serialized as a `0x` prefixed hex string.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct JsonBytes(pub Vec<u8>);

impl JsonBytes {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        JsonBytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for JsonBytes {
    fn from(bytes: Vec<u8>) -> Self {
        JsonBytes(bytes)
    }
}

impl Serialize for JsonBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for JsonBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(JsonBytes).map_err(D::Error::custom)
    }
}
