//! Serde helpers for amounts carried as decimal strings on the rollup REST api.

pub mod u256_dec {
    use ethereum_types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s).map_err(|err| D::Error::custom(format!("{:?}", err)))
    }
}

pub mod u256_dec_map {
    use std::collections::BTreeMap;

    use ethereum_types::U256;
    use serde::{de::Error, ser::SerializeMap, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<String, U256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (k, v) in value {
            map.serialize_entry(k, &v.to_string())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, U256>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                let v = U256::from_dec_str(&v)
                    .map_err(|err| D::Error::custom(format!("{}: {:?}", k, err)))?;
                Ok((k, v))
            })
            .collect()
    }
}
