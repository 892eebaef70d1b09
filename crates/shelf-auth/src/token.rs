use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use shelf_types::claim::TimeLimited;
use tracing::debug;

use crate::error::{Error, Result};

pub const MIN_SECRET_LEN: usize = 32;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and validates HS256 signed access tokens
pub struct TokenManager {
    keys: Keys,
    default_validity: std::time::Duration,
    header: Header,
    validation: Validation,
}

impl TokenManager {
    pub fn new(secret: impl AsRef<[u8]>, default_validity: std::time::Duration) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }
        Ok(Self {
            keys: Keys::new(secret),
            default_validity,
            header: Header::default(),
            validation: Validation::default(),
        })
    }

    pub fn issue(&self, mut claims: impl serde::Serialize + TimeLimited) -> Result<String> {
        let validity = std::time::SystemTime::now() + self.default_validity;
        claims.set_validity(validity);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    #[cfg(test)]
    fn issue_expired(&self, mut claims: impl serde::Serialize + TimeLimited) -> Result<String> {
        let validity = std::time::SystemTime::now() - self.default_validity;
        claims.set_validity(validity);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    pub fn validate<T>(&self, token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let data = decode::<T>(token, &self.keys.decoding, &self.validation).map_err(|e| {
            debug!("Token rejected: {e}");
            e
        })?;
        Ok(data.claims)
    }

    pub fn default_validity(&self) -> std::time::Duration {
        self.default_validity
    }
}
