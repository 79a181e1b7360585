//! Password hashing and bearer token handling

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

mod catalog_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum CatalogHasher {
    Argon2,
    /// Plain-text marker hash, orders of magnitude faster than argon2.
    /// DO NOT use in production.
    #[cfg(feature = "test-fast-hasher")]
    Insecure,
}

impl CatalogHasher {
    pub fn default_hasher() -> CatalogHasher {
        #[cfg(feature = "test-fast-hasher")]
        return CatalogHasher::Insecure;
        #[cfg(not(feature = "test-fast-hasher"))]
        CatalogHasher::Argon2
    }
}

impl FromStr for CatalogHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(CatalogHasher::Argon2),
            #[cfg(feature = "test-fast-hasher")]
            "insecure" => Ok(CatalogHasher::Insecure),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for CatalogHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CatalogHasher::Argon2 => "argon2",
            #[cfg(feature = "test-fast-hasher")]
            CatalogHasher::Insecure => "insecure",
        };
        write!(f, "{}", name)
    }
}

impl CatalogHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            CatalogHasher::Argon2 => catalog_argon2::generate_b64_salt(),
            #[cfg(feature = "test-fast-hasher")]
            CatalogHasher::Insecure => "insecure-salt".to_string(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            CatalogHasher::Argon2 => catalog_argon2::hash(plain, b64_salt),
            #[cfg(feature = "test-fast-hasher")]
            CatalogHasher::Insecure => Ok(format!(
                "insecure:{}:{}",
                b64_salt.as_ref(),
                String::from_utf8_lossy(plain)
            )),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T, _salt: T) -> Result<bool> {
        match self {
            CatalogHasher::Argon2 => {
                catalog_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
            #[cfg(feature = "test-fast-hasher")]
            CatalogHasher::Insecure => {
                let rehashed = self.hash(plain_pw.as_ref().as_bytes(), _salt)?;
                Ok(rehashed == target_hash.as_ref())
            }
        }
    }
}

/// Stored credential row as read back from the database. `created` is
/// assigned by the database at insertion time.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PasswordCredentials {
    pub user_id: i64,
    pub salt: String,
    pub hash: String,
    pub hasher: CatalogHasher,
    pub created: i64,
}

/// Hashed password material not yet attached to a user row.
#[derive(Clone, Debug)]
pub struct PasswordDigest {
    pub salt: String,
    pub hash: String,
    pub hasher: CatalogHasher,
}

impl PasswordDigest {
    pub fn generate(hasher: &CatalogHasher, password: &str) -> Result<PasswordDigest> {
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(PasswordDigest {
            salt,
            hash,
            hasher: hasher.clone(),
        })
    }
}

const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the HS256 bearer tokens handed out at signup/login.
/// The only claim the rest of the system trusts is `sub`, the user id.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str) -> TokenSigner {
        Self::with_ttl(secret, Duration::days(TOKEN_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> TokenSigner {
        TokenSigner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| anyhow!("Failed to sign token: {}", err))
    }

    /// Returns the user id carried by the token, or an error when the
    /// signature is invalid or the token has expired.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::default(),
        )
        .map_err(|err| anyhow!("Invalid token: {}", err))?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_hash() {
        let pw = "123mypw";
        let b64_salt = CatalogHasher::Argon2.generate_b64_salt();

        let hash1 = CatalogHasher::Argon2.hash(pw.as_bytes(), &b64_salt).unwrap();
        let hash2 = CatalogHasher::Argon2.hash(b"123mypw", &b64_salt).unwrap();
        assert_eq!(hash1, hash2);

        assert!(CatalogHasher::Argon2
            .verify("123mypw", &hash1, "unused")
            .unwrap());
        assert!(!CatalogHasher::Argon2
            .verify("not the pw", &hash1, "unused")
            .unwrap());
    }

    #[test]
    fn token_roundtrip() {
        let signer = TokenSigner::new("topsecret");
        let token = signer.issue(42).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), 42);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let signer = TokenSigner::new("topsecret");
        let token = signer.issue(42).unwrap();

        let other = TokenSigner::new("othersecret");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn token_rejects_garbage() {
        let signer = TokenSigner::new("topsecret");
        assert!(signer.verify("not-a-token").is_err());
        assert!(signer.verify("").is_err());
    }

    #[test]
    fn token_rejects_expired() {
        // jsonwebtoken applies a 60s leeway on exp, go well past it
        let signer = TokenSigner::with_ttl("topsecret", Duration::seconds(-120));
        let token = signer.issue(42).unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
