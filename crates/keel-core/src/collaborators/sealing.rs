//! Local digest and content-address derivation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{Hasher, Pinner};
use crate::error::{KeelError, Result};

/// SHA-256, hex encoded (64 characters).
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }
}

/// Prefix of synthesized content addresses.
const CID_PREFIX: &str = "bafy";

/// Hex characters of the digest carried into a synthesized address.
const CID_DIGEST_CHARS: usize = 16;

/// Derives a content address from the digest when no pinning service is
/// configured. The same digest always yields the same address.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPinner;

#[async_trait]
impl Pinner for LocalPinner {
    async fn pin(&self, digest: &str) -> Result<String> {
        let head = digest.get(..CID_DIGEST_CHARS).ok_or_else(|| {
            KeelError::invalid_input("digest")
                .with_reason(format!("expected at least {CID_DIGEST_CHARS} characters"))
        })?;
        Ok(format!("{CID_PREFIX}{head}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            Sha256Hasher.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_local_pin_is_deterministic() {
        let digest = Sha256Hasher.digest(b"{}");
        let first = LocalPinner.pin(&digest).await.unwrap();
        let second = LocalPinner.pin(&digest).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, format!("bafy{}", &digest[..16]));
    }

    #[tokio::test]
    async fn test_local_pin_rejects_short_digest() {
        assert!(LocalPinner.pin("abc").await.is_err());
    }
}
