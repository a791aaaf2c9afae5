//! Wallet loading and transaction signing
//!
//! The submission core only depends on the [`TransactionSigner`] seam: it
//! hands over the canonical signing bytes and gets a signature back. The
//! bundled implementation signs with an ed25519 key loaded from an
//! environment variable or a hex key file.

use crate::address::Address;
use crate::config::WalletConfig;
use crate::error::{ClientError, ClientResult};

use ed25519_dalek::{Signer, SigningKey};

/// Default environment variable probed for a hex-encoded secret key
pub const PRIVATE_KEY_ENV: &str = "SNOWLINE_PRIVATE_KEY";

/// Opaque signing collaborator
pub trait TransactionSigner: Send + Sync {
    /// Address of the key this signer controls
    fn address(&self) -> Address;

    /// Sign a transaction's canonical byte encoding
    fn sign(&self, bytes: &[u8]) -> ClientResult<Vec<u8>>;
}

/// Signer backed by a local ed25519 key
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Build a signer from a 32-byte hex-encoded secret key
    pub fn from_hex(encoded: &str) -> ClientResult<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| ClientError::Wallet(format!("Invalid private key hex: {}", e)))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ClientError::Wallet(format!(
                "Private key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }

    /// Load a wallet from the environment or a configured key file
    pub fn load(config: &WalletConfig) -> ClientResult<Self> {
        let env_name = config.private_key_env.as_deref().unwrap_or(PRIVATE_KEY_ENV);
        if let Ok(key) = std::env::var(env_name) {
            return Self::from_hex(&key);
        }

        if let Some(path) = &config.key_file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                ClientError::Wallet(format!("Failed to read key file {:?}: {}", path, e))
            })?;
            return Self::from_hex(&contents);
        }

        Err(ClientError::Wallet(format!(
            "No wallet configured. Set {} or wallet.key_file",
            env_name
        )))
    }
}

impl TransactionSigner for Ed25519Signer {
    fn address(&self) -> Address {
        Address::from_bytes(self.key.verifying_key().to_bytes())
    }

    fn sign(&self, bytes: &[u8]) -> ClientResult<Vec<u8>> {
        Ok(self.key.sign(bytes).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_KEY: &str = "413f42575f7f26fad3317a778771212fdb80245850981e48b58a4f25e344e8f9";

    #[test]
    fn test_signing_is_deterministic() {
        let signer = Ed25519Signer::from_hex(TEST_KEY).unwrap();
        let a = signer.sign(b"payload").unwrap();
        let b = signer.sign(b"payload").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(signer.sign(b"other").unwrap(), a);
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(Ed25519Signer::from_hex("abcd").is_err());
        assert!(Ed25519Signer::from_hex("not hex at all").is_err());
    }

    #[test]
    fn test_load_from_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", TEST_KEY).unwrap();

        let config = WalletConfig {
            private_key_env: Some("SNOWLINE_TEST_KEY_UNSET".to_string()),
            key_file: Some(file.path().to_path_buf()),
        };
        let signer = Ed25519Signer::load(&config).unwrap();
        assert_eq!(
            signer.address(),
            Ed25519Signer::from_hex(TEST_KEY).unwrap().address()
        );
    }
}
