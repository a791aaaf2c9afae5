//! Bech32 account addresses and contract address derivation

use crate::error::{ClientError, ClientResult};

use bech32::{FromBase32, ToBase32, Variant};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Human-readable part of every account address on the network
pub const ADDRESS_HRP: &str = "erd";

/// Length of the raw public key behind an address
pub const PUBKEY_LEN: usize = 32;

/// VM type bytes embedded in WASM contract addresses
const VM_TYPE_WASM: [u8; 2] = [0x05, 0x00];

/// A 32-byte account identity with a bech32 encoded form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; PUBKEY_LEN]);

impl Address {
    pub fn from_bytes(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a bech32 address ("erd1...")
    pub fn from_bech32(encoded: &str) -> ClientResult<Self> {
        let (hrp, data, variant) = bech32::decode(encoded)
            .map_err(|e| ClientError::Address(format!("Invalid bech32 address: {}", e)))?;

        if hrp != ADDRESS_HRP {
            return Err(ClientError::Address(format!(
                "Unexpected address prefix: {}",
                hrp
            )));
        }
        if variant != Variant::Bech32 {
            return Err(ClientError::Address(
                "Unexpected bech32 variant".to_string(),
            ));
        }

        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| ClientError::Address(format!("Invalid bech32 payload: {}", e)))?;

        let bytes: [u8; PUBKEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ClientError::Address(format!(
                "Address payload must be {} bytes, got {}",
                PUBKEY_LEN,
                bytes.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Parse a hex-encoded public key
    pub fn from_hex(encoded: &str) -> ClientResult<Self> {
        let bytes = hex::decode(encoded)
            .map_err(|e| ClientError::Address(format!("Invalid hex address: {}", e)))?;
        let bytes: [u8; PUBKEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ClientError::Address(format!(
                "Address must be {} bytes, got {}",
                PUBKEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_bech32(&self) -> String {
        // Infallible for a fixed 32-byte payload and a valid hrp
        bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32)
            .unwrap_or_else(|_| hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    /// The reserved all-zero address transactions are sent to when deploying
    pub fn system_deploy() -> Self {
        Self([0u8; PUBKEY_LEN])
    }

    /// Whether this address belongs to a smart contract (leading zero bytes)
    pub fn is_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

/// Derive the address a contract is deployed at from its owner and the
/// nonce of the deployment transaction.
///
/// Layout: 8 zero bytes, the VM type, bytes 10..30 of
/// keccak256(owner || nonce_le), then the last 2 bytes of the owner key.
pub fn compute_contract_address(owner: &Address, deployment_nonce: u64) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(owner.as_bytes());
    hasher.update(deployment_nonce.to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; PUBKEY_LEN];
    bytes[8..10].copy_from_slice(&VM_TYPE_WASM);
    bytes[10..30].copy_from_slice(&digest[10..30]);
    bytes[30..].copy_from_slice(&owner.as_bytes()[30..]);
    Address::from_bytes(bytes)
}
