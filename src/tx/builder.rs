//! Transaction assembly and wire encoding
//!
//! [`TransactionBuilder::build`] is the single choke point every call kind
//! goes through (plain transfer, token issuance, burn, claim, deploy,
//! upgrade); callers differ only in the receiver, value, gas and payload
//! they supply. Building is pure and does no I/O.

use super::payload::Payload;
use crate::address::Address;
use crate::error::{ClientError, ClientResult};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Serialize, Serializer};

/// Transaction format version understood by the network
pub const TX_VERSION: u32 = 2;

/// An assembled transaction before signing.
///
/// Field order matches the wire layout; the canonical signing bytes are the
/// JSON serialization in exactly this order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    #[serde(serialize_with = "serialize_value")]
    pub value: u128,
    #[serde(serialize_with = "serialize_address")]
    pub receiver: Address,
    #[serde(serialize_with = "serialize_address")]
    pub sender: Address,
    #[serde(rename = "gasPrice")]
    pub gas_price: u64,
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    #[serde(serialize_with = "serialize_data", skip_serializing_if = "Payload::is_empty")]
    pub data: Payload,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
}

impl UnsignedTransaction {
    /// Canonical byte encoding handed to the signing collaborator
    pub fn signing_bytes(&self) -> ClientResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| ClientError::Validation(format!("Failed to encode transaction: {}", e)))
    }

    /// Attach a signature, completing the transaction
    pub fn into_signed(self, signature: Vec<u8>) -> SignedTransaction {
        SignedTransaction {
            tx: self,
            signature,
        }
    }
}

/// A signed transaction ready for submission
#[derive(Debug, Clone, Serialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub tx: UnsignedTransaction,
    #[serde(serialize_with = "serialize_signature")]
    pub signature: Vec<u8>,
}

fn serialize_value<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn serialize_address<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_bech32())
}

fn serialize_data<S: Serializer>(data: &Payload, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_STANDARD.encode(data.as_bytes()))
}

fn serialize_signature<S: Serializer>(sig: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(sig))
}

/// Assembles unsigned transactions with the network-wide constants applied
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    chain_id: String,
    gas_price: u64,
}

impl TransactionBuilder {
    pub fn new(chain_id: impl Into<String>, gas_price: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            gas_price,
        }
    }

    /// Assemble an unsigned transaction from semantic inputs.
    ///
    /// Payload validity is enforced by [`Payload`] construction; this checks
    /// the remaining numeric constraints.
    pub fn build(
        &self,
        sender: Address,
        receiver: Address,
        value: u128,
        payload: Payload,
        gas_limit: u64,
        nonce: u64,
    ) -> ClientResult<UnsignedTransaction> {
        if gas_limit == 0 {
            return Err(ClientError::Validation(
                "Gas limit must be positive".to_string(),
            ));
        }

        Ok(UnsignedTransaction {
            nonce,
            value,
            receiver,
            sender,
            gas_price: self.gas_price,
            gas_limit,
            data: payload,
            chain_id: self.chain_id.clone(),
            version: TX_VERSION,
        })
    }
}
