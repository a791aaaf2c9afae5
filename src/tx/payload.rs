//! Call payload encoding
//!
//! Function-call payloads are ASCII text of the form
//! `functionName@arg1Hex@arg2Hex@...` where each argument is independently
//! hex-encoded with an even digit count. Numeric arguments are zero-padded,
//! string arguments are their raw byte encoding in hex.

use crate::error::{ClientError, ClientResult};

const FIELD_SEPARATOR: u8 = b'@';

/// Hex-encode an unsigned integer with an even number of digits
pub fn encode_uint(value: u128) -> String {
    let digits = format!("{:x}", value);
    if digits.len() % 2 == 0 {
        digits
    } else {
        format!("0{}", digits)
    }
}

/// Decode an even-padded hex integer back to its value
pub fn decode_uint(digits: &str) -> ClientResult<u128> {
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(ClientError::Validation(format!(
            "Numeric field must have an even digit count: {:?}",
            digits
        )));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ClientError::Validation(format!("Invalid numeric field {:?}: {}", digits, e)))
}

/// Hex-encode a string argument as its raw bytes
pub fn encode_str(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Encode a boolean argument (`true` -> "01", `false` -> "00")
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "01"
    } else {
        "00"
    }
}

fn is_even_hex(field: &str) -> bool {
    !field.is_empty()
        && field.len() % 2 == 0
        && field.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Opaque, validated transaction payload bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// The empty payload of a plain value transfer
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap raw payload bytes, validating call-shaped payloads.
    ///
    /// Anything containing a field separator must follow the encoding rules:
    /// every field after the first is even-length hex. Separator-free bytes
    /// pass through untouched (plain transfers may carry arbitrary notes).
    pub fn from_bytes(bytes: Vec<u8>) -> ClientResult<Self> {
        if bytes.contains(&FIELD_SEPARATOR) {
            let text = std::str::from_utf8(&bytes).map_err(|_| {
                ClientError::Validation("Call payload must be ASCII text".to_string())
            })?;
            validate_call_payload(text)?;
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn validate_call_payload(text: &str) -> ClientResult<()> {
    let mut fields = text.split('@');

    let head = fields.next().unwrap_or_default();
    if head.is_empty() {
        return Err(ClientError::Validation(
            "Call payload must not start with a field separator".to_string(),
        ));
    }

    for field in fields {
        if !is_even_hex(field) {
            return Err(ClientError::Validation(format!(
                "Payload field {:?} is not even-length hex",
                field
            )));
        }
    }
    Ok(())
}

/// Builds `functionName@arg..` payloads one argument at a time
#[derive(Debug, Clone)]
pub struct ContractCall {
    function: String,
    args: Vec<String>,
}

impl ContractCall {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    pub fn arg_uint(mut self, value: u128) -> Self {
        self.args.push(encode_uint(value));
        self
    }

    pub fn arg_str(mut self, value: &str) -> Self {
        self.args.push(encode_str(value));
        self
    }

    pub fn arg_bool(mut self, value: bool) -> Self {
        self.args.push(encode_bool(value).to_string());
        self
    }

    pub fn arg_bytes(mut self, value: &[u8]) -> Self {
        self.args.push(hex::encode(value));
        self
    }

    /// Append a pre-encoded hex field
    pub fn arg_hex(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn into_payload(self) -> ClientResult<Payload> {
        let mut text = self.function;
        for arg in &self.args {
            text.push('@');
            text.push_str(arg);
        }
        Payload::from_bytes(text.into_bytes())
    }
}

/// Flags packed into the two code-metadata bytes of deploy/upgrade payloads
#[derive(Debug, Clone, Copy)]
pub struct CodeMetadata {
    pub upgradeable: bool,
    pub readable: bool,
    pub payable: bool,
    pub payable_by_contract: bool,
}

impl Default for CodeMetadata {
    fn default() -> Self {
        Self {
            upgradeable: true,
            readable: true,
            payable: false,
            payable_by_contract: false,
        }
    }
}

impl CodeMetadata {
    pub fn to_hex(self) -> String {
        let mut first = 0u8;
        let mut second = 0u8;
        if self.upgradeable {
            first |= 0x01;
        }
        if self.readable {
            first |= 0x04;
        }
        if self.payable {
            second |= 0x02;
        }
        if self.payable_by_contract {
            second |= 0x04;
        }
        hex::encode([first, second])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_encoding_is_even_padded() {
        assert_eq!(encode_uint(0), "00");
        assert_eq!(encode_uint(1), "01");
        assert_eq!(encode_uint(255), "ff");
        assert_eq!(encode_uint(256), "0100");
        assert_eq!(encode_uint(10_000_000_000_000), "09184e72a000");
    }

    #[test]
    fn test_uint_round_trip() {
        for value in [0u128, 1, 255, 256, (1u128 << 63) - 1] {
            assert_eq!(decode_uint(&encode_uint(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_rejects_odd_digits() {
        assert!(decode_uint("f").is_err());
        assert!(decode_uint("").is_err());
    }

    #[test]
    fn test_string_encoding() {
        assert_eq!(encode_str("WINTER"), "57494e544552");
        assert_eq!(encode_bool(true), "01");
        assert_eq!(encode_bool(false), "00");
    }

    #[test]
    fn test_contract_call_layout() {
        let payload = ContractCall::new("issue")
            .arg_str("SnowToken")
            .arg_str("SNOW")
            .arg_uint(100_000_000)
            .arg_uint(8)
            .into_payload()
            .unwrap();

        assert_eq!(
            payload.as_bytes(),
            b"issue@536e6f77546f6b656e@534e4f57@05f5e100@08"
        );
    }

    #[test]
    fn test_raw_payload_validation() {
        // A note on a plain transfer is allowed through
        assert!(Payload::from_bytes(b"happy new year".to_vec()).is_ok());
        // Call-shaped payloads must carry even-length hex fields
        assert!(Payload::from_bytes(b"claim_tokens@534e4f57".to_vec()).is_ok());
        assert!(Payload::from_bytes(b"claim_tokens@xyz".to_vec()).is_err());
        assert!(Payload::from_bytes(b"claim_tokens@abc".to_vec()).is_err());
        assert!(Payload::from_bytes(b"@00".to_vec()).is_err());
    }

    #[test]
    fn test_code_metadata() {
        let metadata = CodeMetadata {
            upgradeable: true,
            readable: true,
            payable: true,
            payable_by_contract: false,
        };
        assert_eq!(metadata.to_hex(), "0502");
        assert_eq!(CodeMetadata::default().to_hex(), "0500");
    }
}
