//! Transaction module - building, sequencing, submission and finalization

pub mod builder;
pub mod nonce;
pub mod payload;
pub mod poller;
pub mod sender;

pub use builder::{SignedTransaction, TransactionBuilder, UnsignedTransaction};
pub use nonce::NonceSequencer;
pub use payload::{CodeMetadata, ContractCall, Payload};
pub use poller::FinalizationPoller;
pub use sender::TransactionSender;
