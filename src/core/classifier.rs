//! Address Classifier
//!
//! Decides which chain family an address string belongs to, purely from
//! its shape:
//! - EVM: `0x` + exactly 40 hex characters (either case, no checksum check)
//! - Solana: Base58 that decodes to exactly 32 bytes
//!
//! The two patterns cannot overlap since Base58 has no `0`.

use serde::Serialize;

use crate::models::{AppError, AppResult, ChainFamily};

const EVM_PREFIX: &str = "0x";
const EVM_HEX_LEN: usize = 40;
const SOLANA_PUBKEY_LEN: usize = 32;

/// Classify an address string. Never fails; anything unrecognised is `Invalid`.
pub fn classify(input: &str) -> ChainFamily {
    if is_evm_address(input) {
        ChainFamily::Evm
    } else if is_solana_address(input) {
        ChainFamily::Solana
    } else {
        ChainFamily::Invalid
    }
}

pub fn is_evm_address(input: &str) -> bool {
    match input.strip_prefix(EVM_PREFIX) {
        Some(body) if body.len() == EVM_HEX_LEN => hex::decode(body).is_ok(),
        _ => false,
    }
}

pub fn is_solana_address(input: &str) -> bool {
    match bs58::decode(input).into_vec() {
        Ok(bytes) => bytes.len() == SOLANA_PUBKEY_LEN,
        Err(_) => false,
    }
}

/// An address whose chain family is known and valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedAddress {
    pub address: String,
    pub chain: ChainFamily,
}

impl ClassifiedAddress {
    /// Classify `input`, rejecting anything that is neither EVM nor Solana
    pub fn parse(input: &str) -> AppResult<Self> {
        match classify(input) {
            ChainFamily::Invalid => Err(AppError::invalid_address()),
            chain => Ok(Self {
                address: input.to_string(),
                chain,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }
}
