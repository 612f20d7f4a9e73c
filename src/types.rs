use num_bigint::BigUint;
use serde::Serialize;

/// Display-ready form of one transaction touching the searched address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub block_number: u64,
    pub timestamp: u64,
    pub index_in_block: u64,
    pub hash: String,
    pub from: String,
    /// `None` for contract creations.
    pub to: Option<String>,
    pub created_contract_address: Option<String>,
    #[serde(serialize_with = "crate::util_text::serialize_biguint_as_string")]
    pub value: BigUint,
    /// `gas_used * gas_price`
    #[serde(serialize_with = "crate::util_text::serialize_biguint_as_string")]
    pub fee: BigUint,
    #[serde(serialize_with = "crate::util_text::serialize_biguint_as_string")]
    pub gas_price: BigUint,
    #[serde(serialize_with = "crate::util_text::serialize_bytes_as_hex")]
    pub data: Vec<u8>,
    pub status: bool,
}

impl TransactionRecord {
    /// Chain ordering key: `(block_number, index_in_block)`.
    #[inline]
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.index_in_block)
    }
}

/// One remote-fetched batch of transactions, oldest first.
///
/// Chunks hold whole blocks, so `txs` may be longer than the requested page
/// size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chunk {
    pub txs: Vec<TransactionRecord>,
    /// The chunk includes the address's earliest transaction.
    pub touches_first: bool,
    /// The chunk includes the address's latest transaction.
    pub touches_last: bool,
}

impl Chunk {
    /// Chunk for an address without any history.
    pub fn empty_history() -> Self {
        Chunk {
            txs: Vec::new(),
            touches_first: true,
            touches_last: true,
        }
    }
}

/// Where a fetch looks relative to its reference block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Older than the reference block (block 0 = start from the newest end).
    Before,
    /// Newer than the reference block.
    After,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Before => write!(f, "before"),
            Direction::After => write!(f, "after"),
        }
    }
}
