use serde::{Deserialize, Serialize};

/// Status of a transaction pool.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPoolStatus {
    /// Number of deferred transactions.
    pub deferred: U64,
    pub ready: U64,
    #[serde(rename = "unexecuted")]
    pub unexecuted_count: U64,
}

#[derive(Debug)]
pub struct Wrapper(U256);

pub struct Pending {
    pub first_tx_status: Option<H256>,
    pub pending_count: U64,
    pub pending_txs: Vec<RpcTransaction>,
}
