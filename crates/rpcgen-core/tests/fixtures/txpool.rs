use jsonrpc_derive::rpc;

/// Transaction pool RPC.
#[rpc(server)]
pub trait TransactionPool {
    // return account ready + deferred transactions
    #[rpc(name = "txpool_accountTransactions")]
    fn txpool_get_account_transactions(&self, address: RpcAddress) -> JsonRpcResult<Vec<RpcTransaction>>;

    #[rpc(name = "txpool_status")]
    fn txpool_status(&self) -> JsonRpcResult<u64>;

    #[rpc(name = "txpool_nextNonce")]
    fn txpool_next_nonce(&self, address: RpcAddress) -> JsonRpcResult<U256>;

    fn txpool_internal(&self) -> usize;
}
