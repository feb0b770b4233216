//! Read-only chain access through the wallet provider.
//!
//! Subgraph data lags the chain; [`ChainReader`] goes to the node instead,
//! for full blocks and for the instructor contract's view functions.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U64, U256};
use serde_json::json;

use super::provider::{ETH_CALL, ETH_GET_BLOCK, ETH_GET_RECEIPT, WalletProvider, request_as};
use super::rpc_types::{RpcFullBlock, RpcReceipt};
use crate::domain::DashError;
use crate::domain::contract::{
    InstructorProfile, decode_latest_person, decode_person_by_id, decode_person_count,
    encode_get_latest_person, encode_get_person_by_id, encode_get_person_count,
};

/// Reads blocks and contract state at the latest block.
#[derive(Clone)]
pub struct ChainReader {
    provider: Arc<dyn WalletProvider>,
    contract: Address,
}

impl fmt::Debug for ChainReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainReader")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

impl ChainReader {
    /// Creates a reader for the instructor contract at `contract`.
    #[must_use]
    pub fn new(provider: Arc<dyn WalletProvider>, contract: Address) -> Self {
        Self { provider, contract }
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    /// Block `number` with its full transaction objects, or `None` if the
    /// node does not have it yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the block is malformed.
    pub async fn block_with_transactions(
        &self,
        number: u64,
    ) -> Result<Option<RpcFullBlock>, DashError> {
        tracing::debug!("Fetching block {number} with transactions");
        request_as(
            self.provider.as_ref(),
            ETH_GET_BLOCK,
            json!([U64::from(number), true]),
        )
        .await
    }

    /// Receipt of a mined transaction, `None` while pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the receipt is malformed.
    pub async fn receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, DashError> {
        request_as(self.provider.as_ref(), ETH_GET_RECEIPT, json!([hash])).await
    }

    // ------------------------------------------------------------------------
    // Contract Views
    // ------------------------------------------------------------------------

    async fn call(&self, data: Bytes) -> Result<Bytes, DashError> {
        let params = json!([{ "to": self.contract, "data": data }, "latest"]);
        request_as(self.provider.as_ref(), ETH_CALL, params).await
    }

    /// Name and age stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Connectivity` if the call reverts or fails, and
    /// `DashError::Decode` if the return data is malformed.
    pub async fn instructor_by_id(&self, id: U256) -> Result<InstructorProfile, DashError> {
        let data = self.call(encode_get_person_by_id(id)).await?;
        decode_person_by_id(&data)
    }

    /// The most recently registered instructor.
    ///
    /// # Errors
    ///
    /// See [`Self::instructor_by_id`].
    pub async fn latest_instructor(&self) -> Result<InstructorProfile, DashError> {
        let data = self.call(encode_get_latest_person()).await?;
        decode_latest_person(&data)
    }

    /// Number of registered instructors.
    ///
    /// # Errors
    ///
    /// See [`Self::instructor_by_id`].
    pub async fn instructor_count(&self) -> Result<U256, DashError> {
        let data = self.call(encode_get_person_count()).await?;
        decode_person_count(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ProviderError;
    use crate::domain::INFO_CONTRACT_ADDRESS;
    use crate::domain::contract::{getPersonByIdCall, getPersonByIdReturn, getPersonCountCall};
    use crate::test_utils::{JsonMother, MockProvider};
    use alloy_sol_types::SolCall;
    use serde_json::Value;

    fn reader() -> (Arc<MockProvider>, ChainReader) {
        let provider = Arc::new(MockProvider::new());
        let reader = ChainReader::new(provider.clone(), INFO_CONTRACT_ADDRESS);
        (provider, reader)
    }

    #[tokio::test]
    async fn test_block_requests_full_transactions() {
        let (provider, reader) = reader();
        provider.respond(
            ETH_GET_BLOCK,
            JsonMother::rpc_full_block(
                16,
                vec![JsonMother::rpc_transaction("0x01", "0xabc", "0xdef", "0x0")],
            ),
        );

        let block = reader.block_with_transactions(16).await.unwrap().unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(provider.calls_to(ETH_GET_BLOCK)[0], json!(["0x10", true]));
    }

    #[tokio::test]
    async fn test_unknown_block_is_none() {
        let (provider, reader) = reader();
        provider.respond(ETH_GET_BLOCK, Value::Null);
        assert!(reader.block_with_transactions(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_instructor_by_id_calls_contract() {
        let (provider, reader) = reader();
        let returned = getPersonByIdCall::abi_encode_returns(&getPersonByIdReturn {
            name: "Ada".to_string(),
            age: U256::from(36u64),
        });
        provider.respond(ETH_CALL, JsonMother::call_result(returned));

        let profile = reader.instructor_by_id(U256::from(7u64)).await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.age, U256::from(36u64));

        let params = &provider.calls_to(ETH_CALL)[0];
        assert_eq!(params[1], "latest");
        assert_eq!(
            params[0]["to"].as_str().unwrap().to_lowercase(),
            INFO_CONTRACT_ADDRESS.to_string().to_lowercase()
        );
        let data = params[0]["data"].as_str().unwrap();
        assert!(data.starts_with(&format!(
            "0x{}",
            alloy_primitives::hex::encode(getPersonByIdCall::SELECTOR)
        )));
    }

    #[tokio::test]
    async fn test_instructor_count() {
        let (provider, reader) = reader();
        provider.respond(
            ETH_CALL,
            JsonMother::call_result(getPersonCountCall::abi_encode_returns(&U256::from(12u64))),
        );
        assert_eq!(reader.instructor_count().await.unwrap(), U256::from(12u64));
    }

    #[tokio::test]
    async fn test_reverted_call_is_connectivity_error() {
        let (provider, reader) = reader();
        provider.fail(ETH_CALL, ProviderError::new(3, "execution reverted"));
        assert!(matches!(
            reader.latest_instructor().await,
            Err(DashError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_return_data_is_decode_error() {
        let (provider, reader) = reader();
        provider.respond(ETH_CALL, json!("0x"));
        assert!(matches!(
            reader.latest_instructor().await,
            Err(DashError::Decode(_))
        ));
    }
}
