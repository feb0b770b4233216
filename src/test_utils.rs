//! Shared test utilities and Mother pattern factories.
//!
//! This module provides reusable fixtures: JSON payloads shaped like the
//! subgraph and JSON-RPC responses, receipt logs, and in-memory stand-ins
//! for the wallet provider and the query source.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{B256, Bytes, U256, keccak256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use crate::client::{ProviderError, ProviderEvent, QuerySource, RpcLog, WalletProvider};
use crate::domain::contract::InstructorCreated;
use crate::domain::{DashError, INFO_CONTRACT_ADDRESS, ListRequest};

// ============================================================================
// JSON Payloads
// ============================================================================

pub struct JsonMother;

impl JsonMother {
    /// A subgraph block entity.
    #[must_use]
    pub fn block(number: &str) -> Value {
        json!({
            "id": format!("block-{number}"),
            "number": number,
            "timestamp": "1700000000",
            "hash": "0x6e1b3cbb1ad0b7a5e7fa3dd2cf6b9c1e4f0b24ac5ba37a9f6c77d3d8c1e2f3a4",
            "gasUsed": "15000000",
            "gasLimit": "30000000",
            "transactionCount": 150,
        })
    }

    /// A subgraph transaction entity.
    #[must_use]
    pub fn transaction(hash: &str, from: &str, to: &str) -> Value {
        json!({
            "id": hash,
            "hash": hash,
            "from": { "id": from },
            "to": { "id": to },
            "value": "1000000000000000000",
            "gasPrice": "20000000000",
            "gasUsed": "21000",
            "timestamp": "1700000000",
            "block": { "id": "block-18000000", "number": "18000000" },
        })
    }

    /// A subgraph instructor entity.
    #[must_use]
    pub fn instructor(instructor_id: &str, name: &str, age: &str) -> Value {
        json!({
            "id": format!("0xabc-{instructor_id}"),
            "instructorId": instructor_id,
            "name": name,
            "age": age,
            "blockNumber": "5000000",
            "blockTimestamp": "1700000000",
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
        })
    }

    /// An `eth_getTransactionReceipt` result mined in block 16 with 21000
    /// gas at 20 gwei.
    #[must_use]
    pub fn receipt(hash: &str, success: bool) -> Value {
        json!({
            "transactionHash": hash,
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x4a817c800",
            "status": if success { "0x1" } else { "0x0" },
            "logs": [],
        })
    }

    /// An `eth_getTransactionByHash` result; `value` is hex wei.
    #[must_use]
    pub fn rpc_transaction(hash: &str, from: &str, to: &str, value: &str) -> Value {
        json!({
            "hash": hash,
            "from": from,
            "to": to,
            "value": value,
            "gasPrice": "0x4a817c800",
            "blockNumber": "0x10",
            "input": "0x",
        })
    }

    /// An `eth_getBlockByNumber` header.
    #[must_use]
    pub fn rpc_block(number: u64, timestamp: u64) -> Value {
        json!({
            "number": format!("{number:#x}"),
            "hash": "0x6e1b3cbb1ad0b7a5e7fa3dd2cf6b9c1e4f0b24ac5ba37a9f6c77d3d8c1e2f3a4",
            "timestamp": format!("{timestamp:#x}"),
        })
    }

    /// An `eth_getBlockByNumber` result with full transaction objects, half
    /// of the 30M gas limit used.
    #[must_use]
    pub fn rpc_full_block(number: u64, transactions: Vec<Value>) -> Value {
        json!({
            "number": format!("{number:#x}"),
            "hash": "0x6e1b3cbb1ad0b7a5e7fa3dd2cf6b9c1e4f0b24ac5ba37a9f6c77d3d8c1e2f3a4",
            "timestamp": "0x6553f100",
            "gasUsed": "0xe4e1c0",
            "gasLimit": "0x1c9c380",
            "miner": "0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5",
            "transactions": transactions,
        })
    }

    /// An `eth_call` result carrying ABI-encoded return data.
    #[must_use]
    pub fn call_result(data: Vec<u8>) -> Value {
        json!(Bytes::from(data))
    }
}

// ============================================================================
// Receipt Logs
// ============================================================================

pub struct LogMother;

impl LogMother {
    /// A well-formed `InstructorCreated` log from the registry contract.
    #[must_use]
    pub fn instructor_created(id: u64, name: &str, age: u64) -> RpcLog {
        let event = InstructorCreated {
            id: U256::from(id),
            name: name.to_string(),
            age: U256::from(age),
        };
        let log_data = event.encode_log_data();
        RpcLog {
            address: INFO_CONTRACT_ADDRESS,
            topics: log_data.topics().to_vec(),
            data: log_data.data,
        }
    }

    /// An ERC-20 `Transfer` log, which must never decode as an instructor.
    #[must_use]
    pub fn unrelated() -> RpcLog {
        RpcLog {
            address: INFO_CONTRACT_ADDRESS,
            topics: vec![
                keccak256("Transfer(address,address,uint256)"),
                B256::ZERO,
                B256::ZERO,
            ],
            data: Bytes::from(vec![0u8; 32]),
        }
    }

    /// Right signature, but the string payload is cut off.
    #[must_use]
    pub fn truncated_instructor_created() -> RpcLog {
        let mut log = Self::instructor_created(9, "Truncated", 50);
        log.data = Bytes::copy_from_slice(&log.data[..32]);
        log
    }
}

// ============================================================================
// Mock Wallet Provider
// ============================================================================

/// Provider answering from per-method queues of scripted responses.
///
/// An unscripted method fails with `METHOD_NOT_FOUND`.
#[derive(Debug)]
pub struct MockProvider {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    calls: Mutex<Vec<(String, Value)>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    fn script(&self, method: &str, response: Result<Value, ProviderError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queues a successful result for `method`.
    pub fn respond(&self, method: &str, result: Value) {
        self.script(method, Ok(result));
    }

    /// Queues an error for `method`.
    pub fn fail(&self, method: &str, error: ProviderError) {
        self.script(method, Err(error));
    }

    /// Pushes a notification to subscribers.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    /// Every request so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Params of every request to `method`.
    #[must_use]
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.calls_to(method).len()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        self.responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ProviderError::new(
                    ProviderError::METHOD_NOT_FOUND,
                    format!("no scripted response for {method}"),
                ))
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

// ============================================================================
// Mock Query Source
// ============================================================================

#[derive(Debug)]
struct ScriptedPage {
    delay: Duration,
    result: Result<Vec<Value>, DashError>,
}

/// Query source answering from a queue of scripted pages.
///
/// With the queue empty every request yields an empty page.
#[derive(Debug, Default)]
pub struct MockQuerySource {
    pages: Mutex<VecDeque<ScriptedPage>>,
    requests: Mutex<Vec<ListRequest>>,
}

impl MockQuerySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, records: Vec<Value>) {
        self.push_delayed(Duration::ZERO, records);
    }

    /// Queues a page that arrives after `delay`.
    pub fn push_delayed(&self, delay: Duration, records: Vec<Value>) {
        self.pages.lock().unwrap().push_back(ScriptedPage {
            delay,
            result: Ok(records),
        });
    }

    pub fn push_err(&self, error: DashError) {
        self.pages.lock().unwrap().push_back(ScriptedPage {
            delay: Duration::ZERO,
            result: Err(error),
        });
    }

    /// Every request so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuerySource for MockQuerySource {
    async fn list(&self, request: &ListRequest) -> Result<Vec<Value>, DashError> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self.pages.lock().unwrap().pop_front();

        match scripted {
            Some(page) => {
                if !page.delay.is_zero() {
                    tokio::time::sleep(page.delay).await;
                }
                page.result
            }
            None => Ok(Vec::new()),
        }
    }
}
