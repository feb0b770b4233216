//! Transaction submission and receipt normalization.
//!
//! [`TransactionSubmitter`] validates a form, sends the write through the
//! wallet session's signer, waits for one confirmation, and turns the
//! receipt into a [`SubmittedTransaction`] ready for display. Completed
//! records are kept most recent first.

use std::collections::VecDeque;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use tokio::sync::mpsc;

use super::wallet::WalletSession;
use crate::client::{RpcReceipt, Signer, TransactionRequest};
use crate::constants::CONFIRMATION_POLL_INTERVAL;
use crate::domain::format::{
    AMOUNT_PLACES, GAS_PRICE_PLACES, GWEI_DECIMALS, WEI_DECIMALS, format_fixed,
    format_timestamp_secs, parse_amount,
};
use crate::domain::{
    DashError, INFO_CONTRACT_ADDRESS, InstructorEvent, decode_instructor_events, encode_set_info,
    network_info,
};

// ============================================================================
// Types
// ============================================================================

/// User input for a native-currency transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferForm {
    /// Decimal amount in native units, e.g. `"0.5"`.
    pub amount: String,
    pub recipient: String,
    /// Optional note, attached as UTF-8 call data.
    pub message: String,
}

/// On-chain outcome of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

impl TxStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// What a submitted transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    Transfer,
    /// `setInfo` call with the events decoded from its receipt.
    InstructorRegistration(Vec<InstructorEvent>),
}

/// A confirmed write, normalized for display. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub hash: String,
    pub block_number: u64,
    pub timestamp: String,
    pub sender: String,
    pub recipient: String,
    /// Native-currency amount with six decimals.
    pub amount: String,
    pub message: Option<String>,
    pub gas_used: String,
    /// Gas price in gwei with two decimals.
    pub gas_price: String,
    /// `gas_price * gas_used` in native units with six decimals.
    pub transaction_fee: String,
    pub status: TxStatus,
    pub explorer_url: Option<String>,
    pub kind: SubmissionKind,
}

/// Progress notifications emitted while a write is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// The wallet accepted the transaction.
    Sent { hash: String },
    /// One confirmation was observed.
    Confirmed { hash: String, block_number: u64 },
}

// ============================================================================
// Transaction Submitter
// ============================================================================

/// Submits writes and keeps the list of completed ones.
#[derive(Debug)]
pub struct TransactionSubmitter {
    records: VecDeque<SubmittedTransaction>,
    contract: Address,
    confirmation_interval: Duration,
    progress: Option<mpsc::UnboundedSender<SubmissionEvent>>,
}

impl Default for TransactionSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSubmitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            contract: INFO_CONTRACT_ADDRESS,
            confirmation_interval: CONFIRMATION_POLL_INTERVAL,
            progress: None,
        }
    }

    /// Targets another deployment of the instructor contract.
    #[must_use]
    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }

    #[must_use]
    pub fn with_confirmation_interval(mut self, interval: Duration) -> Self {
        self.confirmation_interval = interval;
        self
    }

    /// Sends [`SubmissionEvent`]s to `progress` as writes advance.
    #[must_use]
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<SubmissionEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Completed writes, most recent first.
    #[must_use]
    pub fn records(&self) -> &VecDeque<SubmittedTransaction> {
        &self.records
    }

    fn notify(&self, event: SubmissionEvent) {
        if let Some(progress) = &self.progress {
            // The listener may be gone; progress is advisory.
            let _ = progress.send(event);
        }
    }

    // ------------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------------

    /// Sends a native-currency transfer and records it once confirmed.
    ///
    /// A transfer that reverts is still recorded, with
    /// [`TxStatus::Failed`].
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` (before any network call) when the
    /// wallet is not connected or the form is incomplete, and
    /// `DashError::Submission` when the wallet rejects the transaction.
    pub async fn submit_transfer(
        &mut self,
        session: &mut WalletSession,
        form: &TransferForm,
    ) -> Result<SubmittedTransaction, DashError> {
        let value = validate_transfer(form)?;
        let signer = session.signer()?;
        let chain_id = session.state().chain_id;

        let message = Some(form.message.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        let request = TransactionRequest {
            from: signer.account().to_string(),
            to: form.recipient.trim().to_string(),
            value: Some(value),
            data: message
                .as_ref()
                .map(|m| Bytes::copy_from_slice(m.as_bytes())),
        };

        let (hash, receipt) = self.send_and_confirm(&signer, &request).await?;
        let mut record = self
            .normalize(&signer, &hash, &receipt, chain_id, SubmissionKind::Transfer)
            .await?;
        record.message = message;

        tracing::info!(
            "Transfer {hash} confirmed in block {} ({})",
            record.block_number,
            record.status.as_str()
        );
        self.records.push_front(record.clone());
        Ok(record)
    }

    // ------------------------------------------------------------------------
    // Instructor Registration
    // ------------------------------------------------------------------------

    /// Calls `setInfo(name, age)` and records the decoded
    /// `InstructorCreated` events.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` for bad input or no wallet,
    /// `DashError::Submission` when the call is rejected or reverts, and
    /// `DashError::Decode` when the receipt holds no `InstructorCreated`
    /// event.
    pub async fn register_instructor(
        &mut self,
        session: &mut WalletSession,
        name: &str,
        age: &str,
    ) -> Result<SubmittedTransaction, DashError> {
        let (name, age) = validate_registration(name, age)?;
        let signer = session.signer()?;
        let chain_id = session.state().chain_id;

        let request = TransactionRequest {
            from: signer.account().to_string(),
            to: self.contract.to_checksum(None),
            value: None,
            data: Some(encode_set_info(name, age)),
        };

        let (hash, receipt) = self.send_and_confirm(&signer, &request).await?;
        if !receipt.succeeded() {
            return Err(DashError::submission(format!(
                "setInfo transaction {hash} reverted"
            )));
        }

        let events = decode_instructor_events(&receipt.logs);
        if events.is_empty() {
            return Err(DashError::Decode(format!(
                "no InstructorCreated event in receipt of {hash}"
            )));
        }

        let record = self
            .normalize(
                &signer,
                &hash,
                &receipt,
                chain_id,
                SubmissionKind::InstructorRegistration(events),
            )
            .await?;
        tracing::info!("Registered instructor '{name}' in {hash}");
        self.records.push_front(record.clone());
        Ok(record)
    }

    // ------------------------------------------------------------------------
    // Shared Steps
    // ------------------------------------------------------------------------

    async fn send_and_confirm(
        &self,
        signer: &Signer,
        request: &TransactionRequest,
    ) -> Result<(String, RpcReceipt), DashError> {
        let hash = signer
            .send_transaction(request)
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    DashError::submission(format!("rejected in wallet: {}", e.message))
                } else {
                    DashError::submission(e.message)
                }
            })?;
        tracing::info!("Transaction sent: {hash}");
        self.notify(SubmissionEvent::Sent { hash: hash.clone() });

        let receipt = signer
            .wait_for_receipt(&hash, self.confirmation_interval)
            .await?;
        self.notify(SubmissionEvent::Confirmed {
            hash: hash.clone(),
            block_number: receipt.block_number.to::<u64>(),
        });
        Ok((hash, receipt))
    }

    /// Fetches the transaction and its block and builds the display record.
    async fn normalize(
        &self,
        signer: &Signer,
        hash: &str,
        receipt: &RpcReceipt,
        chain_id: Option<u64>,
        kind: SubmissionKind,
    ) -> Result<SubmittedTransaction, DashError> {
        let tx = signer
            .transaction(hash)
            .await?
            .ok_or_else(|| DashError::query(format!("transaction {hash} not found")))?;
        let block = signer.block(receipt.block_number).await?;

        let gas_price = tx
            .gas_price
            .or(receipt.effective_gas_price)
            .unwrap_or(U256::ZERO);
        let fee = gas_price.saturating_mul(receipt.gas_used);
        let timestamp = block.map_or(0, |b| b.timestamp.saturating_to::<i64>());

        Ok(SubmittedTransaction {
            hash: hash.to_string(),
            block_number: receipt.block_number.to::<u64>(),
            timestamp: format_timestamp_secs(timestamp),
            sender: tx.from,
            recipient: tx.to.unwrap_or_default(),
            amount: format_fixed(tx.value, WEI_DECIMALS, AMOUNT_PLACES),
            message: None,
            gas_used: receipt.gas_used.to_string(),
            gas_price: format_fixed(gas_price, GWEI_DECIMALS, GAS_PRICE_PLACES),
            transaction_fee: format_fixed(fee, WEI_DECIMALS, AMOUNT_PLACES),
            status: if receipt.succeeded() {
                TxStatus::Success
            } else {
                TxStatus::Failed
            },
            explorer_url: chain_id.and_then(network_info).map(|n| n.tx_url(hash)),
            kind,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_transfer(form: &TransferForm) -> Result<U256, DashError> {
    let amount = form.amount.trim();
    if amount.is_empty() || form.recipient.trim().is_empty() {
        return Err(DashError::invalid_input("amount and recipient are required"));
    }
    match parse_amount(amount, WEI_DECIMALS) {
        Some(value) if !value.is_zero() => Ok(value),
        Some(_) => Err(DashError::invalid_input("amount must be greater than zero")),
        None => Err(DashError::invalid_input(format!(
            "'{amount}' is not a valid amount"
        ))),
    }
}

fn validate_registration<'a>(name: &'a str, age: &str) -> Result<(&'a str, u64), DashError> {
    let name = name.trim();
    if name.is_empty() || age.trim().is_empty() {
        return Err(DashError::invalid_input("name and age are required"));
    }
    let age = age
        .trim()
        .parse::<u64>()
        .map_err(|_| DashError::invalid_input(format!("'{}' is not a valid age", age.trim())))?;
    Ok((name, age))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::client::ProviderError;
    use crate::client::provider::{
        ETH_CHAIN_ID, ETH_GET_BLOCK, ETH_GET_RECEIPT, ETH_GET_TRANSACTION, ETH_REQUEST_ACCOUNTS,
        ETH_SEND_TRANSACTION,
    };
    use crate::test_utils::{JsonMother, LogMother, MockProvider};
    use serde_json::{Value, json};

    const SENDER: &str = "0x5e1de00000000000000000000000000000000001";
    const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    async fn connected() -> (Arc<MockProvider>, WalletSession) {
        let provider = Arc::new(MockProvider::new());
        provider.respond(ETH_REQUEST_ACCOUNTS, json!([SENDER]));
        provider.respond(ETH_CHAIN_ID, json!("0xaa36a7"));
        let mut session = WalletSession::new(provider.clone());
        session.connect().await.unwrap();
        (provider, session)
    }

    fn script_confirmed(provider: &MockProvider, value: &str, receipt: Value) {
        provider.respond(ETH_SEND_TRANSACTION, json!(HASH));
        provider.respond(ETH_GET_RECEIPT, Value::Null);
        provider.respond(ETH_GET_RECEIPT, receipt);
        provider.respond(
            ETH_GET_TRANSACTION,
            JsonMother::rpc_transaction(HASH, SENDER, "0xRECIPIENT", value),
        );
        provider.respond(ETH_GET_BLOCK, JsonMother::rpc_block(16, 1_700_000_000));
    }

    fn submitter() -> TransactionSubmitter {
        TransactionSubmitter::new().with_confirmation_interval(Duration::from_millis(10))
    }

    fn transfer(amount: &str, recipient: &str) -> TransferForm {
        TransferForm {
            amount: amount.to_string(),
            recipient: recipient.to_string(),
            message: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_end_to_end() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        script_confirmed(&provider, "0x6f05b59d3b20000", JsonMother::receipt(HASH, true));

        let record = submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap();

        assert_eq!(record.amount, "0.500000");
        assert_eq!(record.hash, HASH);
        assert_eq!(record.block_number, 16);
        assert_eq!(record.status, TxStatus::Success);
        assert_eq!(record.recipient, "0xRECIPIENT");
        assert_eq!(record.gas_used, "21000");
        assert_eq!(record.gas_price, "20.00");
        assert_eq!(record.transaction_fee, "0.000420");
        assert_eq!(record.timestamp, "Tue, 14 Nov 2023 22:13:20");
        assert_eq!(
            record.explorer_url.as_deref(),
            Some(format!("https://sepolia.etherscan.io/tx/{HASH}").as_str())
        );

        let sent = &provider.calls_to(ETH_SEND_TRANSACTION)[0][0];
        assert_eq!(sent["from"], SENDER);
        assert_eq!(sent["to"], "0xRECIPIENT");
        assert_eq!(sent["value"], "0x6f05b59d3b20000");
        assert!(sent.get("data").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_are_most_recent_first() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();

        script_confirmed(&provider, "0xde0b6b3a7640000", JsonMother::receipt(HASH, true));
        submitter
            .submit_transfer(&mut session, &transfer("1", "0xFIRST"))
            .await
            .unwrap();
        script_confirmed(&provider, "0x6f05b59d3b20000", JsonMother::receipt(HASH, true));
        submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap();

        let amounts: Vec<&str> = submitter.records().iter().map(|r| r.amount.as_str()).collect();
        assert_eq!(amounts, vec!["0.500000", "1.000000"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_is_sent_as_utf8_data() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        script_confirmed(&provider, "0x6f05b59d3b20000", JsonMother::receipt(HASH, true));

        let form = TransferForm {
            message: "hi".into(),
            ..transfer("0.5", "0xRECIPIENT")
        };
        let record = submitter.submit_transfer(&mut session, &form).await.unwrap();

        assert_eq!(record.message.as_deref(), Some("hi"));
        assert_eq!(provider.calls_to(ETH_SEND_TRANSACTION)[0][0]["data"], "0x6869");
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events() {
        let (provider, mut session) = connected().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut submitter = submitter().with_progress(tx);
        script_confirmed(&provider, "0x6f05b59d3b20000", JsonMother::receipt(HASH, true));

        submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            SubmissionEvent::Sent {
                hash: HASH.to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            SubmissionEvent::Confirmed {
                hash: HASH.to_string(),
                block_number: 16
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_transfer_is_recorded_as_failed() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        script_confirmed(&provider, "0x6f05b59d3b20000", JsonMother::receipt(HASH, false));

        let record = submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert_eq!(submitter.records().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_transfer_leaves_no_record() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        provider.fail(
            ETH_SEND_TRANSACTION,
            ProviderError::new(ProviderError::USER_REJECTED, "User denied transaction signature."),
        );

        let err = submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap_err();
        match err {
            DashError::Submission(msg) => {
                assert_eq!(msg, "rejected in wallet: User denied transaction signature.");
            }
            other => panic!("Expected Submission error, got {other:?}"),
        }
        assert!(submitter.records().is_empty());
        assert!(provider.calls_to(ETH_GET_RECEIPT).is_empty());
    }

    #[tokio::test]
    async fn test_node_error_keeps_its_message() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        provider.fail(
            ETH_SEND_TRANSACTION,
            ProviderError::new(-32000, "insufficient funds for gas * price + value"),
        );

        let err = submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap_err();
        match err {
            DashError::Submission(msg) => {
                assert_eq!(msg, "insufficient funds for gas * price + value");
            }
            other => panic!("Expected Submission error, got {other:?}"),
        }
    }

    #[rstest::rstest]
    #[case::empty_amount("", "0xRECIPIENT")]
    #[case::empty_recipient("0.5", "  ")]
    #[case::zero("0", "0xRECIPIENT")]
    #[case::negative("-1", "0xRECIPIENT")]
    #[case::garbage("lots", "0xRECIPIENT")]
    #[case::too_precise("0.0000000000000000001", "0xRECIPIENT")]
    #[tokio::test]
    async fn test_invalid_transfer_never_reaches_network(
        #[case] amount: &str,
        #[case] recipient: &str,
    ) {
        let (provider, mut session) = connected().await;
        let calls_before = provider.calls().len();
        let mut submitter = submitter();

        let err = submitter
            .submit_transfer(&mut session, &transfer(amount, recipient))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(provider.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_transfer_requires_connection() {
        let provider = Arc::new(MockProvider::new());
        let mut session = WalletSession::new(provider.clone());
        let mut submitter = submitter();

        let err = submitter
            .submit_transfer(&mut session, &transfer("0.5", "0xRECIPIENT"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_instructor_decodes_events() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        let mut receipt = JsonMother::receipt(HASH, true);
        receipt["logs"] = json!([
            LogMother::unrelated(),
            LogMother::instructor_created(5, "Alice", 30),
        ]);
        script_confirmed(&provider, "0x0", receipt);

        let record = submitter
            .register_instructor(&mut session, " Alice ", "30")
            .await
            .unwrap();

        match &record.kind {
            SubmissionKind::InstructorRegistration(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].id, U256::from(5u64));
                assert_eq!(events[0].name, "Alice");
            }
            SubmissionKind::Transfer => panic!("Expected instructor registration"),
        }

        let sent = &provider.calls_to(ETH_SEND_TRANSACTION)[0][0];
        assert!(
            sent["to"]
                .as_str()
                .unwrap()
                .eq_ignore_ascii_case("0x5d66ac89CB632c4354bd205545c71f9DEfFB4384")
        );
        assert_eq!(sent["data"], json!(encode_set_info("Alice", 30)));
        assert!(sent.get("value").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_without_event_is_decode_error() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        let mut receipt = JsonMother::receipt(HASH, true);
        receipt["logs"] = json!([LogMother::truncated_instructor_created()]);
        script_confirmed(&provider, "0x0", receipt);

        let err = submitter
            .register_instructor(&mut session, "Alice", "30")
            .await
            .unwrap_err();
        assert!(matches!(err, DashError::Decode(_)));
        assert!(submitter.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_registration_is_submission_error() {
        let (provider, mut session) = connected().await;
        let mut submitter = submitter();
        script_confirmed(&provider, "0x0", JsonMother::receipt(HASH, false));

        let err = submitter
            .register_instructor(&mut session, "Alice", "30")
            .await
            .unwrap_err();
        assert!(matches!(err, DashError::Submission(_)));
    }

    #[rstest::rstest]
    #[case::empty_name("", "30")]
    #[case::empty_age("Alice", "")]
    #[case::bad_age("Alice", "thirty")]
    fn test_registration_validation(#[case] name: &str, #[case] age: &str) {
        assert!(validate_registration(name, age).unwrap_err().is_validation());
    }
}
