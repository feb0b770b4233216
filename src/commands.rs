//! Command-line handlers.
//!
//! Each subcommand builds the components it needs from a [`CommandContext`],
//! runs one operation, and prints plain-text rows. Row rendering is kept in
//! pure functions so it can be tested without a network.

use std::sync::Arc;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::client::{
    ChainReader, HttpClient, HttpConfig, JsonRpcProvider, RpcFullBlock, RpcReceipt,
    RpcTransaction, SubgraphClient, WalletProvider,
};
use crate::constants::{INSTRUCTOR_PAGE_SIZE, PROVIDER_WATCH_INTERVAL};
use crate::domain::format::{
    format_amount, format_count, format_gas_price, format_gas_usage, format_hash,
    format_timestamp, relative_time, shorten_address,
};
use crate::domain::{
    AccountStats, Block, DashError, Instructor, InstructorLookup, InstructorProfile,
    RemoteRecord, Transaction, network_info, supported_networks,
};
use crate::state::{
    AppConfig, ListSnapshot, ListStatus, RemoteListSource, SubmissionEvent, SubmissionKind,
    SubmittedTransaction, TransactionSubmitter, TransferForm, WalletCommand, WalletSession,
    WalletSessionState, WalletStatus,
};

// ============================================================================
// Context
// ============================================================================

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: AppConfig,
    /// Page index requested for list commands.
    pub page: i64,
    /// Overrides the configured page size of list commands.
    pub page_size: Option<usize>,
    /// Keep re-fetching (or following wallet events) until Ctrl-C.
    pub watch: bool,
}

impl CommandContext {
    fn symbol(&self) -> &'static str {
        network_info(self.config.default_chain_id).map_or("ETH", |n| n.native_currency.symbol)
    }

    fn http(&self) -> Result<HttpClient> {
        let config = HttpConfig::with_timeout(self.config.request_timeout());
        Ok(HttpClient::with_config(config)?)
    }

    fn subgraph(&self, url: &str) -> Result<Arc<SubgraphClient>> {
        tracing::debug!("Using subgraph {url}");
        Ok(Arc::new(SubgraphClient::with_http(self.http()?, url)))
    }

    /// Provider on the configured endpoint, which serves the default chain.
    async fn provider(&self) -> Result<Arc<JsonRpcProvider>> {
        let provider = JsonRpcProvider::with_http(self.http()?, &self.config.rpc_url);
        provider
            .register_chain(self.config.default_chain_id, &self.config.rpc_url)
            .await;
        Ok(Arc::new(provider))
    }

    async fn chain_reader(&self) -> Result<ChainReader> {
        Ok(ChainReader::new(
            self.provider().await?,
            self.config.info_contract,
        ))
    }

    /// Session connected to the configured provider.
    async fn connected_session(&self) -> Result<WalletSession> {
        let provider = self.provider().await?;
        let mut session = WalletSession::new(provider);
        session.connect().await.map_err(DashError::into_report)?;
        Ok(session)
    }
}

// ============================================================================
// Row Rendering
// ============================================================================

/// One line per block: number, transaction count, gas usage, hash, age.
#[must_use]
pub fn block_row(block: &Block, now: DateTime<Utc>) -> String {
    let number = block
        .number
        .parse::<u64>()
        .map_or_else(|_| block.number.clone(), format_count);
    let gas = format_gas_usage(&block.gas_used, &block.gas_limit);
    format!(
        "#{number}  {} txs  gas {} / {} ({}%)  {}  {}",
        block.transaction_count,
        gas.used,
        gas.limit,
        gas.percentage,
        format_hash(&block.hash),
        relative_time(&block.timestamp, now)
    )
}

/// One line per transaction: hash, parties, value, gas price, age.
#[must_use]
pub fn transaction_row(tx: &Transaction, symbol: &str, now: DateTime<Utc>) -> String {
    let to = match tx.to_address() {
        "" => "(contract creation)".to_string(),
        to => shorten_address(to),
    };
    format!(
        "{}  {} -> {}  {} {symbol}  {} gwei  {}",
        format_hash(&tx.hash),
        shorten_address(&tx.from.id),
        to,
        format_amount(&tx.value),
        format_gas_price(&tx.gas_price),
        relative_time(&tx.timestamp, now)
    )
}

#[must_use]
pub fn instructor_row(instructor: &Instructor) -> String {
    format!(
        "#{}  {} (age {})  block {}  {}",
        instructor.instructor_id,
        instructor.name,
        instructor.age,
        instructor.block_number,
        format_timestamp(&instructor.block_timestamp)
    )
}

/// Account summary lines; unindexed fields show as `-`.
#[must_use]
pub fn account_lines(stats: &AccountStats, symbol: &str) -> Vec<String> {
    let amount = |value: &Option<String>| {
        value
            .as_deref()
            .map_or_else(|| "-".to_string(), |v| format!("{} {symbol}", format_amount(v)))
    };
    vec![
        format!("Account:      {}", stats.id),
        format!(
            "Transactions: {}",
            stats
                .transaction_count
                .map_or_else(|| "-".to_string(), format_count)
        ),
        format!("Sent:         {}", amount(&stats.total_value_sent)),
        format!("Received:     {}", amount(&stats.total_value_received)),
    ]
}

/// Summary of a confirmed write.
#[must_use]
pub fn submitted_lines(record: &SubmittedTransaction, symbol: &str) -> Vec<String> {
    let mut lines = vec![
        format!("Hash:      {}", record.hash),
        format!("Status:    {}", record.status.as_str()),
        format!("Block:     {}", format_count(record.block_number)),
        format!("Time:      {}", record.timestamp),
        format!("From:      {}", record.sender),
        format!("To:        {}", record.recipient),
        format!("Amount:    {} {symbol}", record.amount),
        format!("Gas used:  {}", record.gas_used),
        format!("Gas price: {} gwei", record.gas_price),
        format!("Fee:       {} {symbol}", record.transaction_fee),
    ];
    if let Some(message) = &record.message {
        lines.push(format!("Message:   {message}"));
    }
    if let SubmissionKind::InstructorRegistration(events) = &record.kind {
        lines.extend(events.iter().map(|event| {
            format!(
                "Instructor #{}: {} (age {})",
                event.id, event.name, event.age
            )
        }));
    }
    if let Some(url) = &record.explorer_url {
        lines.push(format!("Explorer:  {url}"));
    }
    lines
}

/// One line describing the wallet state.
#[must_use]
pub fn wallet_line(state: &WalletSessionState) -> String {
    let mut line = state.status.as_str().to_string();
    if let Some(account) = &state.account {
        line.push_str(&format!("  {account}"));
    }
    match (state.network(), state.chain_id) {
        (Some(network), _) => line.push_str(&format!("  on {network}")),
        (None, Some(chain_id)) => line.push_str(&format!("  on unsupported chain {chain_id}")),
        (None, None) => {}
    }
    if let Some(error) = &state.last_error {
        line.push_str(&format!("  ({error})"));
    }
    line
}

/// Registry listing with the configured default marked.
#[must_use]
pub fn network_lines(default_chain_id: u64) -> Vec<String> {
    supported_networks()
        .iter()
        .map(|network| {
            let marker = if network.chain_id == default_chain_id {
                "*"
            } else {
                " "
            };
            format!(
                "{marker} {:>9}  {:<20} {:<6} {}",
                network.chain_id, network.name, network.native_currency.symbol, network.rpc_url
            )
        })
        .collect()
}

/// Header lines of a block read from the node.
#[must_use]
pub fn full_block_lines(block: &RpcFullBlock) -> Vec<String> {
    let gas = format_gas_usage(&block.gas_used.to_string(), &block.gas_limit.to_string());
    vec![
        format!("Block:        #{}", format_count(block.number.saturating_to::<u64>())),
        format!(
            "Hash:         {}",
            block.hash.as_deref().unwrap_or("(pending)")
        ),
        format!(
            "Time:         {}",
            format_timestamp(&block.timestamp.to_string())
        ),
        format!("Gas:          {} / {} ({}%)", gas.used, gas.limit, gas.percentage),
        format!("Miner:        {}", block.miner.as_deref().unwrap_or("-")),
        format!("Transactions: {}", block.transactions.len()),
    ]
}

/// One line per transaction of a node block, with its receipt outcome.
#[must_use]
pub fn rpc_transaction_row(
    tx: &RpcTransaction,
    receipt: Option<&RpcReceipt>,
    symbol: &str,
) -> String {
    let to = tx
        .to
        .as_deref()
        .map_or_else(|| "(contract creation)".to_string(), shorten_address);
    let outcome = match receipt {
        None => "pending".to_string(),
        Some(receipt) => format!(
            "{}, gas {}",
            if receipt.succeeded() { "success" } else { "failed" },
            format_count(receipt.gas_used.saturating_to::<u64>())
        ),
    };
    format!(
        "{}  {} -> {}  {} {symbol}  {} gwei  {outcome}",
        format_hash(&tx.hash),
        shorten_address(&tx.from),
        to,
        format_amount(&tx.value.to_string()),
        format_gas_price(&tx.gas_price.unwrap_or_default().to_string()),
    )
}

#[must_use]
pub fn profile_line(label: &str, profile: &InstructorProfile) -> String {
    format!("{label}: {} (age {})", profile.name, profile.age)
}

fn page_footer<R>(snapshot: &ListSnapshot<R>) -> String {
    let mut footer = format!(
        "page {} ({} records)",
        snapshot.page_index,
        snapshot.records.len()
    );
    if snapshot.has_next_page {
        footer.push_str(", more available");
    }
    footer
}

// ============================================================================
// List Commands
// ============================================================================

/// Keys read from stdin while a list is watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    Next,
    Prev,
    Refresh,
    Quit,
}

impl ListKey {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "n" | "next" => Some(Self::Next),
            "p" | "prev" => Some(Self::Prev),
            "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Prints one page of a list. In watch mode the list keeps polling and is
/// re-printed on every applied response; `n`, `p`, `r` and `q` on stdin
/// page, refresh and quit.
async fn show_list<R: RemoteRecord>(
    ctx: &CommandContext,
    list: Arc<RemoteListSource<R>>,
    render: impl Fn(&R) -> String,
) -> Result<()> {
    if let Some(page_size) = ctx.page_size {
        list.set_page_size(page_size).await;
    }
    list.go_to(ctx.page).await.map_err(DashError::into_report)?;
    print_snapshot(&list.snapshot().await, &render);
    if !ctx.watch {
        return Ok(());
    }

    let mut updates = list.subscribe();
    updates.mark_unchanged();
    let handle = list.start_polling(ctx.config.poll_interval());
    let mut keys = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                println!();
                print_snapshot(&list.snapshot().await, &render);
            }
            line = keys.next_line(), if stdin_open => {
                let Ok(Some(line)) = line else {
                    stdin_open = false;
                    continue;
                };
                // Failures land in the list status and are printed on update.
                let result = match ListKey::parse(&line) {
                    Some(ListKey::Next) => list.next_page().await,
                    Some(ListKey::Prev) => list.prev_page().await,
                    Some(ListKey::Refresh) => list.refresh().await,
                    Some(ListKey::Quit) => break,
                    None => continue,
                };
                if let Err(err) = result {
                    tracing::debug!("Page change failed: {err}");
                }
            }
        }
    }
    handle.stop();
    Ok(())
}

fn print_snapshot<R>(snapshot: &ListSnapshot<R>, render: &impl Fn(&R) -> String) {
    if let ListStatus::Failed(error) = &snapshot.status {
        eprintln!("Error: {error}");
        return;
    }
    if snapshot.records.is_empty() {
        println!("No records.");
    }
    for record in &snapshot.records {
        println!("{}", render(record));
    }
    println!("{}", page_footer(snapshot));
}

pub async fn blocks(ctx: &CommandContext) -> Result<()> {
    let list = Arc::new(RemoteListSource::<Block>::new(
        ctx.subgraph(&ctx.config.subgraph_url)?,
        ctx.config.block_page_size,
    ));
    show_list(ctx, list, |block| block_row(block, Utc::now())).await
}

pub async fn transactions(ctx: &CommandContext, account: Option<String>) -> Result<()> {
    let list = Arc::new(RemoteListSource::<Transaction>::new(
        ctx.subgraph(&ctx.config.subgraph_url)?,
        ctx.config.transaction_page_size,
    ));
    list.set_account(account).await;
    let symbol = ctx.symbol();
    show_list(ctx, list, |tx| transaction_row(tx, symbol, Utc::now())).await
}

pub async fn account(ctx: &CommandContext, address: &str) -> Result<()> {
    match ctx
        .subgraph(&ctx.config.subgraph_url)?
        .account_stats(address)
        .await?
    {
        Some(stats) => {
            for line in account_lines(&stats, ctx.symbol()) {
                println!("{line}");
            }
        }
        None => println!("No indexed activity for {address}"),
    }
    Ok(())
}

pub async fn instructors(ctx: &CommandContext, lookup: InstructorLookup) -> Result<()> {
    let filter = lookup.to_filter().map_err(DashError::into_report)?;
    let source = ctx.subgraph(&ctx.config.instructor_subgraph_url)?;
    let list = Arc::new(
        RemoteListSource::<Instructor>::new(source, INSTRUCTOR_PAGE_SIZE).with_filter(filter),
    );
    show_list(ctx, list, instructor_row).await
}

pub fn networks(ctx: &CommandContext) {
    for line in network_lines(ctx.config.default_chain_id) {
        println!("{line}");
    }
}

// ============================================================================
// Node Reads
// ============================================================================

/// Prints one block read straight from the node, optionally keeping only
/// transactions sent from or to `account`.
pub async fn block(ctx: &CommandContext, number: u64, account: Option<String>) -> Result<()> {
    let reader = ctx.chain_reader().await?;
    let block = reader
        .block_with_transactions(number)
        .await
        .map_err(DashError::into_report)?
        .ok_or_else(|| eyre!("Block {number} does not exist"))?;

    for line in full_block_lines(&block) {
        println!("{line}");
    }

    let account = account.filter(|a| !a.trim().is_empty());
    let matching: Vec<&RpcTransaction> = block
        .transactions
        .iter()
        .filter(|tx| account.as_deref().is_none_or(|a| tx.involves(a.trim())))
        .collect();
    if matching.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }

    println!();
    let symbol = ctx.symbol();
    for tx in matching {
        let receipt = reader
            .receipt(&tx.hash)
            .await
            .map_err(DashError::into_report)?;
        println!("{}", rpc_transaction_row(tx, receipt.as_ref(), symbol));
    }
    Ok(())
}

/// Reads one instructor (or the latest) from the contract, plus the total.
pub async fn instructor(ctx: &CommandContext, id: Option<String>) -> Result<()> {
    let reader = ctx.chain_reader().await?;
    let line = match id {
        Some(id) => {
            let parsed: U256 = id.trim().parse().map_err(|_| {
                DashError::invalid_input(format!("instructor id '{id}' is not a number"))
                    .into_report()
            })?;
            let profile = reader
                .instructor_by_id(parsed)
                .await
                .map_err(DashError::into_report)?;
            profile_line(&format!("Instructor #{parsed}"), &profile)
        }
        None => {
            let profile = reader
                .latest_instructor()
                .await
                .map_err(DashError::into_report)?;
            profile_line("Latest instructor", &profile)
        }
    };
    println!("{line}");

    let count = reader
        .instructor_count()
        .await
        .map_err(DashError::into_report)?;
    println!("Registered: {count}");
    Ok(())
}

// ============================================================================
// Wallet Commands
// ============================================================================

/// Connects (or restores) the wallet and optionally switches chains. In
/// watch mode the session keeps following provider events until Ctrl-C.
///
/// Every action goes through the session task, so user commands and
/// provider events are applied one at a time.
pub async fn wallet(ctx: &CommandContext, switch: Option<u64>) -> Result<()> {
    let provider = ctx.provider().await?;
    let session = WalletSession::new(provider.clone());
    let mut states = session.subscribe();
    let (commands, command_rx) = mpsc::channel(8);
    let task = tokio::spawn(session.run(command_rx, provider.subscribe()));

    commands.send(WalletCommand::Restore).await?;
    // A no-op once restored.
    commands.send(WalletCommand::Connect).await?;
    if let Some(chain_id) = switch {
        commands.send(WalletCommand::SwitchNetwork(chain_id)).await?;
    }

    if !ctx.watch {
        drop(commands);
        let session = task.await?;
        let state = session.state();
        println!("{}", wallet_line(state));
        return match (&state.status, &state.last_error) {
            (WalletStatus::Error, _) => Err(eyre!("Wallet connection failed")),
            (_, Some(error)) => Err(eyre!("Network switch failed: {error}")),
            _ => Ok(()),
        };
    }

    let watcher = provider.spawn_watcher(PROVIDER_WATCH_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", wallet_line(&states.borrow_and_update()));
            }
        }
    }

    watcher.abort();
    let _ = commands.send(WalletCommand::Disconnect).await;
    drop(commands);
    let session = task.await?;
    println!("{}", wallet_line(session.state()));
    Ok(())
}

fn submitter(ctx: &CommandContext) -> (TransactionSubmitter, tokio::task::JoinHandle<()>) {
    let (progress, mut progress_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                SubmissionEvent::Sent { hash } => println!("Sent {hash}, waiting for confirmation"),
                SubmissionEvent::Confirmed { hash, block_number } => {
                    println!("Confirmed {} in block {block_number}", format_hash(&hash));
                }
            }
        }
    });
    let submitter = TransactionSubmitter::new()
        .with_contract(ctx.config.info_contract)
        .with_confirmation_interval(ctx.config.confirmation_interval())
        .with_progress(progress);
    (submitter, printer)
}

/// Sends `form.amount` to each recipient in turn, stopping at the first
/// failure. Confirmed transfers are printed oldest first.
pub async fn transfer(
    ctx: &CommandContext,
    form: TransferForm,
    extra_recipients: Vec<String>,
) -> Result<()> {
    let mut session = ctx.connected_session().await?;
    let (mut submitter, printer) = submitter(ctx);

    let forms = std::iter::once(form.clone()).chain(extra_recipients.into_iter().map(
        |recipient| TransferForm {
            recipient,
            ..form.clone()
        },
    ));
    let mut outcome = Ok(());
    for form in forms {
        if let Err(err) = submitter.submit_transfer(&mut session, &form).await {
            outcome = Err(err.into_report());
            break;
        }
    }

    let records: Vec<SubmittedTransaction> = submitter.records().iter().rev().cloned().collect();
    drop(submitter);
    printer.await?;
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in submitted_lines(record, ctx.symbol()) {
            println!("{line}");
        }
    }
    outcome
}

pub async fn register(ctx: &CommandContext, name: &str, age: &str) -> Result<()> {
    let mut session = ctx.connected_session().await?;
    let (mut submitter, printer) = submitter(ctx);
    let record = submitter
        .register_instructor(&mut session, name, age)
        .await
        .map_err(DashError::into_report)?;
    drop(submitter);
    printer.await?;
    for line in submitted_lines(&record, ctx.symbol()) {
        println!("{line}");
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstructorEvent;
    use crate::state::submitter::TxStatus;
    use crate::test_utils::JsonMother;
    use chrono::TimeZone;
    use rstest::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_120, 0).unwrap()
    }

    fn record() -> SubmittedTransaction {
        SubmittedTransaction {
            hash: "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".into(),
            block_number: 1_234_567,
            timestamp: "Tue, 14 Nov 2023 22:13:20".into(),
            sender: "0xabc".into(),
            recipient: "0xdef".into(),
            amount: "0.500000".into(),
            message: None,
            gas_used: "21000".into(),
            gas_price: "20.00".into(),
            transaction_fee: "0.000420".into(),
            status: TxStatus::Success,
            explorer_url: None,
            kind: SubmissionKind::Transfer,
        }
    }

    #[test]
    fn test_block_row() {
        let block: Block = serde_json::from_value(JsonMother::block("18000000")).unwrap();
        insta::assert_snapshot!(
            block_row(&block, now()),
            @"#18,000,000  150 txs  gas 15,000,000 / 30,000,000 (50.0%)  0x6e1b3cbb...c1e2f3a4  2m ago"
        );
    }

    #[test]
    fn test_transaction_row() {
        let tx: Transaction = serde_json::from_value(JsonMother::transaction(
            "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "0xabc0000000000000000000000000000000000001",
            "0xdef0000000000000000000000000000000000002",
        ))
        .unwrap();
        insta::assert_snapshot!(
            transaction_row(&tx, "ETH", now()),
            @"0x88df0164...a713944b  0xabc0...0001 -> 0xdef0...0002  1.000000 ETH  20.00 gwei  2m ago"
        );
    }

    #[test]
    fn test_contract_creation_row() {
        let mut value = JsonMother::transaction("0x01", "0xabc", "0xdef");
        value["to"] = serde_json::Value::Null;
        let tx: Transaction = serde_json::from_value(value).unwrap();
        assert!(transaction_row(&tx, "ETH", now()).contains("(contract creation)"));
    }

    #[test]
    fn test_instructor_row() {
        let instructor: Instructor =
            serde_json::from_value(JsonMother::instructor("7", "Ada", "36")).unwrap();
        insta::assert_snapshot!(
            instructor_row(&instructor),
            @"#7  Ada (age 36)  block 5000000  Tue, 14 Nov 2023 22:13:20"
        );
    }

    #[test]
    fn test_account_lines_with_missing_fields() {
        let stats = AccountStats {
            id: "0xabc".into(),
            transaction_count: Some(1234),
            total_value_sent: Some("1500000000000000000".into()),
            total_value_received: None,
        };
        let lines = account_lines(&stats, "SEP");
        assert_eq!(lines[1], "Transactions: 1,234");
        assert_eq!(lines[2], "Sent:         1.500000 SEP");
        assert_eq!(lines[3], "Received:     -");
    }

    #[test]
    fn test_submitted_lines_for_transfer() {
        let lines = submitted_lines(&record(), "ETH");
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[2], "Block:     1,234,567");
        assert_eq!(lines[9], "Fee:       0.000420 ETH");
    }

    #[test]
    fn test_submitted_lines_for_registration() {
        let mut record = record();
        record.message = Some("hi".into());
        record.explorer_url = Some("https://sepolia.etherscan.io/tx/0x88".into());
        record.kind = SubmissionKind::InstructorRegistration(vec![InstructorEvent {
            id: U256::from(3),
            name: "Ada".into(),
            age: U256::from(36),
        }]);
        let lines = submitted_lines(&record, "ETH");
        assert_eq!(lines[10], "Message:   hi");
        assert_eq!(lines[11], "Instructor #3: Ada (age 36)");
        assert_eq!(lines[12], "Explorer:  https://sepolia.etherscan.io/tx/0x88");
    }

    #[rstest]
    #[case::disconnected(WalletSessionState::default(), "disconnected")]
    #[case::unsupported(
        WalletSessionState {
            status: WalletStatus::Connected,
            account: Some("0xabc".into()),
            chain_id: Some(42),
            last_error: None,
        },
        "connected  0xabc  on unsupported chain 42"
    )]
    #[case::error(
        WalletSessionState {
            status: WalletStatus::Error,
            account: None,
            chain_id: None,
            last_error: Some("user rejected".into()),
        },
        "error  (user rejected)"
    )]
    fn test_wallet_line(#[case] state: WalletSessionState, #[case] expected: &str) {
        assert_eq!(wallet_line(&state), expected);
    }

    #[test]
    fn test_network_lines_mark_default() {
        let lines = network_lines(11_155_111);
        assert_eq!(lines.len(), 5);
        let marked: Vec<_> = lines.iter().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("Sepolia"));
    }

    #[rstest]
    #[case::short("n", Some(ListKey::Next))]
    #[case::long(" prev ", Some(ListKey::Prev))]
    #[case::refresh("r", Some(ListKey::Refresh))]
    #[case::quit("quit", Some(ListKey::Quit))]
    #[case::unknown("x", None)]
    #[case::empty("", None)]
    fn test_list_key_parse(#[case] line: &str, #[case] expected: Option<ListKey>) {
        assert_eq!(ListKey::parse(line), expected);
    }

    #[test]
    fn test_page_footer() {
        let snapshot = ListSnapshot::<Block> {
            records: Vec::new(),
            status: ListStatus::Ready,
            page_index: 2,
            page: crate::domain::Page {
                limit: 15,
                offset: 30,
            },
            has_next_page: false,
        };
        assert_eq!(page_footer(&snapshot), "page 2 (0 records)");
    }

    #[test]
    fn test_full_block_lines() {
        let block: RpcFullBlock =
            serde_json::from_value(JsonMother::rpc_full_block(16, Vec::new())).unwrap();
        insta::assert_snapshot!(full_block_lines(&block).join("\n"), @r"
        Block:        #16
        Hash:         0x6e1b3cbb1ad0b7a5e7fa3dd2cf6b9c1e4f0b24ac5ba37a9f6c77d3d8c1e2f3a4
        Time:         Tue, 14 Nov 2023 22:13:20
        Gas:          15,000,000 / 30,000,000 (50.0%)
        Miner:        0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5
        Transactions: 0
        ");
    }

    #[rstest]
    #[case::confirmed(true, Some(true), "success, gas 21,000")]
    #[case::reverted(true, Some(false), "failed, gas 21,000")]
    #[case::pending(false, None, "pending")]
    fn test_rpc_transaction_row(
        #[case] mined: bool,
        #[case] success: Option<bool>,
        #[case] outcome: &str,
    ) {
        let hash = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
        let tx: RpcTransaction = serde_json::from_value(JsonMother::rpc_transaction(
            hash,
            "0xabc0000000000000000000000000000000000001",
            "0xdef0000000000000000000000000000000000002",
            "0x6f05b59d3b20000",
        ))
        .unwrap();
        let receipt: Option<RpcReceipt> = success
            .filter(|_| mined)
            .map(|ok| serde_json::from_value(JsonMother::receipt(hash, ok)).unwrap());

        assert_eq!(
            rpc_transaction_row(&tx, receipt.as_ref(), "ETH"),
            format!(
                "0x88df0164...a713944b  0xabc0...0001 -> 0xdef0...0002  0.500000 ETH  20.00 gwei  {outcome}"
            )
        );
    }

    #[test]
    fn test_profile_line() {
        let profile = InstructorProfile {
            name: "Ada".into(),
            age: U256::from(36),
        };
        assert_eq!(
            profile_line("Instructor #7", &profile),
            "Instructor #7: Ada (age 36)"
        );
    }
}
