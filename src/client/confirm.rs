//! Post-confirmation handling for prompt-creation transactions.
//!
//! Once the wallet reports a confirmed transaction, the controller fetches the
//! receipt, recovers the prompt id from the `PromptCreated` event, resolves the
//! author's FID, persists the prompt and notifies the user. Each transaction
//! hash is handled at most once.

use crate::{
    client::prompt_tx::WalletStatus,
    contracts::{decode_prompt_created, find_prompt_created},
    models::NewPrompt,
    services::{Notification, Notifier, PromptStore, UserDirectory},
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use ethers::{
    providers::Middleware,
    types::{Address, TransactionReceipt, H256},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CREATE_PROMPT_PATH: &str = "/create-prompt";

/// What the confirmation page offers before any transaction is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    RedirectToCreate,
    ConnectWallet,
    WrongNetwork { expected: u64, actual: u64 },
    Ready { prompt: String },
}

pub fn gate(prompt: Option<&str>, wallet: Option<WalletStatus>, expected_chain: u64) -> PageView {
    let Some(prompt) = prompt.map(str::trim).filter(|p| !p.is_empty()) else {
        return PageView::RedirectToCreate;
    };

    match wallet {
        None => PageView::ConnectWallet,
        Some(w) if w.chain_id != expected_chain => PageView::WrongNetwork {
            expected: expected_chain,
            actual: w.chain_id,
        },
        Some(_) => PageView::Ready {
            prompt: prompt.to_string(),
        },
    }
}

pub fn prompt_path(prompt_id: &str) -> String {
    format!("/prompts/{}", prompt_id)
}

#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceipt>>;
}

/// Reads receipts through any ethers middleware stack.
pub struct ChainReceipts<M> {
    provider: Arc<M>,
}

impl<M> ChainReceipts<M> {
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ReceiptSource for ChainReceipts<M> {
    async fn receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| anyhow!("RPC error: {}", e))?;
        Ok(receipt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Handling,
    Completed { prompt_id: String },
    EventMissing,
    Failed { error: String },
}

/// Per-hash state machine: unseen, handling, then exactly one terminal state.
#[derive(Debug, Default)]
pub struct ConfirmationTracker {
    states: HashMap<H256, ConfirmationState>,
    messages: HashMap<H256, String>,
}

impl ConfirmationTracker {
    /// Claims `tx_hash` for handling. False if it was ever seen before.
    pub fn begin(&mut self, tx_hash: H256) -> bool {
        if self.states.contains_key(&tx_hash) {
            return false;
        }
        self.states.insert(tx_hash, ConfirmationState::Handling);
        true
    }

    pub fn finish(&mut self, tx_hash: H256, state: ConfirmationState) {
        match self.states.get(&tx_hash) {
            Some(ConfirmationState::Handling) => {
                self.states.insert(tx_hash, state);
            }
            other => tracing::warn!("Ignoring transition for {:?} from {:?}", tx_hash, other),
        }
    }

    pub fn state(&self, tx_hash: &H256) -> Option<&ConfirmationState> {
        self.states.get(tx_hash)
    }

    pub fn set_message(&mut self, tx_hash: H256, message: String) {
        self.messages.insert(tx_hash, message);
    }

    pub fn message(&self, tx_hash: &H256) -> Option<&str> {
        self.messages.get(tx_hash).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Prompt stored; go to its page.
    Navigate(String),
    EventNotFound,
    AlreadyHandled,
    Failed(String),
}

pub struct ConfirmationController {
    contract_address: Address,
    public_url: String,
    receipts: Arc<dyn ReceiptSource>,
    users: Arc<dyn UserDirectory>,
    prompts: Arc<dyn PromptStore>,
    notifier: Arc<dyn Notifier>,
    tracker: Mutex<ConfirmationTracker>,
}

impl ConfirmationController {
    pub fn new(
        contract_address: Address,
        public_url: &str,
        receipts: Arc<dyn ReceiptSource>,
        users: Arc<dyn UserDirectory>,
        prompts: Arc<dyn PromptStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            contract_address,
            public_url: public_url.trim_end_matches('/').to_string(),
            receipts,
            users,
            prompts,
            notifier,
            tracker: Mutex::new(ConfirmationTracker::default()),
        }
    }

    pub async fn state(&self, tx_hash: H256) -> Option<ConfirmationState> {
        self.tracker.lock().await.state(&tx_hash).cloned()
    }

    pub async fn debug_message(&self, tx_hash: H256) -> Option<String> {
        self.tracker.lock().await.message(&tx_hash).map(String::from)
    }

    pub async fn handle_confirmed(&self, tx_hash: H256, author: Address, prompt: &str) -> ConfirmOutcome {
        if !self.tracker.lock().await.begin(tx_hash) {
            tracing::debug!("Confirmation for {:?} already handled", tx_hash);
            return ConfirmOutcome::AlreadyHandled;
        }

        let (state, outcome) = match self.persist_from_receipt(tx_hash, author, prompt).await {
            Ok(Some(prompt_id)) => (
                ConfirmationState::Completed {
                    prompt_id: prompt_id.clone(),
                },
                ConfirmOutcome::Navigate(prompt_path(&prompt_id)),
            ),
            Ok(None) => (ConfirmationState::EventMissing, ConfirmOutcome::EventNotFound),
            Err(e) => {
                let message = e.to_string();
                self.debug(tx_hash, format!("Error: {}", message)).await;
                tracing::error!("Error handling confirmed prompt {:?}: {:?}", tx_hash, e);

                let failure = Notification::new("Error", "Failed to store prompt. Please try again.");
                if let Err(notify_err) = self.notifier.send(&failure).await {
                    tracing::warn!("Failure notification not delivered: {}", notify_err);
                }

                (
                    ConfirmationState::Failed {
                        error: message.clone(),
                    },
                    ConfirmOutcome::Failed(message),
                )
            }
        };

        self.tracker.lock().await.finish(tx_hash, state);
        outcome
    }

    async fn persist_from_receipt(
        &self,
        tx_hash: H256,
        author: Address,
        prompt: &str,
    ) -> Result<Option<String>> {
        self.debug(tx_hash, "Fetching transaction receipt...").await;
        let receipt = self
            .receipts
            .receipt(tx_hash)
            .await?
            .ok_or_else(|| anyhow!("Transaction receipt not found"))?;

        let Some(log) = find_prompt_created(&receipt, self.contract_address) else {
            self.debug(tx_hash, "PromptCreated event not found in logs.").await;
            return Ok(None);
        };

        self.debug(tx_hash, "Found log. Attempting to decode...").await;
        let event = decode_prompt_created(log).context("Failed to decode event args")?;
        let prompt_id = event.prompt_id.to_string();
        self.debug(tx_hash, format!("Prompt ID decoded: {}", prompt_id)).await;

        let fid = self.users.fid_for_wallet(author).await?;
        self.debug(tx_hash, format!("FID fetched: {}", fid)).await;

        let record = NewPrompt::new(&prompt_id, prompt, fid, Utc::now().timestamp_millis());
        self.prompts.create_prompt(&record).await?;
        self.debug(tx_hash, "Prompt saved. Redirecting...").await;

        let posted = Notification::new(
            "Prompt Submitted!",
            "Your \"Never Have I Ever\" prompt has been posted.",
        )
        .with_target(format!("{}{}", self.public_url, prompt_path(&prompt_id)));
        self.notifier.send(&posted).await?;

        Ok(Some(prompt_id))
    }

    async fn debug(&self, tx_hash: H256, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(tx = ?tx_hash, "{}", message);
        self.tracker.lock().await.set_message(tx_hash, message);
    }
}
