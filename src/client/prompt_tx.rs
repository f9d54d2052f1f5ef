use crate::contracts::ConfessionsContract;
use anyhow::{Context, Result};
use ethers::{
    prelude::*,
    providers::{Http, Provider},
    types::{Address, TransactionReceipt, U256},
};
use std::sync::Arc;

pub type WalletClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Wallet connection as seen by the confirmation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletStatus {
    pub address: Address,
    pub chain_id: u64,
}

/// Sends `createPrompt` transactions from a local wallet.
pub struct PromptSubmitter {
    client: Arc<WalletClient>,
    contract_address: Address,
    fee_wei: U256,
}

impl PromptSubmitter {
    pub async fn new(
        rpc_url: &str,
        private_key: &str,
        contract_address: Address,
        fee_wei: U256,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;

        // Sign for whatever network the RPC reports; the caller checks it.
        let chain_id = provider.get_chainid().await?.as_u64();
        let wallet = private_key
            .parse::<LocalWallet>()?
            .with_chain_id(chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        Ok(Self {
            client,
            contract_address,
            fee_wei,
        })
    }

    pub fn client(&self) -> Arc<WalletClient> {
        self.client.clone()
    }

    pub fn wallet_status(&self) -> WalletStatus {
        WalletStatus {
            address: self.client.address(),
            chain_id: self.client.signer().chain_id(),
        }
    }

    /// Submits the prompt and waits until the transaction is mined.
    pub async fn submit(&self, prompt: &str) -> Result<TransactionReceipt> {
        let contract = ConfessionsContract::new(self.contract_address, self.client.clone());

        tracing::info!(
            "Submitting prompt to {:?} from {:?}",
            self.contract_address,
            self.client.address()
        );

        let call = contract
            .create_prompt(prompt.to_string())
            .value(self.fee_wei);
        let pending_tx = call.send().await.context("Failed to send createPrompt")?;

        tracing::info!("Transaction sent: {:?}, waiting for confirmation...", *pending_tx);

        let receipt = pending_tx
            .await
            .context("Failed to get transaction receipt")?
            .ok_or_else(|| anyhow::anyhow!("Transaction dropped"))?;

        if receipt.status != Some(1.into()) {
            anyhow::bail!("Transaction failed onchain");
        }

        tracing::info!("Prompt transaction confirmed: {:?}", receipt.transaction_hash);

        Ok(receipt)
    }
}
