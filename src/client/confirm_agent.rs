use anyhow::{Context, Result};
use debbie::{
    client::{
        confirm::{gate, ChainReceipts, CREATE_PROMPT_PATH},
        ConfirmOutcome, ConfirmationController, PageView, PromptSubmitter,
    },
    config::Config,
    services::{HttpNotifier, LogNotifier, Notifier, SiteApi},
};
use ethers::types::U256;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // Prompt text comes from the first argument, as the page reads it from the query string.
    let prompt = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PROMPT").ok());
    let private_key = std::env::var("WALLET_PRIVATE_KEY").ok();
    let fee_wei = U256::from_dec_str(
        &std::env::var("PROMPT_FEE_WEI").unwrap_or_else(|_| "0".to_string()),
    )
    .context("Invalid PROMPT_FEE_WEI")?;

    println!("Confirm Prompt");
    println!("==============");
    println!("Site: {}", config.public_url);
    println!();

    let submitter = match (&prompt, private_key) {
        (Some(_), Some(key)) => Some(
            PromptSubmitter::new(
                &config.base_rpc_url,
                &key,
                config.require_contract_address()?,
                fee_wei,
            )
            .await?,
        ),
        _ => None,
    };

    let view = gate(
        prompt.as_deref(),
        submitter.as_ref().map(PromptSubmitter::wallet_status),
        config.base_chain_id,
    );

    let (prompt, submitter) = match (view, submitter) {
        (PageView::RedirectToCreate, _) => {
            println!("No prompt given. Create one at {}{}", config.public_url, CREATE_PROMPT_PATH);
            return Ok(());
        }
        (PageView::ConnectWallet, _) | (_, None) => {
            println!("[ERROR] Connect a wallet: set WALLET_PRIVATE_KEY");
            return Ok(());
        }
        (PageView::WrongNetwork { expected, actual }, _) => {
            println!("[ERROR] Please switch to Base network (chain {}, wallet is on {})", expected, actual);
            return Ok(());
        }
        (PageView::Ready { prompt }, Some(submitter)) => (prompt, submitter),
    };

    println!("NEVER HAVE I EVER... {}", prompt);
    println!("No take-backs or changes after confirmation.");
    println!();

    let receipt = submitter.submit(&prompt).await?;
    println!("   [OK] Transaction confirmed: {:?}", receipt.transaction_hash);

    let site = Arc::new(SiteApi::new(&config.api_base_url)?);
    let notifier: Arc<dyn Notifier> = match (&config.notification_url, &config.notification_token) {
        (Some(url), Some(token)) => Arc::new(HttpNotifier::new(url.clone(), token.clone())),
        _ => Arc::new(LogNotifier),
    };

    let controller = ConfirmationController::new(
        config.require_contract_address()?,
        &config.public_url,
        Arc::new(ChainReceipts::new(submitter.client())),
        site.clone(),
        site,
        notifier,
    );

    let author = submitter.wallet_status().address;
    match controller
        .handle_confirmed(receipt.transaction_hash, author, &prompt)
        .await
    {
        ConfirmOutcome::Navigate(path) => {
            println!("[SUCCESS] Prompt posted: {}{}", config.public_url, path);
        }
        outcome => {
            let debug = controller
                .debug_message(receipt.transaction_hash)
                .await
                .unwrap_or_default();
            println!("[FAILED] {:?}", outcome);
            println!("Debug: {}", debug);
        }
    }

    Ok(())
}
