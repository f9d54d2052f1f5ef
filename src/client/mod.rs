pub mod confirm;
pub mod prompt_tx;

pub use confirm::{ConfirmOutcome, ConfirmationController, PageView};
pub use prompt_tx::{PromptSubmitter, WalletStatus};
