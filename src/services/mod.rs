pub mod store;
pub mod memory;
pub mod site_api;
pub mod notifier;

pub use store::{PaymentLedger, PromptStore, RedisStore};
pub use memory::MemoryStore;
pub use site_api::{SiteApi, UserDirectory};
pub use notifier::{HttpNotifier, LogNotifier, Notification, Notifier};
