pub mod frame;
pub mod health;
pub mod payments;
pub mod prompts;

pub use frame::*;
pub use health::*;
pub use payments::*;
pub use prompts::*;
