pub mod frame;
pub mod prompt;
pub mod response;
pub mod payment;

pub use frame::*;
pub use prompt::*;
pub use response::*;
pub use payment::*;
