pub mod confessions;

pub use confessions::*;
