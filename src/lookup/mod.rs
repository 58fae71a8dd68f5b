pub mod dns;
pub mod select;

pub use dns::*;
