pub mod socket;
pub mod tcp;

pub use tcp::*;
