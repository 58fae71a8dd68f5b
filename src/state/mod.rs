pub mod clock;
pub mod session;
pub mod table;

pub use clock::*;
pub use session::*;
pub use table::*;
