pub mod help;
pub mod main;
pub mod port;

pub use help::HelpView;
pub use main::MainView;
pub use port::PortDetailView;
