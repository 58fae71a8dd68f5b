pub mod app;
pub mod history;
pub mod plain;
pub mod views;
pub mod widgets;
