pub mod catalog;
pub mod dispense;
pub mod gui;
pub mod logging;
pub mod notify;
pub mod pad;
pub mod recognition;
pub mod search;
pub mod settings;
pub mod toast_log;
