//! Rising Academy portal: services and the headless shell around the
//! `navigator` page state machine.

pub mod config;
pub mod services;
pub mod shell;
