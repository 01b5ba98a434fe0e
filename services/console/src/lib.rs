pub mod adapters;
pub mod config;
pub mod console;
pub mod error;
pub mod stub;
pub mod views;

pub use console::{Console, OverviewCard, Services};
pub use error::ConsoleError;
