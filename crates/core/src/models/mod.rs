pub mod calendar;
pub mod client;
pub mod ledger;
pub mod movement;
pub mod settings;
pub mod snapshot;
pub mod twr;
