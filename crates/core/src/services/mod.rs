pub mod calendar_service;
pub mod ledger_service;
pub mod snapshot_service;
pub mod twr_service;
