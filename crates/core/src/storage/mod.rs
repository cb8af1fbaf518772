pub mod autosave;
pub mod file;
pub mod format;
pub mod repository;
