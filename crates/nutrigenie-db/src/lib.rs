pub mod history_store;
pub mod migrations;

pub use history_store::{HistoryStore, SearchRecord};
