pub mod api;
mod config;
mod controller;
mod error;
mod filter;
mod grouping;
pub mod model;
mod summary;
mod utils;

pub use config::Config;
pub use controller::{CategoryTicket, TransactionTicket, TransactionsController};
pub use error::Error;
pub use error::Result;
pub use filter::{CategoryFilter, FilterState, KindFilter, SortDirection, SortField};
pub use grouping::{group_transactions, GroupedSection, Grouping};
pub use summary::Summary;
