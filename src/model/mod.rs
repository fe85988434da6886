//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::Amount;
pub use category::{categories_of_kind, default_selection, kind_is_full, Category, MAX_PER_KIND};
pub use transaction::{CategoryRef, EmbeddedCategory, Transaction, TransactionKind};
