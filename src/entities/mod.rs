//! Entity module - Records exchanged with the store and the session.
//! Each entity exposes a `Model` struct; the re-exports below give them readable names.

pub mod bill;
pub mod user;

pub use bill::{BillStatus, DEFAULT_PCT, ExpenseType, Model as Bill};
pub use user::{Model as User, UserType};
