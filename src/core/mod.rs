//! Core business logic - framework-agnostic bill listing and bill creation.

/// Bills listing, display formatting and ordering
pub mod bills;
/// Date and status humanization
pub mod format;
/// Typed form access and bill assembly
pub mod form;
/// Receipt upload and bill submission
pub mod new_bill;

pub use bills::{BillLister, BillView, BillsScreen, SortOrder};
pub use new_bill::{BillCreator, SubmitPhase};
