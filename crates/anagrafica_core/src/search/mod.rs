//! Person search for list views.

pub mod filter;
