//! Use-case services built on the repository contract.

pub mod registry_service;
