//! Domain layer - business logic with no infrastructure dependencies.

pub mod account;
pub mod catalog;
pub mod foundation;
pub mod purchase;
