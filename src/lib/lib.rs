//! A small server-rendered todo list.
//!
//! [`storage::TodoStore`] is the document collection, [`core::TodoService`]
//! turns raw request values into store calls, and [`adapters::http`] maps the
//! routes onto the service and the [`adapters::Views`] renderer.

pub mod adapters;
pub mod config;
pub mod core;
pub mod storage;
