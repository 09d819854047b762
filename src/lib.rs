//! Content backend for a public information portal.
//!
//! News articles, gallery photos, information pages and department contacts
//! are kept in SQLite ([`storage::Database`]) and exposed as named procedures
//! over HTTP ([`rpc::RpcServer`]).

pub mod config;
pub mod error;
pub mod model;
pub mod rpc;
pub mod storage;
