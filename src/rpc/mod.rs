//! HTTP transport for the content procedures.

mod errors;
mod routes;
mod server;

pub use errors::{ErrorBody, ErrorResponse, RpcError, RpcResult};
pub use routes::{rpc_routes, HealthStatus, RpcData, RpcQuery, RpcResponse};
pub use server::RpcServer;
