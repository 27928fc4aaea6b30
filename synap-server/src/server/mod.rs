pub mod auth_handlers;
pub mod handlers;
pub mod mcp_handlers;
pub mod mcp_server;
pub mod mcp_tools;
pub mod metrics_handler;
pub mod rate_limit;
pub mod router;
pub mod umicp;

pub use handlers::AppState;
pub use mcp_handlers::handle_mcp_tool;
pub use mcp_server::SynapMcpService;
pub use mcp_tools::get_mcp_tools;
pub use metrics_handler::init_metrics;
pub use router::create_router;
