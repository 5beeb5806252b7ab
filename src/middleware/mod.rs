// Middleware module - request logging and connection limits

pub mod header_limit;
pub mod request_logger;

pub use header_limit::enforce_header_limit;
pub use request_logger::request_logger_middleware;
