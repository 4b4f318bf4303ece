/// Middleware module
///
/// Access gate integration and request logging.

mod authorize;
mod gate_middleware;
mod logger;

pub use authorize::{authorize, Authorized};
pub use gate_middleware::GateMiddleware;
pub use logger::LoggerMiddleware;
