//! HTTP transport with proxy fallback.
//!
//! Remote services are first called directly. When the request fails at the
//! transport level the same request is retried through each configured proxy
//! prefix in rotation order.

mod proxy;

pub use proxy::*;
