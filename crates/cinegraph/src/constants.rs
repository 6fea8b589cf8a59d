//! Centralized constants shared with client implementations.

use std::time::Duration;

/// Default timeout for a whole HTTP request against a knowledge base.
pub const DEFAULT_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default TCP connect timeout.
pub const DEFAULT_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle timeout for pooled HTTP connections.
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Default TCP keepalive interval for pooled connections.
pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(60);
