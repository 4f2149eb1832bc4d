//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! - [`http`]: JSON API, health probes and session handling.
//! - [`ssr`]: the streamed HTML document shell for browser navigation.

pub mod http;
pub mod ssr;
