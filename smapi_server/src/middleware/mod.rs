mod hmac;

pub use hmac::{HmacAuthMiddlewareFactory, HmacAuthMiddlewareService};
