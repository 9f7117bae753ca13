//! Ready-made effects for common side effects.
//!
//! Each constructor returns an inert [`Effect`](crate::Effect); nothing starts
//! until the loop runs it.

mod http;
mod timer;

pub use http::{http_get, try_http_get, HttpGetOptions, HttpGetResult};
pub use timer::{interval, timeout};
