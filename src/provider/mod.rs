//! Principal source implementations.

pub mod http;
