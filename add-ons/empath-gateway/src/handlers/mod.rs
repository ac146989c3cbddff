//! HTTP handlers for the gateway.

pub(crate) mod support;
