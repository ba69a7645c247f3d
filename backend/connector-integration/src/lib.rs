//! Reconciliation engine between a commercetools-style commerce backend
//! and a Braintree-style payment gateway.
//!
//! One extension event comes in as an [`types::ExtensionInput`]
//! (`domain_types`), every pending `<op>Request` custom field on the
//! resource is mapped to a gateway call, and everything flows back out as
//! one idempotent batch of update actions. Per-operation failures are
//! normalized into the batch; only structurally broken input escapes as
//! an error.
//!
//! [`types::ExtensionInput`]: domain_types::types::ExtensionInput

pub mod actions;
pub mod configs;
pub mod customers;
pub mod dispatch;
pub mod operations;
pub mod payments;
pub mod selector;

#[cfg(test)]
pub(crate) mod mocks;

pub use configs::GatewayConfig;
pub use dispatch::process_extension_request;
