//! Wire and domain models shared across the workspace: commerce-side
//! resources and update actions, gateway-side request/response types,
//! money conversion and the error taxonomy.

pub mod braintree;
pub mod errors;
pub mod types;
pub mod update_actions;
pub mod utils;

/// Result type carrying an `error_stack` report, the signature every
/// mapping step and gateway call in this workspace returns.
pub type CustomResult<T, E> = Result<T, error_stack::Report<E>>;
