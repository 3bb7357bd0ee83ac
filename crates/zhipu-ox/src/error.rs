//! Error type for the Zhipu client.
//!
//! Every failure surfaces as the shared [`CommonRequestError`]; the alias keeps
//! call sites provider-specific.

pub use zhipu_ox_common::CommonRequestError;

/// Error returned by every [`crate::Zhipu`] call.
pub type ZhipuRequestError = CommonRequestError;
