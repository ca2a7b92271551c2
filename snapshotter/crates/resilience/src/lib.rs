//! Retry policies for calls against external storage services.
//!
//! A [`RetryPolicy`] is a plain value: callers own one per upload path and hand it the
//! operation to run. Whether a failure is worth another attempt is decided by the error
//! type itself through [`Retryable`].

mod retry;

pub use retry::{RetryError, RetryPolicy, Retryable};
