pub mod dataset;
pub mod export;
pub mod services;
pub mod source;

pub use services::{ServiceError, ServiceResult};

/// Test utilities for unit and integration testing.
/// Only available with cfg(test) or feature "testing".
#[cfg(any(test, feature = "testing"))]
pub mod testing;
