//! Shared test support

pub mod fixtures;

pub use fixtures::{request, signup, test_app, test_app_with, StubBilling, TestApp};
