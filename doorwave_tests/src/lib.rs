//! Integration test crate. See `tests/`.
