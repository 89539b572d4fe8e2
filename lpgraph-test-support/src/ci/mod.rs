//! Knobs CI uses to tune test suites without code changes.

pub mod property_test_profile;
