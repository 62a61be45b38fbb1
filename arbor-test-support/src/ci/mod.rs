//! Environment-driven knobs shared by property suites in CI and locally.

pub mod property_test_profile;
