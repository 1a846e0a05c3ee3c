//! Scenario-based tests for ci-snapshot

mod helpers;

mod conversion_properties;
mod failure_handling;
mod host_boundary;
mod schema_versions;
