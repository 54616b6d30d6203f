//! Tests for the artifact download orchestrator.

mod resolution;
mod validation;
