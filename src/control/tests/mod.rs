//! Control Plane Tests
//!
//! Scenario tests for the facade against a scripted plugin manager.
