//! Unit tests for the timeline engine's public API.

mod record_tests;
