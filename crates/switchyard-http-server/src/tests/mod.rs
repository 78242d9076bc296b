//! Test modules for switchyard-http-server crate
//!
//! Handler and routing suites drive the router directly with in-memory bodies.

pub mod json_rpc_tests;
pub mod uri_tests;
