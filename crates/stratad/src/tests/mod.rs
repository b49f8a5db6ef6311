//! Test suites for the node bootstrap.

mod support;
