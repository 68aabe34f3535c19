//! Test suites for the client facade.

mod behaviour;
mod support;
