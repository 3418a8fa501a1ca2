//! Test suites for the command daemon.

mod support;
