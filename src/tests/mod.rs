//! End-to-end tests: a mock catalog server, real argument parsing, the full
//! pipeline and the rendered report.
