pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

/// Install the stderr log subscriber. Stdout is reserved for command output.
pub fn init() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
}
