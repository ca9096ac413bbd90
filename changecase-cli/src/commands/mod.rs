// ABOUTME: Command handlers, one module per subcommand
// ABOUTME: Each handler is a free function taking the client and its parsed inputs

pub mod check;
pub mod close;
pub mod create;
pub mod scheduled_build;
pub mod update;
