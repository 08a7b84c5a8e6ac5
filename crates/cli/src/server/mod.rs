pub mod console;
pub mod dns;

pub use console::run_console;
pub use dns::start_dns_server;
