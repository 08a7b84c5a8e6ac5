mod session;

pub use session::{ConsoleMode, ConsoleOutput, ConsoleSession};
