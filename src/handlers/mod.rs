pub mod console;

pub use console::{run_console, spawn_stdin_reader, ConsolePresenter};
