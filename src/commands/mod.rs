pub mod app_command;
pub mod ui_command;

pub use app_command::{AppCommand, Consumer};
pub use ui_command::{ThemeArg, UiCommand};
