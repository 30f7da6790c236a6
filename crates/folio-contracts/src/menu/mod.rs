mod command_registry;
mod intent_parser;
mod selector;

pub use command_registry::MENU_HELP_COMMANDS;
pub use intent_parser::{parse_menu_input, resolve_choice, MenuIntent};
pub use selector::{menu_lines, ConsoleSelector, Selector};
