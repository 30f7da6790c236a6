#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommandAction {
    Help,
    List,
    Quit,
    Reset,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: CommandAction,
}

pub(crate) const MENU_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: CommandAction::Help,
    },
    CommandSpec {
        command: "list",
        action: CommandAction::List,
    },
    CommandSpec {
        command: "quit",
        action: CommandAction::Quit,
    },
    CommandSpec {
        command: "exit",
        action: CommandAction::Quit,
    },
    CommandSpec {
        command: "reset",
        action: CommandAction::Reset,
    },
];

pub const MENU_HELP_COMMANDS: &[&str] = &["/help", "/list", "/reset [project]", "/quit"];
