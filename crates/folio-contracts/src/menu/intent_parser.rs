use super::command_registry::{CommandAction, CommandSpec, MENU_COMMANDS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuIntent {
    Noop,
    Help,
    List,
    Quit,
    /// Clear one project's session values, or all of them.
    Reset(Option<String>),
    Select(String),
    UnknownCommand(String),
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<CommandAction> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_name_arg(arg: &str) -> String {
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect::<Vec<String>>()
            .join(" "),
        Err(_) => arg.split_whitespace().collect::<Vec<&str>>().join(" "),
    }
}

/// Maps a typed choice onto a menu name.
///
/// A 1-based index within range selects that name; any other text is kept
/// verbatim so an unknown name still reaches the dispatcher.
pub fn resolve_choice(text: &str, names: &[&str]) -> String {
    let trimmed = text.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        if let Some(name) = index.checked_sub(1).and_then(|idx| names.get(idx)) {
            return (*name).to_string();
        }
    }
    trimmed.to_string()
}

pub fn parse_menu_input(text: &str, names: &[&str]) -> MenuIntent {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return MenuIntent::Noop;
    }

    let Some(slash_tail) = trimmed.strip_prefix('/') else {
        return MenuIntent::Select(resolve_choice(trimmed, names));
    };

    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    match find_action(&command, MENU_COMMANDS) {
        Some(CommandAction::Help) => MenuIntent::Help,
        Some(CommandAction::List) => MenuIntent::List,
        Some(CommandAction::Quit) => MenuIntent::Quit,
        Some(CommandAction::Reset) => {
            let target = parse_name_arg(arg);
            if target.is_empty() {
                MenuIntent::Reset(None)
            } else {
                MenuIntent::Reset(Some(resolve_choice(&target, names)))
            }
        }
        None => MenuIntent::UnknownCommand(trimmed.to_string()),
    }
}
