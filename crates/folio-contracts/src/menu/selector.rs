use crate::console::{Block, Console};

use super::intent_parser::resolve_choice;

pub trait Selector {
    /// Offers `names` in order and returns the pick, or `None` when no
    /// choice was made.
    fn choose(&mut self, names: &[&str]) -> anyhow::Result<Option<String>>;
}

/// Numbered menu on a [`Console`].
pub struct ConsoleSelector<'c> {
    console: &'c mut dyn Console,
    prompt: String,
}

impl<'c> ConsoleSelector<'c> {
    pub fn new(console: &'c mut dyn Console, prompt: impl Into<String>) -> Self {
        Self {
            console,
            prompt: prompt.into(),
        }
    }
}

impl Selector for ConsoleSelector<'_> {
    fn choose(&mut self, names: &[&str]) -> anyhow::Result<Option<String>> {
        self.console.show(Block::Preformatted(menu_lines(names)))?;
        let answer = self.console.read_line(&format!("{}: ", self.prompt))?;
        Ok(answer
            .filter(|line| !line.trim().is_empty())
            .map(|line| resolve_choice(&line, names)))
    }
}

pub fn menu_lines(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| format!("{:>3}. {name}", idx + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::console::TextConsole;

    use super::{ConsoleSelector, Selector};

    const NAMES: &[&str] = &["Home", "Dashboard"];

    #[test]
    fn presents_names_in_order() -> anyhow::Result<()> {
        let mut console = TextConsole::scripted("2\n");
        let choice = ConsoleSelector::new(&mut console, "Choose a project").choose(NAMES)?;
        assert_eq!(choice.as_deref(), Some("Dashboard"));

        let transcript = console.transcript();
        let home = transcript.find("  1. Home").unwrap_or(usize::MAX);
        let dashboard = transcript.find("  2. Dashboard").unwrap_or(0);
        assert!(home < dashboard);
        assert!(transcript.contains("Choose a project: "));
        Ok(())
    }

    #[test]
    fn blank_or_closed_input_means_no_choice() -> anyhow::Result<()> {
        let mut console = TextConsole::scripted("\n");
        let mut selector = ConsoleSelector::new(&mut console, "Choose a project");
        assert_eq!(selector.choose(NAMES)?, None);
        assert_eq!(selector.choose(NAMES)?, None);
        Ok(())
    }

    #[test]
    fn typed_name_is_returned_verbatim() -> anyhow::Result<()> {
        let mut console = TextConsole::scripted("Unknown\n");
        let choice = ConsoleSelector::new(&mut console, "Choose a project").choose(NAMES)?;
        assert_eq!(choice.as_deref(), Some("Unknown"));
        Ok(())
    }
}
