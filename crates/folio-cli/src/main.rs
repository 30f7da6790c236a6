use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use folio_contracts::config::Settings;
use folio_contracts::console::{Block, Console, ConsoleExt, TextConsole};
use folio_contracts::events::{EventWriter, SessionEvent};
use folio_contracts::menu::{
    menu_lines, parse_menu_input, resolve_choice, ConsoleSelector, MenuIntent, Selector,
    MENU_HELP_COMMANDS,
};
use folio_contracts::projects::{dispatch, Dispatched, ProjectRegistry, RenderContext};
use folio_contracts::session::SessionState;
use folio_engine::{default_registry, Project};

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Terminal portfolio of small data projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive project menu.
    Menu(SessionArgs),
    /// Print the project names in menu order.
    List,
    /// Render one project and exit.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    events: Option<PathBuf>,
    /// Keep session values in this JSON file between runs.
    #[arg(long)]
    session: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    name: Option<String>,
    #[command(flatten)]
    session: SessionArgs,
}

/// State owned by the host for the length of one process.
struct Host {
    registry: ProjectRegistry<Project>,
    settings: Settings,
    session: SessionState,
    events: EventWriter,
}

impl Host {
    fn from_args(args: SessionArgs) -> Self {
        let settings = Settings::from_env(args.data, args.out);
        let events_path = args.events.unwrap_or_else(|| settings.events_path());
        let session = match args.session {
            Some(path) => SessionState::load(path),
            None => SessionState::new(),
        };
        Self {
            registry: default_registry(),
            settings,
            session,
            events: EventWriter::for_new_session(events_path),
        }
    }

    fn names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    fn start(&self, mode: &str) -> Result<()> {
        self.events.emit(&SessionEvent::SessionStarted {
            mode: mode.to_string(),
            project_count: self.registry.len(),
            data_dir: self.settings.data_dir.display().to_string(),
            out_dir: self.settings.out_dir.display().to_string(),
            session_path: self.session.path().map(|path| path.display().to_string()),
        })?;
        Ok(())
    }

    fn finish(&mut self, renders: usize) -> Result<()> {
        self.session.flush()?;
        self.events.emit(&SessionEvent::SessionFinished { renders })?;
        Ok(())
    }

    /// Dispatches one selection, reporting failures on the console.
    /// Returns whether a project rendered.
    fn select(&mut self, console: &mut dyn Console, name: Option<&str>) -> Result<bool> {
        if let Some(name) = name.filter(|name| !name.trim().is_empty()) {
            self.events.emit(&SessionEvent::ProjectSelected {
                project: name.to_string(),
            })?;
        }
        let outcome = {
            let mut ctx = RenderContext::new(&mut *console, &mut self.session, &self.settings);
            dispatch(name, &self.registry, &mut ctx)
        };
        match outcome {
            Ok(Dispatched::Idle) => Ok(false),
            Ok(Dispatched::Rendered(project)) => {
                self.events
                    .emit(&SessionEvent::ProjectRendered { project })?;
                Ok(true)
            }
            Err(err) => {
                err.report(console)?;
                self.events.emit(&SessionEvent::DispatchFailed {
                    project: err.name().to_string(),
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                })?;
                Ok(false)
            }
        }
    }

    fn reset(&mut self, console: &mut dyn Console, target: Option<String>) -> Result<()> {
        let Some(name) = target else {
            self.session.clear_all();
            self.events.emit(&SessionEvent::SessionReset {
                project: None,
                cleared: true,
            })?;
            return console.info("Cleared session values for every project.");
        };
        let Some(project) = self.registry.get(&name).copied() else {
            return console.error(&format!("Project not found: {name}"));
        };
        let cleared = self.session.clear(project.slug());
        self.events.emit(&SessionEvent::SessionReset {
            project: Some(name.clone()),
            cleared,
        })?;
        if cleared {
            console.info(&format!("Cleared session values for {name}."))
        } else {
            console.info(&format!("{name} has no session values."))
        }
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("folio error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Menu(args) => {
            let mut host = Host::from_args(args);
            let mut console = TextConsole::new(io::stdin().lock(), io::stdout());
            run_menu(&mut host, &mut console)?;
            Ok(0)
        }
        Command::List => {
            for name in default_registry().names() {
                println!("{name}");
            }
            Ok(0)
        }
        Command::Show(args) => {
            let mut host = Host::from_args(args.session);
            let mut console = TextConsole::new(io::stdin().lock(), io::stdout());
            run_show(&mut host, &mut console, args.name)
        }
    }
}

fn run_menu(host: &mut Host, console: &mut dyn Console) -> Result<usize> {
    host.start("menu")?;
    console.write("Folio started. Type /help for commands.")?;
    console.show(Block::Preformatted(menu_lines(&host.names())))?;

    let mut renders = 0usize;
    loop {
        let Some(line) = console.read_line("> ")? else {
            break;
        };
        let intent = parse_menu_input(&line, &host.names());
        match intent {
            MenuIntent::Noop => {}
            MenuIntent::Help => {
                console.write(&format!("Commands: {}", MENU_HELP_COMMANDS.join(" ")))?;
                console.write("Pick a project by number or by name.")?;
            }
            MenuIntent::List => {
                console.show(Block::Preformatted(menu_lines(&host.names())))?;
            }
            MenuIntent::Quit => break,
            MenuIntent::Reset(target) => host.reset(console, target)?,
            MenuIntent::Select(name) => {
                if host.select(console, Some(&name))? {
                    renders += 1;
                }
            }
            MenuIntent::UnknownCommand(command) => {
                console.warning(&format!("Unknown command: {command}. Type /help for commands."))?;
            }
        }
    }

    host.finish(renders)?;
    Ok(renders)
}

/// Renders `name`, or the selector's pick when no name is given.
/// Exit code 1 when the project could not be dispatched.
fn run_show(host: &mut Host, console: &mut dyn Console, name: Option<String>) -> Result<i32> {
    host.start("show")?;
    let selected = match name {
        Some(name) => Some(resolve_choice(&name, &host.names())),
        None => ConsoleSelector::new(&mut *console, "Choose a project").choose(&host.names())?,
    };
    let Some(selected) = selected.filter(|name| !name.is_empty()) else {
        host.finish(0)?;
        return Ok(0);
    };

    let rendered = host.select(console, Some(&selected))?;
    host.finish(usize::from(rendered))?;
    Ok(if rendered { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use folio_contracts::config::Settings;
    use folio_contracts::console::TextConsole;
    use folio_contracts::events::EventWriter;
    use folio_contracts::session::SessionState;
    use folio_engine::default_registry;
    use serde_json::Value;

    use super::{run_menu, run_show, Host};

    fn host_in(root: &Path, session: SessionState) -> Host {
        let settings = Settings::new(root.join("data"), root.join("out"));
        let events = EventWriter::new(settings.events_path(), "test-session");
        Host {
            registry: default_registry(),
            settings,
            session,
            events,
        }
    }

    fn event_types(host: &Host) -> anyhow::Result<Vec<String>> {
        let content = fs::read_to_string(host.events.path())?;
        content
            .lines()
            .map(|line| -> anyhow::Result<String> {
                let event: Value = serde_json::from_str(line)?;
                Ok(event["type"].as_str().unwrap_or_default().to_string())
            })
            .collect()
    }

    #[test]
    fn menu_renders_by_index_and_name_then_quits() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = host_in(temp.path(), SessionState::new());
        let mut console = TextConsole::scripted("\n1\nhome\nHome\n/quit\n2\n");

        let renders = run_menu(&mut host, &mut console)?;
        assert_eq!(renders, 2);

        let transcript = console.transcript();
        assert!(transcript.contains("  1. Home"));
        assert!(transcript.contains(" 11. Weather App"));
        assert_eq!(transcript.matches("My Project Portfolio").count(), 2);
        // Names are matched exactly, so lower-case "home" is not a project.
        assert!(transcript.contains("[error] Project not found: home"));
        assert!(!transcript.contains("Data Analysis Dashboard"));

        assert_eq!(
            event_types(&host)?,
            vec![
                "session_started",
                "project_selected",
                "project_rendered",
                "project_selected",
                "dispatch_failed",
                "project_selected",
                "project_rendered",
                "session_finished",
            ]
        );
        Ok(())
    }

    #[test]
    fn menu_commands_help_list_and_unknown() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = host_in(temp.path(), SessionState::new());
        let mut console = TextConsole::scripted("/help\n/list\n/dance\n");

        assert_eq!(run_menu(&mut host, &mut console)?, 0);
        let transcript = console.transcript();
        assert!(transcript.contains("Commands: /help /list /reset [project] /quit"));
        assert_eq!(transcript.matches("  5. Interactive Map").count(), 2);
        assert!(transcript.contains("[warning] Unknown command: /dance."));
        Ok(())
    }

    #[test]
    fn reset_clears_project_namespace_and_persists() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let session_path = temp.path().join("session.json");
        let mut session = SessionState::load(&session_path);
        session.set_as("form_validation", "name", &"Ada")?;
        session.set_as("analysis_dashboard", "csv_path", &"scores.csv")?;
        let mut host = host_in(temp.path(), session);
        let mut console = TextConsole::scripted("/reset \"Form Validation\"\n/reset Nowhere\n");

        run_menu(&mut host, &mut console)?;
        let transcript = console.transcript();
        assert!(transcript.contains("[info] Cleared session values for Form Validation."));
        assert!(transcript.contains("[error] Project not found: Nowhere"));

        let reloaded = SessionState::load(&session_path);
        assert!(!reloaded.contains("form_validation", "name"));
        assert!(reloaded.contains("analysis_dashboard", "csv_path"));
        Ok(())
    }

    #[test]
    fn reset_without_name_clears_everything() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut session = SessionState::new();
        session.set_as("form_validation", "name", &"Ada")?;
        let mut host = host_in(temp.path(), session);
        let mut console = TextConsole::scripted("/reset\n");

        run_menu(&mut host, &mut console)?;
        assert_eq!(host.session.namespaces().count(), 0);
        assert!(event_types(&host)?.contains(&"session_reset".to_string()));
        Ok(())
    }

    #[test]
    fn show_named_project_exits_zero() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = host_in(temp.path(), SessionState::new());
        let mut console = TextConsole::scripted("");

        assert_eq!(run_show(&mut host, &mut console, Some("Home".to_string()))?, 0);
        assert!(console.transcript().contains("My Project Portfolio"));
        Ok(())
    }

    #[test]
    fn show_unknown_project_exits_one() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = host_in(temp.path(), SessionState::new());
        let mut console = TextConsole::scripted("");

        assert_eq!(run_show(&mut host, &mut console, Some("Blog".to_string()))?, 1);
        assert!(console.transcript().contains("[error] Project not found: Blog"));
        Ok(())
    }

    #[test]
    fn show_without_name_uses_the_selector() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = host_in(temp.path(), SessionState::new());
        let mut console = TextConsole::scripted("1\n");
        assert_eq!(run_show(&mut host, &mut console, None)?, 0);
        assert!(console.transcript().contains("Choose a project: "));
        assert!(console.transcript().contains("My Project Portfolio"));

        // No pick at all is not an error.
        let mut console = TextConsole::scripted("");
        assert_eq!(run_show(&mut host, &mut console, None)?, 0);
        Ok(())
    }
}
