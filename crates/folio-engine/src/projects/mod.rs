use std::path::Path;

use anyhow::Result;
use folio_contracts::console::ConsoleExt;
use folio_contracts::projects::{ProjectRegistry, RenderContext, Routine};

use crate::data::DataTable;

mod analysis_dashboard;
mod form_validation;
mod home;
mod interactive_map;
mod investment_simulator;
mod multi_page_dashboard;
mod recommendation;
mod salary_prediction;
mod table_filter;
mod text_analysis;
mod weather;

pub use investment_simulator::compound_interest_daily;
pub use recommendation::get_recommendations;
pub use salary_prediction::train_or_load_model;
pub use table_filter::{apply_filters, TableFilters};
pub use text_analysis::{process_text, TextStats};
pub use weather::{parse_weather_response, WeatherClient, WeatherReport};

/// Every portfolio project, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Project {
    Home,
    AnalysisDashboard,
    DynamicTableFilter,
    InvestmentSimulator,
    InteractiveMap,
    FormValidation,
    TextAnalysis,
    Recommendation,
    SalaryPrediction,
    MultiPageDashboard,
    Weather,
}

impl Project {
    pub const ALL: [Project; 11] = [
        Project::Home,
        Project::AnalysisDashboard,
        Project::DynamicTableFilter,
        Project::InvestmentSimulator,
        Project::InteractiveMap,
        Project::FormValidation,
        Project::TextAnalysis,
        Project::Recommendation,
        Project::SalaryPrediction,
        Project::MultiPageDashboard,
        Project::Weather,
    ];

    pub const fn display_name(self) -> &'static str {
        match self {
            Project::Home => "Home",
            Project::AnalysisDashboard => "Analysis Dashboard",
            Project::DynamicTableFilter => "Dynamic Table Filter",
            Project::InvestmentSimulator => "Investment Simulator",
            Project::InteractiveMap => "Interactive Map",
            Project::FormValidation => "Form Validation",
            Project::TextAnalysis => "Real Time Text Analysis",
            Project::Recommendation => "Simple Recommendation",
            Project::SalaryPrediction => "ML Prediction App",
            Project::MultiPageDashboard => "Multi Page Dashboard",
            Project::Weather => "Weather App",
        }
    }

    /// Session namespace and chart directory name.
    pub const fn slug(self) -> &'static str {
        match self {
            Project::Home => "home",
            Project::AnalysisDashboard => "analysis_dashboard",
            Project::DynamicTableFilter => "dynamic_table_filter",
            Project::InvestmentSimulator => "investment_simulator",
            Project::InteractiveMap => "interactive_map",
            Project::FormValidation => "form_validation",
            Project::TextAnalysis => "text_analysis",
            Project::Recommendation => "simple_recommendation",
            Project::SalaryPrediction => "ml_prediction",
            Project::MultiPageDashboard => "multi_page_dashboard",
            Project::Weather => "weather_app",
        }
    }
}

impl Routine for Project {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<()> {
        match self {
            Project::Home => home::show(ctx),
            Project::AnalysisDashboard => analysis_dashboard::show(ctx),
            Project::DynamicTableFilter => table_filter::show(ctx),
            Project::InvestmentSimulator => investment_simulator::show(ctx),
            Project::InteractiveMap => interactive_map::show(ctx),
            Project::FormValidation => form_validation::show(ctx),
            Project::TextAnalysis => text_analysis::show(ctx),
            Project::Recommendation => recommendation::show(ctx),
            Project::SalaryPrediction => salary_prediction::show(ctx),
            Project::MultiPageDashboard => multi_page_dashboard::show(ctx),
            Project::Weather => weather::show(ctx),
        }
    }
}

pub fn default_registry() -> ProjectRegistry<Project> {
    Project::ALL
        .into_iter()
        .map(|project| (project.display_name(), project))
        .collect()
}

/// Draws a chart file under the project's chart directory and announces it.
/// A chart that cannot be written is reported as a warning.
fn publish_chart<F>(
    ctx: &mut RenderContext<'_>,
    slug: &str,
    file_name: &str,
    caption: &str,
    draw: F,
) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let path = ctx.settings.chart_dir(slug).join(file_name);
    match draw(&path) {
        Ok(()) => ctx.console.chart(caption, path),
        Err(err) => ctx
            .console
            .warning(&format!("Chart could not be written: {err:#}")),
    }
}

/// `Future Salary ($)` -> `future_salary`
fn file_stem(label: &str) -> String {
    let mut stem = String::new();
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            stem.push(ch.to_ascii_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let trimmed = stem.trim_matches('_');
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reads a CSV from the data directory, reporting a missing or broken file
/// on the console.
fn load_data_file(
    ctx: &mut RenderContext<'_>,
    file_name: &str,
    missing_message: &str,
) -> Result<Option<DataTable>> {
    let path = ctx.settings.data_file(file_name);
    if !path.exists() {
        ctx.console.error(missing_message)?;
        return Ok(None);
    }
    match DataTable::from_csv_path(&path) {
        Ok(table) => Ok(Some(table)),
        Err(err) => {
            ctx.console
                .error(&format!("Could not read '{file_name}': {err:#}"))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
pub(crate) mod harness {
    use std::path::PathBuf;

    use folio_contracts::config::Settings;
    use folio_contracts::console::TextConsole;
    use folio_contracts::projects::{RenderContext, Routine};
    use folio_contracts::session::SessionState;
    use tempfile::TempDir;

    use super::Project;

    /// Temporary data/out directories plus a session that survives renders.
    pub struct Harness {
        pub temp: TempDir,
        pub settings: Settings,
        pub session: SessionState,
    }

    impl Harness {
        pub fn new() -> anyhow::Result<Self> {
            let temp = tempfile::tempdir()?;
            let settings = Settings::new(temp.path().join("data"), temp.path().join("out"));
            std::fs::create_dir_all(&settings.data_dir)?;
            Ok(Self {
                temp,
                settings,
                session: SessionState::new(),
            })
        }

        pub fn write_data(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
            let path = self.settings.data_file(name);
            std::fs::write(&path, contents)?;
            Ok(path)
        }

        pub fn write_file(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
            let path = self.temp.path().join(name);
            std::fs::write(&path, contents)?;
            Ok(path)
        }

        /// Renders once against scripted input and returns the transcript.
        pub fn render(&mut self, project: Project, input: &str) -> anyhow::Result<String> {
            let mut console = TextConsole::scripted(input);
            {
                let mut ctx = RenderContext::new(&mut console, &mut self.session, &self.settings);
                project.render(&mut ctx)?;
            }
            Ok(console.transcript())
        }

        pub fn chart_path(&self, project: Project, file_name: &str) -> PathBuf {
            self.settings.chart_dir(project.slug()).join(file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{default_registry, file_stem, harness::Harness, Project};

    #[test]
    fn registry_lists_projects_in_menu_order() {
        let registry = default_registry();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![
                "Home",
                "Analysis Dashboard",
                "Dynamic Table Filter",
                "Investment Simulator",
                "Interactive Map",
                "Form Validation",
                "Real Time Text Analysis",
                "Simple Recommendation",
                "ML Prediction App",
                "Multi Page Dashboard",
                "Weather App",
            ]
        );
        for project in Project::ALL {
            assert_eq!(registry.get(project.display_name()), Some(&project));
        }
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<&str> = Project::ALL.iter().map(|project| project.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), Project::ALL.len());
    }

    #[test]
    fn file_stems_are_filesystem_safe() {
        assert_eq!(file_stem("Future Salary ($)"), "future_salary");
        assert_eq!(file_stem("Sci-Fi"), "sci_fi");
        assert_eq!(file_stem("%%"), "chart");
    }

    #[test]
    fn home_renders_welcome() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::Home, "")?;
        assert!(out.contains("My Project Portfolio"));
        assert!(out.contains("Welcome to my portfolio!"));
        Ok(())
    }
}
