use std::path::Path;

use anyhow::Result;
use folio_contracts::console::ConsoleExt;
use folio_contracts::projects::RenderContext;

use crate::charts::histogram_chart;
use crate::data::DataTable;
use crate::stats::{histogram, mean, median, std_dev};

use super::{file_stem, publish_chart, Project};

const NAMESPACE: &str = Project::AnalysisDashboard.slug();
const HISTOGRAM_BINS: usize = 30;

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Data Analysis Dashboard")?;

    let last_path: String = ctx.session.get_as(NAMESPACE, "csv_path").unwrap_or_default();
    let csv_path = ctx.console.text_input("Upload a CSV file (path)", &last_path)?;
    if csv_path.is_empty() {
        return ctx
            .console
            .info("Please upload a CSV file to start the analysis.");
    }

    let table = match DataTable::from_csv_path(Path::new(&csv_path)) {
        Ok(table) => table,
        Err(err) => return ctx.console.error(&format!("Could not read the CSV file: {err:#}")),
    };
    ctx.session.set_as(NAMESPACE, "csv_path", &csv_path)?;

    ctx.console.subheader("Data Preview")?;
    ctx.console.table(table.head(5))?;

    let numeric = table.numeric_columns();
    let Some(choice) = ctx
        .console
        .selectbox("Select a numeric column", &numeric, 0)?
    else {
        return ctx
            .console
            .warning("The file does not contain numeric columns.");
    };
    let column = &numeric[choice];
    let values = table.numbers(column);

    ctx.console.metric("Mean", &format!("{:.2}", mean(&values)))?;
    ctx.console.metric("Median", &format!("{:.2}", median(&values)))?;
    ctx.console
        .metric("Standard Deviation", &format!("{:.2}", std_dev(&values)))?;

    let bins = histogram(&values, HISTOGRAM_BINS);
    publish_chart(
        ctx,
        NAMESPACE,
        &format!("{}_histogram.png", file_stem(column)),
        &format!("Distribution of {column}"),
        |path| histogram_chart(path, &bins),
    )
}

#[cfg(test)]
mod tests {
    use crate::projects::harness::Harness;
    use crate::projects::Project;

    #[test]
    fn no_upload_prompts_for_one() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::AnalysisDashboard, "\n")?;
        assert!(out.contains("[info] Please upload a CSV file to start the analysis."));
        Ok(())
    }

    #[test]
    fn numeric_column_statistics_and_histogram() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let csv = harness.write_file("scores.csv", "name,score,age\nA,10,30\nB,20,40\nC,60,50\n")?;
        let input = format!("{}\nscore\n", csv.display());
        let out = harness.render(Project::AnalysisDashboard, &input)?;

        assert!(out.contains("Data Preview"));
        assert!(out.contains("Mean: 30.00"));
        assert!(out.contains("Median: 20.00"));
        assert!(out.contains("Standard Deviation: 26.46"));
        assert!(out.contains("[chart] Distribution of score"));
        assert!(harness
            .chart_path(Project::AnalysisDashboard, "score_histogram.png")
            .exists());
        Ok(())
    }

    #[test]
    fn remembers_last_path() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let csv = harness.write_file("scores.csv", "score\n1\n2\n")?;
        harness.render(Project::AnalysisDashboard, &format!("{}\n\n", csv.display()))?;
        // Blank path now falls back to the remembered file.
        let out = harness.render(Project::AnalysisDashboard, "\n\n")?;
        assert!(out.contains("Mean: 1.50"));
        Ok(())
    }

    #[test]
    fn text_only_file_warns() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let csv = harness.write_file("names.csv", "name\nAda\nGrace\n")?;
        let out = harness.render(Project::AnalysisDashboard, &format!("{}\n", csv.display()))?;
        assert!(out.contains("[warning] The file does not contain numeric columns."));
        Ok(())
    }

    #[test]
    fn unreadable_path_is_reported() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::AnalysisDashboard, "/no/such/file.csv\n")?;
        assert!(out.contains("[error] Could not read the CSV file"));
        Ok(())
    }
}
