use std::path::Path;

use anyhow::Result;
use folio_contracts::console::{Block, ConsoleExt};
use folio_contracts::projects::RenderContext;

use crate::charts::{ascii_scatter, histogram_chart, scatter_chart};
use crate::data::DataTable;
use crate::stats::histogram;

use super::{file_stem, publish_chart, Project};

const NAMESPACE: &str = Project::MultiPageDashboard.slug();
const DATA_KEY: &str = "data";
const PAGES: [&str; 3] = ["Upload & View Data", "Statistical Analysis", "Interactive Charts"];
const NO_DATA: &str = "No data available. Please upload a CSV on the first page.";

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.subheader("Navigation")?;
    match ctx.console.selectbox("Select a Page", &PAGES, 0)? {
        Some(1) => statistics_page(ctx),
        Some(2) => charts_page(ctx),
        _ => upload_page(ctx),
    }
}

fn stored_table(ctx: &RenderContext<'_>) -> Option<DataTable> {
    ctx.session.get_as(NAMESPACE, DATA_KEY)
}

fn upload_page(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Upload and View Data")?;

    let path = ctx.console.text_input("Upload your CSV file (path)", "")?;
    let table = if !path.is_empty() {
        match DataTable::from_csv_path(Path::new(&path)) {
            Ok(table) => {
                ctx.session.set_as(NAMESPACE, DATA_KEY, &table)?;
                ctx.console.success("Data successfully uploaded!")?;
                table
            }
            Err(err) => {
                return ctx
                    .console
                    .error(&format!("Could not read the CSV file: {err:#}"))
            }
        }
    } else if let Some(table) = stored_table(ctx) {
        ctx.console.info("Using previously uploaded data.")?;
        table
    } else {
        return ctx.console.warning("No file uploaded yet.");
    };

    ctx.console.subheader("Data Preview")?;
    ctx.console.table(table.head(5))
}

fn statistics_page(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Statistical Analysis")?;
    let Some(table) = stored_table(ctx) else {
        return ctx.console.warning(NO_DATA);
    };

    ctx.console.subheader("Data Summary")?;
    ctx.console.table(table.describe())?;

    let numeric = table.numeric_columns();
    let Some(choice) = ctx
        .console
        .selectbox("Select a column for distribution plot", &numeric, 0)?
    else {
        return Ok(());
    };
    let column = &numeric[choice];
    let bins = histogram(&table.numbers(column), 30);
    publish_chart(
        ctx,
        NAMESPACE,
        &format!("{}_distribution.png", file_stem(column)),
        &format!("Distribution of {column}"),
        |path| histogram_chart(path, &bins),
    )
}

fn charts_page(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Interactive Charts")?;
    let Some(table) = stored_table(ctx) else {
        return ctx.console.warning(NO_DATA);
    };

    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return ctx
            .console
            .warning("The dataset must contain at least two numeric columns for visualization.");
    }
    let x = ctx.console.selectbox("Select X-axis", &numeric, 0)?.unwrap_or(0);
    let y = ctx.console.selectbox("Select Y-axis", &numeric, 1)?.unwrap_or(1);
    let (x_axis, y_axis) = (&numeric[x], &numeric[y]);

    let points = table.number_pairs(x_axis, y_axis);
    ctx.console
        .show(Block::Preformatted(ascii_scatter(&points, 60, 20)))?;
    publish_chart(
        ctx,
        NAMESPACE,
        &format!("{}_vs_{}.png", file_stem(x_axis), file_stem(y_axis)),
        &format!("{x_axis} vs {y_axis}"),
        |path| scatter_chart(path, &points, None),
    )
}

#[cfg(test)]
mod tests {
    use crate::projects::harness::Harness;
    use crate::projects::Project;

    const SALES: &str = "region,units,revenue\nNorth,3,30.5\nSouth,5,41\nEast,2,18\n";

    #[test]
    fn first_page_without_upload_warns() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::MultiPageDashboard, "\n\n")?;
        assert!(out.contains("[warning] No file uploaded yet."));
        Ok(())
    }

    #[test]
    fn later_pages_need_data() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        for page in ["2\n", "Interactive Charts\n"] {
            let out = harness.render(Project::MultiPageDashboard, page)?;
            assert!(out.contains(
                "[warning] No data available. Please upload a CSV on the first page."
            ));
        }
        Ok(())
    }

    #[test]
    fn upload_is_shared_across_pages() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let csv = harness.write_file("sales.csv", SALES)?;

        let out = harness.render(Project::MultiPageDashboard, &format!("1\n{}\n", csv.display()))?;
        assert!(out.contains("[ok] Data successfully uploaded!"));
        assert!(out.contains("South"));

        let out = harness.render(Project::MultiPageDashboard, "1\n\n")?;
        assert!(out.contains("[info] Using previously uploaded data."));

        let out = harness.render(Project::MultiPageDashboard, "2\nrevenue\n")?;
        assert!(out.contains("Data Summary"));
        assert!(out.contains("count | 3     | 3"));
        assert!(harness
            .chart_path(Project::MultiPageDashboard, "revenue_distribution.png")
            .exists());

        let out = harness.render(Project::MultiPageDashboard, "3\n\n\n")?;
        assert!(out.contains("[chart] units vs revenue"));
        assert!(harness
            .chart_path(Project::MultiPageDashboard, "units_vs_revenue.png")
            .exists());
        Ok(())
    }

    #[test]
    fn charts_need_two_numeric_columns() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let csv = harness.write_file("one.csv", "name,score\nA,1\nB,2\n")?;
        harness.render(Project::MultiPageDashboard, &format!("1\n{}\n", csv.display()))?;
        let out = harness.render(Project::MultiPageDashboard, "3\n")?;
        assert!(out.contains(
            "[warning] The dataset must contain at least two numeric columns for visualization."
        ));
        Ok(())
    }
}
