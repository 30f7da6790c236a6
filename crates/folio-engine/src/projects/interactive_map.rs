use anyhow::Result;
use folio_contracts::console::{Block, ConsoleExt};
use folio_contracts::projects::RenderContext;

use crate::charts::{ascii_scatter, scatter_chart};

use super::{file_stem, load_data_file, publish_chart, Project};

const NAMESPACE: &str = Project::InteractiveMap.slug();
const DATA_FILE: &str = "geographic_data.csv";
const MAP_COLUMNS: usize = 60;
const MAP_ROWS: usize = 20;

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Interactive Map with Geographic Data")?;

    let Some(table) = load_data_file(ctx, DATA_FILE, "CSV file not found in the 'data' folder.")?
    else {
        return Ok(());
    };
    if !table.has_columns(&["latitude", "longitude", "category"]) {
        return ctx.console.error(
            "The CSV file must contain the columns: latitude, longitude and category.",
        );
    }
    if table.is_empty() {
        return Ok(());
    }

    ctx.console.subheader("Filters")?;
    let categories = table.unique("category");
    let Some(choice) = ctx.console.selectbox("Select Category", &categories, 0)? else {
        return Ok(());
    };
    let category = &categories[choice];

    let filtered = table.filter(|t, row| {
        t.value(row, "category")
            .is_some_and(|cell| cell.display() == *category)
    });
    ctx.console.subheader(&format!(
        "Displaying {} points for category: {category}",
        filtered.len()
    ))?;

    // x is longitude so north stays up.
    let points: Vec<(f64, f64)> = filtered
        .number_pairs("latitude", "longitude")
        .into_iter()
        .map(|(lat, lon)| (lon, lat))
        .collect();
    ctx.console
        .show(Block::Preformatted(ascii_scatter(&points, MAP_COLUMNS, MAP_ROWS)))?;
    ctx.console
        .table(filtered.select(&["latitude", "longitude"]).view(None))?;

    publish_chart(
        ctx,
        NAMESPACE,
        &format!("{}_map.png", file_stem(category)),
        &format!("Points for {category}"),
        |path| scatter_chart(path, &points, None),
    )
}
