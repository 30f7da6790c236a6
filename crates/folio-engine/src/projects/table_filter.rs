use anyhow::Result;
use folio_contracts::console::ConsoleExt;
use folio_contracts::projects::RenderContext;

use crate::data::{Cell, DataTable};

use super::load_data_file;

const DATA_FILE: &str = "example_data.csv";
const REQUIRED_COLUMNS: [&str; 4] = ["City", "Category", "Price", "Quantity"];

#[derive(Debug, Clone, PartialEq)]
pub struct TableFilters {
    pub cities: Vec<String>,
    pub categories: Vec<String>,
    pub price: (f64, f64),
    pub quantity: (f64, f64),
}

/// Keeps rows matching every filter; ranges are inclusive and rows missing a
/// price or quantity never match.
pub fn apply_filters(table: &DataTable, filters: &TableFilters) -> DataTable {
    let within = |cell: Option<&Cell>, (low, high): (f64, f64)| {
        cell.and_then(Cell::as_number)
            .is_some_and(|value| low <= value && value <= high)
    };
    let listed = |cell: Option<&Cell>, allowed: &[String]| {
        cell.is_some_and(|cell| allowed.contains(&cell.display()))
    };
    table.filter(|t, row| {
        listed(t.value(row, "City"), &filters.cities)
            && listed(t.value(row, "Category"), &filters.categories)
            && within(t.value(row, "Price"), filters.price)
            && within(t.value(row, "Quantity"), filters.quantity)
    })
}

fn integer_span(values: &[f64]) -> (f64, f64) {
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if low.is_finite() {
        (low.floor(), high.ceil())
    } else {
        (0.0, 0.0)
    }
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Dynamic Table Filter")?;

    let Some(table) = load_data_file(ctx, DATA_FILE, "CSV file not found in the 'data' folder.")?
    else {
        return Ok(());
    };
    if !table.has_columns(&REQUIRED_COLUMNS) {
        return ctx.console.error(
            "The CSV file must contain the columns: City, Category, Price and Quantity.",
        );
    }
    if table.is_empty() {
        return Ok(());
    }

    ctx.console.subheader("Filters")?;
    let cities = table.unique("City");
    let all_cities: Vec<usize> = (0..cities.len()).collect();
    let picked = ctx.console.multiselect("Select City", &cities, &all_cities)?;
    let cities: Vec<String> = picked.into_iter().map(|idx| cities[idx].clone()).collect();

    let categories = table.unique("Category");
    let all_categories: Vec<usize> = (0..categories.len()).collect();
    let picked = ctx
        .console
        .multiselect("Select Category", &categories, &all_categories)?;
    let categories: Vec<String> = picked
        .into_iter()
        .map(|idx| categories[idx].clone())
        .collect();

    let (price_low, price_high) = integer_span(&table.numbers("Price"));
    let price = ctx.console.range_slider(
        "Select Price Range",
        price_low,
        price_high,
        (price_low, price_high),
    )?;
    let (quantity_low, quantity_high) = integer_span(&table.numbers("Quantity"));
    let quantity = ctx.console.range_slider(
        "Select Quantity Range",
        quantity_low,
        quantity_high,
        (quantity_low, quantity_high),
    )?;

    let filtered = apply_filters(
        &table,
        &TableFilters {
            cities,
            categories,
            price,
            quantity,
        },
    );

    ctx.console.subheader("Filtered Data")?;
    ctx.console.table(filtered.view(None))?;

    ctx.console.subheader("Summary Statistics")?;
    ctx.console.table(filtered.describe())
}

#[cfg(test)]
mod tests {
    use crate::data::DataTable;
    use crate::projects::harness::Harness;
    use crate::projects::Project;

    use super::{apply_filters, TableFilters};

    const SALES: &str = "City,Category,Price,Quantity\n\
        Lisbon,Books,12.5,3\n\
        Porto,Games,40.9,1\n\
        Lisbon,Games,25,8\n\
        Faro,Books,30,\n";

    #[test]
    fn filters_combine_with_and() -> anyhow::Result<()> {
        let table = DataTable::from_csv_reader(SALES.as_bytes())?;
        let filters = TableFilters {
            cities: vec!["Lisbon".to_string(), "Faro".to_string()],
            categories: vec!["Books".to_string(), "Games".to_string()],
            price: (10.0, 30.0),
            quantity: (0.0, 10.0),
        };
        let filtered = apply_filters(&table, &filters);
        // Faro has no quantity, Porto is excluded by city.
        assert_eq!(filtered.unique("City"), vec!["Lisbon"]);
        assert_eq!(filtered.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::DynamicTableFilter, "")?;
        assert!(out.contains("[error] CSV file not found in the 'data' folder."));
        Ok(())
    }

    #[test]
    fn missing_columns_are_reported() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data("example_data.csv", "City,Price\nLisbon,3\n")?;
        let out = harness.render(Project::DynamicTableFilter, "")?;
        assert!(out.contains("must contain the columns: City, Category, Price and Quantity"));
        Ok(())
    }

    #[test]
    fn defaults_keep_every_complete_row() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data("example_data.csv", SALES)?;
        let out = harness.render(Project::DynamicTableFilter, "")?;

        // Price span widens to whole numbers so 40.9 stays inside 12..41.
        assert!(out.contains("Select Price Range (low..high within 12..41) [12..41]"));
        assert!(out.contains("Porto"));
        assert!(out.contains("Summary Statistics"));
        assert!(out.contains("count | 3"));
        Ok(())
    }

    #[test]
    fn scripted_filters_narrow_the_table() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data("example_data.csv", SALES)?;
        let out = harness.render(Project::DynamicTableFilter, "Lisbon\nGames\n\n\n")?;

        let filtered = out
            .split("Filtered Data")
            .nth(1)
            .and_then(|tail| tail.split("Summary Statistics").next())
            .unwrap_or_default();
        assert!(filtered.contains("Lisbon | Games"));
        assert!(!filtered.contains("Books"));
        assert!(!filtered.contains("Porto"));
        Ok(())
    }
}
