use anyhow::Result;
use folio_contracts::console::{format_thousands, ConsoleExt, TableView};
use folio_contracts::projects::RenderContext;

use crate::charts::line_chart;

use super::{publish_chart, Project};

const NAMESPACE: &str = Project::InvestmentSimulator.slug();
const DAYS_PER_YEAR: u32 = 365;

/// Value of `principal` at each day from 0 to `years * 365`, compounding
/// `rate` (a fraction, `0.05` for 5%) daily.
pub fn compound_interest_daily(principal: f64, rate: f64, years: u32) -> Vec<f64> {
    let daily_rate = rate / f64::from(DAYS_PER_YEAR);
    (0..=years * DAYS_PER_YEAR)
        .map(|day| principal * (1.0 + daily_rate).powf(f64::from(day)))
        .collect()
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Investment Growth Simulator")?;

    let principal = ctx
        .console
        .number_input("Initial Investment Amount ($)", 100.0, 1e9, 1000.0)?;
    let rate_percent = ctx
        .console
        .slider("Annual Interest Rate (%)", 1.0, 20.0, 5.0)?;
    let periods: Vec<String> = (1..=30).map(|year| year.to_string()).collect();
    let years = ctx
        .console
        .selectbox("Investment Period (Years)", &periods, 4)?
        .map_or(5, |idx| idx as u32 + 1);

    let growth = compound_interest_daily(principal, rate_percent / 100.0, years);

    ctx.console.subheader("Investment Growth Over Time (Daily)")?;
    publish_chart(
        ctx,
        NAMESPACE,
        "daily_growth.png",
        "Daily Investment Growth Projection",
        |path| line_chart(path, &growth),
    )?;

    let mut yearly = TableView::new(&["Year", "Investment Value"]);
    for year in 0..=years {
        let day = (year * DAYS_PER_YEAR) as usize;
        if let Some(value) = growth.get(day) {
            yearly.push_row(vec![year.to_string(), format!("${}", format_thousands(*value))]);
        }
    }
    ctx.console.table(yearly)?;

    let final_value = growth.last().copied().unwrap_or(principal);
    ctx.console.subheader("Final Investment Value")?;
    ctx.console.write(&format!(
        "After {years} years, your investment will be worth ${}.",
        format_thousands(final_value)
    ))
}
