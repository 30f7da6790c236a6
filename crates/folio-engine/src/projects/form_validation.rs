use anyhow::Result;
use folio_contracts::console::{format_plain, ConsoleExt};
use folio_contracts::projects::RenderContext;

use super::Project;

const NAMESPACE: &str = Project::FormValidation.slug();
const COLORS: [&str; 6] = ["Red", "Green", "Blue", "Yellow", "Black", "White"];
const ACTIONS: [&str; 2] = ["Submit", "Reset"];

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Form with Validation")?;

    let saved_name: String = ctx.session.get_as(NAMESPACE, "name").unwrap_or_default();
    let saved_age: f64 = ctx.session.get_as(NAMESPACE, "age").unwrap_or(0.0);
    let saved_colors: Vec<String> = ctx.session.get_as(NAMESPACE, "colors").unwrap_or_default();
    let default_colors: Vec<usize> = saved_colors
        .iter()
        .filter_map(|saved| COLORS.iter().position(|color| color == saved))
        .collect();

    let name = ctx.console.text_input("Name", &saved_name)?;
    let age = ctx.console.number_input("Age", 0.0, 120.0, saved_age)?.trunc();
    let colors: Vec<String> = ctx
        .console
        .multiselect("Favorite Colors", &COLORS, &default_colors)?
        .into_iter()
        .map(|idx| COLORS[idx].to_string())
        .collect();

    match ctx.console.selectbox("Action", &ACTIONS, 0)? {
        Some(1) => {
            ctx.session.set_as(NAMESPACE, "name", &"")?;
            ctx.session.set_as(NAMESPACE, "age", &0)?;
            ctx.session.set_as(NAMESPACE, "colors", &Vec::<String>::new())?;
            ctx.console.info("Form reset.")
        }
        _ if name.is_empty() => ctx.console.error("Name is required."),
        _ => {
            ctx.session.set_as(NAMESPACE, "name", &name)?;
            ctx.session.set_as(NAMESPACE, "age", &age)?;
            ctx.session.set_as(NAMESPACE, "colors", &colors)?;
            ctx.console.success(&format!(
                "Hello, {name}, you are {} years old and like {}!",
                format_plain(age),
                colors.join(", ")
            ))
        }
    }
}
