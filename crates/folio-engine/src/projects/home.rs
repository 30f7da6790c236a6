use anyhow::Result;
use folio_contracts::console::ConsoleExt;
use folio_contracts::projects::RenderContext;

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("My Project Portfolio")?;
    ctx.console.markdown(
        "Welcome to my portfolio! Here you will find various small data projects.\n\
         Use the menu to navigate between the projects.",
    )
}
