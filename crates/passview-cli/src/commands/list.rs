use passview_core::compute_visibility;

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::errors::CliError;
use crate::ui::tree::{render_rows, visible_rows};
use crate::ui::{header, hint, print};

pub async fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context(args.json);
    let loader = ctx.load().await?;
    let export = loader
        .export()
        .ok_or_else(|| CliError::load_failed("Export was not loaded"))?;

    let query = args.query.as_deref().unwrap_or("");
    let visibility = compute_visibility(export.tree(), query);
    let rows = visible_rows(export.tree(), &visibility, args.expand);

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if !ctx.quiet {
        let context = visibility.is_filtered().then_some(query);
        print(&ui, &header(&ui, "list", context));
    }
    if rows.is_empty() {
        if !ctx.quiet && visibility.is_filtered() {
            print(&ui, &hint(&ui, &format!("No entries match \"{}\".", query)));
        }
        return Ok(());
    }
    for line in render_rows(&ui, &rows) {
        println!("{}", line);
    }
    Ok(())
}
