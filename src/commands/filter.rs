use crate::args::FilterArgs;
use crate::commands::Out;
use crate::filter::FilterOutcome;
use crate::page::Page;
use crate::{Config, Result};

/// Applies the filter described by `args` to the rendered page and reports what stays visible.
pub async fn filter(config: &Config, args: &FilterArgs) -> Result<Out<FilterOutcome>> {
    let mut page = Page::load(config).await?;
    let criterion = args.criterion();
    let outcome = page.apply_filter(&criterion)?;
    let message = match &outcome.title {
        Some(title) => format!("{title}: {}", outcome.visible.join(" ")),
        None => outcome.visible.join(" "),
    };
    Ok(Out::new(message, outcome))
}
