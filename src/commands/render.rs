use crate::commands::Out;
use crate::page::Page;
use crate::{Config, Result};

/// Renders the configured snapshot. The HTML is the structure of the output.
pub async fn render(config: &Config) -> Result<Out<String>> {
    let page = Page::load(config).await?;
    let html = page.to_html();
    Ok(Out::new(
        format!("Rendered {} transactions", page.store().len()),
        html,
    ))
}
