use crate::args::AnnotateArgs;
use crate::commands::Out;
use crate::model::{Dimension, TransactionRecord};
use crate::page::Page;
use crate::submit::{submitter, Mode, Submitter};
use crate::{Config, Result};

/// Opens the editor on a transaction, applies the edits in `args`, submits them and returns the
/// accepted record.
pub async fn annotate(
    config: &Config,
    mode: Mode,
    args: &AnnotateArgs,
) -> Result<Out<TransactionRecord>> {
    let client = submitter(config, mode)?;
    let mut page = Page::load(config).await?;
    annotate_page(&mut page, client.as_ref(), args).await?;
    let record = page.record(args.id())?.clone();
    let goal = record.goal.as_deref().unwrap_or("none");
    let message = if record.is_uncategorized() {
        format!("Saved {}: uncategorized, goal {goal}", record.id)
    } else {
        format!(
            "Saved {}: {}, goal {goal}",
            record.id,
            record.categories.join(", ")
        )
    };
    Ok(Out::new(message, record))
}

async fn annotate_page(
    page: &mut Page,
    client: &(dyn Submitter + Send + Sync),
    args: &AnnotateArgs,
) -> Result<()> {
    let current = page.open(args.id())?.record().categories.clone();
    if let Some(wanted) = args.categories() {
        for name in current.iter().filter(|c| !wanted.contains(c)) {
            page.set_category(name, false)?;
        }
        for name in wanted {
            page.set_category(name, true)?;
        }
    }
    for name in args.new_categories() {
        let mut prompt = |_: &str| Some(name.clone());
        let _ = page.add_category(&mut prompt)?;
    }
    match args.goal() {
        Dimension::Any => {}
        Dimension::Absent => page.select_goal(None)?,
        Dimension::Value(goal) => page.select_goal(Some(&goal))?,
    }
    page.submit(client).await
}
