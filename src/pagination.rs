use anyhow::Result;
use tracing::{debug, info};

use crate::{
    aggregate::{Tallies, Tally, aggregate_page},
    cli::RunConfig,
    error::StatsError,
    query::PageQuery,
    types::Forge,
};

/// Walks the merged pull request connection page by page and folds every
/// page into one run-wide [`Tallies`].
///
/// The first request carries no cursor; each following one continues from
/// the previous page's end cursor. The walk stops on the first page that
/// reports no next page. Any fetch error aborts the run and the partial
/// tallies are dropped. `config.max_pages` bounds a server that never stops
/// reporting more pages.
pub async fn collect_stats<F, T>(
    forge: &F,
    config: &RunConfig,
    tally: &T,
) -> Result<Tallies<T::Counter>>
where
    F: Forge + Sync,
    T: Tally + Sync,
{
    let source = config.source();
    let filter = config.page_filter();
    let mut totals = Tallies::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        if pages == config.max_pages {
            return Err(StatsError::PageLimit {
                limit: config.max_pages,
            }
            .into());
        }
        pages += 1;

        let query = PageQuery::new(&config.repo, source, tally.selection()).after(cursor.as_deref());
        let page = forge.fetch_page(&query).await?;

        let contribution = aggregate_page(tally, &page.nodes, &filter);
        debug!(
            page = pages,
            nodes = page.nodes.len(),
            contributors = contribution.len(),
            has_next_page = page.page_info.has_next_page,
            "Folded page"
        );
        totals.merge(contribution);

        match page.page_info.next_cursor(pages)? {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        repo = %config.repo,
        pages,
        contributors = totals.len(),
        total = totals.grand_total(),
        "Collected contributor stats"
    );

    Ok(totals)
}
