//! Catalog commands: list, search and interactive browse.

use qkart_storefront::services::SearchResponse;
use qkart_storefront::{Action, Storefront};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;

use super::{CommandError, During, show_notice};
use crate::output;

/// List the full catalog.
pub async fn products(storefront: &mut Storefront) -> Result<(), CommandError> {
    storefront
        .refresh_catalog()
        .await
        .during(Action::FetchProducts)?;
    output::catalog(storefront.catalog());
    Ok(())
}

/// Run one search and print what the product grid would show.
///
/// A failed search is not a failed command: the notice is printed and the
/// full catalog is shown instead.
pub async fn search(storefront: &mut Storefront, text: &str) -> Result<(), CommandError> {
    storefront
        .refresh_catalog()
        .await
        .during(Action::FetchProducts)?;

    if let Err(e) = storefront.search(text).await {
        show_notice(Action::Search, &e);
    }
    output::catalog(storefront.catalog());
    Ok(())
}

/// Interactive search. Every stdin line is the new search text; only the
/// line that is followed by a quiet period is sent.
pub async fn browse(storefront: &mut Storefront) -> Result<(), CommandError> {
    storefront
        .refresh_catalog()
        .await
        .during(Action::FetchProducts)?;
    output::catalog(storefront.catalog());

    browse_lines(storefront, BufReader::new(tokio::io::stdin()).lines()).await;
    Ok(())
}

/// Debounce `lines` into searches and print each applied result.
///
/// Once input closes, the search for the last line still runs and its
/// result is printed before returning.
async fn browse_lines<R>(storefront: &mut Storefront, mut lines: Lines<R>)
where
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SearchResponse>();
    let mut debouncer = storefront.search_debouncer(tx);
    let delay = storefront.search_delay();

    // Last line handed to the debouncer whose response has not arrived yet
    let mut awaiting: Option<String> = None;
    let mut input_open = true;

    while input_open || awaiting.is_some() {
        tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(text)) => {
                    debouncer.call(text.as_str(), delay);
                    awaiting = Some(text);
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read input");
                    input_open = false;
                }
            },
            Some(response) = rx.recv() => {
                if awaiting.as_deref() == Some(response.text.as_str()) {
                    awaiting = None;
                }
                if let Err(e) = storefront.apply_search(response) {
                    show_notice(Action::Search, &e);
                }
                output::catalog(storefront.catalog());
            }
            else => break,
        }
    }
}
