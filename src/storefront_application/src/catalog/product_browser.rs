use std::{sync::Arc, time::Duration};

use storefront_core::{CatalogApi, ProductPage, ProductQuery, RequestSigner};
use tokio::sync::watch;

use crate::catalog::catalog_client::{CatalogClient, CatalogError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the product table shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingView {
    pub query: Option<ProductQuery>,
    pub page: Option<ProductPage>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Identifies one listing request. Superseded once a newer ticket exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTicket(u64);

/// Latest-request-wins product listing.
///
/// Each [`ProductBrowser::fetch`] cancels the one before it. A superseded
/// request never touches the [`ListingView`], even if its response would
/// arrive later.
pub struct ProductBrowser<C, S>
where
    C: CatalogApi,
    S: RequestSigner,
{
    client: Arc<CatalogClient<C, S>>,
    tickets: watch::Sender<u64>,
    view: watch::Sender<ListingView>,
    debounce: Duration,
}

impl<C, S> ProductBrowser<C, S>
where
    C: CatalogApi,
    S: RequestSigner,
{
    pub fn new(client: Arc<CatalogClient<C, S>>, debounce: Duration) -> Self {
        let (tickets, _) = watch::channel(0);
        let (view, _) = watch::channel(ListingView::default());
        Self {
            client,
            tickets,
            view,
            debounce,
        }
    }

    pub fn view(&self) -> ListingView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.view.subscribe()
    }

    /// Cancel whatever request is in flight without starting a new one.
    pub fn cancel(&self) {
        self.issue();
        self.view.send_if_modified(|view| std::mem::replace(&mut view.loading, false));
    }

    /// Load a page, superseding any earlier request.
    ///
    /// Waits out the debounce interval first, so a burst of keystrokes only
    /// reaches the backend once.
    #[tracing::instrument(name = "ProductBrowser::fetch", skip(self))]
    pub async fn fetch(&self, query: ProductQuery) -> Result<ProductPage, CatalogError> {
        let ticket = self.issue();
        let cancelled = superseded(self.tickets.subscribe(), ticket);
        self.view.send_modify(|view| view.loading = true);

        let request = async {
            if !self.debounce.is_zero() {
                tokio::time::sleep(self.debounce).await;
            }
            self.client.list(&query).await
        };

        let result = tokio::select! {
            biased;
            _ = cancelled => {
                tracing::debug!(?ticket, "Listing request cancelled");
                return Err(CatalogError::Superseded);
            }
            result = request => result,
        };

        let applied = self.view.send_if_modified(|view| {
            if !self.is_current(ticket) {
                return false;
            }
            view.loading = false;
            match &result {
                Ok(page) => {
                    view.query = Some(query.clone());
                    view.page = Some(page.clone());
                    view.error = None;
                }
                Err(e) => view.error = Some(e.to_string()),
            }
            true
        });

        if !applied {
            tracing::debug!(?ticket, "Discarding stale listing response");
            return Err(CatalogError::Superseded);
        }
        result
    }

    fn issue(&self) -> ListingTicket {
        let mut issued = 0;
        self.tickets.send_modify(|current| {
            *current += 1;
            issued = *current;
        });
        ListingTicket(issued)
    }

    fn is_current(&self, ticket: ListingTicket) -> bool {
        *self.tickets.borrow() == ticket.0
    }

}

/// Resolves once a newer ticket than `ticket` has been issued.
async fn superseded(mut tickets: watch::Receiver<u64>, ticket: ListingTicket) {
    if tickets
        .wait_for(|current| *current != ticket.0)
        .await
        .is_err()
    {
        std::future::pending::<()>().await;
    }
}
