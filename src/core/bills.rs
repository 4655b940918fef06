//! Bills listing - Fetches the connected employee's bills and prepares them for display.
//!
//! A [`BillLister`] is built each time the bills screen is shown. Fetching never
//! fails because of a single malformed record: dates that cannot be humanized
//! are shown raw. Store failures are propagated untouched so the screen can
//! display their message verbatim.

use crate::{
    context::ContainerContext,
    core::format::{DateLocale, format_date, format_status},
    diagnostics::{Diagnostic, Diagnostics},
    entities::{Bill, User},
    errors::Result,
    routes::{Navigator, Route},
    store::Store,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

/// Presentation order of the listing, by canonical date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Earliest bill first
    Ascending,
    /// Latest bill first
    #[default]
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unsupported sort order {other:?}")),
        }
    }
}

/// A bill together with its display strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillView {
    /// Bill as returned by the store, canonical date included
    pub bill: Bill,
    /// Humanized date, or the raw date when it could not be formatted
    pub date: String,
    /// Humanized status
    pub status: String,
}

/// What the bills screen should render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BillsScreen {
    /// Bills to list, already sorted
    Ready(Vec<BillView>),
    /// The store failed; `message` is its error text, unmodified
    Failed { message: String },
}

/// Receipt shown in the preview modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptPreview {
    /// Location of the receipt file
    pub url: String,
    /// Image width in pixels, half the modal width
    pub width: u32,
}

/// Container behind the bills screen.
pub struct BillLister {
    store: Arc<dyn Store>,
    navigator: Arc<dyn Navigator>,
    diagnostics: Arc<dyn Diagnostics>,
    user: User,
    locale: DateLocale,
    sort_order: SortOrder,
}

impl BillLister {
    /// Builds the container for the connected user.
    ///
    /// Fails with a session error when nobody is connected.
    pub fn new(context: &ContainerContext) -> Result<Self> {
        let user = context.session.current_user()?;
        Ok(Self {
            store: Arc::clone(&context.store),
            navigator: Arc::clone(&context.navigator),
            diagnostics: Arc::clone(&context.diagnostics),
            user,
            locale: context.config.bills.locale,
            sort_order: context.config.bills.sort_order,
        })
    }

    /// User the listing was built for.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Fetches every bill and attaches display strings, keeping the store's order.
    ///
    /// Emits the `BillsFetched` count signal before returning.
    #[instrument(skip(self), fields(email = ?self.user.email))]
    pub async fn get_bills(&self) -> Result<Vec<BillView>> {
        let bills = self.store.bills().list().await?;
        let views: Vec<BillView> = bills.into_iter().map(|bill| self.to_view(bill)).collect();
        self.diagnostics
            .report(Diagnostic::BillsFetched { count: views.len() });
        Ok(views)
    }

    fn to_view(&self, bill: Bill) -> BillView {
        let status = format_status(bill.status, self.locale).to_string();
        let date = format_date(&bill.date, self.locale).unwrap_or_else(|_| {
            self.diagnostics.report(Diagnostic::DateFormatFallback {
                bill_id: bill.id.clone(),
                date: bill.date.clone(),
            });
            bill.date.clone()
        });
        BillView { bill, date, status }
    }

    /// Fetches bills and turns the outcome into something the screen can render.
    ///
    /// Bills are sorted by date in the configured order; a store failure becomes
    /// [`BillsScreen::Failed`] with the error text.
    pub async fn load_screen(&self) -> BillsScreen {
        match self.get_bills().await {
            Ok(mut views) => {
                sort_by_date(&mut views, self.sort_order);
                BillsScreen::Ready(views)
            }
            Err(e) => {
                info!("Bills could not be loaded: {}", e);
                BillsScreen::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// "New bill" button.
    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// Receipt to show when the eye icon of `view` is clicked.
    ///
    /// `None` when the bill has no uploaded file.
    #[must_use]
    pub fn receipt_preview(&self, view: &BillView, modal_width: u32) -> Option<ReceiptPreview> {
        view.bill.file_url.as_ref().map(|url| ReceiptPreview {
            url: url.clone(),
            width: modal_width / 2,
        })
    }
}

/// Stable sort of `views` by canonical date.
pub fn sort_by_date(views: &mut [BillView], order: SortOrder) {
    match order {
        SortOrder::Ascending => views.sort_by(|a, b| a.bill.date.cmp(&b.bill.date)),
        SortOrder::Descending => views.sort_by(|a, b| b.bill.date.cmp(&a.bill.date)),
    }
}
