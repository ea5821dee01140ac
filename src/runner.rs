use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::dates::{CalendarDate, DateRange};
use crate::filter::{self, FilterCriteria};
use crate::output::report::FilterSummary;
use crate::pagination::{self, Page, PageRequest};
use crate::records::{
    Alert, ClassLetter, ClassificationRow, DailySupport, Metrics, PlanItem, ProductRow, Record,
};
use crate::source::{DataSource, FetchError};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOOKBACK_DAYS: u64 = 9;

pub const PLAN_SEARCH_FIELDS: [&str; 4] = ["item", "product", "owner", "status"];
pub const PRODUCT_SEARCH_FIELDS: [&str; 2] = ["item", "description"];
pub const CLASSIFICATION_SEARCH_FIELDS: [&str; 2] = ["item_code", "class"];

#[derive(Clone, Debug)]
pub struct Options {
    pub range: DateRange,
    pub category: Option<String>,
    pub product: Option<String>,
    pub letter: Option<ClassLetter>,
    pub search: Option<String>,
    pub page_size: usize,
    pub page_number: i64,
}

impl Options {
    /// Trailing window ending at `today`, no other filters.
    pub fn for_day(today: CalendarDate) -> Self {
        Self {
            range: DateRange::trailing_days(today, DEFAULT_LOOKBACK_DAYS),
            category: None,
            product: None,
            letter: None,
            search: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::for_day(chrono::Local::now().date_naive().into())
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: usize },

    #[error("data source failed: {source}")]
    Fetch {
        #[source]
        source: FetchError,
    },
}

impl From<FetchError> for RunnerError {
    fn from(source: FetchError) -> Self {
        RunnerError::Fetch { source }
    }
}

/// One view's records: what the source returned, what the search kept, and
/// the page being looked at.
#[derive(Clone, Debug)]
pub struct Listing<R> {
    /// Source-filtered rows. This is the export set.
    pub fetched: Vec<R>,
    /// `fetched` narrowed by the search term.
    pub matched: Vec<R>,
    pub request: PageRequest,
    search_fields: &'static [&'static str],
}

impl<R: Record + Clone> Listing<R> {
    fn new(
        fetched: Vec<R>,
        search: Option<&str>,
        search_fields: &'static [&'static str],
        request: PageRequest,
    ) -> Self {
        let matched = search_rows(&fetched, search, search_fields);
        Self {
            fetched,
            matched,
            request,
            search_fields,
        }
    }

    pub fn page(&self) -> Page<'_, R> {
        pagination::paginate(&self.matched, self.request)
    }

    /// Re-runs the search over `fetched`. The page goes back to 1.
    pub fn search(&mut self, term: Option<&str>) {
        self.matched = search_rows(&self.fetched, term, self.search_fields);
        self.request = self.request.first_page();
    }

    pub fn go_to(&mut self, page_number: i64) {
        self.request.page_number = page_number;
    }
}

fn search_rows<R: Record + Clone>(rows: &[R], term: Option<&str>, fields: &[&str]) -> Vec<R> {
    match term {
        Some(term) => filter::filter(rows, &FilterCriteria::default().with_search(term, fields)),
        None => rows.to_vec(),
    }
}

#[derive(Clone, Debug)]
pub struct DashboardSnapshot {
    pub metrics: Metrics,
    pub alerts: Vec<Alert>,
    pub daily_support: Vec<DailySupport>,
    pub top_products: Vec<ProductRow>,
    pub classification: Vec<ClassificationRow>,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct Runner {
    source: Arc<dyn DataSource>,
    options: Options,
    request: PageRequest,
}

impl Runner {
    pub fn new(source: Arc<dyn DataSource>, options: Options) -> Result<Self, RunnerError> {
        let request = PageRequest::new(options.page_size, options.page_number).ok_or(
            RunnerError::InvalidPageSize {
                value: options.page_size,
            },
        )?;
        Ok(Self {
            source,
            options,
            request,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn search(&self) -> Option<&str> {
        self.options.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Filter rows as shown above an exported plan.
    pub fn plan_summary(&self) -> FilterSummary {
        FilterSummary::for_plan(
            &self.options.range.start.to_string(),
            &self.options.range.end.to_string(),
            self.options.category.as_deref().unwrap_or_default(),
            self.options.product.as_deref().unwrap_or_default(),
        )
    }

    pub async fn run_plan(&self) -> Result<Listing<PlanItem>, RunnerError> {
        let params = self.options.range.to_params();
        let rows = self
            .source
            .fetch_plan(
                &params,
                self.options.category.as_deref(),
                self.options.product.as_deref(),
            )
            .await?;
        debug!(rows = rows.len(), "plan fetched");
        Ok(Listing::new(
            rows,
            self.search(),
            &PLAN_SEARCH_FIELDS,
            self.request,
        ))
    }

    pub async fn run_products(&self) -> Result<Listing<ProductRow>, RunnerError> {
        let params = self.options.range.to_params();
        let rows = self.source.fetch_top_products(&params).await?;
        debug!(rows = rows.len(), "products fetched");
        Ok(Listing::new(
            rows,
            self.search(),
            &PRODUCT_SEARCH_FIELDS,
            self.request,
        ))
    }

    pub async fn run_classification(&self) -> Result<Listing<ClassificationRow>, RunnerError> {
        let params = self.options.range.to_params();
        let rows = self
            .source
            .fetch_classification(&params, self.options.letter)
            .await?;
        debug!(rows = rows.len(), "classification fetched");
        Ok(Listing::new(
            rows,
            self.search(),
            &CLASSIFICATION_SEARCH_FIELDS,
            self.request,
        ))
    }

    pub async fn run_dashboard(&self) -> Result<DashboardSnapshot, RunnerError> {
        let started_at = Instant::now();
        let params = self.options.range.to_params();
        let (metrics, alerts, daily_support, top_products, classification) = futures::try_join!(
            self.source.fetch_metrics(&params),
            self.source.fetch_alerts(&params),
            self.source.fetch_daily_support(&params),
            self.source.fetch_top_products(&params),
            self.source.fetch_classification(&params, self.options.letter),
        )?;
        Ok(DashboardSnapshot {
            metrics,
            alerts,
            daily_support,
            top_products,
            classification,
            elapsed: started_at.elapsed(),
        })
    }
}
