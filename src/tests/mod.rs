use std::sync::Arc;

use crate::dates::{CalendarDate, DateRange};
use crate::filter::{self, FilterCriteria};
use crate::output::report::{FilterSummary, ReportDocument, ReportOptions, PLAN_COLUMNS};
use crate::pagination::{self, PageRequest};
use crate::records::PlanItem;
use crate::runner::{Options, Runner};
use crate::source::{DataSource, Dataset};

fn today() -> CalendarDate {
    CalendarDate::from_ymd(2024, 6, 30).unwrap()
}

#[test]
fn search_for_one_code_among_72_products() {
    let data = Dataset::sample(today());
    let criteria = FilterCriteria::default().with_search("ITM-1001", &["item", "description"]);
    let hits = filter::filter(&data.products, &criteria);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item, "ITM-1001");
}

#[test]
fn search_is_case_insensitive() {
    let data = Dataset::sample(today());
    let criteria = FilterCriteria::default().with_search("itm-1001", &["item"]);
    assert_eq!(filter::filter(&data.products, &criteria).len(), 1);
}

#[test]
fn equality_filters_never_grow_the_result() {
    let data = Dataset::sample(today());
    let range = DateRange::trailing_days(today(), 30);
    let base = FilterCriteria::default().with_date("date", range);
    let before = filter::filter(&data.plan, &base).len();
    for category in filter::distinct_values(&data.plan, "category") {
        let narrowed = base.clone().with_equals("category", Some(category.as_str()));
        assert!(filter::filter(&data.plan, &narrowed).len() <= before);
    }
}

#[test]
fn predicates_commute() {
    let data = Dataset::sample(today());
    let range = DateRange::trailing_days(today(), 15);
    let a = FilterCriteria::default()
        .with_date("date", range)
        .with_equals("category", Some("Paints"));
    let b = FilterCriteria::default()
        .with_equals("category", Some("Paints"))
        .with_date("date", range);
    let date_only = filter::filter(&data.plan, &FilterCriteria::default().with_date("date", range));
    let chained = filter::filter(
        &date_only,
        &FilterCriteria::default().with_equals("category", Some("Paints")),
    );
    assert_eq!(filter::filter(&data.plan, &a), filter::filter(&data.plan, &b));
    assert_eq!(filter::filter(&data.plan, &a), chained);
}

#[test]
fn inverted_window_yields_nothing() {
    let data = Dataset::sample(today());
    let range = DateRange::new(today(), today().days_before(10));
    let criteria = FilterCriteria::default().with_date("date", range);
    assert!(filter::filter(&data.plan, &criteria).is_empty());
}

#[test]
fn export_covers_unpaginated_rows() {
    let data = Dataset::sample(today());
    let range = DateRange::trailing_days(today(), 40);
    let rows: Vec<PlanItem> =
        filter::filter(&data.plan, &FilterCriteria::default().with_date("date", range));
    let page = pagination::paginate(&rows, PageRequest::new(10, 1).unwrap());
    let summary = FilterSummary::for_plan(&range.start.to_string(), &range.end.to_string(), "", "");
    let doc = ReportDocument::build(&rows, &summary, &PLAN_COLUMNS, &ReportOptions::default());
    assert!(page.items.len() < rows.len());
    assert_eq!(doc.data_row_count(), rows.len());
    assert_eq!(doc.summary[2], ("Category".to_string(), "-".to_string()));
}

#[tokio::test]
async fn runner_pages_a_plan_search() {
    let options = Options {
        range: DateRange::trailing_days(today(), 40),
        search: Some("Pending".to_string()),
        page_size: 6,
        page_number: 99,
        ..Options::for_day(today())
    };
    let runner = Runner::new(Arc::new(Dataset::sample(today())), options).unwrap();
    let listing = runner.run_plan().await.unwrap();
    let page = listing.page();
    assert_eq!(page.page_number, page.page_count);
    assert!(page.items.iter().all(|r| r.status.label() == "Pending"));
    assert!(listing.fetched.len() > listing.matched.len());
}

#[tokio::test]
async fn sample_source_behaves_like_a_data_source() {
    let source: Arc<dyn DataSource> = Arc::new(Dataset::sample(today()));
    let params = DateRange::trailing_days(today(), 9).to_params();
    let plan = source.fetch_plan(&params, None, None).await.unwrap();
    assert_eq!(plan.len(), 20);
    let metrics = source.fetch_metrics(&params).await.unwrap();
    assert_eq!(metrics.total_items, 72);
}
