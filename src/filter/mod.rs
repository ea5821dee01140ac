use std::collections::HashSet;

use tracing::debug;

use crate::dates::{self, DateRange};
use crate::records::{DailySupport, FieldValue, Record};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatePredicate {
    pub field: String,
    pub range: DateRange,
}

/// The active combination of date, equality and search predicates.
///
/// Every predicate is optional. A missing date predicate, a `None` or empty
/// equality value and an empty search term all match every record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date: Option<DatePredicate>,
    pub equality: Vec<(String, Option<String>)>,
    pub search_term: Option<String>,
    pub search_fields: Vec<String>,
}

impl FilterCriteria {
    pub fn with_date(mut self, field: &str, range: DateRange) -> Self {
        self.date = Some(DatePredicate {
            field: field.to_string(),
            range,
        });
        self
    }

    pub fn with_equals(mut self, field: &str, value: Option<&str>) -> Self {
        self.equality
            .push((field.to_string(), value.map(|v| v.to_string())));
        self
    }

    pub fn with_search(mut self, term: &str, fields: &[&str]) -> Self {
        self.search_term = Some(term.to_string());
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn is_vacuous(&self) -> bool {
        self.date.is_none() && self.active_equality().next().is_none() && self.needle().is_none()
    }

    fn active_equality(&self) -> impl Iterator<Item = (&str, &str)> {
        self.equality.iter().filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (field.as_str(), v))
        })
    }

    fn needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }

    fn compile(&self) -> CompiledCriteria<'_> {
        CompiledCriteria {
            date: self.date.as_ref(),
            equality: self.active_equality().collect(),
            needle: self.needle(),
            search_fields: &self.search_fields,
        }
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.compile().matches(record)
    }
}

struct CompiledCriteria<'a> {
    date: Option<&'a DatePredicate>,
    equality: Vec<(&'a str, &'a str)>,
    needle: Option<String>,
    search_fields: &'a [String],
}

impl CompiledCriteria<'_> {
    fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(pred) = self.date {
            if !date_matches(record.field(&pred.field), &pred.range) {
                return false;
            }
        }
        for (field, expected) in &self.equality {
            match record.field(field) {
                Some(value) if value.to_text() == *expected => {}
                _ => return false,
            }
        }
        if let Some(needle) = self.needle.as_deref() {
            let hit = self.search_fields.iter().any(|field| {
                record
                    .field(field)
                    .map(|v| v.to_text().to_lowercase().contains(needle))
                    .unwrap_or(false)
            });
            if !hit {
                return false;
            }
        }
        true
    }
}

fn date_matches(value: Option<FieldValue<'_>>, range: &DateRange) -> bool {
    match value {
        Some(FieldValue::Date(d)) => dates::in_range(d, range),
        Some(FieldValue::Text(s)) => dates::normalize(s)
            .map(|d| dates::in_range(d, range))
            .unwrap_or(false),
        _ => false,
    }
}

/// Applies `criteria` in one pass. Input order is preserved and the input is
/// left untouched.
pub fn filter<R: Record + Clone>(records: &[R], criteria: &FilterCriteria) -> Vec<R> {
    let compiled = criteria.compile();
    let out: Vec<R> = records
        .iter()
        .filter(|r| compiled.matches(*r))
        .cloned()
        .collect();
    debug!(total = records.len(), matched = out.len(), "filter applied");
    out
}

/// Date filter for the day-bucketed support feed.
///
/// Unlike [`filter`], an empty match returns the whole series. This applies to
/// this feed only.
pub fn filter_daily_series(points: &[DailySupport], range: &DateRange) -> Vec<DailySupport> {
    let criteria = FilterCriteria::default().with_date("date", *range);
    let matched = filter(points, &criteria);
    if matched.is_empty() {
        debug!(points = points.len(), "no daily points in range, using full series");
        return points.to_vec();
    }
    matched
}

/// Unique text values of `field`, in first-seen order.
pub fn distinct_values<R: Record>(records: &[R], field: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        if let Some(value) = record.field(field) {
            let text = value.to_text().into_owned();
            if seen.insert(text.clone()) {
                out.push(text);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::CalendarDate;
    use crate::records::{PlanItem, PlanStatus};

    fn plan(id: &str, date: &str, category: &str, owner: &str) -> PlanItem {
        PlanItem {
            id: id.to_string(),
            date: date.parse().unwrap(),
            item: format!("ITM-{id}"),
            product: format!("{category} Product"),
            status: PlanStatus::Pending,
            owner: owner.to_string(),
            notes: String::new(),
            category: category.to_string(),
        }
    }

    fn rows() -> Vec<PlanItem> {
        vec![
            plan("1", "2024-01-04", "Brushes", "Ana Ruiz"),
            plan("2", "2024-01-05", "Paints", "Luis Soto"),
            plan("3", "2024-01-07", "Brushes", "Carla Mena"),
            plan("4", "2024-01-10", "Tapes", "Luis Soto"),
            plan("5", "2024-01-11", "Brushes", "Rosa Vega"),
        ]
    }

    fn ids(rows: &[PlanItem]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn vacuous_criteria_return_input() {
        let input = rows();
        let criteria = FilterCriteria::default()
            .with_equals("category", None)
            .with_equals("product", Some(""))
            .with_search("", &["item"]);
        assert!(criteria.is_vacuous());
        assert_eq!(filter(&input, &criteria), input);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let range = DateRange::parse("2024-01-05", "2024-01-10").unwrap();
        let criteria = FilterCriteria::default()
            .with_date("date", range)
            .with_equals("category", Some("Brushes"));
        assert_eq!(ids(&filter(&rows(), &criteria)), vec!["3"]);
    }

    #[test]
    fn equality_is_case_sensitive() {
        let criteria = FilterCriteria::default().with_equals("category", Some("brushes"));
        assert!(filter(&rows(), &criteria).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_any_field() {
        let criteria = FilterCriteria::default().with_search("LUIS", &["item", "owner"]);
        assert_eq!(ids(&filter(&rows(), &criteria)), vec!["2", "4"]);
    }

    #[test]
    fn equality_filter_never_grows_result() {
        let base = FilterCriteria::default().with_search("o", &["owner", "product"]);
        let before = filter(&rows(), &base).len();
        for category in ["Brushes", "Paints", "Tapes", "Nope"] {
            let narrowed = base.clone().with_equals("category", Some(category));
            assert!(filter(&rows(), &narrowed).len() <= before);
        }
    }

    #[test]
    fn inverted_range_yields_empty() {
        let range = DateRange::parse("2024-01-10", "2024-01-05").unwrap();
        let criteria = FilterCriteria::default().with_date("date", range);
        assert!(filter(&rows(), &criteria).is_empty());
    }

    #[test]
    fn unknown_date_field_fails_active_date_predicate() {
        let range = DateRange::parse("2000-01-01", "2100-01-01").unwrap();
        let criteria = FilterCriteria::default().with_date("owner", range);
        assert!(filter(&rows(), &criteria).is_empty());
    }

    #[test]
    fn daily_series_falls_back_to_full_series() {
        let points: Vec<DailySupport> = (1..=3)
            .map(|d| DailySupport {
                date: CalendarDate::from_ymd(2024, 1, d).unwrap(),
                support: 100 * i64::from(d),
            })
            .collect();
        let outside = DateRange::parse("2023-06-01", "2023-06-30").unwrap();
        assert_eq!(filter_daily_series(&points, &outside), points);

        let inside = DateRange::parse("2024-01-02", "2024-01-09").unwrap();
        assert_eq!(filter_daily_series(&points, &inside).len(), 2);
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        assert_eq!(
            distinct_values(&rows(), "category"),
            vec!["Brushes", "Paints", "Tapes"]
        );
    }
}
