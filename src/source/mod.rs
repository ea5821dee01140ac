mod file;
mod sample;

pub use file::FileSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{DateRangeParams, InvalidDateError};
use crate::filter::{self, FilterCriteria};
use crate::records::{
    Alert, ClassLetter, ClassificationRow, DailySupport, Metrics, PlanItem, ProductRow,
};

/// Upstream failure. Transient: callers show a notice and may try again.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date range: {source}")]
    Range {
        #[source]
        source: InvalidDateError,
    },
}

impl From<InvalidDateError> for FetchError {
    fn from(source: InvalidDateError) -> Self {
        FetchError::Range { source }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_metrics(&self, params: &DateRangeParams) -> Result<Metrics, FetchError>;

    async fn fetch_top_products(
        &self,
        params: &DateRangeParams,
    ) -> Result<Vec<ProductRow>, FetchError>;

    async fn fetch_classification(
        &self,
        params: &DateRangeParams,
        letter: Option<ClassLetter>,
    ) -> Result<Vec<ClassificationRow>, FetchError>;

    async fn fetch_alerts(&self, params: &DateRangeParams) -> Result<Vec<Alert>, FetchError>;

    async fn fetch_daily_support(
        &self,
        params: &DateRangeParams,
    ) -> Result<Vec<DailySupport>, FetchError>;

    async fn fetch_plan(
        &self,
        params: &DateRangeParams,
        category: Option<&str>,
        product: Option<&str>,
    ) -> Result<Vec<PlanItem>, FetchError>;
}

/// All record collections of one deployment, held in memory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub products: Vec<ProductRow>,
    #[serde(default)]
    pub classification: Vec<ClassificationRow>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub plan: Vec<PlanItem>,
    #[serde(default)]
    pub daily_support: Vec<DailySupport>,
    #[serde(default)]
    pub coverage: f64,
}

impl Dataset {
    pub fn metrics(&self) -> Metrics {
        let share = |letter: ClassLetter| {
            if self.classification.is_empty() {
                return 0.0;
            }
            let n = self
                .classification
                .iter()
                .filter(|r| r.class == letter)
                .count();
            round_to(n as f64 * 100.0 / self.classification.len() as f64, 1)
        };
        Metrics {
            total_items: self.products.len(),
            total_support: self
                .products
                .iter()
                .map(|p| u64::from(p.absolute_support))
                .sum(),
            share_a: share(ClassLetter::A),
            share_b: share(ClassLetter::B),
            alerts: self.alerts.len(),
            coverage: self.coverage,
        }
    }

    pub fn classification_for(&self, letter: Option<ClassLetter>) -> Vec<ClassificationRow> {
        match letter {
            Some(letter) => self
                .classification
                .iter()
                .filter(|r| r.class == letter)
                .cloned()
                .collect(),
            None => self.classification.clone(),
        }
    }

    pub fn daily_support_in(
        &self,
        params: &DateRangeParams,
    ) -> Result<Vec<DailySupport>, FetchError> {
        let range = params.range()?;
        Ok(filter::filter_daily_series(&self.daily_support, &range))
    }

    pub fn plan_in(
        &self,
        params: &DateRangeParams,
        category: Option<&str>,
        product: Option<&str>,
    ) -> Result<Vec<PlanItem>, FetchError> {
        let criteria = FilterCriteria::default()
            .with_date("date", params.range()?)
            .with_equals("category", category)
            .with_equals("product", product);
        Ok(filter::filter(&self.plan, &criteria))
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[async_trait]
impl DataSource for Dataset {
    async fn fetch_metrics(&self, _params: &DateRangeParams) -> Result<Metrics, FetchError> {
        Ok(self.metrics())
    }

    async fn fetch_top_products(
        &self,
        _params: &DateRangeParams,
    ) -> Result<Vec<ProductRow>, FetchError> {
        Ok(self.products.clone())
    }

    async fn fetch_classification(
        &self,
        _params: &DateRangeParams,
        letter: Option<ClassLetter>,
    ) -> Result<Vec<ClassificationRow>, FetchError> {
        Ok(self.classification_for(letter))
    }

    async fn fetch_alerts(&self, _params: &DateRangeParams) -> Result<Vec<Alert>, FetchError> {
        Ok(self.alerts.clone())
    }

    async fn fetch_daily_support(
        &self,
        params: &DateRangeParams,
    ) -> Result<Vec<DailySupport>, FetchError> {
        self.daily_support_in(params)
    }

    async fn fetch_plan(
        &self,
        params: &DateRangeParams,
        category: Option<&str>,
        product: Option<&str>,
    ) -> Result<Vec<PlanItem>, FetchError> {
        self.plan_in(params, category, product)
    }
}
