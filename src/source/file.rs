use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{DataSource, Dataset, FetchError};
use crate::dates::DateRangeParams;
use crate::records::{
    Alert, ClassLetter, ClassificationRow, DailySupport, Metrics, PlanItem, ProductRow,
};

/// A dataset stored as JSON on disk. Re-read on every fetch so edits show up
/// on the next refresh.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Dataset, FetchError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::Read {
                path: path.clone(),
                source,
            })?;
        let dataset: Dataset =
            serde_json::from_slice(&raw).map_err(|source| FetchError::Parse { path, source })?;
        debug!(
            products = dataset.products.len(),
            plan = dataset.plan.len(),
            "dataset loaded from {}",
            self.path.display()
        );
        Ok(dataset)
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch_metrics(&self, _params: &DateRangeParams) -> Result<Metrics, FetchError> {
        Ok(self.load().await?.metrics())
    }

    async fn fetch_top_products(
        &self,
        _params: &DateRangeParams,
    ) -> Result<Vec<ProductRow>, FetchError> {
        Ok(self.load().await?.products)
    }

    async fn fetch_classification(
        &self,
        _params: &DateRangeParams,
        letter: Option<ClassLetter>,
    ) -> Result<Vec<ClassificationRow>, FetchError> {
        Ok(self.load().await?.classification_for(letter))
    }

    async fn fetch_alerts(&self, _params: &DateRangeParams) -> Result<Vec<Alert>, FetchError> {
        Ok(self.load().await?.alerts)
    }

    async fn fetch_daily_support(
        &self,
        params: &DateRangeParams,
    ) -> Result<Vec<DailySupport>, FetchError> {
        self.load().await?.daily_support_in(params)
    }

    async fn fetch_plan(
        &self,
        params: &DateRangeParams,
        category: Option<&str>,
        product: Option<&str>,
    ) -> Result<Vec<PlanItem>, FetchError> {
        self.load().await?.plan_in(params, category, product)
    }
}
