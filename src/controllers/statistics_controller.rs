use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};

use crate::{
    models::{Metric, StatisticsRequest, WeatherStatistics},
    services::api_client::ApiClient,
};

pub const MISSING_INPUT: &str = "Please select at least one metric and provide a location";
pub const BAD_DATE_RANGE: &str = "End date must be after start date";
pub const GENERATE_FAILED: &str = "Error generating statistics";

pub struct StatisticsSection {
    api: ApiClient,
    initial_location: String,
    initial_start: NaiveDate,

    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    metrics: BTreeSet<Metric>,

    statistics: Option<WeatherStatistics>,
    loading: bool,
    error: Option<String>,
}

impl StatisticsSection {
    pub fn new(api: ApiClient, initial_location: &str, initial_start: NaiveDate) -> Self {
        Self {
            api,
            initial_location: initial_location.to_string(),
            initial_start,
            location: initial_location.to_string(),
            start_date: initial_start,
            end_date: Local::now().date_naive(),
            metrics: BTreeSet::new(),
            statistics: None,
            loading: false,
            error: None,
        }
    }

    pub fn toggle_metric(&mut self, metric: Metric) {
        if !self.metrics.remove(&metric) {
            self.metrics.insert(metric);
        }
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.iter().copied()
    }

    pub fn statistics(&self) -> Option<&WeatherStatistics> {
        self.statistics.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn reset(&mut self) {
        self.metrics.clear();
        self.statistics = None;
        self.location = self.initial_location.clone();
        self.start_date = self.initial_start;
        self.end_date = Local::now().date_naive();
    }

    fn request(&self) -> Result<StatisticsRequest, &'static str> {
        let location = self.location.trim();
        if location.is_empty() || self.metrics.is_empty() {
            return Err(MISSING_INPUT);
        }
        if self.end_date < self.start_date {
            return Err(BAD_DATE_RANGE);
        }

        Ok(StatisticsRequest {
            location: location.to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            metrics: self.metrics.iter().copied().collect(),
        })
    }

    pub async fn generate(&mut self) {
        let request = match self.request() {
            Ok(r) => r,
            Err(msg) => {
                self.error = Some(msg.to_string());
                return;
            }
        };

        self.loading = true;
        self.error = None;

        match self.api.calculate_statistics(&request).await {
            Ok(stats) => self.statistics = Some(stats),
            Err(e) => {
                tracing::error!("error generating statistics: {}", e);
                self.error = Some(GENERATE_FAILED.to_string());
            }
        }

        self.loading = false;
    }
}
