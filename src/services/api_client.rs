use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    config::Settings,
    error::ApiError,
    models::{
        weather::format_date, Alert, AlertRequest, Notification, StatisticsRequest,
        WeatherReport, WeatherStatistics,
    },
};

/// Thin wrapper over the dashboard HTTP API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check(endpoint: &'static str, res: Response) -> Result<Response, ApiError> {
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint,
                status,
                body,
            });
        }
        Ok(res)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        res: Response,
    ) -> Result<T, ApiError> {
        let res = Self::check(endpoint, res).await?;
        res.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }

    // ---------------- Alerts ----------------

    pub async fn create_alert(&self, request: &AlertRequest) -> Result<Alert, ApiError> {
        let res = self
            .http
            .post(self.url("/alerts"))
            .json(request)
            .send()
            .await?;

        Self::decode("create alert", res).await
    }

    /// Active alerts only; the server filters out disabled ones.
    pub async fn active_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let res = self.http.get(self.url("/alerts")).send().await?;

        Self::decode("list alerts", res).await
    }

    pub async fn update_alert_status(&self, alert_id: &str, active: bool) -> Result<(), ApiError> {
        let res = self
            .http
            .put(self.url(&format!("/alerts/{alert_id}/status")))
            .query(&[("active", active)])
            .send()
            .await?;

        Self::check("update alert status", res).await?;
        Ok(())
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let res = self
            .http
            .get(self.url("/alerts/notifications"))
            .send()
            .await?;

        Self::decode("list notifications", res).await
    }

    // ---------------- Weather ----------------

    pub async fn weather_report(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<WeatherReport, ApiError> {
        let date = format_date(date);
        let res = self
            .http
            .get(self.url("/weather/report"))
            .query(&[("location", location), ("date", date.as_str())])
            .send()
            .await?;

        Self::decode("weather report", res).await
    }

    pub async fn weekly_forecast(
        &self,
        location: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<WeatherReport>, ApiError> {
        let start = format_date(start_date);
        let res = self
            .http
            .get(self.url("/weather/forecast"))
            .query(&[("location", location), ("startDate", start.as_str())])
            .send()
            .await?;

        Self::decode("weekly forecast", res).await
    }

    pub async fn calculate_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<WeatherStatistics, ApiError> {
        let res = self
            .http
            .post(self.url("/statistics"))
            .json(request)
            .send()
            .await?;

        Self::decode("statistics", res).await
    }

    // ---------------- Storage ----------------

    /// Cache size in megabytes.
    pub async fn cache_size(&self) -> Result<f64, ApiError> {
        let res = self
            .http
            .get(self.url("/storage/cache/size"))
            .send()
            .await?;

        Self::decode("cache size", res).await
    }

    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        let res = self
            .http
            .post(self.url("/storage/cache/clear"))
            .send()
            .await?;

        Self::check("clear cache", res).await?;
        Ok(())
    }
}
