use chrono::{Days, Local, NaiveDate};

use crate::{models::WeatherReport, services::api_client::ApiClient};

pub const FORECAST_FAILED: &str = "Failed to fetch forecast";

const FORECAST_DAYS: u64 = 7;

pub struct ForecastView {
    api: ApiClient,
    pub location: String,
    pub selected_date: NaiveDate,
    weekly: Vec<WeatherReport>,
    report: Option<WeatherReport>,
    error: Option<String>,
}

impl ForecastView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            location: String::new(),
            selected_date: Local::now().date_naive(),
            weekly: Vec::new(),
            report: None,
            error: None,
        }
    }

    pub fn weekly(&self) -> &[WeatherReport] {
        &self.weekly
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Short weekday names for the seven days starting at the selected date.
    pub fn day_labels(&self) -> Vec<String> {
        (0..FORECAST_DAYS)
            .filter_map(|i| self.selected_date.checked_add_days(Days::new(i)))
            .map(|d| d.format("%a").to_string())
            .collect()
    }

    /// Loads the week starting at the selected date plus that day's report.
    /// Does nothing without a location; a failed call keeps its old data.
    pub async fn load(&mut self) {
        let location = self.location.trim().to_string();
        if location.is_empty() {
            return;
        }

        tracing::info!("fetching forecast for {} from {}", location, self.selected_date);

        let (weekly, report) = tokio::join!(
            self.api.weekly_forecast(&location, self.selected_date),
            self.api.weather_report(&location, self.selected_date),
        );

        let mut failed = false;
        match weekly {
            Ok(days) => {
                if days.len() != FORECAST_DAYS as usize {
                    tracing::warn!("forecast returned {} days", days.len());
                }
                self.weekly = days;
            }
            Err(e) => {
                tracing::error!("error fetching forecast: {}", e);
                failed = true;
            }
        }
        match report {
            Ok(r) => self.report = Some(r),
            Err(e) => {
                tracing::error!("error fetching weather report: {}", e);
                failed = true;
            }
        }

        self.error = failed.then(|| FORECAST_FAILED.to_string());
    }
}
