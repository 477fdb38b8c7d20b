use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date format used for every date exchanged with the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub date: NaiveDate,
    pub high_temp: f64,
    pub low_temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_direction: Option<String>,
    pub precipitation_chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "temps")]
    Temperature,
    #[serde(rename = "precipitate")]
    Precipitation,
    #[serde(rename = "wind")]
    Wind,
    #[serde(rename = "humidity")]
    Humidity,
}

impl Metric {
    pub fn id(&self) -> &'static str {
        match self {
            Metric::Temperature => "temps",
            Metric::Precipitation => "precipitate",
            Metric::Wind => "wind",
            Metric::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherStatistics {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub average_temperature: f64,
    pub average_precipitation: f64,
    pub average_wind_speed: f64,
    pub average_humidity: f64,
    pub calculated: NaiveDateTime,
}
