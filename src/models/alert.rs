use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::condition::{Combinator, Condition};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `POST /alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub conditions: Vec<Condition>,
    pub combinator: Combinator,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub active: bool,
    pub conditions: Vec<Condition>,
    pub combinator: Combinator,

    // server local time, no offset
    pub created: NaiveDateTime,
}
