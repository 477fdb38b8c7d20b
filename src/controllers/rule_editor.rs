use crate::{
    error::{AlertError, EditorError, LocationError},
    models::{
        Alert, AlertRequest, Combinator, ConditionDraft, Location, Operator, Parameter,
    },
    services::{api_client::ApiClient, geolocation::LocationProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionField {
    Parameter,
    Operator,
    Threshold,
}

/// In-memory builder for a new alert.
///
/// Always holds at least one condition. The device location is resolved
/// once by [`RuleEditor::resolve_location`] and never retried.
#[derive(Debug, Clone)]
pub struct RuleEditor {
    conditions: Vec<ConditionDraft>,
    combinator: Combinator,
    location: Option<Location>,
    location_error: Option<LocationError>,
}

impl Default for RuleEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEditor {
    pub fn new() -> Self {
        Self {
            conditions: vec![ConditionDraft::default()],
            combinator: Combinator::default(),
            location: None,
            location_error: None,
        }
    }

    pub fn resolve_location(
        &mut self,
        provider: &dyn LocationProvider,
    ) -> Result<Location, LocationError> {
        match provider.current_location() {
            Ok(loc) => {
                self.location = Some(loc);
                self.location_error = None;
                Ok(loc)
            }
            Err(e) => {
                tracing::error!("geolocation error: {}", e);
                self.location = None;
                self.location_error = Some(e);
                Err(e)
            }
        }
    }

    pub fn conditions(&self) -> &[ConditionDraft] {
        &self.conditions
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn location_error(&self) -> Option<LocationError> {
        self.location_error
    }

    pub fn add_condition(&mut self) {
        self.conditions.push(ConditionDraft::default());
    }

    /// Returns false when nothing was removed: the last remaining condition
    /// stays, and out-of-range indexes are ignored.
    pub fn remove_condition(&mut self, index: usize) -> bool {
        if self.conditions.len() <= 1 || index >= self.conditions.len() {
            return false;
        }
        self.conditions.remove(index);
        true
    }

    pub fn update_condition(
        &mut self,
        index: usize,
        field: ConditionField,
        value: &str,
    ) -> Result<(), EditorError> {
        let cond = self
            .conditions
            .get_mut(index)
            .ok_or(EditorError::NoSuchCondition(index))?;

        match field {
            ConditionField::Parameter => {
                cond.parameter = parse_optional(value, "parameter", Parameter::parse)?;
            }
            ConditionField::Operator => {
                cond.operator = parse_optional(value, "operator", Operator::parse)?;
            }
            ConditionField::Threshold => cond.threshold = coerce_threshold(value),
        }
        Ok(())
    }

    pub fn set_combinator(&mut self, combinator: Combinator) {
        self.combinator = combinator;
    }

    pub fn can_submit(&self) -> bool {
        self.conditions.iter().all(ConditionDraft::is_complete)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        self.request().map(|_| ())
    }

    /// Validates and builds the request that `submit` would send.
    pub fn request(&self) -> Result<AlertRequest, EditorError> {
        let conditions = self
            .conditions
            .iter()
            .map(ConditionDraft::to_condition)
            .collect::<Option<Vec<_>>>()
            .ok_or(EditorError::IncompleteConditions)?;

        if let Some(i) = conditions.iter().position(|c| !c.threshold.is_finite()) {
            return Err(EditorError::InvalidThreshold(i));
        }

        let location = self.location.ok_or(EditorError::MissingLocation)?;

        Ok(AlertRequest {
            conditions,
            combinator: self.combinator,
            location,
        })
    }

    /// Creates the alert. On success the editor goes back to a single blank
    /// condition; on failure its input is left as it was.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Alert, AlertError> {
        let request = self.request()?;

        let alert = api
            .create_alert(&request)
            .await
            .map_err(AlertError::SaveFailed)?;

        self.reset();
        Ok(alert)
    }

    pub fn reset(&mut self) {
        self.conditions = vec![ConditionDraft::default()];
    }
}

fn parse_optional<T>(
    value: &str,
    field: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, EditorError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).ok_or_else(|| EditorError::UnknownValue {
        field,
        value: value.to_string(),
    })
}

// Blank input reads as zero; anything unparseable becomes NaN and is
// rejected by validation.
fn coerce_threshold(value: &str) -> f64 {
    let v = value.trim();
    if v.is_empty() {
        return 0.0;
    }
    v.parse::<f64>().unwrap_or(f64::NAN)
}
