use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Temperature,
    Precipitation,
    Wind,
    Humidity,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::Temperature,
        Parameter::Precipitation,
        Parameter::Wind,
        Parameter::Humidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Precipitation => "precipitation",
            Parameter::Wind => "wind",
            Parameter::Humidity => "humidity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equal => "=",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            ">" => Some(Operator::GreaterThan),
            "<" => Some(Operator::LessThan),
            "=" => Some(Operator::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete comparison, as sent to and returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: Parameter,
    pub operator: Operator,
    pub threshold: f64,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.parameter, self.operator, self.threshold)
    }
}

/// A condition while it is being edited. Unset fields serialize as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConditionDraft {
    #[serde(serialize_with = "blank_if_unset")]
    pub parameter: Option<Parameter>,
    #[serde(serialize_with = "blank_if_unset")]
    pub operator: Option<Operator>,
    pub threshold: f64,
}

impl ConditionDraft {
    pub fn is_complete(&self) -> bool {
        self.parameter.is_some() && self.operator.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.parameter.is_none() && self.operator.is_none() && self.threshold == 0.0
    }

    pub fn to_condition(&self) -> Option<Condition> {
        Some(Condition {
            parameter: self.parameter?,
            operator: self.operator?,
            threshold: self.threshold,
        })
    }
}

fn blank_if_unset<S, T>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(v) => v.serialize(s),
        None => s.serialize_str(""),
    }
}
