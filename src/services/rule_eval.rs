//! Local evaluation of alert rules against a weather report, and the text
//! the alert service puts into notifications when a rule fires.

use std::fmt::Write;

use crate::models::{Combinator, Condition, Operator, Parameter, WeatherReport};

const EQUAL_TOLERANCE: f64 = 0.01;

pub fn parameter_value(parameter: Parameter, report: &WeatherReport) -> f64 {
    match parameter {
        Parameter::Temperature => report.high_temp,
        Parameter::Precipitation => report.precipitation_chance,
        Parameter::Wind => report.wind_speed,
        Parameter::Humidity => report.humidity,
    }
}

pub fn condition_matches(condition: &Condition, report: &WeatherReport) -> bool {
    let value = parameter_value(condition.parameter, report);
    match condition.operator {
        Operator::GreaterThan => value > condition.threshold,
        Operator::LessThan => value < condition.threshold,
        Operator::Equal => (value - condition.threshold).abs() < EQUAL_TOLERANCE,
    }
}

/// An empty AND rule holds vacuously; an empty OR rule never does.
pub fn evaluate(conditions: &[Condition], combinator: Combinator, report: &WeatherReport) -> bool {
    match combinator {
        Combinator::And => conditions.iter().all(|c| condition_matches(c, report)),
        Combinator::Or => conditions.iter().any(|c| condition_matches(c, report)),
    }
}

/// `temperature > 30 AND wind < 10`
pub fn describe(conditions: &[Condition], combinator: Combinator) -> String {
    let parts: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
    parts.join(&format!(" {combinator} "))
}

pub fn format_alert_message(
    conditions: &[Condition],
    combinator: Combinator,
    report: &WeatherReport,
) -> String {
    let mut msg = String::from("Weather Alert: ");
    for (i, c) in conditions.iter().enumerate() {
        if i > 0 {
            let _ = write!(msg, " {combinator} ");
        }
        let _ = write!(
            msg,
            "{} {} {:.1} (Current value: {:.1})",
            c.parameter,
            c.operator,
            c.threshold,
            parameter_value(c.parameter, report)
        );
    }
    msg
}
