pub mod alert;
pub mod condition;
pub mod notification;
pub mod weather;

pub use alert::{Alert, AlertRequest, Location};
pub use condition::{Combinator, Condition, ConditionDraft, Operator, Parameter};
pub use notification::{LiveMessage, Notification};
pub use weather::{Metric, StatisticsRequest, WeatherReport, WeatherStatistics, DATE_FORMAT};
