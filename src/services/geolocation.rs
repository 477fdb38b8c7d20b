use crate::{config::Settings, error::LocationError, models::Location};

/// Source of the device position, consulted once when an editor mounts.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> Result<Location, LocationError>;
}

/// Fixed position, typically from configuration. `None` behaves like a
/// device without geolocation support.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocation(pub Option<Location>);

impl StaticLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self(Some(Location { latitude, longitude }))
    }

    pub fn unsupported() -> Self {
        Self(None)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self(settings.device_location)
    }
}

impl LocationProvider for StaticLocation {
    fn current_location(&self) -> Result<Location, LocationError> {
        self.0.ok_or(LocationError::Unsupported)
    }
}

/// A provider whose permission prompt was refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

impl LocationProvider for DeniedLocation {
    fn current_location(&self) -> Result<Location, LocationError> {
        Err(LocationError::Denied)
    }
}
