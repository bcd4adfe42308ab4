//! Solar Dynamics Observatory data sources.
//!
//! - [`Aia`]: Atmospheric Imaging Assembly, keyed by wavelength.
//! - [`Hmi`]: Helioseismic and Magnetic Imager, keyed by content type.

use crate::error::Result;
use crate::header::Header;
use crate::properties::{Properties, PropertyDefaults, PropertyKey, PropertyValue};
use crate::source::{parse_observation_date, DataSource};

const OBSERVATORY: &str = "SDO";

// ---------------------------------------------------------------------------
// AIA
// ---------------------------------------------------------------------------

/// AIA image headers: `TELESCOP = 'SDO/AIA'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aia;

impl Aia {
    const TELESCOPE: &'static str = "SDO/AIA";
    const INSTRUMENT: &'static str = "AIA";
}

impl DataSource for Aia {
    fn label(&self) -> &'static str {
        Self::INSTRUMENT
    }

    fn is_datasource_for(&self, header: &Header) -> Result<bool> {
        // Exact, case-sensitive match; a non-string TELESCOP is simply not AIA.
        Ok(header.get("telescop")?.as_str() == Some(Self::TELESCOPE))
    }

    fn properties(&self, header: &Header, defaults: &dyn PropertyDefaults) -> Result<Properties> {
        let wavelength = header.get("wavelnth")?;
        let overrides = Properties::new()
            .with(PropertyKey::Date, parse_observation_date(header.get_str("date-obs")?)?)
            .with(PropertyKey::Detector, Self::INSTRUMENT)
            .with(PropertyKey::Instrument, Self::INSTRUMENT)
            .with(PropertyKey::Measurement, wavelength.clone())
            .with(PropertyKey::Observatory, OBSERVATORY)
            .with(PropertyKey::Name, format!("{} {wavelength}", Self::INSTRUMENT))
            .with(PropertyKey::SolarRadius, header.get("rsun_obs")?.clone());

        let mut properties = defaults.default_properties();
        properties.merge(overrides);
        tracing::debug!(map_name = properties.name(), "normalized AIA header");
        Ok(properties)
    }
}

// ---------------------------------------------------------------------------
// HMI
// ---------------------------------------------------------------------------

/// HMI image headers: `INSTRUME` starting with `HMI` (e.g. `HMI_FRONT2`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Hmi;

impl Hmi {
    const INSTRUMENT: &'static str = "HMI";

    /// Measurement name from `CONTENT`, e.g. `MAGNETOGRAM FULL-DISK` -> `magnetogram`.
    fn measurement(header: &Header) -> Result<String> {
        let content = header.get_str("content")?;
        Ok(content.split(' ').next().unwrap_or_default().to_lowercase())
    }
}

impl DataSource for Hmi {
    fn label(&self) -> &'static str {
        Self::INSTRUMENT
    }

    fn is_datasource_for(&self, header: &Header) -> Result<bool> {
        let instrument = header.get_str("instrume")?;
        Ok(instrument.starts_with(Self::INSTRUMENT))
    }

    fn properties(&self, header: &Header, defaults: &dyn PropertyDefaults) -> Result<Properties> {
        let measurement = Self::measurement(header)?;
        let overrides = Properties::new()
            // HMI data carries no colormap normalization.
            .with(PropertyKey::Normalization, PropertyValue::Null)
            .with(PropertyKey::Date, parse_observation_date(header.get_str("date-obs")?)?)
            .with(PropertyKey::Detector, Self::INSTRUMENT)
            .with(PropertyKey::Instrument, Self::INSTRUMENT)
            .with(PropertyKey::Name, format!("{} {measurement}", Self::INSTRUMENT))
            .with(PropertyKey::Measurement, measurement)
            .with(PropertyKey::Observatory, OBSERVATORY)
            .with(PropertyKey::SolarRadius, header.get("rsun_obs")?.clone());

        let mut properties = defaults.default_properties();
        properties.merge(overrides);
        tracing::debug!(map_name = properties.name(), "normalized HMI header");
        Ok(properties)
    }
}
