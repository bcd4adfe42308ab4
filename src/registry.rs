//! Header-driven dispatch over the known data sources.

use crate::error::{Result, SourceError};
use crate::header::Header;
use crate::properties::{BaseMapDefaults, Properties, PropertyDefaults};
use crate::sdo::{Aia, Hmi};
use crate::source::DataSource;

/// Ordered set of data sources plus the defaults they normalize over.
///
/// Sources are asked in registration order; the first whose predicate holds
/// wins.
pub struct SourceRegistry {
    sources: Vec<Box<dyn DataSource>>,
    defaults: Box<dyn PropertyDefaults>,
}

impl SourceRegistry {
    /// An empty registry normalizing over `defaults`.
    pub fn new(defaults: impl PropertyDefaults + 'static) -> Self {
        Self {
            sources: Vec::new(),
            defaults: Box::new(defaults),
        }
    }

    /// AIA and HMI over the stock map defaults.
    pub fn sdo() -> Self {
        Self::sdo_with_defaults(BaseMapDefaults::default())
    }

    pub fn sdo_with_defaults(defaults: impl PropertyDefaults + 'static) -> Self {
        let mut registry = Self::new(defaults);
        registry.register(Aia);
        registry.register(Hmi);
        registry
    }

    pub fn register(&mut self, source: impl DataSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Find the source that produced `header`.
    ///
    /// A source whose detection keyword is absent is skipped. Any other
    /// predicate failure aborts the search.
    pub fn detect(&self, header: &Header) -> Result<&dyn DataSource> {
        for source in &self.sources {
            match source.is_datasource_for(header) {
                Ok(true) => {
                    tracing::debug!(source = source.label(), "header matched");
                    return Ok(source.as_ref());
                }
                Ok(false) => {
                    tracing::debug!(source = source.label(), "header did not match");
                }
                Err(SourceError::MissingKey(key)) => {
                    tracing::debug!(source = source.label(), %key, "detection keyword absent, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SourceError::NoMatchingSource)
    }

    /// Detect the source of `header` and normalize it.
    pub fn properties(&self, header: &Header) -> Result<Properties> {
        let source = self.detect(header)?;
        source.properties(header, self.defaults.as_ref())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::sdo()
    }
}
