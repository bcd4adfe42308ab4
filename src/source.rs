use crate::error::{Result, SourceError};
use crate::header::Header;
use crate::properties::{Properties, PropertyDefaults};
use chrono::{NaiveDateTime, Timelike};

/// One instrument's header dialect: a detection predicate plus a normalizer.
///
/// Implementations hold no state. Both methods are pure functions of their
/// arguments and may be called from any number of threads at once.
pub trait DataSource: Send + Sync {
    /// Short label used in logs, e.g. `"AIA"`.
    fn label(&self) -> &'static str;

    /// Whether `header` was produced by this instrument.
    ///
    /// A missing detection keyword is an error, not a `false`; the registry
    /// decides whether to move on to the next source.
    fn is_datasource_for(&self, header: &Header) -> Result<bool>;

    /// Normalize `header` over the container's defaults.
    fn properties(&self, header: &Header, defaults: &dyn PropertyDefaults) -> Result<Properties>;
}

/// Width of the `DATE-OBS` prefix that is parsed. Anything past it (extra
/// fractional digits, the trailing `Z` of pre-2010-12-07 headers) is dropped.
pub const DATE_OBS_WIDTH: usize = 22;

const DATE_OBS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an observation timestamp of the form `YYYY-MM-DDTHH:MM:SS.ffffff`
/// after truncating it to its first [`DATE_OBS_WIDTH`] characters.
///
/// The fractional part is mandatory and holds 1 to 6 digits.
pub fn parse_observation_date(raw: &str) -> Result<NaiveDateTime> {
    let truncated: String = raw.chars().take(DATE_OBS_WIDTH).collect();
    let invalid = |reason: &str| SourceError::InvalidDate {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (_, fraction) = truncated
        .rsplit_once('.')
        .ok_or_else(|| invalid("missing fractional seconds"))?;
    if fraction.is_empty() || fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("fractional seconds must be 1 to 6 digits"));
    }

    let date = NaiveDateTime::parse_from_str(&truncated, DATE_OBS_FORMAT)
        .map_err(|e| invalid(&e.to_string()))?;
    // chrono folds a `:60` leap second into nanoseconds past 1e9
    if date.nanosecond() >= 1_000_000_000 {
        return Err(invalid("second must be in 0..=59"));
    }
    Ok(date)
}
