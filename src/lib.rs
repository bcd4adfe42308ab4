//! Detect Solar Dynamics Observatory image headers and normalize them into the
//! property set a generic solar map is built from.
//!
//! ```
//! use sdosource::{Header, SourceRegistry};
//!
//! let mut header = Header::new();
//! header.insert("TELESCOP", "SDO/AIA");
//! header.insert("DATE-OBS", "2011-06-07T06:33:02.880000");
//! header.insert("WAVELNTH", 171i64);
//! header.insert("RSUN_OBS", 945.436f64);
//!
//! let props = SourceRegistry::sdo().properties(&header).unwrap();
//! assert_eq!(props.name(), Some("AIA 171"));
//! ```

pub mod config;
pub mod error;
pub mod fits;
pub mod header;
pub mod properties;
pub mod registry;
pub mod sdo;
pub mod source;

pub use error::{Result, SourceError};
pub use header::{Header, HeaderValue};
pub use properties::{BaseMapDefaults, Normalization, Properties, PropertyDefaults, PropertyKey, PropertyValue};
pub use registry::SourceRegistry;
pub use sdo::{Aia, Hmi};
pub use source::{parse_observation_date, DataSource};
