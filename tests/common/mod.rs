//! Shared fixtures for the integration harnesses.
//!
//! Headers mirror real SDO level-1 keyword values (abridged to the cards the
//! data sources read, plus a few they must ignore).

#![allow(dead_code)]

use sdosource::Header;

pub const DATE_OBS: &str = "2011-06-07T06:33:02.880000";

pub fn aia_header(wavelength: i64) -> Header {
    let mut h = Header::new();
    h.insert("TELESCOP", "SDO/AIA");
    h.insert("INSTRUME", "AIA_3");
    h.insert("DATE-OBS", DATE_OBS);
    h.insert("WAVELNTH", wavelength);
    h.insert("WAVEUNIT", "angstrom");
    h.insert("RSUN_OBS", 945.436f64);
    h.insert("EXPTIME", 1.999601f64);
    h
}

pub fn hmi_header(content: &str) -> Header {
    let mut h = Header::new();
    h.insert("TELESCOP", "SDO/HMI");
    h.insert("INSTRUME", "HMI_FRONT2");
    h.insert("DATE-OBS", DATE_OBS);
    h.insert("CONTENT", content);
    h.insert("RSUN_OBS", 945.6f64);
    h.insert("WAVELNTH", 6173.0f64);
    h
}

/// Render `cards` as a single FITS header unit (END appended, block padded).
pub fn header_unit(cards: &[&str]) -> Vec<u8> {
    let mut s: String = cards.iter().map(|c| format!("{c:<80}")).collect();
    s.push_str(&format!("{:<80}", "END"));
    while s.len() % 2880 != 0 {
        s.push(' ');
    }
    s.into_bytes()
}
