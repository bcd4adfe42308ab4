use crate::header::{Header, HeaderValue};
use anyhow::{bail, Context, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// FITS files are made of 2880-byte blocks.
pub const BLOCK_SIZE: usize = 2880;
/// Each header card is one 80-character ASCII record.
pub const CARD_SIZE: usize = 80;

/// Read the header of HDU `hdu_idx` (0 = primary) from `reader`.
///
/// The reader is rewound to the start of the file first, and every HDU before
/// `hdu_idx` is skipped over (header blocks plus data blocks).
pub fn read_header<R: Read + Seek>(reader: &mut R, hdu_idx: usize) -> Result<Header> {
    reader.seek(SeekFrom::Start(0)).context("rewinding FITS stream")?;

    let mut hdus_seen = 0usize;
    loop {
        let Some(header_bytes) = read_header_blocks(reader)? else {
            bail!("HDU {hdu_idx} not found: file has only {hdus_seen} HDU(s)");
        };
        let header = parse_cards(&header_bytes);
        if hdus_seen == hdu_idx {
            tracing::debug!(hdu = hdu_idx, cards = header.len(), "read FITS header");
            return Ok(header);
        }
        skip_data_unit(reader, &header)?;
        hdus_seen += 1;
    }
}

/// Locate the first HDU that carries image data.
///
/// That is either a primary/IMAGE HDU with a non-empty shape, or a
/// tile-compressed binary table (`ZIMAGE = T`), which is how SDO level-1
/// files are usually distributed.
pub fn find_image_hdu<R: Read + Seek>(reader: &mut R) -> Result<usize> {
    reader.seek(SeekFrom::Start(0)).context("rewinding FITS stream")?;

    let mut idx = 0usize;
    while let Some(header_bytes) = read_header_blocks(reader)? {
        let header = parse_cards(&header_bytes);
        if is_image_hdu(&header) {
            tracing::debug!(hdu = idx, "found image HDU");
            return Ok(idx);
        }
        skip_data_unit(reader, &header)?;
        idx += 1;
    }
    bail!("no image HDU found in file")
}

fn is_image_hdu(header: &Header) -> bool {
    if header.get("zimage").ok().and_then(HeaderValue::as_bool) == Some(true) {
        return true;
    }
    let is_image_ext = match header.get("xtension") {
        Ok(v) => v.as_str() == Some("IMAGE"),
        Err(_) => true, // primary HDU
    };
    let naxis = int_card(header, "naxis", 0);
    is_image_ext && naxis > 0 && (1..=naxis).all(|i| int_card(header, &format!("naxis{i}"), 0) > 0)
}

// ---------------------------------------------------------------------------
// Block reading
// ---------------------------------------------------------------------------

/// Read header blocks up to and including the one holding the `END` card.
/// Returns `None` on a clean end of file before the first block.
fn read_header_blocks<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut block = [0u8; BLOCK_SIZE];
    let mut header_bytes: Vec<u8> = Vec::new();

    loop {
        match reader.read_exact(&mut block) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof && header_bytes.is_empty() => {
                return Ok(None);
            }
            Err(e) => return Err(e).context("reading FITS header block"),
        }
        header_bytes.extend_from_slice(&block);
        if block.chunks_exact(CARD_SIZE).any(is_end_card) {
            return Ok(Some(header_bytes));
        }
    }
}

fn is_end_card(rec: &[u8]) -> bool {
    rec.starts_with(b"END") && rec[3..].iter().all(|&b| b == b' ')
}

/// Seek past the data unit described by `header`.
///
/// Size in bits is `|BITPIX| * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`,
/// padded to a whole number of blocks. `PCOUNT` covers the heap of
/// tile-compressed tables.
fn skip_data_unit<R: Seek>(reader: &mut R, header: &Header) -> Result<()> {
    let data_size = data_unit_size(header)?;
    if data_size > 0 {
        let offset = i64::try_from(data_size).context("FITS data unit too large")?;
        reader
            .seek(SeekFrom::Current(offset))
            .context("seeking past FITS data block")?;
    }
    Ok(())
}

/// Data-unit length in bytes, rounded up to whole blocks.
fn data_unit_size(header: &Header) -> Result<u64> {
    let naxis = int_card(header, "naxis", 0);
    if naxis == 0 {
        return Ok(0);
    }
    let bitpix = int_card(header, "bitpix", 8).unsigned_abs();
    let pcount = int_card(header, "pcount", 0).max(0) as u64;
    let gcount = int_card(header, "gcount", 1).max(1) as u64;

    let block = BLOCK_SIZE as u64;
    let bits = (1..=naxis)
        .try_fold(1u64, |npix, i| {
            npix.checked_mul(int_card(header, &format!("naxis{i}"), 0).max(0) as u64)
        })
        .and_then(|npix| npix.checked_add(pcount))
        .and_then(|elements| elements.checked_mul(gcount))
        .and_then(|elements| elements.checked_mul(bitpix));
    let Some(bits) = bits else {
        bail!("FITS data unit size overflows");
    };
    let Some(bytes) = (bits / 8 + u64::from(bits % 8 != 0)).checked_next_multiple_of(block) else {
        bail!("FITS data unit size overflows");
    };
    Ok(bytes)
}

fn int_card(header: &Header, key: &str, default: i64) -> i64 {
    header
        .get(key)
        .ok()
        .and_then(HeaderValue::as_i64)
        .unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Card parsing
// ---------------------------------------------------------------------------

/// Parse raw header bytes into a typed [`Header`].
///
/// Commentary cards (COMMENT, HISTORY, CONTINUE, blank) and cards without a
/// value indicator are skipped, as are cards with an undefined value.
pub fn parse_cards(header_bytes: &[u8]) -> Header {
    let mut header = Header::new();
    for rec in header_bytes.chunks_exact(CARD_SIZE) {
        if is_end_card(rec) {
            break;
        }
        let Ok(card) = std::str::from_utf8(rec) else {
            tracing::trace!("skipping non-ASCII header card");
            continue;
        };
        let card = card.trim_end();
        let (Some(key), Some(indicator), Some(raw)) = (card.get(..8), card.get(8..10), card.get(10..)) else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || matches!(key, "COMMENT" | "HISTORY" | "CONTINUE") || indicator != "= " {
            continue;
        }
        match parse_value(raw) {
            Some(value) => header.insert(key, value),
            None => tracing::trace!(key, "undefined header value"),
        }
    }
    header
}

/// A card's value field with any `/ comment` removed.
#[derive(Debug, PartialEq)]
enum ValueField<'a> {
    /// Quoted string, quotes removed and `''` unescaped.
    Quoted(String),
    /// Anything else, trimmed.
    Bare(&'a str),
}

/// Split the value off a card's value field. A `/` only starts the comment
/// outside a quoted string. Returns `None` for an undefined value.
fn split_value_field(field: &str) -> Option<ValueField<'_>> {
    let field = field.trim_start();
    if let Some(body) = field.strip_prefix('\'') {
        let mut text = String::with_capacity(body.len());
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    text.push('\'');
                }
                '\'' => break,
                _ => text.push(c),
            }
        }
        // Leading blanks are significant in FITS strings, trailing ones are not
        text.truncate(text.trim_end().len());
        return Some(ValueField::Quoted(text));
    }
    let bare = field.split('/').next().unwrap_or_default().trim();
    (!bare.is_empty()).then_some(ValueField::Bare(bare))
}

/// Type a card's value field.
fn parse_value(raw: &str) -> Option<HeaderValue> {
    let val = match split_value_field(raw)? {
        ValueField::Quoted(text) => return Some(HeaderValue::Str(text)),
        ValueField::Bare(val) => val,
    };

    match val {
        "T" => return Some(HeaderValue::Bool(true)),
        "F" => return Some(HeaderValue::Bool(false)),
        _ => {}
    }
    if let Ok(i) = val.parse::<i64>() {
        return Some(HeaderValue::Int(i));
    }
    // FORTRAN-style double exponents: 1.5D+03
    if let Ok(f) = val.replace(['D', 'd'], "E").parse::<f64>() {
        return Some(HeaderValue::Float(f));
    }
    Some(HeaderValue::Str(val.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn card(text: &str) -> String {
        format!("{text:<80}")
    }

    /// Pad a list of cards (END appended) to whole blocks.
    fn header_unit(cards: &[&str]) -> Vec<u8> {
        let mut s: String = cards.iter().map(|c| card(c)).collect();
        s.push_str(&card("END"));
        while s.len() % BLOCK_SIZE != 0 {
            s.push(' ');
        }
        s.into_bytes()
    }

    #[test]
    fn parses_typed_values() {
        let bytes = header_unit(&[
            "SIMPLE  =                    T / conforms to FITS",
            "TELESCOP= 'SDO/AIA '           / telescope",
            "WAVELNTH=                  171 / [Angstrom]",
            "RSUN_OBS=          945.4360352",
            "EXPTIME =           1.9996D+00",
            "ORIGIN  = 'O''Brien'",
            "COMMENT   this card is ignored",
            "HISTORY = not a keyword",
            "BLANK   =",
        ]);
        let header = parse_cards(&bytes);
        assert_eq!(header.get("simple").unwrap(), &HeaderValue::Bool(true));
        assert_eq!(header.get("telescop").unwrap(), &HeaderValue::from("SDO/AIA"));
        assert_eq!(header.get("wavelnth").unwrap(), &HeaderValue::Int(171));
        assert_eq!(header.get("rsun_obs").unwrap(), &HeaderValue::Float(945.4360352));
        assert_eq!(header.get("exptime").unwrap(), &HeaderValue::Float(1.9996));
        assert_eq!(header.get("origin").unwrap(), &HeaderValue::from("O'Brien"));
        assert!(!header.contains_key("comment"));
        assert!(!header.contains_key("history"));
        assert!(!header.contains_key("blank"));
    }

    #[test]
    fn slash_inside_string_is_not_a_comment() {
        assert_eq!(
            split_value_field(" 'SDO/HMI' / telescope"),
            Some(ValueField::Quoted("SDO/HMI".to_string()))
        );
        assert_eq!(split_value_field("171/[Angstrom]"), Some(ValueField::Bare("171")));
        assert_eq!(split_value_field("'  padded  '"), Some(ValueField::Quoted("  padded".to_string())));
        assert_eq!(split_value_field("'unterminated"), Some(ValueField::Quoted("unterminated".to_string())));
        assert_eq!(split_value_field("   / no value"), None);
    }

    #[test]
    fn finds_compressed_image_after_empty_primary() {
        let mut file = header_unit(&[
            "SIMPLE  =                    T",
            "BITPIX  =                   16",
            "NAXIS   =                    0",
        ]);
        // Compressed table: 8 bytes x 2 rows + 100-byte heap = one data block
        file.extend(header_unit(&[
            "XTENSION= 'BINTABLE'",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =                    8",
            "NAXIS2  =                    2",
            "PCOUNT  =                  100",
            "GCOUNT  =                    1",
            "ZIMAGE  =                    T",
            "TELESCOP= 'SDO/AIA'",
        ]));
        file.extend(vec![0u8; BLOCK_SIZE]);
        file.extend(header_unit(&["XTENSION= 'IMAGE'", "NAXIS   =                    0"]));

        let mut reader = Cursor::new(file);
        assert_eq!(find_image_hdu(&mut reader).unwrap(), 1);
        let header = read_header(&mut reader, 1).unwrap();
        assert_eq!(header.get_str("telescop").unwrap(), "SDO/AIA");
        let last = read_header(&mut reader, 2).unwrap();
        assert_eq!(last.get_str("xtension").unwrap(), "IMAGE");
    }

    #[test]
    fn primary_image_is_found_first() {
        let file = header_unit(&[
            "SIMPLE  =                    T",
            "NAXIS   =                    2",
            "NAXIS1  =                 4096",
            "NAXIS2  =                 4096",
        ]);
        assert_eq!(find_image_hdu(&mut Cursor::new(file)).unwrap(), 0);
    }

    #[test]
    fn out_of_range_hdu_is_an_error() {
        let file = header_unit(&["SIMPLE  =                    T", "NAXIS   =                    0"]);
        let err = read_header(&mut Cursor::new(file), 3).unwrap_err();
        assert!(err.to_string().contains("HDU 3 not found"));
    }

    #[test]
    fn oversized_data_unit_is_an_error() {
        let mut file = header_unit(&["SIMPLE  =                    T", "NAXIS   =                    0"]);
        file.extend(header_unit(&[
            "XTENSION= 'IMAGE'",
            "BITPIX  =                  -64",
            "NAXIS   =                    3",
            "NAXIS1  =           4294967296",
            "NAXIS2  =           4294967296",
            "NAXIS3  =                   16",
        ]));
        let mut reader = Cursor::new(file);
        assert_eq!(find_image_hdu(&mut reader).unwrap(), 1);
        let err = read_header(&mut reader, 2).unwrap_err();
        assert!(err.to_string().contains("overflows"), "unexpected error: {err:#}");
    }

    #[test]
    fn data_unit_size_rounds_to_blocks() {
        let header: Header = [("bitpix", 16i64), ("naxis", 2), ("naxis1", 100), ("naxis2", 100)]
            .into_iter()
            .collect();
        assert_eq!(data_unit_size(&header).unwrap(), 7 * BLOCK_SIZE as u64);
        let empty: Header = [("naxis", 0i64)].into_iter().collect();
        assert_eq!(data_unit_size(&empty).unwrap(), 0);
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut file = header_unit(&["SIMPLE  =                    T"]);
        file.truncate(BLOCK_SIZE / 2);
        assert!(read_header(&mut Cursor::new(file), 0).is_err());
    }
}
