//! Parsing of a single `key;value` line.

use memchr::memchr;

use crate::error::RowError;

/// Splits a line (without its trailing `\n`) into its key and value in tenths.
///
/// The key is returned as raw bytes; any encoding is accepted.
pub fn parse_line(line: &[u8]) -> Result<(&[u8], i64), RowError> {
    if line.is_empty() {
        return Err(RowError::Empty);
    }
    let sep = memchr(b';', line).ok_or(RowError::MissingDelimiter)?;
    let (key, rest) = (&line[..sep], &line[sep + 1..]);
    if memchr(b';', rest).is_some() {
        return Err(RowError::ExtraDelimiter);
    }
    let value = rest.strip_suffix(b"\r").unwrap_or(rest);
    Ok((key, parse_tenths(value)?))
}

/// Parses `-?[0-9]+\.[0-9]` into an integer number of tenths.
pub fn parse_tenths(value: &[u8]) -> Result<i64, RowError> {
    let invalid = || RowError::InvalidValue(String::from_utf8_lossy(value).into_owned());

    let (negative, digits) = match value.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, value),
    };
    let [whole @ .., b'.', frac] = digits else {
        return Err(invalid());
    };
    if whole.is_empty() || !whole.iter().all(u8::is_ascii_digit) || !frac.is_ascii_digit() {
        return Err(invalid());
    }

    let whole: i64 = lexical_core::parse(whole).map_err(|_| invalid())?;
    let tenths = whole
        .checked_mul(10)
        .and_then(|t| t.checked_add(i64::from(frac - b'0')))
        .ok_or_else(invalid)?;
    Ok(if negative { -tenths } else { tenths })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_ten() {
        assert_eq!(parse_tenths(b"12.3"), Ok(123));
        assert_eq!(parse_tenths(b"0.0"), Ok(0));
        assert_eq!(parse_tenths(b"-0.5"), Ok(-5));
        assert_eq!(parse_tenths(b"-99.9"), Ok(-999));
        assert_eq!(parse_tenths(b"007.1"), Ok(71));
    }

    #[test]
    fn rejects_other_number_shapes() {
        let cases: &[&[u8]] = &[
            b"",
            b"12",
            b"1.23",
            b".5",
            b"5.",
            b"-",
            b"+1.0",
            b"1e1.0",
            b" 1.0",
            b"--1.0",
            b"99999999999999999999.9",
        ];
        for bad in cases {
            assert!(
                matches!(parse_tenths(bad), Err(RowError::InvalidValue(_))),
                "{:?} should be rejected",
                String::from_utf8_lossy(bad)
            );
        }
    }

    #[test]
    fn splits_key_and_value() {
        assert_eq!(parse_line(b"Paris;12.3"), Ok((&b"Paris"[..], 123)));
        assert_eq!(
            parse_line(b"St. John's;-4.0\r"),
            Ok((&b"St. John's"[..], -40))
        );
        assert_eq!(parse_line(b";1.0"), Ok((&b""[..], 10)));
    }

    #[test]
    fn keeps_non_utf8_keys_verbatim() {
        assert_eq!(parse_line(b"Z\xfcrich;1.0"), Ok((&b"Z\xfcrich"[..], 10)));
        assert_eq!(parse_line(b"\xff\xfe;-0.1"), Ok((&b"\xff\xfe"[..], -1)));
    }

    #[test]
    fn classifies_malformed_rows() {
        assert_eq!(parse_line(b""), Err(RowError::Empty));
        assert_eq!(parse_line(b"onlyonefield"), Err(RowError::MissingDelimiter));
        assert_eq!(parse_line(b"a;1.0;2.0"), Err(RowError::ExtraDelimiter));
        assert_eq!(
            parse_line(b"Paris;warm"),
            Err(RowError::InvalidValue("warm".into()))
        );
    }
}
