//! Wire encoding.
//!
//! Integers travel as lowercase hex text terminated by `\n`. Binary payloads travel
//! as an 8-byte little-endian length followed by exactly that many bytes.

use std::io::{BufRead, Read, Write};

use num_bigint_dig::BigUint;

use crate::error::{Error, Result};
use crate::group::params::parse_hex;

pub const LENGTH_PREFIX_LEN: usize = 8;

/// Hex text plus the delimiter, exactly as written to the socket.
pub fn encode_value(value: &BigUint) -> String {
    let mut line = value.to_str_radix(16);
    line.push('\n');
    line
}

pub fn write_value<W: Write>(w: &mut W, value: &BigUint, during: &'static str) -> Result<()> {
    w.write_all(encode_value(value).as_bytes())
        .and_then(|_| w.flush())
        .map_err(|e| Error::transport(during, e))
}

/// Read one delimited hex value. Lines longer than `max_len` hex digits are rejected
/// without buffering the rest.
pub fn read_value<R: BufRead>(r: &mut R, max_len: usize, during: &'static str) -> Result<BigUint> {
    let mut buf = Vec::new();
    let limit = max_len as u64 + 2; // digits, optional '\r', '\n'
    let n = r
        .by_ref()
        .take(limit)
        .read_until(b'\n', &mut buf)
        .map_err(|e| Error::transport(during, e))?;

    if n == 0 {
        return Err(Error::ConnectionClosed { during });
    }
    if buf.last() != Some(&b'\n') {
        if n as u64 >= limit {
            return Err(Error::malformed("wire value", "line exceeds length limit"));
        }
        return Err(Error::ConnectionClosed { during });
    }

    let digits = buf
        .strip_suffix(b"\n")
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .unwrap_or(&buf[..]);
    if digits.len() > max_len {
        return Err(Error::malformed("wire value", "line exceeds length limit"));
    }

    let text = std::str::from_utf8(digits)
        .map_err(|_| Error::malformed("wire value", "not valid UTF-8"))?;
    parse_hex("wire value", text)
}

pub fn write_blob<W: Write>(w: &mut W, data: &[u8], during: &'static str) -> Result<()> {
    let len = (data.len() as u64).to_le_bytes();
    w.write_all(&len)
        .and_then(|_| w.write_all(data))
        .and_then(|_| w.flush())
        .map_err(|e| Error::transport(during, e))
}

/// Read a length-prefixed payload, refusing lengths above `max_len` before allocating.
pub fn read_blob<R: Read>(r: &mut R, max_len: u64, during: &'static str) -> Result<Vec<u8>> {
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    r.read_exact(&mut prefix)
        .map_err(|e| Error::transport(during, e))?;
    let len = u64::from_le_bytes(prefix);
    if len > max_len {
        return Err(Error::PayloadTooLarge { len, max: max_len });
    }

    let mut data = vec![0u8; len as usize];
    r.read_exact(&mut data)
        .map_err(|e| Error::transport(during, e))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_value() {
        assert_eq!(encode_value(&BigUint::from(0xBEEFu32)), "beef\n");
        assert_eq!(encode_value(&BigUint::from(0u32)), "0\n");
    }

    #[test]
    fn test_values_back_to_back() {
        let mut out = Vec::new();
        write_value(&mut out, &BigUint::from(255u32), "sending").unwrap();
        write_value(&mut out, &BigUint::from(4096u32), "sending").unwrap();
        assert_eq!(out, b"ff\n1000\n");

        let mut r = Cursor::new(out);
        assert_eq!(read_value(&mut r, 64, "receiving").unwrap(), BigUint::from(255u32));
        assert_eq!(read_value(&mut r, 64, "receiving").unwrap(), BigUint::from(4096u32));
        assert!(matches!(
            read_value(&mut r, 64, "receiving"),
            Err(Error::ConnectionClosed { .. })
        ));
    }

    #[test]
    fn test_truncated_value() {
        let mut r = Cursor::new(b"abcdef".to_vec());
        assert!(matches!(
            read_value(&mut r, 64, "receiving"),
            Err(Error::ConnectionClosed { during: "receiving" })
        ));
    }

    #[test]
    fn test_garbled_value() {
        let mut r = Cursor::new(b"12xyz\n".to_vec());
        assert!(matches!(
            read_value(&mut r, 64, "receiving"),
            Err(Error::Malformed { .. })
        ));

        let mut r = Cursor::new(b"\n".to_vec());
        assert!(matches!(
            read_value(&mut r, 64, "receiving"),
            Err(Error::Malformed { .. })
        ));

        let mut r = Cursor::new(vec![0xff, 0xfe, b'\n']);
        assert!(matches!(
            read_value(&mut r, 64, "receiving"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_overlong_value() {
        let mut line = "f".repeat(100);
        line.push('\n');
        let mut r = Cursor::new(line.into_bytes());
        assert!(matches!(
            read_value(&mut r, 16, "receiving"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_length_limit_counts_digits_only() {
        let mut r = Cursor::new(b"ffff\n".to_vec());
        assert_eq!(read_value(&mut r, 4, "receiving").unwrap(), BigUint::from(0xffffu32));

        // One digit over the limit, with either line ending.
        for line in [&b"fffff\n"[..], &b"fffff\r\n"[..]] {
            let mut r = Cursor::new(line.to_vec());
            assert!(matches!(
                read_value(&mut r, 4, "receiving"),
                Err(Error::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_crlf_value() {
        let mut r = Cursor::new(b"1f\r\n".to_vec());
        assert_eq!(read_value(&mut r, 2, "receiving").unwrap(), BigUint::from(31u32));
    }

    #[test]
    fn test_blob() {
        let mut out = Vec::new();
        write_blob(&mut out, b"hello", "sending").unwrap();
        assert_eq!(&out[..8], &5u64.to_le_bytes());
        assert_eq!(&out[8..], b"hello");

        let mut r = Cursor::new(out);
        assert_eq!(read_blob(&mut r, 1024, "receiving").unwrap(), b"hello");
    }

    #[test]
    fn test_empty_blob() {
        let mut out = Vec::new();
        write_blob(&mut out, &[], "sending").unwrap();
        assert_eq!(out.len(), LENGTH_PREFIX_LEN);
        let mut r = Cursor::new(out);
        assert!(read_blob(&mut r, 1024, "receiving").unwrap().is_empty());
    }

    #[test]
    fn test_blob_limits() {
        let mut out = Vec::new();
        out.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut r = Cursor::new(out);
        assert!(matches!(
            read_blob(&mut r, 1024, "receiving"),
            Err(Error::PayloadTooLarge { max: 1024, .. })
        ));

        // Prefix promises more than arrives.
        let mut out = Vec::new();
        out.extend_from_slice(&10u64.to_le_bytes());
        out.extend_from_slice(b"abc");
        let mut r = Cursor::new(out);
        assert!(matches!(
            read_blob(&mut r, 1024, "receiving"),
            Err(Error::ConnectionClosed { .. })
        ));

        // Short prefix.
        let mut r = Cursor::new(vec![1u8, 2, 3]);
        assert!(matches!(
            read_blob(&mut r, 1024, "receiving"),
            Err(Error::ConnectionClosed { .. })
        ));
    }
}
