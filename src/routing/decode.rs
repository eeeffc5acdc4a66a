//! Percent decoding and lexical path cleaning.
//!
//! # Design Decisions
//! - Only captured parameter values are decoded; patterns are matched
//!   against the still-encoded request path
//! - Inputs without `%` are returned borrowed
//! - Decoded bytes that are not UTF-8 are replaced, the escape syntax is
//!   the only thing that can fail

use std::borrow::Cow;

use crate::routing::error::DecodeError;

fn dehex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode every `%XX` triple in `s`.
pub fn percent_decode(s: &str) -> Result<Cow<'_, str>, DecodeError> {
    if !s.contains('%') {
        return Ok(Cow::Borrowed(s));
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c != b'%' {
            out.push(c);
            i += 1;
            continue;
        }
        if i + 2 >= bytes.len() {
            return Err(DecodeError::TruncatedEscape(i));
        }
        let hi = dehex(bytes[i + 1]).ok_or(DecodeError::InvalidHexDigit(i + 1))?;
        let lo = dehex(bytes[i + 2]).ok_or(DecodeError::InvalidHexDigit(i + 2))?;
        out.push(hi << 4 | lo);
        i += 3;
    }

    Ok(Cow::Owned(String::from_utf8_lossy(&out).into_owned()))
}

/// Lexically clean a slash-separated path.
///
/// Repeated separators collapse, `.` elements vanish and `..` removes the
/// preceding element. A rooted path never climbs above `/`. The empty path
/// cleans to `.`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if !rooted => parts.push(".."),
                _ => {}
            },
            s => parts.push(s),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        let cases = [
            ("a", Some("a")),
            ("a/b", Some("a/b")),
            ("a%2fb", Some("a/b")),
            ("a%2Fb", Some("a/b")),
            ("a%2F", Some("a/")),
            ("%41%42c", Some("ABc")),
            ("a%2", None),
            ("%", None),
            ("%zz", None),
            ("a%g1", None),
        ];
        for (input, want) in cases {
            let got = percent_decode(input).ok();
            assert_eq!(got.as_deref(), want, "decode({:?})", input);
        }
    }

    #[test]
    fn test_percent_decode_borrows_without_escapes() {
        assert!(matches!(percent_decode("plain/text"), Ok(Cow::Borrowed("plain/text"))));
    }

    #[test]
    fn test_percent_decode_error_positions() {
        assert_eq!(percent_decode("ab%4"), Err(DecodeError::TruncatedEscape(2)));
        assert_eq!(percent_decode("%4x"), Err(DecodeError::InvalidHexDigit(2)));
    }

    #[test]
    fn test_percent_decode_multibyte() {
        assert_eq!(percent_decode("caf%C3%A9").unwrap(), "café");
    }

    fn encode(s: &str, upper: bool) -> String {
        s.bytes()
            .map(|b| if upper { format!("%{:02X}", b) } else { format!("%{:02x}", b) })
            .collect()
    }

    #[test]
    fn test_decode_inverts_encode() {
        for c in (0u32..0x3000).step_by(7).chain([0x1F600, 0x10FFFF]).filter_map(char::from_u32) {
            let s = format!("a{}/{}b", c, c);
            for upper in [true, false] {
                let encoded = encode(&s, upper);
                assert_eq!(percent_decode(&encoded).unwrap(), s, "decode({:?})", encoded);
            }
        }
    }

    #[test]
    fn test_every_byte_escape_decodes() {
        for b in 0u8..=0x7f {
            let input = format!("%{:02X}", b);
            let decoded = percent_decode(&input).unwrap();
            assert_eq!(decoded.as_bytes(), [b]);
        }
        // A lone byte above 0x7f is not UTF-8 and decodes lossily.
        for b in 0x80u8..=0xff {
            assert_eq!(percent_decode(&format!("%{:02x}", b)).unwrap(), "\u{FFFD}");
        }
    }

    #[test]
    fn test_escape_free_strings_decode_to_themselves() {
        let alphabet: Vec<char> = (' '..='~').filter(|c| *c != '%').chain(['é', '世', '🦀']).collect();
        for (i, start) in alphabet.iter().enumerate() {
            let s: String = alphabet.iter().cycle().skip(i).take(1 + i % 13).collect();
            assert!(s.starts_with(*start));
            assert!(matches!(percent_decode(&s), Ok(Cow::Borrowed(d)) if d == s));
        }
    }

    #[test]
    fn test_clean_path() {
        let cases = [
            ("", "."),
            ("/", "/"),
            ("//", "/"),
            ("/a/b", "/a/b"),
            ("/a//b", "/a/b"),
            ("/a/./b", "/a/b"),
            ("/a/../b", "/b"),
            ("/../a", "/a"),
            ("/a/b/..", "/a"),
            ("/a/b/", "/a/b"),
            ("a/../..", ".."),
            ("a/./b", "a/b"),
            ("..", ".."),
        ];
        for (input, want) in cases {
            assert_eq!(clean_path(input), want, "clean({:?})", input);
        }
    }
}
