//! Input decoding.
//!
//! The encoding comes from the byte-order mark if there is one, otherwise
//! from the byte pattern of a UTF-16 `<?`, otherwise from the `encoding`
//! pseudo-attribute of the XML declaration. Without any of these the input
//! is UTF-8. Bytes that are not valid in the chosen encoding make the
//! document malformed; nothing is replaced.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::MalformedXml;

/// Decode `bytes` to text, with any byte-order mark removed.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, MalformedXml> {
    let (encoding, body) = detect(bytes)?;
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| MalformedXml::Encoding {
            encoding: encoding.name().to_string(),
        })
}

fn detect(bytes: &[u8]) -> Result<(&'static Encoding, &[u8]), MalformedXml> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return Ok((encoding, &bytes[bom_len..]));
    }
    if bytes.starts_with(&[0x3C, 0x00, 0x3F, 0x00]) {
        return Ok((UTF_16LE, bytes));
    }
    if bytes.starts_with(&[0x00, 0x3C, 0x00, 0x3F]) {
        return Ok((UTF_16BE, bytes));
    }

    let Some(label) = declared_encoding(bytes) else {
        return Ok((UTF_8, bytes));
    };
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| MalformedXml::UnsupportedEncoding(label.to_string()))?;
    if encoding == UTF_16LE || encoding == UTF_16BE {
        // An ASCII-compatible declaration cannot be UTF-16.
        return Err(MalformedXml::Encoding {
            encoding: label.to_string(),
        });
    }
    Ok((encoding, bytes))
}

/// The `encoding` value of a leading `<?xml ...?>`, read as ASCII.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let rest = bytes.strip_prefix(b"<?xml")?;
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&rest[..end]).ok()?;
    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    Some(&value[..value.find(quote)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utf8() {
        assert_eq!(decode(b"<a>\xc3\xa9</a>").unwrap(), "<a>é</a>");
    }

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode(b"\xef\xbb\xbf<a/>").unwrap(), "<a/>");
    }

    #[test]
    fn declared_latin1() {
        let doc = b"<?xml version='1.0' encoding='ISO-8859-1'?><a>\xe9</a>";
        assert!(decode(doc).unwrap().ends_with("<a>é</a>"));
    }

    #[test]
    fn utf16_without_bom() {
        let bytes: Vec<u8> = "<?xml version=\"1.0\"?><a/>"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        assert!(decode(&bytes).unwrap().ends_with("<a/>"));
    }

    #[test]
    fn reads_declared_label() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding = \"windows-1252\" ?>"),
            Some("windows-1252")
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(declared_encoding(b"<a encoding=\"x\"/>"), None);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = decode(b"<?xml version=\"1.0\" encoding=\"x-unknown\"?><a/>").unwrap_err();
        assert!(matches!(err, MalformedXml::UnsupportedEncoding(ref l) if l == "x-unknown"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            decode(b"<a\xff/>"),
            Err(MalformedXml::Encoding { .. })
        ));
    }

    #[test]
    fn utf16_label_on_ascii_bytes_is_rejected() {
        assert!(decode(b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>").is_err());
    }
}
