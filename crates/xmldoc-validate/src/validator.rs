use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::chars::{is_name, is_xml_char, is_xml_whitespace};
use crate::encoding;
use crate::error::MalformedXml;
use crate::markup;

/// Stateless XML well-formedness checker.
///
/// Each check constructs its own parser, so a single `XmlValidator` may be
/// shared freely between threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlValidator;

impl XmlValidator {
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if `source` is well-formed XML.
    ///
    /// Never fails: any parse or read error yields `false` and the cause is
    /// logged.
    pub fn is_well_formed<R: BufRead>(&self, source: R) -> bool {
        match self.check(source) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "invalid XML");
                false
            }
        }
    }

    /// Returns `true` if the in-memory `bytes` are well-formed XML.
    pub fn is_well_formed_bytes(&self, bytes: &[u8]) -> bool {
        match self.check_bytes(bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "invalid XML");
                false
            }
        }
    }

    /// Returns `true` if the file at `path` is well-formed XML.
    ///
    /// A file that cannot be opened is reported as not well-formed.
    pub fn is_well_formed_file(&self, path: &Path) -> bool {
        let result = File::open(path)
            .map_err(MalformedXml::from)
            .and_then(|file| self.check(BufReader::new(file)));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid XML within file");
                false
            }
        }
    }

    /// Read `source` to the end and report the first well-formedness problem.
    pub fn check<R: BufRead>(&self, mut source: R) -> Result<(), MalformedXml> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        self.check_bytes(&bytes)
    }

    /// Report the first well-formedness problem in `bytes`.
    ///
    /// The input is decoded first (see the byte-order mark and the
    /// declaration's `encoding`), then every character, name, attribute list,
    /// and reference is checked on top of quick-xml's tag matching.
    pub fn check_bytes(&self, bytes: &[u8]) -> Result<(), MalformedXml> {
        let text = encoding::decode(bytes)?;
        if let Some((position, c)) = text.char_indices().find(|(_, c)| !is_xml_char(*c)) {
            return Err(MalformedXml::IllegalChar {
                position,
                code: u32::from(c),
            });
        }

        let mut reader = Reader::from_str(&text);
        reader.check_end_names(true).check_comments(true);

        let mut depth = 0usize;
        let mut root_seen = false;
        let mut doctype_seen = false;
        let mut first_event = true;

        loop {
            let event = reader.read_event().map_err(|e| MalformedXml::Parse {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Decl(_) if !first_event => return Err(MalformedXml::MisplacedDeclaration),
                Event::Decl(ref decl) => check_declaration(decl)?,
                Event::DocType(ref doctype) => {
                    if doctype_seen || root_seen {
                        return Err(MalformedXml::MisplacedDoctype);
                    }
                    // Only the name is checked; the internal subset is never expanded.
                    markup::check_doctype(as_str(doctype)?)?;
                    doctype_seen = true;
                }
                Event::Start(ref start) => {
                    open_element(start, depth, root_seen)?;
                    root_seen = true;
                    depth += 1;
                }
                Event::Empty(ref start) => {
                    open_element(start, depth, root_seen)?;
                    root_seen = true;
                }
                Event::End(ref end) => {
                    if depth == 0 {
                        return Err(MalformedXml::UnexpectedEnd {
                            name: String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                        });
                    }
                    depth -= 1;
                }
                Event::Text(ref data) => {
                    let raw = as_str(data)?;
                    if depth == 0 && !raw.trim_matches(is_xml_whitespace).is_empty() {
                        return Err(MalformedXml::TextOutsideRoot);
                    }
                    if raw.contains("]]>") {
                        return Err(MalformedXml::CdataEndInText);
                    }
                    markup::check_references(raw)?;
                }
                Event::CData(_) if depth == 0 => return Err(MalformedXml::TextOutsideRoot),
                Event::PI(ref pi) => markup::check_processing_instruction(as_str(pi)?)?,
                Event::CData(_) | Event::Comment(_) => {}
                Event::Eof => break,
            }

            first_event = false;
        }

        if depth > 0 {
            return Err(MalformedXml::Unclosed { depth });
        }
        if !root_seen {
            return Err(MalformedXml::NoRootElement);
        }
        debug!(bytes = bytes.len(), "XML is well-formed");
        Ok(())
    }
}

/// Checks shared by `<a>` and `<a/>`: only one root, a valid name, a
/// well-formed attribute list.
fn open_element(start: &BytesStart<'_>, depth: usize, root_seen: bool) -> Result<(), MalformedXml> {
    let raw = as_str(start)?;
    let name_len = start.name().as_ref().len();
    let (name, rest) = raw.split_at(name_len.min(raw.len()));
    if !is_name(name) {
        return Err(MalformedXml::InvalidName {
            kind: "element",
            name: name.to_string(),
        });
    }
    if depth == 0 && root_seen {
        return Err(MalformedXml::MultipleRoots {
            name: name.to_string(),
        });
    }
    markup::check_attributes(name, rest)
}

fn check_declaration(decl: &BytesDecl<'_>) -> Result<(), MalformedXml> {
    let raw = as_str(decl)?;
    markup::check_attributes("?xml", raw.get(3..).unwrap_or_default())?;
    let version = decl
        .version()
        .map_err(|e| MalformedXml::Declaration(e.to_string()))?;
    let supported = version.len() > 2
        && version.starts_with(b"1.")
        && version[2..].iter().all(u8::is_ascii_digit);
    if !supported {
        return Err(MalformedXml::Declaration(format!(
            "unsupported version {:?}",
            String::from_utf8_lossy(&version)
        )));
    }
    Ok(())
}

/// Event bodies are slices of the decoded text, split on ASCII delimiters.
fn as_str(bytes: &[u8]) -> Result<&str, MalformedXml> {
    std::str::from_utf8(bytes).map_err(|_| MalformedXml::Encoding {
        encoding: "UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST01: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- catalogue entry -->
<catalog>
    <book id="bk101">
        <author>Gambardella, Matthew</author>
        <title>XML Developer's Guide</title>
        <price>44.95</price>
        <description>An in-depth look at creating applications &amp; tools with XML.</description>
    </book>
    <empty/>
</catalog>
"#;

    fn ok(xml: &str) -> bool {
        XmlValidator::new().is_well_formed_bytes(xml.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Accepted documents
    // -----------------------------------------------------------------------

    #[test]
    fn accepts_typical_document() {
        assert!(ok(TEST01));
    }

    #[test]
    fn accepts_minimal_root() {
        assert!(ok("<a/>"));
        assert!(ok("<a></a>"));
    }

    #[test]
    fn accepts_predefined_and_numeric_references() {
        assert!(ok("<a>&lt;&gt;&amp;&apos;&quot; &#65; &#x42;</a>"));
    }

    #[test]
    fn accepts_cdata_comments_and_processing_instructions() {
        assert!(ok("<?xml version=\"1.0\"?><?pi data?><a><![CDATA[<not a tag>]]><!-- c --></a><!-- trailing -->"));
    }

    #[test]
    fn accepts_doctype_without_entity_use() {
        assert!(ok("<?xml version=\"1.0\"?><!DOCTYPE note [<!ELEMENT note (#PCDATA)>]><note>hi</note>"));
    }

    #[test]
    fn accepts_surrounding_whitespace() {
        assert!(ok("\n\n  <a>x</a>\n\n"));
    }

    // -----------------------------------------------------------------------
    // Rejected documents
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_mismatched_nesting() {
        assert!(!ok("<a><b></a>"));
    }

    #[test]
    fn rejects_unclosed_root() {
        let err = XmlValidator::new().check("<a><b></b>".as_bytes()).unwrap_err();
        assert!(matches!(err, MalformedXml::Unclosed { depth: 1 }));
    }

    #[test]
    fn rejects_stray_end_tag() {
        assert!(!ok("</a>"));
    }

    #[test]
    fn rejects_empty_and_blank_input() {
        let v = XmlValidator::new();
        assert!(matches!(v.check("".as_bytes()), Err(MalformedXml::NoRootElement)));
        assert!(matches!(v.check("  \n ".as_bytes()), Err(MalformedXml::NoRootElement)));
    }

    #[test]
    fn rejects_two_roots() {
        let err = XmlValidator::new().check("<a/><b/>".as_bytes()).unwrap_err();
        assert!(matches!(err, MalformedXml::MultipleRoots { ref name } if name == "b"));
    }

    #[test]
    fn rejects_text_outside_root() {
        assert!(!ok("hello <a/>"));
        assert!(!ok("<a/> trailing"));
    }

    #[test]
    fn rejects_plain_text() {
        assert!(!ok("this is not xml"));
    }

    #[test]
    fn rejects_duplicate_attributes() {
        assert!(!ok(r#"<a x="1" x="2"/>"#));
    }

    #[test]
    fn rejects_bare_ampersand() {
        assert!(!ok("<a>fish & chips</a>"));
    }

    #[test]
    fn rejects_misplaced_declaration() {
        assert!(!ok("<a/><?xml version=\"1.0\"?>"));
    }

    #[test]
    fn rejects_truncated_tag() {
        assert!(!ok("<a><b"));
    }

    // -----------------------------------------------------------------------
    // Entity handling
    // -----------------------------------------------------------------------

    #[test]
    fn external_entity_is_not_resolved() {
        let xxe = r#"<?xml version="1.0"?>
<!DOCTYPE foo [ <!ENTITY xxe SYSTEM "file:///etc/passwd"> ]>
<foo>&xxe;</foo>"#;
        assert!(!ok(xxe));
    }

    #[test]
    fn entity_expansion_bomb_is_rejected() {
        let bomb = r#"<?xml version="1.0"?>
<!DOCTYPE lolz [
  <!ENTITY lol "lol">
  <!ENTITY lol2 "&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;">
  <!ENTITY lol3 "&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;">
]>
<lolz>&lol3;</lolz>"#;
        assert!(!ok(bomb));
    }

    #[test]
    fn entity_in_attribute_is_not_resolved() {
        assert!(!ok(r#"<!DOCTYPE a [<!ENTITY e "v">]><a x="&e;"/>"#));
    }

    // -----------------------------------------------------------------------
    // Conformance samples
    // -----------------------------------------------------------------------

    const WELL_FORMED: &[(&str, &[u8])] = &[
        ("unicode names", "<café><ns:x xmlns:ns=\"urn:x\"/></café>".as_bytes()),
        ("spaced and single-quoted attributes", b"<a b = 'x'  c=\"y\" />"),
        ("gt and lone brackets in text", b"<a>1 > 0 ]] done</a>"),
        ("whitespace in end tag", b"<a></a >"),
        ("tab, CR and LF in text", b"<a>\t\r\n</a>"),
        ("astral character reference", b"<a>&#x1F600;</a>"),
        ("stylesheet PI", b"<?xml-stylesheet href=\"s.css\"?><a/>"),
        ("version 1.1", b"<?xml version=\"1.1\"?><a/>"),
        ("UTF-8 BOM", b"\xef\xbb\xbf<a/>"),
        (
            "ISO-8859-1 declared",
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><caf\xe9>cr\xe8me br\xfbl\xe9e</caf\xe9>",
        ),
        (
            "windows-1252 declared",
            b"<?xml version='1.0' encoding='windows-1252'?><a>\x80 \x93q\x94</a>",
        ),
    ];

    const MALFORMED: &[(&str, &[u8])] = &[
        ("name starts with a digit", b"<1a/>"),
        ("punctuation in name", b"<a!b/>"),
        ("invalid UTF-8 in tag", b"<a\xff/>"),
        ("invalid UTF-8 in comment", b"<a><!-- \xff --></a>"),
        ("invalid UTF-8 in text", b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><a>caf\xe9</a>"),
        ("attributes not separated", b"<a b=\"1\"c=\"2\"/>"),
        ("lt in attribute value", b"<a b=\"<\"/>"),
        ("unquoted attribute", b"<a b=1/>"),
        ("attribute without value", b"<a b/>"),
        ("invalid attribute name", b"<a 1b=\"x\"/>"),
        ("CDATA terminator in text", b"<a>]]></a>"),
        ("NUL character", b"<a>\x00</a>"),
        ("C0 control character", b"<a>\x01</a>"),
        ("control character in attribute", b"<a b=\"\x1b\"/>"),
        ("U+FFFE", "<a>\u{FFFE}</a>".as_bytes()),
        ("reference to NUL", b"<a>&#0;</a>"),
        ("signed hex reference", b"<a>&#x+41;</a>"),
        ("unterminated reference", b"<a>&amp</a>"),
        ("double hyphen in comment", b"<a><!-- a -- b --></a>"),
        ("comment ending in hyphen", b"<a><!-- a ---></a>"),
        ("reserved PI target", b"<a><?XML data?></a>"),
        ("invalid PI target", b"<a><?1pi data?></a>"),
        ("unsupported version", b"<?xml version=\"2.0\"?><a/>"),
        ("declaration without version", b"<?xml encoding=\"UTF-8\"?><a/>"),
        ("invalid DOCTYPE name", b"<!DOCTYPE 1a><a/>"),
        ("non-breaking space after root", b"<a/>\xc2\xa0"),
        ("unknown encoding", b"<?xml version=\"1.0\" encoding=\"x-unknown\"?><a/>"),
        ("odd-length UTF-16", b"\xff\xfe<\x00a\x00/\x00>"),
    ];

    #[test]
    fn accepts_well_formed_samples() {
        let v = XmlValidator::new();
        for (label, bytes) in WELL_FORMED {
            if let Err(e) = v.check_bytes(bytes) {
                panic!("{label}: rejected with {e}");
            }
        }
    }

    #[test]
    fn rejects_malformed_samples() {
        let v = XmlValidator::new();
        for (label, bytes) in MALFORMED {
            assert!(v.check_bytes(bytes).is_err(), "{label}: accepted");
            assert!(!v.is_well_formed_bytes(bytes), "{label}: accepted");
        }
    }

    #[test]
    fn reports_illegal_character_position() {
        let err = XmlValidator::new().check_bytes(b"<a>x\x00</a>").unwrap_err();
        assert!(matches!(err, MalformedXml::IllegalChar { position: 4, code: 0 }));
    }

    #[test]
    fn reports_invalid_element_name() {
        let err = XmlValidator::new().check_bytes(b"<1a/>").unwrap_err();
        assert!(matches!(err, MalformedXml::InvalidName { kind: "element", ref name } if name == "1a"));
    }

    // -----------------------------------------------------------------------
    // Encodings
    // -----------------------------------------------------------------------

    fn utf16(text: &str, little_endian: bool) -> Vec<u8> {
        let mut out = if little_endian { vec![0xFF, 0xFE] } else { vec![0xFE, 0xFF] };
        for unit in text.encode_utf16() {
            let bytes = if little_endian { unit.to_le_bytes() } else { unit.to_be_bytes() };
            out.extend_from_slice(&bytes);
        }
        out
    }

    #[test]
    fn accepts_utf16_with_bom() {
        let doc = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><note lang=\"中文\">ünïcödé</note>";
        let v = XmlValidator::new();
        assert!(v.is_well_formed_bytes(&utf16(doc, true)));
        assert!(v.is_well_formed_bytes(&utf16(doc, false)));
    }

    #[test]
    fn malformed_utf16_is_still_malformed() {
        assert!(!XmlValidator::new().is_well_formed_bytes(&utf16("<a><b></a>", true)));
    }

    #[test]
    fn latin1_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        std::fs::write(
            &path,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<menu><item>cr\xe8me br\xfbl\xe9e</item></menu>\n",
        )
        .unwrap();
        assert!(XmlValidator::new().is_well_formed_file(&path));
    }

    // -----------------------------------------------------------------------
    // Files and concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn checks_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("test01.xml");
        let bad = dir.path().join("invalid01.xml");
        std::fs::write(&good, TEST01).unwrap();
        std::fs::write(&bad, "<a><b></a>").unwrap();

        let v = XmlValidator::new();
        assert!(v.is_well_formed_file(&good));
        assert!(!v.is_well_formed_file(&bad));
    }

    #[test]
    fn missing_file_is_not_well_formed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!XmlValidator::new().is_well_formed_file(&dir.path().join("nope.xml")));
    }

    #[test]
    fn concurrent_checks_do_not_interfere() {
        use std::sync::Arc;
        use std::thread;

        let v = Arc::new(XmlValidator::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let v = Arc::clone(&v);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        assert!(v.is_well_formed_bytes(TEST01.as_bytes()));
                    } else {
                        assert!(!v.is_well_formed_bytes(b"<a><b></a>"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
