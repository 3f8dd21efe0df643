//! XML well-formedness checking.
//!
//! [`XmlValidator`] answers one question: is this byte stream well-formed
//! XML 1.0? It does not validate against a schema or DTD.
//!
//! Input is decoded according to its byte-order mark or declared
//! `encoding` (UTF-8, UTF-16, ISO-8859-1 and the other encodings known to
//! `encoding_rs`). On top of quick-xml's tag matching, every character must
//! be an XML `Char`, every element, attribute, and PI target must be an XML
//! `Name`, attributes must be whitespace-separated, quoted, unique, and free
//! of `<`, and character data must not contain `]]>`.
//!
//! # Safety against hostile input
//!
//! Every call builds a fresh [`quick_xml::Reader`]; nothing is cached or
//! shared between calls, so one validator can be used from many threads.
//! Document type declarations are tolerated but never processed: no
//! internal subset is expanded and no external entity is resolved. A
//! reference to any entity other than the five predefined ones (or a
//! numeric character reference) is reported as malformed, which rejects
//! XXE and entity-amplification payloads without touching the file system
//! or the network.

mod chars;
mod encoding;
pub mod error;
mod markup;
pub mod validator;

pub use error::MalformedXml;
pub use validator::XmlValidator;
