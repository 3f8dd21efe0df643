/// Why a document failed the well-formedness check.
#[derive(Debug, thiserror::Error)]
pub enum MalformedXml {
    /// The bytes are not valid in the document's encoding.
    #[error("input is not valid {encoding}")]
    Encoding { encoding: String },

    /// The declared encoding is not one we can decode.
    #[error("unsupported encoding {0:?}")]
    UnsupportedEncoding(String),

    /// A code point outside the XML `Char` production.
    #[error("illegal character U+{code:04X} at offset {position}")]
    IllegalChar { position: usize, code: u32 },

    /// The parser rejected the input outright.
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },

    /// An element, DOCTYPE, or other name that is not an XML `Name`.
    #[error("invalid {kind} name {name:?}")]
    InvalidName { kind: &'static str, name: String },

    /// No root element was found (empty or whitespace-only input).
    #[error("document has no root element")]
    NoRootElement,

    /// A second top-level element follows the root element.
    #[error("more than one root element (second root <{name}>)")]
    MultipleRoots { name: String },

    /// Character data appears outside the root element.
    #[error("character data outside the root element")]
    TextOutsideRoot,

    /// `]]>` appears in character data.
    #[error("']]>' is not allowed in character data")]
    CdataEndInText,

    /// A closing tag appears with no matching open element.
    #[error("unexpected closing tag </{name}>")]
    UnexpectedEnd { name: String },

    /// Input ended while elements were still open.
    #[error("{depth} element(s) left unclosed at end of document")]
    Unclosed { depth: usize },

    /// The XML declaration is not the very first thing in the document.
    #[error("XML declaration is only allowed at the start of the document")]
    MisplacedDeclaration,

    /// The XML declaration itself is malformed.
    #[error("bad XML declaration: {0}")]
    Declaration(String),

    /// A document type declaration appears twice or after the root element.
    #[error("document type declaration must appear once, before the root element")]
    MisplacedDoctype,

    /// A malformed or duplicated attribute.
    #[error("bad attribute in <{element}>: {message}")]
    Attribute { element: String, message: String },

    /// A bare `&`, an undeclared entity, or a reference to an illegal character.
    #[error("bad reference: {0}")]
    Reference(String),

    /// A processing instruction with an invalid or reserved target.
    #[error("bad processing instruction: {0}")]
    ProcessingInstruction(String),

    /// The source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
