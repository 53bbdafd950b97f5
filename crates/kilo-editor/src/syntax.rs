//! Language definitions — the static highlight database.
//!
//! Each [`Syntax`] names a file type, the filename patterns that select it,
//! its keywords, comment markers, and which literal kinds get highlighted.
//! The table is fixed at compile time; a document picks one entry (or none)
//! from its filename when it is opened or saved under a new name.
//!
//! # Keyword classes
//!
//! A keyword ending in `|` belongs to the secondary class (types, in the
//! built-in tables). The `|` is a marker, not part of the keyword.

use bitflags::bitflags;

bitflags! {
    /// Literal kinds a language wants highlighted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 0b0000_0001;
        const STRINGS = 0b0000_0010;
    }
}

/// A language definition.
#[derive(Debug, PartialEq, Eq)]
pub struct Syntax {
    /// Name shown in the status line.
    pub filetype: &'static str,
    /// Patterns starting with `.` match the file extension exactly; others
    /// match anywhere in the filename.
    pub filematch: &'static [&'static str],
    /// Keywords; a trailing `|` marks the secondary class.
    pub keywords: &'static [&'static str],
    /// Single-line comment marker, or `""` for none.
    pub singleline_comment: &'static str,
    /// Block comment start marker, or `""` for none.
    pub block_comment_start: &'static str,
    /// Block comment end marker, or `""` for none.
    pub block_comment_end: &'static str,
    pub flags: SyntaxFlags,
}

/// Which class a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    Primary,
    Secondary,
}

impl Syntax {
    /// Iterate keywords with the `|` marker stripped and their class.
    pub fn keywords(&self) -> impl Iterator<Item = (&'static [u8], KeywordClass)> + '_ {
        self.keywords.iter().map(|kw| match kw.strip_suffix('|') {
            Some(word) => (word.as_bytes(), KeywordClass::Secondary),
            None => (kw.as_bytes(), KeywordClass::Primary),
        })
    }

    /// Whether block comments are configured (both markers present).
    #[inline]
    #[must_use]
    pub const fn has_block_comments(&self) -> bool {
        !self.block_comment_start.is_empty() && !self.block_comment_end.is_empty()
    }

    /// Whether this language claims `filename`.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        let ext = filename.rfind('.').map(|i| &filename[i..]);
        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                ext == Some(*pattern)
            } else {
                filename.contains(pattern)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "#include", "#define", "int|", "long|",
    "double|", "float|", "char|", "unsigned|", "signed|", "void|", "const|", "size_t|",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "static", "struct", "trait", "type", "unsafe", "use", "where", "while", "Self", "i8|", "i16|",
    "i32|", "i64|", "isize|", "u8|", "u16|", "u32|", "u64|", "usize|", "f32|", "f64|", "bool|",
    "char|", "str|", "String|", "Vec|", "Option|", "Result|", "Box|",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not", "or", "pass",
    "raise", "return", "try", "while", "with", "yield", "None|", "True|", "False|", "int|",
    "str|", "float|", "list|", "dict|", "self|",
];

/// The highlight database, consulted in order.
pub static HLDB: &[Syntax] = &[
    Syntax {
        filetype: "c",
        filematch: &[".c", ".h", ".cpp", ".hpp", ".cc"],
        keywords: C_KEYWORDS,
        singleline_comment: "//",
        block_comment_start: "/*",
        block_comment_end: "*/",
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    Syntax {
        filetype: "rust",
        filematch: &[".rs"],
        keywords: RUST_KEYWORDS,
        singleline_comment: "//",
        block_comment_start: "/*",
        block_comment_end: "*/",
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    Syntax {
        filetype: "python",
        filematch: &[".py"],
        keywords: PYTHON_KEYWORDS,
        singleline_comment: "#",
        block_comment_start: "",
        block_comment_end: "",
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
];

/// Pick the language for `filename`, if any entry in [`HLDB`] claims it.
#[must_use]
pub fn select(filename: &str) -> Option<&'static Syntax> {
    HLDB.iter().find(|syntax| syntax.matches(filename))
}
