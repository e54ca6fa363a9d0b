//! Tokenized block scanner for the schema corpus
//!
//! The schema corpus is a JSON superset: keys may be bare identifiers,
//! records may open with a `-{` marker, and separators are optional. The
//! scanner never matches closing delimiters with patterns. It keeps an
//! explicit depth counter and an in-string flag, so braces inside string
//! literals cannot end a record early or merge two sibling records.
//!
//! ```text
//! apis: [
//!   -{
//!     path: "/widget/{id}"          ◄── Path block
//!     operations: [
//!       -{                          ◄── Operation block
//!         httpMethod: "POST"
//!         parameters: [
//!           -{ name: "label" ... }  ◄── Parameter block
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```

use tracing::debug;

/// Kinds of record blocks the scanner can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A record carrying a direct `path` field
    Path,
    /// An element of an `operations` list
    Operation,
    /// An element of a `parameters` list
    Parameter,
}

impl BlockKind {
    /// Key of the list field that holds blocks of this kind, if any
    pub fn list_field(self) -> Option<&'static str> {
        match self {
            BlockKind::Path => None,
            BlockKind::Operation => Some("operations"),
            BlockKind::Parameter => Some("parameters"),
        }
    }

    /// Direct field that marks a record as a block of this kind, if any
    pub fn marker_field(self) -> Option<&'static str> {
        match self {
            BlockKind::Path => Some("path"),
            BlockKind::Operation | BlockKind::Parameter => None,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Path => write!(f, "path"),
            BlockKind::Operation => write!(f, "operation"),
            BlockKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// A depth-balanced record span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    /// Record text, from its opening `{` to its closing `}` inclusive
    pub text: &'a str,
    /// Byte offset of the opening `{` in the scanned text
    pub start: usize,
    /// Byte offset just past the closing `}`
    pub end: usize,
}

impl<'a> Block<'a> {
    /// Direct fields of this block
    pub fn record(&self) -> Record<'a> {
        Record::parse(self.text)
    }
}

/// Find the next block of `kind` at or after `offset`
///
/// Restartable: pass the `end` of the previous block to continue. Returns
/// `None` once no further well-formed block exists.
///
/// Each call lexes `text` from the start, so walking a whole corpus this
/// way is quadratic. Iterate one [`BlockScanner`] instead.
pub fn next_block(kind: BlockKind, text: &str, offset: usize) -> Option<Block<'_>> {
    BlockScanner::resume(kind, text, offset).next()
}

/// Find the offset of the delimiter closing the one at `open`
///
/// `{`/`}` and `[`/`]` share a single depth counter. Delimiters inside
/// double-quoted strings are ignored, honouring backslash escapes.
pub fn find_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ─── Lexer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open { delim: u8, at: usize },
    Close { delim: u8 },
    Str(String),
    Bare(&'a str),
    Colon,
}

impl Token<'_> {
    /// Text of a scalar token
    fn into_text(self) -> Option<String> {
        match self {
            Token::Str(s) => Some(s),
            Token::Bare(s) => Some(s.to_string()),
            _ => None,
        }
    }
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        let bytes = self.text.as_bytes();
        let b = *bytes.get(self.pos)?;

        match b {
            b'{' | b'[' => {
                let at = self.pos;
                self.pos += 1;
                Some(Token::Open { delim: b, at })
            }
            b'}' | b']' => {
                self.pos += 1;
                Some(Token::Close { delim: b })
            }
            b':' => {
                self.pos += 1;
                Some(Token::Colon)
            }
            b'"' => {
                // Unterminated string: nothing after it can be delimited
                let (value, end) = read_string(self.text, self.pos)?;
                self.pos = end;
                Some(Token::Str(value))
            }
            _ => {
                let start = self.pos;
                while self.pos < bytes.len() && !is_bare_stop(bytes[self.pos]) {
                    self.pos += 1;
                }
                Some(Token::Bare(&self.text[start..self.pos]))
            }
        }
    }

    /// Whitespace, record separators and the `-` of a `-{` marker
    fn skip_trivia(&mut self) {
        let bytes = self.text.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b',' | b';' => self.pos += 1,
                b'-' if self.marker_follows() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn marker_follows(&self) -> bool {
        self.text.as_bytes()[self.pos + 1..]
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{' || b == b'[')
    }

    /// Consume a `:` following the previous token, if present
    fn eat_colon(&mut self) -> bool {
        let bytes = self.text.as_bytes();
        let mut pos = self.pos;
        while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
            pos += 1;
        }
        if bytes.get(pos) == Some(&b':') {
            self.pos = pos + 1;
            true
        } else {
            false
        }
    }
}

fn is_bare_stop(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'[' | b']' | b'"' | b':' | b',' | b';')
}

/// Read a double-quoted string starting at `start`, returning its unescaped
/// value and the offset past the closing quote
fn read_string(text: &str, start: usize) -> Option<(String, usize)> {
    let body = &text[start + 1..];
    let mut value = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, start + 1 + i + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'u' => {
                        let hex: String = chars.clone().take(4).map(|(_, c)| c).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) if hex.len() == 4 => {
                                value.push(decoded);
                                for _ in 0..4 {
                                    chars.next();
                                }
                            }
                            _ => {
                                value.push('\\');
                                value.push('u');
                            }
                        }
                    }
                    other => value.push(other),
                }
            }
            _ => value.push(c),
        }
    }
    None
}

// ─── Scanner ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Frame {
    delim: u8,
    key: Option<String>,
}

/// Lazy iterator over the blocks of one kind
///
/// Holds one record's worth of state at a time: a stack of open containers
/// and the key waiting for its value. Matched blocks are skipped as a whole,
/// so blocks of the same kind nested inside a match are never reported.
pub struct BlockScanner<'a> {
    kind: BlockKind,
    lexer: Lexer<'a>,
    frames: Vec<Frame>,
    pending_key: Option<String>,
    emit_from: usize,
    malformed: usize,
}

impl<'a> BlockScanner<'a> {
    pub fn new(kind: BlockKind, text: &'a str) -> Self {
        Self::resume(kind, text, 0)
    }

    /// Scanner yielding only blocks that start at or after `offset`
    ///
    /// The text before `offset` is still lexed so that the container a
    /// block sits in is known, making this linear in `offset`. Prefer
    /// iterating one scanner over repeated resumes.
    pub fn resume(kind: BlockKind, text: &'a str, offset: usize) -> Self {
        Self {
            kind,
            lexer: Lexer::new(text, 0),
            frames: Vec::new(),
            pending_key: None,
            emit_from: offset,
            malformed: 0,
        }
    }

    /// Records that could not be balanced before the end of input
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    fn scalar(&mut self, value: String) {
        if self.lexer.eat_colon() {
            self.pending_key = Some(value);
        } else {
            self.pending_key = None;
        }
    }

    /// Key naming the container about to open; list elements have none
    fn take_key(&mut self) -> Option<String> {
        let key = self.pending_key.take();
        match self.frames.last() {
            Some(frame) if frame.delim == b'[' => None,
            _ => key,
        }
    }

    fn close(&mut self, delim: u8) {
        self.pending_key = None;
        let opener = if delim == b'}' { b'{' } else { b'[' };
        if self.frames.last().is_some_and(|f| f.delim == opener) {
            self.frames.pop();
        }
    }

    fn in_list_of_kind(&self) -> bool {
        match (self.kind.list_field(), self.frames.last()) {
            (Some(field), Some(frame)) => {
                frame.delim == b'[' && frame.key.as_deref() == Some(field)
            }
            _ => false,
        }
    }

    /// Try to match a record opening at `at` as a block of this kind
    fn try_match(&mut self, at: usize) -> Option<Block<'a>> {
        let candidate = match self.kind.marker_field() {
            Some(_) => true,
            None => self.in_list_of_kind(),
        };
        if !candidate {
            return None;
        }

        let text = self.lexer.text;
        let Some(close) = find_close(text, at) else {
            self.malformed += 1;
            debug!(kind = %self.kind, offset = at, "unbalanced record, skipping");
            return None;
        };

        let span = &text[at..=close];
        if let Some(marker) = self.kind.marker_field() {
            if Record::parse(span).scalar(marker).is_none() {
                return None;
            }
        }

        Some(Block {
            kind: self.kind,
            text: span,
            start: at,
            end: close + 1,
        })
    }
}

impl<'a> Iterator for BlockScanner<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Block<'a>> {
        while let Some(token) = self.lexer.next_token() {
            match token {
                Token::Str(s) => self.scalar(s),
                Token::Bare(s) => self.scalar(s.to_string()),
                Token::Colon => {}
                Token::Close { delim } => self.close(delim),
                Token::Open { delim: b'{', at } => {
                    let key = self.take_key();
                    if let Some(block) = self.try_match(at) {
                        self.lexer.pos = block.end;
                        if block.start >= self.emit_from {
                            return Some(block);
                        }
                        continue;
                    }
                    self.frames.push(Frame { delim: b'{', key });
                }
                Token::Open { delim, .. } => {
                    let key = self.take_key();
                    self.frames.push(Frame { delim, key });
                }
            }
        }
        None
    }
}

// ─── Record view ────────────────────────────────────────────────────────

/// Value of a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Quoted string (unescaped) or bare token (verbatim)
    Scalar(String),
    /// Balanced span of a nested record or list, delimiters included
    Nested(&'a str),
}

impl<'a> FieldValue<'a> {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Nested(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::Nested(span) if span.starts_with('['))
    }

    /// Elements of a list value; a record or scalar is its own single item
    pub fn items(&self) -> Vec<FieldValue<'a>> {
        let span: &'a str = match self {
            FieldValue::Nested(span) if span.starts_with('[') => *span,
            _ => return vec![self.clone()],
        };

        let mut items = Vec::new();
        let mut lexer = Lexer::new(span, 1);
        while let Some(token) = lexer.next_token() {
            match token {
                Token::Close { .. } => break,
                Token::Colon => {}
                Token::Open { at, .. } => {
                    let Some(close) = find_close(span, at) else {
                        break;
                    };
                    lexer.pos = close + 1;
                    items.push(FieldValue::Nested(&span[at..=close]));
                }
                scalar => {
                    if let Some(text) = scalar.into_text() {
                        items.push(FieldValue::Scalar(text));
                    }
                }
            }
        }
        items
    }
}

/// A named field of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub key: String,
    pub value: FieldValue<'a>,
}

/// Direct (depth-1) fields of a record block
///
/// Values of nested records are kept as spans and never consulted when
/// looking up a key, so a `description` inside a parameter is not mistaken
/// for the operation's description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    /// Read the direct fields of a record starting with `{` (or `-{`)
    pub fn parse(block: &'a str) -> Self {
        let mut lexer = Lexer::new(block, 0);
        if !matches!(lexer.next_token(), Some(Token::Open { delim: b'{', .. })) {
            return Self::default();
        }

        let mut fields = Vec::new();
        let mut key: Option<String> = None;
        while let Some(token) = lexer.next_token() {
            match token {
                Token::Close { .. } => break,
                Token::Colon => {}
                Token::Open { at, .. } => {
                    let Some(close) = find_close(block, at) else {
                        break;
                    };
                    lexer.pos = close + 1;
                    if let Some(k) = key.take() {
                        fields.push(Field {
                            key: k,
                            value: FieldValue::Nested(&block[at..=close]),
                        });
                    }
                }
                scalar => {
                    let Some(text) = scalar.into_text() else {
                        continue;
                    };
                    if lexer.eat_colon() {
                        key = Some(text);
                    } else if let Some(k) = key.take() {
                        fields.push(Field {
                            key: k,
                            value: FieldValue::Scalar(text),
                        });
                    }
                }
            }
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// First value under `key`
    pub fn get(&self, key: &str) -> Option<&FieldValue<'a>> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Every value under `key`, in declaration order
    pub fn get_all<'s>(&'s self, key: &'s str) -> impl Iterator<Item = &'s FieldValue<'a>> + 's {
        self.fields.iter().filter(move |f| f.key == key).map(|f| &f.value)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_scalar)
    }
}
