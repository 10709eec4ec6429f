/// Classification of an SFZ lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// `<`, opening a header.
    HeaderOpen,
    /// `>`, closing a header.
    HeaderClose,
    /// `=`, separating an opcode name from its value.
    Equals,
    /// A run of characters that is none of the other kinds.
    Word,
    /// A double-quoted string, quotes included. May be unterminated.
    Quoted,
    /// `#` followed by letters (`#define`, `#include`).
    Directive,
    /// `// ...` to end of line, or `/* ... */`. A block comment may be
    /// unterminated.
    Comment,
    /// One or more whitespace characters (excluding newlines).
    Whitespace,
    /// A line break (`\n`, `\r\n` or `\r`).
    Newline,
}

/// A token that borrows its text directly from the source input.
///
/// `text` is always exactly `&input[start..end]`.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Tokenize SFZ input into a sequence of borrowed tokens.
///
/// The lexer never fails: malformed constructs (unterminated quotes or block
/// comments) still produce a token, and the parser decides what is an error.
///
/// All delimiter tests operate on ASCII bytes. UTF-8 continuation bytes are
/// in 0x80–0xBF and never match, so slicing at the positions found here
/// always lands on char boundaries.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let b = input.as_bytes();
    let mut i = 0usize;
    while i < b.len() {
        let start = i;
        let kind = match b[i] {
            b'<' => {
                i += 1;
                TokKind::HeaderOpen
            }
            b'>' => {
                i += 1;
                TokKind::HeaderClose
            }
            b'=' => {
                i += 1;
                TokKind::Equals
            }
            b'\r' => {
                i += if b.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                TokKind::Newline
            }
            b'\n' => {
                i += 1;
                TokKind::Newline
            }
            b'"' => {
                i += 1;
                while i < b.len() && !matches!(b[i], b'"' | b'\n' | b'\r') {
                    i += 1;
                }
                if b.get(i) == Some(&b'"') {
                    i += 1;
                }
                TokKind::Quoted
            }
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < b.len() && !matches!(b[i], b'\n' | b'\r') {
                    i += 1;
                }
                TokKind::Comment
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < b.len() && !(b[i] == b'*' && b.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(b.len());
                TokKind::Comment
            }
            b'#' if b.get(i + 1).is_some_and(u8::is_ascii_alphabetic) => {
                i += 1;
                while i < b.len() && b[i].is_ascii_alphabetic() {
                    i += 1;
                }
                TokKind::Directive
            }
            c if is_space(c) => {
                while i < b.len() && is_space(b[i]) {
                    i += 1;
                }
                TokKind::Whitespace
            }
            _ => {
                i += 1;
                while i < b.len() && !ends_word(b, i) {
                    i += 1;
                }
                TokKind::Word
            }
        };
        toks.push(Token {
            kind,
            text: &input[start..i],
            start,
            end: i,
        });
    }
    toks
}

fn is_space(c: u8) -> bool {
    c.is_ascii_whitespace() && c != b'\n' && c != b'\r'
}

fn ends_word(b: &[u8], i: usize) -> bool {
    match b[i] {
        b'<' | b'>' | b'=' | b'"' | b'\n' | b'\r' => true,
        b'/' => matches!(b.get(i + 1), Some(b'/' | b'*')),
        c => is_space(c),
    }
}
