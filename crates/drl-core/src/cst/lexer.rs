//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the source. Unknown characters become `Error` tokens
//! and lexing continues with the next character.
//!
//! The consequence of a rule is lexed in a separate mode: after a `then`
//! keyword the lexer emits the leading trivia, then a single `ActionText`
//! token holding the action code, then the trivia before the closing `end`.

use std::ops::Range;

use super::DrlSyntaxKind;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind, span and start position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: DrlSyntaxKind,
    pub text: String,
    pub span: CstSpan,
    /// 1-based line of the first character
    pub line: u32,
    /// 1-based column of the first character, counted in chars
    pub column: u32,
}

impl CstToken {
    pub fn new(kind: DrlSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            line: 1,
            column: 1,
        }
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving ALL trivia for CST construction
///
/// The returned token list always ends with an `Eof` token.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut lexer = Lexer::new(input);
    let tokens: Vec<CstToken> = lexer.by_ref().collect();
    let errors = lexer.take_errors();
    (tokens, errors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Right after `then`: the next significant text is action code
    Consequence,
}

/// Lazy, restartable DRL lexer
///
/// Yields tokens on demand and finishes with a single `Eof` token.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    mode: Mode,
    errors: Vec<LexerError>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            mode: Mode::Normal,
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Start lexing at byte `offset` of `input`
    ///
    /// Spans stay absolute. An offset inside a multi-byte character moves
    /// forward to the next character boundary. Lexing always restarts in
    /// normal mode, so restart points should not be inside a consequence.
    pub fn with_offset(input: &'a str, offset: usize) -> Self {
        let mut start = offset.min(input.len());
        while !input.is_char_boundary(start) {
            start += 1;
        }

        let mut lexer = Self::new(input);
        lexer.advance_position(&input[..start]);
        lexer.pos = start;
        lexer
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    fn advance_position(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                '\r' => {
                    if chars.peek() != Some(&'\n') {
                        self.line += 1;
                        self.column = 1;
                    }
                }
                _ => self.column += 1,
            }
        }
    }

    fn emit(&mut self, kind: DrlSyntaxKind, end: usize) -> CstToken {
        let start = self.pos;
        let text = &self.input[start..end];
        let token = CstToken::new(kind, text, span(start, end)).with_position(self.line, self.column);
        self.advance_position(text);
        self.pos = end;
        token
    }

    fn error(&mut self, message: impl Into<String>, range: CstSpan) {
        self.errors.push(LexerError::new(message, range));
    }

    fn lex_token(&mut self) -> CstToken {
        let input = self.input;
        let start = self.pos;

        if self.mode == Mode::Consequence && !starts_trivia(input, start) {
            self.mode = Mode::Normal;
            let end = find_consequence_end(input, start).unwrap_or(input.len());
            let action_end = start + input[start..end].trim_end().len();
            if action_end > start {
                return self.emit(DrlSyntaxKind::ActionText, action_end);
            }
        }

        let Some((current, size)) = next_char(input, start) else {
            return self.emit(DrlSyntaxKind::Eof, start);
        };
        let after = start + size;

        match current {
            '\n' => self.emit(DrlSyntaxKind::Newline, after),
            '\r' => {
                let end = match next_char(input, after) {
                    Some(('\n', nl_size)) => after + nl_size,
                    _ => after,
                };
                self.emit(DrlSyntaxKind::Newline, end)
            }
            c if c.is_whitespace() => {
                let end = take_while(input, start, |c| c.is_whitespace() && c != '\n' && c != '\r');
                self.emit(DrlSyntaxKind::Whitespace, end)
            }
            '/' => match next_char(input, after) {
                Some(('/', _)) => {
                    let end = take_while(input, start, |c| c != '\n' && c != '\r');
                    self.emit(DrlSyntaxKind::CommentLine, end)
                }
                Some(('*', _)) => {
                    let end = match input[start + 2..].find("*/") {
                        Some(idx) => start + 2 + idx + 2,
                        None => {
                            self.error("unterminated block comment", span(start, input.len()));
                            input.len()
                        }
                    };
                    self.emit(DrlSyntaxKind::CommentBlock, end)
                }
                Some(('=', eq)) => self.emit(DrlSyntaxKind::SlashEq, after + eq),
                _ => self.emit(DrlSyntaxKind::Slash, after),
            },
            '"' | '\'' => {
                let (end, terminated) = scan_string(input, start, current);
                if !terminated {
                    self.error("unterminated string literal", span(start, end));
                }
                self.emit(DrlSyntaxKind::StringLit, end)
            }
            c if c.is_ascii_digit() => {
                let (end, kind) = scan_number(input, start);
                self.emit(kind, end)
            }
            c if is_ident_start(c) => {
                let (end, kind) = scan_word(input, start);
                let token = self.emit(kind, end);
                if kind == DrlSyntaxKind::ThenKw {
                    self.mode = Mode::Consequence;
                }
                token
            }
            _ => {
                if let Some((kind, len)) = punctuation(&input[start..]) {
                    return self.emit(kind, start + len);
                }
                self.error(
                    format!("unexpected character '{}'", current.escape_debug()),
                    span(start, after),
                );
                self.emit(DrlSyntaxKind::Error, after)
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = CstToken;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.lex_token();
        if token.kind == DrlSyntaxKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

fn next_char(input: &str, i: usize) -> Option<(char, usize)> {
    input.get(i..)?.chars().next().map(|c| (c, c.len_utf8()))
}

fn take_while(input: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    for c in input[start..].chars() {
        if !pred(c) {
            break;
        }
        end += c.len_utf8();
    }
    end
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn starts_trivia(input: &str, i: usize) -> bool {
    let rest = &input[i..];
    match rest.chars().next() {
        Some(c) if c.is_whitespace() => true,
        Some('/') => rest.starts_with("//") || rest.starts_with("/*"),
        _ => false,
    }
}

/// Scan a quoted string. Strings never span lines; an unterminated string
/// stops at the end of its line.
fn scan_string(input: &str, start: usize, quote: char) -> (usize, bool) {
    let mut chars = input[start + 1..].char_indices();
    while let Some((idx, c)) = chars.next() {
        let at = start + 1 + idx;
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next()
                    && (escaped == '\n' || escaped == '\r')
                {
                    return (at + 1, false);
                }
            }
            '\n' | '\r' => return (at, false),
            c if c == quote => return (at + c.len_utf8(), true),
            _ => {}
        }
    }
    (input.len(), false)
}

/// Scan a numeric literal: decimal, hex, floating point with exponent, and
/// trailing letters (type suffixes like `L`/`B` and time units like `1h30m`).
fn scan_number(input: &str, start: usize) -> (usize, DrlSyntaxKind) {
    let bytes = input.as_bytes();
    let mut i = start;
    let mut kind = DrlSyntaxKind::IntLit;

    if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X')) {
        i += 2;
        while i < bytes.len() && (bytes[i].is_ascii_hexdigit() || bytes[i] == b'_') {
            i += 1;
        }
    } else {
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
            i += 1;
        }
        if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            kind = DrlSyntaxKind::FloatLit;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            if bytes.get(j).is_some_and(u8::is_ascii_digit) {
                kind = DrlSyntaxKind::FloatLit;
                i = j;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
        }
    }

    // Suffix letters and digits (10L, 1.5f, 30s, 1h30m)
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }

    (i, kind)
}

/// Scan an identifier or keyword, extending over hyphens when the joined
/// word is a keyword (`no-loop`, `lock-on-active`, `entry-point`).
fn scan_word(input: &str, start: usize) -> (usize, DrlSyntaxKind) {
    let end = take_while(input, start, is_ident_continue);
    let mut best = (end, DrlSyntaxKind::from_keyword(&input[start..end]));

    let mut cursor = end;
    while input[cursor..].starts_with('-') {
        match next_char(input, cursor + 1) {
            Some((c, _)) if c.is_alphabetic() => {}
            _ => break,
        }
        cursor = take_while(input, cursor + 1, is_ident_continue);
        if let Some(kind) = DrlSyntaxKind::from_keyword(&input[start..cursor]) {
            best = (cursor, Some(kind));
        }
    }

    match best {
        (end, Some(kind)) => (end, kind),
        (end, None) => (end, DrlSyntaxKind::Ident),
    }
}

/// Match the longest punctuation token at the start of `rest`
fn punctuation(rest: &str) -> Option<(DrlSyntaxKind, usize)> {
    use DrlSyntaxKind::*;

    const TWO: &[(&str, DrlSyntaxKind)] = &[
        ("==", EqEq),
        ("!=", Neq),
        ("<=", LtEq),
        (">=", GtEq),
        ("&&", AmpAmp),
        ("||", PipePipe),
        ("++", PlusPlus),
        ("--", MinusMinus),
        ("+=", PlusEq),
        ("-=", MinusEq),
        ("*=", StarEq),
        ("->", Arrow),
        ("::", ColonColon),
        (":=", ColonEq),
        ("..", DotDot),
        ("##", HashHash),
    ];

    for (text, kind) in TWO {
        if rest.starts_with(text) {
            return Some((*kind, text.len()));
        }
    }

    // Null-safe dereference only in front of a name: `$p!.name`
    if let Some(tail) = rest.strip_prefix("!.")
        && tail.chars().next().is_some_and(is_ident_start)
    {
        return Some((BangDot, 2));
    }

    let kind = match rest.chars().next()? {
        '(' => LParen,
        ')' => RParen,
        '{' => LBrace,
        '}' => RBrace,
        '[' => LBracket,
        ']' => RBracket,
        ';' => Semicolon,
        ',' => Comma,
        '.' => Dot,
        ':' => Colon,
        '?' => Question,
        '@' => At,
        '#' => Hash,
        '=' => Eq,
        '<' => Lt,
        '>' => Gt,
        '&' => Amp,
        '|' => Pipe,
        '^' => Caret,
        '~' => Tilde,
        '!' => Bang,
        '+' => Plus,
        '-' => Minus,
        '*' => Star,
        '%' => Percent,
        _ => return None,
    };
    Some((kind, 1))
}

/// Find the byte offset of the `end` keyword closing a consequence that
/// starts at `start`.
///
/// A terminating `end` is a whole word at bracket depth 0, outside strings and
/// comments, that is either the first significant text on its line or comes
/// right after `;`, `}` or the `then` keyword (the start of the consequence).
/// An `end` followed by `(`, `.`, `[` or `=` is Java code using a name `end`
/// and never terminates.
fn find_consequence_end(input: &str, start: usize) -> Option<usize> {
    let mut chars = input[start..].char_indices().peekable();
    let mut depth: i32 = 0;
    let mut last_significant: Option<char> = None;
    let mut newline_since_significant = false;

    while let Some((idx, c)) = chars.next() {
        let at = start + idx;
        match c {
            '\n' | '\r' => {
                newline_since_significant = true;
                continue;
            }
            c if c.is_whitespace() => continue,
            '/' if input[at..].starts_with("//") => {
                while chars.next_if(|(_, c)| *c != '\n' && *c != '\r').is_some() {}
                continue;
            }
            '/' if input[at..].starts_with("/*") => {
                chars.next();
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                continue;
            }
            '"' | '\'' => {
                let (end, _) = scan_string(input, at, c);
                while chars.next_if(|(i, _)| start + i < end).is_some() {}
            }
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            c if is_ident_start(c) => {
                let end = take_while(input, at, is_ident_continue);
                let word = &input[at..end];
                let terminates = depth <= 0
                    && (last_significant.is_none()
                        || newline_since_significant
                        || matches!(last_significant, Some(';' | '}')));
                let used_as_name = input[end..].trim_start().starts_with(['(', '.', '[', '=']);
                if word == "end" && terminates && !used_as_name {
                    return Some(at);
                }
                while chars.next_if(|(i, _)| start + i < end).is_some() {}
                last_significant = word.chars().last();
                newline_since_significant = false;
                continue;
            }
            _ => {}
        }
        last_significant = Some(c);
        newline_since_significant = false;
    }

    None
}
