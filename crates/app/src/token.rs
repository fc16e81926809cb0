//! Position-tracking SQL tokenizer.
//!
//! Input is frequently a statement being typed character by character, so
//! tokenization never fails: unrecognized characters become
//! [`TokenKind::Unknown`] tokens and unterminated literals close at end of
//! input. Whitespace and comments are kept as tokens so the parsed tree can
//! reproduce the source text exactly.

/// Source position. Lines are 1-based, columns are 0-based character
/// offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Upper-cased keyword text.
    Keyword(String),
    Identifier(String),
    Number,
    StringLiteral,
    Operator(String),
    Punctuation(char),
    Whitespace,
    Comment,
    Unknown,
}

/// Payload-free token classification used by node matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTag {
    Keyword,
    Identifier,
    Number,
    StringLiteral,
    Operator,
    LParen,
    RParen,
    Comma,
    Period,
    Semicolon,
    Punctuation,
    Whitespace,
    Comment,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Pos,
    pub end: Pos,
}

impl Token {
    pub fn tag(&self) -> TokenTag {
        match &self.kind {
            TokenKind::Keyword(_) => TokenTag::Keyword,
            TokenKind::Identifier(_) => TokenTag::Identifier,
            TokenKind::Number => TokenTag::Number,
            TokenKind::StringLiteral => TokenTag::StringLiteral,
            TokenKind::Operator(_) => TokenTag::Operator,
            TokenKind::Punctuation('(') => TokenTag::LParen,
            TokenKind::Punctuation(')') => TokenTag::RParen,
            TokenKind::Punctuation(',') => TokenTag::Comma,
            TokenKind::Punctuation('.') => TokenTag::Period,
            TokenKind::Punctuation(';') => TokenTag::Semicolon,
            TokenKind::Punctuation(_) => TokenTag::Punctuation,
            TokenKind::Whitespace => TokenTag::Whitespace,
            TokenKind::Comment => TokenTag::Comment,
            TokenKind::Unknown => TokenTag::Unknown,
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn keyword_text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(kw.as_str()),
            _ => None,
        }
    }

    /// Zero-width identifier, used for the missing child of a dotted
    /// reference typed up to the dot.
    pub(crate) fn empty_identifier(at: Pos) -> Self {
        Self {
            kind: TokenKind::Identifier(String::new()),
            text: String::new(),
            start: at,
            end: at,
        }
    }
}

/// Words the tokenizer classifies as keywords. Multi-word phrases are
/// grouped later by the parser from these single-word tokens.
const SQL_KEYWORDS: &[&str] = &[
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CHANGE",
    "CHARACTER",
    "COPY",
    "CREATE",
    "CROSS",
    "DELETE",
    "DESC",
    "DESCRIBE",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXISTS",
    "EXPLAIN",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "MASTER",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "TRUNCATE",
    "UNION",
    "UPDATE",
    "USING",
    "VALUES",
    "VIEW",
    "WHEN",
    "WHERE",
    "WITH",
    "XOR",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    Normal,
    InSingleQuote,
    InDoubleQuote,
    InLineComment,
    InBlockComment,
}

pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        // Position of every char, plus the end-of-input position.
        let mut positions = Vec::with_capacity(chars.len() + 1);
        let mut line = 1;
        let mut col = 0;
        for &c in &chars {
            positions.push(Pos::new(line, col));
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        positions.push(Pos::new(line, col));

        let token = |kind: TokenKind, from: usize, to: usize| Token {
            kind,
            text: chars[from..to].iter().collect(),
            start: positions[from],
            end: positions[to],
        };

        let mut tokens = Vec::new();
        let mut pos = 0;
        let mut state = LexerState::Normal;
        let mut token_start = 0;

        while pos < chars.len() {
            let c = chars[pos];

            match state {
                LexerState::Normal => {
                    if c.is_whitespace() {
                        let start = pos;
                        while pos < chars.len() && chars[pos].is_whitespace() {
                            pos += 1;
                        }
                        tokens.push(token(TokenKind::Whitespace, start, pos));
                        continue;
                    }

                    // Line comment: --
                    if c == '-' && pos + 1 < chars.len() && chars[pos + 1] == '-' {
                        token_start = pos;
                        state = LexerState::InLineComment;
                        pos += 2;
                        continue;
                    }

                    // Block comment: /*
                    if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '*' {
                        token_start = pos;
                        state = LexerState::InBlockComment;
                        pos += 2;
                        continue;
                    }

                    // Single-quoted string: '...'
                    if c == '\'' {
                        token_start = pos;
                        state = LexerState::InSingleQuote;
                        pos += 1;
                        continue;
                    }

                    // Double-quoted identifier: "..."
                    if c == '"' {
                        token_start = pos;
                        state = LexerState::InDoubleQuote;
                        pos += 1;
                        continue;
                    }

                    if Self::is_operator_char(c) {
                        let start = pos;
                        while pos < chars.len() && Self::is_operator_char(chars[pos]) {
                            pos += 1;
                        }
                        let op: String = chars[start..pos].iter().collect();
                        tokens.push(token(TokenKind::Operator(op), start, pos));
                        continue;
                    }

                    if Self::is_punctuation(c) {
                        tokens.push(token(TokenKind::Punctuation(c), pos, pos + 1));
                        pos += 1;
                        continue;
                    }

                    if c.is_ascii_digit() {
                        let start = pos;
                        while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                            pos += 1;
                        }
                        tokens.push(token(TokenKind::Number, start, pos));
                        continue;
                    }

                    // Identifier or keyword
                    if c.is_alphabetic() || c == '_' {
                        let start = pos;
                        while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                            pos += 1;
                        }
                        let text: String = chars[start..pos].iter().collect();
                        let upper = text.to_uppercase();
                        let kind = if SQL_KEYWORDS.contains(&upper.as_str()) {
                            TokenKind::Keyword(upper)
                        } else {
                            TokenKind::Identifier(text)
                        };
                        tokens.push(token(kind, start, pos));
                        continue;
                    }

                    tokens.push(token(TokenKind::Unknown, pos, pos + 1));
                    pos += 1;
                }

                LexerState::InSingleQuote => {
                    if c == '\'' {
                        // Escaped single quote: ''
                        if pos + 1 < chars.len() && chars[pos + 1] == '\'' {
                            pos += 2;
                            continue;
                        }
                        tokens.push(token(TokenKind::StringLiteral, token_start, pos + 1));
                        state = LexerState::Normal;
                        pos += 1;
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InDoubleQuote => {
                    if c == '"' {
                        if pos + 1 < chars.len() && chars[pos + 1] == '"' {
                            pos += 2;
                            continue;
                        }
                        let text: String = chars[token_start..=pos].iter().collect();
                        tokens.push(token(TokenKind::Identifier(text), token_start, pos + 1));
                        state = LexerState::Normal;
                        pos += 1;
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InLineComment => {
                    if c == '\n' {
                        tokens.push(token(TokenKind::Comment, token_start, pos));
                        state = LexerState::Normal;
                        // The newline is picked up as whitespace.
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InBlockComment => {
                    if c == '*' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                        pos += 2;
                        tokens.push(token(TokenKind::Comment, token_start, pos));
                        state = LexerState::Normal;
                        continue;
                    }
                    pos += 1;
                }
            }
        }

        // Unterminated literal or comment at end of input.
        if state != LexerState::Normal {
            let kind = match state {
                LexerState::InSingleQuote => TokenKind::StringLiteral,
                LexerState::InDoubleQuote => {
                    TokenKind::Identifier(chars[token_start..].iter().collect())
                }
                LexerState::InLineComment | LexerState::InBlockComment => TokenKind::Comment,
                LexerState::Normal => unreachable!(),
            };
            tokens.push(token(kind, token_start, chars.len()));
        }

        tokens
    }

    fn is_operator_char(c: char) -> bool {
        matches!(
            c,
            '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' | '%' | '&' | '|' | '^' | '~' | ':'
        )
    }

    fn is_punctuation(c: char) -> bool {
        matches!(c, '(' | ')' | ',' | ';' | '.' | '[' | ']')
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}
