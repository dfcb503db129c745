use std::sync::LazyLock;
use regex::Regex;

static DEFAULT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]").expect("default separator pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    Field,
    Term,
    EditDistance,
    Boost,
    Presence,
    Comparator,
    Comparand,
    RangeStart,
    RangeEnd,
    Eos,
}

/// One lexeme of the query language. `start` and `end` are byte offsets into
/// the source string; `value` has escape characters elided.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

enum State {
    Text,
    Field,
    EditDistance,
    Boost,
    RangeEnd,
}

/// Query-string lexer: a state machine driven until the text is exhausted.
pub struct QueryLexer {
    chars: Vec<(usize, char)>,
    length: usize,
    pos: usize,
    start: usize,
    escape_positions: Vec<usize>,
    lexemes: Vec<Lexeme>,
    separator: Regex,
}

impl QueryLexer {
    pub fn new(query: &str) -> Self {
        QueryLexer {
            chars: query.char_indices().collect(),
            length: query.len(),
            pos: 0,
            start: 0,
            escape_positions: Vec::new(),
            lexemes: Vec::new(),
            separator: DEFAULT_SEPARATOR.clone(),
        }
    }

    /// Run to completion; the final lexeme is always [`LexemeKind::Eos`].
    pub fn run(mut self) -> Vec<Lexeme> {
        let mut state = Some(State::Text);
        while let Some(current) = state {
            state = match current {
                State::Text => self.lex_text(),
                State::Field => self.lex_field(),
                State::EditDistance => self.lex_edit_distance(),
                State::Boost => self.lex_boost(),
                State::RangeEnd => self.lex_range_end(),
            };
        }
        self.lexemes
    }

    fn lex_text(&mut self) -> Option<State> {
        loop {
            let Some(ch) = self.next() else {
                if self.width() > 0 {
                    self.emit(LexemeKind::Term);
                }
                self.emit_eos();
                return None;
            };

            if ch == '\\' {
                self.escape_character();
                continue;
            }

            if ch == ':' {
                return Some(State::Field);
            }

            if ch == '~' {
                self.backup();
                if self.width() > 0 {
                    self.emit(LexemeKind::Term);
                }
                return Some(State::EditDistance);
            }

            if ch == '^' {
                self.backup();
                if self.width() > 0 {
                    self.emit(LexemeKind::Term);
                }
                return Some(State::Boost);
            }

            if ch == '.' && self.peek() == Some('.') {
                self.backup();
                self.emit(LexemeKind::RangeStart);
                self.pos += 2;
                self.start = self.pos;
                return Some(State::RangeEnd);
            }

            // a bare +/- at a clause boundary marks presence
            if (ch == '+' || ch == '-') && self.width() == 1 {
                self.emit(LexemeKind::Presence);
                continue;
            }

            if self.is_separator(ch) {
                if self.width() > 1 {
                    self.backup();
                    self.emit(LexemeKind::Term);
                }
                self.ignore();
                continue;
            }
        }
    }

    fn lex_field(&mut self) -> Option<State> {
        self.backup();
        self.emit(LexemeKind::Field);
        self.ignore();

        if matches!(self.peek(), Some('<') | Some('>')) {
            self.next();
            if self.peek() == Some('=') {
                self.next();
            }
            self.emit(LexemeKind::Comparator);
            self.accept_number();
            self.emit(LexemeKind::Comparand);
        }

        Some(State::Text)
    }

    fn lex_edit_distance(&mut self) -> Option<State> {
        self.ignore();
        self.accept_digits();
        self.emit(LexemeKind::EditDistance);
        Some(State::Text)
    }

    fn lex_boost(&mut self) -> Option<State> {
        self.ignore();
        self.accept_digits();
        self.emit(LexemeKind::Boost);
        Some(State::Text)
    }

    fn lex_range_end(&mut self) -> Option<State> {
        loop {
            let Some(ch) = self.next() else {
                self.emit(LexemeKind::RangeEnd);
                self.emit_eos();
                return None;
            };

            let is_delimiter = matches!(ch, ':' | '~' | '^' | '+' | '-')
                || self.is_separator(ch)
                || (ch == '.' && self.peek() == Some('.'));

            if is_delimiter {
                self.backup();
                self.emit(LexemeKind::RangeEnd);
                return Some(State::Text);
            }
        }
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos)?.1;
        self.pos += 1;
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, ch)| ch)
    }

    fn backup(&mut self) {
        self.pos -= 1;
    }

    fn width(&self) -> usize {
        self.pos - self.start
    }

    /// Drop the pending slice; when empty, consume one character first.
    fn ignore(&mut self) {
        if self.start == self.pos {
            self.pos += 1;
        }
        self.start = self.pos;
    }

    fn accept_digits(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn accept_number(&mut self) {
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        self.accept_digits();
        if self.peek() == Some('.') {
            self.pos += 1;
            self.accept_digits();
        }
    }

    /// Record the just-consumed backslash and step over the escaped character.
    fn escape_character(&mut self) {
        self.escape_positions.push(self.pos - 1);
        self.pos = (self.pos + 1).min(self.chars.len());
    }

    fn emit(&mut self, kind: LexemeKind) {
        let value = self.chars[self.start..self.pos]
            .iter()
            .enumerate()
            .filter(|(offset, _)| !self.escape_positions.contains(&(self.start + offset)))
            .map(|(_, &(_, ch))| ch)
            .collect();

        self.lexemes.push(Lexeme {
            kind,
            value,
            start: self.byte_at(self.start),
            end: self.byte_at(self.pos),
        });

        self.start = self.pos;
        self.escape_positions.clear();
    }

    fn emit_eos(&mut self) {
        self.lexemes.push(Lexeme {
            kind: LexemeKind::Eos,
            value: String::new(),
            start: self.length,
            end: self.length,
        });
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.chars
            .get(char_index)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.length)
    }

    fn is_separator(&self, ch: char) -> bool {
        self.separator.is_match(ch.encode_utf8(&mut [0; 4]))
    }
}
