use super::manifest::{Entry, RequireLine, RequireStmt, Requirement};
use crate::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

const KNOWN_VERBS: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

/// `// indirect` or `// indirect; <note>`.
static INDIRECT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^indirect(?:;\s+(\S.*))?$").expect("indirect marker regex is valid")
});

/// Tokens of one source line plus its trailing comment, if any.
#[derive(Debug, Default, PartialEq)]
struct Lexed {
    tokens: Vec<String>,
    comment: Option<String>,
}

impl Lexed {
    fn is_blank(&self) -> bool {
        self.tokens.is_empty() && self.comment.is_none()
    }

    fn is(&self, expected: &[&str]) -> bool {
        self.tokens.len() == expected.len()
            && self.tokens.iter().zip(expected).all(|(t, e)| t == e)
    }
}

enum State {
    Top,
    Require {
        start: usize,
        stmt: RequireStmt,
        pending: Vec<String>,
    },
    Opaque {
        start: usize,
    },
}

pub(crate) fn parse_entries(file: &str, text: &str) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();
    let mut state = State::Top;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let lexed = lex_line(raw).map_err(|msg| ParseError::new(file, lineno, msg))?;

        state = match state {
            State::Top => parse_top(file, lineno, raw, lexed, &mut entries)?,
            State::Opaque { start } => {
                entries.push(Entry::Verbatim(raw.to_string()));
                if lexed.is(&[")"]) {
                    State::Top
                } else {
                    State::Opaque { start }
                }
            }
            State::Require {
                start,
                mut stmt,
                mut pending,
            } => {
                if lexed.is(&[")"]) {
                    stmt.trailing = pending;
                    stmt.trailing.extend(lexed.comment.as_deref().map(comment_line));
                    entries.push(Entry::Require(stmt));
                    State::Top
                } else if lexed.tokens.is_empty() {
                    // Blank lines inside a block are not kept.
                    if let Some(comment) = lexed.comment {
                        pending.push(comment_line(&comment));
                    }
                    State::Require {
                        start,
                        stmt,
                        pending,
                    }
                } else {
                    let mut line = require_line(file, lineno, &lexed.tokens, lexed.comment)?;
                    line.comments = std::mem::take(&mut pending);
                    stmt.lines.push(line);
                    State::Require {
                        start,
                        stmt,
                        pending,
                    }
                }
            }
        };
    }

    match state {
        State::Top => Ok(entries),
        State::Require { start, .. } | State::Opaque { start } => Err(ParseError::new(
            file,
            start,
            "unterminated block: missing )",
        )),
    }
}

fn parse_top(
    file: &str,
    lineno: usize,
    raw: &str,
    lexed: Lexed,
    entries: &mut Vec<Entry>,
) -> Result<State, ParseError> {
    if lexed.is_blank() {
        entries.push(Entry::Blank);
        return Ok(State::Top);
    }

    let Some(verb) = lexed.tokens.first() else {
        // Comment-only line.
        entries.push(Entry::Verbatim(raw.to_string()));
        return Ok(State::Top);
    };

    if verb == ")" || verb == "(" {
        return Err(ParseError::new(file, lineno, format!("unexpected {verb}")));
    }
    if !KNOWN_VERBS.contains(&verb.as_str()) {
        return Err(ParseError::new(
            file,
            lineno,
            format!("unknown directive: {verb}"),
        ));
    }

    let opens_block = lexed.tokens.get(1).is_some_and(|t| t == "(");

    if verb == "require" {
        if lexed.is(&["require", "(", ")"]) {
            entries.push(Entry::Require(RequireStmt {
                opening: lexed.comment.as_deref().map(comment_line),
                ..RequireStmt::default()
            }));
            return Ok(State::Top);
        }
        if opens_block {
            if lexed.tokens.len() > 2 {
                return Err(ParseError::new(
                    file,
                    lineno,
                    "unexpected tokens after require (",
                ));
            }
            return Ok(State::Require {
                start: lineno,
                stmt: RequireStmt {
                    opening: lexed.comment.as_deref().map(comment_line),
                    ..RequireStmt::default()
                },
                pending: Vec::new(),
            });
        }
        let mut line = require_line(file, lineno, &lexed.tokens[1..], lexed.comment)?;
        line.comments = take_comment_lines(entries);
        entries.push(Entry::Require(RequireStmt::new(vec![line])));
        return Ok(State::Top);
    }

    entries.push(Entry::Verbatim(raw.to_string()));
    if opens_block && lexed.tokens.len() == 2 {
        Ok(State::Opaque { start: lineno })
    } else {
        Ok(State::Top)
    }
}

fn require_line(
    file: &str,
    lineno: usize,
    args: &[String],
    comment: Option<String>,
) -> Result<RequireLine, ParseError> {
    let [path, version] = args else {
        return Err(ParseError::new(
            file,
            lineno,
            "usage: require module/path v1.2.3",
        ));
    };

    check_version(version).map_err(|msg| ParseError::new(file, lineno, msg))?;

    let (indirect, note) = match comment.filter(|c| !c.is_empty()) {
        Some(text) => match INDIRECT_MARKER.captures(&text) {
            Some(caps) => (true, caps.get(1).map(|m| m.as_str().to_string())),
            None => (false, Some(text)),
        },
        None => (false, None),
    };

    Ok(RequireLine {
        note,
        ..RequireLine::new(Requirement::new(path.clone(), version.clone(), indirect))
    })
}

/// Pop the comment-only lines sitting directly above the current line.
fn take_comment_lines(entries: &mut Vec<Entry>) -> Vec<String> {
    let is_comment =
        |entry: &Entry| matches!(entry, Entry::Verbatim(raw) if raw.trim_start().starts_with("//"));
    let start = entries
        .iter()
        .rposition(|entry| !is_comment(entry))
        .map_or(0, |idx| idx + 1);

    entries
        .drain(start..)
        .filter_map(|entry| match entry {
            Entry::Verbatim(raw) => Some(raw.trim().to_string()),
            _ => None,
        })
        .collect()
}

fn comment_line(text: &str) -> String {
    if text.is_empty() {
        "//".to_string()
    } else {
        format!("// {text}")
    }
}

/// Module versions are `v` followed by a semantic version.
fn check_version(version: &str) -> Result<(), String> {
    let Some(bare) = version.strip_prefix('v') else {
        return Err(format!(
            "invalid module version {version:?}: missing v prefix"
        ));
    };
    semver::Version::parse(bare)
        .map(|_| ())
        .map_err(|e| format!("invalid module version {version:?}: {e}"))
}

/// Split a line into tokens. `(` and `)` are tokens of their own, `//`
/// starts a comment, and tokens may be double-quoted or back-quoted.
fn lex_line(line: &str) -> Result<Lexed, String> {
    let mut lexed = Lexed::default();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if let Some(comment) = rest.strip_prefix("//") {
            lexed.comment = Some(comment.trim().to_string());
            break;
        }

        let first = rest.chars().next().unwrap_or_default();
        let consumed = match first {
            '(' | ')' => {
                lexed.tokens.push(first.to_string());
                1
            }
            '"' => {
                let (token, len) = lex_quoted(rest)?;
                lexed.tokens.push(token);
                len
            }
            '`' => {
                let end = rest[1..]
                    .find('`')
                    .ok_or_else(|| "unterminated raw string".to_string())?;
                lexed.tokens.push(rest[1..end + 1].to_string());
                end + 2
            }
            _ => {
                let end = bare_token_end(rest);
                lexed.tokens.push(rest[..end].to_string());
                end
            }
        };

        rest = rest[consumed..].trim_start();
    }

    Ok(lexed)
}

fn bare_token_end(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'(' | b')' | b'"' | b'`' => break,
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            _ => i += 1,
        }
    }
    i
}

fn lex_quoted(s: &str) -> Result<(String, usize), String> {
    let mut token = String::new();
    let mut chars = s.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((token, i + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => token.push('\n'),
                Some((_, 't')) => token.push('\t'),
                Some((_, other)) => token.push(other),
                None => break,
            },
            _ => token.push(c),
        }
    }

    Err("unterminated quoted string".to_string())
}
