use crate::error::{GomodError, ParseError, Result};
use serde::Serialize;

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

impl Requirement {
    pub fn new(path: impl Into<String>, version: impl Into<String>, indirect: bool) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            indirect,
        }
    }

    /// Label shown by the selector: `"{path} {version}"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.path, self.version)
    }
}

/// A requirement together with the comments that travel with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireLine {
    pub requirement: Requirement,
    /// Trailing comment text other than the `indirect` marker.
    pub note: Option<String>,
    /// Whole-line comments directly above the requirement, `//` included.
    /// For a one-line `require` these are the comment lines right above the
    /// statement.
    pub comments: Vec<String>,
}

impl RequireLine {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            note: None,
            comments: Vec::new(),
        }
    }

    fn suffix(&self) -> String {
        match (self.requirement.indirect, &self.note) {
            (true, Some(note)) => format!(" // indirect; {note}"),
            (true, None) => " // indirect".to_string(),
            (false, Some(note)) => format!(" // {note}"),
            (false, None) => String::new(),
        }
    }
}

/// A `require` statement: either a single line or a parenthesized block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequireStmt {
    pub lines: Vec<RequireLine>,
    /// Comment on the `require (` line itself.
    pub opening: Option<String>,
    /// Comment lines sitting just before a block's closing paren.
    pub trailing: Vec<String>,
}

impl RequireStmt {
    pub fn new(lines: Vec<RequireLine>) -> Self {
        Self {
            lines,
            opening: None,
            trailing: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.opening.is_none() && self.trailing.is_empty()
    }

    fn fits_one_line(&self) -> bool {
        self.lines.len() == 1 && self.opening.is_none() && self.trailing.is_empty()
    }

    fn render(&self, out: &mut String) -> Result<()> {
        if self.fits_one_line() {
            let line = &self.lines[0];
            for comment in &line.comments {
                out.push_str(comment);
                out.push('\n');
            }
            out.push_str("require ");
            render_requirement(line, out)?;
            out.push('\n');
            return Ok(());
        }

        out.push_str("require (");
        if let Some(comment) = &self.opening {
            out.push(' ');
            out.push_str(comment);
        }
        out.push('\n');
        for line in &self.lines {
            for comment in &line.comments {
                out.push('\t');
                out.push_str(comment);
                out.push('\n');
            }
            out.push('\t');
            render_requirement(line, out)?;
            out.push('\n');
        }
        for comment in &self.trailing {
            out.push('\t');
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(")\n");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry {
    Blank,
    /// Any non-requirement line, reproduced byte for byte.
    Verbatim(String),
    Require(RequireStmt),
}

/// In-memory go.mod: requirement statements are structured, the rest is
/// kept as opaque lines in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    file: String,
    entries: Vec<Entry>,
}

impl Manifest {
    /// Parse manifest bytes; `file` is only used to locate errors.
    pub fn parse(file: impl Into<String>, data: &[u8]) -> std::result::Result<Self, ParseError> {
        let file = file.into();
        let text = std::str::from_utf8(data).map_err(|e| {
            ParseError::new(&file, line_of_offset(data, e.valid_up_to()), "invalid UTF-8")
        })?;
        let entries = super::parser::parse_entries(&file, text)?;
        Ok(Self { file, entries })
    }

    #[cfg(test)]
    pub(crate) fn from_entries(file: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            file: file.into(),
            entries,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Every requirement in declaration order.
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.require_stmts()
            .flat_map(|stmt| stmt.lines.iter().map(|line| &line.requirement))
    }

    /// Every requirement line in declaration order, comments included.
    pub fn require_lines(&self) -> Vec<RequireLine> {
        self.require_stmts()
            .flat_map(|stmt| stmt.lines.iter().cloned())
            .collect()
    }

    /// Comments left before the closing paren of any require block.
    pub fn require_trailing_comments(&self) -> Vec<String> {
        self.require_stmts()
            .flat_map(|stmt| stmt.trailing.iter().cloned())
            .collect()
    }

    /// Comments written on `require (` lines, in file order.
    pub fn require_opening_comments(&self) -> Vec<String> {
        self.require_stmts()
            .filter_map(|stmt| stmt.opening.clone())
            .collect()
    }

    fn require_stmts(&self) -> impl Iterator<Item = &RequireStmt> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Require(stmt) => Some(stmt),
            _ => None,
        })
    }

    /// Remove every require statement and insert `stmts` where the first
    /// one used to be (end of file when there was none). The inserted
    /// statements are separated from each other and from whatever follows
    /// by a blank line.
    pub fn replace_requires(&mut self, stmts: Vec<RequireStmt>) {
        let dropped = self.require_layout();
        let first = self
            .entries
            .iter()
            .position(|entry| matches!(entry, Entry::Require(_)));
        let anchor = match first {
            Some(idx) => dropped[..idx].iter().filter(|drop| !**drop).count(),
            None => self.entries.len(),
        };

        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .zip(dropped)
            .filter_map(|(entry, drop)| (!drop).then_some(entry))
            .collect();

        let mut inserted = Vec::with_capacity(stmts.len() * 2 + 1);
        for stmt in stmts.into_iter().filter(|stmt| !stmt.is_empty()) {
            if !inserted.is_empty() {
                inserted.push(Entry::Blank);
            }
            inserted.push(Entry::Require(stmt));
        }
        if inserted.is_empty() {
            return;
        }

        if first.is_none() && anchor > 0 {
            inserted.insert(0, Entry::Blank);
        }
        if anchor < self.entries.len() {
            inserted.push(Entry::Blank);
        }

        self.entries.splice(anchor..anchor, inserted);
    }

    /// Marks require statements and the blank lines that only separate one
    /// require statement from the next.
    fn require_layout(&self) -> Vec<bool> {
        let is_require = |entry: Option<&Entry>| matches!(entry, Some(Entry::Require(_)));
        let not_blank = |entry: &&Entry| !matches!(entry, Entry::Blank);

        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| match entry {
                Entry::Require(_) => true,
                Entry::Blank => {
                    is_require(self.entries[..idx].iter().rev().find(not_blank))
                        && is_require(self.entries[idx + 1..].iter().find(not_blank))
                }
                Entry::Verbatim(_) => false,
            })
            .collect()
    }

    /// Drop empty require statements and normalize blank lines: runs
    /// collapse to one, none at the start or end.
    pub fn cleanup(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = normalized(entries);
    }

    /// Serialize to canonical bytes.
    pub fn format(&self) -> Result<Vec<u8>> {
        let mut out = String::new();
        for entry in normalized(self.entries.clone()) {
            match entry {
                Entry::Blank => out.push('\n'),
                Entry::Verbatim(line) => {
                    out.push_str(&line);
                    out.push('\n');
                }
                Entry::Require(stmt) => stmt.render(&mut out)?,
            }
        }
        Ok(out.into_bytes())
    }
}

fn normalized(entries: Vec<Entry>) -> Vec<Entry> {
    let mut out: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Require(ref stmt) if stmt.is_empty() => continue,
            Entry::Blank if out.is_empty() || matches!(out.last(), Some(Entry::Blank)) => continue,
            _ => out.push(entry),
        }
    }
    while matches!(out.last(), Some(Entry::Blank)) {
        out.pop();
    }
    out
}

fn render_requirement(line: &RequireLine, out: &mut String) -> Result<()> {
    let req = &line.requirement;
    if req.path.is_empty() {
        return Err(GomodError::Format(format!(
            "empty module path (version {:?})",
            req.version
        )));
    }
    if req.version.is_empty() || req.version.chars().any(char::is_whitespace) {
        return Err(GomodError::Format(format!(
            "invalid version {:?} for {}",
            req.version, req.path
        )));
    }
    if req.path.contains('\n') || line.note.as_deref().is_some_and(|n| n.contains('\n')) {
        return Err(GomodError::Format(format!(
            "line break inside requirement {}",
            req.path
        )));
    }

    out.push_str(&auto_quote(&req.path));
    out.push(' ');
    out.push_str(&req.version);
    out.push_str(&line.suffix());
    Ok(())
}

/// Quote a token when it could not be read back as a bare word.
fn auto_quote(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.contains("//")
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '`' | '(' | ')' | '\\'));

    if !needs_quotes {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn line_of_offset(data: &[u8], offset: usize) -> usize {
    data[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "module example.com/app

go 1.22

require (
\tmod/x v1.0.0
\tmod/y v1.0.0 // indirect
\tmod/z v2.0.0
)
";

    fn parse(text: &str) -> Manifest {
        Manifest::parse("go.mod", text.as_bytes()).unwrap()
    }

    fn paths(manifest: &Manifest) -> Vec<&str> {
        manifest.requirements().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn requirements_keep_declaration_order() {
        let manifest = parse(SAMPLE);
        assert_eq!(paths(&manifest), vec!["mod/x", "mod/y", "mod/z"]);
        let flags: Vec<bool> = manifest.requirements().map(|r| r.indirect).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn format_of_canonical_input_is_unchanged() {
        let manifest = parse(SAMPLE);
        assert_eq!(String::from_utf8(manifest.format().unwrap()).unwrap(), SAMPLE);
    }

    #[test]
    fn format_collapses_blank_runs_and_trims_edges() {
        let manifest = parse("\n\nmodule m\n\n\n\ngo 1.21\n\n\n");
        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "module m\n\ngo 1.21\n"
        );
    }

    #[test]
    fn replace_requires_inserts_at_first_statement() {
        let mut manifest = parse(
            "module m\n\nrequire a v1.0.0\n\nreplace a => ../a\n\nrequire b v1.0.0 // indirect\n",
        );
        let lines = manifest.require_lines();
        manifest.replace_requires(vec![RequireStmt::new(lines)]);
        manifest.cleanup();

        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "module m\n\nrequire (\n\ta v1.0.0\n\tb v1.0.0 // indirect\n)\n\nreplace a => ../a\n"
        );
    }

    #[test]
    fn replace_requires_appends_when_manifest_had_none() {
        let mut manifest = parse("module m\n");
        manifest.replace_requires(vec![RequireStmt::new(vec![RequireLine::new(
            Requirement::new("a", "v1.0.0", false),
        )])]);
        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "module m\n\nrequire a v1.0.0\n"
        );
    }

    #[test]
    fn empty_blocks_are_dropped() {
        let manifest = parse("module m\n\nrequire (\n)\n");
        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "module m\n"
        );
    }

    #[test]
    fn notes_and_comments_are_rendered() {
        let manifest = parse(
            "require (\n\t// pinned for CI\n\ta v1.0.0 // keep\n\tb v1.0.0 // indirect; via a\n\t// end\n)\n",
        );
        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "require (\n\t// pinned for CI\n\ta v1.0.0 // keep\n\tb v1.0.0 // indirect; via a\n\t// end\n)\n"
        );
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let manifest = Manifest::from_entries(
            "go.mod",
            vec![Entry::Require(RequireStmt::new(vec![RequireLine::new(
                Requirement::new("odd path", "v1.0.0", false),
            )]))],
        );
        assert_eq!(
            String::from_utf8(manifest.format().unwrap()).unwrap(),
            "require \"odd path\" v1.0.0\n"
        );
    }

    #[test]
    fn format_rejects_empty_path() {
        let manifest = Manifest::from_entries(
            "go.mod",
            vec![Entry::Require(RequireStmt::new(vec![RequireLine::new(
                Requirement::new("", "v1.0.0", false),
            )]))],
        );
        assert!(matches!(manifest.format(), Err(GomodError::Format(_))));
    }

    #[test]
    fn label_joins_path_and_version() {
        assert_eq!(
            Requirement::new("mod/x", "v1.2.3", false).label(),
            "mod/x v1.2.3"
        );
    }
}
