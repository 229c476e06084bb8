use super::{SelectOptions, Selector};
use crate::error::{GomodError, Result};
use colored::Colorize;
use regex::Regex;
use std::io::{self, BufRead, Stderr, StdinLock, Write};

/// Line-driven multi-select on a terminal.
///
/// Entries are listed with a check column; the operator toggles them by
/// number, narrows the list with `/pattern` and confirms with an empty line.
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl TerminalSelector<StdinLock<'static>, Stderr> {
    /// Read answers from stdin and draw on stderr, keeping stdout clean.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, labels: &[String], state: &SelectState) -> Result<()> {
        let io_err = |e: io::Error| GomodError::Selection(format!("write: {e}"));

        let checked = state.checked.iter().filter(|c| **c).count();
        writeln!(
            self.output,
            "\n{} {}",
            "Select modules to update".cyan().bold(),
            format!("({checked}/{} checked)", labels.len()).dimmed()
        )
        .map_err(io_err)?;

        if let Some(filter) = &state.filter {
            writeln!(self.output, "{}", format!("filter: {}", filter.pattern).dimmed())
                .map_err(io_err)?;
        }

        let visible = state.visible(labels);
        if visible.is_empty() {
            writeln!(self.output, "  {}", "(no matches)".dimmed()).map_err(io_err)?;
        }
        for (pos, &idx) in visible.iter().enumerate() {
            let mark = if state.checked[idx] {
                "[x]".green().bold()
            } else {
                "[ ]".normal()
            };
            writeln!(self.output, "{:>4}. {} {}", pos + 1, mark, labels[idx]).map_err(io_err)?;
        }

        write!(
            self.output,
            "{}",
            "toggle [1 3-5], /filter, a(ll), n(one), q(uit), enter to confirm: ".bold()
        )
        .map_err(io_err)?;
        self.output.flush().map_err(io_err)
    }

    fn read_command(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| GomodError::Selection(format!("read input: {e}")))?;
        if read == 0 {
            return Err(GomodError::Selection("input closed".to_string()));
        }
        Ok(line.trim().to_string())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message.red())
            .map_err(|e| GomodError::Selection(format!("write: {e}")))
    }
}

impl<R: BufRead, W: Write> Selector for TerminalSelector<R, W> {
    fn select(&mut self, labels: &[String], options: SelectOptions) -> Result<Vec<usize>> {
        let mut state = SelectState::new(labels.len(), options.preselect_all);

        loop {
            self.render(labels, &state)?;
            let command = self.read_command()?;

            match command.as_str() {
                "" => return Ok(state.confirmed()),
                "q" | "quit" => {
                    return Err(GomodError::Selection("selection aborted".to_string()));
                }
                "a" | "all" => state.set_visible(labels, true),
                "n" | "none" => state.set_visible(labels, false),
                _ if command.starts_with('/') => {
                    let pattern = command[1..].trim();
                    if pattern.is_empty() {
                        state.filter = None;
                    } else {
                        match PatternMatcher::new(pattern) {
                            Ok(matcher) => state.filter = Some(matcher),
                            Err(msg) => self.notice(&msg)?,
                        }
                    }
                }
                _ => match parse_positions(&command, state.visible(labels).len()) {
                    Ok(positions) => state.toggle(labels, &positions),
                    Err(msg) => self.notice(&msg)?,
                },
            }
        }
    }
}

struct SelectState {
    checked: Vec<bool>,
    filter: Option<PatternMatcher>,
}

impl SelectState {
    fn new(len: usize, preselect_all: bool) -> Self {
        Self {
            checked: vec![preselect_all; len],
            filter: None,
        }
    }

    fn visible(&self, labels: &[String]) -> Vec<usize> {
        (0..labels.len())
            .filter(|&idx| {
                self.filter
                    .as_ref()
                    .is_none_or(|filter| filter.matches(&labels[idx]))
            })
            .collect()
    }

    fn set_visible(&mut self, labels: &[String], value: bool) {
        for idx in self.visible(labels) {
            self.checked[idx] = value;
        }
    }

    fn toggle(&mut self, labels: &[String], positions: &[usize]) {
        let visible = self.visible(labels);
        for &pos in positions {
            let idx = visible[pos];
            self.checked[idx] = !self.checked[idx];
        }
    }

    fn confirmed(&self) -> Vec<usize> {
        self.checked
            .iter()
            .enumerate()
            .filter_map(|(idx, &checked)| checked.then_some(idx))
            .collect()
    }
}

/// Parse `1 3-5` into zero-based positions within `len` visible entries.
fn parse_positions(input: &str, len: usize) -> std::result::Result<Vec<usize>, String> {
    let parse = |s: &str| -> std::result::Result<usize, String> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        if n == 0 || n > len {
            return Err(format!("{n} is out of range (1-{len})"));
        }
        Ok(n - 1)
    };

    let mut positions = Vec::new();
    for part in input.split([' ', ',']).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("range {part} is reversed"));
                }
                positions.extend(start..=end);
            }
            None => positions.push(parse(part)?),
        }
    }
    Ok(positions)
}

/// Case-insensitive glob; a pattern without wildcards matches as a substring.
struct PatternMatcher {
    pattern: String,
    regex: Regex,
}

impl PatternMatcher {
    fn new(pattern: &str) -> std::result::Result<Self, String> {
        let adjusted = if pattern.contains(['*', '?']) {
            pattern.to_string()
        } else {
            format!("*{pattern}*")
        };

        let mut expr = String::from("(?i)^");
        for ch in adjusted.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                _ => expr.push_str(&regex::escape(&ch.to_string())),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr)
            .map_err(|e| format!("Invalid filter pattern '{pattern}': {e}"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}
