//! Bracket/string scanner used to re-indent exported array literals.
//!
//! The scanner is a fold over characters with three pieces of state: the
//! bracket depth, whether the position is inside a single-quoted string and
//! whether the previous character was a backslash inside that string.
//! Brackets and quotes inside string data are never structural.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub depth: usize,
    pub in_string: bool,
    pub escaped: bool,
}

impl ScanState {
    pub fn at_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }
}

/// Advance the scanner by one character.
pub fn step(state: ScanState, ch: char) -> ScanState {
    if state.in_string {
        if state.escaped {
            return ScanState {
                escaped: false,
                ..state
            };
        }
        return match ch {
            '\\' => ScanState {
                escaped: true,
                ..state
            },
            '\'' => ScanState {
                in_string: false,
                ..state
            },
            _ => state,
        };
    }

    match ch {
        '\'' => ScanState {
            in_string: true,
            ..state
        },
        '(' => ScanState {
            depth: state.depth + 1,
            ..state
        },
        ')' => ScanState {
            depth: state.depth.saturating_sub(1),
            ..state
        },
        _ => state,
    }
}

/// Scan one line starting from `state`.
///
/// Returns the state at the end of the line and the indent level for the
/// line, or `None` when the line begins inside a string literal and must be
/// left untouched. The level is the lowest depth reached on the line, so a
/// closing bracket dedents its own line while an opening bracket only
/// affects the lines after it.
pub fn scan_line(state: ScanState, line: &str) -> (ScanState, Option<usize>) {
    let starts_in_string = state.in_string;
    let (end, lowest) = line.chars().fold((state, state.depth), |(st, lowest), ch| {
        let next = step(st, ch);
        (next, lowest.min(next.depth))
    });

    if starts_in_string {
        (end, None)
    } else {
        (end, Some(lowest))
    }
}

/// Re-indent every line after the first.
///
/// The first line is emitted as-is and its opening bracket places the
/// following lines at `depth`.
pub fn reindent(literal: &str, indent: &str, depth: usize) -> String {
    let mut lines = literal.split('\n');
    let mut out = String::with_capacity(literal.len() * 2);

    let mut state = ScanState::at_depth(depth.saturating_sub(1));
    if let Some(first) = lines.next() {
        state = scan_line(state, first).0;
        out.push_str(first);
    }

    for line in lines {
        out.push('\n');
        if state.in_string {
            state = scan_line(state, line).0;
            out.push_str(line);
            continue;
        }

        let trimmed = line.trim_start_matches([' ', '\t']);
        let (next, level) = scan_line(state, trimmed);
        if let Some(level) = level {
            for _ in 0..level {
                out.push_str(indent);
            }
        }
        out.push_str(trimmed);
        state = next;
    }

    out
}
