use crate::doc::Doc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

type Item<'d> = (usize, Mode, &'d Doc);

/// Render `doc` so that no line exceeds `width` characters unless a single
/// unbreakable piece of text is itself longer.
///
/// Walks the document with an explicit work stack. Each group is measured
/// once, when it is reached, against the column it starts at.
pub fn render(doc: &Doc, width: usize) -> String {
    let mut out = String::new();
    let mut column = 0usize;
    let mut stack: Vec<Item<'_>> = vec![(0, Mode::Break, doc)];

    while let Some((indent, mode, doc)) = stack.pop() {
        match doc {
            Doc::Text(s) => {
                out.push_str(s);
                column = advance_column(column, s);
            }
            Doc::Line(line) => match mode {
                Mode::Flat => {
                    out.push_str(line.flat_text());
                    column += line.flat_text().len();
                }
                Mode::Break => {
                    trim_trailing_spaces(&mut out);
                    out.push('\n');
                    out.extend(std::iter::repeat(' ').take(indent));
                    column = indent;
                }
            },
            Doc::Concat(parts) => {
                stack.extend(parts.iter().rev().map(|part| (indent, mode, part)));
            }
            Doc::Nest(extra, inner) => stack.push((indent + extra, mode, inner)),
            Doc::Group(inner) => {
                let remaining = width as isize - column as isize;
                let mode = if mode == Mode::Flat || fits(remaining, inner, &stack) {
                    Mode::Flat
                } else {
                    Mode::Break
                };
                stack.push((indent, mode, inner));
            }
        }
    }

    out
}

/// Whether `doc` rendered flat, followed by the pending work up to its first
/// line break, fits in `remaining` columns. Stops as soon as the budget runs
/// out.
fn fits(mut remaining: isize, doc: &Doc, rest: &[Item<'_>]) -> bool {
    let mut rest_idx = rest.len();
    let mut work: Vec<(Mode, &Doc)> = vec![(Mode::Flat, doc)];

    loop {
        if remaining < 0 {
            return false;
        }
        let (mode, doc) = match work.pop() {
            Some(item) => item,
            None => {
                if rest_idx == 0 {
                    return true;
                }
                rest_idx -= 1;
                let (_, mode, doc) = rest[rest_idx];
                (mode, doc)
            }
        };
        match doc {
            Doc::Text(s) => match s.find('\n') {
                Some(idx) => return remaining >= s[..idx].chars().count() as isize,
                None => remaining -= s.chars().count() as isize,
            },
            Doc::Line(line) => match mode {
                Mode::Flat => remaining -= line.flat_text().len() as isize,
                Mode::Break => return true,
            },
            Doc::Concat(parts) => work.extend(parts.iter().rev().map(|part| (mode, part))),
            Doc::Nest(_, inner) | Doc::Group(inner) => work.push((mode, inner)),
        }
    }
}

fn advance_column(column: usize, s: &str) -> usize {
    match s.rfind('\n') {
        Some(idx) => s[idx + 1..].chars().count(),
        None => column + s.chars().count(),
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
}
