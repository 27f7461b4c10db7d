use compact_str::CompactString;

/// A potential line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// A space when flat.
    Space,
    /// Nothing when flat. Used just inside brackets.
    Soft,
}

impl Line {
    pub fn flat_text(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Soft => "",
        }
    }
}

/// Text together with the places it may break. The layout engine picks, for
/// every [`Doc::Group`], whether its lines render flat or as newlines.
#[derive(Debug, Clone, PartialEq)]
pub enum Doc {
    Text(CompactString),
    Line(Line),
    Concat(Vec<Doc>),
    /// Lines inside are indented by this many more columns.
    Nest(usize, Box<Doc>),
    /// Render flat if it fits, otherwise break every line directly inside.
    Group(Box<Doc>),
}

impl Doc {
    pub fn nil() -> Self {
        Doc::Concat(Vec::new())
    }

    pub fn text(s: impl Into<CompactString>) -> Self {
        Doc::Text(s.into())
    }

    pub fn line() -> Self {
        Doc::Line(Line::Space)
    }

    pub fn softline() -> Self {
        Doc::Line(Line::Soft)
    }

    pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Self {
        Doc::Concat(docs.into_iter().collect())
    }

    pub fn nest(indent: usize, doc: Doc) -> Self {
        Doc::Nest(indent, Box::new(doc))
    }

    pub fn group(doc: Doc) -> Self {
        Doc::Group(Box::new(doc))
    }

    /// `docs` separated by `sep`.
    pub fn join(docs: impl IntoIterator<Item = Doc>, sep: Doc) -> Self {
        let mut parts = Vec::new();
        for (i, doc) in docs.into_iter().enumerate() {
            if i > 0 {
                parts.push(sep.clone());
            }
            parts.push(doc);
        }
        Doc::Concat(parts)
    }

    /// `docs` separated by `,` and a line.
    pub fn comma_separated(docs: impl IntoIterator<Item = Doc>) -> Self {
        Self::join(docs, Doc::concat([Doc::text(","), Doc::line()]))
    }

    /// `open`, then `inner` nested by `indent` between soft lines, then
    /// `close`, all in one group:
    ///
    /// ```text
    /// (a, b)        or        (
    ///                           a,
    ///                           b
    ///                         )
    /// ```
    pub fn bracket(open: &str, inner: Doc, close: &str, indent: usize) -> Self {
        Doc::group(Doc::concat([
            Doc::text(open),
            Doc::nest(indent, Doc::concat([Doc::softline(), inner])),
            Doc::softline(),
            Doc::text(close),
        ]))
    }

    /// `keyword`, then `body` on the next line indented by `indent` when
    /// broken.
    pub fn keyword_block(keyword: &str, body: Doc, indent: usize) -> Self {
        Doc::concat([
            Doc::text(keyword),
            Doc::nest(indent, Doc::concat([Doc::line(), body])),
        ])
    }

    /// Append `doc`, flattening into an existing `Concat`.
    pub fn append(self, doc: Doc) -> Self {
        match self {
            Doc::Concat(mut parts) => {
                parts.push(doc);
                Doc::Concat(parts)
            }
            other => Doc::Concat(vec![other, doc]),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Doc::Concat(parts) if parts.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_places_separator_between_items() {
        let doc = Doc::join(
            [Doc::text("a"), Doc::text("b"), Doc::text("c")],
            Doc::text("+"),
        );
        assert_eq!(
            doc,
            Doc::Concat(vec![
                Doc::text("a"),
                Doc::text("+"),
                Doc::text("b"),
                Doc::text("+"),
                Doc::text("c"),
            ])
        );
    }

    #[test]
    fn test_join_of_nothing_is_nil() {
        assert!(Doc::join(Vec::new(), Doc::line()).is_nil());
    }

    #[test]
    fn test_bracket_shape() {
        let doc = Doc::bracket("(", Doc::text("x"), ")", 2);
        let Doc::Group(inner) = doc else {
            panic!("bracket should be a group");
        };
        let Doc::Concat(parts) = *inner else {
            panic!("group should hold a concat");
        };
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], Doc::text("("));
        assert!(matches!(parts[1], Doc::Nest(2, _)));
        assert_eq!(parts[2], Doc::softline());
    }

    #[test]
    fn test_append_flattens_concat() {
        let doc = Doc::text("a").append(Doc::text("b")).append(Doc::text("c"));
        assert_eq!(
            doc,
            Doc::Concat(vec![Doc::text("a"), Doc::text("b"), Doc::text("c")])
        );
    }

    #[test]
    fn test_flat_text() {
        assert_eq!(Line::Space.flat_text(), " ");
        assert_eq!(Line::Soft.flat_text(), "");
    }
}
