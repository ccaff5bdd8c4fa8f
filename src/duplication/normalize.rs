/// A code line after normalization, remembering where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedLine {
    /// 1-based physical line
    pub line: usize,
    pub text: String,
}

impl NormalizedLine {
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ')
    }
}

/// Strip comments and whitespace variance. Blank and comment-only lines
/// disappear; identifiers are kept as written.
pub fn normalize_source(source: &str) -> Vec<NormalizedLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let code = strip_inline_comment(raw);
            let text = code.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(NormalizedLine {
                line: index + 1,
                text,
            })
        })
        .collect()
}

/// Cut a line at the first `#` that is not inside a single-line string.
fn strip_inline_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(c),
            (None, '#') => return &line[..offset],
            _ => {}
        }
    }
    line
}
