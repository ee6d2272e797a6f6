use crate::models::path::{DocPath, PathSegment};
use lsp_types::{Position, Range};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static YAML_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"((?:[^"\\]|\\.)*)"|'((?:[^']|'')*)'|([^\s#'"{\[\]},:?-][^:#]*?|[-?][^\s:#][^:#]*?))\s*:(?:\s+(.*))?$"#)
        .expect("static yaml key regex")
});

/// Maps document paths to their location in the source text.
///
/// Built from the raw text, so paths that only exist after `$ref` resolution
/// are answered through their nearest mapped ancestor.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    ranges: HashMap<DocPath, Range>,
}

impl SourceMap {
    /// Build a position map from document content
    pub fn build(content: &str) -> Self {
        let first = content.trim_start().chars().next();
        if matches!(first, Some('{') | Some('[')) {
            JsonScanner::new(content).scan()
        } else {
            Self::build_yaml(content)
        }
    }

    /// Range recorded for exactly `path`
    pub fn range_for(&self, path: &[PathSegment]) -> Option<Range> {
        self.ranges.get(path).copied()
    }

    /// Range for `path` or its closest mapped ancestor; zero range if none
    pub fn nearest_range(&self, path: &[PathSegment]) -> Range {
        (0..=path.len())
            .rev()
            .find_map(|len| self.range_for(&path[..len]))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    fn build_yaml(content: &str) -> Self {
        let mut ranges = HashMap::new();
        // (indent, segment, is_sequence_item)
        let mut stack: Vec<(usize, PathSegment, bool)> = Vec::new();
        let mut block_scalar: Option<usize> = None;

        for (line_idx, line) in content.lines().enumerate() {
            let line_number = line_idx as u32;
            let indent = line.len() - line.trim_start_matches(' ').len();
            let trimmed = line.trim();

            if let Some(owner_indent) = block_scalar {
                if trimmed.is_empty() || indent > owner_indent {
                    continue;
                }
                block_scalar = None;
            }
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("---")
                || trimmed.starts_with("...")
            {
                continue;
            }

            let mut col = indent;
            let mut rest = &line[indent..];

            while rest == "-" || rest.starts_with("- ") {
                while stack.last().is_some_and(|(i, _, _)| *i > col) {
                    stack.pop();
                }
                let mut index = 0;
                if stack.last().is_some_and(|(i, _, item)| *i == col && *item) {
                    if let Some((_, PathSegment::Index(prev), _)) = stack.pop() {
                        index = prev + 1;
                    }
                }
                stack.push((col, PathSegment::Index(index), true));
                ranges.insert(
                    stack.iter().map(|(_, s, _)| s.clone()).collect(),
                    Range::new(
                        Position::new(line_number, col as u32),
                        Position::new(line_number, col as u32 + 1),
                    ),
                );
                let after = rest[1..].trim_start_matches(' ');
                col += rest.len() - after.len();
                rest = after;
            }

            let Some(caps) = YAML_KEY_RE.captures(rest) else {
                continue;
            };
            let raw_key = caps.get(1).or(caps.get(2)).or(caps.get(3));
            let Some(raw_key) = raw_key else {
                continue;
            };
            let key = if caps.get(2).is_some() {
                raw_key.as_str().replace("''", "'")
            } else {
                raw_key.as_str().trim_end().to_string()
            };

            let key_len = if caps.get(3).is_some() {
                raw_key.start() + key.len()
            } else {
                // closing quote
                raw_key.end() + 1
            };

            while stack.last().is_some_and(|(i, _, _)| *i >= col) {
                stack.pop();
            }
            stack.push((col, PathSegment::Key(key), false));

            ranges.insert(
                stack.iter().map(|(_, s, _)| s.clone()).collect(),
                Range::new(
                    Position::new(line_number, col as u32),
                    Position::new(line_number, (col + key_len) as u32),
                ),
            );

            if let Some(value) = caps.get(4).map(|v| v.as_str().trim()) {
                let indicator = value.split('#').next().unwrap_or_default().trim();
                if indicator.starts_with('|') || indicator.starts_with('>') {
                    block_scalar = Some(col);
                }
            }
        }

        Self { ranges }
    }
}

enum Container {
    Object { key: Option<String> },
    Array { index: usize },
}

/// Character scanner that tracks the container stack of a JSON document
struct JsonScanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    col: u32,
    stack: Vec<Container>,
    ranges: HashMap<DocPath, Range>,
    /// next string in an object is a key
    expect_key: bool,
}

impl<'a> JsonScanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            chars: content.chars().peekable(),
            line: 0,
            col: 0,
            stack: Vec::new(),
            ranges: HashMap::new(),
            expect_key: false,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn current_path(&self) -> DocPath {
        let mut path = Vec::new();
        for container in &self.stack {
            match container {
                Container::Object { key: Some(key) } => path.push(PathSegment::Key(key.clone())),
                Container::Array { index } => path.push(PathSegment::Index(*index)),
                Container::Object { key: None } => {}
            }
        }
        path
    }

    /// Record the start of a value sitting directly in an array
    fn mark_array_item(&mut self) {
        if matches!(self.stack.last(), Some(Container::Array { .. })) {
            let start = Position::new(self.line, self.col);
            let path = self.current_path();
            self.ranges
                .entry(path)
                .or_insert(Range::new(start, Position::new(self.line, self.col + 1)));
        }
    }

    fn scan(mut self) -> SourceMap {
        while let Some(&c) = self.chars.peek() {
            match c {
                '{' => {
                    self.mark_array_item();
                    self.bump();
                    self.stack.push(Container::Object { key: None });
                    self.expect_key = true;
                }
                '[' => {
                    self.mark_array_item();
                    self.bump();
                    self.stack.push(Container::Array { index: 0 });
                    self.expect_key = false;
                }
                '}' | ']' => {
                    self.bump();
                    self.stack.pop();
                    self.expect_key = false;
                }
                ',' => {
                    self.bump();
                    match self.stack.last_mut() {
                        Some(Container::Array { index }) => *index += 1,
                        Some(Container::Object { .. }) => self.expect_key = true,
                        None => {}
                    }
                }
                '"' => {
                    let start = Position::new(self.line, self.col);
                    if !self.expect_key {
                        self.mark_array_item();
                    }
                    let text = self.read_string();
                    if self.expect_key {
                        if let Some(Container::Object { key }) = self.stack.last_mut() {
                            *key = Some(text);
                        }
                        let end = Position::new(self.line, self.col);
                        let path = self.current_path();
                        self.ranges.insert(path, Range::new(start, end));
                        self.expect_key = false;
                    }
                }
                c if c.is_whitespace() || c == ':' => {
                    self.bump();
                }
                _ => {
                    // bare scalar (number, true, false, null)
                    self.mark_array_item();
                    while self
                        .chars
                        .peek()
                        .is_some_and(|c| !matches!(c, ',' | '}' | ']') && !c.is_whitespace())
                    {
                        self.bump();
                    }
                }
            }
        }
        SourceMap {
            ranges: self.ranges,
        }
    }

    fn read_string(&mut self) -> String {
        let mut out = String::new();
        self.bump();
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    if let Some(escaped) = self.bump() {
                        out.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                }
                '"' => break,
                other => out.push(other),
            }
        }
        out
    }
}
