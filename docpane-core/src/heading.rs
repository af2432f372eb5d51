//! ATX heading scanning with fenced code block tracking

use crate::slug::slugify;

/// A fence opener: marker character and run length (at least 3)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fence {
    pub marker: char,
    pub len: usize,
}

impl Fence {
    /// Whether `line` closes a block opened by this fence: the same marker,
    /// a run at least as long, and nothing after it.
    pub fn is_closed_by(&self, line: &str) -> bool {
        match fence_run(line) {
            Some((fence, rest)) => {
                fence.marker == self.marker && fence.len >= self.len && rest.trim().is_empty()
            }
            None => false,
        }
    }
}

/// A heading found in markdown source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingRecord {
    pub level: u8,
    pub title: String,
    pub slug: String,
    pub source_line_index: usize,
}

impl HeadingRecord {
    pub fn new(level: u8, title: impl Into<String>, source_line_index: usize) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            level,
            title,
            slug,
            source_line_index,
        }
    }
}

/// Options controlling which lines may be detected as headings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Treat lines indented by 4+ spaces as indented code
    pub skip_indented_code: bool,
}

/// Lazy iterator over `(line_index, level, title)` for every ATX heading
/// outside fenced code blocks.
///
/// Cloning a scanner yields an independent cursor over the same text.
#[derive(Clone, Debug)]
pub struct HeadingScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    options: ScanOptions,
    fences: FenceTracker,
}

impl<'a> HeadingScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_options(text, ScanOptions::default())
    }

    pub fn with_options(text: &'a str, options: ScanOptions) -> Self {
        Self {
            lines: text.lines().enumerate(),
            options,
            fences: FenceTracker::default(),
        }
    }
}

impl<'a> Iterator for HeadingScanner<'a> {
    type Item = (usize, u8, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (line_idx, line) in self.lines.by_ref() {
            if self.fences.update(line) {
                continue;
            }
            if self.options.skip_indented_code && is_indented_code(line) {
                continue;
            }
            if let Some((level, title)) = parse_atx_heading(line) {
                return Some((line_idx, level, title));
            }
        }
        None
    }
}

/// Tracks fence state for callers that walk lines themselves
#[derive(Clone, Copy, Debug, Default)]
pub struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    /// Feed one line; returns the heading on that line, if any.
    pub fn heading<'l>(&mut self, line: &'l str) -> Option<(u8, &'l str)> {
        if self.update(line) {
            return None;
        }
        parse_atx_heading(line)
    }

    /// Feed one line; true if it is a fence line or inside a fenced block.
    fn update(&mut self, line: &str) -> bool {
        match self.open {
            Some(fence) => {
                if fence.is_closed_by(line) {
                    self.open = None;
                }
                true
            }
            None => match fence_run(line) {
                Some((fence, _)) => {
                    self.open = Some(fence);
                    true
                }
                None => false,
            },
        }
    }

    pub fn in_code_block(&self) -> bool {
        self.open.is_some()
    }
}

/// Collect all headings of `text` as records
pub fn scan_headings(text: &str) -> Vec<HeadingRecord> {
    HeadingScanner::new(text)
        .map(|(line, level, title)| HeadingRecord::new(level, title, line))
        .collect()
}

/// The fence opened by `line`, if any
pub fn parse_fence(line: &str) -> Option<Fence> {
    fence_run(line).map(|(fence, _)| fence)
}

fn fence_run(line: &str) -> Option<(Fence, &str)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }
    let rest = &trimmed[len..];
    // A backtick fence's info string may not contain backticks
    if marker == '`' && rest.contains('`') {
        return None;
    }
    Some((Fence { marker, len }, rest))
}

fn is_indented_code(line: &str) -> bool {
    line.chars().take_while(|&c| c == ' ').count() >= 4
}

/// Parse an ATX heading line into `(level, title)`.
///
/// The marker must be 1-6 `#` followed by whitespace and non-empty text.
pub fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }

    let hash_count = trimmed.chars().take_while(|&c| c == '#').count();
    if hash_count > 6 {
        return None;
    }

    let rest = &trimmed[hash_count..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    let title = rest.trim();
    if title.is_empty() {
        return None;
    }

    Some((hash_count as u8, title))
}
