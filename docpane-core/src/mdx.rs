//! Import and export statement extraction for MDX sources

use log::warn;

const IMPORT_PREFIX: &str = "import ";
const EXPORT_PREFIXES: [&str; 2] = ["export const ", "export function "];

/// A single `import` line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportStatement {
    pub text: String,
    pub source_line_index: usize,
}

/// A top-level `export const` / `export function` statement, possibly
/// spanning several lines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportBlock {
    pub name: String,
    pub text: String,
    pub start_line: usize,
    /// Inclusive
    pub end_line: usize,
}

impl ExportBlock {
    pub fn line_range(&self) -> std::ops::RangeInclusive<usize> {
        self.start_line..=self.end_line
    }
}

/// Every line whose trimmed text starts with `import `, in source order
pub fn extract_imports(source: &str) -> Vec<ImportStatement> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim().starts_with(IMPORT_PREFIX))
        .map(|(idx, line)| ImportStatement {
            text: line.to_string(),
            source_line_index: idx,
        })
        .collect()
}

/// Export block being accumulated
struct OpenExport<'a> {
    name: String,
    start_line: usize,
    lines: Vec<&'a str>,
    braces: i64,
    parens: i64,
}

impl<'a> OpenExport<'a> {
    fn push(&mut self, line: &'a str) {
        for c in line.chars() {
            match c {
                '{' => self.braces += 1,
                '}' => self.braces -= 1,
                '(' => self.parens += 1,
                ')' => self.parens -= 1,
                _ => {}
            }
        }
        self.lines.push(line);
    }

    fn is_complete(&self) -> bool {
        self.braces == 0
            && self.parens == 0
            && self.lines.last().is_some_and(|l| l.trim().ends_with(';'))
    }

    fn close(self, end_line: usize) -> ExportBlock {
        ExportBlock {
            name: self.name,
            text: self.lines.join("\n"),
            start_line: self.start_line,
            end_line,
        }
    }
}

/// Extract `export const` / `export function` blocks.
///
/// A block ends once braces and parens are balanced and the line ends with
/// `;`. A block still open at end of input is closed at the last line.
pub fn extract_exports(source: &str) -> Vec<ExportBlock> {
    let mut exports = Vec::new();
    let mut current: Option<OpenExport<'_>> = None;
    let mut last_line = 0;

    for (idx, line) in source.lines().enumerate() {
        last_line = idx;

        if current.is_none() {
            let trimmed = line.trim_start();
            if !EXPORT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
                continue;
            }
            current = Some(OpenExport {
                name: export_name(trimmed).unwrap_or_else(|| format!("export_{idx}")),
                start_line: idx,
                lines: Vec::new(),
                braces: 0,
                parens: 0,
            });
        }

        if let Some(open) = current.as_mut() {
            open.push(line);
            if open.is_complete() {
                if let Some(open) = current.take() {
                    exports.push(open.close(idx));
                }
            }
        }
    }

    if let Some(open) = current {
        warn!(
            "export `{}` starting at line {} is unterminated; closing at end of input",
            open.name, open.start_line
        );
        exports.push(open.close(last_line));
    }

    exports
}

/// Identifier following `export const` / `export function`
fn export_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix("export")?.trim_start();
    let rest = rest
        .strip_prefix("const")
        .or_else(|| rest.strip_prefix("function"))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|&c| c.is_alphanumeric() || c == '_' || c == '$')
        .collect();

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        None
    } else {
        Some(name)
    }
}

/// Source with every import line and export block removed
pub fn strip_statements(source: &str) -> String {
    let imports = extract_imports(source);
    let exports = extract_exports(source);

    source
        .split('\n')
        .enumerate()
        .filter(|(idx, _)| !is_statement_line(*idx, &imports, &exports))
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `line_idx` belongs to an import or an export block
pub fn is_statement_line(
    line_idx: usize,
    imports: &[ImportStatement],
    exports: &[ExportBlock],
) -> bool {
    imports.iter().any(|i| i.source_line_index == line_idx)
        || exports.iter().any(|e| e.line_range().contains(&line_idx))
}
