use colored::Colorize;
use serde_json::Value;

use crate::{config::OutputConfig, db::ResultSet};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub limits:  OutputConfig
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            limits:  OutputConfig::default()
        }
    }
}

/// Format a result set based on output options
///
/// JSON and YAML carry every row and column; only the text table applies the
/// display limits.
pub fn format_results(results: &ResultSet, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(results).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(results).unwrap_or_default(),
        OutputFormat::Text => format_text_table(results, opts)
    }
}

fn format_text_table(results: &ResultSet, opts: &OutputOptions) -> String {
    let limits = opts.limits;
    let mut output = String::new();

    let mut headers: Vec<String> = results.columns.clone();
    let mut rows: Vec<Vec<String>> = results
        .rows
        .iter()
        .map(|row| row.iter().map(render_cell).collect())
        .collect();

    let max_columns = limits.max_columns.max(1);
    if headers.len() > max_columns {
        let hidden = headers.len() - max_columns;
        headers.truncate(max_columns);
        headers.push(format!("... ({} columns hidden)", hidden));
        for row in &mut rows {
            row.truncate(max_columns);
            row.push(String::from("..."));
        }
    }

    if rows.len() > limits.max_rows {
        output.push_str(&format!(
            "Note: Displaying only the first {} rows out of {} available.\n\n",
            limits.max_rows,
            rows.len()
        ));
        rows.truncate(limits.max_rows);
    }

    let displayed = headers.len().min(max_columns).max(1);
    let cell_width = (limits.total_width / displayed).max(1);

    let wrapped: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| wrap_cell(cell, cell_width)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| text_width(h)).collect();
    for row in &wrapped {
        for (idx, lines) in row.iter().enumerate() {
            let longest = lines.iter().map(|l| text_width(l)).max().unwrap_or(0);
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(longest);
            }
        }
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect::<Vec<_>>()
        .join("  ");
    if opts.colored {
        output.push_str(&header_line.trim_end().cyan().bold().to_string());
    } else {
        output.push_str(header_line.trim_end());
    }
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    output.push('\n');

    for row in &wrapped {
        let height = row.iter().map(Vec::len).max().unwrap_or(1);
        for line_idx in 0..height {
            let line = widths
                .iter()
                .enumerate()
                .map(|(idx, w)| {
                    let text = row
                        .get(idx)
                        .and_then(|lines| lines.get(line_idx))
                        .map(String::as_str)
                        .unwrap_or("");
                    pad(text, *w)
                })
                .collect::<Vec<_>>()
                .join("  ");
            output.push_str(line.trim_end());
            output.push('\n');
        }
    }

    let count = results.rows.len();
    let footer = format!("({} row{})", count, if count == 1 { "" } else { "s" });
    if opts.colored {
        output.push_str(&footer.dimmed().to_string());
    } else {
        output.push_str(&footer);
    }
    output
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("NULL"),
        Value::String(s) => s.clone(),
        other => other.to_string()
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_cell(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current.is_empty() {
                word.len()
            } else {
                text_width(&current) + 1 + word.len()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_cell_short_text() {
        assert_eq!(wrap_cell("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_cell_breaks_on_whitespace() {
        assert_eq!(wrap_cell("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_wrap_cell_splits_long_word() {
        assert_eq!(wrap_cell("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_cell_keeps_newlines() {
        assert_eq!(wrap_cell("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_cell_empty() {
        assert_eq!(wrap_cell("", 10), vec![""]);
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Value::Null), "NULL");
        assert_eq!(render_cell(&Value::from("x")), "x");
        assert_eq!(render_cell(&Value::from(3)), "3");
        assert_eq!(render_cell(&Value::from(true)), "true");
    }
}
