//! Grid rendering for terminal, CSV and JSON output.
//!
//! Every format reads cells through the column descriptors, so what is printed
//! is exactly what a grid would show.

use std::io::{self, Write};

use clap::ValueEnum;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use gqlsheets_core::{ColumnDescriptor, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Table,
    Csv,
    Json,
}

pub fn write_grid<W: Write>(
    out: &mut W,
    format: RenderFormat,
    columns: &[ColumnDescriptor],
    rows: &[Row],
    max_width: usize,
) -> io::Result<()> {
    match format {
        RenderFormat::Table => write_table(out, columns, rows, max_width),
        RenderFormat::Csv => write_csv(out, columns, rows),
        RenderFormat::Json => write_json(out, columns, rows),
    }
}

fn write_table<W: Write>(
    out: &mut W,
    columns: &[ColumnDescriptor],
    rows: &[Row],
    max_width: usize,
) -> io::Result<()> {
    let widths: Vec<usize> = columns
        .iter()
        .map(|col| {
            rows.iter()
                .map(|row| display_width(&col.display(row)))
                .chain(std::iter::once(display_width(&col.header_name)))
                .max()
                .unwrap_or(0)
                .clamp(1, max_width.max(1))
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| pad_right(&col.header_name, w))
        .collect();
    writeln!(out, "{}", header.join(" ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|&w| "\u{2500}".repeat(w)).collect();
    writeln!(out, "{}", rule.join(" "))?;

    for row in rows {
        let line: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| {
                let text = col.display(row);
                if col.is_row_index() {
                    pad_left(&text, w)
                } else {
                    pad_right(&text, w)
                }
            })
            .collect();
        writeln!(out, "{}", line.join(" ").trim_end())?;
    }
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, columns: &[ColumnDescriptor], rows: &[Row]) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns.iter().map(|col| col.field.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|col| col.display(row)))?;
    }
    writer.flush()
}

fn write_json<W: Write>(out: &mut W, columns: &[ColumnDescriptor], rows: &[Row]) -> io::Result<()> {
    let doc = serde_json::json!({
        "columns": columns,
        "rows": rows,
    });
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)
}

pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to `width` display columns, ending in ".." when anything was dropped.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .next()
            .filter(|ch| ch.width().unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut end = 0;
    for (i, ch) in s.char_indices() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        end = i + ch.len_utf8();
    }
    format!("{}..", &s[..end])
}

pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let fill = width.saturating_sub(display_width(&cut));
    format!("{}{}", cut, " ".repeat(fill))
}

pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let fill = width.saturating_sub(display_width(&cut));
    format!("{}{}", " ".repeat(fill), cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsheets_core::{build_columns, project, ColumnLayout, EditSession};
    use gqlsheets_protocol::CellRecord;

    fn sample() -> (Vec<ColumnDescriptor>, Vec<Row>) {
        let records = vec![
            CellRecord::new(0, 0, "=1+1").with_computed("2"),
            CellRecord::new(1, 1, "hello, world"),
        ];
        let rows = project(&records, 0, &EditSession::Idle);
        (build_columns(1, &ColumnLayout::default()), rows)
    }

    fn render(format: RenderFormat, max_width: usize) -> String {
        let (columns, rows) = sample();
        let mut buf = Vec::new();
        write_grid(&mut buf, format, &columns, &rows, max_width).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn truncate_fits() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_cuts_with_dots() {
        assert_eq!(truncate_display("abcdef", 5), "abc..");
        assert_eq!(truncate_display("abcdef", 2), "a");
    }

    #[test]
    fn truncate_respects_wide_chars() {
        // four CJK chars, two columns each
        let t = truncate_display("\u{4e16}\u{754c}\u{4f60}\u{597d}", 7);
        assert_eq!(t, "\u{4e16}\u{754c}..");
        assert!(display_width(&t) <= 7);
    }

    #[test]
    fn padding() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("ab", 4), "  ab");
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn table_shows_computed_values() {
        let out = render(RenderFormat::Table, 24);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  A B");
        assert!(lines[2].starts_with("1 2"));
        assert!(lines[3].ends_with("hello, world"));
        // two data rows plus the append row
        assert_eq!(lines.len(), 2 + 3);
        assert_eq!(lines[4], "3");
    }

    #[test]
    fn table_caps_column_width() {
        let out = render(RenderFormat::Table, 5);
        assert!(out.contains("hel.."));
        assert!(!out.contains("hello"));
    }

    #[test]
    fn csv_quotes_and_keys_by_field() {
        let out = render(RenderFormat::Csv, 24);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "rowIndex,A,B");
        assert_eq!(lines[1], "1,2,");
        assert_eq!(lines[2], "2,,\"hello, world\"");
        assert_eq!(lines[3], "3,,");
    }

    #[test]
    fn json_has_columns_and_rows() {
        let out = render(RenderFormat::Json, 24);
        let val: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(val["columns"].as_array().unwrap().len(), 3);
        assert_eq!(val["rows"][0]["rowIndex"], "1");
        assert_eq!(val["rows"][0]["A"]["computedValue"], "2");
        assert_eq!(val["rows"][2].as_object().unwrap().len(), 1);
    }
}
