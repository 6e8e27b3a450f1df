use std::borrow::Cow;
use std::fmt::Write as _;

const MAX_CELL_WIDTH: usize = 40;

/// Renders an aligned plain-text table. Cells wider than
/// [`MAX_CELL_WIDTH`] are cut with an ellipsis.
pub fn render_table<R: AsRef<[String]>>(headers: &[String], rows: &[R]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| display_width(&prepare_cell(h)))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.as_ref().iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(&prepare_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths));
    let rule = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row.as_ref(), &widths));
    }
    output
}

pub fn print_table<R: AsRef<[String]>>(headers: &[String], rows: &[R]) {
    print!("{}", render_table(headers, rows));
}

fn format_line(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = prepare_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

/// Flattens control whitespace and truncates long values.
fn prepare_cell(value: &str) -> Cow<'_, str> {
    let needs_flatten = value.contains(['\n', '\r', '\t']);
    let too_wide = value.chars().count() > MAX_CELL_WIDTH;
    if !needs_flatten && !too_wide {
        return Cow::Borrowed(value);
    }
    let mut prepared = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect::<String>();
    if too_wide {
        prepared = prepared.chars().take(MAX_CELL_WIDTH - 1).collect();
        prepared.push('…');
    }
    Cow::Owned(prepared)
}
