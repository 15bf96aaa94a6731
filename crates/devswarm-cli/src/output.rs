use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Counts and percentages read better flush right.
fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.strip_suffix('%').unwrap_or(cell);
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    // A column is right-aligned when every cell in it is numeric.
    let right: Vec<bool> = (0..widths.len())
        .map(|i| {
            !rows.is_empty()
                && rows
                    .iter()
                    .all(|row| row.get(i).map_or(true, |cell| is_numeric(cell)))
        })
        .collect();

    let pad = |cell: &str, i: usize| -> String {
        let width = widths.get(i).copied().unwrap_or(0);
        if right.get(i).copied().unwrap_or(false) {
            format!("{cell:>width$}")
        } else {
            format!("{cell:<width$}")
        }
    };

    let mut out = String::new();
    let header: Vec<String> = headers.iter().enumerate().map(|(i, h)| pad(h, i)).collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row.iter().enumerate().map(|(i, c)| pad(c, i)).collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
