//! Column-aligned rendering of the discovery listing.

use crate::discovery::RuntimeDescriptor;

const HEADER: [&str; 4] = ["NO", "VERSION", "FULL_VERSION", "HOME"];

/// Render discovered runtimes as `NO VERSION FULL_VERSION HOME` rows.
///
/// Each column is as wide as its widest cell, header included. Cells are
/// separated by one space and trailing padding is trimmed.
pub fn render_runtime_listing<'a, I>(runtimes: I) -> String
where
    I: IntoIterator<Item = &'a RuntimeDescriptor>,
{
    let mut rows: Vec<[String; 4]> = vec![HEADER.map(str::to_string)];
    for (index, runtime) in runtimes.into_iter().enumerate() {
        rows.push([
            (index + 1).to_string(),
            runtime.version.clone(),
            runtime.full_version.clone(),
            runtime.home.display().to_string(),
        ]);
    }

    let mut widths = [0usize; 4];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
