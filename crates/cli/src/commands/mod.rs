pub mod query;
pub mod transform;

use quarry_common::table::{Scalar, Table};
use quarry_error::{QuarryError, Result};

/// Render a table as CSV. Nulls become empty cells.
pub(crate) fn write_csv<W: std::io::Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.columns())
        .map_err(|e| QuarryError::from(std::io::Error::other(e.to_string())))?;
    for row in table.rows() {
        out.write_record(row.iter().map(cell_text))
            .map_err(|e| QuarryError::from(std::io::Error::other(e.to_string())))?;
    }
    out.flush().map_err(QuarryError::from)?;
    Ok(())
}

fn cell_text(value: &Scalar) -> String {
    match value {
        Scalar::Null => String::new(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Str(s) => s.clone(),
    }
}
