use polars::prelude::{Column, DataFrame, PlSmallStr, PolarsResult};

use super::{Cell, ColumnType, TabularResult};

/// Conversion of tabular output into a polars [`DataFrame`].
///
/// Temporal columns are emitted as ISO-8601 strings so that opaque
/// [`Cell::Text`] fallbacks survive the conversion unchanged.
pub trait ToDataFrame {
    /// Build a frame with one column per schema entry.
    ///
    /// # Errors
    /// Returns the polars error if the columns cannot be assembled.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

fn render(cell: &Cell) -> Option<String> {
    match cell {
        Cell::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Cell::Int(v) => Some(v.to_string()),
        Cell::Float(v) => Some(v.to_string()),
        Cell::Bool(v) => Some(v.to_string()),
        Cell::Text(s) => Some(s.clone()),
        Cell::Null => None,
    }
}

impl ToDataFrame for TabularResult {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let cells = self.rows.iter().map(move |row| row.get(i).unwrap_or(&Cell::Null));
                let name = PlSmallStr::from(spec.name.as_str());
                match spec.ty {
                    ColumnType::Integer => {
                        Column::new(name, cells.map(Cell::as_i64).collect::<Vec<_>>())
                    }
                    ColumnType::Float => {
                        Column::new(name, cells.map(Cell::as_f64).collect::<Vec<_>>())
                    }
                    ColumnType::Boolean => Column::new(
                        name,
                        cells
                            .map(|c| match c {
                                Cell::Bool(b) => Some(*b),
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                    ),
                    ColumnType::DateTime | ColumnType::Date | ColumnType::Text => {
                        Column::new(name, cells.map(render).collect::<Vec<_>>())
                    }
                }
            })
            .collect::<Vec<_>>();
        DataFrame::new(columns)
    }
}
