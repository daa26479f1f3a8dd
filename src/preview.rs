use log::info;

use crate::{dataset::Dataset, table::Table};

/// First `rows` rows of the dataset with the inferred type under each name.
pub fn preview_table(dataset: &Dataset, rows: usize) -> Table {
    let headers = dataset
        .columns()
        .iter()
        .map(|column| format!("{} ({})", column.name, column.datatype))
        .collect();
    let rows = dataset.raw_rows().iter().take(rows).cloned().collect();
    Table::new(headers, rows)
}

pub fn print_preview(dataset: &Dataset, rows: usize) {
    let table = preview_table(dataset, rows);
    print!("{}", table.render());
    info!(
        "Displayed {} of {} row(s) from {}",
        table.len(),
        dataset.row_count(),
        dataset.source()
    );
}
