use crate::error::{BoardError, BoardResult};
use std::collections::HashMap;

/// A named-column table of string cells, as exported by a spreadsheet tab
///
/// This is the raw shape every sheet snapshot arrives in: a header row of
/// column names followed by data rows. Cells stay as strings until a typed
/// layer (see `records`) parses them; the lookup tables used for pie charts
/// are consumed in this raw form directly.
///
/// # Examples
/// ```
/// use postboard::table::DataTable;
///
/// let table = DataTable::from_csv("Location,Total followers\nUS,300\nUK,150").unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get(0, "Location"), Some("US"));
/// ```
#[derive(Clone, Debug)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Build a table from in-memory columns and rows
    ///
    /// Used by the generated data sources; every row must have exactly one
    /// cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> BoardResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(BoardError::FetchFailure(format!(
                "row has {} cells, expected {}",
                bad.len(),
                columns.len()
            )));
        }
        Ok(DataTable { columns, rows })
    }

    /// Parse a table from CSV text
    ///
    /// The first line is treated as the header row. Quoted fields may contain
    /// commas, doubled quotes and any other character; rows shorter than the
    /// header are padded with empty cells and longer rows are truncated, so
    /// every row ends up with exactly one cell per column.
    ///
    /// # Arguments
    /// * `text` - Full CSV content including the header line
    ///
    /// # Returns
    /// * `BoardResult<DataTable>` - The parsed table, or `FetchFailure` if the
    ///   input has no header row
    pub fn from_csv(text: &str) -> BoardResult<Self> {
        let mut lines = text.lines();

        let header = lines
            .next()
            .ok_or_else(|| BoardError::FetchFailure("CSV content is empty".to_string()))?;
        let columns = parse_csv_row(header);

        let mut rows = Vec::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut cells = parse_csv_row(line);
            cells.resize(columns.len(), String::new());
            rows.push(cells);
        }

        Ok(DataTable { columns, rows })
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the index of a named column
    pub fn column_index(&self, name: &str) -> BoardResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| BoardError::MissingColumn(name.to_string()))
    }

    /// Get a single cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All values of one column, in row order
    pub fn column_values(&self, name: &str) -> BoardResult<Vec<&str>> {
        let col = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Convert the table to a list of column-name → cell maps
    ///
    /// This is the shape the HTML templates iterate over when rendering a
    /// table on the page, one map per row.
    pub fn to_records(&self) -> Vec<HashMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if let Some(&next) = chars.peek() {
                    if next == '"' && in_quotes {
                        // Double quote inside quoted field - add a single quote
                        current_field.push('"');
                        chars.next();
                    } else {
                        // Toggle quote state
                        in_quotes = !in_quotes;
                    }
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                // End of field
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    // Add the last field
    result.push(current_field);

    result
}
