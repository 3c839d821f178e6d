use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, warn};

use crate::location::Location;

const ID_COLUMN: &str = "id";
const LAT_COLUMN: &str = "lat";
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// An input table held as strings, header row first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Strips the `.0` left behind when an integer id went through a float.
pub fn normalize_id(raw: &str) -> String {
    raw.strip_suffix(".0").unwrap_or(raw).to_owned()
}

/// Reads `path` and returns its locations in file order.
pub fn load_locations(path: &Path) -> Result<Vec<Location>> {
    Table::read(path)?.locations()
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_owned()).collect();
        Self { headers, rows }
    }

    /// Reads a spreadsheet or CSV file, picked by extension.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("input file {} not found", path.display());
        }

        let is_spreadsheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);

        let table = if is_spreadsheet {
            Self::read_spreadsheet(path)
        } else {
            Self::read_csv(path)
        }
        .with_context(|| format!("failed reading {}", path.display()))?;

        debug!(rows = table.len(), columns = ?table.headers, "table loaded");
        Ok(table)
    }

    fn read_csv(path: &Path) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = rdr.headers()?.iter().map(str::to_owned).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.context("parsing CSV record")?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        Ok(Self::new(headers, rows))
    }

    fn read_spreadsheet(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| anyhow!("workbook has no sheets"))??;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(Data::to_string).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();

        Ok(Self::new(headers, rows.collect()))
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// `longitude` beats `long`, which beats `lon`.
    pub fn longitude_column(&self) -> Option<usize> {
        self.column("longitude")
            .or_else(|| self.column("long"))
            .or_else(|| self.column("lon"))
    }

    /// Converts the rows into locations. Rows without an id or with
    /// non-numeric coordinates are skipped.
    pub fn locations(&self) -> Result<Vec<Location>> {
        let id_col = self
            .column(ID_COLUMN)
            .ok_or_else(|| anyhow!("missing `{}` column", ID_COLUMN))?;
        let lat_col = self
            .column(LAT_COLUMN)
            .ok_or_else(|| anyhow!("missing `{}` column", LAT_COLUMN))?;
        let lon_col = self
            .longitude_column()
            .ok_or_else(|| anyhow!("missing `lon`, `long` or `longitude` column"))?;

        let mut locations = Vec::with_capacity(self.rows.len());
        for (line, row) in self.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");

            let id = normalize_id(cell(id_col));
            let coords = (cell(lat_col).parse::<f64>(), cell(lon_col).parse::<f64>());

            match (id.is_empty(), coords) {
                (false, (Ok(lat), Ok(lon))) => locations.push(Location { id, lat, lon }),
                _ => warn!(row = line + 1, id = %id, "skipping row without id or coordinates"),
            }
        }

        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn float_ids_lose_trailing_zero() {
        assert_eq!(normalize_id("1023.0"), "1023");
        assert_eq!(normalize_id("1023"), "1023");
        assert_eq!(normalize_id("A17"), "A17");
        assert_eq!(normalize_id("10.00"), "10.00");
        assert_eq!(normalize_id("7.05"), "7.05");
    }

    #[test]
    fn longitude_beats_long() {
        let t = table(&["id", "long", "lat", "longitude"], &[&["1", "9.0", "50.0", "6.5"]]);

        assert_eq!(t.longitude_column(), Some(3));
        assert_eq!(t.locations().unwrap()[0].lon, 6.5);
    }

    #[test]
    fn long_beats_lon() {
        let t = table(&["lon", "long", "id", "lat"], &[&["1.0", "2.0", "x", "3.0"]]);

        assert_eq!(t.locations().unwrap()[0].lon, 2.0);
    }

    #[test]
    fn lon_is_the_fallback() {
        let t = table(&["id", "lat", "lon"], &[&["x", "3.0", "4.0"]]);

        assert_eq!(t.locations().unwrap(), vec![Location::new("x", 3.0, 4.0)]);
    }

    #[test]
    fn missing_columns_fail() {
        assert!(table(&["id", "lat"], &[]).locations().is_err());
        assert!(table(&["lat", "lon"], &[]).locations().is_err());
        assert!(table(&["id", "lon"], &[]).locations().is_err());
    }

    #[test]
    fn bad_rows_are_skipped() {
        let t = table(
            &["id", "lat", "lon"],
            &[&["1", "n/a", "4.0"], &["", "1.0", "1.0"], &["3", "1.0"], &["4.0", "5", "6"]],
        );

        assert_eq!(t.locations().unwrap(), vec![Location::new("4", 5.0, 6.0)]);
    }

    #[test]
    fn reads_csv_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        fs::write(
            &path,
            "id,date,price,lat,long\n7129300520.0,20141013,221900,47.5112,-122.257\n6414100192,20141209,538000,47.721,-122.319\n",
        )
        .unwrap();

        let locations = load_locations(&path).unwrap();

        assert_eq!(
            locations,
            vec![
                Location::new("7129300520", 47.5112, -122.257),
                Location::new("6414100192", 47.721, -122.319),
            ]
        );
    }

    #[test]
    fn reads_first_sheet_of_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/locations.xlsx");

        let locations = load_locations(&path).unwrap();

        // numeric id cells come back from calamine as floats
        assert_eq!(
            locations,
            vec![
                Location::new("1023", 47.5112, -122.257),
                Location::new("2048", 47.721, -122.319),
                Location::new("A17", 50.75, 6.04),
            ]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Table::read(&dir.path().join("nope.csv")).unwrap_err();

        assert!(err.to_string().contains("not found"));
    }
}
