use crate::error::{FigureError, Result};
use crate::models::{History, Snapshot, SnapshotFile};
use crate::options::DisplayOptions;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Load a snapshot from JSON: `t`, `shape`, flat row-major `fields` and
/// optional coordinate arrays.
pub fn load_snapshot_json<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let f = File::open(path)?;
    let raw: SnapshotFile = serde_json::from_reader(BufReader::new(f))?;
    Snapshot::try_from(raw)
}

/// Save a snapshot as pretty JSON.
pub fn save_snapshot_json<P: AsRef<Path>>(snap: &Snapshot, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&SnapshotFile::from(snap))?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Load a history CSV. The first column is time, every other column a series.
pub fn load_history_csv<P: AsRef<Path>>(path: P) -> Result<History> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(FigureError::ShapeMismatch("history file has no columns".into()));
    }
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        for (col, cell) in columns.iter_mut().zip(record.iter()) {
            let v = cell.parse::<f64>().map_err(|e| {
                FigureError::ShapeMismatch(format!("history row {}: '{cell}': {e}", line + 2))
            })?;
            col.push(v);
        }
    }
    let mut columns = columns.into_iter();
    let t = columns.next().unwrap_or_default();
    let mut history = History::new(t);
    for (name, values) in headers.into_iter().skip(1).zip(columns) {
        history.insert(name, values)?;
    }
    Ok(history)
}

/// Save a history as CSV with a `t` column first.
pub fn save_history_csv<P: AsRef<Path>>(history: &History, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let names: Vec<&str> = history.series_names().collect();
    let series = names
        .iter()
        .map(|n| history.series(n))
        .collect::<Result<Vec<_>>>()?;
    wtr.write_record(std::iter::once("t").chain(names.iter().copied()))?;
    for (row, t) in history.times().iter().enumerate() {
        let mut record = vec![t.to_string()];
        record.extend(series.iter().map(|s| s[row].to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Load display options from JSON. Missing keys take their defaults.
pub fn load_options_json<P: AsRef<Path>>(path: P) -> Result<DisplayOptions> {
    let f = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field3;
    use tempfile::tempdir;

    #[test]
    fn write_and_read_history() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("h.csv");
        let h = History::new(vec![0.0, 5.0, 10.0])
            .with_series("Mdot", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_series("phi_b", vec![0.5, 0.25, 0.125])
            .unwrap();
        save_history_csv(&h, &p).unwrap();
        let back = load_history_csv(&p).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn bad_history_cell_is_reported() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("h.csv");
        std::fs::write(&p, "t,Mdot\n0,1\n1,oops\n").unwrap();
        let err = load_history_csv(&p).unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn snapshot_shape_is_checked_on_load() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("s.json");
        std::fs::write(
            &p,
            r#"{"t": 1.0, "shape": [1, 1, 2], "fields": {"rho": [1.0, 2.0, 3.0]}}"#,
        )
        .unwrap();
        assert!(matches!(
            load_snapshot_json(&p),
            Err(FigureError::ShapeMismatch(_))
        ));

        let snap = Snapshot::new(2.0, [1, 1, 2])
            .with_field("rho", Field3::filled([1, 1, 2], 4.0))
            .unwrap();
        save_snapshot_json(&snap, &p).unwrap();
        assert_eq!(load_snapshot_json(&p).unwrap(), snap);
    }

    #[test]
    fn options_fill_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("o.json");
        std::fs::write(&p, r#"{"vmin": -2, "log": true, "colour": "x"}"#).unwrap();
        let o = load_options_json(&p).unwrap();
        assert_eq!(o.vmin, Some(-2.0));
        assert!(o.log);
        assert!(o.xlabel);
        assert!(o.extra.contains_key("colour"));
    }
}
