//! Сохранение и загрузка таблицы весов

use std::io::{Read, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{DslrError, Result};
use crate::types::WeightTable;

/// Формат: заголовок `,<класс>,<класс>,...`, дальше строки
/// `<номер веса>,<вес>,...`; строка 0 - bias.
pub fn write_weights_to<W: Write>(writer: W, table: &WeightTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![String::new()];
    header.extend(table.classes.iter().cloned());
    writer.write_record(&header)?;

    for (i, row) in table.weights.rows().into_iter().enumerate() {
        let mut record = vec![i.to_string()];
        record.extend(row.iter().map(|w| w.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_weights(path: impl AsRef<Path>, table: &WeightTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_weights_to(std::fs::File::create(path)?, table)?;
    tracing::info!(path = %path.display(), classes = table.classes.len(), "weights saved");
    Ok(())
}

pub fn read_weights_from<R: Read>(reader: R) -> Result<WeightTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let classes: Vec<String> = reader.headers()?.iter().skip(1).map(|h| h.to_string()).collect();

    let mut values = Vec::new();
    let mut nrows = 0;
    for record in reader.records() {
        let record = record?;
        if record.len() != classes.len() + 1 {
            return Err(DslrError::ShapeMismatch {
                what: "weight row length",
                expected: classes.len() + 1,
                found: record.len(),
            });
        }
        for (j, cell) in record.iter().enumerate().skip(1) {
            let value = cell.trim().parse::<f64>().map_err(|_| DslrError::InvalidNumber {
                row: nrows,
                column: classes[j - 1].clone(),
                value: cell.to_string(),
            })?;
            values.push(value);
        }
        nrows += 1;
    }

    let weights = Array2::from_shape_vec((nrows, classes.len()), values).map_err(|_| {
        DslrError::ShapeMismatch {
            what: "weight table size",
            expected: nrows * classes.len(),
            found: nrows,
        }
    })?;
    WeightTable::new(classes, weights)
}

pub fn read_weights(path: impl AsRef<Path>) -> Result<WeightTable> {
    read_weights_from(std::fs::File::open(path)?)
}

/// `Index,Hogwarts House` по строкам
pub fn write_predictions(path: impl AsRef<Path>, index: &[String], houses: &[&str]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Index", "Hogwarts House"])?;
    for (i, house) in index.iter().zip(houses) {
        writer.write_record([i.as_str(), *house])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bias_row_comes_first_under_class_header() {
        let table = WeightTable::new(
            vec!["Ravenclaw".into(), "Slytherin".into()],
            array![[0.5, -0.25], [1.0, 2.0]],
        )
        .unwrap();
        let mut out = Vec::new();
        write_weights_to(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ",Ravenclaw,Slytherin\n0,0.5,-0.25\n1,1,2\n");

        let back = read_weights_from(text.as_bytes()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn bad_cell_is_reported() {
        let text = ",A\n0,zero\n";
        assert!(matches!(read_weights_from(text.as_bytes()), Err(DslrError::InvalidNumber { .. })));
    }
}
