//! Построение таблицы признаков из сырого CSV

use ndarray::Array2;

use crate::error::{DslrError, Result};
use crate::io::RawTable;
use crate::types::{Dataset, House};

pub const INDEX_COLUMN: &str = "Index";
pub const LABEL_COLUMN: &str = "Hogwarts House";
pub const HAND_COLUMN: &str = "Best Hand";

/// Колонки, которые не идут в обучение: идентификаторы, даты и два слабых признака
pub const DROPPED_COLUMNS: [&str; 6] = [
    "First Name",
    "Last Name",
    "Birthday",
    "Arithmancy",
    "Astronomy",
    "Care of Magical Creatures",
];

/// Кодировка колонки "Best Hand"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandEncoding {
    /// Right -> 0, Left -> 1 (обучение и предсказание)
    RightZero,
    /// Left -> 0, Right -> 1 (describe)
    LeftZero,
}

impl HandEncoding {
    fn encode(self, value: &str) -> Option<f64> {
        match (self, value) {
            (HandEncoding::RightZero, "Right") | (HandEncoding::LeftZero, "Left") => Some(0.0),
            (HandEncoding::RightZero, "Left") | (HandEncoding::LeftZero, "Right") => Some(1.0),
            _ => None,
        }
    }
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Таблица признаков и коды факультетов для обучения
    pub fn extract_training_features(table: &RawTable) -> Result<(Dataset, Vec<usize>)> {
        let label = table.column_index(LABEL_COLUMN)?;
        let labels = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row[label]
                    .parse::<House>()
                    .map(House::index)
                    .map_err(|value| DslrError::UnknownHouse { row: i, value })
            })
            .collect::<Result<Vec<_>>>()?;

        let features = Self::extract_model_features(table)?;
        Ok((features, labels))
    }

    /// Признаки для предсказания и значения колонки Index по строкам.
    /// Колонка факультета, если есть, игнорируется.
    pub fn extract_prediction_features(table: &RawTable) -> Result<(Vec<String>, Dataset)> {
        let index: Vec<String> = match table.column(INDEX_COLUMN) {
            Ok(values) => values.map(str::to_string).collect(),
            Err(_) => (0..table.nrows()).map(|i| i.to_string()).collect(),
        };
        Ok((index, Self::extract_model_features(table)?))
    }

    /// Все числовые колонки для describe: пустые ячейки - пропуски,
    /// колонка с любым нечисловым значением или совсем без значений
    /// пропускается целиком.
    pub fn extract_numeric_columns(table: &RawTable) -> Result<Dataset> {
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for (j, name) in table.headers.iter().enumerate() {
            if name == INDEX_COLUMN {
                continue;
            }
            let parsed: Option<Vec<f64>> = table
                .rows
                .iter()
                .map(|row| parse_cell(name, &row[j], HandEncoding::LeftZero))
                .collect();
            match parsed {
                Some(column) if column.iter().all(|v| v.is_nan()) => {
                    tracing::debug!(column = %name, "skipping empty column");
                }
                Some(column) => {
                    columns.push(name.clone());
                    values.push(column);
                }
                None => tracing::debug!(column = %name, "skipping non-numeric column"),
            }
        }

        Dataset::new(columns, column_major(table.nrows(), &values)?)
    }

    fn extract_model_features(table: &RawTable) -> Result<Dataset> {
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for (j, name) in table.headers.iter().enumerate() {
            if name == INDEX_COLUMN || name == LABEL_COLUMN || DROPPED_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            let column = table
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    parse_cell(name, &row[j], HandEncoding::RightZero).ok_or_else(|| {
                        DslrError::InvalidNumber {
                            row: i,
                            column: name.clone(),
                            value: row[j].clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            columns.push(name.clone());
            values.push(column);
        }

        Dataset::new(columns, column_major(table.nrows(), &values)?)
    }
}

/// Пустая ячейка - NaN
fn parse_cell(column: &str, cell: &str, hand: HandEncoding) -> Option<f64> {
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    if column == HAND_COLUMN {
        return hand.encode(cell);
    }
    cell.parse::<f64>().ok()
}

fn column_major(nrows: usize, columns: &[Vec<f64>]) -> Result<Array2<f64>> {
    let mut features = Array2::zeros((nrows, columns.len()));
    for (j, column) in columns.iter().enumerate() {
        if column.len() != nrows {
            return Err(DslrError::ShapeMismatch {
                what: "column length",
                expected: nrows,
                found: column.len(),
            });
        }
        for (i, &v) in column.iter().enumerate() {
            features[[i, j]] = v;
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Index,Hogwarts House,First Name,Last Name,Birthday,Best Hand,Arithmancy,Astronomy,Herbology,Care of Magical Creatures,Potions
0,Ravenclaw,Tamara,Hsu,2000-03-30,Left,58384.0,-487.88,5.72,0.71,7.01
1,Slytherin,Erich,Paredes,1999-10-14,Right,67239.0,-552.06,-5.98,0.10,
2,Hufflepuff,Stephany,Braun,1999-11-03,Left,23702.0,,7.25,-0.50,3.55
";

    fn table() -> RawTable {
        RawTable::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn training_features_drop_columns_and_encode_labels() {
        let (data, labels) = FeatureEngineer::extract_training_features(&table()).unwrap();

        assert_eq!(data.columns, vec!["Best Hand", "Herbology", "Potions"]);
        assert_eq!(labels, vec![0, 1, 3]);
        assert_eq!(data.column("Best Hand").unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
        assert!(data.features[[1, 2]].is_nan());
        assert_eq!(data.features[[2, 1]], 7.25);
    }

    #[test]
    fn unknown_house_is_reported_with_row() {
        let text = CSV.replace("Slytherin", "Durmstrang");
        let table = RawTable::from_reader(text.as_bytes()).unwrap();
        match FeatureEngineer::extract_training_features(&table) {
            Err(DslrError::UnknownHouse { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "Durmstrang");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_numeric_feature_is_an_error() {
        let text = CSV.replace("5.72", "lots");
        let table = RawTable::from_reader(text.as_bytes()).unwrap();
        assert!(matches!(
            FeatureEngineer::extract_training_features(&table),
            Err(DslrError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn prediction_ignores_empty_house_column() {
        let text = CSV
            .replace("Ravenclaw", "")
            .replace("Slytherin", "")
            .replace("Hufflepuff", "");
        let table = RawTable::from_reader(text.as_bytes()).unwrap();
        let (index, data) = FeatureEngineer::extract_prediction_features(&table).unwrap();
        assert_eq!(index, vec!["0", "1", "2"]);
        assert_eq!(data.ncols(), 3);
    }

    #[test]
    fn numeric_columns_for_describe() {
        let data = FeatureEngineer::extract_numeric_columns(&table()).unwrap();
        assert_eq!(
            data.columns,
            vec!["Best Hand", "Arithmancy", "Astronomy", "Herbology", "Care of Magical Creatures", "Potions"]
        );
        // Left -> 0, Right -> 1
        assert_eq!(data.column("Best Hand").unwrap().to_vec(), vec![0.0, 1.0, 0.0]);
        assert!(data.column("Astronomy").unwrap()[2].is_nan());
    }

    #[test]
    fn empty_columns_are_not_described() {
        let text = CSV
            .replace("Ravenclaw", "")
            .replace("Slytherin", "")
            .replace("Hufflepuff", "");
        let table = RawTable::from_reader(text.as_bytes()).unwrap();
        let data = FeatureEngineer::extract_numeric_columns(&table).unwrap();
        assert!(data.column_index(LABEL_COLUMN).is_err());
        assert_eq!(data.ncols(), 6);
    }
}
