//! Заполнение пропусков медианой

use ndarray::Array1;

use crate::error::{DslrError, Result};
use crate::maths::statistics;
use crate::types::Dataset;

/// Заменяет NaN медианой колонки. Делать до нормализации: после нее
/// медиана уже другая.
///
/// Возвращает использованные медианы по колонкам.
pub fn impute_median(data: &mut Dataset) -> Result<Array1<f64>> {
    let mut medians = Array1::zeros(data.ncols());

    for (j, column) in data.columns.iter().enumerate() {
        let present = data.present_values(j);
        if present.is_empty() {
            return Err(DslrError::EmptyColumn {
                column: column.clone(),
                operation: "median imputation",
            });
        }
        let median = statistics::quartile_50(&present)?;
        medians[j] = median;

        let mut missing = 0;
        for val in data.features.column_mut(j).iter_mut() {
            if val.is_nan() {
                *val = median;
                missing += 1;
            }
        }
        if missing > 0 {
            tracing::debug!(column = %column, missing, median, "imputed missing values");
        }
    }

    Ok(medians)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn missing_values_become_column_median() {
        let mut data = Dataset::new(
            vec!["a".into(), "b".into()],
            array![[1.0, f64::NAN], [f64::NAN, 2.0], [3.0, 4.0], [10.0, 9.0]],
        )
        .unwrap();
        let medians = impute_median(&mut data).unwrap();

        assert_eq!(medians, array![3.0, 4.0]);
        assert_eq!(data.features, array![[1.0, 4.0], [3.0, 2.0], [3.0, 4.0], [10.0, 9.0]]);
    }

    #[test]
    fn fully_missing_column_is_an_error() {
        let mut data = Dataset::new(vec!["gone".into()], array![[f64::NAN]]).unwrap();
        match impute_median(&mut data) {
            Err(DslrError::EmptyColumn { column, .. }) => assert_eq!(column, "gone"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
