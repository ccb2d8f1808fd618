//! Описательная статистика по числовым колонкам

use std::fmt;

use crate::error::{DslrError, Result};
use crate::maths::statistics;
use crate::types::{Dataset, SummaryTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Count,
    Mean,
    Std,
    Min,
    Quartile25,
    Quartile50,
    Quartile75,
    Max,
    Variation,
    SumOfSquares,
    Skewness,
    Kurtosis,
    Mode,
}

impl Metric {
    pub const BASIC: [Metric; 8] = [
        Metric::Count,
        Metric::Mean,
        Metric::Std,
        Metric::Min,
        Metric::Quartile25,
        Metric::Quartile50,
        Metric::Quartile75,
        Metric::Max,
    ];

    pub const EXTENDED: [Metric; 5] = [
        Metric::Variation,
        Metric::SumOfSquares,
        Metric::Skewness,
        Metric::Kurtosis,
        Metric::Mode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::Mean => "mean",
            Metric::Std => "std",
            Metric::Min => "min",
            Metric::Quartile25 => "25%",
            Metric::Quartile50 => "50%",
            Metric::Quartile75 => "75%",
            Metric::Max => "max",
            Metric::Variation => "variation",
            Metric::SumOfSquares => "sum of squares",
            Metric::Skewness => "skewness",
            Metric::Kurtosis => "kurtosis",
            Metric::Mode => "mode",
        }
    }

    pub fn compute(self, data: &[f64]) -> Result<f64> {
        match self {
            Metric::Count => Ok(statistics::count(data) as f64),
            Metric::Mean => statistics::mean(data),
            Metric::Std => statistics::std(data),
            Metric::Min => statistics::min(data),
            Metric::Quartile25 => statistics::quartile_25(data),
            Metric::Quartile50 => statistics::quartile_50(data),
            Metric::Quartile75 => statistics::quartile_75(data),
            Metric::Max => statistics::max(data),
            Metric::Variation => statistics::variance(data),
            Metric::SumOfSquares => statistics::sum_of_squares(data),
            Metric::Skewness => statistics::skewness(data),
            Metric::Kurtosis => statistics::kurtosis(data),
            Metric::Mode => statistics::mode(data),
        }
    }
}

/// Аналог `describe` из pandas, построенный на собственных примитивах
#[derive(Debug, Clone, Default)]
pub struct DescriptiveReporter {
    extended: bool,
}

impl DescriptiveReporter {
    pub fn new(extended: bool) -> Self {
        Self { extended }
    }

    pub fn metrics(&self) -> Vec<Metric> {
        let mut metrics = Metric::BASIC.to_vec();
        if self.extended {
            metrics.extend_from_slice(&Metric::EXTENDED);
        }
        metrics
    }

    /// Пропуски отбрасываются по каждой колонке отдельно
    pub fn describe(&self, dataset: &Dataset) -> Result<SummaryTable> {
        let metrics = self.metrics();
        let mut values = vec![Vec::with_capacity(dataset.ncols()); metrics.len()];

        for (j, column) in dataset.columns.iter().enumerate() {
            let present = dataset.present_values(j);
            for (i, metric) in metrics.iter().enumerate() {
                let value = metric.compute(&present).map_err(|err| match err {
                    DslrError::EmptyInput { .. } => DslrError::EmptyColumn {
                        column: column.clone(),
                        operation: metric.name(),
                    },
                    other => other,
                })?;
                values[i].push(value);
            }
        }

        tracing::debug!(columns = dataset.ncols(), metrics = metrics.len(), "summary table built");

        Ok(SummaryTable {
            metrics: metrics.iter().map(|m| m.name().to_string()).collect(),
            columns: dataset.columns.clone(),
            values,
        })
    }
}

/// Шесть знаков после запятой и разделитель тысяч
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = format!("{:.6}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.metrics.iter().map(|m| m.len()).max().unwrap_or(0);

        let cells: Vec<Vec<String>> = self
            .values
            .iter()
            .map(|row| row.iter().map(|&v| format_value(v)).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(j, name)| {
                cells
                    .iter()
                    .map(|row| row[j].len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }
        writeln!(f)?;

        for (metric, row) in self.metrics.iter().zip(&cells) {
            write!(f, "{:<label_width$}", metric)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into()],
            array![[1.0, 10.0], [2.0, f64::NAN], [3.0, 30.0], [4.0, 10.0], [5.0, 50.0]],
        )
        .unwrap()
    }

    #[test]
    fn basic_metrics_per_column() {
        let table = DescriptiveReporter::new(false).describe(&dataset()).unwrap();
        assert_eq!(table.metrics, vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
        assert_eq!(table.get("count", "a"), Some(5.0));
        assert_eq!(table.get("mean", "a"), Some(3.0));
        assert_eq!(table.get("50%", "a"), Some(3.0));
        // NaN пропущен
        assert_eq!(table.get("count", "b"), Some(4.0));
        assert_eq!(table.get("mean", "b"), Some(25.0));
        assert_eq!(table.get("max", "b"), Some(50.0));
        assert_eq!(table.get("skewness", "a"), None);
    }

    #[test]
    fn extended_metrics_are_appended() {
        let table = DescriptiveReporter::new(true).describe(&dataset()).unwrap();
        assert_eq!(table.metrics.len(), 13);
        assert_eq!(table.get("variation", "a"), Some(2.0));
        assert_eq!(table.get("sum of squares", "a"), Some(10.0));
        assert_eq!(table.get("mode", "b"), Some(10.0));
        assert!(table.get("skewness", "a").unwrap().abs() < 1e-12);
    }

    #[test]
    fn empty_column_names_the_column() {
        let data = Dataset::new(vec!["x".into()], array![[f64::NAN], [f64::NAN]]).unwrap();
        match DescriptiveReporter::new(false).describe(&data) {
            Err(DslrError::EmptyColumn { column, operation }) => {
                assert_eq!(column, "x");
                assert_eq!(operation, "mean");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn values_are_grouped_with_six_decimals() {
        assert_eq!(format_value(1234567.5), "1,234,567.500000");
        assert_eq!(format_value(-1234.0), "-1,234.000000");
        assert_eq!(format_value(0.25), "0.250000");
        assert_eq!(format_value(-0.0), "0.000000");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn display_aligns_columns() {
        let table = DescriptiveReporter::new(false).describe(&dataset()).unwrap();
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("count"));
        assert!(lines[1].ends_with("4.000000"));
        let width = lines[1].len();
        assert!(lines.iter().skip(1).all(|l| l.len() == width));
    }
}
