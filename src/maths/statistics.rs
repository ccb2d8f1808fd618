//! Статистические примитивы
//!
//! Все функции работают с конечным срезом чисел и ничего не фильтруют:
//! пропуски (NaN) должен убрать вызывающий код. Пустой срез - ошибка
//! `EmptyInput`, NaN распространяется молча.

use std::cmp::Ordering;

use crate::error::{DslrError, Result};

fn non_empty(data: &[f64], operation: &'static str) -> Result<()> {
    if data.is_empty() {
        return Err(DslrError::EmptyInput { operation });
    }
    Ok(())
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut values = data.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

pub fn count(data: &[f64]) -> usize {
    data.len()
}

pub fn mean(data: &[f64]) -> Result<f64> {
    non_empty(data, "mean")?;
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Сумма квадратов отклонений от среднего (ненормированный второй момент)
pub fn sum_of_squares(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    Ok(data.iter().map(|x| (x - m).powi(2)).sum())
}

/// Дисперсия генеральной совокупности, без поправки Бесселя
pub fn variance(data: &[f64]) -> Result<f64> {
    Ok(sum_of_squares(data)? / data.len() as f64)
}

pub fn std(data: &[f64]) -> Result<f64> {
    Ok(variance(data)?.sqrt())
}

pub fn min(data: &[f64]) -> Result<f64> {
    non_empty(data, "min")?;
    Ok(data.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn max(data: &[f64]) -> Result<f64> {
    non_empty(data, "max")?;
    Ok(data.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Перцентиль с линейной интерполяцией между соседними рангами.
///
/// `r = p / 100 * (n - 1)`, результат - `v[floor(r)] + (v[ceil(r)] - v[floor(r)]) * frac(r)`
/// по отсортированному массиву. `p` вне `[0, 100]` (и NaN) - ошибка.
pub fn quartile(data: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(DslrError::InvalidPercentile(p));
    }
    non_empty(data, "quartile")?;
    let values = sorted(data);

    let rank = p / 100.0 * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Ok(values[lower] + (values[upper] - values[lower]) * weight)
}

pub fn quartile_25(data: &[f64]) -> Result<f64> {
    quartile(data, 25.0)
}

/// Медиана
pub fn quartile_50(data: &[f64]) -> Result<f64> {
    quartile(data, 50.0)
}

pub fn quartile_75(data: &[f64]) -> Result<f64> {
    quartile(data, 75.0)
}

/// Третий стандартизованный момент
pub fn skewness(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    let s = std(data)?;
    let third = data.iter().map(|x| (x - m).powi(3)).sum::<f64>() / data.len() as f64;
    Ok(third / s.powi(3))
}

/// Эксцесс: четвертый стандартизованный момент минус 3
pub fn kurtosis(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    let s = std(data)?;
    let fourth = data.iter().map(|x| (x - m).powi(4)).sum::<f64>() / data.len() as f64;
    Ok(fourth / s.powi(4) - 3.0)
}

/// Самое частое значение; при равенстве частот - наименьшее из них
pub fn mode(data: &[f64]) -> Result<f64> {
    non_empty(data, "mode")?;
    let values = sorted(data);

    let mut best = values[0];
    let mut best_count = 0;
    let mut current = values[0];
    let mut current_count = 0;

    for &value in &values {
        if value.total_cmp(&current) == Ordering::Equal {
            current_count += 1;
        } else {
            current = value;
            current_count = 1;
        }
        // строгое сравнение оставляет первое (наименьшее) значение среди равных
        if current_count > best_count {
            best = current;
            best_count = current_count;
        }
    }

    Ok(best)
}
