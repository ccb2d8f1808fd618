/// Численные примитивы

pub mod statistics;

pub use statistics::{
    count, kurtosis, max, mean, min, mode, quartile, quartile_25, quartile_50, quartile_75,
    skewness, std, sum_of_squares, variance,
};
