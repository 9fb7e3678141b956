use crate::descriptive::DescriptiveStats;

/// A sample mean with a symmetric confidence half-width.
///
/// The half-width is `z * std_dev / sqrt(n)` using the sample standard
/// deviation. The multiplier is supplied by the caller and is not checked
/// against any particular confidence level.
///
/// # Examples
///
/// ```
/// use raidprog_stats::confidence::ConfidenceBound;
///
/// // mean 3, sample std dev sqrt(2.5), n = 5
/// let bound = ConfidenceBound::new([1.0, 2.0, 3.0, 4.0, 5.0], 1.0).unwrap();
/// let expected = 2.5_f64.sqrt() / 5.0_f64.sqrt();
/// assert!((bound.half_width - expected).abs() < 1e-12);
/// assert!((bound.upper - (3.0 + expected)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBound {
    /// Number of values the bound was computed from.
    pub sample_count: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Distance from the mean to either bound.
    pub half_width: f64,
    /// `mean - half_width`
    pub lower: f64,
    /// `mean + half_width`
    pub upper: f64,
    /// Full interval width, `2 * (upper - mean)`.
    pub interval_width: f64,
}

impl ConfidenceBound {
    /// Computes a confidence bound from unsorted values.
    ///
    /// Returns `None` if the sample is empty.
    #[must_use]
    pub fn new<I>(values: I, z: f64) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let stats = DescriptiveStats::new(values)?;
        Some(Self::from_stats(&stats, z))
    }

    /// Computes a confidence bound from precomputed descriptive statistics.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_stats(stats: &DescriptiveStats, z: f64) -> Self {
        let n = stats.count as f64;
        let half_width = z * stats.std_dev / n.sqrt();
        let lower = stats.mean - half_width;
        let upper = stats.mean + half_width;
        Self {
            sample_count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            half_width,
            lower,
            upper,
            interval_width: 2.0 * (upper - stats.mean),
        }
    }
}
