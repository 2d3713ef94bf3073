//! Goodness-of-fit statistics for a harmonic fit.
//!
//! The fitted constituent set is evaluated at every analyzed sample and
//! compared against the observed reading.

/// Statistics of fitted levels against observed readings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitMetrics {
    /// Root mean square error: sqrt(mean((fit - obs)²))
    pub rmse: f64,
    /// Mean absolute error: mean(|fit - obs|)
    pub mae: f64,
    /// Bias (mean error): mean(fit - obs)
    pub bias: f64,
    /// Pearson correlation coefficient [-1, 1]
    pub correlation: f64,
    /// Murphy skill score: 1 - MSE / Var(obs)
    pub skill_score: f64,
    /// Maximum absolute error: max(|fit - obs|)
    pub max_error: f64,
    /// Number of samples compared
    pub n_points: usize,
}

impl FitMetrics {
    /// Compare fitted values against observations.
    ///
    /// Returns `None` if the slices differ in length or are empty.
    pub fn compute(fitted: &[f64], observed: &[f64]) -> Option<Self> {
        if fitted.len() != observed.len() || fitted.is_empty() {
            return None;
        }
        let n = fitted.len() as f64;

        let fit_mean = fitted.iter().sum::<f64>() / n;
        let obs_mean = observed.iter().sum::<f64>() / n;

        let errors: Vec<f64> = fitted
            .iter()
            .zip(observed)
            .map(|(&f, &o)| f - o)
            .collect();

        let bias = errors.iter().sum::<f64>() / n;
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let max_error = errors.iter().map(|e| e.abs()).fold(0.0, f64::max);

        let obs_variance = observed.iter().map(|&o| (o - obs_mean).powi(2)).sum::<f64>() / n;
        let fit_variance = fitted.iter().map(|&f| (f - fit_mean).powi(2)).sum::<f64>() / n;
        let covariance = fitted
            .iter()
            .zip(observed)
            .map(|(&f, &o)| (f - fit_mean) * (o - obs_mean))
            .sum::<f64>()
            / n;

        let skill_score = if obs_variance > 1e-10 {
            1.0 - mse / obs_variance
        } else if mse < 1e-10 {
            1.0
        } else {
            f64::NEG_INFINITY
        };

        let correlation = if fit_variance > 1e-10 && obs_variance > 1e-10 {
            covariance / (fit_variance.sqrt() * obs_variance.sqrt())
        } else if fit_variance < 1e-10 && obs_variance < 1e-10 {
            // Both constant
            1.0
        } else {
            0.0
        };

        Some(Self {
            rmse: mse.sqrt(),
            mae,
            bias,
            correlation,
            skill_score,
            max_error,
            n_points: fitted.len(),
        })
    }

    /// Skill score above 0.9.
    pub fn is_skillful(&self) -> bool {
        self.skill_score > 0.9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_perfect_fit() {
        let obs = [1.0, 2.0, 3.0, 2.0];
        let m = FitMetrics::compute(&obs, &obs).unwrap();
        assert!(m.rmse < TOL);
        assert!(m.bias.abs() < TOL);
        assert!((m.correlation - 1.0).abs() < TOL);
        assert!((m.skill_score - 1.0).abs() < TOL);
        assert!(m.is_skillful());
        assert_eq!(m.n_points, 4);
    }

    #[test]
    fn test_constant_offset() {
        let obs = [0.0, 1.0, 0.0, -1.0];
        let fit: Vec<f64> = obs.iter().map(|o| o + 0.5).collect();
        let m = FitMetrics::compute(&fit, &obs).unwrap();
        assert!((m.bias - 0.5).abs() < TOL);
        assert!((m.rmse - 0.5).abs() < TOL);
        assert!((m.max_error - 0.5).abs() < TOL);
        assert!((m.correlation - 1.0).abs() < TOL);
        // Var(obs) = 0.5, MSE = 0.25
        assert!((m.skill_score - 0.5).abs() < TOL);
    }

    #[test]
    fn test_invalid_input() {
        assert!(FitMetrics::compute(&[], &[]).is_none());
        assert!(FitMetrics::compute(&[1.0], &[1.0, 2.0]).is_none());
    }
}
