//! Joint solve of a group of coupled modes.
//!
//! For a group of `k` modes the direct averages satisfy
//!
//! ```text
//! a_q = Σ_p c(q, p) · x_p,     C_p = 2 x_p
//! ```
//!
//! where `c(q, p)` is the coupling coefficient. The complex system is
//! solved as the equivalent `2k × 2k` real system
//!
//! ```text
//! ⎡ Re A  −Im A ⎤ ⎡ Re x ⎤   ⎡ Re a ⎤
//! ⎣ Im A   Re A ⎦ ⎣ Im x ⎦ = ⎣ Im a ⎦
//! ```
//!
//! with a column-pivoted QR factorization.

use faer::{Mat, linalg::solvers::Solve};
use num_complex::Complex64;
use tracing::{debug, warn};

use super::selection::Candidate;

/// Residual norm above which a group solve is reported.
const RESIDUAL_WARN: f64 = 1e-6;

/// Fitted complex amplitude of one mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Solved {
    /// The mode as selected.
    pub candidate: Candidate,
    /// Complex amplitude `|C| exp(i·phase)`.
    pub coefficient: Complex64,
}

/// Solve a group, dropping its weakest member while the solution is not
/// finite.
pub fn solve_group(
    mut group: Vec<Candidate>,
    coupling: impl Fn(&Candidate, &Candidate) -> Complex64,
) -> Vec<Solved> {
    loop {
        match group.len() {
            0 => return Vec::new(),
            1 => {
                let candidate = group.remove(0);
                let coefficient = 2.0 * candidate.average;
                return vec![Solved {
                    candidate,
                    coefficient,
                }];
            }
            _ => {}
        }

        if let Some(x) = solve_coupled(&group, &coupling) {
            return group
                .into_iter()
                .zip(x)
                .map(|(candidate, x)| Solved {
                    candidate,
                    coefficient: 2.0 * x,
                })
                .collect();
        }

        let weakest = group
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.average.norm().total_cmp(&b.average.norm()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let dropped = group.remove(weakest);
        warn!(
            mode = dropped.mode,
            remaining = group.len(),
            "group solve not finite, dropping weakest mode"
        );
    }
}

/// Solve `A x = a` for a group of two or more; `None` if not finite.
fn solve_coupled(
    group: &[Candidate],
    coupling: &impl Fn(&Candidate, &Candidate) -> Complex64,
) -> Option<Vec<Complex64>> {
    let k = group.len();
    let n = 2 * k;

    let mut m = Mat::<f64>::zeros(n, n);
    let mut rhs = Mat::<f64>::zeros(n, 1);
    for (q, cq) in group.iter().enumerate() {
        for (p, cp) in group.iter().enumerate() {
            let c = coupling(cq, cp);
            m[(q, p)] = c.re;
            m[(q, k + p)] = -c.im;
            m[(k + q, p)] = c.im;
            m[(k + q, k + p)] = c.re;
        }
        rhs[(q, 0)] = cq.average.re;
        rhs[(k + q, 0)] = cq.average.im;
    }

    let qr = m.as_ref().col_piv_qr();
    let x = qr.solve(&rhs);

    if (0..n).any(|i| !x[(i, 0)].is_finite()) {
        return None;
    }

    let residual = (0..n)
        .map(|i| {
            let ax: f64 = (0..n).map(|j| m[(i, j)] * x[(j, 0)]).sum();
            (ax - rhs[(i, 0)]).powi(2)
        })
        .sum::<f64>()
        .sqrt();
    if residual > RESIDUAL_WARN {
        warn!(modes = k, residual, "poorly conditioned group solve");
    } else {
        debug!(modes = k, residual, "group solved");
    }

    Some(
        (0..k)
            .map(|i| Complex64::new(x[(i, 0)], x[(k + i, 0)]))
            .collect(),
    )
}
