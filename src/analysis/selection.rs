//! Mode selection: which candidates survive, and which must be solved
//! together.
//!
//! Selection runs three passes over the direct averages:
//!
//! 1. **Amplitude**: a candidate whose average is below half the
//!    amplitude cut cannot become significant after the solve.
//! 2. **Slow**: a candidate strongly coupled to its own mirror image
//!    cannot be told apart from the datum over the analyzed span.
//! 3. **Grouping**: walking in ascending speed, a candidate joins the
//!    current group when its coupling with the group's last member
//!    exceeds the resolution cut.
//!
//! Each group is then checked pair by pair: the weaker member must not
//! be explained by the stronger member's leakage alone, nor exceed what
//! the stronger member allows.

use num_complex::Complex64;
use tracing::debug;

use crate::types::Speed;

/// A mode still in the running, with its direct average.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Index into the mode catalog.
    pub mode: usize,
    /// Angular speed.
    pub speed: Speed,
    /// Direct average `(1/N) Σ r(t) exp(−iωt)` with the datum removed.
    pub average: Complex64,
}

impl Candidate {
    /// Create a candidate.
    pub fn new(mode: usize, speed: Speed, average: Complex64) -> Self {
        Self {
            mode,
            speed,
            average,
        }
    }
}

/// Keep candidates whose average is at least half of `amplitude_cut`.
pub fn amplitude_pass(candidates: Vec<Candidate>, amplitude_cut: f64) -> Vec<Candidate> {
    let threshold = 0.5 * amplitude_cut;
    candidates
        .into_iter()
        .filter(|c| c.average.norm() >= threshold)
        .collect()
}

/// Keep candidates whose mirror coupling does not exceed `slow_cut`.
pub fn slow_pass(
    candidates: Vec<Candidate>,
    slow_cut: f64,
    mirror: impl Fn(&Candidate) -> f64,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let coupling = mirror(c);
            if coupling > slow_cut {
                debug!(mode = c.mode, coupling, "mode too slow to resolve");
                false
            } else {
                true
            }
        })
        .collect()
}

/// Partition candidates into groups that must be solved jointly.
///
/// `coupling(q, p)` is the coupling modulus between two candidates.
/// Candidates are sorted by ascending speed first; groups preserve that
/// order.
pub fn group_by_resolution(
    mut candidates: Vec<Candidate>,
    resolution_cut: f64,
    coupling: impl Fn(&Candidate, &Candidate) -> f64,
) -> Vec<Vec<Candidate>> {
    candidates.sort_by(|a, b| {
        a.speed
            .radians_per_second()
            .total_cmp(&b.speed.radians_per_second())
    });

    let mut groups: Vec<Vec<Candidate>> = Vec::new();
    for candidate in candidates {
        let joins = groups
            .last()
            .and_then(|g| g.last())
            .is_some_and(|last| coupling(&candidate, last) > resolution_cut);
        match groups.last_mut() {
            Some(group) if joins => group.push(candidate),
            _ => groups.push(vec![candidate]),
        }
    }
    groups
}

/// Drop weak members of a group until every pair is consistent.
///
/// For each pair, with `weak` the member of smaller average, the ratio
/// `|a_weak − c(weak, strong)·a_strong| / |a_strong|` must lie within
/// `[lower, upper]`. The weak member of the first failing pair is
/// dropped and the check restarts.
pub fn check_group(
    mut group: Vec<Candidate>,
    lower: f64,
    upper: f64,
    coupling: impl Fn(&Candidate, &Candidate) -> Complex64,
) -> Vec<Candidate> {
    'restart: while group.len() > 1 {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (weak, strong) = if group[i].average.norm() < group[j].average.norm() {
                    (i, j)
                } else {
                    (j, i)
                };
                let strong_norm = group[strong].average.norm();
                let ratio = if strong_norm > 0.0 {
                    (group[weak].average - coupling(&group[weak], &group[strong]) * group[strong].average)
                        .norm()
                        / strong_norm
                } else {
                    0.0
                };
                if !(lower..=upper).contains(&ratio) {
                    debug!(
                        dropped = group[weak].mode,
                        kept = group[strong].mode,
                        ratio,
                        "dropping inconsistent group member"
                    );
                    group.remove(weak);
                    continue 'restart;
                }
            }
        }
        break;
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mode: usize, dph: f64, amplitude: f64) -> Candidate {
        Candidate::new(
            mode,
            Speed::from_degrees_per_hour(dph).unwrap(),
            Complex64::new(amplitude, 0.0),
        )
    }

    #[test]
    fn test_amplitude_pass_uses_half_cut() {
        let kept = amplitude_pass(
            vec![candidate(1, 15.0, 0.003), candidate(2, 30.0, 0.002)],
            0.005,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].mode, 1);
    }

    #[test]
    fn test_slow_pass() {
        let kept = slow_pass(
            vec![candidate(1, 0.04, 1.0), candidate(2, 30.0, 1.0)],
            0.2,
            |c| if c.mode == 1 { 0.9 } else { 0.01 },
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].mode, 2);
    }

    #[test]
    fn test_grouping_by_resolution_cut() {
        // Strongly coupled pair lands in one group
        let groups = group_by_resolution(
            vec![candidate(2, 30.0, 1.0), candidate(1, 29.9, 1.0)],
            0.9,
            |_, _| 0.95,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].mode, 1);

        // Weakly coupled pair stays apart
        let groups = group_by_resolution(
            vec![candidate(1, 29.9, 1.0), candidate(2, 30.0, 1.0)],
            0.9,
            |_, _| 0.5,
        );
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_grouping_compares_with_last_member() {
        // 1-2 and 2-3 coupled, 1-3 not: a chain forms one group
        let coupling = |q: &Candidate, p: &Candidate| {
            if q.mode.abs_diff(p.mode) == 1 { 0.95 } else { 0.1 }
        };
        let groups = group_by_resolution(
            vec![
                candidate(1, 10.0, 1.0),
                candidate(2, 11.0, 1.0),
                candidate(3, 12.0, 1.0),
                candidate(5, 20.0, 1.0),
            ],
            0.9,
            coupling,
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1][0].mode, 5);
    }

    #[test]
    fn test_check_group_drops_leakage_only_member() {
        // Weak member is exactly the leakage of the strong one
        let strong = candidate(1, 28.98, 1.0);
        let weak = candidate(2, 29.0, 0.95);
        let kept = check_group(vec![strong.clone(), weak], 0.01, 1.0, |_, _| {
            Complex64::new(0.95, 0.0)
        });
        assert_eq!(kept, vec![strong]);
    }

    #[test]
    fn test_check_group_keeps_consistent_pair() {
        let a = candidate(1, 28.98, 1.0);
        let b = candidate(2, 29.0, 0.5);
        let kept = check_group(vec![a, b], 0.01, 1.0, |_, _| Complex64::new(0.2, 0.0));
        assert_eq!(kept.len(), 2);
    }
}
