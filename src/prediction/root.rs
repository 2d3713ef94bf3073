//! Safeguarded Newton root finder on integer-second timestamps.
//!
//! The search keeps a bracket `[tl, tr]` with `f(tl) < 0 < f(tr)` (after
//! flipping the sign of `f` when needed) and alternates between Newton
//! steps and bisection:
//!
//! - the first step always bisects;
//! - a Newton step is rejected when it would leave the bracket, when the
//!   previous step failed to at least halve |f|, or when it lands on or
//!   outside a bracket end;
//! - Newton steps shorter than the precision are stretched to it.
//!
//! The search stops when the bracket is no wider than the precision and
//! returns its right end, or earlier on an exact zero.

use crate::error::Result;
use crate::types::{Interval, Timestamp};

/// Resolution at which events are located.
pub const EVENT_PRECISION: Interval = Interval::from_seconds(15);

/// Largest step taken in one move, in seconds.
pub(crate) const MAX_STEP_SECONDS: f64 = 1e12;

/// Seconds as an interval, clamped to a range that cannot overflow.
pub(crate) fn seconds_to_interval(seconds: f64) -> Interval {
    Interval::from_seconds(seconds.round().clamp(-MAX_STEP_SECONDS, MAX_STEP_SECONDS) as i64)
}

/// Locate a sign change of `f(t, 0)` in `[tl, tr]`.
///
/// `f(t, k)` must return the k-th time derivative of the function for
/// `k = 0, 1`. Returns `None` when the interval is empty, when the end
/// values do not bracket a zero, or when a Newton step meets a zero slope.
pub fn find_zero<F>(tl: Timestamp, tr: Timestamp, precision: Interval, f: F) -> Result<Option<Timestamp>>
where
    F: Fn(Timestamp, u32) -> Result<f64>,
{
    find_zero_observed(tl, tr, precision, f, |_, _| {})
}

/// [`find_zero`] reporting every bracket to `observe`.
pub fn find_zero_observed<F, O>(
    mut tl: Timestamp,
    mut tr: Timestamp,
    precision: Interval,
    f: F,
    mut observe: O,
) -> Result<Option<Timestamp>>
where
    F: Fn(Timestamp, u32) -> Result<f64>,
    O: FnMut(Timestamp, Timestamp),
{
    if tl >= tr {
        return Ok(None);
    }

    let mut fl = f(tl, 0)?;
    let mut fr = f(tr, 0)?;
    let scale = if fl > 0.0 { -1.0 } else { 1.0 };
    fl *= scale;
    fr *= scale;
    if fl >= 0.0 || fr <= 0.0 {
        return Ok(None);
    }
    observe(tl, tr);

    let mut t = tl;
    let mut ft = fl;
    let mut fp = 0.0;
    let mut f_thresh = 0.0;
    let mut first = true;

    while tr - tl > precision {
        let mut bisect = first
            || ft.abs() > f_thresh
            || if ft > 0.0 {
                fp <= ft / (t - tl).as_secs_f64()
            } else {
                fp <= -ft / (tr - t).as_secs_f64()
            };

        let mut next = t;
        if !bisect {
            if fp == 0.0 {
                return Ok(None);
            }
            let mut dt = seconds_to_interval(-ft / fp);
            if dt.abs() < precision {
                dt = if -ft / fp < 0.0 { -precision } else { precision };
            }
            next = t + dt;
            f_thresh = 0.5 * ft.abs();
            if next <= tl || next >= tr {
                bisect = true;
            }
        }
        if bisect {
            next = tl + (tr - tl) / 2;
            f_thresh = fr.max(-fl);
        }
        first = false;

        t = next;
        ft = scale * f(t, 0)?;
        if ft == 0.0 {
            return Ok(Some(t));
        }
        if ft < 0.0 {
            tl = t;
            fl = ft;
        } else {
            tr = t;
            fr = ft;
        }
        observe(tl, tr);
        fp = scale * f(t, 1)?;
    }

    Ok(Some(tr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: i64) -> Timestamp {
        Timestamp::from_seconds(s)
    }

    #[test]
    fn test_linear_root() {
        let f = |t: Timestamp, k: u32| -> Result<f64> {
            Ok(if k == 0 { (t.seconds() - 10_007) as f64 } else { 1.0 })
        };
        let root = find_zero(ts(0), ts(40_000), EVENT_PRECISION, f).unwrap().unwrap();
        assert!((root.seconds() - 10_007).abs() <= 15);
    }

    #[test]
    fn test_decreasing_function_is_flipped() {
        let w = 2.0 * std::f64::consts::PI / 44_712.0;
        let f = move |t: Timestamp, k: u32| -> Result<f64> {
            let x = w * t.seconds() as f64;
            Ok(if k == 0 { x.cos() } else { -w * x.sin() })
        };
        // cos falls through zero at a quarter period
        let root = find_zero(ts(0), ts(20_000), EVENT_PRECISION, f).unwrap().unwrap();
        assert!((root.seconds() - 11_178).abs() <= 15, "root={}", root.seconds());
    }

    #[test]
    fn test_no_bracket() {
        let f = |t: Timestamp, k: u32| -> Result<f64> {
            Ok(if k == 0 { 1.0 + t.seconds() as f64 } else { 1.0 })
        };
        assert_eq!(find_zero(ts(0), ts(100), EVENT_PRECISION, f).unwrap(), None);
        assert_eq!(find_zero(ts(100), ts(100), EVENT_PRECISION, f).unwrap(), None);
        assert_eq!(find_zero(ts(200), ts(100), EVENT_PRECISION, f).unwrap(), None);
    }

    #[test]
    fn test_exact_zero_returned() {
        let f = |t: Timestamp, k: u32| -> Result<f64> {
            Ok(if k == 0 { (t.seconds() - 500) as f64 } else { 1.0 })
        };
        // Bisection of [0, 1000] lands exactly on the root
        assert_eq!(
            find_zero(ts(0), ts(1000), EVENT_PRECISION, f).unwrap(),
            Some(ts(500))
        );
    }

    #[test]
    fn test_bracket_shrinks_and_contains_root() {
        // Root between whole seconds so no evaluation lands on it exactly
        const ROOT: f64 = 4_321.7;
        let w = 2.0 * std::f64::consts::PI / 30_000.0;
        let f = move |t: Timestamp, k: u32| -> Result<f64> {
            let x = w * (t.seconds() as f64 - ROOT);
            Ok(if k == 0 {
                x.sin() + 0.3 * (3.0 * x).sin()
            } else {
                w * (x.cos() + 0.9 * (3.0 * x).cos())
            })
        };
        let mut brackets = Vec::new();
        let root = find_zero_observed(ts(0), ts(6_000), EVENT_PRECISION, f, |l, r| {
            brackets.push((l, r))
        })
        .unwrap()
        .unwrap();

        assert!(brackets.len() >= 4, "brackets={brackets:?}");
        let mut newton_steps = 0;
        for pair in brackets.windows(2) {
            let (l0, r0) = pair[0];
            let (l1, r1) = pair[1];
            assert!(l1 >= l0 && r1 <= r0, "bracket grew");
            assert!(r1 - l1 < r0 - l0, "bracket did not shrink");
            let midpoint = l0 + (r0 - l0) / 2;
            let moved = if l1 != l0 { l1 } else { r1 };
            if moved != midpoint {
                newton_steps += 1;
            }
        }
        assert!(newton_steps >= 2, "brackets={brackets:?}");
        for &(l, r) in &brackets {
            assert!(l.seconds() as f64 <= ROOT && ROOT <= r.seconds() as f64);
        }
        assert!((root.seconds() as f64 - ROOT).abs() <= 15.0);
    }
}
