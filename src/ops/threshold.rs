//! Per-row water-filling thresholds coupled by a shared dual variable.
//!
//! For a multiplier `λ ≥ 0` every row picks the cap `t_i(λ)` satisfying
//! `Σ_j (|a_ij| - t_i)_+ = λ · w_i` (clipped at 0). The weighted sum
//! `Σ_i w_i · t_i(λ)` is continuous, piecewise linear and non-increasing in
//! `λ`; the projection needs the `λ` where it equals the radius.

use crate::config::{ProjectionConfig, Solver};
use crate::error::{ProjectionError, Result};
use ndarray::ArrayView1;

/// Sorted magnitudes of one row together with their prefix sums.
#[derive(Debug, Clone, PartialEq)]
pub struct RowProfile {
    weight: f64,
    // 내림차순 |a_ij|
    sorted: Vec<f64>,
    // prefix[k - 1] = 상위 k개의 합
    prefix: Vec<f64>,
}

impl RowProfile {
    pub fn new(row: ArrayView1<f64>, weight: f64) -> Self {
        let mut sorted: Vec<f64> = row.iter().map(|v| v.abs()).collect();
        sorted.sort_unstable_by(|a, b| b.total_cmp(a));
        let prefix = sorted
            .iter()
            .scan(0.0, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        Self {
            weight,
            sorted,
            prefix,
        }
    }

    fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Largest magnitude in the row (0 for an empty row).
    pub fn max(&self) -> f64 {
        self.sorted.first().copied().unwrap_or(0.0)
    }

    /// Sum of magnitudes; the cap reaches 0 once `λ · w` covers it.
    pub fn l1(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Rows with zero weight or no mass never take part in the search.
    pub fn is_active(&self) -> bool {
        self.weight > 0.0 && self.max() > 0.0
    }

    /// Magnitude at 1-based rank `k`, 0 past the end.
    fn magnitude(&self, k: usize) -> f64 {
        self.sorted.get(k - 1).copied().unwrap_or(0.0)
    }

    fn prefix_sum(&self, k: usize) -> f64 {
        self.prefix[k - 1]
    }

    /// Common level of the top `k` entries when they absorb `λ · w`.
    fn level(&self, k: usize, lambda: f64) -> f64 {
        (self.prefix_sum(k) - lambda * self.weight) / k as f64
    }

    /// `λ` at which the cap falls to the `(k+1)`-th magnitude, i.e. where the
    /// segment with exactly `k` clipped entries ends.
    fn breakpoint(&self, k: usize) -> f64 {
        (self.prefix_sum(k) - k as f64 * self.magnitude(k + 1)) / self.weight
    }

    /// Cap for `k` clipped entries, held inside `[a_(k+1), a_(k)]` so that
    /// equal magnitudes always land on the same side.
    fn clamped_level(&self, k: usize, lambda: f64) -> f64 {
        self.level(k, lambda)
            .min(self.magnitude(k))
            .max(self.magnitude(k + 1))
    }

    /// Optimal cap for marginal cost `λ · w`.
    pub fn threshold_at(&self, lambda: f64) -> f64 {
        if !self.is_active() {
            return self.max();
        }
        if lambda * self.weight >= self.l1() {
            return 0.0;
        }
        let n = self.len();
        for k in 1..=n {
            let t = self.level(k, lambda);
            if k == n || t >= self.magnitude(k + 1) {
                return self.clamped_level(k, lambda);
            }
        }
        0.0
    }
}

/// Resolved caps plus the multiplier that produced them.
#[derive(Debug, Clone)]
pub struct Thresholds {
    pub lambda: f64,
    pub values: Vec<f64>,
    pub iterations: usize,
}

fn weighted_total<'a>(profiles: &[RowProfile], values: impl Iterator<Item = &'a f64>) -> f64 {
    profiles
        .iter()
        .zip(values)
        .fold(0.0, |acc, (p, t)| acc + p.weight * t)
}

/// Finds per-row caps `t_i` with `Σ w_i t_i = radius` minimizing the total
/// squared clipping distortion.
///
/// Inactive rows keep their own maximum as cap. If the profiles already fit
/// inside the radius every row keeps its maximum and `lambda` is 0.
pub fn solve_thresholds(
    profiles: &[RowProfile],
    radius: f64,
    config: &ProjectionConfig,
) -> Result<Thresholds> {
    let maxima: Vec<f64> = profiles.iter().map(RowProfile::max).collect();
    let total = weighted_total(profiles, maxima.iter());
    if total <= radius {
        return Ok(Thresholds {
            lambda: 0.0,
            values: maxima,
            iterations: 0,
        });
    }

    if radius == 0.0 {
        let values = profiles
            .iter()
            .map(|p| if p.is_active() { 0.0 } else { p.max() })
            .collect();
        let lambda = profiles
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.l1() / p.weight)
            .fold(0.0, f64::max);
        return Ok(Thresholds {
            lambda,
            values,
            iterations: 0,
        });
    }

    let solved = match config.solver {
        Solver::Exact => solve_exact(profiles, radius),
        Solver::Bisection => solve_bisection(profiles, radius, config)?,
    };

    let achieved = weighted_total(profiles, solved.values.iter());
    let residual = (achieved - radius).abs();
    if residual > config.tolerance_for(radius) {
        return Err(ProjectionError::NumericNonConvergence {
            iterations: solved.iterations,
            residual,
        });
    }

    tracing::debug!(
        lambda = solved.lambda,
        iterations = solved.iterations,
        residual,
        "resolved row thresholds"
    );
    Ok(solved)
}

/// Scans every row breakpoint in increasing `λ`, maintaining
/// `Σ w_i t_i(λ) = A - λ·B` for the current segment, until the sum drops to
/// the radius.
fn solve_exact(profiles: &[RowProfile], radius: f64) -> Thresholds {
    let nrows = profiles.len();

    // 행마다 breakpoint 는 k 에 대해 단조 증가; 반올림으로 뒤집히지 않게 누적 max
    let mut events: Vec<(f64, usize)> = Vec::new();
    for (i, p) in profiles.iter().enumerate().filter(|(_, p)| p.is_active()) {
        let mut last = 0.0_f64;
        for k in 1..=p.len() {
            last = last.max(p.breakpoint(k));
            events.push((last, i));
        }
    }
    // 안정 정렬: 같은 λ 에서 행 내부 순서 유지
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    // clipped[i]: 현재 구간에서 잘리는 원소 수, len + 1 이면 행 전체가 0
    let mut clipped: Vec<usize> = profiles
        .iter()
        .map(|p| usize::from(p.is_active()))
        .collect();

    let segment_sums = |clipped: &[usize]| -> (f64, f64) {
        profiles
            .iter()
            .zip(clipped)
            .filter(|&(p, &k)| p.is_active() && k <= p.len())
            .fold((0.0, 0.0), |(a, b), (p, &k)| {
                let w = p.weight;
                (a + w * p.prefix_sum(k) / k as f64, b + w * w / k as f64)
            })
    };

    let (mut a, mut b) = segment_sums(&clipped);
    let mut lower = 0.0;
    let mut bracket = None;

    for (step, &(mu, i)) in events.iter().enumerate() {
        if a - mu * b <= radius {
            bracket = Some((lower, mu, step + 1));
            break;
        }
        let p = &profiles[i];
        let w = p.weight;
        let k = clipped[i];
        a -= w * p.prefix_sum(k) / k as f64;
        b -= w * w / k as f64;
        if k < p.len() {
            a += w * p.prefix_sum(k + 1) / (k + 1) as f64;
            b += w * w / (k + 1) as f64;
        }
        clipped[i] = k + 1;
        lower = mu;
    }

    let (lambda, iterations) = match bracket {
        Some((lo, hi, steps)) => {
            // 누적 오차를 버리고 현재 구간의 A, B 를 다시 계산
            let (a, b) = segment_sums(&clipped);
            let lambda = if b > 0.0 {
                ((a - radius) / b).clamp(lo, hi)
            } else {
                hi
            };
            (lambda, steps)
        }
        None => (lower, events.len()),
    };

    let values = (0..nrows)
        .map(|i| {
            let p = &profiles[i];
            let k = clipped[i];
            if !p.is_active() {
                p.max()
            } else if k > p.len() {
                0.0
            } else {
                p.clamped_level(k, lambda).max(0.0)
            }
        })
        .collect();

    Thresholds {
        lambda,
        values,
        iterations,
    }
}

fn total_at(profiles: &[RowProfile], lambda: f64) -> f64 {
    profiles
        .iter()
        .fold(0.0, |acc, p| acc + p.weight * p.threshold_at(lambda))
}

/// Bisects `λ` inside a bracket found by doubling up from the smallest
/// per-row zeroing point `l1_i / w_i`, capped at the largest one.
fn solve_bisection(
    profiles: &[RowProfile],
    radius: f64,
    config: &ProjectionConfig,
) -> Result<Thresholds> {
    let tol = config.tolerance_for(radius);
    let zeroing = || {
        profiles
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.l1() / p.weight)
    };
    let ceiling = zeroing().fold(0.0, f64::max);

    // 작은 가중치가 있어도 구간이 radius 근처로 좁혀지도록 두 배씩 확장
    let mut lo = 0.0_f64;
    let mut hi = zeroing().fold(ceiling, f64::min);
    while hi < ceiling && total_at(profiles, hi) > radius {
        lo = hi;
        hi = (2.0 * hi).min(ceiling);
    }

    let mut residual = f64::INFINITY;
    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let values: Vec<f64> = profiles.iter().map(|p| p.threshold_at(mid)).collect();
        let achieved = weighted_total(profiles, values.iter());
        residual = (achieved - radius).abs();
        tracing::trace!(iteration, lambda = mid, achieved, "bisection step");

        if residual <= tol {
            return Ok(Thresholds {
                lambda: mid,
                values,
                iterations: iteration,
            });
        }
        if achieved > radius {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(ProjectionError::NumericNonConvergence {
        iterations: config.max_iterations,
        residual,
    })
}
