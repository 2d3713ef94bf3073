//! Harmonic analysis of a station's readings.
//!
//! # Algorithm
//!
//! 1. Merge the station's epochs into patches and keep the newest
//!    `max_sample_size` samples.
//! 2. Accumulate `S_m = Σ r(t) exp(−iω_m t)` for every catalog mode in a
//!    single pass over the samples, with `t` measured from the start of
//!    the first patch. The datum is the sample mean.
//! 3. Form direct averages `a_m = S_m/N − mean · coeff(ω_m)`.
//! 4. Select modes, group unresolvable ones, and solve each group.
//! 5. Exclude modes whose fitted amplitude falls below the amplitude cut
//!    and repeat from 4, for at most [`MAX_PRUNING_ROUNDS`] rounds.

use std::collections::HashSet;

use num_complex::Complex64;
use tracing::{debug, info};

use super::catalog::ModeCatalog;
use super::config::AnalysisConfig;
use super::coupling::Coupling;
use super::metrics::FitMetrics;
use super::selection::{Candidate, amplitude_pass, check_group, group_by_resolution, slow_pass};
use super::solve::{Solved, solve_group};
use crate::constituents::{ConstituentSet, RunningSet};
use crate::error::{ConfigError, Result};
use crate::series::{PatchIterator, PatchSet, StationId};
use crate::store::{CoefficientStore, ReadingSource, StoredCoefficients};
use crate::types::{Amplitude, Speed, Timestamp};

/// Upper bound on selection/solve rounds while pruning weak modes.
pub const MAX_PRUNING_ROUNDS: usize = 5;

/// One fitted constituent.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedConstituent {
    /// Catalog name
    pub name: String,
    /// Angular speed
    pub speed: Speed,
    /// Complex amplitude `A·exp(iφ)` relative to the fit epoch
    pub coefficient: Complex64,
}

impl FittedConstituent {
    /// Amplitude in reading units.
    pub fn amplitude(&self) -> f64 {
        self.coefficient.norm()
    }

    /// Phase in radians, in (−π, π].
    pub fn phase(&self) -> f64 {
        self.coefficient.arg()
    }
}

/// Result of analyzing one station.
#[derive(Clone, Debug)]
pub struct HarmonicFit {
    /// Analyzed station
    pub station: StationId,
    /// Phase reference: start of the first analyzed patch
    pub epoch: Timestamp,
    /// Mean level
    pub datum: Amplitude,
    /// Significant constituents in ascending speed
    pub constituents: Vec<FittedConstituent>,
    /// Fit statistics over the analyzed samples
    pub metrics: Option<FitMetrics>,
    /// Number of analyzed samples
    pub samples: usize,
    /// Number of analyzed patches
    pub patches: usize,
}

impl HarmonicFit {
    /// Constituent by catalog name.
    pub fn get(&self, name: &str) -> Option<&FittedConstituent> {
        self.constituents
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The fit as a predictable constituent set.
    pub fn running_set(&self) -> RunningSet {
        let mut set = RunningSet::new(self.datum, self.epoch);
        for c in &self.constituents {
            set.append_complex(c.coefficient, c.speed);
        }
        set
    }
}

/// Fits constant-coefficient constituent sets to observed readings.
///
/// # Example
///
/// ```
/// use tide_harmonics::analysis::HarmonicsCreator;
/// use tide_harmonics::constituents::ConstituentSet;
/// use tide_harmonics::series::{Epoch, StationId};
/// use tide_harmonics::store::MemoryStore;
/// use tide_harmonics::types::{Interval, Timestamp};
///
/// let mut store = MemoryStore::new();
/// let station = StationId(1);
/// let hours = 24 * 30;
/// let readings: Vec<f64> = (0..hours)
///     .map(|h| 1.0 + 0.5 * (2.0 * std::f64::consts::PI * h as f64 / 12.0).cos())
///     .collect();
/// let epoch = Epoch::new(store.next_epoch_id(), Timestamp::from_seconds(0), Interval::from_hours(1), hours);
/// store.insert_epoch(station, epoch, readings);
///
/// let creator = HarmonicsCreator::default();
/// let set = creator.analyze(&mut store, station).unwrap().unwrap();
/// assert!(!set.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct HarmonicsCreator {
    catalog: ModeCatalog,
    config: AnalysisConfig,
}

impl HarmonicsCreator {
    /// Create an analyzer over a mode catalog.
    pub fn new(catalog: ModeCatalog, config: AnalysisConfig) -> Self {
        Self { catalog, config }
    }

    /// Change one setting by name.
    pub fn configure(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        self.config.set(key, value)
    }

    /// Current settings.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Candidate modes.
    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }

    /// Analyze a station's readings.
    ///
    /// Returns `Ok(None)` when the station has too few readings or no
    /// constituent survives selection.
    pub fn fit<R: ReadingSource + ?Sized>(
        &self,
        source: &R,
        station: StationId,
    ) -> Result<Option<HarmonicFit>> {
        let epochs = source.epochs(station)?;
        let dimension = source.dimension(station)?;
        let patches = PatchSet::build(&epochs).window(self.config.max_sample_size);
        let total = patches.total_samples();
        let Some(epoch) = patches.epoch() else {
            debug!(%station, "no readings to analyze");
            return Ok(None);
        };
        if total < 2 {
            debug!(%station, samples = total, "too few readings to analyze");
            return Ok(None);
        }

        let modes = self.catalog.harmonics();
        let omegas: Vec<f64> = modes.iter().map(|m| m.speed.radians_per_second()).collect();
        let (sums, observed) = accumulate(source, &patches, epoch, &omegas)?;

        let n = observed.len() as f64;
        let mean = observed.iter().map(|(_, r)| r).sum::<f64>() / n;
        let coupling = Coupling::new(&patches, epoch);
        let averages: Vec<Candidate> = modes
            .iter()
            .zip(sums)
            .enumerate()
            .map(|(i, (mode, sum))| {
                let average = sum / n - mean * coupling.coeff(mode.speed.radians_per_second());
                Candidate::new(i, mode.speed, average)
            })
            .collect();

        let solved = self.prune(&averages, &coupling);
        if solved.is_empty() {
            debug!(%station, "no significant constituents");
            return Ok(None);
        }

        let mut constituents: Vec<FittedConstituent> = solved
            .into_iter()
            .map(|s| FittedConstituent {
                name: modes[s.candidate.mode].name.clone(),
                speed: s.candidate.speed,
                coefficient: s.coefficient,
            })
            .collect();
        constituents.sort_by(|a, b| {
            a.speed
                .radians_per_second()
                .total_cmp(&b.speed.radians_per_second())
        });

        let mut fit = HarmonicFit {
            station,
            epoch,
            datum: Amplitude::new(mean, dimension),
            constituents,
            metrics: None,
            samples: observed.len(),
            patches: patches.len(),
        };
        fit.metrics = evaluate(&fit.running_set(), &observed)?;

        info!(
            %station,
            constituents = fit.constituents.len(),
            samples = fit.samples,
            patches = fit.patches,
            rmse = fit.metrics.map(|m| m.rmse),
            "harmonic analysis complete"
        );
        Ok(Some(fit))
    }

    /// Run selection and solve, excluding weak modes round by round.
    fn prune(&self, averages: &[Candidate], coupling: &Coupling) -> Vec<Solved> {
        let cut = self.config.amplitude_cut;
        let mut excluded: HashSet<usize> = HashSet::new();
        let mut solved = Vec::new();

        for round in 0..MAX_PRUNING_ROUNDS {
            let candidates = averages
                .iter()
                .filter(|c| !excluded.contains(&c.mode))
                .cloned()
                .collect();
            solved = self.select_and_solve(candidates, coupling);

            let weak: Vec<usize> = solved
                .iter()
                .filter(|s| s.coefficient.norm() < cut)
                .map(|s| s.candidate.mode)
                .collect();
            debug!(round, solved = solved.len(), weak = weak.len(), "pruning round");
            if weak.is_empty() {
                break;
            }
            excluded.extend(weak);
        }

        solved.retain(|s| s.coefficient.norm() >= cut);
        solved
    }

    fn select_and_solve(&self, candidates: Vec<Candidate>, coupling: &Coupling) -> Vec<Solved> {
        let config = &self.config;
        let pair = |q: &Candidate, p: &Candidate| coupling.coupling(q.speed, p.speed);

        let candidates = amplitude_pass(candidates, config.amplitude_cut);
        let candidates = slow_pass(candidates, config.slow_cut, |c| {
            coupling.mirror(c.speed).norm()
        });
        group_by_resolution(candidates, config.resolution_cut, |q, p| pair(q, p).norm())
            .into_iter()
            .map(|group| {
                check_group(
                    group,
                    config.amplitude_diff_lower_cut,
                    config.amplitude_diff_upper_cut,
                    pair,
                )
            })
            .flat_map(|group| solve_group(group, pair))
            .collect()
    }

    /// Analyze a station, reusing previously stored coefficients.
    ///
    /// A fresh fit is written back to the store.
    pub fn analyze<S: ReadingSource + CoefficientStore>(
        &self,
        store: &mut S,
        station: StationId,
    ) -> Result<Option<RunningSet>> {
        if let Some(stored) = store.load_coefficients(station)? {
            debug!(%station, "using stored coefficients");
            return Ok(Some(stored.to_running_set(store.dimension(station)?)));
        }
        let Some(fit) = self.fit(&*store, station)? else {
            return Ok(None);
        };
        let set = fit.running_set();
        store.store_coefficients(station, StoredCoefficients::from_running_set(&set))?;
        Ok(Some(set))
    }

    /// Discard stored coefficients so the next `analyze` refits.
    pub fn forget<S: CoefficientStore + ?Sized>(store: &mut S, station: StationId) -> Result<()> {
        store.delete_coefficients(station)?;
        Ok(())
    }

    /// Time of the station's newest reading.
    pub fn last_data_point<R: ReadingSource + ?Sized>(
        source: &R,
        station: StationId,
    ) -> Result<Option<Timestamp>> {
        Ok(PatchSet::build(&source.epochs(station)?).last_data_point())
    }

    /// Analyze several stations concurrently.
    #[cfg(feature = "parallel")]
    pub fn fit_stations<R: ReadingSource + Sync + ?Sized>(
        &self,
        source: &R,
        stations: &[StationId],
    ) -> Vec<(StationId, Result<Option<HarmonicFit>>)> {
        use rayon::prelude::*;

        stations
            .par_iter()
            .map(|&station| (station, self.fit(source, station)))
            .collect()
    }
}

/// Per-mode sums over all samples, plus the samples themselves.
fn accumulate<R: ReadingSource + ?Sized>(
    source: &R,
    patches: &PatchSet,
    epoch: Timestamp,
    omegas: &[f64],
) -> Result<(Vec<Complex64>, Vec<(Timestamp, f64)>)> {
    let mut sums = vec![Complex64::new(0.0, 0.0); omegas.len()];
    let mut observed = Vec::with_capacity(patches.total_samples());
    let mut cursor = PatchIterator::new(source, patches);

    while cursor.next_patch()? {
        let Some(patch) = cursor.current() else {
            break;
        };
        // Phasors restart at each patch to keep rotation error bounded
        let start = patch.offset_from(epoch).as_secs_f64();
        let step = patch.step().as_secs_f64();
        let mut phasors: Vec<Complex64> = omegas
            .iter()
            .map(|w| Complex64::from_polar(1.0, -w * start))
            .collect();
        let rotations: Vec<Complex64> = omegas
            .iter()
            .map(|w| Complex64::from_polar(1.0, -w * step))
            .collect();

        for (t, reading) in cursor.samples() {
            observed.push((t, reading));
            for ((sum, z), rotation) in sums.iter_mut().zip(&mut phasors).zip(&rotations) {
                *sum += *z * reading;
                *z *= *rotation;
            }
        }
    }
    Ok((sums, observed))
}

/// Fit statistics of `set` against the analyzed samples.
fn evaluate(set: &RunningSet, observed: &[(Timestamp, f64)]) -> Result<Option<FitMetrics>> {
    let datum = set.datum().value();
    let fitted = observed
        .iter()
        .map(|&(t, _)| Ok(datum + set.tide_derivative(t, 0)?.value()))
        .collect::<Result<Vec<f64>>>()?;
    let readings: Vec<f64> = observed.iter().map(|&(_, r)| r).collect();
    Ok(FitMetrics::compute(&fitted, &readings))
}
