//! Integration tests for the variability pipeline.
//!
//! Purpose
//! -------
//! Exercise the public surface end to end: plan bins over an observation,
//! drive one or more analysis engines through the all-time and per-bin
//! fits, aggregate TS_var with damping, calibrate the significance, and
//! persist the results.
//!
//! Coverage
//! --------
//! - A scripted engine with quadratic log-likelihoods, so that TS_var and
//!   the per-bin likelihood ratios can be checked against hand-computed
//!   values for two backends at once.
//! - Bit-identical reruns.
//! - Configuration errors raised before any per-bin work, failure
//!   propagation from a bin, and workspace cleanup or retention.
//! - The persisted JSON layout read back through `PersistedResults`.
//! - The binned-Poisson reference engine on a constant and on a flaring
//!   source built from deterministic event lists.
//!
//! Exclusions
//! ----------
//! - Optimizer internals, upper-limit scans and the classification rules;
//!   those are covered by the unit tests of their modules.
use approx::assert_relative_eq;
use rust_variability::{
    backends::poisson::{EnergyBinning, EventList, PoissonProvider, PowerLawSource},
    binning::{BinningError, BinningSpec, GoodTimeIntervals, ObservationSpan, TimeBin},
    fitting::{
        AnalysisBackend, FitConfig, FitError, FitResult, FluxEstimate, ParameterSnapshot,
        ParameterState, SourceRole,
    },
    optimization::loglik_optimizer::MLEOptions,
    pipeline::{
        BackendProvider, PersistedResults, VariabilityError, VariabilityOptions,
        VariabilityResult, VariabilityTester,
    },
    statistics::ts_var_to_sigma,
};
use std::{
    cell::Cell,
    path::{Path, PathBuf},
    rc::Rc,
};

const DAY: f64 = 86_400.0;
const LL_MAX: f64 = -50.0;
const MARKER_FILE: &str = "model.txt";

/// Purpose
/// -------
/// Minimal engine whose source log-likelihood is the parabola
/// `ℓ(N) = LL_MAX − (N − N̂)² / (2σ²)` with a background component that
/// does not affect it.
///
/// Behavior
/// --------
/// - `fit` moves a free source normalization to `N̂`; a frozen one stays.
/// - `flux` equals the normalization; its error is `σ`.
/// - `fail` makes every fit report non-convergence.
/// - `src_role` is the role reported for `"src"`; `fits` counts `fit` calls.
#[derive(Debug, Clone)]
struct ScriptedBackend {
    n_hat: f64,
    sigma: f64,
    norm: f64,
    norm_free: bool,
    index: f64,
    index_free: bool,
    bkg_norm: f64,
    bkg_free: bool,
    fail: bool,
    src_role: SourceRole,
    fits: Rc<Cell<usize>>,
}

impl ScriptedBackend {
    fn new(n_hat: f64, sigma: f64, norm: f64) -> Self {
        Self {
            n_hat,
            sigma,
            norm,
            norm_free: true,
            index: 2.0,
            index_free: true,
            bkg_norm: 1.0,
            bkg_free: true,
            fail: false,
            src_role: SourceRole::Source,
            fits: Rc::new(Cell::new(0)),
        }
    }

    fn ll_at(&self, norm: f64) -> f64 {
        let d = norm - self.n_hat;
        LL_MAX - d * d / (2.0 * self.sigma * self.sigma)
    }

    fn check(&self, source: &str) -> FitResult<()> {
        match source {
            "src" | "bkg" => Ok(()),
            other => Err(FitError::UnknownSource { name: other.to_string() }),
        }
    }
}

impl AnalysisBackend for ScriptedBackend {
    fn fit(&mut self, config: &FitConfig) -> FitResult<()> {
        self.fits.set(self.fits.get() + 1);
        if self.fail {
            return Err(FitError::DidNotConverge {
                attempts: config.max_attempts,
                status: "scripted failure".to_string(),
            });
        }
        if self.norm_free {
            self.norm = self.n_hat;
        }
        Ok(())
    }

    fn log_likelihood(&self) -> FitResult<f64> {
        Ok(self.ll_at(self.norm))
    }

    fn test_statistic(
        &mut self, source: &str, _reoptimize: bool, _config: &FitConfig,
    ) -> FitResult<f64> {
        self.check(source)?;
        if source == "src" { Ok(2.0 * (self.ll_at(self.norm) - self.ll_at(0.0))) } else { Ok(0.0) }
    }

    fn sources(&self, role: SourceRole) -> Vec<String> {
        let mut names = Vec::new();
        if role == self.src_role {
            names.push("src".to_string());
        }
        if role == SourceRole::Background {
            names.push("bkg".to_string());
        }
        names
    }

    fn role_of(&self, source: &str) -> Option<SourceRole> {
        match source {
            "src" => Some(self.src_role),
            "bkg" => Some(SourceRole::Background),
            _ => None,
        }
    }

    fn set_free(&mut self, source: &str, free: bool) -> FitResult<()> {
        self.check(source)?;
        if source == "src" {
            self.norm_free = free;
            self.index_free = free;
        } else {
            self.bkg_free = free;
        }
        Ok(())
    }

    fn restrict_to_normalization_only(&mut self, source: &str) -> FitResult<()> {
        self.check(source)?;
        if source == "src" {
            self.norm_free = true;
            self.index_free = false;
        }
        Ok(())
    }

    fn flux(&self, source: &str) -> FitResult<FluxEstimate> {
        self.check(source)?;
        Ok(FluxEstimate { flux: self.normalization(source)?, flux_err: self.sigma })
    }

    fn normalization(&self, source: &str) -> FitResult<f64> {
        self.check(source)?;
        Ok(if source == "src" { self.norm } else { self.bkg_norm })
    }

    fn set_normalization(&mut self, source: &str, value: f64) -> FitResult<()> {
        self.check(source)?;
        if source == "src" {
            self.norm = value;
        } else {
            self.bkg_norm = value;
        }
        Ok(())
    }

    fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot::new()
            .with("src", "norm", ParameterState { value: self.norm, free: self.norm_free })
            .with("src", "index", ParameterState { value: self.index, free: self.index_free })
            .with("bkg", "norm", ParameterState { value: self.bkg_norm, free: self.bkg_free })
    }

    fn restore(&mut self, snapshot: &ParameterSnapshot) -> FitResult<()> {
        for (source, parameter, state) in snapshot.iter() {
            match (source, parameter) {
                ("src", "norm") => (self.norm, self.norm_free) = (state.value, state.free),
                ("src", "index") => (self.index, self.index_free) = (state.value, state.free),
                ("bkg", "norm") => (self.bkg_norm, self.bkg_free) = (state.value, state.free),
                _ => {
                    return Err(FitError::UnknownParameter {
                        source: source.to_string(),
                        parameter: parameter.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Purpose
/// -------
/// Provider that hands out [`ScriptedBackend`]s: the all-time engine peaks
/// at `N = 1`, and the k-th bound interval uses the k-th `(N̂, σ)` pair.
///
/// Bookkeeping
/// -----------
/// - `binds` counts `bind_interval` calls; `workdirs` records where each
///   one was asked to write, and a marker file is written there.
/// - `fail_at` makes the engine of that interval fail to converge.
/// - `fits` is shared by every engine handed out and counts their fits.
/// - `src_role` is passed to every engine handed out.
struct ScriptedProvider {
    label: String,
    script: Vec<(f64, f64)>,
    fail_at: Option<usize>,
    binds: usize,
    workdirs: Vec<PathBuf>,
    fits: Rc<Cell<usize>>,
    src_role: SourceRole,
}

impl ScriptedProvider {
    fn new(label: &str, script: &[(f64, f64)]) -> Self {
        Self {
            label: label.to_string(),
            script: script.to_vec(),
            fail_at: None,
            binds: 0,
            workdirs: Vec::new(),
            fits: Rc::new(Cell::new(0)),
            src_role: SourceRole::Source,
        }
    }

    fn failing_at(mut self, band: usize) -> Self {
        self.fail_at = Some(band);
        self
    }

    fn with_src_as_background(mut self) -> Self {
        self.src_role = SourceRole::Background;
        self
    }

    fn engine(&self, n_hat: f64, sigma: f64, norm: f64) -> ScriptedBackend {
        let mut backend = ScriptedBackend::new(n_hat, sigma, norm);
        backend.src_role = self.src_role;
        backend.fits = Rc::clone(&self.fits);
        backend
    }
}

impl BackendProvider for ScriptedProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn all_time(&mut self) -> VariabilityResult<Box<dyn AnalysisBackend>> {
        Ok(Box::new(self.engine(1.0, 0.1, 0.8)))
    }

    fn bind_interval(
        &mut self, bin: &TimeBin, seed: &ParameterSnapshot, workdir: &Path,
    ) -> VariabilityResult<Box<dyn AnalysisBackend>> {
        let k = self.binds;
        self.binds += 1;
        self.workdirs.push(workdir.to_path_buf());
        let marker = workdir.join(MARKER_FILE);
        std::fs::write(&marker, bin.label()).map_err(|e| VariabilityError::io(&marker, e))?;

        let (n_hat, sigma) = self.script[k % self.script.len()];
        let mut backend = self.engine(n_hat, sigma, 0.0);
        backend.fail = self.fail_at == Some(k);
        backend.restore(seed)?;
        Ok(Box::new(backend))
    }
}

/// Per-bin `(N̂, σ)` of the primary scripted backend: one bin at the
/// all-time flux and three bins away from it, all above `min_ts`.
const SCRIPT: [(f64, f64); 4] = [(1.0, 0.25), (1.5, 0.25), (0.6, 0.25), (2.0, 0.25)];

/// Same deviations with twice the per-bin uncertainty.
const WIDE_SCRIPT: [(f64, f64); 4] = [(1.0, 0.5), (1.5, 0.5), (0.6, 0.5), (2.0, 0.5)];

fn four_days() -> ObservationSpan {
    ObservationSpan::new(0.0, 4.0 * DAY).expect("a four-day span is valid")
}

fn options() -> VariabilityOptions {
    VariabilityOptions::with_binning(BinningSpec::uniform(4).expect("4 bins is a valid count"))
}

/// `Σ LR_i · ΔF_i² / (ΔF_i² + (0.02 F0)²)` with `F0 = 1` and
/// `LR_i = (N̂_i − 1)² / σ_i²`.
fn expected_ts_var(script: &[(f64, f64)]) -> f64 {
    script
        .iter()
        .map(|&(n_hat, sigma)| {
            let df = n_hat - 1.0;
            let lr = df * df / (sigma * sigma);
            lr * df * df / (df * df + 0.02 * 0.02)
        })
        .sum()
}

#[test]
// Purpose
// -------
// Ensure two backends run side by side over uniform bins produce the
// hand-computed likelihood ratios, damping weights, TS_var and sigma.
//
// Given
// -----
// - Four one-day bins over a four-day span.
// - "pointlike" driven by `SCRIPT`, "gtlike" by `WIDE_SCRIPT`.
// - All-time fit at F0 = 1.
//
// Expect
// ------
// - One report per backend in provider order.
// - LR = 0, 4, 2.56, 16 for "pointlike"; a zero weight on the bin at F0.
// - TS_var equal to `expected_ts_var`; "gtlike" a quarter of "pointlike".
// - Sigma equal to `ts_var_to_sigma(TS_var, 4)` and above 3 for
//   "pointlike".
fn scripted_backends_reproduce_hand_computed_ts_var() {
    // Arrange
    let tester = VariabilityTester::new("src", options()).expect("valid options");
    let mut pointlike = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut gtlike = ScriptedProvider::new("gtlike", &WIDE_SCRIPT);

    // Act
    let run = tester.run(&mut [&mut pointlike, &mut gtlike], &four_days()).expect("run succeeds");

    // Assert
    assert_eq!(run.bins.len(), 4);
    assert_eq!(run.bins[1], TimeBin::new(DAY, 2.0 * DAY).unwrap());
    assert_eq!(run.backends().collect::<Vec<_>>(), ["pointlike", "gtlike"]);
    assert_eq!((pointlike.binds, gtlike.binds), (4, 4));

    let p = run.report("pointlike").expect("pointlike report");
    assert_relative_eq!(p.all_time.flux, 1.0);
    let lrs: Vec<f64> = p.contributions.iter().map(|c| c.likelihood_ratio).collect();
    for (lr, expected) in lrs.iter().zip([0.0, 4.0, 2.56, 16.0]) {
        assert_relative_eq!(*lr, expected, max_relative = 1e-12, epsilon = 1e-12);
    }
    assert_eq!(p.contributions[0].weight, 0.0);
    assert!(p.contributions.iter().all(|c| !c.weight_substituted));
    assert!(p.bins.iter().all(|b| b.upper_limit.is_none()));
    assert_relative_eq!(p.ts_var, expected_ts_var(&SCRIPT), max_relative = 1e-12);
    assert_eq!(p.sigma(), ts_var_to_sigma(p.ts_var, 4).unwrap());
    assert!(p.sigma() > 3.0, "sigma = {}", p.sigma());

    let g = run.report("gtlike").expect("gtlike report");
    assert_relative_eq!(g.ts_var, expected_ts_var(&WIDE_SCRIPT), max_relative = 1e-12);
    assert_relative_eq!(g.ts_var, p.ts_var / 4.0, max_relative = 1e-12);
    assert!(g.sigma() < p.sigma());
}

#[test]
// Purpose
// -------
// Verify that repeating a run with the same inputs yields bit-identical
// results.
//
// Given
// -----
// - Two fresh providers with the same script and the same tester.
//
// Expect
// ------
// - Equal runs, identical TS_var bits and identical persisted JSON.
fn reruns_are_bit_identical() {
    // Arrange
    let tester = VariabilityTester::new("src", options()).expect("valid options");
    let mut first = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut second = ScriptedProvider::new("pointlike", &SCRIPT);

    // Act
    let a = tester.run(&mut [&mut first], &four_days()).expect("first run");
    let b = tester.run(&mut [&mut second], &four_days()).expect("second run");

    // Assert
    assert_eq!(a, b);
    assert_eq!(a.reports[0].ts_var.to_bits(), b.reports[0].ts_var.to_bits());
    assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
}

#[test]
// Purpose
// -------
// Ensure configuration mistakes are reported before any interval is
// bound.
//
// Given
// -----
// - No providers; two providers sharing a label; a source name the engine
//   does not know; bins that collapse over a five-second span.
// - A valid engine listed before one that registers the source of
//   interest as a background.
//
// Expect
// ------
// - `NoBackends`, `DuplicateBackend`, `Config(UnknownSource)`,
//   `Binning(DegenerateBin)` and `Config(ConflictingRoles)`.
// - No `bind_interval` calls and no fit on any engine, including the
//   valid one listed first.
fn configuration_errors_precede_per_bin_work() {
    // Arrange
    let tester = VariabilityTester::new("src", options()).expect("valid options");
    let ghost = VariabilityTester::new("ghost", options()).expect("valid options");
    let many = VariabilityOptions::with_binning(BinningSpec::uniform(10).unwrap());
    let dense = VariabilityTester::new("src", many).expect("valid options");
    let mut a = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut b = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut valid = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut conflicting = ScriptedProvider::new("gtlike", &SCRIPT).with_src_as_background();
    let mut none: [&mut dyn BackendProvider; 0] = [];

    // Act
    let no_backends = tester.run(&mut none, &four_days());
    let duplicate = tester.run(&mut [&mut a, &mut b], &four_days());
    let unknown = ghost.run(&mut [&mut a], &four_days());
    let short = ObservationSpan::new(0.0, 5.0).unwrap();
    let degenerate = dense.run(&mut [&mut a], &short);
    let conflict = tester.run(&mut [&mut valid, &mut conflicting], &four_days());

    // Assert
    assert_eq!(no_backends, Err(VariabilityError::NoBackends));
    assert_eq!(duplicate, Err(VariabilityError::DuplicateBackend { label: "pointlike".into() }));
    assert_eq!(
        unknown,
        Err(VariabilityError::Config(FitError::UnknownSource { name: "ghost".into() }))
    );
    assert!(matches!(
        degenerate,
        Err(VariabilityError::Binning(BinningError::DegenerateBin { .. }))
    ));
    assert_eq!(
        conflict,
        Err(VariabilityError::Config(FitError::ConflictingRoles { name: "src".into() }))
    );
    assert_eq!((a.binds, b.binds, valid.binds, conflicting.binds), (0, 0, 0, 0));
    assert_eq!((a.fits.get(), valid.fits.get(), conflicting.fits.get()), (0, 0, 0));
}

#[test]
// Purpose
// -------
// Verify a failing bin aborts the run with its context and leaves no
// temporary products behind.
//
// Given
// -----
// - A savedir prefix in a fresh temporary directory.
// - A provider whose third interval never converges.
//
// Expect
// ------
// - `BinFit { band: 2, backend: "pointlike", DidNotConverge }`.
// - Exactly three intervals bound, each in `time_<s>_<e>/pointlike`.
// - The prefix directory is empty afterwards.
fn failing_bin_aborts_and_cleans_workspace() {
    // Arrange
    let prefix = tempfile::tempdir().expect("tempdir");
    let mut opts = options();
    opts.savedir_prefix = Some(prefix.path().to_path_buf());
    let tester = VariabilityTester::new("src", opts).expect("valid options");
    let mut provider = ScriptedProvider::new("pointlike", &SCRIPT).failing_at(2);

    // Act
    let err = tester.run(&mut [&mut provider], &four_days()).unwrap_err();

    // Assert
    assert!(matches!(
        &err,
        VariabilityError::BinFit { band: 2, backend, source: FitError::DidNotConverge { .. } }
            if backend == "pointlike"
    ));
    assert_eq!(provider.binds, 3);
    let third = &provider.workdirs[2];
    assert!(third.ends_with(Path::new("time_172800_259200").join("pointlike")));
    assert!(provider.workdirs.iter().all(|dir| !dir.exists()));
    let leftovers = std::fs::read_dir(prefix.path()).expect("prefix readable").count();
    assert_eq!(leftovers, 0);
}

#[test]
// Purpose
// -------
// Ensure a persistent savedir keeps every per-bin product and that the
// persisted results carry the documented layout.
//
// Given
// -----
// - `savedir` under a temporary directory; backends "pointlike" and
//   "gtlike".
// - The run written with `write_json` and read back.
//
// Expect
// ------
// - A marker file per bin and backend under `savedir`.
// - Four bands with both backends, `days = 1`, TS_var and sigma per
//   backend matching the in-memory run.
fn persistent_savedir_and_persisted_layout() {
    // Arrange
    let root = tempfile::tempdir().expect("tempdir");
    let savedir = root.path().join("products");
    let mut opts = options();
    opts.savedir = Some(savedir.clone());
    let tester = VariabilityTester::new("src", opts).expect("valid options");
    let mut pointlike = ScriptedProvider::new("pointlike", &SCRIPT);
    let mut gtlike = ScriptedProvider::new("gtlike", &WIDE_SCRIPT);

    // Act
    let run = tester.run(&mut [&mut pointlike, &mut gtlike], &four_days()).expect("run succeeds");
    let out = root.path().join("variability.json");
    run.write_json(&out).expect("results written");
    let text = std::fs::read_to_string(&out).expect("results readable");
    let persisted = PersistedResults::from_json(&text).expect("results parse");
    let raw: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

    // Assert
    for bin in &run.bins {
        for label in ["pointlike", "gtlike"] {
            assert!(savedir.join(bin.label()).join(label).join(MARKER_FILE).is_file());
        }
    }
    assert_eq!(persisted.name, "src");
    assert_eq!(persisted.min_ts, 4.0);
    assert_eq!(persisted.time.starts, vec![0.0, DAY, 2.0 * DAY, 3.0 * DAY]);
    assert_eq!(persisted.bands.len(), 4);
    for band in &persisted.bands {
        assert_eq!(band.days, 1.0);
        assert_eq!(band.fits.keys().collect::<Vec<_>>(), ["gtlike", "pointlike"]);
    }
    assert_eq!(persisted.ts_var["pointlike"], run.reports[0].ts_var);
    assert_eq!(persisted.sigma["gtlike"], run.reports[1].sigma());
    assert_eq!(persisted.all_time["pointlike"].flux.flux, 1.0);
    assert!(raw["TS_var"].is_object() && raw["all_time"]["gtlike"]["TS"].is_number());
    assert!(raw["bands"][0]["pointlike"]["ll_0"].is_number());
}

// ---- Poisson reference engine ----

const EMIN: f64 = 100.0;
const EMAX: f64 = 1e5;
const BIN_SECONDS: f64 = 1_000.0;

/// `u`-quantile of a power law with index `gamma` on `[EMIN, EMAX)`.
fn power_law_quantile(gamma: f64, u: f64) -> f64 {
    let a = EMIN.powf(1.0 - gamma);
    let b = EMAX.powf(1.0 - gamma);
    (a + u * (b - a)).powf(1.0 / (1.0 - gamma))
}

/// Purpose
/// -------
/// Deterministic event list over four 1000 s bins: in bin `k`,
/// `source_counts[k]` events follow an index-2 spectrum and 300 events an
/// index-3 background, each placed at evenly spaced quantiles so that
/// equal counts give identical spectra.
fn quantile_events(source_counts: [usize; 4]) -> EventList {
    let mut times = Vec::new();
    let mut energies = Vec::new();
    for (k, &n_src) in source_counts.iter().enumerate() {
        let n_bkg = 300;
        let mut bin_energies: Vec<f64> = (0..n_src)
            .map(|i| power_law_quantile(2.0, (i as f64 + 0.5) / n_src as f64))
            .collect();
        bin_energies
            .extend((0..n_bkg).map(|i| power_law_quantile(3.0, (i as f64 + 0.5) / n_bkg as f64)));
        let total = bin_energies.len() as f64;
        let start = k as f64 * BIN_SECONDS;
        for (j, energy) in bin_energies.into_iter().enumerate() {
            times.push(start + (j as f64 + 0.5) / total * BIN_SECONDS);
            energies.push(energy);
        }
    }
    let gti = GoodTimeIntervals::single(0.0, 4.0 * BIN_SECONDS).expect("valid GTI");
    EventList::new(times, energies, gti).expect("valid events")
}

fn poisson_provider(source_counts: [usize; 4]) -> PoissonProvider {
    let model = vec![
        PowerLawSource::new("src", SourceRole::Source, 1e-3, 2.0, EMIN)
            .unwrap()
            .with_fixed_index(),
        PowerLawSource::new("bkg", SourceRole::Background, 1e-2, 3.0, EMIN)
            .unwrap()
            .with_fixed_index(),
    ];
    let binning = EnergyBinning::log_spaced(EMIN, EMAX, 10).unwrap();
    PoissonProvider::new(
        "poisson",
        quantile_events(source_counts),
        binning,
        1.0,
        model,
        MLEOptions::default(),
    )
    .expect("valid provider")
}

#[test]
// Purpose
// -------
// Ensure the reference engine separates a steady source from one that
// flares in a single bin.
//
// Given
// -----
// - Four 1000 s bins, 300 background events each.
// - Constant: 200 source events in every bin.
// - Flaring: 200, 200, 800, 200 source events.
//
// Expect
// ------
// - Constant: every bin flux equals the all-time flux to 1e-3 and sigma
//   stays below 1.
// - Flaring: the flare bin has the largest flux and sigma exceeds 5.
fn poisson_constant_versus_flaring_source() {
    // Arrange
    let tester = VariabilityTester::new("src", options()).expect("valid options");
    let mut constant = poisson_provider([200, 200, 200, 200]);
    let mut flaring = poisson_provider([200, 200, 800, 200]);
    let span = constant.events().gti().clone();

    // Act
    let steady = tester.run(&mut [&mut constant], &span).expect("constant run");
    let flare = tester.run(&mut [&mut flaring], &span).expect("flaring run");

    // Assert
    let s = &steady.reports[0];
    assert_eq!(steady.bins.len(), 4);
    for bin in &s.bins {
        assert_relative_eq!(bin.flux, s.all_time.flux, max_relative = 1e-3);
        assert!(bin.test_statistic > 25.0);
    }
    assert!(s.sigma() < 1.0, "constant source sigma = {}", s.sigma());

    let f = &flare.reports[0];
    let brightest = f
        .bins
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.flux.total_cmp(&b.1.flux))
        .map(|(k, _)| k);
    assert_eq!(brightest, Some(2));
    assert!(f.ts_var > s.ts_var);
    assert!(f.sigma() > 5.0, "flaring source sigma = {}", f.sigma());
}
