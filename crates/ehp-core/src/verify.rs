//! Self-consistency checks run once after a dataset is loaded.
//!
//! Structural checks look at the registries alone. The reference-table check
//! projects the synthetic E∞ page and counts survivors per stem against the
//! known stable stems. Each check comes as a pure `check_*` function returning
//! its findings and a `verify_*` wrapper that logs them.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::constants::{ALGEBRAIC_STABLE_STEMS, CLASSICAL_STABLE_STEMS, MAX_REFERENCE_STEM};
use crate::dataset::Dataset;
use crate::module_state::ModuleState;
use crate::projection::project;
use crate::view::{Category, ViewParameters};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    /// The dataset cannot be used.
    Fatal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Differential,
    Multiplication,
    TauMultiplication,
}

impl EdgeKind {
    fn label(self) -> &'static str {
        match self {
            Self::Differential => "Differential",
            Self::Multiplication => "Multiplication",
            Self::TauMultiplication => "Tau multiplication",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    From,
    To,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    DuplicateGenerator {
        name: String,
    },
    UnknownGenerator {
        edge: EdgeKind,
        endpoint: Endpoint,
        name: String,
    },
    /// `adams(to)` should be `adams(from) + coeff + 1`.
    FiltrationMismatch {
        from: String,
        to: String,
        expected: i64,
        actual: i32,
    },
    /// The EHP row gap of a differential should equal its page.
    PageMismatch {
        from: String,
        to: String,
        page: i32,
        row_gap: i64,
    },
    StemGapMismatch {
        from: String,
        to: String,
        stem_gap: i64,
    },
}

impl IntegrityIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateGenerator { .. } => Severity::Fatal,
            Self::UnknownGenerator { .. } | Self::FiltrationMismatch { .. } => Severity::Error,
            Self::PageMismatch { .. } | Self::StemGapMismatch { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateGenerator { name } => write!(f, "Duplicate generator name: {name}"),
            Self::UnknownGenerator {
                edge,
                endpoint,
                name,
            } => {
                let side = match endpoint {
                    Endpoint::From => "from",
                    Endpoint::To => "to",
                };
                write!(
                    f,
                    "{} references unknown '{side}' generator: {name}",
                    edge.label()
                )
            }
            Self::FiltrationMismatch {
                from,
                to,
                expected,
                actual,
            } => write!(
                f,
                "Adams filtration of target does not match for differential {from} -> {to}: \
                 expected {expected}, found {actual}"
            ),
            Self::PageMismatch {
                from,
                to,
                page,
                row_gap,
            } => write!(
                f,
                "Page d{page} does not match the EHP row gap {row_gap} of differential {from} -> {to}"
            ),
            Self::StemGapMismatch { from, to, stem_gap } => write!(
                f,
                "Stem difference is {stem_gap} instead of 1 for differential {from} -> {to}"
            ),
        }
    }
}

/// Findings of the structural check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// False once any fatal issue was found.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity() == Severity::Fatal)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == severity)
            .count()
    }

    /// Log every finding: errors and fatal issues at error level, the rest as warnings.
    pub fn log(&self) {
        for issue in &self.issues {
            match issue.severity() {
                Severity::Fatal | Severity::Error => tracing::error!("{issue}"),
                Severity::Warning => tracing::warn!("{issue}"),
            }
        }
    }

    pub fn first_fatal(&self) -> Option<&IntegrityIssue> {
        self.issues.iter().find(|i| i.severity() == Severity::Fatal)
    }
}

/// Structural checks. A duplicate generator name ends the check immediately;
/// every other finding is collected and the check continues.
pub fn check_integrity(dataset: &Dataset) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    let mut names = HashSet::with_capacity(dataset.len());
    for g in dataset.generators() {
        if !names.insert(g.name.as_str()) {
            report.issues.push(IntegrityIssue::DuplicateGenerator {
                name: g.name.clone(),
            });
            return report;
        }
    }

    let mut check_endpoints = |edge: EdgeKind, from: &str, to: &str| {
        for (endpoint, name) in [(Endpoint::From, from), (Endpoint::To, to)] {
            if !names.contains(name) {
                report.issues.push(IntegrityIssue::UnknownGenerator {
                    edge,
                    endpoint,
                    name: name.to_string(),
                });
            }
        }
    };

    for d in dataset.differentials() {
        check_endpoints(EdgeKind::Differential, &d.from, &d.to);
    }
    for m in dataset.multiplications() {
        check_endpoints(EdgeKind::Multiplication, &m.from, &m.to);
    }
    for tm in dataset.tau_mults() {
        check_endpoints(EdgeKind::TauMultiplication, &tm.from, &tm.to);
    }

    for d in dataset.differentials() {
        let (Some(from), Some(to)) = (dataset.find(&d.from), dataset.find(&d.to)) else {
            continue;
        };

        // Widened: filtrations and coefficients come straight from imported JSON.
        let expected = i64::from(from.adams_filtration) + i64::from(d.coeff) + 1;
        if i64::from(to.adams_filtration) != expected {
            report.issues.push(IntegrityIssue::FiltrationMismatch {
                from: d.from.clone(),
                to: d.to.clone(),
                expected,
                actual: to.adams_filtration,
            });
        }
        let row_gap = i64::from(from.y) - i64::from(to.y);
        if row_gap != i64::from(d.page) {
            report.issues.push(IntegrityIssue::PageMismatch {
                from: d.from.clone(),
                to: d.to.clone(),
                page: d.page,
                row_gap,
            });
        }
        let stem_gap = i64::from(from.x) - i64::from(to.x);
        if stem_gap != 1 {
            report.issues.push(IntegrityIssue::StemGapMismatch {
                from: d.from.clone(),
                to: d.to.clone(),
                stem_gap,
            });
        }
    }

    report
}

/// Run [`check_integrity`] and log every finding. Returns false on a fatal issue.
pub fn verify_integrity(dataset: &Dataset) -> bool {
    let report = check_integrity(dataset);
    report.log();
    report.is_valid()
}

/// Expected survivor counts per stem.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceTables {
    pub classical: &'static [u32],
    pub algebraic: &'static [u32],
    /// Stems `0..=max_stem` are compared.
    pub max_stem: usize,
}

impl ReferenceTables {
    pub const STABLE: Self = Self {
        classical: &CLASSICAL_STABLE_STEMS,
        algebraic: &ALGEBRAIC_STABLE_STEMS,
        max_stem: MAX_REFERENCE_STEM,
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StemCounts {
    pub classical: Vec<u32>,
    pub algebraic: Vec<u32>,
}

/// Count synthetic E∞ survivors per stem, tau multiplications applied.
///
/// A free class counts once in both tables. A τ-torsion class is the shadow
/// of a differential in the Adams spectral sequence, so algebraically it
/// accounts for a class in its own stem and one in the next.
pub fn count_stable_stems(dataset: &Dataset, max_stem: usize) -> StemCounts {
    let view = ViewParameters::limit(Category::Synthetic).with_tau_finalization(true);
    let state = project(dataset, &view);

    let mut counts = StemCounts {
        classical: vec![0; max_stem + 1],
        algebraic: vec![0; max_stem + 1],
    };
    let bump = |table: &mut Vec<u32>, stem: i32| {
        if let Some(slot) = usize::try_from(stem).ok().and_then(|s| table.get_mut(s)) {
            *slot += 1;
        }
    };

    for (name, survivor) in state.alive() {
        let Some(g) = dataset.find(name) else {
            continue;
        };
        match survivor.module {
            ModuleState::Free => {
                bump(&mut counts.classical, g.x);
                bump(&mut counts.algebraic, g.x);
            }
            ModuleState::Torsion(_) => {
                bump(&mut counts.algebraic, g.x);
                bump(&mut counts.algebraic, g.x + 1);
            }
            ModuleState::Dead => {}
        }
    }

    counts
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StemTable {
    Classical,
    Algebraic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StemMismatch {
    pub table: StemTable,
    pub stem: usize,
    pub found: u32,
    pub expected: u32,
}

impl fmt::Display for StemMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = match self.table {
            StemTable::Classical => "Classical",
            StemTable::Algebraic => "Algebraic",
        };
        write!(
            f,
            "{table} stable stem in degree {} does not agree: found {}, expected {}",
            self.stem, self.found, self.expected
        )
    }
}

/// Compare survivor counts with `tables`, highest stem first.
pub fn check_reference_tables(dataset: &Dataset, tables: &ReferenceTables) -> Vec<StemMismatch> {
    let counts = count_stable_stems(dataset, tables.max_stem);
    let mut mismatches = Vec::new();

    for stem in (0..=tables.max_stem).rev() {
        for (table, found, reference) in [
            (StemTable::Classical, &counts.classical, tables.classical),
            (StemTable::Algebraic, &counts.algebraic, tables.algebraic),
        ] {
            let expected = reference.get(stem).copied().unwrap_or(0);
            if found[stem] != expected {
                mismatches.push(StemMismatch {
                    table,
                    stem,
                    found: found[stem],
                    expected,
                });
            }
        }
    }

    mismatches
}

/// Check against `tables` and log every mismatch. Returns true when
/// everything agrees.
pub fn verify_against(dataset: &Dataset, tables: &ReferenceTables) -> bool {
    let mismatches = check_reference_tables(dataset, tables);
    for m in &mismatches {
        tracing::error!("{m}");
    }
    mismatches.is_empty()
}

/// [`verify_against`] the stable stems.
pub fn verify_against_reference_tables(dataset: &Dataset) -> bool {
    verify_against(dataset, &ReferenceTables::STABLE)
}
