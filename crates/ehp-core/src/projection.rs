//! Projection engine: replays the registry's differentials under one category
//! and reports which classes are alive on a page.
//!
//! Every call builds its own working map from the immutable [`Dataset`], so
//! concurrent projections over a shared dataset need no synchronization.
//! Edges that point at classes outside the seeded window are skipped without
//! comment; reporting broken references is the verifier's job.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::differential::Differential;
use crate::module_state::ModuleState;
use crate::view::{Category, ViewParameters};

/// Module type and Adams filtration of one class after replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survivor {
    pub module: ModuleState,
    pub filtration: i32,
}

impl Survivor {
    pub fn is_alive(&self) -> bool {
        self.module.is_alive()
    }
}

/// Result of one projection. Contains every seeded class, dead ones included.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SurvivorState {
    survivors: BTreeMap<String, Survivor>,
    fired: Vec<Differential>,
}

impl SurvivorState {
    pub fn get(&self, name: &str) -> Option<&Survivor> {
        self.survivors.get(name)
    }

    pub fn module(&self, name: &str) -> Option<ModuleState> {
        self.survivors.get(name).map(|s| s.module)
    }

    /// Seeded and not killed.
    pub fn is_alive(&self, name: &str) -> bool {
        self.survivors.get(name).is_some_and(Survivor::is_alive)
    }

    pub fn survivors(&self) -> &BTreeMap<String, Survivor> {
        &self.survivors
    }

    pub fn alive(&self) -> impl Iterator<Item = (&str, &Survivor)> {
        self.survivors
            .iter()
            .filter(|(_, s)| s.is_alive())
            .map(|(name, s)| (name.as_str(), s))
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn fired(&self) -> &[Differential] {
        &self.fired
    }

    pub fn len(&self) -> usize {
        self.survivors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.survivors.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    module: ModuleState,
    filtration: i32,
    /// E1 filtration; coefficients are quoted relative to it.
    original_filtration: i32,
}

impl Entry {
    fn killed(self) -> Self {
        Self {
            module: ModuleState::Dead,
            ..self
        }
    }
}

/// Project `dataset` through `view`.
pub fn project(dataset: &Dataset, view: &ViewParameters) -> SurvivorState {
    let mut working = seed(dataset, view);
    let mut fired = Vec::new();

    for diff in dataset.differentials() {
        // Replay order is ascending page, so nothing later can fire either.
        if diff.page >= view.page {
            break;
        }
        let (Some(&from), Some(&to)) = (
            working.get(diff.from.as_str()),
            working.get(diff.to.as_str()),
        ) else {
            continue;
        };

        let outcome = match view.category {
            Category::Synthetic => replay_synthetic(diff, from, to),
            Category::Algebraic => replay_algebraic(diff, from, to),
            Category::Geometric => replay_geometric(from, to),
        };

        if let Some((from, to)) = outcome {
            working.insert(diff.from.as_str(), from);
            working.insert(diff.to.as_str(), to);
            fired.push(diff.clone());
        }
    }

    if view.category == Category::Synthetic && view.is_limit_page() && view.tau_finalization {
        finalize_tau(dataset, &mut working);
    }

    fired.retain(|d| {
        if view.include_all_fired {
            d.page <= view.page
        } else {
            d.page == view.page
        }
    });

    let survivors = working
        .into_iter()
        .map(|(name, e)| {
            (
                name.to_string(),
                Survivor {
                    module: e.module,
                    filtration: e.filtration,
                },
            )
        })
        .collect();

    SurvivorState { survivors, fired }
}

fn seed<'a>(dataset: &'a Dataset, view: &ViewParameters) -> HashMap<&'a str, Entry> {
    let mut working = HashMap::new();

    for g in dataset.generators().iter().filter(|g| view.admits(g)) {
        let module = match view.category {
            Category::Algebraic => ModuleState::Free,
            Category::Geometric if g.torsion.is_some() => continue,
            Category::Geometric => ModuleState::Free,
            Category::Synthetic => g.raw_module(),
        };
        working.insert(
            g.name.as_str(),
            Entry {
                module,
                filtration: g.adams_filtration,
                original_filtration: g.adams_filtration,
            },
        );
    }

    working
}

/// Synthetic rule. Into a free target the source dies and the target becomes
/// τ-torsion; into a torsion target the new differential layers on top,
/// moving the source's torsion and filtration by the change in exponent.
fn replay_synthetic(diff: &Differential, from: Entry, to: Entry) -> Option<(Entry, Entry)> {
    if !diff.is_real() || from.module.is_dead() || to.module.is_dead() {
        return None;
    }

    // Widened: coefficients and filtrations come straight from imported JSON.
    let adjusted =
        i64::from(diff.coeff) - i64::from(to.original_filtration) + i64::from(to.filtration);

    match to.module {
        ModuleState::Free => Some((
            from.killed(),
            Entry {
                module: ModuleState::from_exponent(adjusted),
                ..to
            },
        )),
        ModuleState::Torsion(t) => {
            let delta = adjusted - i64::from(t);
            let module = match from.module {
                ModuleState::Torsion(f) => ModuleState::from_exponent(i64::from(f) + delta),
                other => other,
            };
            Some((
                Entry {
                    module,
                    filtration: saturate(i64::from(from.filtration) + delta),
                    ..from
                },
                Entry {
                    module: ModuleState::from_exponent(adjusted),
                    ..to
                },
            ))
        }
        ModuleState::Dead => None,
    }
}

fn saturate(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Algebraic rule: only coefficient-free, non-synthetic differentials exist.
fn replay_algebraic(diff: &Differential, from: Entry, to: Entry) -> Option<(Entry, Entry)> {
    (diff.coeff == 0 && !diff.synthetic_only).then(|| (from.killed(), to.killed()))
}

/// Geometric rule: a target may already be gone, earlier than its synthetic
/// counterpart; then the differential has nothing left to hit.
fn replay_geometric(from: Entry, to: Entry) -> Option<(Entry, Entry)> {
    to.module
        .is_alive()
        .then(|| (from.killed(), to.killed()))
}

/// τ·from = to on E∞: `to` dies and its torsion folds into `from`.
fn finalize_tau<'a>(dataset: &'a Dataset, working: &mut HashMap<&'a str, Entry>) {
    for tm in dataset.tau_mults() {
        let (Some(&from), Some(&to)) = (working.get(tm.from.as_str()), working.get(tm.to.as_str()))
        else {
            continue;
        };
        let ModuleState::Torsion(f) = from.module else {
            continue;
        };
        if to.module.is_dead() {
            continue;
        }

        let module = match to.module {
            ModuleState::Torsion(t) => ModuleState::Torsion(f.saturating_add(t)),
            _ => ModuleState::Free,
        };
        working.insert(tm.to.as_str(), to.killed());
        working.insert(
            tm.from.as_str(),
            Entry {
                module,
                filtration: from.filtration,
                ..from
            },
        );
    }
}
