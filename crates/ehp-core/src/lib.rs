//! Synthetic EHP spectral sequence state engine.
//!
//! Replays a fixed registry of generators and differentials under one of
//! three categories (synthetic, algebraic, geometric) and reports which
//! classes are alive on a page, with their τ-torsion and Adams filtration.
//! On top of that it infers Adams differentials by comparing the algebraic
//! and synthetic E∞ pages, resolves the naming hierarchy, and checks a
//! dataset against itself and against the known stable stems.
//!
//! Zero I/O: pure replay with no opinions about transport or persistence.

pub mod chart;
pub mod constants;
pub mod dataset;
pub mod differential;
pub mod generator;
pub mod inference;
pub mod inspect;
pub mod module_state;
pub mod naming;
pub mod projection;
pub mod serde_compat;
pub mod verify;
pub mod view;

pub use chart::{DiffLine, Dot, Edge, EhpView, ass_view, ehp_view};
pub use constants::{ALREADY_TORSION_REASON, LIMIT_PAGE, MAX_REFERENCE_STEM};
pub use dataset::Dataset;
pub use differential::{Differential, DifferentialKind, Multiplication, TauMultiplication};
pub use generator::Generator;
pub use inference::{InferredDiagram, Provenance, infer_differentials};
pub use inspect::{
    DifferentialInfo, GeneratorInfo, SphereLifecycle, inspect_differential, inspect_generator,
};
pub use module_state::ModuleState;
pub use naming::{generated_by_name, generates, generating_name};
pub use projection::{Survivor, SurvivorState, project};
pub use serde_compat::{export_json, import_json};
pub use verify::{
    IntegrityIssue, IntegrityReport, ReferenceTables, Severity, StemMismatch, check_integrity,
    check_reference_tables, count_stable_stems, verify_against, verify_against_reference_tables,
    verify_integrity,
};
pub use view::{Category, Truncation, ViewParameters};
