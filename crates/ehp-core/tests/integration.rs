//! Integration tests across the engine:
//! load → verify → project → infer → chart, through the public API only.

use ehp_core::{
    ALREADY_TORSION_REASON, Category, Dataset, Differential, DifferentialKind, Generator,
    LIMIT_PAGE, ModuleState, Truncation, ViewParameters, check_integrity, ehp_view, export_json,
    import_json, infer_differentials, inspect_generator, project, verify_integrity,
};

/// A small slice of an EHP chart: a coefficient-free d1, a synthetic-only d1,
/// a d2 carrying τ², one raw torsion class and one τ-multiplication.
const CHART: &str = r#"{
    "generators": [
        {"name": "[1]",   "x": 0, "y": 1, "adams_filtration": 0},
        {"name": "1[2]",  "x": 1, "y": 2, "adams_filtration": 1},
        {"name": "[2]",   "x": 1, "y": 2, "adams_filtration": 1},
        {"name": "2[1]",  "x": 1, "y": 1, "adams_filtration": 3},
        {"name": "3[3]",  "x": 2, "y": 3, "adams_filtration": 0},
        {"name": "1[3]",  "x": 3, "y": 3, "adams_filtration": 2},
        {"name": "4[1]",  "x": 2, "y": 1, "adams_filtration": 2, "torsion": 2},
        {"name": "5[2]",  "x": 3, "y": 2, "adams_filtration": 2},
        {"name": "6[1]",  "x": 2, "y": 1, "adams_filtration": 3},
        {"name": "7[1]",  "x": 3, "y": 1, "adams_filtration": 4}
    ],
    "differentials": [
        {"from": "3[3]", "to": "2[1]", "coeff": 2, "d": 2},
        {"from": "[2]",  "to": "[1]",  "coeff": 0, "d": 1},
        {"from": "5[2]", "to": "6[1]", "coeff": 0, "d": 1, "synthetic": true}
    ],
    "multiplications": [{"from": "1[2]", "to": "2[1]", "internal": false}],
    "tau_mults": [{"from": "2[1]", "to": "7[1]"}]
}"#;

fn chart() -> Dataset {
    import_json(CHART).unwrap()
}

#[test]
fn dataset_loads_and_verifies() {
    let data = chart();
    assert!(verify_integrity(&data));
    let report = check_integrity(&data);
    assert!(report.is_valid());
    // Differentials are sorted into replay order on load.
    let pages: Vec<_> = data.differentials().iter().map(|d| d.page).collect();
    assert_eq!(pages, vec![1, 1, 2]);
}

#[test]
fn duplicate_name_refuses_dataset() {
    let json = r#"{"generators": [
        {"name": "A[1]", "x": 1, "y": 1, "adams_filtration": 0},
        {"name": "A[1]", "x": 2, "y": 1, "adams_filtration": 0}
    ]}"#;
    let data = import_json(json).unwrap();
    assert!(!verify_integrity(&data));
}

#[test]
fn maximal_coefficient_loads_verifies_and_projects() {
    let json = r#"{
        "generators": [
            {"name": "a[2]", "x": 1, "y": 2, "adams_filtration": 0},
            {"name": "b[1]", "x": 0, "y": 1, "adams_filtration": -1}
        ],
        "differentials": [{"from": "a[2]", "to": "b[1]", "coeff": 2147483647, "d": 1}]
    }"#;
    let data = import_json(json).unwrap();

    let report = check_integrity(&data);
    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].to_string().contains("expected 2147483648, found -1"));
    assert!(verify_integrity(&data));

    let state = project(&data, &ViewParameters::limit(Category::Synthetic));
    assert_eq!(state.module("a[2]"), Some(ModuleState::Dead));
    assert_eq!(state.module("b[1]"), Some(ModuleState::Torsion(2_147_483_647)));
}

#[test]
fn categories_disagree_on_the_same_registry() {
    let data = chart();

    let synthetic = project(&data, &ViewParameters::limit(Category::Synthetic));
    let algebraic = project(&data, &ViewParameters::limit(Category::Algebraic));
    let geometric = project(&data, &ViewParameters::limit(Category::Geometric));

    // τ² differential: synthetic torsion, algebraically nothing happens.
    assert_eq!(synthetic.module("2[1]"), Some(ModuleState::Torsion(2)));
    assert_eq!(algebraic.module("2[1]"), Some(ModuleState::Free));
    assert_eq!(geometric.module("2[1]"), Some(ModuleState::Dead));

    // Synthetic-only differential never fires algebraically.
    assert!(synthetic.module("5[2]").is_some_and(ModuleState::is_dead));
    assert!(algebraic.is_alive("5[2]"));
    assert!(!geometric.is_alive("5[2]"));

    // Raw torsion classes do not exist geometrically.
    assert!(geometric.get("4[1]").is_none());
    assert_eq!(algebraic.module("4[1]"), Some(ModuleState::Free));
    assert_eq!(synthetic.module("4[1]"), Some(ModuleState::Torsion(2)));

    assert_eq!(algebraic.fired().len(), 1);
    assert_eq!(geometric.fired().len(), 3);
    assert_eq!(synthetic.fired().len(), 3);
}

#[test]
fn tau_finalization_only_at_the_synthetic_limit() {
    let data = chart();
    let with_tau = ViewParameters::limit(Category::Synthetic).with_tau_finalization(true);

    let finalized = project(&data, &with_tau);
    assert!(!finalized.is_alive("7[1]"));
    assert_eq!(finalized.module("2[1]"), Some(ModuleState::Free));
    assert_eq!(finalized.get("2[1]").map(|s| s.filtration), Some(3));

    let before_limit = project(&data, &with_tau.at_page(LIMIT_PAGE - 1));
    assert!(before_limit.is_alive("7[1]"));
    assert_eq!(before_limit.module("2[1]"), Some(ModuleState::Torsion(2)));

    let algebraic = project(
        &data,
        &ViewParameters::limit(Category::Algebraic).with_tau_finalization(true),
    );
    assert!(algebraic.is_alive("7[1]"));
}

#[test]
fn inferred_differential_for_raw_torsion() {
    // Raw torsion 2 that is algebraically alive and synthetically τ²-torsion.
    let data = Dataset::from_parts(
        vec![Generator::new("g[1]", 4, 1, 5).with_torsion(2)],
        Vec::new(),
    );
    let diagram = infer_differentials(&data, Truncation::default());

    assert_eq!(diagram.edges.len(), 1);
    let edge = &diagram.edges[0];
    assert_eq!(edge.kind, DifferentialKind::Fake);
    assert_eq!((edge.coeff, edge.page), (2, 3));

    let tgt = diagram.nodes.iter().find(|n| n.name == edge.to).unwrap();
    assert_eq!((tgt.x, tgt.adams_filtration), (5, 2));

    let provenance = diagram.provenance_for(edge).unwrap();
    assert!(provenance.linked.is_none());
    assert_eq!(provenance.reason.as_deref(), Some(ALREADY_TORSION_REASON));
}

#[test]
fn inferred_differential_links_raw_match() {
    let data = chart();
    let diagram = infer_differentials(&data, Truncation::default());

    let edge = diagram
        .edges
        .iter()
        .find(|e| e.from == "2[1]_src")
        .unwrap();
    assert_eq!((edge.coeff, edge.page), (2, 3));
    let linked = diagram
        .provenance_for(edge)
        .and_then(|p| p.linked.clone())
        .unwrap();
    assert_eq!(linked, data.differentials()[2]);

    // Every edge has a provenance entry.
    assert_eq!(diagram.edges.len(), diagram.provenance.len());
    // Synthetic-only kills are absent from the diagram.
    assert!(diagram.nodes.iter().all(|n| !n.name.starts_with("5[2]")));
}

#[test]
fn inference_matches_torsion_exponents() {
    let data = chart();
    let synthetic = project(&data, &ViewParameters::limit(Category::Synthetic));
    let diagram = infer_differentials(&data, Truncation::default());

    for edge in &diagram.edges {
        let base = edge.from.trim_end_matches("_src");
        let survivor = synthetic.get(base).unwrap();
        assert_eq!(survivor.module, ModuleState::Torsion(edge.coeff as u32));
        assert_eq!(edge.page, edge.coeff + 1);

        let src = diagram.nodes.iter().find(|n| n.name == edge.from).unwrap();
        let tgt = diagram.nodes.iter().find(|n| n.name == edge.to).unwrap();
        assert_eq!(tgt.adams_filtration, src.adams_filtration - edge.page);
        assert_eq!(tgt.x, src.x + 1);
    }
}

#[test]
fn chart_follows_the_pages() {
    let data = chart();
    let first = ehp_view(&data, &ViewParameters::new(Category::Synthetic, 1));
    assert_eq!(first.dots.len(), data.len());
    assert_eq!(first.differentials.len(), 3);
    assert_eq!(first.multiplications.len(), 1);

    let second = ehp_view(&data, &ViewParameters::new(Category::Synthetic, 2));
    assert!(second.dot("[2]").is_none());
    assert!(second.dot("3[3]").is_some());
    assert_eq!(second.differentials.len(), 1);
    assert_eq!(second.differentials[0].coeff, 2);
}

#[test]
fn inspect_walks_the_name_hierarchy() {
    let data = chart();
    let info = inspect_generator(&data, "[1]").unwrap();
    assert_eq!(info.generating_name, "1");
    let info = inspect_generator(&data, "2[1]").unwrap();
    assert_eq!(info.generated_by, "[2]");
    assert!(inspect_generator(&data, "1[2]").unwrap().generates.is_empty());
}

#[test]
fn export_preserves_replay() {
    let data = chart();
    let again = import_json(&export_json(&data).unwrap()).unwrap();
    for category in Category::ALL {
        let view = ViewParameters::limit(category);
        assert_eq!(project(&data, &view), project(&again, &view));
    }
}

#[test]
fn added_differential_keeps_replay_order() {
    let data = chart().with_differential(Differential::new("1[3]", "4[1]", 0, 1));
    let pages: Vec<_> = data
        .differentials()
        .iter()
        .map(|d| (d.page, d.coeff))
        .collect();
    assert_eq!(pages, vec![(1, 0), (1, 0), (1, 0), (2, 2)]);

    // Layering into τ²-torsion with coefficient 1: the target dies, the free
    // source drops two filtrations and stays.
    let synthetic = project(&data, &ViewParameters::limit(Category::Synthetic));
    assert!(!synthetic.is_alive("4[1]"));
    let source = synthetic.get("1[3]").unwrap();
    assert_eq!((source.module, source.filtration), (ModuleState::Free, 0));
}
