/// Page index standing in for E∞. Any page at or above it is the limit page.
pub const LIMIT_PAGE: i32 = 1000;

/// Largest stem checked against the stable reference tables.
pub const MAX_REFERENCE_STEM: usize = 34;

/// Number of free E∞ classes per stem in the classical stable stems, stems 0..=35.
pub const CLASSICAL_STABLE_STEMS: [u32; 36] = [
    1, 1, 1, 3, 0, 0, 1, 4, 2, 3, 1, 3, 0, 0, 2, 6, 2, 4, 4, 4, 3, 2, 2, 8, 2, 2, 2, 3, 1, 0, 1,
    8, 4, 5, 5, 5,
];

/// Algebraic stable stems: free classes once, torsion classes at their stem and the next.
pub const ALGEBRAIC_STABLE_STEMS: [u32; 36] = [
    1, 1, 1, 3, 0, 0, 1, 4, 2, 3, 1, 3, 0, 0, 5, 9, 3, 7, 6, 4, 3, 2, 4, 10, 3, 6, 5, 3, 3, 3,
    13, 22, 8, 10, 11, 7,
];

/// Provenance note attached when no raw differential explains an inferred one.
pub const ALREADY_TORSION_REASON: &str =
    "the target of this inferred differential was already torsion on the first page";
