use std::collections::HashMap;

use crate::differential::{Differential, Multiplication, TauMultiplication};
use crate::generator::Generator;

/// Immutable registry of generators and the edges between them.
///
/// Differentials are sorted into replay order once, here. Every projection
/// relies on that order and never re-sorts; holding a `Dataset` is proof the
/// invariant holds. Duplicate generator names are kept as given (the first
/// occurrence wins lookups) so the verifier can report them.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    generators: Vec<Generator>,
    differentials: Vec<Differential>,
    multiplications: Vec<Multiplication>,
    tau_mults: Vec<TauMultiplication>,
    find_map: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(
        generators: Vec<Generator>,
        mut differentials: Vec<Differential>,
        multiplications: Vec<Multiplication>,
        tau_mults: Vec<TauMultiplication>,
    ) -> Self {
        differentials.sort_by(Differential::replay_order);

        let mut find_map = HashMap::with_capacity(generators.len());
        for (i, g) in generators.iter().enumerate() {
            find_map.entry(g.name.clone()).or_insert(i);
        }

        Self {
            generators,
            differentials,
            multiplications,
            tau_mults,
            find_map,
        }
    }

    /// Dataset with generators and differentials only.
    pub fn from_parts(generators: Vec<Generator>, differentials: Vec<Differential>) -> Self {
        Self::new(generators, differentials, Vec::new(), Vec::new())
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// Differentials in replay order.
    pub fn differentials(&self) -> &[Differential] {
        &self.differentials
    }

    pub fn multiplications(&self) -> &[Multiplication] {
        &self.multiplications
    }

    pub fn tau_mults(&self) -> &[TauMultiplication] {
        &self.tau_mults
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Generator> {
        self.find_map.get(name).map(|&i| &self.generators[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_map.contains_key(name)
    }

    /// First differential with the given endpoints, in replay order.
    pub fn find_differential(&self, from: &str, to: &str) -> Option<&Differential> {
        self.differentials
            .iter()
            .find(|d| d.from == from && d.to == to)
    }

    /// Copy of this dataset with one more differential, keeping replay order.
    pub fn with_differential(&self, diff: Differential) -> Self {
        let mut differentials = self.differentials.clone();
        let pos = differentials
            .binary_search_by(|d| Differential::replay_order(d, &diff))
            .unwrap_or_else(|e| e);
        differentials.insert(pos, diff);
        Self {
            differentials,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Generator::new("a[1]", 1, 1, 0),
                Generator::new("b[1]", 0, 1, 2),
                Generator::new("a[1]", 7, 7, 7),
            ],
            vec![
                Differential::new("a[1]", "b[1]", 1, 4),
                Differential::new("b[1]", "a[1]", 0, 2),
            ],
            vec![Multiplication::new("a[1]", "b[1]")],
            vec![TauMultiplication::new("b[1]", "a[1]")],
        )
    }

    #[test]
    fn test_differentials_sorted_on_construction() {
        let data = sample();
        let pages: Vec<i32> = data.differentials().iter().map(|d| d.page).collect();
        assert_eq!(pages, vec![2, 4]);
    }

    #[test]
    fn test_find_first_occurrence_wins() {
        let data = sample();
        assert_eq!(data.find("a[1]").map(|g| g.x), Some(1));
        assert!(data.find("missing").is_none());
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_find_differential() {
        let data = sample();
        assert_eq!(data.find_differential("a[1]", "b[1]").map(|d| d.page), Some(4));
        assert!(data.find_differential("b[1]", "b[1]").is_none());
    }

    #[test]
    fn test_with_differential_keeps_order() {
        let data = sample().with_differential(Differential::new("b[1]", "a[1]", 3, 3));
        let pages: Vec<i32> = data.differentials().iter().map(|d| d.page).collect();
        assert_eq!(pages, vec![2, 3, 4]);
        assert_eq!(sample().differentials().len(), 2);
    }
}
