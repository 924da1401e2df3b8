use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use ehp_core::{
    Dataset, Differential, DifferentialKind, Generator, Multiplication, TauMultiplication,
};

use crate::error::{Result, StoreError};
use crate::schema;

/// One row of `ehp list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub source: String,
    pub imported_at: String,
    pub generators: usize,
    pub differentials: usize,
    pub multiplications: usize,
    pub tau_mults: usize,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Save ---

    /// Store `dataset` under `name`, replacing any dataset of that name.
    pub fn save_dataset(&self, name: &str, dataset: &Dataset, source: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM datasets WHERE name = ?1", [name])?;
        tx.execute(
            "INSERT INTO datasets (name, source) VALUES (?1, ?2)",
            params![name, source],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO generators (dataset, position, name, x, y, adams_filtration, torsion,
                                         alg_name, hom_name, induced_name, born, dies)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for (i, g) in dataset.generators().iter().enumerate() {
                let induced = serde_json::to_string(&g.induced_name)
                    .map_err(|e| StoreError::InvalidData(format!("induced_name: {e}")))?;
                stmt.execute(params![
                    name,
                    i as i64,
                    g.name,
                    g.x,
                    g.y,
                    g.adams_filtration,
                    g.torsion,
                    g.alg_name,
                    g.hom_name,
                    induced,
                    g.born,
                    g.dies,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO differentials (dataset, position, from_gen, to_gen, coeff, page, kind,
                                            synthetic_only, proof)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (i, d) in dataset.differentials().iter().enumerate() {
                stmt.execute(params![
                    name,
                    i as i64,
                    d.from,
                    d.to,
                    d.coeff,
                    d.page,
                    kind_to_str(d.kind),
                    d.synthetic_only as i32,
                    d.proof,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO multiplications (dataset, position, from_gen, to_gen, internal)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (i, m) in dataset.multiplications().iter().enumerate() {
                stmt.execute(params![name, i as i64, m.from, m.to, m.internal as i32])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tau_mults (dataset, position, from_gen, to_gen)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (i, t) in dataset.tau_mults().iter().enumerate() {
                stmt.execute(params![name, i as i64, t.from, t.to])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            "saved dataset '{name}' ({} generators, {} differentials)",
            dataset.len(),
            dataset.differentials().len()
        );
        Ok(())
    }

    // --- Load ---

    pub fn contains_dataset(&self, name: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM datasets WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub fn load_dataset(&self, name: &str) -> Result<Dataset> {
        if !self.contains_dataset(name)? {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let generators = self.load_generators(name)?;
        let differentials = self.load_differentials(name)?;

        let mut stmt = self.conn.prepare(
            "SELECT from_gen, to_gen, internal FROM multiplications
             WHERE dataset = ?1 ORDER BY position",
        )?;
        let multiplications: Vec<Multiplication> = stmt
            .query_map([name], |row| {
                Ok(Multiplication {
                    from: row.get(0)?,
                    to: row.get(1)?,
                    internal: row.get::<_, i32>(2)? != 0,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT from_gen, to_gen FROM tau_mults WHERE dataset = ?1 ORDER BY position",
        )?;
        let tau_mults: Vec<TauMultiplication> = stmt
            .query_map([name], |row| {
                Ok(TauMultiplication::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        Ok(Dataset::new(
            generators,
            differentials,
            multiplications,
            tau_mults,
        ))
    }

    fn load_generators(&self, dataset: &str) -> Result<Vec<Generator>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, x, y, adams_filtration, torsion, alg_name, hom_name, induced_name, born, dies
             FROM generators WHERE dataset = ?1 ORDER BY position",
        )?;

        type Row = (
            String,
            i32,
            i32,
            i32,
            Option<u32>,
            Option<String>,
            Option<String>,
            String,
            Option<i32>,
            Option<i32>,
        );
        let rows: Vec<Row> = stmt
            .query_map([dataset], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(
                |(name, x, y, adams_filtration, torsion, alg_name, hom_name, induced, born, dies)|
                 -> Result<Generator> {
                    let induced_name = serde_json::from_str(&induced).map_err(|e| {
                        StoreError::InvalidData(format!("induced_name of {name}: {e}"))
                    })?;
                    Ok(Generator {
                        name,
                        x,
                        y,
                        adams_filtration,
                        torsion,
                        alg_name,
                        hom_name,
                        induced_name,
                        born,
                        dies,
                    })
                },
            )
            .collect()
    }

    fn load_differentials(&self, dataset: &str) -> Result<Vec<Differential>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_gen, to_gen, coeff, page, kind, synthetic_only, proof
             FROM differentials WHERE dataset = ?1 ORDER BY position",
        )?;

        let rows: Vec<(String, String, i32, i32, String, bool, Option<String>)> = stmt
            .query_map([dataset], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get::<_, i32>(5)? != 0,
                    row.get(6)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(from, to, coeff, page, kind, synthetic_only, proof)| -> Result<Differential> {
                Ok(Differential {
                    kind: parse_kind(&kind)?,
                    synthetic_only,
                    proof,
                    ..Differential::new(from, to, coeff, page)
                })
            })
            .collect()
    }

    // --- Catalog queries ---

    pub fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.name, d.source, d.imported_at,
                    (SELECT COUNT(*) FROM generators g WHERE g.dataset = d.name),
                    (SELECT COUNT(*) FROM differentials f WHERE f.dataset = d.name),
                    (SELECT COUNT(*) FROM multiplications m WHERE m.dataset = d.name),
                    (SELECT COUNT(*) FROM tau_mults t WHERE t.dataset = d.name)
             FROM datasets d ORDER BY d.name",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(DatasetSummary {
                    name: row.get(0)?,
                    source: row.get(1)?,
                    imported_at: row.get(2)?,
                    generators: row.get::<_, i64>(3)? as usize,
                    differentials: row.get::<_, i64>(4)? as usize,
                    multiplications: row.get::<_, i64>(5)? as usize,
                    tau_mults: row.get::<_, i64>(6)? as usize,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(summaries)
    }

    /// Returns whether a dataset was removed.
    pub fn delete_dataset(&self, name: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM datasets WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }
}

fn kind_to_str(kind: DifferentialKind) -> &'static str {
    match kind {
        DifferentialKind::Real => "Real",
        DifferentialKind::Fake => "Fake",
    }
}

fn parse_kind(s: &str) -> Result<DifferentialKind> {
    match s {
        "Real" => Ok(DifferentialKind::Real),
        "Fake" => Ok(DifferentialKind::Fake),
        other => Err(StoreError::InvalidData(format!(
            "unknown differential kind: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dataset() -> Dataset {
        let mut top = Generator::new("1[2]", 1, 2, 1);
        top.alg_name = Some("h1".to_string());
        top.induced_name = vec![(3, "h1".to_string()), (5, "η".to_string())];
        top.born = Some(2);

        Dataset::new(
            vec![
                top,
                Generator::new("[1]", 0, 1, 3).with_torsion(2),
                Generator::new("[2]", 1, 2, 0),
            ],
            vec![
                Differential::new("1[2]", "[1]", 1, 1).with_proof("Toda 1962"),
                Differential::new("[2]", "[1]", 0, 1).synthetic(),
                Differential::fake("1[2]_src", "1[2]_tgt", 1, 2, "inferred"),
            ],
            vec![Multiplication {
                internal: true,
                ..Multiplication::new("[2]", "1[2]")
            }],
            vec![TauMultiplication::new("[1]", "[2]")],
        )
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let original = make_dataset();
        store.save_dataset("main", &original, "test").unwrap();

        let loaded = store.load_dataset("main").unwrap();
        assert_eq!(loaded.generators(), original.generators());
        assert_eq!(loaded.differentials(), original.differentials());
        assert_eq!(loaded.multiplications(), original.multiplications());
        assert_eq!(loaded.tau_mults(), original.tau_mults());
    }

    #[test]
    fn test_load_missing_dataset() {
        let store = Store::open_in_memory().unwrap();
        let err = store.load_dataset("nope").err().unwrap();
        assert!(matches!(err, StoreError::NotFound(ref n) if n == "nope"));
    }

    #[test]
    fn test_save_overwrites_previous() {
        let store = Store::open_in_memory().unwrap();
        store.save_dataset("main", &make_dataset(), "first").unwrap();

        let smaller = Dataset::from_parts(vec![Generator::new("a[1]", 0, 1, 0)], Vec::new());
        store.save_dataset("main", &smaller, "second").unwrap();

        let loaded = store.load_dataset("main").unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.differentials().is_empty());
        assert!(loaded.tau_mults().is_empty());
    }

    #[test]
    fn test_datasets_are_independent() {
        let store = Store::open_in_memory().unwrap();
        store.save_dataset("main", &make_dataset(), "").unwrap();
        store
            .save_dataset(
                "stable",
                &Dataset::from_parts(vec![Generator::new("s[1]", 0, 1, 0)], Vec::new()),
                "",
            )
            .unwrap();

        assert_eq!(store.load_dataset("main").unwrap().len(), 3);
        assert_eq!(store.load_dataset("stable").unwrap().len(), 1);
    }

    #[test]
    fn test_list_datasets() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.list_datasets().unwrap().is_empty());

        store.save_dataset("main", &make_dataset(), "data.json").unwrap();
        let list = store.list_datasets().unwrap();
        assert_eq!(list.len(), 1);
        let summary = &list[0];
        assert_eq!(summary.name, "main");
        assert_eq!(summary.source, "data.json");
        assert_eq!(summary.generators, 3);
        assert_eq!(summary.differentials, 3);
        assert_eq!(summary.multiplications, 1);
        assert_eq!(summary.tau_mults, 1);
        assert!(!summary.imported_at.is_empty());
    }

    #[test]
    fn test_delete_dataset_cascades() {
        let store = Store::open_in_memory().unwrap();
        store.save_dataset("main", &make_dataset(), "").unwrap();

        assert!(store.delete_dataset("main").unwrap());
        assert!(!store.delete_dataset("main").unwrap());
        assert!(!store.contains_dataset("main").unwrap());

        let orphans: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM generators", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_metadata() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.get_metadata("missing").unwrap(), None);
        store.set_metadata("default", "main").unwrap();
        assert_eq!(
            store.get_metadata("default").unwrap(),
            Some("main".to_string())
        );
    }

    #[test]
    fn test_unknown_kind_is_invalid() {
        let store = Store::open_in_memory().unwrap();
        store.save_dataset("main", &make_dataset(), "").unwrap();
        store
            .conn()
            .execute("UPDATE differentials SET kind = 'Bogus'", [])
            .unwrap();
        assert!(matches!(
            store.load_dataset("main"),
            Err(StoreError::InvalidData(_))
        ));
    }
}
