//! Mass lists with optional species annotations.
//!
//! Annotation tables are semicolon-separated. The first column holds an m/z
//! and the remaining columns hold species names written `Mol_Adduct_Modif`.
//! A first row whose leading cell is empty is a header naming the columns.

use super::MsiCube;
use crate::spectra::MzTolerance;
use serde::Serialize;
use std::io::Read;

/// One annotated mass: the m/z and one (possibly empty) name per column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotatedMass {
    pub mz: f64,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnnotationTable {
    /// Readable column titles, one per annotation column.
    pub columns: Vec<String>,
    pub masses: Vec<AnnotatedMass>,
}

impl AnnotationTable {
    /// Annotation row closest to `mz` within `tolerance`.
    pub fn lookup(&self, mz: f64, tolerance: MzTolerance) -> Option<&AnnotatedMass> {
        self.masses
            .iter()
            .filter(|m| tolerance.contains(mz, m.mz))
            .min_by(|a, b| (a.mz - mz).abs().total_cmp(&(b.mz - mz).abs()))
    }
}

/// Parse a semicolon-separated annotation table.
pub fn parse_annotations<R: Read>(reader: R) -> Result<AnnotationTable, String> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut masses = Vec::new();
    for (line, record) in csv.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let first = record.get(0).unwrap_or("").trim();
        if line == 0 && first.is_empty() {
            header = Some(record.iter().skip(1).map(readable_species).collect());
            continue;
        }
        if first.is_empty() && record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mz = first
            .parse::<f64>()
            .map_err(|_| format!("line {}: invalid m/z {first:?}", line + 1))?;
        let names = record.iter().skip(1).map(|c| c.trim().to_string()).collect();
        masses.push(AnnotatedMass { mz, names });
    }

    let width = masses.iter().map(|m| m.names.len()).max().unwrap_or(0);
    let columns = header.unwrap_or_else(|| (1..=width).map(|i| format!("Ion (#{i})")).collect());
    Ok(AnnotationTable { columns, masses })
}

/// `Mol_Adduct_Modif1_Modif2` becomes `Mol.Modif1.Modif2 (Adduct)`. Names
/// without an adduct part are returned unchanged.
pub fn readable_species(name: &str) -> String {
    let name = name.trim();
    let parts: Vec<&str> = name.split('_').collect();
    match parts.as_slice() {
        [molecule, adduct, modifications @ ..] => {
            let mut out = (*molecule).to_string();
            if !modifications.is_empty() {
                out.push('.');
                out.push_str(&modifications.join("."));
            }
            format!("{out} ({adduct})")
        }
        _ => name.to_string(),
    }
}

/// Row of the mass list: an m/z of the cube, its mean intensity and the
/// readable annotations merged from the table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MassListRow {
    pub mz: f64,
    pub mean_intensity: f64,
    pub annotations: Vec<Option<String>>,
}

impl MassListRow {
    pub fn is_annotated(&self) -> bool {
        self.annotations.iter().any(Option::is_some)
    }
}

/// Mass list of every cube m/z. Without a table the annotation columns are
/// empty; with one, each m/z takes the closest table row within `tolerance`.
pub fn mass_list(
    cube: &MsiCube,
    annotations: Option<&AnnotationTable>,
    tolerance: MzTolerance,
) -> Vec<MassListRow> {
    let width = annotations.map_or(0, |t| t.columns.len());
    cube.mzs()
        .iter()
        .zip(cube.mean_spectrum())
        .map(|(&mz, mean_intensity)| {
            let mut row = vec![None; width];
            if let Some(hit) = annotations.and_then(|t| t.lookup(mz, tolerance)) {
                for (slot, name) in row.iter_mut().zip(&hit.names) {
                    if !name.is_empty() {
                        *slot = Some(readable_species(name));
                    }
                }
            }
            MassListRow {
                mz,
                mean_intensity,
                annotations: row,
            }
        })
        .collect()
}

/// Rows carrying at least one annotation.
pub fn curated(rows: &[MassListRow]) -> Vec<MassListRow> {
    rows.iter().filter(|r| r.is_annotated()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
;Chol_H;Chol_Na_H2O
369.35;Chol_H;
391.28;;Chol_Na_H2O
500.00;;
";

    #[test]
    fn header_row_names_the_columns() {
        let table = parse_annotations(TABLE.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Chol (H)", "Chol.H2O (Na)"]);
        assert_eq!(table.masses.len(), 3);
        assert_eq!(table.masses[1].names, vec!["", "Chol_Na_H2O"]);
    }

    #[test]
    fn headerless_table_gets_numbered_columns() {
        let table = parse_annotations("100.5;A_H\n200.5;B_K;C_Na\n".as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Ion (#1)", "Ion (#2)"]);
        assert_eq!(table.masses[0].mz, 100.5);
    }

    #[test]
    fn invalid_mz_is_reported_with_its_line() {
        let err = parse_annotations("100.5;A_H\nabc;B_K\n".as_bytes()).unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn species_names_are_rewritten() {
        assert_eq!(readable_species("PC_Na"), "PC (Na)");
        assert_eq!(readable_species("PC_H_H2O_CO2"), "PC.H2O.CO2 (H)");
        assert_eq!(readable_species("Unknown"), "Unknown");
    }

    #[test]
    fn mass_list_merges_annotations_by_mz() {
        // pixel spectra [1, 3, 0] and [3, 5, 2]
        let mzs = vec![369.36, 391.28, 450.0];
        let cube = MsiCube::new(2, 1, mzs, vec![1.0, 3.0, 0.0, 3.0, 5.0, 2.0]).unwrap();
        let table = parse_annotations(TABLE.as_bytes()).unwrap();
        let rows = mass_list(&cube, Some(&table), MzTolerance::Da(0.05));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].mean_intensity, 2.0);
        assert_eq!(rows[0].annotations, vec![Some("Chol (H)".to_string()), None]);
        assert_eq!(rows[1].annotations, vec![None, Some("Chol.H2O (Na)".to_string())]);
        assert!(!rows[2].is_annotated());

        let kept: Vec<f64> = curated(&rows).iter().map(|r| r.mz).collect();
        assert_eq!(kept, vec![369.36, 391.28]);
    }

    #[test]
    fn mass_list_without_table_has_no_columns() {
        let cube = MsiCube::new(1, 1, vec![100.0, 200.0], vec![4.0, 6.0]).unwrap();
        let rows = mass_list(&cube, None, MzTolerance::default());
        assert_eq!(rows[1].mean_intensity, 6.0);
        assert!(rows.iter().all(|r| r.annotations.is_empty()));
        assert!(curated(&rows).is_empty());
    }
}
