//! Read V2000 molfiles and SD files.
//!
//! Only the connection table is read: element symbols, formal charges and
//! bonds. Coordinates, stereo flags and data items are ignored. Atom keys are
//! the 1-based atom numbers of the file.

use std::{fs, ops::Range, path::Path};

use crate::{
    error::{Error, Result},
    molecule::{Atom, AtomKey, Bond, Element, Molecule},
};

/// Parse the first record of the molfile or SD file at `p`.
pub fn parse(p: &Path) -> Result<Molecule> {
    let contents = fs::read_to_string(p)?;
    parse_molfile_str(&contents)
}

/// Parse the first record of molfile text.
pub fn parse_molfile_str(text: &str) -> Result<Molecule> {
    let lines: Vec<&str> = text
        .lines()
        .take_while(|l| !l.starts_with("$$$$"))
        .collect();
    if lines.len() < 4 {
        return Err(parse_error(lines.len(), "missing counts line"));
    }

    let (num_atoms, num_bonds) = parse_counts_line(lines[3], 4)?;
    let atom_start = 4;
    let bond_start = atom_start + num_atoms;
    let props_start = bond_start + num_bonds;
    if lines.len() < props_start {
        return Err(parse_error(lines.len(), "connection table is truncated"));
    }

    let mut mol = Molecule::new();
    for (i, line) in lines[atom_start..bond_start].iter().enumerate() {
        let atom = parse_atom_line(line, atom_start + i + 1)?;
        mol.add_atom(i as AtomKey + 1, atom);
    }

    for (i, line) in lines[bond_start..props_start].iter().enumerate() {
        let line_no = bond_start + i + 1;
        let (u, v, bond) = parse_bond_line(line, line_no)?;
        mol.add_bond(u, v, bond)
            .map_err(|e| parse_error(line_no, &e.to_string()))?;
    }

    let mut charges = Vec::new();
    for (i, line) in lines[props_start..].iter().enumerate() {
        if line.starts_with("M  END") {
            break;
        }
        if line.starts_with("M  CHG") {
            charges.extend(parse_charge_line(line, props_start + i + 1)?);
        }
    }
    // Property charges supersede the atom block.
    if !charges.is_empty() {
        let keys: Vec<AtomKey> = mol.atoms().map(|(k, _)| k).collect();
        for k in keys {
            if let Some(atom) = mol.atom_mut(k) {
                atom.set_charge(0);
            }
        }
        for (k, charge) in charges {
            if let Some(atom) = mol.atom_mut(k) {
                atom.set_charge(charge);
            }
        }
    }

    Ok(mol)
}

fn parse_error(line: usize, reason: &str) -> Error {
    Error::Parse {
        line,
        reason: reason.to_string(),
    }
}

/// Trimmed integer field at `range`. Fields cut off by a short line are
/// missing; blank fields read as zero.
fn field<T>(line: &str, range: Range<usize>, line_no: usize) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let raw = line
        .get(range.clone())
        .or_else(|| line.get(range.start..))
        .ok_or_else(|| parse_error(line_no, &format!("missing field at columns {range:?}")))?
        .trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| parse_error(line_no, &format!("bad number {raw:?}")))
}

fn parse_counts_line(line: &str, line_no: usize) -> Result<(usize, usize)> {
    Ok((field(line, 0..3, line_no)?, field(line, 3..6, line_no)?))
}

fn parse_atom_line(line: &str, line_no: usize) -> Result<Atom> {
    let symbol = line
        .get(31..34)
        .or_else(|| line.get(31..))
        .map(str::trim)
        .unwrap_or_default();
    let element: Element = symbol
        .parse()
        .map_err(|_| parse_error(line_no, &format!("unknown element {symbol:?}")))?;
    let charge = match line.get(36..) {
        Some(_) => legacy_charge(field(line, 36..39, line_no)?),
        None => 0,
    };
    Ok(Atom::new(element).with_charge(charge))
}

/// Atom block charge code to formal charge. Code 4 is a doublet radical.
fn legacy_charge(code: u8) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

fn parse_bond_line(line: &str, line_no: usize) -> Result<(AtomKey, AtomKey, Bond)> {
    let u = field(line, 0..3, line_no)?;
    let v = field(line, 3..6, line_no)?;
    let order: usize = field(line, 6..9, line_no)?;
    let bond = Bond::try_from(order)
        .map_err(|_| parse_error(line_no, &format!("unsupported bond order {order}")))?;
    Ok((u, v, bond))
}

fn parse_charge_line(line: &str, line_no: usize) -> Result<Vec<(AtomKey, i8)>> {
    let count: usize = field(line, 6..9, line_no)?;
    (0..count)
        .map(|j| {
            let key = field(line, 10 + j * 8..13 + j * 8, line_no)?;
            let charge = field(line, 14 + j * 8..17 + j * 8, line_no)?;
            Ok((key, charge))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACETATE: &str = "\
acetate
  test

  4  3  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.2990    0.7500    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.5981    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    1.2990    2.2500    0.0000 O   0  5  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  2  0
  2  4  1  0
M  END
$$$$
";

    #[test]
    fn reads_atoms_bonds_and_legacy_charges() {
        let mol = parse_molfile_str(ACETATE).unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.atom(1).unwrap().element(), Element::Carbon);
        assert_eq!(mol.atom(3).unwrap().element(), Element::Oxygen);
        assert_eq!(mol.bond(2, 3), Some(&Bond::Double));
        assert_eq!(mol.atom(4).unwrap().charge(), -1);
        assert_eq!(mol.atom(3).unwrap().charge(), 0);
    }

    #[test]
    fn charge_property_supersedes_atom_block() {
        let text = ACETATE.replace("M  END", "M  CHG  2   1   1   3  -1\nM  END");
        let mol = parse_molfile_str(&text).unwrap();
        assert_eq!(mol.atom(1).unwrap().charge(), 1);
        assert_eq!(mol.atom(3).unwrap().charge(), -1);
        assert_eq!(mol.atom(4).unwrap().charge(), 0);
    }

    #[test]
    fn first_record_only() {
        let text = format!("{ACETATE}{}", ACETATE.replace("acetate", "second"));
        assert_eq!(parse_molfile_str(&text).unwrap().atom_count(), 4);
    }

    #[test]
    fn unknown_symbol_is_a_parse_error() {
        let text = ACETATE.replacen(" C   0", " Xx  0", 1);
        assert!(matches!(
            parse_molfile_str(&text),
            Err(Error::Parse { line: 5, .. })
        ));
    }

    #[test]
    fn truncated_table_is_a_parse_error() {
        let text: String = ACETATE.lines().take(6).collect::<Vec<_>>().join("\n");
        assert!(matches!(parse_molfile_str(&text), Err(Error::Parse { .. })));
        assert!(matches!(parse_molfile_str(""), Err(Error::Parse { .. })));
    }

    #[test]
    fn bond_to_missing_atom_is_a_parse_error() {
        let text = ACETATE.replace("  2  4  1  0", "  2  9  1  0");
        assert!(matches!(
            parse_molfile_str(&text),
            Err(Error::Parse { line: 11, .. })
        ));
    }
}
