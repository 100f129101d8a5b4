use std::time::Duration;

use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    assign_descriptors,
    descriptor::{DescriptorOptions, DEFAULT_DIAMETER},
    loader::parse_molfile_str,
    matching::{compare, MatchOptions},
};

impl From<crate::Error> for PyErr {
    fn from(err: crate::Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Diameter-restricted similarity of two molfile blocks.
///
/// Returns `(local_sim, edge_count, valid)`. `timeout` in seconds applies to
/// building each comparison array and to the comparison itself.
#[pyfunction]
#[pyo3(signature = (mol_block_a, mol_block_b, diameter=DEFAULT_DIAMETER, timeout=5.0, digits=3))]
fn local_sim(
    mol_block_a: &str,
    mol_block_b: &str,
    diameter: u32,
    timeout: f64,
    digits: u32,
) -> PyResult<(f64, usize, bool)> {
    let timeout = Duration::try_from_secs_f64(timeout)
        .map_err(|_| PyValueError::new_err("timeout must be a non-negative number of seconds"))?;

    let mut a = parse_molfile_str(mol_block_a)?;
    let mut b = parse_molfile_str(mol_block_b)?;
    assign_descriptors(&mut a)?;
    assign_descriptors(&mut b)?;

    let descriptor = DescriptorOptions::default()
        .diameter(diameter)
        .timeout(timeout);
    let options = MatchOptions::default().timeout(timeout);
    let result = compare(&a, &b, &descriptor, &options)?;

    Ok((result.local_sim(digits), result.edge_count(), result.is_valid()))
}

/// Importable as `mcsdr`, matching `lib.name` in Cargo.toml.
#[pymodule]
#[pyo3(name = "mcsdr")]
fn _mcsdr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(local_sim, m)?)?;

    Ok(())
}
