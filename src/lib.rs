// Molecule definition, element table, JSON boundary
pub mod molecule;

// Error types
pub mod error;

// Data IO
pub mod loader;

// Pi electrons and implicit hydrogens
pub mod valence;

// Hydrogen, salt, water and metal removal
pub mod remover;

// Rings, scaffolds, isolated fragments and ring minification
pub mod topology;

// Cooperative time budgets
pub mod deadline;

// Maximum clique search
pub mod clique;

// Diameter-restricted comparison arrays
pub mod descriptor;

// The hard bit: modular product matching and similarity
pub mod matching;

// Utility functions
mod utils;

// Python library
#[cfg(feature = "python")]
pub mod python;

pub use descriptor::{DescriptorArray, DescriptorOptions};
pub use error::{Error, Result};
pub use matching::{compare, MatchOptions, MatchResult};
pub use molecule::Molecule;
pub use topology::Minification;

/// Run every pass the comparison pipeline expects on a freshly loaded
/// molecule: ring recognition, ring minification and valence assignment.
pub fn assign_descriptors(mol: &mut Molecule) -> Result<Minification> {
    topology::recognize(mol);
    let minification = topology::minify_rings(mol)?;
    valence::assign_valence(mol);
    Ok(minification)
}
