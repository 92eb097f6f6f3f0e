//! Python FFI bindings via PyO3.
//!
//! Exposes the analysis pipeline to Python. Transitions are passed as a list
//! of `(previous, next)` integer pairs; normalizations by name.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import phi_core
//!
//! transitions = [(0, 1), (0, 1), (1, 0), (1, 0)]
//! print(phi_core.bell(5))                          # 52
//! h = phi_core.entropies(2, transitions)            # list indexed by mask
//! print(phi_core.mips(2, transitions, "koch"))      # [[1, 2]]
//! report = phi_core.analyze(2, transitions, "tononi-balduzzi")
//! print(report.phi, report.complex, report.mip)
//! print(str(report))                                # tab-separated line
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::entropy::entropies as compute_entropies;
use crate::enumerator::bell as bell_number;
use crate::error::PhiError;
use crate::mip::{mips as find_mips, SearchConfig};
use crate::normalization::{NodeDegree, NormalizationMethod};
use crate::report::{analyze as run_analysis, PhiReport};
use crate::state::State;
use crate::transition::TransitionTable;

fn to_py_err(e: PhiError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn table(node_count: usize, transitions: Vec<(State, State)>) -> PyResult<TransitionTable> {
    TransitionTable::from_pairs(node_count, transitions).map_err(to_py_err)
}

fn config(normalization: &str, avg_node_degree: Option<f64>) -> PyResult<SearchConfig> {
    let method: NormalizationMethod = normalization.parse().map_err(to_py_err)?;
    let mut config = SearchConfig::new(method);
    config.avg_node_degree = avg_node_degree;
    Ok(config)
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Number of set-partitions of `n` elements.
#[pyfunction]
pub fn bell(n: usize) -> PyResult<u64> {
    bell_number(n).map_err(to_py_err)
}

/// Entropy of every node mask; index 0 holds the node count.
#[pyfunction]
pub fn entropies(node_count: usize, transitions: Vec<(State, State)>) -> PyResult<Vec<f64>> {
    let t = table(node_count, transitions)?;
    Ok(compute_entropies(&t).map_err(to_py_err)?.values().to_vec())
}

/// Average node degree of a square connectivity matrix.
#[pyfunction]
pub fn avg_node_degree(matrix: Vec<Vec<f64>>) -> PyResult<f64> {
    Ok(NodeDegree::from_connectivity(&matrix)
        .map_err(to_py_err)?
        .average())
}

/// All minimum information partitions, each a list of part masks.
#[pyfunction]
#[pyo3(signature = (node_count, transitions, normalization="none", avg_node_degree=None))]
pub fn mips(
    node_count: usize,
    transitions: Vec<(State, State)>,
    normalization: &str,
    avg_node_degree: Option<f64>,
) -> PyResult<Vec<Vec<State>>> {
    let t = table(node_count, transitions)?;
    let h = compute_entropies(&t).map_err(to_py_err)?;
    let found = find_mips(&h, &config(normalization, avg_node_degree)?).map_err(to_py_err)?;
    Ok(found.iter().map(|p| p.parts().to_vec()).collect())
}

/// Full pipeline: main complex, its MIP and Phi.
#[pyfunction]
#[pyo3(signature = (node_count, transitions, normalization="none", avg_node_degree=None))]
pub fn analyze(
    node_count: usize,
    transitions: Vec<(State, State)>,
    normalization: &str,
    avg_node_degree: Option<f64>,
) -> PyResult<PyPhiReport> {
    let t = table(node_count, transitions)?;
    let inner = run_analysis(&t, &config(normalization, avg_node_degree)?).map_err(to_py_err)?;
    Ok(PyPhiReport { inner })
}

// ── PhiReport ─────────────────────────────────────────────────────────────────

/// Result of `analyze`.
#[pyclass(name = "PhiReport")]
#[derive(Clone)]
pub struct PyPhiReport {
    inner: PhiReport,
}

#[pymethods]
impl PyPhiReport {
    /// Raw effective information of the main complex across its MIP.
    #[getter]
    pub fn phi(&self) -> f64 {
        self.inner.phi
    }

    /// Nodes of the chosen main complex.
    #[getter]
    pub fn complex(&self) -> Vec<usize> {
        self.inner.complex.clone()
    }

    /// MIP parts as global node masks.
    #[getter]
    pub fn mip(&self) -> Vec<State> {
        self.inner.mip.clone()
    }

    /// Every tied main complex.
    #[getter]
    pub fn main_complexes(&self) -> Vec<Vec<usize>> {
        self.inner.main_complexes.clone()
    }

    /// Normalization name used by the search.
    #[getter]
    pub fn normalization(&self) -> &'static str {
        self.inner.normalization.name()
    }

    /// Tab-separated report line.
    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "PhiReport(phi={}, complex={:?}, mip={:?}, normalization='{}')",
            self.inner.phi,
            self.inner.complex,
            self.inner.mip,
            self.inner.normalization,
        )
    }
}

// ── Module ────────────────────────────────────────────────────────────────────

/// Register the `phi_core` Python module.
#[pymodule]
pub fn phi_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(bell, m)?)?;
    m.add_function(wrap_pyfunction!(entropies, m)?)?;
    m.add_function(wrap_pyfunction!(avg_node_degree, m)?)?;
    m.add_function(wrap_pyfunction!(mips, m)?)?;
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_class::<PyPhiReport>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("MAX_NODES", crate::state::MAX_NODES)?;
    Ok(())
}
