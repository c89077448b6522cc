use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use hadamard::{ExtractError, HadamardMatrix};

fn extract_err(e: ExtractError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyclass(name = "HadamardMatrix", frozen)]
#[derive(Clone)]
pub struct PyHadamardMatrix {
    pub(crate) inner: HadamardMatrix,
}

#[pymethods]
impl PyHadamardMatrix {
    /// Builds the Hadamard matrix of dimension 2^order
    #[new]
    pub fn new(order: usize) -> PyResult<Self> {
        HadamardMatrix::try_new(order)
            .map(PyHadamardMatrix::from)
            .ok_or_else(|| {
                PyValueError::new_err(format!("Hadamard order {} is too large", order))
            })
    }

    /// The exponent n such that the matrix is 2^n x 2^n
    #[getter]
    pub fn order(&self) -> usize {
        self.inner.order()
    }

    /// The number of rows and columns
    #[getter]
    pub fn dim(&self) -> usize {
        self.inner.dim()
    }

    /// Gets the entry at row i and column j, either 1 or -1
    pub fn entry(&self, i: usize, j: usize) -> PyResult<i8> {
        if i >= self.inner.dim() || j >= self.inner.dim() {
            return Err(PyValueError::new_err("Index out of bounds"));
        }
        Ok(self.inner.entry(i, j))
    }

    /// Returns row i as a list of 1s and -1s
    pub fn row(&self, i: usize) -> PyResult<Vec<i8>> {
        if i >= self.inner.dim() {
            return Err(PyValueError::new_err("Index out of bounds"));
        }
        Ok(self.inner.signed_row(i))
    }

    /// Returns all rows as lists of 1s and -1s
    pub fn to_list(&self) -> Vec<Vec<i8>> {
        self.inner.to_signed_rows()
    }

    /// The dot product of rows i and j
    pub fn dot(&self, i: usize, j: usize) -> PyResult<i64> {
        if i >= self.inner.dim() || j >= self.inner.dim() {
            return Err(PyValueError::new_err("Index out of bounds"));
        }
        Ok(self.inner.dot(i, j))
    }

    /// Checks that all pairs of distinct rows are orthogonal
    pub fn is_orthogonal(&self) -> bool {
        self.inner.is_orthogonal()
    }

    /// Returns the top-left block of the given order as a new matrix
    pub fn leading_block(&self, order: usize) -> PyResult<Self> {
        self.inner
            .leading_block(order)
            .map(PyHadamardMatrix::from)
            .ok_or_else(|| {
                PyValueError::new_err(format!(
                    "order {} exceeds the matrix order {}",
                    order,
                    self.inner.order()
                ))
            })
    }

    /// Returns the 16-bit words of the code at `index`, truncated to 2^order entries
    pub fn code_words(&self, order: usize, index: usize) -> PyResult<Vec<u16>> {
        self.inner
            .code_words(order, index)
            .map(|words| words.collect())
            .map_err(extract_err)
    }

    /// Returns the code at `index` as a hex string, four digits per word
    pub fn code_hex(&self, order: usize, index: usize) -> PyResult<String> {
        self.inner
            .code_word(order, index)
            .map(|code| code.to_string())
            .map_err(extract_err)
    }

    /// Support for indexing with [i, j]
    pub fn __getitem__(&self, key: (usize, usize)) -> PyResult<i8> {
        self.entry(key.0, key.1)
    }

    /// String representation of the matrix
    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }

    /// Python representation of the matrix
    pub fn __repr__(&self) -> String {
        format!(
            "HadamardMatrix(order={}, dim={})",
            self.inner.order(),
            self.inner.dim()
        )
    }

    /// Matrix equality comparison
    pub fn __eq__(&self, other: &PyHadamardMatrix) -> bool {
        self.inner == other.inner
    }

    /// Returns the number of rows (for len() function)
    pub fn __len__(&self) -> usize {
        self.inner.dim()
    }
}

impl From<HadamardMatrix> for PyHadamardMatrix {
    fn from(inner: HadamardMatrix) -> Self {
        PyHadamardMatrix { inner }
    }
}

impl From<PyHadamardMatrix> for HadamardMatrix {
    fn from(py_matrix: PyHadamardMatrix) -> Self {
        py_matrix.inner
    }
}
