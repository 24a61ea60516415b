use ahash::AHashMap;
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::Error;
use crate::grid::{Cell, CellId};

/// Per-cell attribute amounts stored as a dense (cells, attributes) matrix.
#[derive(Clone, Debug)]
pub struct AttributeMatrix {
    names: Vec<String>,
    series: AHashMap<String, usize>, // name -> column
    values: Array2<f64>, // (n, k)
}

impl AttributeMatrix {
    fn new(num_rows: usize, names: Vec<String>) -> Self {
        let series = names.iter().enumerate()
            .map(|(col, name)| (name.clone(), col))
            .collect();
        Self { values: Array2::<f64>::zeros((num_rows, names.len())), names, series }
    }

    #[inline] pub fn names(&self) -> &[String] { &self.names }

    #[inline] pub fn column(&self, name: &str) -> Option<usize> { self.series.get(name).copied() }

    #[inline] pub fn values(&self) -> &Array2<f64> { &self.values }

    #[inline] pub fn row(&self, row: usize) -> ArrayView1<'_, f64> { self.values.row(row) }
}

/// The tiling cells of one run, keyed by `CellId`, with their attribute accumulators.
///
/// Accumulators start at zero and only grow through `accumulate`; call `reset`
/// before distributing the same regions again.
#[derive(Clone, Debug)]
pub struct CellLayer {
    cells: Vec<Cell>,
    index: AHashMap<CellId, u32>, // Map between cell ids and contiguous indices.
    amounts: AttributeMatrix,
}

impl CellLayer {
    /// Construct a layer from cells and the attribute names to accumulate.
    /// Duplicate attribute names are collapsed, keeping the first occurrence.
    pub fn new(cells: Vec<Cell>, attributes: &[String]) -> Result<Self, Error> {
        if attributes.is_empty() {
            return Err(Error::invalid("attribute set is empty"))
        }

        let mut names: Vec<String> = Vec::with_capacity(attributes.len());
        for name in attributes {
            if !names.contains(name) { names.push(name.clone()) }
        }

        let mut index = AHashMap::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            if index.insert(cell.id(), i as u32).is_some() {
                return Err(Error::invalid(format!("duplicate cell {}", cell.id())))
            }
        }

        Ok(Self { amounts: AttributeMatrix::new(cells.len(), names), cells, index })
    }

    /// Construct a layer with H3 footprints for the given ids.
    /// Cells are ordered by id so the layer is identical across runs.
    pub fn from_ids(ids: impl IntoIterator<Item = CellId>, attributes: &[String]) -> Result<Self, Error> {
        let mut ids: Vec<CellId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self::new(ids.into_iter().map(Cell::from_id).collect(), attributes)
    }

    #[inline] pub fn len(&self) -> usize { self.cells.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    #[inline] pub fn cells(&self) -> &[Cell] { &self.cells }

    #[inline] pub fn attributes(&self) -> &[String] { self.amounts.names() }

    #[inline] pub fn amounts(&self) -> &AttributeMatrix { &self.amounts }

    /// Contiguous index of a cell id.
    #[inline]
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.index.get(&id).map(|&i| i as usize)
    }

    #[inline]
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.position(id).map(|i| &self.cells[i])
    }

    /// Accumulated amount of `attribute` in cell `id`.
    pub fn amount(&self, id: CellId, attribute: &str) -> Option<f64> {
        let row = self.position(id)?;
        let col = self.amounts.column(attribute)?;
        Some(self.amounts.values[[row, col]])
    }

    /// Sum of all attributes for each cell, in layer order.
    pub fn totals(&self) -> Vec<f64> {
        self.amounts.values.sum_axis(Axis(1)).to_vec()
    }

    /// Sum of each attribute over all cells, in attribute order.
    pub fn attribute_totals(&self) -> Vec<f64> {
        self.amounts.values.sum_axis(Axis(0)).to_vec()
    }

    /// Zero every accumulator.
    pub fn reset(&mut self) {
        self.amounts.values.fill(0.0);
    }

    /// Add `weight * values` to the accumulators of the cell at `row`.
    #[inline]
    pub(crate) fn accumulate(&mut self, row: usize, weight: f64, values: &Array1<f64>) {
        self.amounts.values.row_mut(row).scaled_add(weight, values);
    }
}
