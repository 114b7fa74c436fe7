use std::collections::HashMap;

/// Spatial hash grid over point features.
/// Stores only indices into a caller-owned collection, so the grid can be
/// rebuilt alongside the data without cloning it.
pub struct SpatialIndex {
    /// Grid cells indexed by (cell_x, cell_y)
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Cell size in degrees
    cell_size: f64,
    len: usize,
}

impl SpatialIndex {
    /// Create an empty index with given cell size in degrees
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
            len: 0,
        }
    }

    /// Build an index where entry `i` of `points` is stored under index `i`
    pub fn build(points: impl Iterator<Item = (f64, f64)>, cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for (idx, (lon, lat)) in points.enumerate() {
            index.insert(lon, lat, idx);
        }
        index
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn insert(&mut self, lon: f64, lat: f64, idx: usize) {
        let cell = self.to_cell(lon, lat);
        self.cells.entry(cell).or_default().push(idx);
        self.len += 1;
    }

    /// Indices of points in cells overlapping a radius around (lon, lat).
    /// Candidates only; callers do the exact distance check.
    pub fn query_radius(&self, lon: f64, lat: f64, radius_degrees: f64) -> Vec<usize> {
        let center_cell = self.to_cell(lon, lat);
        let cell_radius = (radius_degrees / self.cell_size).ceil().max(0.0);

        // Window larger than the populated grid: walk the stored cells instead
        let window = (2.0 * cell_radius + 1.0).powi(2);
        if window > self.cells.len() as f64 {
            return self
                .cells
                .iter()
                .filter(|((x, y), _)| {
                    ((x - center_cell.0) as f64).abs() <= cell_radius
                        && ((y - center_cell.1) as f64).abs() <= cell_radius
                })
                .flat_map(|(_, indices)| indices.iter().copied())
                .collect();
        }

        let cell_radius = cell_radius as i32;
        let mut results = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(indices) = self.cells.get(&cell) {
                    results.extend_from_slice(indices);
                }
            }
        }

        results
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_nearby() {
        let points = [(-120.5, 35.2), (-120.6, 35.3), (140.0, -20.0)];
        let index = SpatialIndex::build(points.iter().copied(), 1.0);
        assert_eq!(index.len(), 3);

        let mut hits = index.query_radius(-120.55, 35.25, 0.5);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn test_query_empty() {
        let index = SpatialIndex::default();
        assert!(index.is_empty());
        assert!(index.query_radius(0.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_query_wider_than_world() {
        let points = [(-179.5, -89.5), (0.0, 0.0), (179.5, 89.5)];
        let index = SpatialIndex::build(points.iter().copied(), 1.0);

        let mut hits = index.query_radius(0.0, 0.0, 8640.0);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 2]);

        let mut hits = index.query_radius(0.0, 0.0, f64::INFINITY);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 2]);

        assert_eq!(index.query_radius(0.0, 0.0, f64::NAN), vec![1]);
    }
}
