//! 3D LUT storage and trilinear sampling.

use crate::error::GradeError;

/// Grid size per axis of the bundled filter LUTs.
pub const LUT_DIM: usize = 33;

/// An immutable 3D lookup table mapping input RGB to graded RGB.
///
/// Cells are addressed `[blue][green][red]`: red varies fastest in the flat
/// storage, then green, then blue. This is the same order `.cube` files
/// list their rows in, and the interpolation below depends on it.
///
/// Storage is private so the `size³` length invariant holds for the whole
/// lifetime of the table; every neighbour index computed while sampling is
/// clamped into the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    size: usize,
    data: Vec<[f32; 3]>,
    title: Option<String>,
}

impl Lut3D {
    /// Build a LUT from `size³` cells in `[blue][green][red]` order.
    pub fn new(size: usize, data: Vec<[f32; 3]>) -> Result<Self, GradeError> {
        if size < 2 {
            return Err(GradeError::InvalidLut(format!(
                "grid size must be at least 2, got {size}"
            )));
        }
        let expected = cell_count(size)?;
        if data.len() != expected {
            return Err(GradeError::InvalidLut(format!(
                "expected {expected} cells for a {size}³ grid, got {}",
                data.len()
            )));
        }
        if let Some(pos) = data.iter().position(|c| c.iter().any(|v| !v.is_finite())) {
            return Err(GradeError::InvalidLut(format!("cell {pos} is not finite")));
        }

        Ok(Self {
            size,
            data,
            title: None,
        })
    }

    /// Build a LUT by evaluating `f` at every grid point.
    ///
    /// `f` receives the normalized `[r, g, b]` coordinate of the cell.
    pub fn from_fn(size: usize, f: impl Fn([f32; 3]) -> [f32; 3]) -> Result<Self, GradeError> {
        if size < 2 {
            return Self::new(size, Vec::new());
        }
        let cells = cell_count(size)?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|_| GradeError::OutOfMemory {
                bytes: cells.saturating_mul(size_of::<[f32; 3]>()),
            })?;
        let denom = (size - 1) as f32;
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push(f([r as f32 / denom, g as f32 / denom, b as f32 / denom]));
                }
            }
        }
        Self::new(size, data)
    }

    /// A LUT that maps every grid point to itself.
    pub fn identity(size: usize) -> Result<Self, GradeError> {
        Self::from_fn(size, |rgb| rgb)
    }

    /// Attach a human-readable title (written to `.cube` files).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Grid size per axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw cells in `[blue][green][red]` order.
    pub fn cells(&self) -> &[[f32; 3]] {
        &self.data
    }

    /// Bounds-checked cell access, `None` when any index is outside the grid.
    pub fn get(&self, blue: usize, green: usize, red: usize) -> Option<[f32; 3]> {
        if blue >= self.size || green >= self.size || red >= self.size {
            return None;
        }
        Some(self.cell(blue, green, red))
    }

    #[inline]
    fn cell(&self, blue: usize, green: usize, red: usize) -> [f32; 3] {
        self.data[(blue * self.size + green) * self.size + red]
    }

    /// Sample the LUT at `rgb` using trilinear interpolation.
    ///
    /// Each input channel is scaled by `size − 1`; the integer part picks
    /// the lower grid index and the fraction is the interpolation weight.
    /// The upper neighbour is clamped to the last grid index. Interpolation
    /// runs along red first (four edges), then green (two), then blue, and
    /// the result is clamped to `[0, 1]`.
    ///
    /// At an exact grid point every weight is zero and the stored cell is
    /// returned unchanged.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let last = self.size - 1;
        let scale = last as f32;

        let rx = rgb[0].clamp(0.0, 1.0) * scale;
        let gy = rgb[1].clamp(0.0, 1.0) * scale;
        let bz = rgb[2].clamp(0.0, 1.0) * scale;

        let x = (rx as usize).min(last);
        let y = (gy as usize).min(last);
        let z = (bz as usize).min(last);

        let dx = rx - x as f32;
        let dy = gy - y as f32;
        let dz = bz - z as f32;

        let x1 = (x + 1).min(last);
        let y1 = (y + 1).min(last);
        let z1 = (z + 1).min(last);

        let c000 = self.cell(z, y, x);
        let c001 = self.cell(z, y, x1);
        let c010 = self.cell(z, y1, x);
        let c011 = self.cell(z, y1, x1);
        let c100 = self.cell(z1, y, x);
        let c101 = self.cell(z1, y, x1);
        let c110 = self.cell(z1, y1, x);
        let c111 = self.cell(z1, y1, x1);

        let mut out = [0.0_f32; 3];
        for c in 0..3 {
            // Red
            let c00 = lerp(c000[c], c001[c], dx);
            let c10 = lerp(c010[c], c011[c], dx);
            let c01 = lerp(c100[c], c101[c], dx);
            let c11 = lerp(c110[c], c111[c], dx);
            // Green
            let c0 = lerp(c00, c10, dy);
            let c1 = lerp(c01, c11, dy);
            // Blue
            out[c] = lerp(c0, c1, dz).clamp(0.0, 1.0);
        }
        out
    }
}

/// `size³`, or `InvalidLut` when it overflows.
fn cell_count(size: usize) -> Result<usize, GradeError> {
    size.checked_pow(3)
        .ok_or_else(|| GradeError::InvalidLut(format!("grid size {size} is too large")))
}

/// Sample an optional LUT; `None` is the identity grade.
#[inline]
pub fn sample(lut: Option<&Lut3D>, rgb: [f32; 3]) -> [f32; 3] {
    match lut {
        Some(lut) => lut.sample(rgb),
        None => rgb,
    }
}

/// `a·(1 − t) + b·t`. Kept in this form; `a + (b − a)·t` rounds differently.
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn warm_lut(size: usize) -> Lut3D {
        Lut3D::from_fn(size, |[r, g, b]| [(r * r + 0.1).min(1.0), g * 0.8, 1.0 - b]).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Lut3D::new(3, vec![[0.0; 3]; 26]).unwrap_err();
        assert!(matches!(err, GradeError::InvalidLut(_)));
    }

    #[test]
    fn test_new_rejects_degenerate_size() {
        assert!(Lut3D::new(1, vec![[0.0; 3]]).is_err());
        assert!(Lut3D::identity(0).is_err());
    }

    #[test]
    fn test_from_fn_rejects_overflowing_grid() {
        let err = Lut3D::from_fn(1 << 22, |rgb| rgb).unwrap_err();
        assert!(matches!(err, GradeError::InvalidLut(_)));
    }

    #[test]
    fn test_new_rejects_non_finite_cells() {
        let mut data = vec![[0.5; 3]; 8];
        data[5][1] = f32::NAN;
        assert!(Lut3D::new(2, data).is_err());
    }

    #[test]
    fn test_grid_points_return_stored_cell_exactly() {
        let lut = warm_lut(LUT_DIM);
        let denom = (LUT_DIM - 1) as f32;
        for b in (0..LUT_DIM).step_by(4) {
            for g in (0..LUT_DIM).step_by(3) {
                for r in 0..LUT_DIM {
                    let query = [r as f32 / denom, g as f32 / denom, b as f32 / denom];
                    let stored = lut.get(b, g, r).unwrap();
                    let sampled = lut.sample(query);
                    assert_eq!(sampled, stored.map(|v| v.clamp(0.0, 1.0)), "cell ({b},{g},{r})");
                }
            }
        }
    }

    #[test]
    fn test_axis_order_is_blue_green_red() {
        // Only the red axis changes the output: red must be the fastest axis.
        let lut = Lut3D::from_fn(2, |[r, _, _]| [r, 0.0, 0.0]).unwrap();
        assert_eq!(lut.cells()[1], [1.0, 0.0, 0.0]);
        assert_eq!(lut.cells()[2], [0.0, 0.0, 0.0]);
        assert_eq!(lut.sample([1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
        assert_eq!(lut.sample([0.0, 0.0, 1.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_identity_lut_is_near_identity() {
        let lut = Lut3D::identity(LUT_DIM).unwrap();
        for rgb in [[0.1, 0.5, 0.9], [0.33, 0.66, 0.01], [1.0, 0.0, 0.5]] {
            let out = lut.sample(rgb);
            for c in 0..3 {
                assert!((out[c] - rgb[c]).abs() < EPSILON, "{rgb:?} -> {out:?}");
            }
        }
    }

    #[test]
    fn test_linear_table_interpolates_exactly() {
        // Trilinear interpolation reproduces a function linear in each axis.
        let lut = Lut3D::from_fn(2, |[r, g, b]| [(r + 2.0 * g + 4.0 * b) / 8.0, 0.0, 0.0]).unwrap();
        let out = lut.sample([0.25, 0.5, 0.75]);
        assert!((out[0] - 4.25 / 8.0).abs() < EPSILON);
    }

    /// Straight-line trilinear lookup: reduce the eight corners along red,
    /// then green, then blue, each step as `a·(1 − t) + b·t`.
    fn reference_sample(lut: &Lut3D, rgb: [f32; 3]) -> [f32; 3] {
        let last = lut.size() - 1;
        let scale = last as f32;
        let pos = rgb.map(|v| v.clamp(0.0, 1.0) * scale);
        let lo = pos.map(|p| (p as usize).min(last));
        let t = [0, 1, 2].map(|i| pos[i] - lo[i] as f32);
        let hi = lo.map(|i| (i + 1).min(last));
        let mix = |a: f32, b: f32, t: f32| a * (1.0 - t) + b * t;

        let corner = |b: usize, g: usize, r: usize| lut.get(b, g, r).unwrap();
        let mut out = [0.0_f32; 3];
        for (c, slot) in out.iter_mut().enumerate() {
            let mut green_edges = [0.0_f32; 4];
            for (k, (b, g)) in [(lo[2], lo[1]), (lo[2], hi[1]), (hi[2], lo[1]), (hi[2], hi[1])]
                .into_iter()
                .enumerate()
            {
                green_edges[k] = mix(corner(b, g, lo[0])[c], corner(b, g, hi[0])[c], t[0]);
            }
            let near = mix(green_edges[0], green_edges[1], t[1]);
            let far = mix(green_edges[2], green_edges[3], t[1]);
            *slot = mix(near, far, t[2]).clamp(0.0, 1.0);
        }
        out
    }

    #[test]
    fn test_interpolation_order_is_red_green_blue() {
        // Non-linear in every axis with cross terms, so a different axis
        // order or lerp form changes low bits of the result.
        let lut = Lut3D::from_fn(LUT_DIM, |[r, g, b]| {
            [
                (r * r * 0.7 + g * b * 0.3).min(1.0),
                (g.sqrt() * 0.6 + r * b * 0.4).min(1.0),
                (b * b * b + r * g * 0.25).min(1.0),
            ]
        })
        .unwrap();

        let mut checked = 0;
        for i in 0..23 {
            for j in 0..19 {
                for k in 0..17 {
                    let rgb = [
                        (i as f32 * 0.0437 + 0.0011) % 1.0,
                        (j as f32 * 0.0529 + 0.0173) % 1.0,
                        (k as f32 * 0.0611 + 0.0097) % 1.0,
                    ];
                    assert_eq!(lut.sample(rgb), reference_sample(&lut, rgb), "at {rgb:?}");
                    checked += 1;
                }
            }
        }
        assert_eq!(checked, 23 * 19 * 17);
    }

    #[test]
    fn test_upper_boundary_clamps_neighbour() {
        let lut = warm_lut(5);
        assert_eq!(lut.sample([1.0, 1.0, 1.0]), lut.get(4, 4, 4).unwrap());
    }

    #[test]
    fn test_out_of_range_queries_are_clamped() {
        let lut = warm_lut(5);
        assert_eq!(lut.sample([-3.0, 0.0, 0.0]), lut.sample([0.0, 0.0, 0.0]));
        assert_eq!(lut.sample([0.0, 7.0, 0.0]), lut.sample([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_output_is_clamped_to_unit_range() {
        let lut = Lut3D::from_fn(3, |_| [2.0, -1.0, 0.5]).unwrap();
        assert_eq!(lut.sample([0.3, 0.3, 0.3]), [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_sample_none_is_identity() {
        let rgb = [0.123, 0.456, 0.789];
        assert_eq!(sample(None, rgb), rgb);
    }
}
