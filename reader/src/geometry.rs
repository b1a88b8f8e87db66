//! The patient matrix: the transform from voxel coordinates
//! (indices times spacing) to patient coordinates.
//!
//! The in-plane axes come from the image orientation.
//! The through-plane axis is fitted to the positions of all slices,
//! so that gantry tilt and other non-orthogonal stacks are reproduced.

use dcmstack_dictionary_std::tags;
use dcmstack_object::MetaData;
use tracing::debug;

type Vec3 = [f64; 3];

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Normalize in place, returning the norm before normalization.
fn normalize(a: &mut Vec3) -> f64 {
    let n = norm(*a);
    if n > 0.0 {
        *a = scale(*a, 1.0 / n);
    }
    n
}

/// A 4×4 homogeneous transform from voxel space to patient space.
///
/// The columns are the row direction, the column direction,
/// the slice axis and the position of the first voxel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PatientMatrix(pub [[f64; 4]; 4]);

impl Default for PatientMatrix {
    fn default() -> Self {
        PatientMatrix::IDENTITY
    }
}

impl PatientMatrix {
    pub const IDENTITY: PatientMatrix = PatientMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Build a matrix from its first three columns and the origin.
    pub fn from_columns(row: Vec3, column: Vec3, axis: Vec3, origin: Vec3) -> Self {
        let mut m = PatientMatrix::IDENTITY;
        for i in 0..3 {
            m.0[i][0] = row[i];
            m.0[i][1] = column[i];
            m.0[i][2] = axis[i];
            m.0[i][3] = origin[i];
        }
        m
    }

    /// The element at row `i` and column `j`.
    pub fn element(&self, i: usize, j: usize) -> f64 {
        self.0[i][j]
    }

    /// The spatial part of column `j`.
    pub fn column(&self, j: usize) -> Vec3 {
        [self.0[0][j], self.0[1][j], self.0[2][j]]
    }

    /// The patient position of the first voxel.
    pub fn origin(&self) -> Vec3 {
        self.column(3)
    }

    /// Map a point in voxel coordinates to patient coordinates.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        let mut out = self.origin();
        for (j, p) in point.iter().enumerate() {
            out = add(out, scale(self.column(j), *p));
        }
        out
    }

    /// The direction cosines of rows and columns,
    /// as in _Image Orientation (Patient)_.
    pub fn direction_cosines(&self) -> [f64; 6] {
        let (r, c) = (self.column(0), self.column(1));
        [r[0], r[1], r[2], c[0], c[1], c[2]]
    }

    /// Whether all elements are within `tolerance` of another matrix.
    pub fn approx_eq(&self, other: &PatientMatrix, tolerance: f64) -> bool {
        self.0
            .iter()
            .flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Eigen-decomposition of a symmetric 3×3 matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues in decreasing order
/// and the eigenvectors as the columns of the second value.
pub fn jacobi(mut a: [[f64; 3]; 3]) -> ([f64; 3], [[f64; 3]; 3]) {
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    for _sweep in 0..50 {
        let off = a[0][1].powi(2) + a[0][2].powi(2) + a[1][2].powi(2);
        if off < 1e-30 {
            break;
        }
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a[p][q].abs() < 1e-300 {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let t = if theta == 0.0 { 1.0 } else { t };
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;
            // a <- Jᵀ a J
            for k in 0..3 {
                let (akp, akq) = (a[k][p], a[k][q]);
                a[k][p] = c * akp - s * akq;
                a[k][q] = s * akp + c * akq;
            }
            for k in 0..3 {
                let (apk, aqk) = (a[p][k], a[q][k]);
                a[p][k] = c * apk - s * aqk;
                a[q][k] = s * apk + c * aqk;
            }
            for row in v.iter_mut() {
                let (vp, vq) = (row[p], row[q]);
                row[p] = c * vp - s * vq;
                row[q] = s * vp + c * vq;
            }
        }
    }

    let mut order = [0, 1, 2];
    order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]));
    let values = [a[order[0]][order[0]], a[order[1]][order[1]], a[order[2]][order[2]]];
    let mut vectors = [[0.0; 3]; 3];
    for (col, &src) in order.iter().enumerate() {
        for row in 0..3 {
            vectors[row][col] = v[row][src];
        }
    }
    (values, vectors)
}

/// Compute the patient matrix of a volume.
///
/// The orientation is taken from the first slice,
/// positions from the first component of every slice.
/// `row_spacing` is the distance between rows,
/// used to move the origin to the last row when rows are stored bottom-up.
pub fn compute_patient_matrix(
    meta: &MetaData,
    rows: usize,
    row_spacing: f64,
    bottom_up: bool,
) -> PatientMatrix {
    let orientation = meta
        .attribute_at(0, 0, tags::IMAGE_ORIENTATION_PATIENT)
        .map(|v| v.to_multi_f64())
        .filter(|v| v.len() == 6);
    let Some(orientation) = orientation else {
        debug!("No image orientation, using the identity matrix");
        return PatientMatrix::IDENTITY;
    };

    let mut row = [orientation[0], orientation[1], orientation[2]];
    let mut column = [orientation[3], orientation[4], orientation[5]];
    let mut normal = cross(row, column);
    if normalize(&mut normal) < 1e-10 {
        debug!("Degenerate image orientation, using the identity orientation");
        row = [1.0, 0.0, 0.0];
        column = [0.0, 1.0, 0.0];
        normal = [0.0, 0.0, 1.0];
    }
    // re-orthogonalize the row vector
    row = cross(column, normal);
    normalize(&mut row);
    normalize(&mut column);

    let row_offset = scale(column, row_spacing * rows.saturating_sub(1) as f64);
    if bottom_up {
        column = scale(column, -1.0);
    }

    let points: Vec<Vec3> = (0..meta.number_of_slices())
        .filter_map(|slice| {
            let p = meta
                .attribute_at(slice, 0, tags::IMAGE_POSITION_PATIENT)?
                .to_multi_f64();
            let p: Vec3 = p.get(0..3)?.try_into().ok()?;
            Some(if bottom_up { add(p, row_offset) } else { p })
        })
        .collect();

    let Some(&first) = points.first() else {
        debug!("No image positions, using the identity matrix");
        return PatientMatrix::IDENTITY;
    };

    let n = points.len() as f64;
    let centroid = points
        .iter()
        .fold([0.0; 3], |acc, p| add(acc, *p))
        .map(|c| c / n);
    let mut scatter = [[0.0; 3]; 3];
    for p in &points {
        let d = [p[0] - centroid[0], p[1] - centroid[1], p[2] - centroid[2]];
        for i in 0..3 {
            for j in 0..3 {
                scatter[i][j] += d[i] * d[j];
            }
        }
    }

    let (values, vectors) = jacobi(scatter);
    let mut axis = normal;
    // accept the line of best fit only if the points lie on it
    if values[1].powi(2) + values[2].powi(2) < 1e-6 * values[0].powi(2) {
        let e = [vectors[0][0], vectors[1][0], vectors[2][0]];
        let vdn = dot(e, normal);
        if vdn.abs() > 1e-10 {
            let v = scale(e, 1.0 / vdn);
            if norm(cross(v, normal)) >= 1e-4 {
                axis = v;
            }
        }
    }

    // point the axis towards increasing slice index
    if let Some(&last) = points.last() {
        let travel = [last[0] - first[0], last[1] - first[1], last[2] - first[2]];
        if dot(travel, axis) < 0.0 {
            axis = scale(axis, -1.0);
        }
    }

    PatientMatrix::from_columns(row, column, axis, first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmstack_object::{IndexArray, Item};

    fn meta_with_positions(orientation: &[f64], positions: &[[f64; 3]]) -> MetaData {
        let items = positions
            .iter()
            .map(|p| {
                let mut item = Item::new();
                item.put_path_f64(&tags::IMAGE_POSITION_PATIENT.into(), p)
                    .unwrap();
                item.put_path_f64(&tags::IMAGE_ORIENTATION_PATIENT.into(), orientation)
                    .unwrap();
                item
            })
            .collect();
        let mut meta = MetaData::new(items);
        let n = positions.len();
        meta.set_index_arrays(
            IndexArray::from_values((0..n).collect(), 1),
            IndexArray::from_values(vec![0; n], 1),
        );
        meta
    }

    fn assert_close(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn jacobi_diagonalizes() {
        let a = [[4.0, 1.0, 0.0], [1.0, 3.0, 0.0], [0.0, 0.0, 1.0]];
        let (values, vectors) = jacobi(a);
        assert!(values[0] >= values[1] && values[1] >= values[2]);
        for k in 0..3 {
            let v = [vectors[0][k], vectors[1][k], vectors[2][k]];
            let av = [dot(a[0], v), dot(a[1], v), dot(a[2], v)];
            assert_close(av, scale(v, values[k]));
        }
        assert!((values[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn axial_stack() {
        let meta = meta_with_positions(
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[[-10.0, -10.0, 0.0], [-10.0, -10.0, 5.0], [-10.0, -10.0, 10.0]],
        );
        let m = compute_patient_matrix(&meta, 4, 0.5, false);
        assert_close(m.column(0), [1.0, 0.0, 0.0]);
        assert_close(m.column(1), [0.0, 1.0, 0.0]);
        assert_close(m.column(2), [0.0, 0.0, 1.0]);
        assert_close(m.origin(), [-10.0, -10.0, 0.0]);
        assert_close(m.apply([0.0, 0.0, 10.0]), [-10.0, -10.0, 10.0]);
    }

    #[test]
    fn tilted_stack_follows_positions() {
        // positions shift along y as z increases
        let meta = meta_with_positions(
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[[0.0, 0.0, 0.0], [0.0, 1.0, 2.0], [0.0, 2.0, 4.0]],
        );
        let m = compute_patient_matrix(&meta, 4, 1.0, false);
        assert_close(m.column(2), [0.0, 0.5, 1.0]);
    }

    #[test]
    fn bottom_up_moves_origin_to_last_row() {
        let meta = meta_with_positions(
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[[0.0, 0.0, 10.0], [0.0, 0.0, 5.0], [0.0, 0.0, 0.0]],
        );
        let m = compute_patient_matrix(&meta, 4, 0.5, true);
        assert_close(m.column(1), [0.0, -1.0, 0.0]);
        assert_close(m.origin(), [0.0, 1.5, 10.0]);
        // slices were given in decreasing z
        assert_close(m.column(2), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn missing_orientation_gives_identity() {
        let meta = MetaData::new(vec![Item::new()]);
        assert_eq!(
            compute_patient_matrix(&meta, 4, 1.0, false),
            PatientMatrix::IDENTITY
        );
    }
}
