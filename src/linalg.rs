//! Small fixed-size linear algebra used when fitting the face transforms.
//!
//! Everything works on plain row-major arrays so that the sizes are checked
//! at compile time and nothing allocates.  None of this is on the hot path:
//! `eigen` and `lstsq` only run when the tetrahedron model is built.

/// Number of power iterations spent on each eigenvector
const POWER_ITERATIONS: usize = 1000;

/// Eigenvalues are floored here so the pseudo-inverse never divides by zero
const MIN_EIGENVALUE: f64 = 0.001;

pub fn add_vv<const N: usize>(a: &[f64; N], b: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| a[i] + b[i])
}

pub fn sub_vv<const N: usize>(a: &[f64; N], b: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| a[i] - b[i])
}

pub fn mul_vf<const N: usize>(a: &[f64; N], b: f64) -> [f64; N] {
    std::array::from_fn(|i| a[i] * b)
}

pub fn div_vf<const N: usize>(a: &[f64; N], b: f64) -> [f64; N] {
    std::array::from_fn(|i| a[i] / b)
}

pub fn dot_vv<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn mag<const N: usize>(a: &[f64; N]) -> f64 {
    dot_vv(a, a).sqrt()
}

/// Scale `a` to unit length.  A zero vector produces NaNs, so callers must
/// only pass vectors they know are non-degenerate.
pub fn norm<const N: usize>(a: &[f64; N]) -> [f64; N] {
    div_vf(a, mag(a))
}

/// Multiply an `R`x`C` matrix by a `C` element column vector
pub fn dot_mv<const R: usize, const C: usize>(mat: &[[f64; C]; R], v: &[f64; C]) -> [f64; R] {
    std::array::from_fn(|i| dot_vv(&mat[i], v))
}

/// Multiply an `N`x`M` matrix by an `M`x`P` matrix
pub fn mul_mm<const N: usize, const M: usize, const P: usize>(
    a: &[[f64; M]; N],
    b: &[[f64; P]; M],
) -> [[f64; P]; N] {
    let mut result = [[0.0; P]; N];
    for i in 0..N {
        for j in 0..P {
            for k in 0..M {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

pub fn transpose<const R: usize, const C: usize>(a: &[[f64; C]; R]) -> [[f64; R]; C] {
    std::array::from_fn(|j| std::array::from_fn(|i| a[i][j]))
}

/// Approximate eigen-decomposition of a symmetric 4x4 matrix.
///
/// Each eigenvector is found by a fixed number of power iterations, then
/// deflated out of the matrix before looking for the next one, so the pairs
/// come out largest eigenvalue first.  Returns the eigenvalues and a matrix
/// whose *columns* are the matching eigenvectors.  There is no convergence
/// check: the iteration count is fixed so the cost and the result are the
/// same every time for the same input.
pub fn eigen(a: &[[f64; 4]; 4]) -> ([f64; 4], [[f64; 4]; 4]) {
    let mut aa = *a;
    let mut eigenvalues = [0.0; 4];
    let mut rows = [[0.0; 4]; 4];

    for k in 0..4 {
        let mut eigenvector: [f64; 4] = std::array::from_fn(|i| (i as f64 + 1.0) / 10.0);
        for _ in 0..POWER_ITERATIONS {
            let next = dot_mv(&aa, &eigenvector);
            let magnitude = mag(&next);
            // Fully deflated, nothing left to converge on
            if magnitude == 0.0 || !magnitude.is_finite() {
                break;
            }
            eigenvector = div_vf(&next, magnitude);
        }

        let eigenvalue = dot_vv(&eigenvector, &dot_mv(&aa, &eigenvector)).max(MIN_EIGENVALUE);
        eigenvalues[k] = eigenvalue;
        rows[k] = eigenvector;

        for i in 0..4 {
            for j in 0..4 {
                aa[i][j] -= eigenvector[i] * eigenvector[j] * eigenvalue;
            }
        }
    }

    (eigenvalues, transpose(&rows))
}

/// Least-squares solve of `a * x = b` for `x`, given three row
/// correspondences.
///
/// Builds the Moore-Penrose pseudo-inverse of `a` from the eigen-decomposition
/// of `aᵀa` (`a⁺ = V Σ⁻¹ Uᵀ` with `U = a V Σ⁻¹`), keeping only the three
/// largest singular values since `a` has at most rank 3.
pub fn lstsq(a: &[[f64; 4]; 3], b: &[[f64; 4]; 3]) -> [[f64; 4]; 4] {
    let ata = mul_mm(&transpose(a), a);
    let (eigenvalues, v) = eigen(&ata);
    let singular: [f64; 4] = std::array::from_fn(|i| eigenvalues[i].sqrt());

    let mut u = mul_mm(a, &v);
    for row in u.iter_mut() {
        for (j, el) in row.iter_mut().enumerate() {
            *el /= singular[j];
        }
    }
    // Only the first three columns of U carry information
    let ut: [[f64; 3]; 3] = std::array::from_fn(|i| std::array::from_fn(|j| u[j][i]));

    let v3: [[f64; 3]; 4] = std::array::from_fn(|i| std::array::from_fn(|j| v[i][j]));
    let mut sigma_inv = [[0.0; 3]; 3];
    for i in 0..3 {
        sigma_inv[i][i] = 1.0 / singular[i];
    }

    let pseudo_inverse = mul_mm(&mul_mm(&v3, &sigma_inv), &ut);
    mul_mm(&pseudo_inverse, b)
}
