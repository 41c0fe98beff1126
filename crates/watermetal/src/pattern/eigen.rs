//! Symmetric eigendecomposition by cyclic Jacobi rotations.
//!
//! The matrices decomposed here are metal × metal correlation matrices, so
//! dimensions stay small and the O(n³) sweeps are irrelevant next to
//! reproducibility: the rotation sequence depends only on the input.

/// Eigenvalues and eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub(crate) struct Eigen {
    /// Eigenvalues in diagonal order (unsorted).
    pub values: Vec<f64>,
    /// Row-major n×n matrix; column `j` is the eigenvector of `values[j]`.
    pub vectors: Vec<f64>,
    pub n: usize,
}

impl Eigen {
    /// Component `row` of eigenvector `col`.
    pub fn vector_component(&self, row: usize, col: usize) -> f64 {
        self.vectors[row * self.n + col]
    }
}

/// Off-diagonal sum of squares below which the matrix counts as diagonal.
const CONVERGENCE: f64 = 1e-24;

/// Rotations are skipped for elements smaller than this.
const NEGLIGIBLE: f64 = 1e-15;

/// Decompose a symmetric row-major `n × n` matrix.
#[allow(clippy::many_single_char_names)] // a = matrix, v = eigenvectors, t/c/s = rotation
pub(crate) fn jacobi_eigen(matrix: &[f64], n: usize) -> Eigen {
    debug_assert_eq!(matrix.len(), n * n);

    let mut a = matrix.to_vec();
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    let max_sweeps = 100 * n.max(1);
    for _ in 0..max_sweeps {
        let off_diag: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i * n + j] * a[i * n + j])
            .sum();
        if off_diag < CONVERGENCE {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() < NEGLIGIBLE {
                    continue;
                }

                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let tau = (aqq - app) / (2.0 * apq);
                let t = if tau.abs() > 1e15 {
                    1.0 / (2.0 * tau)
                } else {
                    let sign = if tau >= 0.0 { 1.0 } else { -1.0 };
                    sign / (tau.abs() + (1.0 + tau * tau).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                a[p * n + p] = app - t * apq;
                a[q * n + q] = aqq + t * apq;
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;

                for r in 0..n {
                    if r != p && r != q {
                        let arp = a[r * n + p];
                        let arq = a[r * n + q];
                        a[r * n + p] = c * arp - s * arq;
                        a[p * n + r] = a[r * n + p];
                        a[r * n + q] = s * arp + c * arq;
                        a[q * n + r] = a[r * n + q];
                    }
                }

                for r in 0..n {
                    let vrp = v[r * n + p];
                    let vrq = v[r * n + q];
                    v[r * n + p] = c * vrp - s * vrq;
                    v[r * n + q] = s * vrp + c * vrq;
                }
            }
        }
    }

    Eigen {
        values: (0..n).map(|i| a[i * n + i]).collect(),
        vectors: v,
        n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_matrix_is_its_own_decomposition() {
        let eigen = jacobi_eigen(&[3.0, 0.0, 0.0, 1.0], 2);
        assert_eq!(eigen.values, vec![3.0, 1.0]);
        assert_eq!(eigen.vector_component(0, 0), 1.0);
        assert_eq!(eigen.vector_component(1, 1), 1.0);
    }

    #[test]
    fn test_two_by_two_correlation() {
        // [[1, r], [r, 1]] has eigenvalues 1 ± r with vectors (1, ±1)/√2
        let r = 0.6;
        let eigen = jacobi_eigen(&[1.0, r, r, 1.0], 2);
        let mut values = eigen.values.clone();
        values.sort_by(|a, b| b.total_cmp(a));
        assert!((values[0] - 1.6).abs() < 1e-12);
        assert!((values[1] - 0.4).abs() < 1e-12);

        for col in 0..2 {
            let x = eigen.vector_component(0, col);
            let y = eigen.vector_component(1, col);
            assert!((x.abs() - y.abs()).abs() < 1e-12);
            assert!((x * x + y * y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reconstructs_matrix() {
        let m = [4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 2.0];
        let eigen = jacobi_eigen(&m, 3);

        for i in 0..3 {
            for j in 0..3 {
                let rebuilt: f64 = (0..3)
                    .map(|k| {
                        eigen.vector_component(i, k)
                            * eigen.values[k]
                            * eigen.vector_component(j, k)
                    })
                    .sum();
                assert!((rebuilt - m[i * 3 + j]).abs() < 1e-10);
            }
        }
    }
}
