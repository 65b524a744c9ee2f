use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_sparse::CooMatrix;

/// Adds the local residual of a cell or facet into the global residual
///
/// Rows of prescribed equations are skipped; their entries are set later as `w - w̄`.
///
/// # Panics
///
/// Panics if an equation number is out of range.
#[inline]
pub fn assemble_vector(rr_global: &mut Vector, r_local: &Vector, local_to_global: &[usize], prescribed: &[bool]) {
    for (l, g) in local_to_global.iter().enumerate().take(r_local.dim()) {
        if !prescribed[*g] {
            rr_global[*g] += r_local[l];
        }
    }
}

/// Adds the local Jacobian of a cell or facet into the global COO matrix
///
/// Rows and columns of prescribed equations are skipped; the unit diagonal of those rows is
/// put by the Newton solver. Repeated (i, j) entries are summed when the matrix is factorized.
///
/// # Panics
///
/// Panics if an equation number is out of range.
#[inline]
pub fn assemble_matrix(
    kk_global: &mut CooMatrix,
    kk_local: &Matrix,
    local_to_global: &[usize],
    prescribed: &[bool],
) -> Result<(), StrError> {
    let n = kk_local.dims().0;
    for l in 0..n {
        let row = local_to_global[l];
        if prescribed[row] {
            continue;
        }
        for m in 0..n {
            let col = local_to_global[m];
            if !prescribed[col] {
                kk_global.put(row, col, kk_local.get(l, m))?;
            }
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
