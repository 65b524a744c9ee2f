use super::{integ_points, ElementTrait, FemState, FunctionSpace, LOCAL_L0, LOCAL_P0, N_LOCAL_EQ};
use crate::base::{Config, Field};
use crate::material::ModelTwoFluid;
use crate::StrError;
use gemlab::mesh::CellId;
use russell_lab::{Matrix, Vector};

/// Holds the basis functions evaluated at an integration point
struct IntegData {
    /// Quadratic basis N (6)
    nn: [f64; 6],

    /// Physical gradients of the quadratic basis B = ∇N (6 × 2)
    bb: [[f64; 2]; 6],

    /// Linear basis M (3)
    mm: [f64; 3],

    /// Integration weight times the Jacobian determinant
    weight: f64,
}

/// Holds the interpolated fields at an integration point
struct LocalFields {
    /// Velocity v
    v: [f64; 2],

    /// Velocity gradient G_ij = ∂v_i/∂x_j
    gg: [[f64; 2]; 2],

    /// Divergence of v
    div: f64,

    /// Pressure p
    p: f64,

    /// Level set l
    l: f64,

    /// Gradient of the level set
    gl: [f64; 2],

    /// Acceleration minus gravity A = (v - v₀)/Δt + G·v - g
    aa: [f64; 2],

    /// Rate of the level set (l - l₀)/Δt
    dl_dt: f64,
}

/// Implements the Taylor-Hood element (P2 velocity, P1 pressure) with a P1 level set
///
/// The local residual reads (for each integration point with weight w):
///
/// ```text
/// rᵃᵢ  = w [ρ Aᵢ Nᵃ + μ (Gᵢⱼ + Gⱼᵢ) Bᵃⱼ - p Bᵃᵢ]
/// rᵖ_b = w div(v) Mᵇ
/// rˡ_c = w [(l - l₀)/Δt + ∇l·v + l div(v)] Mᶜ
/// ```
///
/// with `A = (v - v₀)/Δt + G·v - g`, `N` the quadratic basis, `B = ∇N`, `M` the linear basis.
pub struct ElementTwoPhase {
    /// Density/viscosity model
    model: ModelTwoFluid,

    /// Gravity acceleration vector
    gravity: [f64; 2],

    /// Local-to-global mapping (18)
    local_to_global: Vec<usize>,

    /// Physical gradients of the linear basis D = ∇M (constant)
    dd: [[f64; 2]; 3],

    /// Basis data at all integration points
    ips: Vec<IntegData>,
}

impl ElementTwoPhase {
    /// Allocates a new instance
    pub fn new(space: &FunctionSpace, config: &Config, cell_id: CellId) -> Result<Self, StrError> {
        let mut pad_v = space.scratchpad(cell_id, Field::Velocity)?;
        let mut pad_l = space.scratchpad(cell_id, Field::LevelSet)?;

        // linear basis gradients
        pad_l.calc_gradient(&[1.0 / 3.0, 1.0 / 3.0])?;
        let mut dd = [[0.0; 2]; 3];
        for c in 0..3 {
            dd[c] = [pad_l.gradient.get(c, 0), pad_l.gradient.get(c, 1)];
        }

        // basis at integration points
        let mut ips = Vec::new();
        for ip in integ_points(config.integ_degree)? {
            let ksi = &ip[0..2];
            let det_jac = pad_v.calc_gradient(ksi)?;
            (pad_v.fn_interp)(&mut pad_v.interp, ksi);
            (pad_l.fn_interp)(&mut pad_l.interp, ksi);
            let mut data = IntegData {
                nn: [0.0; 6],
                bb: [[0.0; 2]; 6],
                mm: [0.0; 3],
                weight: ip[3] * det_jac,
            };
            for m in 0..6 {
                data.nn[m] = pad_v.interp[m];
                data.bb[m] = [pad_v.gradient.get(m, 0), pad_v.gradient.get(m, 1)];
            }
            for c in 0..3 {
                data.mm[c] = pad_l.interp[c];
            }
            ips.push(data);
        }

        Ok(ElementTwoPhase {
            model: ModelTwoFluid::new(&config.fluids, config.eps, config.sign_model),
            gravity: config.gravity,
            local_to_global: space.dofs_for_element(cell_id).to_vec(),
            dd,
            ips,
        })
    }

    /// Interpolates the fields at an integration point
    fn interpolate(&self, ip: &IntegData, state: &FemState) -> LocalFields {
        let l2g = &self.local_to_global;
        let (w, w0) = (&state.w, &state.w0);
        let mut f = LocalFields {
            v: [0.0; 2],
            gg: [[0.0; 2]; 2],
            div: 0.0,
            p: 0.0,
            l: 0.0,
            gl: [0.0; 2],
            aa: [0.0; 2],
            dl_dt: 0.0,
        };
        let mut v0 = [0.0; 2];
        for m in 0..6 {
            for i in 0..2 {
                let vmi = w[l2g[2 * m + i]];
                f.v[i] += ip.nn[m] * vmi;
                v0[i] += ip.nn[m] * w0[l2g[2 * m + i]];
                for j in 0..2 {
                    f.gg[i][j] += vmi * ip.bb[m][j];
                }
            }
        }
        f.div = f.gg[0][0] + f.gg[1][1];
        let mut l0 = 0.0;
        for c in 0..3 {
            let lc = w[l2g[LOCAL_L0 + c]];
            f.p += ip.mm[c] * w[l2g[LOCAL_P0 + c]];
            f.l += ip.mm[c] * lc;
            l0 += ip.mm[c] * w0[l2g[LOCAL_L0 + c]];
            f.gl[0] += lc * self.dd[c][0];
            f.gl[1] += lc * self.dd[c][1];
        }
        for i in 0..2 {
            f.aa[i] = (f.v[i] - v0[i]) / state.dt + f.gg[i][0] * f.v[0] + f.gg[i][1] * f.v[1] - self.gravity[i];
        }
        f.dl_dt = (f.l - l0) / state.dt;
        f
    }
}

impl ElementTrait for ElementTwoPhase {
    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.local_to_global
    }

    /// Calculates the residual vector
    fn calc_residual(&mut self, residual: &mut Vector, state: &FemState) -> Result<(), StrError> {
        residual.fill(0.0);
        for ip in &self.ips {
            let f = self.interpolate(ip, state);
            let mat = self.model.calc(f.l, &f.gl);
            let w = ip.weight;

            // momentum
            for a in 0..6 {
                for i in 0..2 {
                    let mut visc = 0.0;
                    for j in 0..2 {
                        visc += (f.gg[i][j] + f.gg[j][i]) * ip.bb[a][j];
                    }
                    residual[2 * a + i] += w * (mat.rho * f.aa[i] * ip.nn[a] + mat.mu * visc - f.p * ip.bb[a][i]);
                }
            }

            // incompressibility and level-set transport
            let transport = f.dl_dt + f.gl[0] * f.v[0] + f.gl[1] * f.v[1] + f.l * f.div;
            for c in 0..3 {
                residual[LOCAL_P0 + c] += w * f.div * ip.mm[c];
                residual[LOCAL_L0 + c] += w * transport * ip.mm[c];
            }
        }
        for i in 0..N_LOCAL_EQ {
            if !residual[i].is_finite() {
                return Err("found NaN or Inf in the local residual vector");
            }
        }
        Ok(())
    }

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&mut self, jacobian: &mut Matrix, state: &FemState) -> Result<(), StrError> {
        jacobian.fill(0.0);
        let dt = state.dt;
        for ip in &self.ips {
            let f = self.interpolate(ip, state);
            let mat = self.model.calc(f.l, &f.gl);
            let w = ip.weight;

            // ∂s/∂Lᶜ = ∂s/∂l Mᶜ + ∂s/∂(∇l)·Dᶜ
            let mut ds_dll = [0.0; 3];
            for c in 0..3 {
                ds_dll[c] = mat.ds_dl * ip.mm[c] + mat.ds_dg[0] * self.dd[c][0] + mat.ds_dg[1] * self.dd[c][1];
            }

            for a in 0..6 {
                for i in 0..2 {
                    let row = 2 * a + i;

                    // momentum-velocity
                    for b in 0..6 {
                        let bv = ip.bb[b][0] * f.v[0] + ip.bb[b][1] * f.v[1];
                        let ba = ip.bb[b][0] * ip.bb[a][0] + ip.bb[b][1] * ip.bb[a][1];
                        for k in 0..2 {
                            let mut kk = mat.rho * f.gg[i][k] * ip.nn[b] * ip.nn[a] + mat.mu * ip.bb[b][i] * ip.bb[a][k];
                            if i == k {
                                kk += mat.rho * (ip.nn[b] / dt + bv) * ip.nn[a] + mat.mu * ba;
                            }
                            jacobian.add(row, 2 * b + k, w * kk);
                        }
                    }

                    // momentum-pressure and momentum-level-set
                    let mut visc = 0.0;
                    for j in 0..2 {
                        visc += (f.gg[i][j] + f.gg[j][i]) * ip.bb[a][j];
                    }
                    let dr_ds = mat.drho_ds * f.aa[i] * ip.nn[a] + mat.dmu_ds * visc;
                    for c in 0..3 {
                        jacobian.add(row, LOCAL_P0 + c, -w * ip.mm[c] * ip.bb[a][i]);
                        jacobian.add(row, LOCAL_L0 + c, w * dr_ds * ds_dll[c]);
                    }
                }
            }

            for c in 0..3 {
                // incompressibility-velocity and level-set-velocity
                for a in 0..6 {
                    for k in 0..2 {
                        jacobian.add(LOCAL_P0 + c, 2 * a + k, w * ip.bb[a][k] * ip.mm[c]);
                        let dt_dv = f.gl[k] * ip.nn[a] + f.l * ip.bb[a][k];
                        jacobian.add(LOCAL_L0 + c, 2 * a + k, w * dt_dv * ip.mm[c]);
                    }
                }

                // level-set-level-set
                for d in 0..3 {
                    let dv = self.dd[d][0] * f.v[0] + self.dd[d][1] * f.v[1];
                    let val = ip.mm[d] / dt + dv + ip.mm[d] * f.div;
                    jacobian.add(LOCAL_L0 + c, LOCAL_L0 + d, w * val * ip.mm[c]);
                }
            }
        }
        for i in 0..N_LOCAL_EQ {
            for j in 0..N_LOCAL_EQ {
                if !jacobian.get(i, j).is_finite() {
                    return Err("found NaN or Inf in the local Jacobian matrix");
                }
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
