use crate::base::{ParamFluids, SignModel};

/// Holds the local material state at an integration point
///
/// The blended properties read `ρ = ½(ρ1 + ρ2) + ½(ρ1 - ρ2) s` and `μ = ½(μ1 + μ2) + ½(μ1 - μ2) s`,
/// where `s` is the (approximated) sign of the level set.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalMaterial {
    /// Approximated sign s
    pub s: f64,

    /// Derivative ∂s/∂l
    pub ds_dl: f64,

    /// Derivative ∂s/∂(∇l)
    pub ds_dg: [f64; 2],

    /// Blended density ρ
    pub rho: f64,

    /// Blended dynamic viscosity μ
    pub mu: f64,

    /// Derivative dρ/ds
    pub drho_ds: f64,

    /// Derivative dμ/ds
    pub dmu_ds: f64,
}

/// Implements the regularized sign function
///
/// ```text
/// s = l / √(l² + ε² |g|²)
/// ```
///
/// where `g = ∇l`. Returns `(s, ∂s/∂l, ∂s/∂g)`.
///
/// The function is undefined when both `l` and `g` vanish; in this case, s = 0, ∂s/∂l = 1,
/// and ∂s/∂g = 0 (the affine limit).
pub fn sign_eps(l: f64, g: &[f64; 2], eps: f64) -> (f64, f64, [f64; 2]) {
    let gg = g[0] * g[0] + g[1] * g[1];
    let ee = eps * eps;
    let qq = l * l + ee * gg;
    if qq == 0.0 {
        return (0.0, 1.0, [0.0, 0.0]);
    }
    let q = f64::sqrt(qq);
    let q3 = q * qq;
    let s = l / q;
    let ds_dl = ee * gg / q3;
    let c = -l * ee / q3;
    (s, ds_dl, [c * g[0], c * g[1]])
}

/// Implements the blending of the density and viscosity of two fluids
pub struct ModelTwoFluid {
    /// Average density ½(ρ1 + ρ2)
    rho_avg: f64,

    /// Half difference of densities ½(ρ1 - ρ2)
    rho_dif: f64,

    /// Average viscosity ½(μ1 + μ2)
    mu_avg: f64,

    /// Half difference of viscosities ½(μ1 - μ2)
    mu_dif: f64,

    /// Regularization length
    eps: f64,

    /// Approximation of the sign function
    model: SignModel,
}

impl ModelTwoFluid {
    /// Allocates a new instance
    pub fn new(param: &ParamFluids, eps: f64, model: SignModel) -> Self {
        ModelTwoFluid {
            rho_avg: 0.5 * (param.rho1 + param.rho2),
            rho_dif: 0.5 * (param.rho1 - param.rho2),
            mu_avg: 0.5 * (param.mu1 + param.mu2),
            mu_dif: 0.5 * (param.mu1 - param.mu2),
            eps,
            model,
        }
    }

    /// Returns the blended density and viscosity given the approximated sign
    pub fn blend(&self, s: f64) -> (f64, f64) {
        (self.rho_avg + self.rho_dif * s, self.mu_avg + self.mu_dif * s)
    }

    /// Calculates the local material state given the level set and its gradient
    pub fn calc(&self, l: f64, g: &[f64; 2]) -> LocalMaterial {
        let (s, ds_dl, ds_dg) = match self.model {
            SignModel::Smooth => sign_eps(l, g, self.eps),
            SignModel::Affine => (l, 1.0, [0.0, 0.0]),
        };
        let (rho, mu) = self.blend(s);
        LocalMaterial {
            s,
            ds_dl,
            ds_dg,
            rho,
            mu,
            drho_ds: self.rho_dif,
            dmu_ds: self.mu_dif,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
