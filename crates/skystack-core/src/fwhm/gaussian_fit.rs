/// Levenberg-Marquardt fit of an axis-aligned 2D Gaussian surface.
/// All internal computations in f64.
///
/// Model: f(x,y) = off + A * exp(-(x-x0)^2 / (2 sx^2) - (y-y0)^2 / (2 sy^2))
/// Params: [x0, y0, sigma_x, sigma_y, A, off]
const MAX_ITER: usize = 200;
const CONV_TOL: f64 = 1e-8;
const NP: usize = 6;

#[derive(Clone, Copy, Debug)]
pub struct GaussianFit {
    pub x0: f64,
    pub y0: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub amplitude: f64,
    pub offset: f64,
}

impl GaussianFit {
    /// Mean of the two fitted widths.
    pub fn mean_sigma(&self) -> f64 {
        (self.sigma_x.abs() + self.sigma_y.abs()) / 2.0
    }
}

/// Initial parameter guess.
#[derive(Clone, Copy, Debug)]
pub struct GaussianGuess {
    pub x0: f64,
    pub y0: f64,
    pub sigma: f64,
    pub amplitude: f64,
    pub offset: f64,
}

/// Fit the model to a row-major grid of `width` columns.
///
/// x runs along columns and y along rows, both starting at 0.
/// Returns `None` when the solver does not converge or produces a
/// non-finite or degenerate solution.
pub fn fit_gaussian_2d(values: &[f64], width: usize, guess: &GaussianGuess) -> Option<GaussianFit> {
    if width == 0 || values.len() < NP * 2 || values.len() % width != 0 {
        return None;
    }

    let mut params = [
        guess.x0,
        guess.y0,
        guess.sigma,
        guess.sigma,
        guess.amplitude,
        guess.offset,
    ];
    if !lm_solve(values, width, &mut params) {
        return None;
    }
    if params.iter().any(|p| !p.is_finite()) || params[2] == 0.0 || params[3] == 0.0 {
        return None;
    }

    Some(GaussianFit {
        x0: params[0],
        y0: params[1],
        sigma_x: params[2],
        sigma_y: params[3],
        amplitude: params[4],
        offset: params[5],
    })
}

fn lm_solve(values: &[f64], width: usize, params: &mut [f64; NP]) -> bool {
    let mut lambda = 1e-3_f64;
    let mut nu = 2.0_f64;
    let mut best_cost = residual_cost(values, width, params);
    if !best_cost.is_finite() {
        return false;
    }

    let mut jtj = [0.0_f64; NP * NP];
    let mut jtr = [0.0_f64; NP];
    let mut mat = [0.0_f64; NP * NP];

    for _ in 0..MAX_ITER {
        jtj.fill(0.0);
        jtr.fill(0.0);

        let [x0, y0, sx, sy, amp, off] = *params;
        let inv_sx2 = 1.0 / (sx * sx);
        let inv_sy2 = 1.0 / (sy * sy);

        for (i, &value) in values.iter().enumerate() {
            let dx = (i % width) as f64 - x0;
            let dy = (i / width) as f64 - y0;
            let e = (-0.5 * (dx * dx * inv_sx2 + dy * dy * inv_sy2)).exp();
            let r = value - (off + amp * e);

            let j = [
                amp * e * dx * inv_sx2,
                amp * e * dy * inv_sy2,
                amp * e * dx * dx / (sx * sx * sx),
                amp * e * dy * dy / (sy * sy * sy),
                e,
                1.0,
            ];

            for p in 0..NP {
                jtr[p] += j[p] * r;
                for q in p..NP {
                    jtj[p * NP + q] += j[p] * j[q];
                }
            }
        }

        for p in 0..NP {
            for q in 0..p {
                jtj[p * NP + q] = jtj[q * NP + p];
            }
        }

        mat.copy_from_slice(&jtj);
        for p in 0..NP {
            mat[p * NP + p] += lambda * jtj[p * NP + p].max(1e-12);
        }

        let delta = match cholesky_solve(&mat, &jtr) {
            Some(d) => d,
            None => return false,
        };

        let mut candidate = *params;
        for p in 0..NP {
            candidate[p] += delta[p];
        }
        let new_cost = residual_cost(values, width, &candidate);

        // Nielsen gain ratio
        let predicted: f64 = (0..NP)
            .map(|i| delta[i] * (lambda * jtj[i * NP + i].max(1e-12) * delta[i] + jtr[i]))
            .sum();

        if new_cost.is_finite() && predicted > 0.0 && best_cost - new_cost > 0.0 {
            let rho = (best_cost - new_cost) / predicted;
            *params = candidate;
            best_cost = new_cost;
            lambda *= (1.0_f64 / 3.0).max(1.0 - (2.0 * rho - 1.0).powi(3));
            nu = 2.0;
        } else {
            lambda *= nu;
            nu *= 2.0;
        }

        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
        let delta_norm = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
        if delta_norm / param_norm.max(1e-12) < CONV_TOL || best_cost == 0.0 {
            return true;
        }
        if !lambda.is_finite() {
            return false;
        }
    }

    false
}

fn residual_cost(values: &[f64], width: usize, params: &[f64; NP]) -> f64 {
    let [x0, y0, sx, sy, amp, off] = *params;
    let inv_sx2 = 1.0 / (sx * sx);
    let inv_sy2 = 1.0 / (sy * sy);

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let dx = (i % width) as f64 - x0;
            let dy = (i / width) as f64 - y0;
            let model = off + amp * (-0.5 * (dx * dx * inv_sx2 + dy * dy * inv_sy2)).exp();
            let r = value - model;
            r * r
        })
        .sum()
}

/// Cholesky solve of a symmetric positive-definite NP x NP system, row-major.
fn cholesky_solve(mat: &[f64; NP * NP], rhs: &[f64; NP]) -> Option<[f64; NP]> {
    let mut l = [0.0_f64; NP * NP];

    for i in 0..NP {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i * NP + k] * l[j * NP + k];
            }
            if i == j {
                let diag = mat[i * NP + i] - sum;
                if !(diag > 0.0) {
                    return None;
                }
                l[i * NP + j] = diag.sqrt();
            } else {
                l[i * NP + j] = (mat[i * NP + j] - sum) / l[j * NP + j];
            }
        }
    }

    let mut y = [0.0_f64; NP];
    for i in 0..NP {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[i * NP + j] * y[j];
        }
        y[i] = (rhs[i] - sum) / l[i * NP + i];
    }

    let mut x = [0.0_f64; NP];
    for i in (0..NP).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..NP {
            sum += l[j * NP + i] * x[j];
        }
        x[i] = (y[i] - sum) / l[i * NP + i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian_grid(size: usize, x0: f64, y0: f64, sx: f64, sy: f64, amp: f64, off: f64) -> Vec<f64> {
        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f64 - x0;
                let dy = y as f64 - y0;
                values.push(off + amp * (-(dx * dx) / (2.0 * sx * sx) - (dy * dy) / (2.0 * sy * sy)).exp());
            }
        }
        values
    }

    #[test]
    fn test_fit_isotropic() {
        let values = gaussian_grid(31, 15.0, 15.0, 2.5, 2.5, 8000.0, 200.0);
        let guess = GaussianGuess {
            x0: 15.0,
            y0: 15.0,
            sigma: 3.0,
            amplitude: 10_000.0,
            offset: 200.0,
        };
        let fit = fit_gaussian_2d(&values, 31, &guess).unwrap();
        assert!((fit.sigma_x.abs() - 2.5).abs() < 0.01, "sx: {}", fit.sigma_x);
        assert!((fit.sigma_y.abs() - 2.5).abs() < 0.01, "sy: {}", fit.sigma_y);
        assert!((fit.amplitude - 8000.0).abs() < 5.0, "A: {}", fit.amplitude);
        assert!((fit.offset - 200.0).abs() < 1.0, "off: {}", fit.offset);
    }

    #[test]
    fn test_fit_elongated_off_centre() {
        let values = gaussian_grid(41, 18.3, 21.7, 2.0, 4.0, 5000.0, 50.0);
        let guess = GaussianGuess {
            x0: 20.0,
            y0: 20.0,
            sigma: 3.0,
            amplitude: 10_000.0,
            offset: 50.0,
        };
        let fit = fit_gaussian_2d(&values, 41, &guess).unwrap();
        assert!((fit.x0 - 18.3).abs() < 0.01, "x0: {}", fit.x0);
        assert!((fit.y0 - 21.7).abs() < 0.01, "y0: {}", fit.y0);
        assert!((fit.sigma_x.abs() - 2.0).abs() < 0.02);
        assert!((fit.sigma_y.abs() - 4.0).abs() < 0.02);
        assert!((fit.mean_sigma() - 3.0).abs() < 0.02);
    }

    #[test]
    fn test_fit_rejects_short_input() {
        let guess = GaussianGuess {
            x0: 1.0,
            y0: 1.0,
            sigma: 3.0,
            amplitude: 1.0,
            offset: 0.0,
        };
        assert!(fit_gaussian_2d(&[1.0, 2.0, 3.0], 3, &guess).is_none());
    }

    #[test]
    fn test_cholesky_identity() {
        let mut mat = [0.0; NP * NP];
        for i in 0..NP {
            mat[i * NP + i] = 1.0;
        }
        let rhs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = cholesky_solve(&mat, &rhs).unwrap();
        for i in 0..NP {
            assert!((x[i] - rhs[i]).abs() < 1e-12);
        }
    }
}
