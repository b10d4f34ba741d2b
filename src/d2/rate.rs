use std::f64::consts::PI;

use cgmath::{vec2, InnerSpace, Vector2};
use ndarray::{Array, Array2};

use crate::params::SimulationParameters;

/// Avogadro's number, 1/mol
pub const AVOGADRO: f64 = 6.02e23;

/// Arrhenius diffusion coefficient `d0 * exp(-q / (r * t))`.
///
/// `temperature` is absolute (Kelvin), matching the gas constant.
pub fn diffusion_coefficient(temperature: f64, d0: f64, q: f64, gas_constant: f64) -> f64 {
    d0 * (-q / (gas_constant * temperature)).exp()
}

/// Derivative of `value` at `k` on a line of `n` samples spaced `dx` apart.
///
/// Central differences inside, one-sided differences at both ends.
fn derivative(value: impl Fn(usize) -> f64, k: usize, n: usize, dx: f64) -> f64 {
    if n < 2 {
        0.0
    } else if k == 0 {
        (value(1) - value(0)) / dx
    } else if k + 1 == n {
        (value(n - 1) - value(n - 2)) / dx
    } else {
        (value(k + 1) - value(k - 1)) / (2.0 * dx)
    }
}

/// Numerical gradient of `c`. `x` is along rows, `y` along columns.
pub fn gradient(c: &Array2<f64>, dx: f64) -> Array2<Vector2<f64>> {
    let (w, h) = c.dim();

    Array::from_shape_fn((w, h), |(i, j)| {
        vec2(
            derivative(|k| c[[k, j]], i, w, dx),
            derivative(|k| c[[i, k]], j, h, dx),
        )
    })
}

/// Fick's first law, `-d * grad(c)`.
pub fn diffusion_flux(c: &Array2<f64>, d: f64, dx: f64) -> Array2<Vector2<f64>> {
    gradient(c, dx).mapv(|g| g * -d)
}

/// `floor(1.33 * pi * r^3 * N_A * m)`, the number of species a cell holds.
pub fn volume_scale(radius: f64, molar_mass: f64) -> f64 {
    (1.33 * PI * radius.powi(3) * AVOGADRO * molar_mass).floor()
}

/// Raw oxidation rate of every cell of concentration field `c`.
///
/// Each cell gets its own rate: the magnitude of the flux at that cell
/// times `volume_scale`. The result is not clamped and may lie outside
/// [0, 1].
pub fn oxidation_rate(
    temperature: f64,
    d0: f64,
    q: f64,
    gas_constant: f64,
    c: &Array2<f64>,
    radius: f64,
    molar_mass: f64,
) -> Array2<f64> {
    let d = diffusion_coefficient(temperature, d0, q, gas_constant);
    let dx = 2.0 * radius / 100.0;
    let scale = volume_scale(radius, molar_mass);

    diffusion_flux(c, d, dx).mapv(|j| scale * j.magnitude())
}

/// Oxidation rate field for `params` over concentration `c`.
pub fn rate_field(params: &SimulationParameters, c: &Array2<f64>) -> Array2<f64> {
    oxidation_rate(
        params.temperature,
        params.d0,
        params.activation_energy,
        params.gas_constant,
        c,
        params.cell_radius,
        params.molar_mass,
    )
}
