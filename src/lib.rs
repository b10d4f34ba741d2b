//! Oxide simulates oxidation of a metallic surface on a 2D grid.
//!
//! Every cell is Metallic, Oxide or Void. Each tick an oxidation rate is
//! derived from an Arrhenius diffusion coefficient and the flux of the
//! oxidizing species, and every cell makes a stochastic transition.

pub mod d2;
pub mod error;
pub mod params;

pub use error::{BoxError, OxidationError};
pub use params::{ConcentrationProfile, SimulationParameters};
