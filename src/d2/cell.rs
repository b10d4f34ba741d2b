use super::RandomSource;

/// Thickest oxide a cell can carry.
pub const MAX_THICKNESS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Metallic,
    /// Stacked oxide layers, `1..=MAX_THICKNESS`.
    ///
    /// `from_thickness` and `transition` only produce counts in that range.
    /// The count is never read by `transition`, so a hand-built
    /// out-of-range value is brought back into range on its next tick.
    Oxide(u8),
    Void,
}

impl CellState {
    /// Snapshot code: Metallic 0, Oxide 1, Void 2.
    pub fn code(self) -> u8 {
        match self {
            CellState::Metallic => 0,
            CellState::Oxide(_) => 1,
            CellState::Void => 2,
        }
    }

    /// Clamp `thickness` to `[0, MAX_THICKNESS]` and truncate it to whole
    /// layers. Nothing left means the oxide spalled off.
    pub fn from_thickness(thickness: f64) -> CellState {
        let layers = thickness.max(0.0).min(MAX_THICKNESS as f64) as u8;

        if layers == 0 {
            CellState::Void
        } else {
            CellState::Oxide(layers)
        }
    }

    /// One tick of the cell under oxidation probability `rate` in [0, 1].
    pub fn transition<S: RandomSource>(self, rate: f64, source: &mut S) -> CellState {
        match self {
            CellState::Metallic => {
                if source.uniform() < rate {
                    CellState::Oxide(1)
                } else {
                    CellState::Metallic
                }
            }
            CellState::Oxide(_) => {
                let mut thickness = 1.0 + rate;
                if source.uniform() < 0.5 {
                    thickness = -thickness;
                }
                CellState::from_thickness(thickness)
            }
            CellState::Void => CellState::Void,
        }
    }
}
