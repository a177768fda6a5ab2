use serde::{Deserialize, Serialize};

/// Raw directional key state for one player in one frame.
///
/// `up` moves toward -Z, `down` toward +Z, `left` toward -X, `right` toward +X.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionalInput {
    /// Whether no direction is held.
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }

    /// Planar axis values `(x, z)`, each in `{-1, 0, 1}`. Opposing keys cancel.
    pub fn axis(&self) -> (f32, f32) {
        let x = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        let z = f32::from(u8::from(self.down)) - f32::from(u8::from(self.up));
        (x, z)
    }

    /// OR another poll of the same frame into this one.
    pub fn merge(&mut self, other: DirectionalInput) {
        self.up |= other.up;
        self.down |= other.down;
        self.left |= other.left;
        self.right |= other.right;
    }

    /// Press the keys closest to the planar direction `(x, z)`.
    ///
    /// Components with magnitude below `dead_zone` are released.
    pub fn from_direction(x: f32, z: f32, dead_zone: f32) -> Self {
        if !x.is_finite() || !z.is_finite() {
            return Self::default();
        }
        Self {
            up: z < -dead_zone,
            down: z > dead_zone,
            left: x < -dead_zone,
            right: x > dead_zone,
        }
    }
}
