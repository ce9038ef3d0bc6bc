use super::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Instantiate a new Ray. The direction is expected to be already normalized.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    pub fn along(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }
}
