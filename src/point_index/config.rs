use crate::error::CoreError;

/// Construction parameters for a [`super::PointSpatialIndex`] (spec §6).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointIndexConfig {
    pub cell_size: f32,
    pub radius: f32,
    pub n_max: usize,
}

impl PointIndexConfig {
    pub fn new(cell_size: f32, radius: f32, n_max: usize) -> Result<Self, CoreError> {
        if !(cell_size > 0.0) {
            return Err(CoreError::PipelineCreationFailed("cell_size must be > 0".into()));
        }
        if !(radius > 0.0) {
            return Err(CoreError::PipelineCreationFailed("radius must be > 0".into()));
        }
        if radius > cell_size {
            return Err(CoreError::PipelineCreationFailed("radius must be <= cell_size".into()));
        }
        Ok(Self { cell_size, radius, n_max })
    }

    /// Squared diameter `(2r)^2` — the library's actual distance-bound convention
    /// (spec §9 open question): "within radius r" callers must pass `radius = r/2`.
    pub fn diameter_sq(&self) -> f32 {
        let d = 2.0 * self.radius;
        d * d
    }
}
