use crate::error::CoreError;

/// Construction parameters for a [`super::TriangleSpatialIndex`] (spec §6).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleIndexConfig {
    pub cell_size: f32,
    pub radius: f32,
    pub m_max: usize,
    pub bucket_size: u32,
}

impl TriangleIndexConfig {
    pub fn new(cell_size: f32, radius: f32, m_max: usize, bucket_size: u32) -> Result<Self, CoreError> {
        if !(cell_size > 0.0) {
            return Err(CoreError::PipelineCreationFailed("cell_size must be > 0".into()));
        }
        if !(radius > 0.0) {
            return Err(CoreError::PipelineCreationFailed("radius must be > 0".into()));
        }
        if bucket_size != 8 && bucket_size != 16 {
            return Err(CoreError::PipelineCreationFailed("bucket_size must be 8 or 16".into()));
        }
        Ok(Self {
            cell_size,
            radius,
            m_max,
            bucket_size,
        })
    }

    pub fn diameter_sq(&self) -> f32 {
        let d = 2.0 * self.radius;
        d * d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_bucket_size() {
        assert!(TriangleIndexConfig::new(1.0, 0.5, 100, 12).is_err());
    }

    #[test]
    fn accepts_default_bucket_size() {
        assert!(TriangleIndexConfig::new(1.0, 0.5, 100, 8).is_ok());
    }
}
