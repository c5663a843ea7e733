use crate::{config::StackSettings, types::NodeId};

/// Shape, spacing and jitter for one generation pass.
///
/// Equality is field-wise; the path is compared by node identity. The
/// default value is the empty "no stack" state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StackParameters {
    pub base_count: i32,
    pub base_length: f32,
    pub row_count: i32,
    pub row_height: f32,
    pub random_seed: u32,
    pub random_rot: f32,
    pub random_offset_lateral: f32,
    pub random_offset_longitudinal: f32,
    pub base_path: Option<NodeId>,
}

impl StackParameters {
    /// Number of rows the triangular layout will actually hold.
    pub fn effective_rows(&self) -> usize {
        let base = usize::try_from(self.base_count).unwrap_or(0);
        let rows = usize::try_from(self.row_count).unwrap_or(0);
        base.min(rows)
    }
}

impl From<&StackSettings> for StackParameters {
    fn from(s: &StackSettings) -> Self {
        Self {
            base_count: s.base_count,
            base_length: s.base_length,
            row_count: s.row_count,
            row_height: s.row_height,
            random_seed: s.random_seed,
            random_rot: s.random_rotation,
            random_offset_lateral: s.random_offset_lateral,
            random_offset_longitudinal: s.random_offset_longitudinal,
            base_path: s.base_path,
        }
    }
}
