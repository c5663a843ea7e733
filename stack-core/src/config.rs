use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Property bag of a stack node, as edited by the user.
///
/// Unknown or missing fields in a serialized preset fall back to the
/// defaults, so a preset may list only the values it cares about.
/// `base_path` is a scene-local link and is never serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Items in the bottom row.
    pub base_count: i32,
    /// Span of the bottom row when no path is linked.
    pub base_length: f32,
    /// Requested number of rows, clamped to `base_count` by [`Self::validate`].
    pub row_count: i32,
    /// Vertical distance between rows.
    pub row_height: f32,
    /// Emit lightweight references for every item after the first.
    pub use_instancing: bool,
    pub random_seed: u32,
    /// Maximum heading jitter, in radians.
    pub random_rotation: f32,
    pub random_offset_lateral: f32,
    pub random_offset_longitudinal: f32,
    #[serde(skip)]
    pub base_path: Option<NodeId>,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            base_count: 3,
            base_length: 100.0,
            row_count: 3,
            row_height: 20.0,
            use_instancing: true,
            random_seed: 12345,
            random_rotation: 0.0,
            random_offset_lateral: 0.0,
            random_offset_longitudinal: 0.0,
            base_path: None,
        }
    }
}

impl StackSettings {
    /// Applies the editing rule that a stack can never be taller than wide.
    pub fn validate(&mut self) {
        self.row_count = self.row_count.min(self.base_count);
    }

    /// Whether `base_length` has any effect. With a path linked the path's
    /// own length defines the span.
    pub fn base_length_enabled(&self) -> bool {
        self.base_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_three_item_pyramid() {
        let s = StackSettings::default();

        assert_eq!(s.base_count, 3);
        assert_eq!(s.row_count, 3);
        assert_eq!(s.base_length, 100.0);
        assert_eq!(s.row_height, 20.0);
        assert!(s.use_instancing);
        assert_eq!(s.random_seed, 12345);
        assert_eq!(s.random_rotation, 0.0);
        assert!(s.base_path.is_none());
    }

    #[test]
    fn validate_clamps_rows_to_base_count() {
        let mut s = StackSettings {
            base_count: 4,
            row_count: 9,
            ..StackSettings::default()
        };
        s.validate();
        assert_eq!(s.row_count, 4);

        // Fewer rows than the base allows are left alone.
        s.row_count = 2;
        s.validate();
        assert_eq!(s.row_count, 2);
    }

    #[test]
    fn base_length_is_disabled_while_a_path_is_linked() {
        let mut s = StackSettings::default();
        assert!(s.base_length_enabled());

        s.base_path = Some(3);
        assert!(!s.base_length_enabled());
    }

    #[test]
    fn partial_presets_fill_in_defaults() {
        let s: StackSettings =
            serde_json::from_str(r#"{ "base_count": 6, "random_seed": 7 }"#).unwrap();

        assert_eq!(s.base_count, 6);
        assert_eq!(s.random_seed, 7);
        assert_eq!(s.row_height, 20.0);
        assert!(s.use_instancing);
    }

    #[test]
    fn path_link_is_not_serialized() {
        let s = StackSettings {
            base_path: Some(5),
            ..StackSettings::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("base_path"));

        let back: StackSettings = serde_json::from_str(&json).unwrap();
        assert!(back.base_path.is_none());
    }
}
