//! Triangular stack layout.
//!
//! The generator owns the triangular array of item transforms and fills it
//! in two steps:
//! 1. [`StackGenerator::initialize`]: store parameters, re-seed the jitter
//!    source and shape the array.
//! 2. [`StackGenerator::generate`]: compute every item transform, either
//!    along a straight baseline or along a path.
//!
//! This is what stacks look like:
//!
//! ```text
//!         X
//!        X X          X
//!       X X X        X X        X
//!      X X X X      X X X      X X      X
//!     X X X X X    X X X X    X X X    X X    X
//!
//!         5            4         3       2     1   base count
//!        15           10         6       3     1   items
//! ```

use glam::{Affine3A, Quat, Vec3};
use log::debug;

use crate::{
    arc_length::ArcLengthTable,
    error::{Result, StackError},
    materialize,
    params::StackParameters,
    path::PathInput,
    random::JitterSource,
    scene::Scene,
    triangle::TriangleArray,
    types::NodeId,
};

/// Coordinate space of the transforms in a finished layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemSpace {
    /// Relative to the stack node (straight baseline).
    Local,
    /// World space (path mode); the path's transform is already applied.
    World,
}

/// Read-only view of a generated layout.
#[derive(Clone, Copy, Debug)]
pub struct StackLayout<'a> {
    pub items: &'a TriangleArray<Affine3A>,
    pub space: ItemSpace,
}

/// Builds the item transforms of one stack.
#[derive(Debug, Default)]
pub struct StackGenerator {
    params: StackParameters,
    items: TriangleArray<Affine3A>,
    random: JitterSource,
    /// Allocated the first time a path is used.
    path_table: Option<ArcLengthTable>,
    initialized: bool,
}

impl StackGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `params` and shapes the triangular array for them.
    ///
    /// The jitter source is re-seeded on every call, so each pass after a
    /// successful `initialize` replays the same random sequence. When
    /// `params` equal the stored ones and the generator is ready, nothing
    /// else happens.
    ///
    /// ### Returns
    /// - `Err(StackError::InvalidShape)` if `base_count < 1`.
    /// - `Err(StackError::Allocation)` if the array could not grow.
    ///
    /// On error the generator is left not ready.
    pub fn initialize(&mut self, params: &StackParameters) -> Result<()> {
        self.random.init(params.random_seed);

        if self.initialized && *params == self.params {
            return Ok(());
        }

        self.params = StackParameters::default();
        self.initialized = false;

        if params.base_count < 1 {
            return Err(StackError::InvalidShape(params.base_count));
        }

        self.params = *params;

        let base = usize::try_from(params.base_count).unwrap_or(0);
        let before = self.items.reallocations();
        self.items.resize(base, params.effective_rows())?;
        if self.items.reallocations() != before {
            debug!(
                "stack array reshaped to {} rows over a base of {}",
                self.items.row_count(),
                base
            );
        }

        self.initialized = true;
        Ok(())
    }

    /// Recomputes every item transform from scratch.
    ///
    /// `path` must describe the node named by the parameters' `base_path`;
    /// it is ignored when no path is configured.
    ///
    /// ### Returns
    /// - `Err(StackError::NotInitialized)` before a successful `initialize`.
    /// - `Err(StackError::MissingPath)` if a path is configured but not given.
    /// - `Err(StackError::DegeneratePath)` if its arc-length table fails.
    pub fn generate(&mut self, path: Option<PathInput<'_>>) -> Result<()> {
        if !self.initialized {
            return Err(StackError::NotInitialized);
        }

        let p = self.params;
        let path = match p.base_path {
            Some(id) => {
                let input = path
                    .filter(|input| input.key.node == id)
                    .ok_or(StackError::MissingPath(id))?;
                let table = self.path_table.get_or_insert_with(ArcLengthTable::default);
                table.initialize(input.key, input.curve)?;
                Some(input)
            }
            None => None,
        };

        // Relative distance between items on a path, or absolute spacing on
        // the straight baseline.
        let rel_distance = if p.base_count > 1 {
            1.0 / (p.base_count - 1) as f32
        } else {
            0.0
        };
        let distance = p.base_length / p.base_count as f32;

        for row in 0..self.items.row_count() {
            let rowf = row as f32;
            for item in 0..self.items.row_len(row) {
                let itemf = item as f32;
                let rotation = Quat::from_rotation_y(self.random.next_signed() * p.random_rot);
                let lateral = self.random.next_signed() * p.random_offset_lateral;
                let longitudinal = self.random.next_signed() * p.random_offset_longitudinal;

                let transform = match (&path, &self.path_table) {
                    (Some(input), Some(table)) => {
                        let t = table.uniform_to_natural(rel_distance * (itemf + rowf * 0.5));
                        let tangent = input.curve.tangent(t);
                        let side = tangent.cross(Vec3::Y).normalize_or_zero();

                        let mut offset = input.curve.point(t);
                        offset.y += p.row_height * rowf;
                        offset += side * lateral;
                        offset += tangent * longitudinal;

                        input.world * Affine3A::from_rotation_translation(rotation, offset)
                    }
                    _ => {
                        let offset = Vec3::new(
                            lateral,
                            p.row_height * rowf,
                            distance * itemf + distance * rowf * 0.5 + longitudinal,
                        );
                        Affine3A::from_rotation_translation(rotation, offset)
                    }
                };

                self.items.row_mut(row)[item] = transform;
            }
        }

        Ok(())
    }

    /// Materializes the current layout under a new container in `scene`.
    ///
    /// See [`materialize::build_stack_geometry`].
    pub fn build_geometry(
        &self,
        scene: &mut Scene,
        original: NodeId,
        mg: Affine3A,
        use_instancing: bool,
    ) -> Result<Option<NodeId>> {
        if !self.initialized {
            return Err(StackError::NotInitialized);
        }
        materialize::build_stack_geometry(scene, original, mg, self.layout(), use_instancing)
    }

    /// The current layout and the space its transforms are expressed in.
    pub fn layout(&self) -> StackLayout<'_> {
        StackLayout {
            items: &self.items,
            space: if self.params.base_path.is_some() {
                ItemSpace::World
            } else {
                ItemSpace::Local
            },
        }
    }

    pub fn params(&self) -> &StackParameters {
        &self.params
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// Arc-length table of the last path used, if any.
    pub fn path_table(&self) -> Option<&ArcLengthTable> {
        self.path_table.as_ref()
    }
}
