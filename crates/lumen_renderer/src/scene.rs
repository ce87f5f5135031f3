//! Scene: cameras, lights and the primitive arena, plus the top-level trace.
//!
//! Population is incremental. Tracing only sees the primitives that were
//! present at the last [`Scene::build_accel_structure`] call; adding or
//! transforming geometry marks the scene as needing a rebuild, which the
//! caller must trigger explicitly before the next frame.

use std::fmt;

use crate::{
    AccelConfig, Bvh, Camera, Color, HitRecord, Light, PrimId, Primitive, Ray, Solid,
};
use lumen_math::{Mat4, Mat4Ext, Vec3};
use thiserror::Error;

/// Errors from scene lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene has no camera")]
    NoCamera,

    #[error("Camera index {index} out of range ({count} cameras)")]
    CameraIndexOutOfRange { index: usize, count: usize },

    #[error("Unknown primitive {0}")]
    UnknownPrimitive(PrimId),

    #[error("Unknown solid {0}")]
    UnknownSolid(SolidId),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Handle to a solid added to a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolidId(usize);

impl SolidId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A solid after flattening: which primitives it owns and its pivot.
struct SolidRecord {
    members: Vec<PrimId>,
    pivot: Vec3,
}

/// Everything needed to render a frame.
pub struct Scene {
    background: Color,
    ambient: Color,
    cameras: Vec<Box<dyn Camera>>,
    active_camera: usize,
    lights: Vec<Box<dyn Light>>,
    primitives: Vec<Box<dyn Primitive>>,
    solids: Vec<SolidRecord>,
    bvh: Bvh,
    /// Number of primitives covered by `bvh`
    indexed: usize,
    dirty: bool,
}

impl Scene {
    /// Create an empty scene. Rays that miss everything return `background`.
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ambient: Color::ZERO,
            cameras: Vec::new(),
            active_camera: 0,
            lights: Vec::new(),
            primitives: Vec::new(),
            solids: Vec::new(),
            bvh: Bvh::empty(),
            indexed: 0,
            dirty: false,
        }
    }

    /// Set the ambient light color used by Phong shading.
    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: Color) {
        self.ambient = ambient;
    }

    // ---- Cameras ----

    /// Add a camera and return its index. The first camera becomes active.
    pub fn add_camera(&mut self, camera: impl Camera + 'static) -> usize {
        self.cameras.push(Box::new(camera));
        self.cameras.len() - 1
    }

    pub fn set_active_camera(&mut self, index: usize) -> SceneResult<()> {
        if index >= self.cameras.len() {
            return Err(SceneError::CameraIndexOutOfRange {
                index,
                count: self.cameras.len(),
            });
        }
        self.active_camera = index;
        Ok(())
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> SceneResult<&dyn Camera> {
        self.cameras
            .get(self.active_camera)
            .map(|c| c.as_ref())
            .ok_or(SceneError::NoCamera)
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut (dyn Camera + 'static)> {
        self.cameras.get_mut(index).map(|c| c.as_mut())
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    // ---- Lights ----

    pub fn add_light(&mut self, light: impl Light + 'static) -> usize {
        self.lights.push(Box::new(light));
        self.lights.len() - 1
    }

    pub fn lights(&self) -> impl Iterator<Item = &dyn Light> {
        self.lights.iter().map(|l| l.as_ref())
    }

    pub fn light_mut(&mut self, index: usize) -> Option<&mut (dyn Light + 'static)> {
        self.lights.get_mut(index).map(|l| l.as_mut())
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    // ---- Geometry ----

    /// Add a primitive. It becomes visible after the next rebuild.
    pub fn add_primitive(&mut self, primitive: impl Primitive + 'static) -> PrimId {
        self.push_primitive(Box::new(primitive))
    }

    fn push_primitive(&mut self, primitive: Box<dyn Primitive>) -> PrimId {
        let id = PrimId::new(self.primitives.len());
        self.primitives.push(primitive);
        self.mark_dirty();
        id
    }

    /// Flatten `solid` into the scene, keeping its members addressable as a
    /// group.
    pub fn add_solid(&mut self, solid: Solid) -> SolidId {
        let (primitives, pivot) = solid.into_parts();
        let members = primitives
            .into_iter()
            .map(|p| self.push_primitive(p))
            .collect::<Vec<_>>();

        log::debug!("Added solid with {} primitives", members.len());
        self.solids.push(SolidRecord { members, pivot });
        SolidId(self.solids.len() - 1)
    }

    pub fn primitive(&self, id: PrimId) -> Option<&dyn Primitive> {
        self.primitives.get(id.index()).map(|p| p.as_ref())
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Apply `m` to a single primitive.
    pub fn transform_primitive(&mut self, id: PrimId, m: &Mat4) -> SceneResult<()> {
        let prim = self
            .primitives
            .get_mut(id.index())
            .ok_or(SceneError::UnknownPrimitive(id))?;
        prim.transform(m);
        self.mark_transformed();
        Ok(())
    }

    /// Apply `m` to every member of a solid, about the solid's pivot.
    pub fn transform_solid(&mut self, id: SolidId, m: &Mat4) -> SceneResult<()> {
        let solid = self
            .solids
            .get_mut(id.0)
            .ok_or(SceneError::UnknownSolid(id))?;
        let m = crate::solid::about_pivot(solid.pivot, m);

        for &member in &solid.members {
            if let Some(prim) = self.primitives.get_mut(member.index()) {
                prim.transform(&m);
            }
        }
        solid.pivot = m.apply_point(solid.pivot);
        self.mark_transformed();
        Ok(())
    }

    pub fn solid_pivot(&self, id: SolidId) -> SceneResult<Vec3> {
        self.solids
            .get(id.0)
            .map(|s| s.pivot)
            .ok_or(SceneError::UnknownSolid(id))
    }

    pub fn set_solid_pivot(&mut self, id: SolidId, pivot: Vec3) -> SceneResult<()> {
        let solid = self
            .solids
            .get_mut(id.0)
            .ok_or(SceneError::UnknownSolid(id))?;
        solid.pivot = pivot;
        Ok(())
    }

    fn mark_dirty(&mut self) {
        if !self.dirty && self.indexed > 0 {
            log::debug!("Primitives added after build, acceleration structure is stale");
        }
        self.dirty = true;
    }

    fn mark_transformed(&mut self) {
        if !self.dirty && self.indexed > 0 {
            log::warn!("Geometry transformed after build, rebuild the acceleration structure before tracing");
        }
        self.dirty = true;
    }

    // ---- Acceleration structure ----

    /// Rebuild the acceleration structure over all current primitives.
    pub fn build_accel_structure(&mut self, max_depth: usize, min_leaf_size: usize) {
        self.build_accel_structure_with(AccelConfig {
            max_depth,
            min_leaf_size,
        });
    }

    pub fn build_accel_structure_with(&mut self, config: AccelConfig) {
        self.bvh = Bvh::build(&self.primitives, config);
        self.indexed = self.primitives.len();
        self.dirty = false;
    }

    /// True if geometry changed since the last build.
    pub fn needs_rebuild(&self) -> bool {
        self.dirty
    }

    pub fn accel(&self) -> &Bvh {
        &self.bvh
    }

    /// The slice the current tree indexes. Primitives added after the last
    /// build are left out so handles in the tree stay valid.
    fn indexed_primitives(&self) -> &[Box<dyn Primitive>] {
        let end = self.indexed.min(self.primitives.len());
        &self.primitives[..end]
    }

    // ---- Tracing ----

    /// Find the closest hit along `ray`, recording it in the ray.
    pub fn intersect(&self, ray: &mut Ray) -> bool {
        self.bvh.intersect(self.indexed_primitives(), ray)
    }

    /// True if any primitive blocks `ray` before its `t`.
    pub fn occluded(&self, ray: &Ray) -> bool {
        self.bvh.occluded(self.indexed_primitives(), ray)
    }

    /// Surface data for the hit recorded in `ray`.
    pub fn hit_record(&self, ray: &Ray) -> Option<HitRecord> {
        let prim = self.primitive(ray.hit?)?;
        Some(HitRecord::new(ray, prim.normal(ray), prim.texture_coords(ray)))
    }

    /// Trace `ray` and shade its closest hit, or return the background.
    pub fn trace_ray(&self, ray: &mut Ray) -> Color {
        if !self.intersect(ray) {
            return self.background;
        }
        match (ray.hit.and_then(|id| self.primitive(id)), self.hit_record(ray)) {
            (Some(prim), Some(hit)) => prim.shader().shade(self, &hit),
            _ => self.background,
        }
    }
}
