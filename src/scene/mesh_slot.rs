use crate::mesh::{self, MeshError, MeshStats, ShapeParameters};
use crate::render::{GpuBackend, MeshHandle, RenderResult, VertexLayout};

/// The mesh currently bound on the GPU together with the parameters it was
/// generated from. Regenerates only when the parameters change.
#[derive(Debug, Default)]
pub struct MeshSlot {
    bound: Option<BoundMesh>,
    rejected: Option<(ShapeParameters, MeshError)>,
    uploads: u64,
    rejections: u64,
}

#[derive(Debug, Clone, Copy)]
struct BoundMesh {
    params: ShapeParameters,
    handle: MeshHandle,
    stats: MeshStats,
}

impl MeshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the bound mesh in line with `params`.
    ///
    /// Returns `Ok(true)` when a new mesh was uploaded. Invalid parameters
    /// keep the previous mesh bound and are not retried until they change;
    /// upload failures are returned and retried on the next call.
    pub fn sync(
        &mut self,
        params: &ShapeParameters,
        backend: &mut dyn GpuBackend,
    ) -> RenderResult<bool> {
        if self.bound.as_ref().is_some_and(|bound| bound.params == *params) {
            return Ok(false);
        }
        if self
            .rejected
            .as_ref()
            .is_some_and(|(rejected, _)| same_bits(rejected, params))
        {
            return Ok(false);
        }

        let mesh = match mesh::generate(params) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!("[scene] keeping previous mesh: {err}");
                self.rejected = Some((*params, err));
                self.rejections += 1;
                return Ok(false);
            }
        };
        self.rejected = None;

        let handle = backend.upload_mesh(&mesh, &VertexLayout::for_vertex())?;
        let stats = mesh.stats();
        log::debug!(
            "[scene] bound {} mesh #{} ({} vertices, {} triangles)",
            params.kind().label(),
            handle.id,
            stats.vertices,
            stats.triangles
        );

        self.bound = Some(BoundMesh {
            params: *params,
            handle,
            stats,
        });
        self.uploads += 1;
        Ok(true)
    }

    pub fn handle(&self) -> Option<MeshHandle> {
        self.bound.as_ref().map(|bound| bound.handle)
    }

    pub fn stats(&self) -> MeshStats {
        self.bound
            .as_ref()
            .map(|bound| bound.stats)
            .unwrap_or_default()
    }

    pub fn parameters(&self) -> Option<&ShapeParameters> {
        self.bound.as_ref().map(|bound| &bound.params)
    }

    pub fn last_error(&self) -> Option<&MeshError> {
        self.rejected.as_ref().map(|(_, err)| err)
    }

    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Number of distinct parameter sets the generator rejected.
    pub fn rejection_count(&self) -> u64 {
        self.rejections
    }
}

/// Bitwise comparison, so a NaN parameter matches itself.
fn same_bits(a: &ShapeParameters, b: &ShapeParameters) -> bool {
    match (a, b) {
        (ShapeParameters::Cube, ShapeParameters::Cube) => true,
        (ShapeParameters::Cylinder(a), ShapeParameters::Cylinder(b)) => {
            a.upper_radius.to_bits() == b.upper_radius.to_bits()
                && a.lower_radius.to_bits() == b.lower_radius.to_bits()
                && a.height.to_bits() == b.height.to_bits()
                && a.segments == b.segments
        }
        (ShapeParameters::Sphere(a), ShapeParameters::Sphere(b)) => {
            a.radius.to_bits() == b.radius.to_bits()
                && a.latitude_segments == b.latitude_segments
                && a.longitude_segments == b.longitude_segments
        }
        (ShapeParameters::Torus(a), ShapeParameters::Torus(b)) => {
            a.inner_radius.to_bits() == b.inner_radius.to_bits()
                && a.outer_radius.to_bits() == b.outer_radius.to_bits()
                && a.tube_segments == b.tube_segments
                && a.ring_segments == b.ring_segments
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CylinderParams, SphereParams};
    use crate::render::NullGpuBackend;

    #[test]
    fn uploads_only_when_parameters_change() {
        let mut backend = NullGpuBackend::default();
        let mut slot = MeshSlot::new();

        assert!(slot.sync(&ShapeParameters::Cube, &mut backend).expect("upload"));
        assert!(!slot.sync(&ShapeParameters::Cube, &mut backend).expect("cached"));
        assert_eq!(backend.mesh_uploads(), 1);
        assert_eq!(slot.stats().vertices, 24);

        let sphere = ShapeParameters::Sphere(SphereParams::default());
        assert!(slot.sync(&sphere, &mut backend).expect("upload"));
        assert_eq!(backend.mesh_uploads(), 2);
        assert_eq!(slot.parameters(), Some(&sphere));
        assert_eq!(slot.upload_count(), 2);
    }

    #[test]
    fn invalid_parameters_keep_previous_mesh() {
        let mut backend = NullGpuBackend::default();
        let mut slot = MeshSlot::new();
        slot.sync(&ShapeParameters::Cube, &mut backend).expect("upload");
        let cube_handle = slot.handle();

        let invalid = ShapeParameters::Cylinder(CylinderParams {
            segments: 1,
            ..Default::default()
        });
        assert!(!slot.sync(&invalid, &mut backend).expect("rejection is not fatal"));
        assert_eq!(slot.handle(), cube_handle);
        assert!(slot.last_error().is_some());

        // not regenerated again while unchanged
        assert!(!slot.sync(&invalid, &mut backend).expect("still rejected"));
        assert_eq!(backend.mesh_uploads(), 1);

        let valid = ShapeParameters::Cylinder(CylinderParams::default());
        assert!(slot.sync(&valid, &mut backend).expect("upload"));
        assert!(slot.last_error().is_none());
    }

    #[test]
    fn nan_parameters_are_rejected_once() {
        let mut backend = NullGpuBackend::default();
        let mut slot = MeshSlot::new();
        let invalid = ShapeParameters::Sphere(SphereParams {
            radius: f32::NAN,
            ..Default::default()
        });

        for _ in 0..3 {
            assert!(!slot.sync(&invalid, &mut backend).expect("rejection is not fatal"));
        }
        assert_eq!(slot.rejection_count(), 1);
        assert_eq!(backend.mesh_uploads(), 0);
    }

    #[test]
    fn upload_failure_is_retried() {
        let mut backend = NullGpuBackend::default();
        backend.fail_next_uploads(1);
        let mut slot = MeshSlot::new();

        assert!(slot.sync(&ShapeParameters::Cube, &mut backend).is_err());
        assert!(slot.handle().is_none());

        assert!(slot.sync(&ShapeParameters::Cube, &mut backend).expect("retry succeeds"));
        assert!(slot.handle().is_some());
    }
}
