//! Stateful gravity model of a spinning, constant-density asteroid.

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GravityError, GravityResult};
use crate::geometry::{GeometryHandle, MeshGeometry};
use crate::potential::{evaluate_with_constant, Potential, G};
use crate::rotation::{rotate_vertices, spin_axis, spin_rotation};
use crate::validate::{log_validation, validate_mesh};
use crate::Mesh;

fn default_gravitational_constant() -> f64 {
    G
}

fn default_spin_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// Physical parameters of a body. Units are km, kg and s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidParams {
    /// Body name.
    pub name: String,

    /// Bulk density (kg/km³).
    pub density: f64,

    /// Gravitational constant (km³ / (kg s²)).
    #[serde(default = "default_gravitational_constant")]
    pub gravitational_constant: f64,

    /// Semi-major axes of the best-fit ellipsoid (km).
    #[serde(default)]
    pub axes: [f64; 3],

    /// Spin rate about `spin_axis` (rad/s).
    #[serde(default)]
    pub omega: f64,

    /// Spin axis in the body frame.
    #[serde(default = "default_spin_axis")]
    pub spin_axis: [f64; 3],
}

impl AsteroidParams {
    /// Non-rotating body with the given density.
    pub fn new(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
            gravitational_constant: G,
            axes: [0.0; 3],
            omega: 0.0,
            spin_axis: default_spin_axis(),
        }
    }

    /// Look up a body by name (case-insensitive).
    pub fn named(name: &str) -> GravityResult<Self> {
        let (density, axes, period_hours) = match name.to_ascii_lowercase().as_str() {
            "castalia" => (2.1e12, [1.6130 / 2.0, 0.9810 / 2.0, 0.8260 / 2.0], 4.07),
            "itokawa" => (1.9e12, [0.535 / 2.0, 0.294 / 2.0, 0.209 / 2.0], 12.132),
            "eros" => (2.67e12, [34.4 / 2.0, 11.7 / 2.0, 11.7 / 2.0], 5.27),
            _ => {
                return Err(GravityError::UnknownAsteroid {
                    name: name.to_string(),
                })
            }
        };

        Ok(Self {
            axes,
            omega: 2.0 * PI / (period_hours * 3600.0),
            ..Self::new(name.to_ascii_lowercase(), density)
        })
    }

    /// Set the spin rate (rad/s).
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    /// Set the spin axis.
    pub fn with_spin_axis(mut self, axis: [f64; 3]) -> Self {
        self.spin_axis = axis;
        self
    }

    /// Parse parameters from TOML.
    pub fn from_toml(input: &str) -> GravityResult<Self> {
        let params: Self = toml::from_str(input).map_err(|e| GravityError::Config {
            details: e.to_string(),
        })?;
        params.check()?;
        Ok(params)
    }

    /// Serialize parameters to TOML.
    pub fn to_toml(&self) -> GravityResult<String> {
        toml::to_string_pretty(self).map_err(|e| GravityError::Config {
            details: e.to_string(),
        })
    }

    fn check(&self) -> GravityResult<Unit<Vector3<f64>>> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(GravityError::InvalidParameter {
                details: format!("density must be positive, got {}", self.density),
            });
        }
        if !(self.gravitational_constant.is_finite() && self.gravitational_constant > 0.0) {
            return Err(GravityError::InvalidParameter {
                details: format!(
                    "gravitational constant must be positive, got {}",
                    self.gravitational_constant
                ),
            });
        }
        if !self.omega.is_finite() {
            return Err(GravityError::InvalidParameter {
                details: format!("spin rate must be finite, got {}", self.omega),
            });
        }
        spin_axis(Vector3::from(self.spin_axis))
    }
}

/// Gravity model of one body: parameters, shared geometry, and the most
/// recent evaluation.
///
/// Evaluation takes `&mut self`, so a single instance never has two
/// evaluations in flight. Share the geometry handle, not the model, to
/// evaluate from several threads.
#[derive(Debug, Clone)]
pub struct AsteroidModel {
    params: AsteroidParams,
    spin_axis: Unit<Vector3<f64>>,
    geometry: GeometryHandle,
    volume: f64,
    last: Option<Potential>,
}

impl AsteroidModel {
    /// Build a model from a mesh, precomputing its geometry.
    ///
    /// Rejects meshes whose faces wind inward (non-positive enclosed volume).
    pub fn new(params: AsteroidParams, mesh: &Mesh) -> GravityResult<Self> {
        mesh.check_indices()?;
        let report = validate_mesh(mesh);
        log_validation(&report);
        if report.volume <= 0.0 {
            return Err(GravityError::InvalidParameter {
                details: format!(
                    "mesh encloses volume {:.6}; faces must wind counter-clockwise seen from outside",
                    report.volume
                ),
            });
        }

        let geometry = Arc::new(MeshGeometry::from_mesh(mesh)?);
        Self::with_geometry(params, geometry)
    }

    /// Build a model around already precomputed geometry.
    pub fn with_geometry(params: AsteroidParams, geometry: GeometryHandle) -> GravityResult<Self> {
        let spin_axis = params.check()?;
        info!(
            "Asteroid model '{}': density {:.4e} kg/km³, {} faces, {} edges",
            params.name,
            params.density,
            geometry.face_count(),
            geometry.edge_count()
        );

        Ok(Self {
            params,
            spin_axis,
            volume: geometry.volume(),
            geometry,
            last: None,
        })
    }

    /// Build a model for a body from the named parameter table.
    pub fn named(name: &str, mesh: &Mesh) -> GravityResult<Self> {
        Self::new(AsteroidParams::named(name)?, mesh)
    }

    /// Evaluate the field at a body-frame point and keep the result.
    pub fn evaluate_at(&mut self, point: &Point3<f64>) -> &Potential {
        let result = evaluate_with_constant(
            point,
            &self.geometry,
            self.params.density,
            self.params.gravitational_constant,
        );
        self.last.insert(result)
    }

    /// Evaluate the field at an inertial-frame point after the body has
    /// spun for `time` seconds.
    ///
    /// The stored geometry is not modified: the point is carried into the
    /// body frame and the vector and matrix results are carried back.
    pub fn evaluate_at_time(&mut self, point: &Point3<f64>, time: f64) -> &Potential {
        let rotation = self.rotation_at(time);
        let body_point = rotation.inverse() * point;

        let mut result = evaluate_with_constant(
            &body_point,
            &self.geometry,
            self.params.density,
            self.params.gravitational_constant,
        );

        let r: &Matrix3<f64> = rotation.matrix();
        result.gradient = r * result.gradient;
        result.gradient_matrix = r * result.gradient_matrix * r.transpose();
        if let Some(s) = result.singularity.as_mut() {
            s.point = *point;
        }

        debug!("Evaluated '{}' at t = {:.3} s", self.params.name, time);
        self.last.insert(result)
    }

    /// Body-to-inertial rotation after `time` seconds.
    pub fn rotation_at(&self, time: f64) -> Rotation3<f64> {
        spin_rotation(time, self.params.omega, &self.spin_axis)
    }

    /// Vertex positions after `time` seconds of spin. The model is unchanged.
    pub fn rotated_vertices(&self, time: f64) -> Vec<Point3<f64>> {
        rotate_vertices(
            self.geometry.vertices(),
            time,
            self.params.omega,
            &self.spin_axis,
        )
    }

    /// Most recent evaluation, if any.
    pub fn last_evaluation(&self) -> Option<&Potential> {
        self.last.as_ref()
    }

    /// Potential from the most recent evaluation.
    pub fn potential(&self) -> Option<f64> {
        self.last.as_ref().map(|p| p.potential)
    }

    /// Gradient from the most recent evaluation.
    pub fn gradient(&self) -> Option<Vector3<f64>> {
        self.last.as_ref().map(|p| p.gradient)
    }

    /// Gradient matrix from the most recent evaluation.
    pub fn gradient_matrix(&self) -> Option<Matrix3<f64>> {
        self.last.as_ref().map(|p| p.gradient_matrix)
    }

    /// Laplacian from the most recent evaluation.
    pub fn laplacian(&self) -> Option<f64> {
        self.last.as_ref().map(|p| p.laplacian)
    }

    pub fn params(&self) -> &AsteroidParams {
        &self.params
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn density(&self) -> f64 {
        self.params.density
    }

    pub fn omega(&self) -> f64 {
        self.params.omega
    }

    pub fn axes(&self) -> [f64; 3] {
        self.params.axes
    }

    /// Shared handle to the precomputed geometry.
    pub fn geometry(&self) -> &GeometryHandle {
        &self.geometry
    }

    /// Enclosed volume (km³).
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Total mass (kg).
    pub fn mass(&self) -> f64 {
        self.params.density * self.volume()
    }
}
