//! Zone and boundary descriptions

use super::physical::SurfaceType;
use rsebm_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A latitudinal band of the planet's surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,

    /// Insolation weight $\gamma$ (dimensionless).
    /// Mean insolation over the zone is $\gamma S$.
    pub gamma: FloatValue,

    /// Fraction of the planet's surface covered by the zone (dimensionless).
    pub area_fraction: FloatValue,

    /// Surface albedo (dimensionless).
    pub albedo: FloatValue,

    /// Surface density.
    /// unit: kg / m^3
    pub density: FloatValue,

    /// Specific heat capacity of the surface.
    /// unit: J / kg / K
    pub heat_capacity: FloatValue,

    /// Thermal scale depth.
    /// unit: m
    pub scale_depth: FloatValue,
}

impl ZoneConfig {
    /// Create a zone using the tabulated properties of a surface material
    pub fn from_surface(
        name: &str,
        gamma: FloatValue,
        area_fraction: FloatValue,
        surface: SurfaceType,
    ) -> Self {
        let properties = surface.properties();
        Self {
            name: name.to_string(),
            gamma,
            area_fraction,
            albedo: properties.albedo,
            density: properties.density,
            heat_capacity: properties.heat_capacity,
            scale_depth: properties.scale_depth,
        }
    }

    /// Create a zone covering the band between two latitudes (degrees, south < north).
    ///
    /// The area fraction of a band is
    /// $$a = \frac{\sin\phi_n - \sin\phi_s}{2}$$
    ///
    /// The insolation weight assumes no axial tilt and averages over a full rotation.
    /// It is the ratio between the band's share of the illuminated disc and its surface
    /// area:
    /// $$\gamma = \frac{g(\sin\phi_n) - g(\sin\phi_s)}{2\pi(\sin\phi_n - \sin\phi_s)},
    /// \quad g(u) = \arcsin u + u\sqrt{1 - u^2}$$
    ///
    /// With these definitions $\sum_i a_i \gamma_i = 1/4$ for any partition of the sphere.
    pub fn from_latitude_band(
        name: &str,
        south_degrees: FloatValue,
        north_degrees: FloatValue,
        surface: SurfaceType,
    ) -> Self {
        let u_s = south_degrees.to_radians().sin();
        let u_n = north_degrees.to_radians().sin();
        let disc_strip = |u: FloatValue| u.asin() + u * (1.0 - u * u).max(0.0).sqrt();

        let area_fraction = (u_n - u_s) / 2.0;
        let gamma = (disc_strip(u_n) - disc_strip(u_s)) / (2.0 * PI * (u_n - u_s));

        Self::from_surface(name, gamma, area_fraction, surface)
    }

    /// Heat capacity of the surface layer per unit area ($\text{J/m}^2\text{/K}$)
    ///
    /// $$C = \rho c z$$
    pub fn column_heat_capacity(&self) -> FloatValue {
        self.density * self.heat_capacity * self.scale_depth
    }
}

/// Conductive/advective coupling between two adjacent zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Indices (0-based) of the two zones that share this boundary, lower index first
    pub between: [usize; 2],

    /// Length of the shared boundary.
    /// unit: m
    pub length: FloatValue,

    /// Thermal exchange coefficient.
    /// Heat flow across the boundary is `length * exchange_coefficient * dT`.
    /// unit: W / m / K
    pub exchange_coefficient: FloatValue,
}

impl BoundaryConfig {
    /// Boundary between zone `lower` and zone `lower + 1`
    pub fn new(lower: usize, length: FloatValue, exchange_coefficient: FloatValue) -> Self {
        Self {
            between: [lower, lower + 1],
            length,
            exchange_coefficient,
        }
    }

    /// Heat flow (W) from the upper-index zone into the lower-index zone
    pub fn heat_flow(&self, t_lower: FloatValue, t_upper: FloatValue) -> FloatValue {
        self.length * self.exchange_coefficient * (t_upper - t_lower)
    }
}
