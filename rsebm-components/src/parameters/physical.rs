//! Physical constants and surface material presets

use rsebm_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Planet-wide physical constants.
///
/// # Default Values
///
/// Defaults describe the present-day Earth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Stefan-Boltzmann constant ($\text{W/m}^2\text{/K}^4$).
    /// Default: 5.6696e-8
    pub stefan_boltzmann: FloatValue,

    /// Baseline solar constant $S_0$ ($\text{W/m}^2$).
    /// Default: 1368.0
    pub solar_constant: FloatValue,

    /// Planetary radius (m).
    /// Default: 6.371e6
    pub earth_radius: FloatValue,

    /// Total emissivity of the surface (dimensionless).
    /// 1 is an ideal black body.
    /// Default: 1.0
    pub emissivity: FloatValue,

    /// Atmospheric transmissivity for outgoing longwave radiation (dimensionless).
    /// Default: 0.63
    pub transmissivity: FloatValue,

    /// Atmospheric albedo (dimensionless).
    /// Default: 0.2
    pub sky_albedo: FloatValue,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            stefan_boltzmann: 5.6696e-8,
            solar_constant: 1368.0,
            earth_radius: 6.371e6,
            emissivity: 1.0,
            transmissivity: 0.63,
            sky_albedo: 0.2,
        }
    }
}

impl PhysicalConstants {
    /// Total surface area of the planet ($\text{m}^2$).
    ///
    /// $$A_E = 4 \pi R_E^2$$
    pub fn earth_area(&self) -> FloatValue {
        4.0 * PI * self.earth_radius * self.earth_radius
    }

    /// Circumference of a parallel at the given latitude (m)
    pub fn parallel_length(&self, latitude_degrees: FloatValue) -> FloatValue {
        2.0 * PI * self.earth_radius * latitude_degrees.to_radians().cos()
    }
}

/// Surface materials with tabulated thermal properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    Land,
    Ocean,
    Ice,
}

/// Thermal and optical properties of a surface material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceProperties {
    /// Surface albedo (dimensionless)
    pub albedo: FloatValue,
    /// unit: kg / m^3
    pub density: FloatValue,
    /// unit: J / kg / K
    pub heat_capacity: FloatValue,
    /// Depth of the layer that exchanges heat on the timescales of interest
    /// unit: m
    pub scale_depth: FloatValue,
}

impl SurfaceType {
    pub fn properties(&self) -> SurfaceProperties {
        match self {
            SurfaceType::Land => SurfaceProperties {
                albedo: 0.4,
                density: 2500.0,
                heat_capacity: 790.0,
                scale_depth: 1.0,
            },
            SurfaceType::Ocean => SurfaceProperties {
                albedo: 0.1,
                density: 1028.0,
                heat_capacity: 4187.0,
                scale_depth: 70.0,
            },
            SurfaceType::Ice => SurfaceProperties {
                albedo: 0.6,
                density: 900.0,
                heat_capacity: 2060.0,
                scale_depth: 1.0,
            },
        }
    }
}
