//! Validated, immutable model parameters

use super::physical::{PhysicalConstants, SurfaceType};
use super::zones::{BoundaryConfig, ZoneConfig};
use log::debug;
use rsebm_core::errors::{RSEBMError, RSEBMResult};
use rsebm_core::spatial::ZonalGrid;
use rsebm_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Allowed deviation of the summed zone area fractions from 1
const AREA_FRACTION_TOLERANCE: FloatValue = 1e-6;

/// Allowed deviation of $4 \sum_i a_i \gamma_i$ from 1
const INSOLATION_PARTITION_TOLERANCE: FloatValue = 1e-3;

/// Raw parameter payload for a zonal energy balance model.
///
/// This is the form the parameters take in configuration files.
/// It is turned into a [`ParameterStore`] once it has been validated.
///
/// # Default Values
///
/// The default is the six-zone reference model: 30° latitude bands ordered from the north
/// pole to the south pole.
///
/// | Zone | Latitudes | Surface |
/// |------|-----------|---------|
/// | 1 | 60°N - 90°N | ice |
/// | 2 | 30°N - 60°N | land |
/// | 3 | 0° - 30°N | ocean |
/// | 4 | 30°S - 0° | ocean |
/// | 5 | 60°S - 30°S | ocean |
/// | 6 | 90°S - 60°S | ice |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub constants: PhysicalConstants,
    pub zones: Vec<ZoneConfig>,
    pub boundaries: Vec<BoundaryConfig>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        let constants = PhysicalConstants::default();

        let zones = vec![
            ZoneConfig::from_latitude_band("Zone 1", 60.0, 90.0, SurfaceType::Ice),
            ZoneConfig::from_latitude_band("Zone 2", 30.0, 60.0, SurfaceType::Land),
            ZoneConfig::from_latitude_band("Zone 3", 0.0, 30.0, SurfaceType::Ocean),
            ZoneConfig::from_latitude_band("Zone 4", -30.0, 0.0, SurfaceType::Ocean),
            ZoneConfig::from_latitude_band("Zone 5", -60.0, -30.0, SurfaceType::Ocean),
            ZoneConfig::from_latitude_band("Zone 6", -90.0, -60.0, SurfaceType::Ice),
        ];

        // Exchange coefficients in W / m / K
        let boundaries = vec![
            BoundaryConfig::new(0, constants.parallel_length(60.0), 1.2e7),
            BoundaryConfig::new(1, constants.parallel_length(30.0), 2.5e7),
            BoundaryConfig::new(2, constants.parallel_length(0.0), 1.0e7),
            BoundaryConfig::new(3, constants.parallel_length(-30.0), 2.5e7),
            BoundaryConfig::new(4, constants.parallel_length(-60.0), 1.2e7),
        ];

        Self {
            constants,
            zones,
            boundaries,
        }
    }
}

impl ModelParameters {
    /// A model consisting of a single zone covering the whole planet
    pub fn single_zone(constants: PhysicalConstants, surface: SurfaceType) -> Self {
        Self {
            constants,
            zones: vec![ZoneConfig::from_latitude_band(
                "Global", -90.0, 90.0, surface,
            )],
            boundaries: vec![],
        }
    }
}

/// Immutable, validated model parameters.
///
/// A store can only be created through [`ParameterStore::new`], so every store in
/// existence satisfies:
///
/// - at least one zone, with area fractions summing to 1
/// - insolation weights partitioning the intercepted disc: $4 \sum_i a_i \gamma_i = 1$
/// - strictly positive densities, heat capacities and scale depths
/// - exactly one boundary between each pair of neighbouring zones, with non-negative
///   length and exchange coefficient
///
/// Each independent run should hold its own store (typically behind an `Arc`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterStore {
    parameters: ModelParameters,
    #[serde(skip)]
    zone_areas: Vec<FloatValue>,
}

impl ParameterStore {
    pub fn new(parameters: ModelParameters) -> RSEBMResult<Self> {
        validate(&parameters)?;

        let earth_area = parameters.constants.earth_area();
        let zone_areas = parameters
            .zones
            .iter()
            .map(|z| z.area_fraction * earth_area)
            .collect();

        debug!(
            "Created parameter store with {} zones and {} boundaries",
            parameters.zones.len(),
            parameters.boundaries.len()
        );

        Ok(Self {
            parameters,
            zone_areas,
        })
    }

    /// The reference six-zone model
    pub fn six_zone() -> RSEBMResult<Self> {
        Self::new(ModelParameters::default())
    }

    /// The full, validated parameter set
    pub fn get(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.parameters.constants
    }

    pub fn zones(&self) -> &[ZoneConfig] {
        &self.parameters.zones
    }

    pub fn boundaries(&self) -> &[BoundaryConfig] {
        &self.parameters.boundaries
    }

    pub fn n_zones(&self) -> usize {
        self.parameters.zones.len()
    }

    /// Surface area of each zone ($\text{m}^2$)
    pub fn zone_areas(&self) -> &[FloatValue] {
        &self.zone_areas
    }

    /// Grid for area-weighted aggregation of zonal values
    pub fn grid(&self) -> RSEBMResult<ZonalGrid> {
        ZonalGrid::with_weights(
            self.zones().iter().map(|z| z.name.clone()).collect(),
            self.zones().iter().map(|z| z.area_fraction).collect(),
        )
    }
}

impl TryFrom<ModelParameters> for ParameterStore {
    type Error = RSEBMError;

    fn try_from(parameters: ModelParameters) -> RSEBMResult<Self> {
        Self::new(parameters)
    }
}

fn invalid(message: String) -> RSEBMResult<()> {
    Err(RSEBMError::Configuration(message))
}

fn check_positive(name: &str, value: FloatValue) -> RSEBMResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return invalid(format!("{} must be strictly positive, got {}", name, value));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: FloatValue) -> RSEBMResult<()> {
    if !(value.is_finite() && value >= 0.0) {
        return invalid(format!("{} must be non-negative, got {}", name, value));
    }
    Ok(())
}

fn check_unit_interval(name: &str, value: FloatValue) -> RSEBMResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return invalid(format!("{} must lie in [0, 1], got {}", name, value));
    }
    Ok(())
}

fn validate(parameters: &ModelParameters) -> RSEBMResult<()> {
    let constants = &parameters.constants;
    check_positive("stefan_boltzmann", constants.stefan_boltzmann)?;
    check_positive("solar_constant", constants.solar_constant)?;
    check_positive("earth_radius", constants.earth_radius)?;
    check_unit_interval("emissivity", constants.emissivity)?;
    check_unit_interval("transmissivity", constants.transmissivity)?;
    check_unit_interval("sky_albedo", constants.sky_albedo)?;

    let zones = &parameters.zones;
    if zones.is_empty() {
        return invalid("At least one zone is required".to_string());
    }

    for zone in zones {
        check_positive(&format!("{}: gamma", zone.name), zone.gamma)?;
        check_positive(&format!("{}: area_fraction", zone.name), zone.area_fraction)?;
        check_unit_interval(&format!("{}: albedo", zone.name), zone.albedo)?;
        check_positive(&format!("{}: density", zone.name), zone.density)?;
        check_positive(&format!("{}: heat_capacity", zone.name), zone.heat_capacity)?;
        check_positive(&format!("{}: scale_depth", zone.name), zone.scale_depth)?;
    }

    let area_total: FloatValue = zones.iter().map(|z| z.area_fraction).sum();
    if (area_total - 1.0).abs() > AREA_FRACTION_TOLERANCE {
        return invalid(format!(
            "Zone area fractions must sum to 1, got {}",
            area_total
        ));
    }

    let insolation_total: FloatValue =
        4.0 * zones.iter().map(|z| z.area_fraction * z.gamma).sum::<FloatValue>();
    if (insolation_total - 1.0).abs() > INSOLATION_PARTITION_TOLERANCE {
        return invalid(format!(
            "Insolation weights must partition the intercepted disc (4 * sum(a * gamma) = 1), got {}",
            insolation_total
        ));
    }

    let boundaries = &parameters.boundaries;
    if boundaries.len() != zones.len() - 1 {
        return invalid(format!(
            "{} zones need {} boundaries, got {}",
            zones.len(),
            zones.len() - 1,
            boundaries.len()
        ));
    }
    for (i, boundary) in boundaries.iter().enumerate() {
        if boundary.between != [i, i + 1] {
            return invalid(format!(
                "Boundary {} must join zones [{}, {}], got {:?}",
                i,
                i,
                i + 1,
                boundary.between
            ));
        }
        check_non_negative(&format!("Boundary {}: length", i), boundary.length)?;
        check_non_negative(
            &format!("Boundary {}: exchange_coefficient", i),
            boundary.exchange_coefficient,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_invalid(parameters: ModelParameters) {
        match ParameterStore::new(parameters) {
            Err(RSEBMError::Configuration(_)) => {}
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_store_is_valid() {
        let store = ParameterStore::six_zone().unwrap();
        assert_eq!(store.n_zones(), 6);
        assert_eq!(store.boundaries().len(), 5);

        let total_area: FloatValue = store.zone_areas().iter().sum();
        assert_relative_eq!(total_area, store.constants().earth_area(), max_relative = 1e-12);
    }

    #[test]
    fn test_default_zones_are_pole_to_pole() {
        let store = ParameterStore::six_zone().unwrap();
        let zones = store.zones();
        assert_eq!(zones[0].albedo, 0.6);
        assert_eq!(zones[5].albedo, 0.6);
        assert_relative_eq!(zones[0].gamma, zones[5].gamma, epsilon = 1e-12);
        assert_relative_eq!(zones[2].gamma, zones[3].gamma, epsilon = 1e-12);
        assert!(zones[2].gamma > zones[1].gamma && zones[1].gamma > zones[0].gamma);
        assert_eq!(store.boundaries()[2].between, [2, 3]);
    }

    #[test]
    fn test_grid_weights_follow_area() {
        let store = ParameterStore::six_zone().unwrap();
        let grid = store.grid().unwrap();
        assert_eq!(grid.size(), 6);
        assert_relative_eq!(grid.aggregate_global(&[1.0; 6]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_zone() {
        let store = ParameterStore::new(ModelParameters::single_zone(
            PhysicalConstants::default(),
            SurfaceType::Ocean,
        ))
        .unwrap();
        assert_eq!(store.n_zones(), 1);
        assert!(store.boundaries().is_empty());
        assert_relative_eq!(store.zones()[0].gamma, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_area_fractions_must_sum_to_one() {
        let mut parameters = ModelParameters::default();
        parameters.zones[0].area_fraction *= 1.1;
        assert_invalid(parameters);
    }

    #[test]
    fn test_insolation_partition() {
        let mut parameters = ModelParameters::default();
        parameters.zones[2].gamma *= 1.5;
        assert_invalid(parameters);
    }

    #[test]
    fn test_thermal_properties_must_be_positive() {
        let mut parameters = ModelParameters::default();
        parameters.zones[3].density = 0.0;
        assert_invalid(parameters);

        let mut parameters = ModelParameters::default();
        parameters.zones[1].heat_capacity = -790.0;
        assert_invalid(parameters);

        let mut parameters = ModelParameters::default();
        parameters.zones[4].scale_depth = FloatValue::NAN;
        assert_invalid(parameters);
    }

    #[test]
    fn test_boundaries_must_be_non_negative() {
        let mut parameters = ModelParameters::default();
        parameters.boundaries[1].exchange_coefficient = -1.0;
        assert_invalid(parameters);

        let mut parameters = ModelParameters::default();
        parameters.boundaries[4].length = -1.0;
        assert_invalid(parameters);

        // Zero coupling is allowed
        let mut parameters = ModelParameters::default();
        parameters.boundaries[0].exchange_coefficient = 0.0;
        assert!(ParameterStore::new(parameters).is_ok());
    }

    #[test]
    fn test_boundaries_must_join_neighbours() {
        let mut parameters = ModelParameters::default();
        parameters.boundaries[2].between = [2, 4];
        assert_invalid(parameters);

        let mut parameters = ModelParameters::default();
        parameters.boundaries.pop();
        assert_invalid(parameters);
    }

    #[test]
    fn test_constants_are_checked() {
        let mut parameters = ModelParameters::default();
        parameters.constants.transmissivity = 1.2;
        assert_invalid(parameters);

        let mut parameters = ModelParameters::default();
        parameters.constants.solar_constant = 0.0;
        assert_invalid(parameters);
    }

    #[test]
    fn test_no_zones() {
        assert_invalid(ModelParameters {
            constants: PhysicalConstants::default(),
            zones: vec![],
            boundaries: vec![],
        });
    }

    #[test]
    fn test_serialization_round_trip() {
        let parameters = ModelParameters::default();
        let json = serde_json::to_string(&parameters).unwrap();
        let parsed: ModelParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, parameters);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut parameters = ModelParameters::default();
        parameters.boundaries[2].exchange_coefficient = 0.0;

        let serialised = toml::to_string(&parameters).unwrap();
        let parsed: ModelParameters = toml::from_str(&serialised).unwrap();
        assert_eq!(parsed, parameters);
        assert!(ParameterStore::new(parsed).is_ok());
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"constants": {"solar_constant": 1361.0}}"#;
        let parameters: ModelParameters = serde_json::from_str(json).unwrap();
        assert_eq!(parameters.constants.solar_constant, 1361.0);
        assert_eq!(parameters.zones.len(), 6);
        assert!(ParameterStore::new(parameters).is_ok());
    }
}
