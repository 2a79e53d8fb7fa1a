mod zonal_ebm;

pub use zonal_ebm::{
    ZonalEnergyBalance, REFERENCE_HORIZON_YEARS, REFERENCE_INITIAL_TEMPERATURES,
    REFERENCE_MAX_STEP_DAYS,
};
