pub mod errors;
pub mod forcing;
pub mod ivp;
pub mod run;
pub mod solver;
pub mod spatial;
pub mod state;
pub mod timeseries;
pub mod trajectory;
