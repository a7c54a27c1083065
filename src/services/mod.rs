pub mod charge;

pub use charge::{ChargeService, ProcessChargeCommand, ProcessedCharge};
