//! Client for the Growatt solar monitoring web API.
//!
//! ```no_run
//! # async fn run() -> Result<(), growatt_rs::Error> {
//! let mut api = growatt_rs::api::api("user".to_string(), "secret".to_string())?;
//! for plant in growatt_rs::plants(&mut api).await? {
//!     println!("{}: {} W", plant.name, plant.current_power);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod model;

pub use api::{inverter_energy, inverters, login, plant_energy, plants, Error};
