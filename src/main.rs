#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use growatt_rs::api;
use growatt_rs::model::{Api, Inverter, Plant};
use rocket::{Build, Rocket, State};
use std::sync::Mutex;
use std::time::{Duration, Instant};

mod metrics;

#[derive(Clone, serde::Deserialize)]
pub struct GrowattConfig {
    api_url: String,
    username: String,
    password: String,
    /// Minimum number of seconds between two collections
    interval: u64,
}

/// Exporter state shared by the route handlers.
pub struct Exporter {
    /// Handlers take turns on the client since every call may refresh its session.
    api: tokio::sync::Mutex<Api>,
    interval: Duration,
    last_collected: Mutex<Option<Instant>>,
}

impl Exporter {
    fn new(api: Api, interval: Duration) -> Self {
        Exporter {
            api: tokio::sync::Mutex::new(api),
            interval,
            last_collected: Mutex::new(None),
        }
    }

    /// True before the first collection and once `interval` has passed since the last one.
    fn collection_due(&self) -> bool {
        match self.last_collected.lock() {
            Ok(last) => last.map_or(true, |at| at.elapsed() > self.interval),
            Err(_) => true,
        }
    }

    /// Client guard if a collection is due, checked again once the lock is held since another
    /// request may have collected while this one waited.
    async fn lock_for_collection(&self) -> Option<tokio::sync::MutexGuard<'_, Api>> {
        if !self.collection_due() {
            return None;
        }
        let api = self.api.lock().await;
        if self.collection_due() {
            Some(api)
        } else {
            None
        }
    }

    fn mark_collected(&self) {
        match self.last_collected.lock() {
            Ok(mut last) => *last = Some(Instant::now()),
            Err(_) => log::trace!("collection timestamp lock poisoned, will collect again"),
        }
    }
}

/// Read `GROWATT_USERNAME`, `GROWATT_PASSWORD`, `GROWATT_INTERVAL` and optional `GROWATT_API_URL`.
pub fn read_settings() -> Result<GrowattConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .set_default("api_url", api::API_URL)?
        .set_default("interval", 300i64)?
        .merge(config::Environment::with_prefix("GROWATT"))?;

    settings.try_into()
}

#[get("/metrics")]
async fn metrics_route(exporter: &State<Exporter>) -> Result<String, api::Error> {
    match exporter.lock_for_collection().await {
        Some(mut api) => {
            metrics::collect(&mut api).await?;
            exporter.mark_collected();
        }
        None => log::info!(
            "collected less than {:?} ago; serving previous values",
            exporter.interval
        ),
    }
    Ok(metrics::read())
}

#[get("/dump-plants")]
async fn dump_plants_route(exporter: &State<Exporter>) -> Result<String, api::Error> {
    let mut api = exporter.api.lock().await;
    let mut dump: Vec<(Plant, Vec<Inverter>)> = Vec::new();

    for plant in growatt_rs::plants(&mut api).await? {
        let inverters = growatt_rs::inverters(&mut api, plant.id).await?;
        dump.push((plant, inverters));
    }

    Ok(format!("{:#?}", dump))
}

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings = read_settings().expect("Configuration error");
    let api = api::api_with_url(settings.api_url, settings.username, settings.password)
        .expect("Unable to build HTTP client");

    rocket::build()
        .manage(Exporter::new(api, Duration::from_secs(settings.interval)))
        .mount("/", routes![metrics_route, dump_plants_route])
}
