use growatt_rs::model::{Api, Inverter, Plant};
use prometheus::{Encoder, GaugeVec, TextEncoder};

lazy_static! {
    static ref PLANT_CURRENT_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("plant_current_power", "current power output of plant (in W)"),
        &["plant_id", "plant_name"],
    )
    .unwrap();
    static ref PLANT_ENERGY_TODAY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "plant_energy_today",
            "total amount of energy generated by plant in current day (in kWh)",
        ),
        &["plant_id", "plant_name"],
    )
    .unwrap();
    static ref PLANT_ENERGY_TOTAL_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "plant_energy_total",
            "lifetime amount of energy generated by plant (in kWh)",
        ),
        &["plant_id", "plant_name"],
    )
    .unwrap();
    static ref INVERTER_CURRENT_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("inverter_current_power", "current power output reported by inverter (in W)"),
        &["plant_id", "serial", "datalog_serial"],
    )
    .unwrap();
    static ref INVERTER_ENERGY_TODAY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "inverter_energy_today",
            "amount of energy generated by inverter in current day (in kWh)",
        ),
        &["plant_id", "serial", "datalog_serial"],
    )
    .unwrap();
    static ref INVERTER_ENERGY_TOTAL_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "inverter_energy_total",
            "lifetime amount of energy generated by inverter (in kWh)",
        ),
        &["plant_id", "serial", "datalog_serial"],
    )
    .unwrap();
    static ref INVERTER_STATUS_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("inverter_status", "vendor status code reported by inverter"),
        &["plant_id", "serial", "datalog_serial"],
    )
    .unwrap();
    static ref INVERTER_LOST_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("inverter_lost", "1 if the inverter lost connection to the datalogger"),
        &["plant_id", "serial", "datalog_serial"],
    )
    .unwrap();
}

fn process_plant(plant: &Plant) {
    let plant_id = plant.id.to_string();
    let labels = [plant_id.as_str(), plant.name.as_str()];

    PLANT_CURRENT_POWER_GAUGE
        .with_label_values(&labels)
        .set(plant.current_power);
    PLANT_ENERGY_TODAY_GAUGE
        .with_label_values(&labels)
        .set(plant.energy_today);
    PLANT_ENERGY_TOTAL_GAUGE
        .with_label_values(&labels)
        .set(plant.energy_total);
}

fn process_inverter(inverter: &Inverter, plant: &Plant) {
    let plant_id = plant.id.to_string();
    let labels = [
        plant_id.as_str(),
        inverter.serial.as_str(),
        inverter.datalog_serial.as_str(),
    ];

    INVERTER_CURRENT_POWER_GAUGE
        .with_label_values(&labels)
        .set(inverter.current_power);
    INVERTER_ENERGY_TODAY_GAUGE
        .with_label_values(&labels)
        .set(inverter.energy_today);
    INVERTER_ENERGY_TOTAL_GAUGE
        .with_label_values(&labels)
        .set(inverter.energy_total);
    INVERTER_STATUS_GAUGE
        .with_label_values(&labels)
        .set(inverter.status as f64);
    INVERTER_LOST_GAUGE
        .with_label_values(&labels)
        .set(if inverter.is_lost { 1.0 } else { 0.0 });
}

/// Collect all plant and inverter metrics from `api`, updating Prometheus exporter registry.
pub async fn collect(api: &mut Api) -> Result<(), growatt_rs::Error> {
    let plants = growatt_rs::plants(api).await?;

    for plant in plants {
        process_plant(&plant);

        match growatt_rs::inverters(api, plant.id).await {
            Ok(inverters) => {
                if inverters.is_empty() {
                    log::warn!("No inverters returned for plant: {}", plant.id);
                }
                for inverter in inverters.iter() {
                    process_inverter(inverter, &plant);
                }
            }
            Err(e) => log::error!("Unable to list inverters of plant {}: {}", plant.id, e),
        }
    }

    Ok(())
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        log::error!("Unable to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
