use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInverterData {
    /// `"YYYY-MM-DD HH:MM"` to power, as a JSON number unlike the plant endpoints
    pub inv_pac_data: HashMap<String, f64>,
}
