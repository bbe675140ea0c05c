use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Data {
    pub lost: bool,
    pub inv_type: String,
    pub e_today: String,
    pub location: String,
    /* sic */
    pub device_ailas: String,
    pub device_type: String,
    pub datalog_sn: String,
    pub device_sn: String,
    pub power: String,
    pub device_status: i64,
    pub energy: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDeviceList {
    pub device_list: Vec<Data>,
}
