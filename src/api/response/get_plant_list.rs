use serde::Deserialize;

/* Every field arrives as a string, numbers included (e.g. `"todayEnergy": "1.2 kWh"`) */
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Data {
    pub plant_money_text: String,
    pub plant_name: String,
    pub plant_id: String,
    pub is_have_storage: String,
    pub today_energy: String,
    pub total_energy: String,
    pub current_power: String,
}

#[derive(Deserialize)]
pub struct Back {
    pub data: Vec<Data>,
}

#[derive(Deserialize)]
pub struct GetPlantList {
    pub back: Back,
}
