use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
pub struct Back {
    /// Date key (relative to the queried date) to power string
    pub data: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct GetPlantDetail {
    pub back: Back,
}
