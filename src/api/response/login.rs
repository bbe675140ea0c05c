use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Back {
    pub user_id: i64,
    pub user_level: i64,
    pub success: bool,
}

#[derive(Deserialize)]
pub struct Login {
    #[serde(default)]
    pub back: Back,
}
