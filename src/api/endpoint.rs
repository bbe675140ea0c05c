pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/LoginAPI.do";
pub const PLANT_DETAIL: &Endpoint = "newPlantDetailAPI.do";
pub const PLANT_LIST: &Endpoint = "/PlantListAPI.do";
pub const PLANT: &Endpoint = "/newPlantAPI.do";
pub const INVERTER: &Endpoint = "newInverterAPI.do";

/* Values of the `op` query parameter */
pub const OP_DEVICE_LIST: &str = "getAllDeviceListThree";
pub const OP_INVERTER_DATA: &str = "getInverterData";
