pub mod get_device_list;
pub mod get_inverter_data;
pub mod get_plant_detail;
pub mod get_plant_list;
pub mod login;

use num_derive::FromPrimitive;
use serde::Deserialize;

/* Vendor error codes with a dedicated meaning */
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ErrCode {
    LoginFailed = 502,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorBack {
    pub err_code: String,
    pub success: bool,
}

/* Generic error, may be present in any response */
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub back: ErrorBack,
}

impl ErrorResponse {
    /// Decode `body` as an error envelope. Bodies of any other shape are not errors.
    pub fn sniff(body: &[u8]) -> Option<ErrorResponse> {
        serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .filter(|e| !e.back.err_code.is_empty())
    }

    /// Known vendor code, matched on its exact decimal spelling (`"0502"` is not `502`).
    pub fn err_code(&self) -> Option<ErrCode> {
        self.back
            .err_code
            .parse::<u64>()
            .ok()
            .filter(|code| code.to_string() == self.back.err_code)
            .and_then(num::FromPrimitive::from_u64)
    }
}

#[cfg(test)]
mod test {
    use super::{ErrCode, ErrorResponse};
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn login() {
        let input = read_resource("LoginAPI.json");
        let output: super::login::Login = serde_json::from_str(&input).unwrap();
        assert_eq!(123456, output.back.user_id);
        assert_eq!(1, output.back.user_level);
        assert!(output.back.success);
    }

    #[test]
    fn get_plant_list() {
        let input = read_resource("PlantListAPI.json");
        let output: super::get_plant_list::GetPlantList = serde_json::from_str(&input).unwrap();
        assert_eq!(2, output.back.data.len());
        assert_eq!("Rooftop", output.back.data[0].plant_name);
        assert_eq!("1234", output.back.data[0].plant_id);
        assert_eq!("true", output.back.data[1].is_have_storage);
    }

    #[test]
    fn get_plant_detail() {
        let input = read_resource("newPlantDetailAPI_month.json");
        let output: super::get_plant_detail::GetPlantDetail =
            serde_json::from_str(&input).unwrap();
        assert_eq!(5, output.back.data.len());
        assert_eq!("11.7", output.back.data["02"]);
    }

    #[test]
    fn get_device_list() {
        let input = read_resource("newPlantAPI_deviceList.json");
        let output: super::get_device_list::GetDeviceList = serde_json::from_str(&input).unwrap();
        assert_eq!(1, output.device_list.len());
        assert_eq!("2345CD", output.device_list[0].device_sn);
        assert_eq!("My first inverter", output.device_list[0].device_ailas);
        assert_eq!(6, output.device_list[0].device_status);
    }

    #[test]
    fn get_inverter_data() {
        let input = read_resource("newInverterAPI.json");
        let output: super::get_inverter_data::GetInverterData =
            serde_json::from_str(&input).unwrap();
        assert_eq!(3, output.inv_pac_data.len());
        assert_eq!(131.0, output.inv_pac_data["2019-01-01 10:05"]);
    }

    #[test]
    fn error_envelope() {
        let input = read_resource("LoginAPI_502.json");
        let envelope = ErrorResponse::sniff(input.as_bytes()).unwrap();
        assert_eq!("502", envelope.back.err_code);
        assert_eq!(Some(ErrCode::LoginFailed), envelope.err_code());

        let other = ErrorResponse::sniff(br#"{"back":{"errCode":"10001"}}"#).unwrap();
        assert_eq!(None, other.err_code());
    }

    #[test]
    fn error_code_must_be_spelled_exactly() {
        for code in ["0502", "+502", " 502", "502.0"].iter() {
            let body = format!(r#"{{"back":{{"errCode":"{}"}}}}"#, code);
            let envelope = ErrorResponse::sniff(body.as_bytes()).unwrap();
            assert_eq!(None, envelope.err_code(), "code {:?}", code);
        }
    }

    #[test]
    fn non_error_bodies_are_not_sniffed() {
        assert!(ErrorResponse::sniff(read_resource("LoginAPI.json").as_bytes()).is_none());
        assert!(ErrorResponse::sniff(read_resource("newInverterAPI.json").as_bytes()).is_none());
        assert!(ErrorResponse::sniff(read_resource("invalid_json.json").as_bytes()).is_none());
        assert!(ErrorResponse::sniff(br#"{"back":{"errCode":""}}"#).is_none());
        assert!(ErrorResponse::sniff(b"[1, 2, 3]").is_none());
    }

    #[test]
    #[should_panic]
    fn get_plant_list_invalid_json() {
        let input = read_resource("invalid_json.json");
        let _output: super::get_plant_list::GetPlantList = serde_json::from_str(&input).unwrap();
    }

    #[test]
    #[should_panic]
    fn get_plant_detail_without_back() {
        let input = read_resource("newInverterAPI.json");
        let _output: super::get_plant_detail::GetPlantDetail =
            serde_json::from_str(&input).unwrap();
    }
}
