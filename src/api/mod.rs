pub mod endpoint;
pub mod error;
pub mod parse;
pub mod response;

use crate::model;
use chrono::NaiveDate;
pub use error::Error;
use http::header::{CONTENT_TYPE, COOKIE};
use http::{Method, StatusCode};
use response::get_device_list::{self, GetDeviceList};
use response::get_inverter_data::GetInverterData;
use response::get_plant_detail::GetPlantDetail;
use response::get_plant_list::{self, GetPlantList};
use response::login::Login;
use response::{ErrCode, ErrorResponse};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

pub const API_URL: &str = "https://server.growatt.com";

const COOKIE_SESSION_ID: &str = "JSESSIONID";
const COOKIE_SERVER_ID: &str = "SERVERID";

/* Meaning of other values is undocumented; they return data in different units */
const INVERTER_DATA_TYPE: &str = "1";
/* No pagination, only the first page is ever requested */
const DEVICE_LIST_PAGE_NUM: &str = "1";
const DEVICE_LIST_PAGE_SIZE: &str = "1";

pub fn api(username: String, password: String) -> Result<model::Api, Error> {
    api_with_url(API_URL.to_string(), username, password)
}

/// Same as `api()`, talking to `api_url` instead of the public Growatt server.
pub fn api_with_url(
    api_url: String,
    username: String,
    password: String,
) -> Result<model::Api, Error> {
    let client = reqwest::ClientBuilder::new().build()?;

    Ok(model::Api {
        api_url,
        username,
        password,
        session: model::Session::default(),
        client,
    })
}

/// Join `path` (with or without leading `/`) and an already encoded `query` onto `base`.
pub fn api_url(base: &str, path: &endpoint::Endpoint, query: &str) -> String {
    let glue = if path.starts_with('/') { "" } else { "/" };
    let query = if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    };

    format!("{}{}{}{}", base, glue, path, query)
}

fn encode(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice::<T>(body).map_err(|e| {
        log::debug!(
            "unable to decode response ({}): {}",
            e,
            String::from_utf8_lossy(body)
        );
        Error::from(e)
    })
}

/// Process the body of a 200 response to identify an API-level error, indicated by a non-empty
/// `back.errCode`. Bodies which do not look like an error envelope pass.
fn map_response_status(body: &[u8]) -> Result<(), Error> {
    match ErrorResponse::sniff(body) {
        None => Ok(()),
        Some(response) => match response.err_code() {
            Some(ErrCode::LoginFailed) => Err(Error::LoginError),
            None => Err(Error::ApiError(response.back.err_code)),
        },
    }
}

/// Record the session cookies of a login response. Both are stored or neither is.
fn harvest_cookies(api: &mut model::Api, cookies: Vec<(String, String)>) {
    let mut session_id = None;
    let mut server_id = None;

    for (name, value) in cookies {
        match name.as_str() {
            COOKIE_SESSION_ID => session_id = Some(value),
            COOKIE_SERVER_ID => server_id = Some(value),
            _ => {}
        }
    }

    match (session_id, server_id) {
        (Some(session_id), Some(server_id)) => {
            api.session.session_id = session_id;
            api.session.server_id = server_id;
        }
        _ => log::warn!(
            "login response is missing {} or {} cookie, session not updated",
            COOKIE_SESSION_ID,
            COOKIE_SERVER_ID
        ),
    }
}

/// Send a single request and return the raw response body.
///
/// `data` is the encoded query string for GET and the form body for POST.
async fn dispatch(
    api: &mut model::Api,
    method: Method,
    path: &endpoint::Endpoint,
    data: &str,
) -> Result<Vec<u8>, Error> {
    let is_login = path == endpoint::LOGIN;
    let is_post = method == Method::POST;
    let url = if is_post {
        api_url(&api.api_url, path, "")
    } else {
        api_url(&api.api_url, path, data)
    };

    log::debug!("{} {}", method, url);

    let mut request = api.client.request(method, url);
    if is_post {
        request = request
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(data.to_owned());
    }
    if !is_login {
        request = request.header(
            COOKIE,
            format!(
                "{}={}; {}={}",
                COOKIE_SESSION_ID, api.session.session_id, COOKIE_SERVER_ID, api.session.server_id
            ),
        );
    }

    let response = request.send().await?;
    if response.status() != StatusCode::OK {
        return Err(Error::HttpError(response.status().to_string()));
    }

    let cookies: Vec<(String, String)> = response
        .cookies()
        .map(|c| (c.name().to_owned(), c.value().to_owned()))
        .collect();
    let body = response.bytes().await?.to_vec();

    log::trace!(
        "endpoint: {}, response_text: {}",
        path,
        String::from_utf8_lossy(&body)
    );

    map_response_status(&body)?;

    if is_login {
        harvest_cookies(api, cookies);
    }

    Ok(body)
}

/// Like `dispatch()`, logging in first when there is no active session.
async fn call(
    api: &mut model::Api,
    method: Method,
    path: &endpoint::Endpoint,
    data: &str,
) -> Result<Vec<u8>, Error> {
    if !api.session.is_active() && path != endpoint::LOGIN {
        login(api).await?;
    }
    dispatch(api, method, path, data).await
}

/// Log in and record the session cookies, user id and user level.
///
/// Called implicitly by every other operation while the session is not active.
pub async fn login(api: &mut model::Api) -> Result<(), Error> {
    log::debug!("logging in as {}", api.username);

    let password = parse::hash_password(&api.password);
    let data = encode(&[
        ("userName", api.username.as_str()),
        ("password", password.as_str()),
    ]);

    let body = dispatch(api, Method::POST, endpoint::LOGIN, &data).await?;
    let response: Login = decode(&body)?;

    api.session.user_id = response.back.user_id;
    api.session.user_level = response.back.user_level;

    Ok(())
}

fn plant(data: get_plant_list::Data) -> model::Plant {
    model::Plant {
        id: parse::id_or_zero(&data.plant_id),
        name: data.plant_name,
        earned: data.plant_money_text,
        has_storage: parse::parse_flag(&data.is_have_storage),
        energy_today: parse::power_or_zero(&data.today_energy),
        energy_total: parse::power_or_zero(&data.total_energy),
        current_power: parse::power_or_zero(&data.current_power),
    }
}

fn inverter(data: get_device_list::Data) -> model::Inverter {
    model::Inverter {
        serial: data.device_sn,
        datalog_serial: data.datalog_sn,
        alias: data.device_ailas,
        location: data.location,
        inverter_type: data.inv_type,
        device_type: data.device_type,
        is_lost: data.lost,
        status: data.device_status,
        energy_today: parse::power_or_zero(&data.e_today),
        energy_total: parse::power_or_zero(&data.energy),
        current_power: parse::power_or_zero(&data.power),
    }
}

/// List all plants of the logged in user.
pub async fn plants(api: &mut model::Api) -> Result<Vec<model::Plant>, Error> {
    let body = call(api, Method::GET, endpoint::PLANT_LIST, "").await?;
    let response: GetPlantList = decode(&body)?;

    Ok(response.back.data.into_iter().map(plant).collect())
}

/// Energy series of plant `plant_id`, aggregated by the granularity `date` selects:
/// `""` for the lifetime, `"2019"` for a year, `"2019-01"` for a month, `"2019-01-01"` for a day.
///
/// Entries with an unparseable date key or power value are skipped. Order is unspecified.
pub async fn plant_energy(
    api: &mut model::Api,
    plant_id: i64,
    date: &str,
) -> Result<Vec<model::TimeEnergy>, Error> {
    let span = parse::timespan(date)?;
    let plant_id = plant_id.to_string();
    let span_code = (span as u8).to_string();
    let query = encode(&[
        ("plantId", plant_id.as_str()),
        ("type", span_code.as_str()),
        ("date", date),
    ]);

    let body = call(api, Method::GET, endpoint::PLANT_DETAIL, &query).await?;
    let response: GetPlantDetail = decode(&body)?;

    let series = response
        .back
        .data
        .iter()
        .filter_map(|(key, value)| {
            let entry = parse::series_timestamp(span, date, key).and_then(|timestamp| {
                value
                    .parse::<f64>()
                    .ok()
                    .map(|power| model::TimeEnergy { timestamp, power })
            });
            if entry.is_none() {
                log::debug!("skipping plant energy entry {:?}: {:?}", key, value);
            }
            entry
        })
        .collect();

    Ok(series)
}

/// List inverters of plant `plant_id`.
pub async fn inverters(
    api: &mut model::Api,
    plant_id: i64,
) -> Result<Vec<model::Inverter>, Error> {
    let plant_id = plant_id.to_string();
    let query = encode(&[
        ("op", endpoint::OP_DEVICE_LIST),
        ("plantId", plant_id.as_str()),
        ("pageNum", DEVICE_LIST_PAGE_NUM),
        ("pageSize", DEVICE_LIST_PAGE_SIZE),
    ]);

    let body = call(api, Method::GET, endpoint::PLANT, &query).await?;
    let response: GetDeviceList = decode(&body)?;

    Ok(response.device_list.into_iter().map(inverter).collect())
}

/// Power series of the inverter with serial number `serial` over the day `date`.
///
/// Unlike `plant_energy()` only a timespan of a day is supported. Entries with an unparseable
/// timestamp are skipped. Order is unspecified.
pub async fn inverter_energy(
    api: &mut model::Api,
    serial: &str,
    date: NaiveDate,
) -> Result<Vec<model::TimeEnergy>, Error> {
    let date = date.format("%Y-%m-%d").to_string();
    let query = encode(&[
        ("op", endpoint::OP_INVERTER_DATA),
        ("id", serial),
        ("type", INVERTER_DATA_TYPE),
        ("date", date.as_str()),
    ]);

    let body = call(api, Method::GET, endpoint::INVERTER, &query).await?;
    let response: GetInverterData = decode(&body)?;

    let series = response
        .inv_pac_data
        .iter()
        .filter_map(|(key, &power)| match parse::minute_timestamp(key) {
            Some(timestamp) => Some(model::TimeEnergy { timestamp, power }),
            None => {
                log::debug!("skipping inverter energy entry {:?}", key);
                None
            }
        })
        .collect();

    Ok(series)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn api_url_joins_path_and_query() {
        assert_eq!(
            "https://server.growatt.com/foo?foo=bar",
            api_url(API_URL, "/foo", "foo=bar")
        );
        assert_eq!("https://server.growatt.com/foo", api_url(API_URL, "foo", ""));
        assert_eq!(
            "https://server.growatt.com/newInverterAPI.do?op=x",
            api_url(API_URL, endpoint::INVERTER, "op=x")
        );
    }

    #[test]
    fn encode_escapes_values() {
        assert_eq!(
            "userName=foo+bar&password=a%26b",
            encode(&[("userName", "foo bar"), ("password", "a&b")])
        );
    }

    #[test]
    fn new_api_keeps_credentials_and_has_no_session() {
        let api = api("foo".to_string(), "bar".to_string()).unwrap();
        assert_eq!("foo", api.username());
        assert_eq!("bar", api.password);
        assert_eq!(API_URL, api.api_url);
        assert!(!api.is_logged_in());
    }

    #[test]
    fn plant_conversion() {
        let p = plant(get_plant_list::Data {
            plant_money_text: "foo".to_string(),
            plant_name: "bar".to_string(),
            plant_id: "1234".to_string(),
            is_have_storage: "true".to_string(),
            today_energy: "123.4 kWh".to_string(),
            total_energy: "456.7 kWH".to_string(),
            current_power: "890.1 W".to_string(),
        });

        assert_eq!("foo", p.earned);
        assert_eq!("bar", p.name);
        assert_eq!(1234, p.id);
        assert!(p.has_storage);
        assert_eq!(123.4, p.energy_today);
        assert_eq!(456.7, p.energy_total);
        assert_eq!(890.1, p.current_power);
    }

    #[test]
    fn plant_conversion_tolerates_garbage() {
        let p = plant(get_plant_list::Data {
            plant_id: "n/a".to_string(),
            is_have_storage: "True".to_string(),
            today_energy: "abc".to_string(),
            ..Default::default()
        });

        assert_eq!(0, p.id);
        assert!(!p.has_storage);
        assert_eq!(0.0, p.energy_today);
        assert_eq!(0.0, p.energy_total);
        assert_eq!(0.0, p.current_power);
    }

    #[test]
    fn inverter_conversion() {
        let i = inverter(get_device_list::Data {
            lost: true,
            inv_type: "foo".to_string(),
            e_today: "1.2".to_string(),
            location: "Shanghai".to_string(),
            device_ailas: "My first inverter".to_string(),
            device_type: "inverter".to_string(),
            datalog_sn: "1234AB".to_string(),
            device_sn: "2345CD".to_string(),
            power: "2.3".to_string(),
            device_status: 6,
            energy: "4.5".to_string(),
        });

        assert!(i.is_lost);
        assert_eq!("foo", i.inverter_type);
        assert_eq!(1.2, i.energy_today);
        assert_eq!("Shanghai", i.location);
        assert_eq!("My first inverter", i.alias);
        assert_eq!("inverter", i.device_type);
        assert_eq!("1234AB", i.datalog_serial);
        assert_eq!("2345CD", i.serial);
        assert_eq!(2.3, i.current_power);
        assert_eq!(6, i.status);
        assert_eq!(4.5, i.energy_total);
    }

    #[test]
    fn error_envelope_maps_to_error() {
        assert_eq!(
            Err(Error::LoginError),
            map_response_status(br#"{"back":{"errCode":"502","success":false}}"#)
        );
        assert_eq!(
            Err(Error::ApiError("10001".to_string())),
            map_response_status(br#"{"back":{"errCode":"10001","success":false}}"#)
        );
        assert_eq!(Ok(()), map_response_status(br#"{"back":{"success":true}}"#));
        assert_eq!(Ok(()), map_response_status(b"not json"));
    }

    #[test]
    fn padded_login_code_is_generic_api_error() {
        assert_eq!(
            Err(Error::ApiError("0502".to_string())),
            map_response_status(br#"{"back":{"errCode":"0502","success":false}}"#)
        );
        assert_eq!(
            Err(Error::ApiError("+502".to_string())),
            map_response_status(br#"{"back":{"errCode":"+502","success":false}}"#)
        );
    }

    #[test]
    fn harvest_cookies_sets_both_or_neither() {
        let mut api = api("foo".to_string(), "bar".to_string()).unwrap();

        harvest_cookies(&mut api, vec![("JSESSIONID".to_string(), "abc".to_string())]);
        assert_eq!(model::Session::default(), api.session);

        harvest_cookies(
            &mut api,
            vec![
                ("other".to_string(), "x".to_string()),
                ("SERVERID".to_string(), "srv".to_string()),
                ("JSESSIONID".to_string(), "abc".to_string()),
            ],
        );
        assert_eq!("abc", api.session.session_id);
        assert_eq!("srv", api.session.server_id);
        assert!(api.is_logged_in());
    }
}
