use chrono::{Days, Local};
use serde_json::{Value, json};
use terraclima_core::{WeatherService, handle};

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn post_body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[tokio::test(start_paused = true)]
async fn mockdata_reading_for_new_york() {
    let service = WeatherService::default();
    let date = today();
    let body = post_body(&json!({
        "latitude": 40.7128,
        "longitude": -74.0060,
        "date": date,
        "provider": "mockdata",
    }));

    let res = handle(&service, "POST", &body).await;

    assert_eq!(res.status, 200, "{}", res.body);
    assert_eq!(res.body["success"], true);

    let data = &res.body["data"];
    let humidity = data["humidity"].as_f64().unwrap();
    assert!((5.0..=85.0).contains(&humidity), "humidity {humidity}");
    assert_eq!(
        data["location"],
        json!({ "latitude": 40.7128, "longitude": -74.0060 })
    );
    assert_eq!(data["provider"], "mockdata");
    assert_eq!(data["date"], date);

    let message = data["message"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains(&date));
    assert!(data["color"].as_str().unwrap().starts_with('#'));
}

#[tokio::test]
async fn every_provider_succeeds_at_the_window_edge() {
    let service = WeatherService::default();
    let last_day = Local::now()
        .date_naive()
        .checked_add_days(Days::new(7))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();

    for provider in ["openweather", "weatherapi"] {
        let body = post_body(&json!({
            "latitude": -33.8688,
            "longitude": 151.2093,
            "date": last_day,
            "provider": provider,
        }));

        let res = handle(&service, "POST", &body).await;
        assert_eq!(res.status, 200, "{provider}: {}", res.body);
        assert_eq!(res.body["data"]["provider"], provider);
    }
}

#[tokio::test]
async fn timestamp_dates_come_back_as_calendar_dates() {
    let date = today();
    let body = post_body(&json!({
        "latitude": 51.5074,
        "longitude": -0.1278,
        "date": format!("{date}T12:30:00Z"),
        "provider": "openweather",
    }));

    let res = handle(&WeatherService::default(), "POST", &body).await;

    assert_eq!(res.status, 200, "{}", res.body);
    assert_eq!(res.body["data"]["date"], date);
    assert!(res.body["data"]["message"].as_str().unwrap().contains(&date));
}

#[tokio::test]
async fn out_of_range_latitude_is_a_field_error() {
    let body = post_body(&json!({
        "latitude": 200,
        "longitude": -74.0060,
        "date": today(),
        "provider": "mockdata",
    }));

    let res = handle(&WeatherService::default(), "POST", &body).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["success"], false);
    assert_eq!(
        res.body["details"]["latitude"],
        "Latitude must be between -90 and 90"
    );
    assert!(res.body["details"].get("longitude").is_none());
}

#[tokio::test]
async fn unknown_provider_is_rejected_at_validation() {
    let body = post_body(&json!({
        "latitude": 0,
        "longitude": 0,
        "date": today(),
        "provider": "darksky",
    }));

    let res = handle(&WeatherService::default(), "POST", &body).await;

    assert_eq!(res.status, 400);
    assert!(res.body["details"]["provider"].is_string());
}

#[tokio::test]
async fn get_is_not_allowed() {
    let res = handle(&WeatherService::default(), "GET", b"").await;

    assert_eq!(res.status, 405);
    assert_eq!(res.body["error"], "Method not allowed");
}
