//! Checks against public demo APIs. They need network access and the services
//! change over time, so they only run with `cargo test -- --ignored`.

use restcheck::auth::AuthMethod;
use restcheck::http::{ApiClient, RequestSpec};
use restcheck::status::StatusCode;
use restcheck::testing::SoftAssertions;
use serde_json::json;

#[tokio::test]
#[ignore = "requires network access"]
async fn reqres_second_page_of_users() {
    let response = ApiClient::new()
        .unwrap()
        .send(
            &RequestSpec::get("https://reqres.in/api/users")
                .query_param("page", 2)
                .header("x-api-key", "reqres-free-v1"),
        )
        .await
        .unwrap();

    let mut soft = SoftAssertions::new();
    soft.assert_equals(response.status, StatusCode::Success, "status");
    soft.assert_equals(response.json_path("page").unwrap(), 2, "page");
    soft.assert_equals(
        response.json_path("data[0].avatar").unwrap(),
        "https://reqres.in/img/faces/7-image.jpg",
        "first avatar",
    );
    soft.check_all();
}

#[tokio::test]
#[ignore = "requires network access"]
async fn jsonplaceholder_post_titles() {
    let response = ApiClient::new()
        .unwrap()
        .send(&RequestSpec::get("https://jsonplaceholder.typicode.com/posts").query_param("userId", 1))
        .await
        .unwrap();

    let titles = response.json_list("title").unwrap();
    let mut soft = SoftAssertions::new();
    soft.assert_equals(response.status, 200, "status");
    soft.assert_equals(titles.len(), 10, "title count");
    soft.check_all();
}

#[tokio::test]
#[ignore = "requires network access"]
async fn ergast_circuits_for_a_season() {
    let spec = RequestSpec::get("http://ergast.com/api/f1/{season}/circuits.json")
        .path_param("season", 2017);
    let response = ApiClient::new().unwrap().send(&spec).await.unwrap();

    let mut soft = SoftAssertions::new();
    soft.assert_equals(response.status, 200, "status");
    soft.assert_equals(
        response.json_list("MRData.CircuitTable.Circuits.circuitId").unwrap().len(),
        20,
        "circuit count",
    );
    soft.check_all();
}

#[tokio::test]
#[ignore = "requires network access"]
async fn postman_echo_basic_and_digest_auth() {
    let client = ApiClient::new().unwrap();
    let mut soft = SoftAssertions::new();

    for (url, auth) in [
        (
            "https://postman-echo.com/basic-auth",
            AuthMethod::basic("postman", "password"),
        ),
        (
            "https://postman-echo.com/digest-auth",
            AuthMethod::digest("postman", "password"),
        ),
    ] {
        let response = client.send(&RequestSpec::get(url).auth(auth)).await.unwrap();
        soft.assert_equals(response.status, 200, &format!("{url} status"));
        soft.assert_equals(
            response.json_path("authenticated").unwrap(),
            json!(true),
            &format!("{url} authenticated"),
        );
    }
    soft.check_all();
}
