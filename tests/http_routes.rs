use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use food_tracker::{routes, FoodRepository, MemoryExecutor};
use serde_json::Value;

const PIE_FORM: &str = "name=Apple+Pie&serving_size=120&serving_size_units=g&calories=296.5\
&carbs=42&protein=2.4&fat=14&salt=0.3&sugar=19";

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(FoodRepository::new(MemoryExecutor::new())))
                .configure(routes::configure::<MemoryExecutor>),
        )
        .await
    };
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn post_form(uri: &str, body: &'static str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(body)
}

#[actix_web::test]
async fn home_and_about_pages_render() {
    let app = app!();

    let home: Value = test::call_and_read_body_json(&app, get("/").to_request()).await;
    let about: Value = test::call_and_read_body_json(&app, get("/about").to_request()).await;

    assert_eq!(home["title"], "Home");
    assert_eq!(about["title"], "About Me");
}

#[actix_web::test]
async fn add_then_view_food() {
    let app = app!();

    let added: Value =
        test::call_and_read_body_json(&app, post_form("/food/add", PIE_FORM).to_request()).await;
    assert_eq!(added["message"], "Successfully added");
    assert_eq!(added["food"]["calories"], 296.5);
    let id = added["food"]["id"].as_i64().unwrap();

    let viewed: Value =
        test::call_and_read_body_json(&app, get(&format!("/food/view/{id}")).to_request()).await;
    assert_eq!(viewed["title"], "View");
    assert_eq!(viewed["food"], added["food"]);
}

#[actix_web::test]
async fn add_with_non_numeric_field_is_bad_request() {
    let app = app!();

    let res = test::call_service(
        &app,
        post_form(
            "/food/add",
            "name=Pie&serving_size=1&serving_size_units=g&calories=lots&carbs=1&protein=1&fat=1&salt=1&sugar=1",
        )
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("calories"));
}

#[actix_web::test]
async fn search_without_term_returns_no_foods() {
    let app = app!();
    test::call_service(&app, post_form("/food/add", PIE_FORM).to_request()).await;

    let empty: Value = test::call_and_read_body_json(&app, get("/food/search").to_request()).await;
    let found: Value =
        test::call_and_read_body_json(&app, get("/food/search?s=APPLE").to_request()).await;

    assert!(empty.get("foods").is_none());
    assert_eq!(found["s"], "APPLE");
    assert_eq!(found["foods"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn update_form_then_submit() {
    let app = app!();
    let added: Value =
        test::call_and_read_body_json(&app, post_form("/food/add", PIE_FORM).to_request()).await;
    let id = added["food"]["id"].as_i64().unwrap();

    let prefill: Value =
        test::call_and_read_body_json(&app, get(&format!("/food/update/{id}")).to_request()).await;
    assert_eq!(prefill["type"], "update");
    assert_eq!(prefill["food"]["name"], "Apple Pie");
    assert_eq!(prefill["form"]["serving_size"], "120");

    let updated: Value = test::call_and_read_body_json(
        &app,
        post_form(
            &format!("/food/update/{id}"),
            "name=Apple+Crumble&serving_size=150&serving_size_units=g&calories=300\
&carbs=50&protein=3&fat=10&salt=0.2&sugar=25",
        )
        .to_request(),
    )
    .await;
    assert_eq!(updated["message"], "Successfully updated");
    assert_eq!(updated["food"]["name"], "Apple Crumble");
    assert_eq!(updated["food"]["carbs"], 50.0);
}

#[actix_web::test]
async fn update_unknown_food_is_not_found() {
    let app = app!();

    let res =
        test::call_service(&app, post_form("/food/update/77", PIE_FORM).to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_reports_whether_a_row_was_removed() {
    let app = app!();
    let added: Value =
        test::call_and_read_body_json(&app, post_form("/food/add", PIE_FORM).to_request()).await;
    let uri = format!("/food/delete/{}", added["food"]["id"]);

    let first: Value = test::call_and_read_body_json(&app, get(&uri).to_request()).await;
    let second: Value = test::call_and_read_body_json(&app, get(&uri).to_request()).await;
    let list: Value = test::call_and_read_body_json(&app, get("/food/list").to_request()).await;

    assert_eq!(first["result"], true);
    assert_eq!(second["result"], false);
    assert_eq!(list["title"], "View All Foods");
    assert!(list["foods"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn non_positive_id_is_bad_request() {
    let app = app!();

    let res = test::call_service(&app, get("/food/view/0").to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
