use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::RepoError;
use crate::executor::QueryExecutor;
use crate::models::{FoodForm, FoodId};
use crate::repository::FoodRepository;

type Repo<E> = web::Data<FoodRepository<E>>;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    s: Option<String>,
}

/// Registers every page of the app against a `FoodRepository<E>` in app data.
pub fn configure<E: QueryExecutor>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/about", web::get().to(about))
        .route("/food/search", web::get().to(search_foods::<E>))
        .route("/food/add", web::get().to(add_food_form))
        .route("/food/add", web::post().to(add_food::<E>))
        .route("/food/update/{id}", web::get().to(update_food_form::<E>))
        .route("/food/update/{id}", web::post().to(update_food::<E>))
        .route("/food/delete/{id}", web::get().to(delete_food::<E>))
        .route("/food/list", web::get().to(list_foods::<E>))
        .route("/food/view/{id}", web::get().to(view_food::<E>));
}

async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "title": "Home" }))
}

async fn about() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "title": "About Me" }))
}

async fn search_foods<E: QueryExecutor>(
    repo: Repo<E>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, RepoError> {
    match query.into_inner().s.filter(|term| !term.is_empty()) {
        Some(term) => {
            let foods = repo.search_by_name(&term).await?;
            Ok(HttpResponse::Ok().json(json!({ "title": "Search", "foods": foods, "s": term })))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "title": "Search" }))),
    }
}

async fn add_food_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "title": "Add a Food", "food": FoodForm::default() }))
}

async fn add_food<E: QueryExecutor>(
    repo: Repo<E>,
    form: web::Form<FoodForm>,
) -> Result<HttpResponse, RepoError> {
    let food = repo.insert(&form).await?;
    Ok(HttpResponse::Ok().json(json!({
        "title": "Update",
        "food": food,
        "message": "Successfully added",
    })))
}

async fn update_food_form<E: QueryExecutor>(
    repo: Repo<E>,
    path: web::Path<i32>,
) -> Result<HttpResponse, RepoError> {
    let food = repo.fetch_by_id(FoodId::try_from(path.into_inner())?).await?;
    let form = FoodForm::from(&food);
    Ok(HttpResponse::Ok().json(json!({
        "title": "Update",
        "food": food,
        "form": form,
        "type": "update",
    })))
}

async fn update_food<E: QueryExecutor>(
    repo: Repo<E>,
    path: web::Path<i32>,
    form: web::Form<FoodForm>,
) -> Result<HttpResponse, RepoError> {
    let id = FoodId::try_from(path.into_inner())?;
    let food = repo.update(id, &form).await?;
    Ok(HttpResponse::Ok().json(json!({
        "title": "Update",
        "food": food,
        "message": "Successfully updated",
    })))
}

async fn delete_food<E: QueryExecutor>(
    repo: Repo<E>,
    path: web::Path<i32>,
) -> Result<HttpResponse, RepoError> {
    let result = repo.delete(FoodId::try_from(path.into_inner())?).await?;
    Ok(HttpResponse::Ok().json(json!({ "result": result })))
}

async fn list_foods<E: QueryExecutor>(repo: Repo<E>) -> Result<HttpResponse, RepoError> {
    let foods = repo.list_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "title": "View All Foods", "foods": foods })))
}

async fn view_food<E: QueryExecutor>(
    repo: Repo<E>,
    path: web::Path<i32>,
) -> Result<HttpResponse, RepoError> {
    let food = repo.fetch_by_id(FoodId::try_from(path.into_inner())?).await?;
    Ok(HttpResponse::Ok().json(json!({ "title": "View", "food": food })))
}
