use crate::configure_app;
use crate::middleware::AuthMiddleware;
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CACHE_CONTROL};
use actix_web::{App, test, web};
use async_trait::async_trait;
use biz_service::BizServices;
use biz_service::biz_service::auth_service::LoginRequest;
use biz_service::biz_service::college_service::CollegePayload;
use biz_service::biz_service::country_service::CountryPayload;
use biz_service::biz_service::mail_service::Notifier;
use biz_service::entitys::college_entity::{CollegeCategory, RankingSection, TextSection};
use biz_service::entitys::enquiry_entity::EnquiryEntity;
use common::config::{AdminAccount, AdminConfig, AppConfig, SysConfig};
use common::util::common_utils::build_md5_with_key;
use serde_json::{Value, json};
use std::sync::Arc;

const KEY: &str = "test-key";

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _enquiry: &EnquiryEntity) -> anyhow::Result<()> {
        anyhow::bail!("smtp relay refused connection")
    }
}

fn account(username: &str, role: &str) -> AdminAccount {
    AdminAccount {
        username: username.to_string(),
        password_md5: build_md5_with_key(KEY, &format!("{username}-pass")),
        role: role.to_string(),
    }
}

async fn services() -> BizServices {
    let config = AppConfig {
        sys: Some(SysConfig { md5_key: KEY.to_string(), ..Default::default() }),
        admin: Some(AdminConfig {
            token_ttl_secs: 3600,
            users: vec![account("admin", "admin"), account("editor", "editor"), account("support", "support")],
        }),
        ..Default::default()
    };
    let notifier: Arc<dyn Notifier> = Arc::new(FailingNotifier);
    let services = BizServices::build_with_notifier(None, &config, Some(notifier)).await.unwrap();

    for (name, order) in [("India", 1), ("Canada", 2)] {
        let country = CountryPayload { name: Some(name.into()), display_order: Some(order), ..Default::default() };
        services.country.create(country).await.unwrap();
    }
    services
}

fn bearer(services: &BizServices, username: &str) -> (actix_web::http::header::HeaderName, String) {
    let request = LoginRequest { username: username.to_string(), password: format!("{username}-pass") };
    let token = services.auth.login(&request).unwrap().token;
    (AUTHORIZATION, format!("Bearer {token}"))
}

fn college(name: &str, country: &str) -> CollegePayload {
    CollegePayload {
        name: Some(name.to_string()),
        country_ref: Some(country.to_string()),
        overview: Some(TextSection { title: "Overview".into(), description: format!("About {name}") }),
        ..Default::default()
    }
}

macro_rules! init_app {
    ($services:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware {
                    auth: web::Data::from($services.auth.clone()),
                    role: web::Data::from($services.role.clone()),
                })
                .configure(|cfg| configure_app(cfg, $services.clone())),
        )
        .await
    };
}

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let value: Value = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
        (status, value)
    }};
}

#[actix_web::test]
async fn indian_college_requires_city() {
    let services = services().await;
    let app = init_app!(services);
    let auth = bearer(&services, "editor");
    let body = json!({
        "name": "Test College",
        "country_ref": "india",
        "overview": { "title": "Overview", "description": "Engineering campus" }
    });

    let (status, value) = call!(app, test::TestRequest::post().uri("/colleges").insert_header(auth.clone()).set_json(&body));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], false);
    assert_eq!(value["message"], "City is required for Indian colleges");

    let mut with_city = body.clone();
    with_city["city"] = json!("Pune");
    let (status, value) = call!(app, test::TestRequest::post().uri("/colleges").insert_header(auth).set_json(&with_city));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["slug"], "test-college");
    assert_eq!(value["data"]["city"], "Pune");
    assert_eq!(value["data"]["country_ref"]["slug"], "india");
    // 未提供的段落也有完整结构
    assert_eq!(value["data"]["admission_process"]["items"], json!([]));
    assert!(value["data"]["ranking"].is_object());
}

#[actix_web::test]
async fn explicit_duplicate_slug_conflicts() {
    let services = services().await;
    let app = init_app!(services);
    let auth = bearer(&services, "admin");
    let body = json!({
        "name": "Maple University",
        "slug": "maple",
        "country_ref": "canada",
        "overview": { "description": "Toronto campus" }
    });

    let (status, _) = call!(app, test::TestRequest::post().uri("/admin/colleges").insert_header(auth.clone()).set_json(&body));
    assert_eq!(status, StatusCode::CREATED);
    let (status, value) = call!(app, test::TestRequest::post().uri("/admin/colleges").insert_header(auth).set_json(&body));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["value"], "maple");
}

#[actix_web::test]
async fn filters_intersect_in_ranking_order() {
    let services = services().await;
    let seeds = [
        ("Alpha Institute", vec!["engineering"], vec!["JEE"], Some(2)),
        ("Beta Institute", vec!["engineering", "management"], vec!["JEE", "CAT"], Some(1)),
        ("Gamma Institute", vec!["engineering"], vec!["NEET"], Some(3)),
        ("Delta Institute", vec!["medical"], vec!["JEE"], Some(4)),
        ("Epsilon School", vec!["management"], vec!["CAT"], None),
    ];
    for (name, categories, exams, position) in seeds {
        let mut payload = college(name, "canada");
        payload.categories = Some(categories.iter().map(|c| c.parse::<CollegeCategory>().unwrap()).collect());
        payload.exams = Some(exams.iter().map(|e| e.to_string()).collect());
        payload.ranking = Some(RankingSection { position, ..Default::default() });
        services.college.create(payload).await.unwrap();
    }
    let app = init_app!(services);

    let req = test::TestRequest::get().uri("/colleges?category=engineering&exam=JEE").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cache = resp.headers().get(CACHE_CONTROL).unwrap().to_str().unwrap().to_string();
    assert_eq!(cache, "public, s-maxage=300, stale-while-revalidate=600");
    let value: Value = test::read_body_json(resp).await;
    let names: Vec<&str> = value["data"]["colleges"].as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Beta Institute", "Alpha Institute"]);
    assert_eq!(value["data"]["total"], 2);
    assert_eq!(value["data"]["hasNext"], false);

    // 考试名不区分大小写
    let (_, value) = call!(app, test::TestRequest::get().uri("/colleges?exam=jee&category=all"));
    assert_eq!(value["data"]["total"], 3);

    let (status, value) = call!(app, test::TestRequest::get().uri("/colleges?category=law"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["validValues"], json!(["management", "engineering", "medical"]));
}

#[actix_web::test]
async fn page_past_the_end_is_empty() {
    let services = services().await;
    services.college.create(college("Maple University", "canada")).await.unwrap();
    let app = init_app!(services);

    for uri in ["/colleges?page=9223372036854775807&limit=100", "/exams?page=9223372036854775807", "/blogs?page=500"] {
        let (status, value) = call!(app, test::TestRequest::get().uri(uri));
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["hasNext"], false);
    }
    let (_, value) = call!(app, test::TestRequest::get().uri("/colleges?page=9223372036854775807&limit=100"));
    assert_eq!(value["data"]["colleges"], json!([]));
    assert_eq!(value["data"]["total"], 1);
}

#[actix_web::test]
async fn unknown_country_returns_empty_page() {
    let services = services().await;
    services.college.create(college("Maple University", "canada")).await.unwrap();
    let app = init_app!(services);

    let (status, value) = call!(app, test::TestRequest::get().uri("/colleges?country=atlantis"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["colleges"], json!([]));
    assert_eq!(value["data"]["total"], 0);

    let (_, value) = call!(app, test::TestRequest::get().uri("/colleges?country=canada"));
    assert_eq!(value["data"]["total"], 1);
}

#[actix_web::test]
async fn public_category_delete_is_soft_admin_delete_is_hard() {
    let services = services().await;
    let app = init_app!(services);
    let auth = bearer(&services, "editor");

    let (status, value) = call!(
        app,
        test::TestRequest::post().uri("/admin/categories").insert_header(auth.clone()).set_json(json!({ "name": "Study Abroad" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let id = value["data"]["_id"].as_str().unwrap().to_string();

    let (status, _) = call!(app, test::TestRequest::delete().uri("/categories?slug=study-abroad"));
    assert_eq!(status, StatusCode::OK);
    let (status, value) = call!(app, test::TestRequest::get().uri(&format!("/admin/categories/{id}")).insert_header(auth.clone()));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["is_active"], false);
    let (_, value) = call!(app, test::TestRequest::get().uri("/categories"));
    assert_eq!(value["data"], json!([]));

    let (status, _) = call!(app, test::TestRequest::delete().uri("/admin/categories?slug=study-abroad").insert_header(auth.clone()));
    assert_eq!(status, StatusCode::OK);
    let (status, value) = call!(app, test::TestRequest::get().uri(&format!("/admin/categories/{id}")).insert_header(auth));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["success"], false);

    let (status, value) = call!(app, test::TestRequest::delete().uri("/categories"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["missing"], json!(["slug"]));
}

#[actix_web::test]
async fn enquiry_survives_notifier_failure() {
    let services = services().await;
    let app = init_app!(services);
    let body = json!({ "name": "Asha", "email": "asha@example.com", "number": "9876543210", "city": "Pune" });

    let (status, value) = call!(app, test::TestRequest::post().uri("/send").set_json(&body));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["emailSent"], false);
    let id = value["data"]["enquiryId"].as_str().unwrap().to_string();

    let auth = bearer(&services, "support");
    let (status, value) = call!(app, test::TestRequest::get().uri(&format!("/admin/enquiries/{id}")).insert_header(auth.clone()));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["name"], "Asha");
    assert_eq!(value["data"]["status"], "pending");
    assert_eq!(value["data"]["source"], "website");

    let (status, value) = call!(
        app,
        test::TestRequest::put().uri(&format!("/admin/enquiries/{id}")).insert_header(auth.clone()).set_json(json!({ "status": "done" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["message"], "Invalid status 'done'. Valid values: pending, contacted, resolved, closed");

    let mut bad = body.clone();
    bad["email"] = json!("not-an-email");
    let (status, _) = call!(app, test::TestRequest::post().uri("/send").set_json(&bad));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn partial_update_keeps_other_fields() {
    let services = services().await;
    let mut payload = college("Test College", "india");
    payload.city = Some("Pune".into());
    payload.exams = Some(vec!["JEE".into()]);
    let created = services.college.create(payload).await.unwrap();
    let app = init_app!(services);
    let auth = bearer(&services, "editor");

    let (status, value) = call!(
        app,
        test::TestRequest::put().uri(&format!("/colleges/{}", created.id)).insert_header(auth.clone()).set_json(json!({ "city": "Mumbai" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["city"], "Mumbai");
    assert_eq!(value["data"]["name"], "Test College");
    assert_eq!(value["data"]["slug"], "test-college");
    assert_eq!(value["data"]["exams"], json!(["JEE"]));
    assert_eq!(value["data"]["overview"]["description"], "About Test College");

    // 合并后的视图仍需满足印度城市规则
    let (status, _) = call!(
        app,
        test::TestRequest::put().uri(&format!("/colleges/{}", created.id)).insert_header(auth).set_json(json!({ "city": "" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_routes_enforce_roles() {
    let services = services().await;
    let app = init_app!(services);
    let body = json!({ "name": "Maple University", "country_ref": "canada", "overview": { "description": "Toronto" } });

    let (status, value) = call!(app, test::TestRequest::post().uri("/colleges").set_json(&body));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["success"], false);

    let support = bearer(&services, "support");
    let (status, _) = call!(app, test::TestRequest::post().uri("/colleges").insert_header(support.clone()).set_json(&body));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call!(app, test::TestRequest::get().uri("/admin/colleges").insert_header(support));
    assert_eq!(status, StatusCode::OK);

    let editor = bearer(&services, "editor");
    let (status, _) = call!(app, test::TestRequest::get().uri("/admin/enquiries").insert_header(editor.clone()));
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call!(app, test::TestRequest::delete().uri("/admin/enquiries/anything").insert_header(editor.clone()));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call!(app, test::TestRequest::get().uri("/admin/roles").insert_header(editor));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call!(
        app,
        test::TestRequest::get().uri("/admin/colleges").insert_header((AUTHORIZATION, "Bearer forged.token"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_cookie_authenticates_session() {
    let services = services().await;
    let app = init_app!(services);

    let (status, value) = call!(
        app,
        test::TestRequest::post().uri("/admin/login").set_json(json!({ "username": "admin", "password": "wrong" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["message"], "Invalid username or password");

    let req = test::TestRequest::post()
        .uri("/admin/login")
        .set_json(json!({ "username": "admin", "password": "admin-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.response().cookies().find(|c| c.name() == "admin_token").unwrap().into_owned();
    assert!(cookie.http_only().unwrap_or(false));

    let (status, value) = call!(app, test::TestRequest::get().uri("/admin/me").cookie(cookie));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["username"], "admin");
    assert_eq!(value["data"]["role"], "admin");
    assert_eq!(value["data"]["permissions"], json!(["*"]));

    let (status, _) = call!(app, test::TestRequest::get().uri("/admin/me"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn custom_role_grants_permissions() {
    let services = services().await;
    let app = init_app!(services);
    let admin = bearer(&services, "admin");

    let role = json!({ "code": "writer", "name": "Blog writer", "permissions": ["blogs:*"] });
    let (status, value) = call!(app, test::TestRequest::post().uri("/admin/roles").insert_header(admin.clone()).set_json(&role));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(value["data"]["permissions"], json!(["blogs:*"]));

    let (status, _) = call!(app, test::TestRequest::delete().uri("/admin/roles/admin").insert_header(admin.clone()));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call!(app, test::TestRequest::delete().uri("/admin/roles/writer").insert_header(admin));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    let services = services().await;
    let app = init_app!(services);
    let auth = bearer(&services, "admin");

    let req = test::TestRequest::post()
        .uri("/admin/countries")
        .insert_header(auth)
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let (status, value) = call!(app, req);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], false);
    assert!(value["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn country_detail_counts_active_colleges() {
    let services = services().await;
    services.college.create(college("Maple University", "canada")).await.unwrap();
    let mut hidden = college("Quiet College", "canada");
    hidden.is_active = Some(false);
    services.college.create(hidden).await.unwrap();
    let app = init_app!(services);

    let (status, value) = call!(app, test::TestRequest::get().uri("/countries/canada"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["name"], "Canada");
    assert_eq!(value["data"]["collegeCount"], 1);

    let (_, value) = call!(app, test::TestRequest::get().uri("/countries"));
    let slugs: Vec<&str> = value["data"].as_array().unwrap().iter().map(|c| c["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, ["india", "canada"]);

    let (status, _) = call!(app, test::TestRequest::get().uri("/status"));
    assert_eq!(status, StatusCode::OK);
}
