mod common;

use anyhow::{Context, Result};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{live_store, send, unique_user, FakeIdentity, TestApp, TestResponse};

async fn call(app: &TestApp, method: Method, uri: &str, token: &str, body: Option<Value>) -> Result<TestResponse> {
    send(app.router(), method, uri, Some(token), body).await
}

fn created_id(res: &TestResponse) -> Result<i64> {
    anyhow::ensure!(res.status == StatusCode::CREATED, "expected 201, got {} {}", res.status, res.body);
    res.body["data"]["id"].as_i64().context("response has no id")
}

/// Category and size type owned by `token`, returned as (category_id, size_type_id)
async fn catalog(app: &TestApp, token: &str) -> Result<(i64, i64)> {
    let res = call(app, Method::POST, "/v1/products/category", token, Some(json!({ "name": "Sembako" }))).await?;
    let category = created_id(&res)?;
    let res = call(app, Method::POST, "/v1/products/size", token, Some(json!({ "name": "kg" }))).await?;
    let size_type = created_id(&res)?;
    Ok((category, size_type))
}

async fn product(app: &TestApp, token: &str, (category, size_type): (i64, i64), price: i64) -> Result<i64> {
    let body = json!({
        "product_code": format!("P-{}", price),
        "product_name": "Beras",
        "quantity": 100,
        "size_type_id": size_type,
        "category_id": category,
        "buy_price": 0,
        "min_retail_price": price,
    });
    let res = call(app, Method::POST, "/v1/groceries/products", token, Some(body)).await?;
    created_id(&res)
}

async fn add_to_cart(app: &TestApp, token: &str, product_id: i64, size_type: i64, quantity: i32) -> Result<TestResponse> {
    let body = json!({ "product_id": product_id, "quantity": quantity, "size_type_id": size_type });
    call(app, Method::POST, "/v1/transactions/carts", token, Some(body)).await
}

#[tokio::test]
async fn checkout_totals_cart_at_retail_price() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let (grocer, shopper) = (unique_user("grocer"), unique_user("shopper"));
    let app = TestApp::with_store(
        FakeIdentity::new().with_user(&grocer, "rahasia").with_user(&shopper, "rahasia"),
        store,
    );
    app.identity.grant(&grocer, "grosir");
    app.identity.grant(&shopper, "retail");

    let seller = app.login(&grocer, "rahasia").await?;
    let ids = catalog(&app, &seller).await?;
    let rice = product(&app, &seller, ids, 1000).await?;
    let sugar = product(&app, &seller, ids, 500).await?;

    let buyer = app.login(&shopper, "rahasia").await?;
    assert_eq!(add_to_cart(&app, &buyer, rice, ids.1, 2).await?.status, StatusCode::CREATED);
    assert_eq!(add_to_cart(&app, &buyer, sugar, ids.1, 3).await?.status, StatusCode::CREATED);

    let res = call(&app, Method::POST, "/v1/transactions/checkout", &buyer, None).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["total_amount"], 3500);
    assert_eq!(res.body["data"]["customer_id"], shopper.as_str());

    let res = call(&app, Method::POST, "/v1/transactions/orders", &buyer, None).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["total_amount"], 3500);
    Ok(())
}

#[tokio::test]
async fn overflowing_total_is_rejected_and_not_recorded() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let (grocer, shopper) = (unique_user("grocer"), unique_user("shopper"));
    let app = TestApp::with_store(
        FakeIdentity::new().with_user(&grocer, "rahasia").with_user(&shopper, "rahasia"),
        store,
    );
    app.identity.grant(&grocer, "grosir");
    app.identity.grant(&shopper, "retail");

    let seller = app.login(&grocer, "rahasia").await?;
    let ids = catalog(&app, &seller).await?;
    let gold = product(&app, &seller, ids, i64::MAX / 2 + 1).await?;

    let buyer = app.login(&shopper, "rahasia").await?;
    assert_eq!(add_to_cart(&app, &buyer, gold, ids.1, 2).await?.status, StatusCode::CREATED);

    let res = call(&app, Method::POST, "/v1/transactions/checkout", &buyer, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = call(&app, Method::GET, "/v1/transactions/checkout", &buyer, None).await?;
    assert_eq!(res.body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn catalog_rows_of_another_owner_are_not_found() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let (owner, rival) = (unique_user("grocer"), unique_user("rival"));
    let app = TestApp::with_store(
        FakeIdentity::new().with_user(&owner, "rahasia").with_user(&rival, "rahasia"),
        store,
    );
    app.identity.grant(&owner, "grosir");
    app.identity.grant(&rival, "grosir");

    let owner_token = app.login(&owner, "rahasia").await?;
    let (category, _) = catalog(&app, &owner_token).await?;
    let uri = format!("/v1/products/category/{}", category);

    let rival_token = app.login(&rival, "rahasia").await?;
    let res = call(&app, Method::PUT, &uri, &rival_token, Some(json!({ "name": "Milik saya" }))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = call(&app, Method::DELETE, &uri, &rival_token, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = call(&app, Method::PUT, "/v1/products/category/999999999", &owner_token, Some(json!({ "name": "x" }))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // Untouched by the rival's attempts
    let res = call(&app, Method::GET, &uri, &owner_token, None).await?;
    assert_eq!(res.body["data"]["name"], "Sembako");
    let res = call(&app, Method::DELETE, &uri, &owner_token, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["deleted"], category);
    Ok(())
}

#[tokio::test]
async fn transactions_of_another_customer_are_not_found() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let (customer, stranger) = (unique_user("shopper"), unique_user("stranger"));
    let app = TestApp::with_store(
        FakeIdentity::new().with_user(&customer, "rahasia").with_user(&stranger, "rahasia"),
        store,
    );
    app.identity.grant(&customer, "retail");
    app.identity.grant(&stranger, "retail");

    let customer_token = app.login(&customer, "rahasia").await?;
    let stranger_token = app.login(&stranger, "rahasia").await?;

    for collection in ["/v1/transactions/checkout", "/v1/transactions/orders"] {
        let res = call(&app, Method::POST, collection, &customer_token, None).await?;
        let id = created_id(&res)?;
        let uri = format!("{}/{}", collection, id);

        let res = call(&app, Method::PUT, &uri, &stranger_token, Some(json!({ "total_amount": 1 }))).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
        let res = call(&app, Method::DELETE, &uri, &stranger_token, None).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);

        let missing = format!("{}/999999999", collection);
        let res = call(&app, Method::PUT, &missing, &customer_token, Some(json!({ "total_amount": 1 }))).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", missing);
        let res = call(&app, Method::DELETE, &missing, &customer_token, None).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", missing);

        let res = call(&app, Method::PUT, &uri, &customer_token, Some(json!({ "total_amount": 42 }))).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["data"]["total_amount"], 42);
    }
    Ok(())
}

#[tokio::test]
async fn operational_hours_are_scoped_and_window_checked() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let (owner, rival) = (unique_user("owner"), unique_user("rival"));
    let app = TestApp::with_store(
        FakeIdentity::new().with_user(&owner, "rahasia").with_user(&rival, "rahasia"),
        store,
    );
    for user in [&owner, &rival] {
        app.identity.grant(user, "grosir");
        app.identity.grant(user, "GROSIR_OWNER");
    }

    let owner_token = app.login(&owner, "rahasia").await?;
    let body = json!({ "day_operational": ["senin", "selasa"], "open": "08:00", "close": "17:00" });
    let res = call(&app, Method::POST, "/v1/groceries/operational", &owner_token, Some(body)).await?;
    let uri = format!("/v1/groceries/operational/{}", created_id(&res)?);

    // Closing before the stored opening time
    let res = call(&app, Method::PUT, &uri, &owner_token, Some(json!({ "close": "06:00" }))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["close"], "must be later than open");

    let res = call(&app, Method::PUT, &uri, &owner_token, Some(json!({ "close": "18:00" }))).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["open"], "08:00");
    assert_eq!(res.body["data"]["close"], "18:00");

    let rival_token = app.login(&rival, "rahasia").await?;
    let res = call(&app, Method::PUT, &uri, &rival_token, Some(json!({ "active": false }))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = call(&app, Method::DELETE, &uri, &rival_token, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn cart_line_for_missing_product_is_bad_request() -> Result<()> {
    let Some(store) = live_store().await? else { return Ok(()) };
    let shopper = unique_user("shopper");
    let app = TestApp::with_store(FakeIdentity::new().with_user(&shopper, "rahasia"), store);
    app.identity.grant(&shopper, "retail");
    let token = app.login(&shopper, "rahasia").await?;

    let res = add_to_cart(&app, &token, 999_999_999, 999_999_999, 1).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn negative_prices_are_rejected_before_the_store() -> Result<()> {
    // Unreachable store: validation must answer on its own
    let grocer = "toko-maju";
    let app = TestApp::new(FakeIdentity::new().with_user(grocer, "rahasia"));
    app.identity.grant(grocer, "grosir");
    let token = app.login(grocer, "rahasia").await?;

    let body = json!({
        "product_code": "B-01", "product_name": "Beras", "quantity": 5,
        "size_type_id": 1, "category_id": 1, "buy_price": 9000, "min_retail_price": -1,
    });
    let res = call(&app, Method::POST, "/v1/groceries/products", &token, Some(body)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["min_retail_price"], "must not be negative");

    let res = call(&app, Method::PUT, "/v1/groceries/products/1", &token, Some(json!({ "buy_price": -5 }))).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["buy_price"], "must not be negative");
    Ok(())
}
