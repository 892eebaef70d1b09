use serde_json::{Value, json};
use shelf_dal::user::UserRepository;
use shelf_e2e_tests::{
    TEST_PASSWORD, TestUser, client_with_token, launch_env, prepare_env,
    rest::{data, login, register_user},
    server_url,
};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_login() {
    let (args, _config_guard) = prepare_env("test_login").await.unwrap();
    let url = server_url(&args);
    let validity = args.token_validity;
    let (client, state) = launch_env(args, TestUser::Anonymous).await.unwrap();

    let response = register_user(&client, &url, "jane@example.com", "secret-password")
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());

    let response = login(&client, &url, " Jane@Example.com", "secret-password")
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_eq!(validity.as_secs(), body["data"]["expires_in"].as_u64().unwrap());

    let repository = UserRepository::new(state.pool().clone());
    let user = repository.find_by_email("jane@example.com").await.unwrap();
    assert_eq!(user.id, body["data"]["user_id"].as_i64().unwrap());
    assert!(user.last_logged_in_at.is_some());

    // role user still cannot list users
    let user_client = client_with_token(Some(&token)).unwrap();
    let response = user_client
        .get(url.join("api/users").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = login(&client, &url, "jane@example.com", "wrong-password")
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        json!({"error": {"message": "Invalid email or password"}}),
        body
    );

    let response = login(&client, &url, "nobody@example.com", "secret-password")
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = client
        .post(url.join("api/access_tokens").unwrap())
        .json(&data(json!({"email": "", "password": ""})))
        .send()
        .await
        .unwrap();
    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
#[traced_test]
async fn test_admin_login() {
    let (args, _config_guard) = prepare_env("test_admin_login").await.unwrap();
    let url = server_url(&args);
    let (_client, _state) = launch_env(args, TestUser::Admin).await.unwrap();
    let anonymous = client_with_token(None).unwrap();

    let response = login(&anonymous, &url, &TestUser::Admin.email(), TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();

    let admin = client_with_token(Some(token)).unwrap();
    let response = admin
        .get(url.join("api/users").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(1, body["data"].as_array().unwrap().len());
}

#[tokio::test]
#[traced_test]
async fn test_invalid_token() {
    let (args, _config_guard) = prepare_env("test_invalid_token").await.unwrap();
    let url = server_url(&args);
    let (_client, _state) = launch_env(args, TestUser::Anonymous).await.unwrap();

    let forged = client_with_token(Some("not.a.token")).unwrap();
    let response = forged
        .get(url.join("api/authors").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        json!({"error": {"message": "Invalid or expired token"}}),
        body
    );

    let response = reqwest::Client::new()
        .get(url.join("api/authors").unwrap())
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}
