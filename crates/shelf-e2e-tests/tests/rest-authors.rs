use serde_json::{Value, json};
use shelf_dal::author::AuthorRepository;
use shelf_e2e_tests::{
    TestUser, client_with_token, extend_url, launch_env, prepare_env, prepare_env_with_base_url,
    rest::{create_author, data, ids, seed_authors},
    server_url,
};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_author_crud() {
    let (args, _config_guard) = prepare_env("test_author_crud").await.unwrap();
    let url = server_url(&args);
    let base_url = args.base_url.clone();
    let (client, _state) = launch_env(args, TestUser::Admin).await.unwrap();

    let api_url = url.join("api/authors").unwrap();
    let response = client
        .post(api_url.clone())
        .json(&data(json!({"given_name": " Pat ", "family_name": "Shaughnessy"})))
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(201, response.status().as_u16());
    let location = response
        .headers()
        .get("location")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap();

    let body: Value = response.json().await.unwrap();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!("Pat", body["data"]["given_name"]);
    assert_eq!(
        format!("{}api/authors/{}", base_url, id),
        location,
        "location is absolute record url"
    );
    let keys: Vec<&str> = body["data"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        vec!["id", "given_name", "family_name", "created_at", "updated_at"],
        keys
    );

    let record_url = extend_url(&api_url, id);
    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!("Shaughnessy", body["data"]["family_name"]);

    let response = client
        .patch(record_url.clone())
        .json(&data(json!({"family_name": "Hartl"})))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!("Pat", body["data"]["given_name"]);
    assert_eq!("Hartl", body["data"]["family_name"]);

    let response = client
        .put(record_url.clone())
        .json(&data(json!({"given_name": ""})))
        .send()
        .await
        .unwrap();
    assert_eq!(422, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        json!({"error": {"invalid_params": {"given_name": ["can't be blank"]}}}),
        body
    );

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());
    assert!(response.text().await.unwrap().is_empty());

    let response = client.get(record_url.clone()).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]["message"].is_string());

    let response = client.delete(record_url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
#[traced_test]
async fn test_author_delete_count() {
    let (args, _config_guard) = prepare_env("test_author_delete_count").await.unwrap();
    let url = server_url(&args);
    let (client, state) = launch_env(args, TestUser::Admin).await.unwrap();
    let repository = AuthorRepository::new(state.pool().clone());
    let authors = seed_authors(&client, &url).await.unwrap();
    assert_eq!(3, repository.count().await.unwrap());

    let record_url = extend_url(&url.join("api/authors").unwrap(), &authors[1]["id"]);
    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());
    assert_eq!(2, repository.count().await.unwrap());

    let response = client.delete(record_url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
    assert_eq!(2, repository.count().await.unwrap());

    let response = client
        .get(url.join("api/authors").unwrap())
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let remaining = ids(&body);
    assert_eq!(2, remaining.len());
    assert!(!remaining.contains(&authors[1]["id"].as_i64().unwrap()));
}

#[tokio::test]
#[traced_test]
async fn test_author_create_invalid() {
    let (args, _config_guard) = prepare_env("test_author_create_invalid").await.unwrap();
    let url = server_url(&args);
    let (client, state) = launch_env(args, TestUser::Anonymous).await.unwrap();
    let repository = AuthorRepository::new(state.pool().clone());
    let api_url = url.join("api/authors").unwrap();

    let response = client
        .post(api_url.clone())
        .json(&data(json!({"given_name": "", "family_name": "  "})))
        .send()
        .await
        .unwrap();
    assert_eq!(422, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        json!({"error": {"invalid_params": {
            "family_name": ["can't be blank"],
            "given_name": ["can't be blank"]
        }}}),
        body
    );
    assert_eq!(0, repository.count().await.unwrap());

    let response = client
        .post(api_url.clone())
        .json(&json!({"given_name": "Pat", "family_name": "Shaughnessy"}))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(
        body["error"]["invalid_params"]
            .as_str()
            .unwrap()
            .starts_with("data=")
    );

    let response = client
        .post(api_url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    assert_eq!(0, repository.count().await.unwrap());
}

#[tokio::test]
#[traced_test]
async fn test_author_pagination() {
    let (args, _config_guard) =
        prepare_env_with_base_url("test_author_pagination", "http://www.example.com")
            .await
            .unwrap();
    let url = server_url(&args);
    let (client, _state) = launch_env(args, TestUser::Anonymous).await.unwrap();
    seed_authors(&client, &url).await.unwrap();

    let response = client
        .get(url.join("api/authors?page=1&per=2").unwrap())
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(200, response.status().as_u16());
    let link = response
        .headers()
        .get("link")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert_eq!(
        r#"<http://www.example.com/api/authors?page=2&per=2>; rel="next""#,
        link
    );
    let first_page: Value = response.json().await.unwrap();
    assert_eq!(2, first_page["data"].as_array().unwrap().len());

    let response = client
        .get(url.join("api/authors?page=2&per=2").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let link = response
        .headers()
        .get("link")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert!(!link.contains(r#"rel="next""#));
    assert!(link.contains(r#"rel="prev""#));
    let second_page: Value = response.json().await.unwrap();
    assert_eq!(1, second_page["data"].as_array().unwrap().len());

    let first = ids(&first_page);
    let second = ids(&second_page);
    assert!(second.iter().all(|id| !first.contains(id)));

    let response = client
        .get(url.join("api/authors").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    assert!(response.headers().get("link").is_none());
    let all: Value = response.json().await.unwrap();
    assert_eq!(3, all["data"].as_array().unwrap().len());

    let response = client
        .get(url.join("api/authors?page=5&per=2").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let link = response
        .headers()
        .get("link")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert_eq!(
        r#"<http://www.example.com/api/authors?page=2&per=2>; rel="prev""#,
        link
    );
    let body: Value = response.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    for bad in ["page=fake", "per=0", "page=-1"] {
        let response = client
            .get(url.join(&format!("api/authors?{bad}")).unwrap())
            .send()
            .await
            .unwrap();
        assert_eq!(400, response.status().as_u16(), "{bad} is rejected");
        let body: Value = response.json().await.unwrap();
        assert_eq!(json!({"error": {"invalid_params": bad}}), body);
    }
}

#[tokio::test]
#[traced_test]
async fn test_author_fields_and_sort() {
    let (args, _config_guard) = prepare_env("test_author_fields_and_sort").await.unwrap();
    let url = server_url(&args);
    let (client, _state) = launch_env(args, TestUser::Anonymous).await.unwrap();
    seed_authors(&client, &url).await.unwrap();

    let response = client
        .get(url.join("api/authors?fields=family_name,id").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    for row in body["data"].as_array().unwrap() {
        let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(vec!["id", "family_name"], keys);
    }

    let response = client
        .get(url.join("api/authors?fields=fid").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(json!({"error": {"invalid_params": "fields=fid"}}), body);

    let response = client
        .get(url.join("api/authors?sort=id&dir=desc").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let listed = ids(&body);
    assert_eq!(3, listed.len());
    assert!(listed.windows(2).all(|w| w[0] >= w[1]));

    let response = client
        .get(url.join("api/authors?sort=family_name").unwrap())
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["family_name"].as_str())
        .collect();
    assert_eq!(vec!["Hartl", "Ruby", "Shaughnessy"], names);

    let response = client
        .get(url.join("api/authors?sort=fid").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(json!({"error": {"invalid_params": "sort=fid"}}), body);
}

#[tokio::test]
#[traced_test]
async fn test_author_filters() {
    let (args, _config_guard) = prepare_env("test_author_filters").await.unwrap();
    let url = server_url(&args);
    let (client, _state) = launch_env(args, TestUser::Anonymous).await.unwrap();
    seed_authors(&client, &url).await.unwrap();
    create_author(&client, &url, "Patricia", "Highsmith")
        .await
        .unwrap();

    let response = client
        .get(url.join("api/authors?q[given_name_cont]=Pat").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(2, body["data"].as_array().unwrap().len());

    let response = client
        .get(
            url.join("api/authors?q[given_name_cont]=Pat&q[family_name_start]=High")
                .unwrap(),
        )
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let rows = body["data"].as_array().unwrap();
    assert_eq!(1, rows.len());
    assert_eq!("Patricia", rows[0]["given_name"]);

    let response = client
        .get(url.join("api/authors?q[family_name_eq]=Ruby&fields=given_name").unwrap())
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(json!({"data": [{"given_name": "Sam"}]}), body);

    let response = client
        .get(url.join("api/authors?q[given_name_cont]=").unwrap())
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(4, body["data"].as_array().unwrap().len());

    let response = client
        .get(url.join("api/authors?q[nickname_cont]=x").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        json!({"error": {"invalid_params": "q[nickname_cont]=x"}}),
        body
    );
}

#[tokio::test]
#[traced_test]
async fn test_author_policy() {
    let (args, _config_guard) = prepare_env("test_author_policy").await.unwrap();
    let url = server_url(&args);
    let (user_client, _state) = launch_env(args, TestUser::User).await.unwrap();
    let anonymous = client_with_token(None).unwrap();

    let author = create_author(&anonymous, &url, "Sam", "Ruby").await.unwrap();
    let record_url = extend_url(&url.join("api/authors").unwrap(), &author["id"]);

    let response = anonymous.get(record_url.clone()).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());

    for client in [&anonymous, &user_client] {
        let response = client
            .patch(record_url.clone())
            .json(&data(json!({"given_name": "Samuel"})))
            .send()
            .await
            .unwrap();
        assert_eq!(403, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            "You are not authorized to perform this action",
            body["error"]["message"]
        );

        let response = client.delete(record_url.clone()).send().await.unwrap();
        assert_eq!(403, response.status().as_u16());
    }

    // authorization is decided before payload is validated
    let response = anonymous
        .patch(record_url.clone())
        .json(&data(json!({"given_name": ""})))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    for body in [
        data(json!({"given_name": 5})),
        json!({"given_name": "Samuel"}),
    ] {
        for client in [&anonymous, &user_client] {
            let response = client
                .patch(record_url.clone())
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(403, response.status().as_u16(), "body {body}");
            let error: Value = response.json().await.unwrap();
            assert!(error["error"].get("invalid_params").is_none());
        }
    }

    let response = anonymous
        .patch(record_url.clone())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = anonymous.get(record_url).send().await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!("Sam", body["data"]["given_name"]);
}
