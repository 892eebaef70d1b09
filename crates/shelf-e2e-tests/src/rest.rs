use anyhow::{Result, anyhow};
use reqwest::Url;
use serde_json::{Value, json};
use tracing::info;

/// Wraps attributes into request envelope
pub fn data(attributes: Value) -> Value {
    json!({ "data": attributes })
}

pub async fn create_author(
    client: &reqwest::Client,
    server_url: &Url,
    given_name: &str,
    family_name: &str,
) -> Result<Value> {
    let payload = data(json!({"given_name": given_name, "family_name": family_name}));
    let api_url = server_url.join("api/authors")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Create author response: {:#?}", response);
    if response.status().as_u16() != 201 {
        return Err(anyhow!("Author not created: {}", response.status()));
    }
    let mut body: Value = response.json().await?;
    Ok(body["data"].take())
}

pub async fn seed_authors(client: &reqwest::Client, server_url: &Url) -> Result<Vec<Value>> {
    let mut authors = Vec::new();
    for (given_name, family_name) in [("Pat", "Shaughnessy"), ("Michael", "Hartl"), ("Sam", "Ruby")]
    {
        authors.push(create_author(client, server_url, given_name, family_name).await?);
    }
    Ok(authors)
}

pub async fn register_user(
    client: &reqwest::Client,
    server_url: &Url,
    email: &str,
    password: &str,
) -> Result<reqwest::Response> {
    let payload = data(json!({
        "email": email,
        "given_name": "Jane",
        "family_name": "Doe",
        "password": password,
    }));
    let response = client
        .post(server_url.join("api/users")?)
        .json(&payload)
        .send()
        .await?;
    Ok(response)
}

pub async fn login(
    client: &reqwest::Client,
    server_url: &Url,
    email: &str,
    password: &str,
) -> Result<reqwest::Response> {
    let payload = data(json!({"email": email, "password": password}));
    let response = client
        .post(server_url.join("api/access_tokens")?)
        .json(&payload)
        .send()
        .await?;
    Ok(response)
}

/// Ids of records in list response
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}
