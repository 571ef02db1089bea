//! Loading raw bytes from the two remote data sources.
//!
//! The station JSON and trip CSV documents are plain public HTTP resources;
//! the client sits behind a trait so tests can substitute canned responses.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads a data source given either a local path or an HTTP(S) URL.
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await
    } else {
        Ok(std::fs::read(source)?)
    }
}
