//! An InfluxDB line-protocol write client.

use crate::config::InfluxConfig;
use crate::core::{Point, PointWriter};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Writes point batches to an InfluxDB `/write` endpoint over HTTP.
///
/// Batches are rendered as newline-separated line protocol and posted with
/// second precision. Credentials, when configured, are passed as the `u`
/// and `p` query parameters the 1.x API expects.
pub struct InfluxWriter {
    client: Client,
    write_url: String,
    endpoint: String,
    query: Vec<(String, String)>,
}

impl InfluxWriter {
    /// Creates a writer against an explicit server root, e.g.
    /// `http://localhost:8086`.
    pub fn new(base_url: &str, config: &InfluxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let mut query = vec![
            ("db".to_string(), config.database.clone()),
            ("precision".to_string(), "s".to_string()),
        ];
        if !config.username.is_empty() {
            query.push(("u".to_string(), config.username.clone()));
            query.push(("p".to_string(), config.password.clone()));
        }
        Ok(Self {
            client,
            write_url: format!("{}/write", base_url.trim_end_matches('/')),
            endpoint: format!("{}:{}", config.host, config.port),
            query,
        })
    }

    /// Creates a writer for the configured host and port.
    pub fn from_config(config: &InfluxConfig) -> Result<Self> {
        let base_url = format!("http://{}:{}", config.host, config.port);
        Self::new(&base_url, config)
    }
}

#[async_trait]
impl PointWriter for InfluxWriter {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn write_points(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let body = points
            .iter()
            .map(Point::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n");
        debug!(points = points.len(), "posting batch to {}", self.endpoint);

        let response = self
            .client
            .post(&self.write_url)
            .query(&self.query)
            .body(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("influxdb rejected write: status {}, body: {}", status, text);
        }
    }
}
