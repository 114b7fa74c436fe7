//! One-shot background fetches of the two GeoJSON feeds.
//!
//! Each feed is downloaded on its own detached thread and the parsed
//! document is handed back over a channel. There is no retry and no
//! timeout; a failed fetch is reported once and never reissued.

use crate::config::Config;
use crate::error::{Error, Result};
use crossbeam_channel::Sender;
use geojson::GeoJson;
use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    TectonicPlates,
    Earthquakes,
}

impl FeedKind {
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::TectonicPlates => "tectonic plates",
            FeedKind::Earthquakes => "earthquakes",
        }
    }
}

/// Outcome of one feed fetch
#[derive(Debug)]
pub struct FeedEvent {
    pub kind: FeedKind,
    pub result: Result<GeoJson>,
}

/// Issues feed downloads and reports them to a single receiver
pub struct FeedLoader {
    client: Client,
    tx: Sender<FeedEvent>,
}

impl FeedLoader {
    pub fn new(tx: Sender<FeedEvent>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("quake-map/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client, tx })
    }

    /// Start both fetches. Neither waits on the other.
    pub fn start_all(&self, config: &Config) {
        self.start(FeedKind::TectonicPlates, &config.plates_url);
        self.start(FeedKind::Earthquakes, &config.earthquakes_url);
    }

    /// Fetch `url` on a detached thread
    pub fn start(&self, kind: FeedKind, url: &str) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let url = url.to_string();

        thread::spawn(move || {
            log::debug!("fetching {} from {}", kind.label(), url);
            let result = fetch(&client, &url);
            match &result {
                Ok(geojson) => log::info!("{} loaded: {} features", kind.label(), feature_count(geojson)),
                Err(e) => log::warn!("{} fetch failed: {}", kind.label(), e),
            }
            // The UI may already be gone
            let _ = tx.send(FeedEvent { kind, result });
        });
    }
}

fn fetch(client: &Client, url: &str) -> Result<GeoJson> {
    let resp = client.get(url).send()?;
    if !resp.status().is_success() {
        return Err(Error::Status {
            status: resp.status().as_u16(),
            url: url.to_string(),
        });
    }
    let mut body = resp.bytes()?.to_vec();
    log::debug!("downloaded {} bytes from {}", body.len(), url);
    parse(&mut body)
}

/// Parse a GeoJSON response body. The buffer is used as scratch space.
pub fn parse(body: &mut [u8]) -> Result<GeoJson> {
    Ok(simd_json::serde::from_slice(body)?)
}

pub fn feature_count(geojson: &GeoJson) -> usize {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.len(),
        GeoJson::Feature(_) => 1,
        GeoJson::Geometry(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_collection() {
        let mut body = br#"{
            "type": "FeatureCollection",
            "metadata": { "count": 1 },
            "features": [{
                "type": "Feature",
                "properties": { "mag": 1.7, "place": "10 km N of Somewhere" },
                "geometry": { "type": "Point", "coordinates": [-117.1, 33.9, 12.3] },
                "id": "ci123"
            }]
        }"#
        .to_vec();

        let geojson = parse(&mut body).unwrap();
        assert_eq!(feature_count(&geojson), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let mut body = b"<html>rate limited</html>".to_vec();
        assert!(matches!(parse(&mut body), Err(Error::Json(_))));
    }

    #[test]
    fn test_unreachable_feed_reports_failure() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let loader = FeedLoader::new(tx).unwrap();
        loader.start(FeedKind::Earthquakes, "http://127.0.0.1:9/quakes.geojson");

        let event = rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert_eq!(event.kind, FeedKind::Earthquakes);
        assert!(event.result.is_err());
    }
}
