//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use listings::{PropertySource, StaticCatalog};
use map_core::{BackgroundImage, Geocoder, MapSettings, NominatimGeocoder};
use reqwest::Client;
use url::Url;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{DecodedImage, ImageryFailure, UiError, UiErrorContext, UiEvent};

const IMAGERY_TIMEOUT: Duration = Duration::from_secs(15);

pub fn launch(
    settings: MapSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("rental-map-backend".to_string())
        .spawn(move || run_worker(settings, cmd_rx, ui_tx))?;
    Ok(())
}

fn run_worker(settings: MapSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            tracing::error!("failed to build backend runtime: {err}");
            return;
        }
    };

    runtime.block_on(async move {
        let services = match Services::start(&settings, &ui_tx) {
            Ok(services) => services,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err:#}"),
                )));
                tracing::error!("backend worker startup failure: {err:#}");
                return;
            }
        };
        let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            let services = services.clone();
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                let event = services.handle(cmd).await;
                if ui_tx.try_send(event).is_err() {
                    tracing::warn!("ui event queue unavailable; dropping backend result");
                }
            });
        }
        tracing::info!("ui command channel closed; backend worker exiting");
    });
}

#[derive(Clone)]
struct Services {
    catalog: Arc<dyn PropertySource>,
    geocoder: Option<Arc<dyn Geocoder>>,
    http: Client,
}

impl Services {
    fn start(settings: &MapSettings, ui_tx: &Sender<UiEvent>) -> anyhow::Result<Self> {
        let catalog = match open_catalog(settings) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!("{err:#}; falling back to the built-in catalog");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Catalog,
                    format!("{err:#}; showing the built-in listings instead"),
                )));
                StaticCatalog::builtin()
            }
        };

        let geocoder = match NominatimGeocoder::from_settings(settings) {
            Ok(geocoder) => Some(Arc::new(geocoder) as Arc<dyn Geocoder>),
            Err(err) => {
                tracing::warn!("location search disabled: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Geocode,
                    format!("location search disabled: {err}"),
                )));
                None
            }
        };

        let http = Client::builder()
            .user_agent(settings.geocoder_user_agent.as_str())
            .timeout(IMAGERY_TIMEOUT)
            .build()
            .context("failed to build imagery http client")?;

        Ok(Self {
            catalog: Arc::new(catalog),
            geocoder,
            http,
        })
    }

    async fn handle(&self, cmd: BackendCommand) -> UiEvent {
        match cmd {
            BackendCommand::LoadProperties { query } => match self.catalog.list(&query).await {
                Ok(properties) => UiEvent::PropertiesLoaded { query, properties },
                Err(err) => UiEvent::Error(UiError::from_message(
                    UiErrorContext::Catalog,
                    format!("{err:#}"),
                )),
            },
            BackendCommand::LoadKinds => match self.catalog.kinds().await {
                Ok(kinds) => UiEvent::KindsLoaded(kinds),
                Err(err) => UiEvent::Error(UiError::from_message(
                    UiErrorContext::Catalog,
                    format!("{err:#}"),
                )),
            },
            BackendCommand::Geocode(request) => {
                let result = match &self.geocoder {
                    Some(geocoder) => geocoder.lookup(&request.query, request.limit).await,
                    None => Ok(Vec::new()),
                };
                UiEvent::GeocodeCompleted {
                    seq: request.seq,
                    result,
                }
            }
            BackendCommand::FetchBackground { generation, image } => {
                match fetch_background(&self.http, &image).await {
                    Ok(pixels) => UiEvent::BackgroundLoaded {
                        generation,
                        image,
                        pixels,
                    },
                    Err(failure) => UiEvent::BackgroundFailed {
                        generation,
                        image,
                        failure,
                    },
                }
            }
            BackendCommand::FetchPhoto { id, url } => match fetch_image(&self.http, &url).await {
                Ok(pixels) => UiEvent::PhotoLoaded { id, pixels },
                Err(failure) => UiEvent::PhotoFailed {
                    id,
                    reason: failure.reason(),
                },
            },
        }
    }
}

fn open_catalog(settings: &MapSettings) -> anyhow::Result<StaticCatalog> {
    match &settings.catalog_path {
        Some(path) => StaticCatalog::from_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Ok(StaticCatalog::builtin()),
    }
}

async fn fetch_background(
    http: &Client,
    image: &BackgroundImage,
) -> Result<DecodedImage, ImageryFailure> {
    tracing::debug!(zoom = image.zoom, "fetching map imagery");
    fetch_image(http, &image.url).await
}

async fn fetch_image(http: &Client, url: &Url) -> Result<DecodedImage, ImageryFailure> {
    // The URL may carry the access token; only the host is logged.
    let host = url.host_str().unwrap_or_default().to_string();
    tracing::debug!(%host, "fetching image");

    let res = http
        .get(url.clone())
        .send()
        .await
        .map_err(|err| ImageryFailure::Unavailable(format!("image request to {host} failed: {}", err.without_url())))?;
    let status = res.status();
    if !status.is_success() {
        tracing::warn!(%host, status = status.as_u16(), "image request rejected");
        return Err(ImageryFailure::from_status(status.as_u16()));
    }
    let bytes = res
        .bytes()
        .await
        .map_err(|err| ImageryFailure::Unavailable(format!("image download failed: {}", err.without_url())))?;

    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|err| ImageryFailure::Unavailable(format!("image decoder task failed: {err}")))?
}

fn decode_image(bytes: &[u8]) -> Result<DecodedImage, ImageryFailure> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| ImageryFailure::Unavailable(format!("undecodable imagery: {err}")))?;
    let rgba = decoded.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use listings::ListingQuery;
    use map_core::GeocodeRequest;
    use shared::domain::PropertyId;

    fn offline_services() -> Services {
        Services {
            catalog: Arc::new(StaticCatalog::builtin()),
            geocoder: None,
            http: Client::new(),
        }
    }

    #[test]
    fn decodes_png_into_rgba() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(3, 2))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .expect("encode png");

        let decoded = decode_image(&png).expect("decode");
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        assert!(matches!(
            decode_image(b"<html>nope</html>"),
            Err(ImageryFailure::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn load_properties_echoes_query_with_filtered_results() {
        let services = offline_services();
        let query = ListingQuery::text("brooklyn");
        match services.handle(BackendCommand::LoadProperties { query: query.clone() }).await {
            UiEvent::PropertiesLoaded {
                query: echoed,
                properties,
            } => {
                assert_eq!(echoed, query);
                assert!(!properties.is_empty());
                assert!(properties
                    .iter()
                    .all(|p| p.address.to_lowercase().contains("brooklyn")
                        || p.name.to_lowercase().contains("brooklyn")));
            }
            _ => panic!("expected PropertiesLoaded"),
        }
    }

    #[tokio::test]
    async fn geocode_without_geocoder_yields_empty_suggestions() {
        let services = offline_services();
        let request = GeocodeRequest {
            seq: 7,
            query: "Brooklyn".to_string(),
            limit: 5,
        };
        match services.handle(BackendCommand::Geocode(request)).await {
            UiEvent::GeocodeCompleted { seq, result } => {
                assert_eq!(seq, 7);
                assert!(result.expect("empty result").is_empty());
            }
            _ => panic!("expected GeocodeCompleted"),
        }
    }

    #[tokio::test]
    async fn unreachable_photo_reports_failure_for_its_property() {
        let services = offline_services();
        let url = Url::parse("http://127.0.0.1:9/photos/3.jpg").expect("url");
        match services
            .handle(BackendCommand::FetchPhoto {
                id: PropertyId(3),
                url,
            })
            .await
        {
            UiEvent::PhotoFailed { id, reason } => {
                assert_eq!(id, PropertyId(3));
                assert!(reason.contains("127.0.0.1"));
            }
            _ => panic!("expected PhotoFailed"),
        }
    }
}
