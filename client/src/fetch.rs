use gloo_net::http::Request;
use ukmap_shared::{ChoroplethModel, DatasetConfig, LoadError};

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let fetch_err = |e: gloo_net::Error| LoadError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };
    let resp = Request::get(url).send().await.map_err(fetch_err)?;
    if !resp.ok() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    resp.text().await.map_err(fetch_err)
}

/// Fetch geometry and dataset together. Either failure aborts the load.
pub async fn load_sources(
    dataset: &DatasetConfig,
    inactive_features: &[String],
) -> Result<ChoroplethModel, LoadError> {
    tracing::info!(
        geometry = %dataset.geometry_url,
        dataset = %dataset.dataset_url,
        "loading map sources"
    );
    let (geometry, table) = futures::try_join!(
        fetch_text(&dataset.geometry_url),
        fetch_text(&dataset.dataset_url)
    )?;
    ChoroplethModel::from_sources(&geometry, &table, dataset, inactive_features)
}
