//! Process-lifetime memoization of the station/forecast table and the wind
//! raster.
//!
//! Both slots are filled at most once. Concurrent first callers wait on the
//! same initialization instead of issuing duplicate loads. A failed forecast
//! load is returned to the caller and leaves the slot empty; a failed raster
//! open is stored, so later samples report the failure without reopening.

use std::future::Future;
use std::path::PathBuf;

use shared::StationForecastTable;
use tokio::sync::OnceCell;

use crate::error::AppResult;
use crate::services::wind::{RasterError, WindRaster};

/// Outcome of opening the wind raster, kept for the process lifetime
pub type WindLayer = Result<WindRaster, RasterError>;

/// Shared, read-only-after-load data
#[derive(Default)]
pub struct DataCache {
    station_forecasts: OnceCell<StationForecastTable>,
    wind_raster: OnceCell<WindLayer>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Station/forecast table, loading it with `load` on first use
    pub async fn station_forecasts<F, Fut>(&self, load: F) -> AppResult<&StationForecastTable>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<StationForecastTable>>,
    {
        self.station_forecasts.get_or_try_init(load).await
    }

    /// Wind raster, opened from `path` on first use
    pub async fn wind_raster(&self, path: impl Into<PathBuf>) -> &WindLayer {
        let path = path.into();
        self.wind_raster
            .get_or_init(|| async move {
                let shown = path.display().to_string();
                let opened = tokio::task::spawn_blocking(move || WindRaster::open(&path))
                    .await
                    .unwrap_or_else(|e| Err(RasterError::Task(e.to_string())));

                match &opened {
                    Ok(raster) => tracing::info!(
                        path = %shown,
                        width = raster.width(),
                        height = raster.height(),
                        "wind raster opened"
                    ),
                    Err(e) => tracing::warn!(
                        path = %shown,
                        error = %e,
                        "wind raster unavailable, samples will be unknown"
                    ),
                }
                opened
            })
            .await
    }

    /// Whether the station/forecast table has been loaded
    pub fn has_station_forecasts(&self) -> bool {
        self.station_forecasts.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn table() -> StationForecastTable {
        StationForecastTable::join(
            vec![shared::WeatherStation {
                location_name: "Kuantan".to_string(),
                latitude: 3.8,
                longitude: 103.3,
            }],
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_station_forecasts_loaded_once() {
        let cache = DataCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .station_forecasts(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(table())
            })
            .await
            .unwrap() as *const StationForecastTable;
        let second = cache
            .station_forecasts(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(StationForecastTable::default())
            })
            .await
            .unwrap() as *const StationForecastTable;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(cache.has_station_forecasts());
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = DataCache::new();

        let failed = cache
            .station_forecasts(|| async {
                Err(AppError::ForecastUnavailable("timeout".to_string()))
            })
            .await;
        assert!(failed.is_err());
        assert!(!cache.has_station_forecasts());

        let loaded = cache.station_forecasts(|| async { Ok(table()) }).await.unwrap();
        assert_eq!(loaded.stations.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_coalesce() {
        let cache = Arc::new(DataCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .station_forecasts(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                            Ok(table())
                        })
                        .await
                        .map(|t| t.stations.len())
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_raster_is_remembered() {
        let cache = DataCache::new();
        assert!(cache.wind_raster("/nonexistent/wind.tif").await.is_err());
        // A later call with a different path still sees the first outcome
        assert!(cache.wind_raster("/other/wind.tif").await.is_err());
    }

    #[tokio::test]
    async fn test_raster_opened_and_kept() {
        use tiff::encoder::{colortype, TiffEncoder};
        use tiff::tags::Tag;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wind.tif");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(file).unwrap();
            let mut image = encoder.new_image::<colortype::Gray32Float>(1, 1).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[1.0f64, 1.0, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 103.0, 4.0, 0.0][..])
                .unwrap();
            image.write_data(&[6.5f32]).unwrap();
        }

        let cache = DataCache::new();
        let raster = cache.wind_raster(&path).await.as_ref().unwrap();
        assert_eq!((raster.width(), raster.height()), (1, 1));

        // The file is not read again once opened
        std::fs::remove_file(&path).unwrap();
        let again = cache.wind_raster(&path).await.as_ref().unwrap();
        assert_eq!(
            again.sample(shared::GpsCoordinates::new(3.5, 103.5)),
            shared::WindSample::Sampled(6.5)
        );
    }
}
