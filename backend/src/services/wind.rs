//! Wind-speed raster reader
//!
//! Decodes a single-band GeoTIFF of modelled mean wind speed at 10 m and
//! samples it at geographic coordinates. The georeferencing comes from the
//! GeoTIFF model tags; rasters stored in EPSG:4326 or EPSG:3857 are supported.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use shared::{GpsCoordinates, SampleUnavailable, WindSample};
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;

const EPSG_WGS84: u16 = 4326;
const EPSG_WEB_MERCATOR: u16 = 3857;
/// Pre-registration code some tools still write for Web Mercator
const EPSG_GOOGLE_MERCATOR: u16 = 3785;

/// WGS84 semi-major axis used by spherical Web Mercator
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Errors opening or decoding the raster
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("cannot open raster: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot decode raster: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("raster has no georeferencing tags")]
    MissingGeoreference,

    #[error("raster geotransform is degenerate")]
    DegenerateTransform,

    #[error("unsupported raster CRS: EPSG:{0}")]
    UnsupportedCrs(u16),

    #[error("raster size does not match its pixel buffer")]
    SizeMismatch,

    #[error("raster task failed: {0}")]
    Task(String),
}

/// Native coordinate reference system of the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterCrs {
    /// Longitude/latitude degrees
    Geographic,
    /// Spherical Mercator metres
    WebMercator,
}

impl RasterCrs {
    /// Resolve the CRS from a GeoKeyDirectory. A raster without geokeys is
    /// assumed to be geographic.
    pub fn from_geokeys(directory: Option<&[u16]>) -> Result<Self, RasterError> {
        let Some(directory) = directory else {
            return Ok(RasterCrs::Geographic);
        };

        let mut model_type = None;
        let mut geographic = None;
        let mut projected = None;

        // Header is 4 shorts, then one 4-short entry per key. Only keys
        // stored inline (location 0) carry their value in the entry.
        for entry in directory.get(4..).unwrap_or_default().chunks_exact(4) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key {
                GT_MODEL_TYPE_KEY => model_type = Some(value),
                GEOGRAPHIC_TYPE_KEY => geographic = Some(value),
                PROJECTED_CS_TYPE_KEY => projected = Some(value),
                _ => {}
            }
        }

        match (model_type, projected, geographic) {
            (_, Some(EPSG_WEB_MERCATOR | EPSG_GOOGLE_MERCATOR), _) => Ok(RasterCrs::WebMercator),
            (Some(MODEL_TYPE_PROJECTED), Some(code), _) => Err(RasterError::UnsupportedCrs(code)),
            (Some(MODEL_TYPE_GEOGRAPHIC) | None, _, Some(EPSG_WGS84) | None) => {
                Ok(RasterCrs::Geographic)
            }
            (_, _, Some(code)) => Err(RasterError::UnsupportedCrs(code)),
            _ => Ok(RasterCrs::Geographic),
        }
    }

    /// Project a geographic coordinate into this CRS
    pub fn project(&self, point: GpsCoordinates) -> Result<(f64, f64), SampleUnavailable> {
        if !point.is_valid() {
            return Err(SampleUnavailable::TransformFailed(format!(
                "invalid coordinate ({}, {})",
                point.latitude, point.longitude
            )));
        }

        match self {
            RasterCrs::Geographic => Ok((point.longitude, point.latitude)),
            RasterCrs::WebMercator => {
                if point.latitude.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(SampleUnavailable::TransformFailed(format!(
                        "latitude {} outside Web Mercator bounds",
                        point.latitude
                    )));
                }
                let x = WEB_MERCATOR_RADIUS_M * point.longitude.to_radians();
                let y = WEB_MERCATOR_RADIUS_M
                    * (std::f64::consts::FRAC_PI_4 + point.latitude.to_radians() / 2.0)
                        .tan()
                        .ln();
                Ok((x, y))
            }
        }
    }
}

/// Affine pixel-to-model transform:
/// `x = c[0] + c[1] * col + c[2] * row`, `y = c[3] + c[4] * col + c[5] * row`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    /// Build from `ModelPixelScaleTag` and the first `ModelTiepointTag`
    pub fn from_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Result<Self, RasterError> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(RasterError::MissingGeoreference);
        }
        let (sx, sy) = (scale[0], scale[1]);
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        Self::checked([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy])
    }

    /// Build from a row-major 4x4 `ModelTransformationTag`
    pub fn from_matrix(matrix: &[f64]) -> Result<Self, RasterError> {
        if matrix.len() < 8 {
            return Err(RasterError::MissingGeoreference);
        }
        Self::checked([
            matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5],
        ])
    }

    fn checked(coefficients: [f64; 6]) -> Result<Self, RasterError> {
        let transform = GeoTransform(coefficients);
        if transform.determinant() == 0.0 || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(RasterError::DegenerateTransform);
        }
        Ok(transform)
    }

    fn determinant(&self) -> f64 {
        let c = &self.0;
        c[1] * c[5] - c[2] * c[4]
    }

    /// Fractional (col, row) of a model coordinate
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.0;
        let (dx, dy) = (x - c[0], y - c[3]);
        let det = self.determinant();
        let col = (c[5] * dx - c[2] * dy) / det;
        let row = (-c[4] * dx + c[1] * dy) / det;
        (col, row)
    }
}

/// A decoded wind-speed raster, read-only after open
#[derive(Debug, Clone)]
pub struct WindRaster {
    width: usize,
    height: usize,
    samples_per_pixel: usize,
    pixels: Vec<f64>,
    transform: GeoTransform,
    crs: RasterCrs,
    nodata: Option<f64>,
}

impl WindRaster {
    /// Decode the GeoTIFF at `path`
    pub fn open(path: &Path) -> Result<Self, RasterError> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?;

        let (width, height) = decoder.dimensions()?;

        let scale = decoder
            .find_tag(Tag::ModelPixelScaleTag)?
            .map(|v| v.into_f64_vec())
            .transpose()?;
        let tiepoint = decoder
            .find_tag(Tag::ModelTiepointTag)?
            .map(|v| v.into_f64_vec())
            .transpose()?;
        let matrix = decoder
            .find_tag(Tag::ModelTransformationTag)?
            .map(|v| v.into_f64_vec())
            .transpose()?;
        let geokeys = decoder
            .find_tag(Tag::GeoKeyDirectoryTag)?
            .map(|v| v.into_u16_vec())
            .transpose()?;
        let nodata = decoder
            .find_tag(Tag::GdalNodata)?
            .map(|v| v.into_string())
            .transpose()?
            .and_then(|s| parse_nodata(&s));

        let transform = match (scale, tiepoint, matrix) {
            (Some(scale), Some(tiepoint), _) => GeoTransform::from_tiepoint(&scale, &tiepoint)?,
            (_, _, Some(matrix)) => GeoTransform::from_matrix(&matrix)?,
            _ => return Err(RasterError::MissingGeoreference),
        };
        let crs = RasterCrs::from_geokeys(geokeys.as_deref())?;

        let pixels = decoding_to_f64(decoder.read_image()?);

        Self::from_parts(width as usize, height as usize, pixels, transform, crs, nodata)
    }

    /// Assemble a raster from already decoded parts
    pub fn from_parts(
        width: usize,
        height: usize,
        pixels: Vec<f64>,
        transform: GeoTransform,
        crs: RasterCrs,
        nodata: Option<f64>,
    ) -> Result<Self, RasterError> {
        let cells = width * height;
        if cells == 0 || pixels.len() < cells || pixels.len() % cells != 0 {
            return Err(RasterError::SizeMismatch);
        }

        Ok(Self {
            width,
            height,
            samples_per_pixel: pixels.len() / cells,
            pixels,
            transform,
            crs,
            nodata,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn crs(&self) -> RasterCrs {
        self.crs
    }

    /// Sample the first band at a geographic coordinate
    pub fn sample(&self, point: GpsCoordinates) -> WindSample {
        match self.try_sample(point) {
            Ok(value) => WindSample::Sampled(value),
            Err(reason) => WindSample::Unavailable(reason),
        }
    }

    fn try_sample(&self, point: GpsCoordinates) -> Result<f64, SampleUnavailable> {
        let (x, y) = self.crs.project(point)?;
        let (col, row) = self.transform.to_pixel(x, y);
        if !col.is_finite() || !row.is_finite() {
            return Err(SampleUnavailable::TransformFailed(
                "pixel position is not finite".to_string(),
            ));
        }

        let (col, row) = (col.floor(), row.floor());
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return Err(SampleUnavailable::OutsideExtent);
        }

        let index = (row as usize * self.width + col as usize) * self.samples_per_pixel;
        let value = self.pixels[index];

        if self.is_nodata(value) {
            return Err(SampleUnavailable::NoData);
        }
        if !value.is_finite() {
            return Err(SampleUnavailable::NonFinite);
        }
        Ok(value)
    }

    fn is_nodata(&self, value: f64) -> bool {
        match self.nodata {
            Some(nodata) if nodata.is_nan() => value.is_nan(),
            // Float32 rasters store the sentinel at single precision
            Some(nodata) => value == nodata || (value as f32) == (nodata as f32),
            None => false,
        }
    }
}

/// Sample a possibly unavailable raster layer
pub fn sample_layer(layer: &Result<WindRaster, RasterError>, point: GpsCoordinates) -> WindSample {
    match layer {
        Ok(raster) => raster.sample(point),
        Err(e) => WindSample::Unavailable(SampleUnavailable::RasterUnavailable(e.to_string())),
    }
}

/// GDAL writes the no-data value as ASCII, sometimes NUL terminated
fn parse_nodata(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

fn decoding_to_f64(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x3 geographic grid at 0.5 degree resolution, top-left at (6.0N, 100.0E)
    fn grid() -> WindRaster {
        let pixels = vec![
            1.0, 2.0, 3.0, 4.0, //
            5.0, -9999.0, 7.0, 8.0, //
            9.0, 10.0, f64::NAN, 12.0,
        ];
        let transform =
            GeoTransform::from_tiepoint(&[0.5, 0.5, 0.0], &[0.0, 0.0, 0.0, 100.0, 6.0, 0.0])
                .unwrap();
        WindRaster::from_parts(4, 3, pixels, transform, RasterCrs::Geographic, Some(-9999.0))
            .unwrap()
    }

    #[test]
    fn test_sample_pixel_values() {
        let raster = grid();
        assert_eq!(
            raster.sample(GpsCoordinates::new(5.9, 100.1)),
            WindSample::Sampled(1.0)
        );
        assert_eq!(
            raster.sample(GpsCoordinates::new(5.4, 101.6)),
            WindSample::Sampled(8.0)
        );
        assert_eq!(
            raster.sample(GpsCoordinates::new(4.6, 100.7)),
            WindSample::Sampled(10.0)
        );
    }

    #[test]
    fn test_sample_nodata() {
        assert_eq!(
            grid().sample(GpsCoordinates::new(5.25, 100.75)),
            WindSample::Unavailable(SampleUnavailable::NoData)
        );
    }

    #[test]
    fn test_sample_nan_pixel() {
        assert_eq!(
            grid().sample(GpsCoordinates::new(4.75, 101.25)),
            WindSample::Unavailable(SampleUnavailable::NonFinite)
        );
    }

    #[test]
    fn test_sample_outside_extent() {
        let raster = grid();
        for (lat, lon) in [(6.1, 100.5), (4.4, 100.5), (5.0, 99.9), (5.0, 102.0)] {
            assert_eq!(
                raster.sample(GpsCoordinates::new(lat, lon)),
                WindSample::Unavailable(SampleUnavailable::OutsideExtent)
            );
        }
    }

    #[test]
    fn test_invalid_coordinate_fails_transform() {
        assert!(matches!(
            grid().sample(GpsCoordinates::new(f64::NAN, 100.5)),
            WindSample::Unavailable(SampleUnavailable::TransformFailed(_))
        ));
    }

    #[test]
    fn test_web_mercator_projection() {
        let (x, y) = RasterCrs::WebMercator
            .project(GpsCoordinates::new(0.0, 180.0))
            .unwrap();
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (_, y) = RasterCrs::WebMercator
            .project(GpsCoordinates::new(3.0, 101.0))
            .unwrap();
        assert!((y - 334_111.17).abs() < 1.0);

        assert!(RasterCrs::WebMercator
            .project(GpsCoordinates::new(86.0, 0.0))
            .is_err());
    }

    #[test]
    fn test_web_mercator_raster_sampling() {
        // 2x2 cells of 100 km whose top-left corner is at the projected origin
        let transform =
            GeoTransform::from_tiepoint(&[100_000.0, 100_000.0, 0.0], &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
                .unwrap();
        let raster = WindRaster::from_parts(
            2,
            2,
            vec![1.0, 2.0, 3.0, 4.0],
            transform,
            RasterCrs::WebMercator,
            None,
        )
        .unwrap();

        // ~1.35 degrees south, ~1.35 degrees east lands in the bottom-right cell
        assert_eq!(
            raster.sample(GpsCoordinates::new(-1.35, 1.35)),
            WindSample::Sampled(4.0)
        );
    }

    #[test]
    fn test_from_matrix_matches_tiepoint() {
        let from_tiepoint =
            GeoTransform::from_tiepoint(&[0.5, 0.5, 0.0], &[0.0, 0.0, 0.0, 100.0, 6.0, 0.0])
                .unwrap();
        let from_matrix = GeoTransform::from_matrix(&[
            0.5, 0.0, 0.0, 100.0, //
            0.0, -0.5, 0.0, 6.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();
        assert_eq!(from_tiepoint, from_matrix);
    }

    #[test]
    fn test_degenerate_transform_rejected() {
        assert!(matches!(
            GeoTransform::from_tiepoint(&[0.0, 0.5, 0.0], &[0.0, 0.0, 0.0, 100.0, 6.0, 0.0]),
            Err(RasterError::DegenerateTransform)
        ));
    }

    #[test]
    fn test_crs_from_geokeys() {
        assert_eq!(RasterCrs::from_geokeys(None).unwrap(), RasterCrs::Geographic);
        assert_eq!(
            RasterCrs::from_geokeys(Some(&[1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326])).unwrap(),
            RasterCrs::Geographic
        );
        assert_eq!(
            RasterCrs::from_geokeys(Some(&[1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 3857])).unwrap(),
            RasterCrs::WebMercator
        );
        assert!(matches!(
            RasterCrs::from_geokeys(Some(&[1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32647])),
            Err(RasterError::UnsupportedCrs(32647))
        ));
    }

    #[test]
    fn test_parse_nodata() {
        assert_eq!(parse_nodata("-9999\0"), Some(-9999.0));
        assert_eq!(parse_nodata(" -3.4028234663852886e+38 "), Some(f32::MIN as f64));
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert_eq!(parse_nodata("none"), None);
    }

    #[test]
    fn test_unavailable_layer_reports_reason() {
        let layer: Result<WindRaster, RasterError> = Err(RasterError::MissingGeoreference);
        match sample_layer(&layer, GpsCoordinates::new(3.0, 101.0)) {
            WindSample::Unavailable(SampleUnavailable::RasterUnavailable(msg)) => {
                assert!(msg.contains("georeferencing"))
            }
            other => panic!("unexpected sample {:?}", other),
        }
    }
}
