//! # Activity Routes
//!
//! Fetch a page of fitness activities and draw each activity's encoded route
//! as a polyline overlay on a map surface.
//!
//! This library provides:
//! - An encoded polyline codec ([`polyline`])
//! - A reqwest-backed client for the Strava activities endpoint ([`http`])
//! - A [`MapSurface`] capability trait and an in-memory [`MapCanvas`] that
//!   exports GeoJSON or a standalone Leaflet page
//! - [`RouteRenderer`], the fetch, decode and draw pipeline
//!
//! ## Features
//!
//! - **`http`** (default) - HTTP client for activity fetching
//! - **`cli`** - the `activity-routes` command line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_routes::{
//!     ActivityRecord, MapCanvas, RendererConfig, RouteRenderer, StaticActivities, map,
//! };
//!
//! # futures::executor::block_on(async {
//! let source = StaticActivities::new(vec![
//!     ActivityRecord::with_summary_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@"),
//! ]);
//! let canvas = map::shared(MapCanvas::new());
//! let renderer = RouteRenderer::new(source, canvas.clone(), RendererConfig::default());
//!
//! let summary = renderer.render("token", 30).await.unwrap();
//! assert_eq!(summary.drawn, 1);
//! assert_eq!(canvas.lock().await.overlays().len(), 1);
//! # });
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{PolylineError, RenderError, Result};

pub mod polyline;
pub mod geo_utils;

pub mod activity;
pub use activity::{ActivityMap, ActivityRecord, ActivitySource, PageRequest, StaticActivities};

pub mod config;
pub use config::RendererConfig;

pub mod map;
pub use map::{LineJoin, LineStyle, MapCanvas, MapSurface, PolylineOverlay, SharedSurface, TileLayer};

// HTTP module for activity fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{activities_url, ActivityClient};

pub mod renderer;
pub use renderer::{RenderSummary, RouteRenderer, SkipReason, SkippedRecord};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use activity_routes::GpsPoint;
/// let point = GpsPoint::new(38.5, -120.2);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// `[lat, lng]`, the order Leaflet expects.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self { min_lat, max_lat, min_lng, max_lng })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// GeoJSON bbox order: `[west, south, east, north]`.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }
}

// ============================================================================
// Tests
// ============================================================================
