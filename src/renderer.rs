//! The fetch, decode and draw pipeline.
//!
//! [`RouteRenderer::render`] requests one page of activities, decodes every
//! record's encoded route, and draws the routes on the shared map surface in
//! the order the API returned them.
//!
//! A record without a route, or with one that does not decode, is skipped and
//! reported in [`RenderSummary::skipped`]; the remaining records are still
//! drawn. An empty route string decodes to nothing and draws nothing.

use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::activity::{ActivityRecord, ActivitySource, PageRequest};
use crate::config::RendererConfig;
use crate::error::{PolylineError, RenderError, Result};
use crate::map::{MapSurface, SharedSurface};
use crate::polyline;
use crate::GpsPoint;

/// Why a record was left off the map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("activity has no encoded route")]
    MissingPolyline,

    #[error("encoded route is malformed: {0}")]
    Malformed(#[from] PolylineError),
}

/// A record that was not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the fetched page
    pub index: usize,
    pub activity_id: Option<u64>,
    pub reason: SkipReason,
}

/// Outcome of one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Records returned by the API
    pub fetched: usize,
    /// Polylines added to the surface
    pub drawn: usize,
    /// Records whose route decoded to zero points
    pub empty: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Draws one page of activity routes onto an injected map surface.
pub struct RouteRenderer<S, M> {
    source: S,
    surface: SharedSurface<M>,
    config: RendererConfig,
}

impl<S: ActivitySource, M: MapSurface> RouteRenderer<S, M> {
    pub fn new(source: S, surface: SharedSurface<M>, config: RendererConfig) -> Self {
        Self { source, surface, config }
    }

    pub fn surface(&self) -> &SharedSurface<M> {
        &self.surface
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Fetch the first `page_size` activities and draw their routes.
    ///
    /// Fails without drawing anything when the token is empty, the page size
    /// is zero, the configured precision is unsupported, or the fetch fails. Concurrent calls are independent; each
    /// appends its own overlays once its response arrives.
    pub async fn render(&self, access_token: &str, page_size: u32) -> Result<RenderSummary> {
        let request = PageRequest::first(access_token, page_size);
        request.validate()?;
        self.config.validate().map_err(RenderError::InvalidArgument)?;

        let start = Instant::now();
        let records = self.source.fetch_page(&request).await?;
        let fetch_elapsed = start.elapsed();

        let summary = self.draw(&records).await;

        info!(
            "[RouteRenderer] drew {}/{} routes ({} empty, {} skipped) fetch={:?} total={:?}",
            summary.drawn,
            summary.fetched,
            summary.empty,
            summary.skipped.len(),
            fetch_elapsed,
            start.elapsed()
        );

        Ok(summary)
    }

    /// Decode and draw already fetched records.
    ///
    /// Everything is decoded before the surface is locked, so one render's
    /// overlays land contiguously and in record order.
    pub async fn draw(&self, records: &[ActivityRecord]) -> RenderSummary {
        let mut summary = RenderSummary {
            fetched: records.len(),
            ..Default::default()
        };

        let mut routes: Vec<Vec<GpsPoint>> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match self.decode_record(record) {
                Ok(route) if route.is_empty() => {
                    debug!("[RouteRenderer] #{} {}: empty route", index, record.label());
                    summary.empty += 1;
                }
                Ok(route) => {
                    debug!("[RouteRenderer] #{} {}: {} points", index, record.label(), route.len());
                    routes.push(route);
                }
                Err(reason) => {
                    warn!("[RouteRenderer] skipping #{} {}: {}", index, record.label(), reason);
                    summary.skipped.push(SkippedRecord {
                        index,
                        activity_id: record.id,
                        reason,
                    });
                }
            }
        }

        let mut surface = self.surface.lock().await;
        surface.add_tile_layer(&self.config.tile_layer);
        for route in &routes {
            surface.add_polyline(route, &self.config.style);
        }
        summary.drawn = routes.len();

        summary
    }

    fn decode_record(&self, record: &ActivityRecord) -> std::result::Result<Vec<GpsPoint>, SkipReason> {
        let encoded = record.encoded_route().ok_or(SkipReason::MissingPolyline)?;
        Ok(polyline::decode_with_precision(encoded, self.config.precision)?)
    }
}
