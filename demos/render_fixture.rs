//! Render a canned activities page without network access.
//!
//! Run with: cargo run --example render_fixture > routes.html

use activity_routes::{map, MapCanvas, RendererConfig, RouteRenderer, StaticActivities};

const PAGE: &str = r#"[
    {"id": 1, "name": "Sierra crossing", "type": "Ride",
     "map": {"summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}},
    {"id": 2, "name": "Indoor trainer", "type": "VirtualRide",
     "map": {"summary_polyline": ""}},
    {"id": 3, "name": "Corrupted upload", "type": "Run",
     "map": {"summary_polyline": "_p~iF"}},
    {"id": 4, "name": "Two points", "type": "Walk",
     "map": {"summary_polyline": "_ibE_seK_seK_seK"}}
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let canvas = map::shared(MapCanvas::new());
    let renderer = RouteRenderer::new(
        StaticActivities::from_json(PAGE)?,
        canvas.clone(),
        RendererConfig::default(),
    );

    let summary = renderer.render("offline", 10).await?;
    eprintln!(
        "fetched={} drawn={} empty={} skipped={}",
        summary.fetched,
        summary.drawn,
        summary.empty,
        summary.skipped.len()
    );
    for skipped in &summary.skipped {
        eprintln!("  #{}: {}", skipped.index, skipped.reason);
    }

    println!("{}", canvas.lock().await.to_leaflet_html("Activity routes")?);
    Ok(())
}
