use anyhow::Result;

use crate::panel::escape;
use crate::App;

/// Writes route.geojson and index.html into `dir`.
pub fn write_outputs(app: &App, dir: &str) -> Result<()> {
    fs_err::create_dir_all(dir)?;
    let geojson = serde_json::to_string_pretty(&app.map.to_geojson())?;

    let geojson_path = format!("{dir}/route.geojson");
    fs_err::write(&geojson_path, &geojson)?;
    let html_path = format!("{dir}/index.html");
    fs_err::write(&html_path, render_page(app, &geojson))?;

    info!("Wrote {geojson_path} and {html_path}");
    Ok(())
}

/// A standalone page: the map state embedded as GeoJSON, next to the instruction panel.
pub fn render_page(app: &App, geojson: &str) -> String {
    let view = app.map.view();
    // Keep the JSON from closing the script tag early
    let embedded = geojson.replace("</", "<\\/");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<div id="map" data-center="{center}" data-zoom="{zoom}"></div>
{panel}
<script type="application/geo+json" id="map-objects">
{embedded}
</script>
</body>
</html>
"#,
        title = escape(&app.title),
        center = escape(&view.center.to_string()),
        zoom = view.zoom,
        panel = app.panel.to_html(),
    )
}
