// src/report.rs
//! Self-contained HTML report: metrics, two bar charts (inline PNG data
//! URIs), negative keywords, and recommendations. Chart rasterization is
//! the only external collaborator; when it fails the image is omitted and
//! the document still renders.

use anyhow::{anyhow, Result};
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::prelude::*;

use crate::insights::InsightsSnapshot;
use crate::summary::MetricsSnapshot;

const CHART_W: u32 = 640;
const CHART_H: u32 = 420;

/// Render one percentage bar chart to PNG bytes.
fn bar_chart_png(title: &str, x_desc: &str, labels: &[String], values: &[f64]) -> Result<Vec<u8>> {
    let mut rgb = vec![0u8; (CHART_W * CHART_H * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (CHART_W, CHART_H)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("chart fill: {e}"))?;

        let n = labels.len().max(1) as i32;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(36)
            .y_label_area_size(48)
            .build_cartesian_2d(0..n, 0f64..100f64)
            .map_err(|e| anyhow!("chart build: {e}"))?;

        let label_for = |x: &i32| labels.get(*x as usize).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&label_for)
            .x_desc(x_desc)
            .y_desc("Percent")
            .draw()
            .map_err(|e| anyhow!("chart mesh: {e}"))?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *v)], BLUE.mix(0.6).filled())
            }))
            .map_err(|e| anyhow!("chart bars: {e}"))?;

        root.present().map_err(|e| anyhow!("chart present: {e}"))?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&rgb, CHART_W, CHART_H, ExtendedColorType::Rgb8)?;
    Ok(png)
}

/// Chart as an `<img>` data URI, or an empty string when rasterization
/// fails; the failure stays in the logs.
fn chart_img(title: &str, x_desc: &str, labels: &[String], values: &[f64]) -> String {
    match bar_chart_png(title, x_desc, labels, values) {
        Ok(png) => {
            let b64 = base64::engine::general_purpose::STANDARD.encode(png);
            format!(r#"<img src="data:image/png;base64,{b64}" alt="{title}" />"#)
        }
        Err(e) => {
            tracing::warn!(error = %e, title, "chart rasterization failed, omitting image");
            String::new()
        }
    }
}

fn esc(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

pub fn render_report(
    app_id: &str,
    country: &str,
    metrics: &MetricsSnapshot,
    insights: &InsightsSnapshot,
) -> String {
    let rating_labels: Vec<String> = metrics.distribution.keys().cloned().collect();
    let rating_values: Vec<f64> = metrics.distribution.values().copied().collect();
    let ratings_chart = chart_img("Rating Distribution (%)", "Stars", &rating_labels, &rating_values);

    let sent_labels: Vec<String> = insights.sentiment_percent.keys().cloned().collect();
    let sent_values: Vec<f64> = insights.sentiment_percent.values().copied().collect();
    let sentiment_chart = chart_img("Sentiment Distribution (%)", "Sentiment", &sent_labels, &sent_values);

    let keywords = if insights.top_negative_keywords.is_empty() {
        "\u{2014}".to_string()
    } else {
        esc(&insights.top_negative_keywords.join(", "))
    };
    let recommendations: String = insights
        .recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", esc(r)))
        .collect();

    format!(
        r#"<html><head><meta charset='utf-8'><title>Report for {app} ({cc})</title>
<style>body{{font-family:Arial,Helvetica,sans-serif; margin:24px}} .grid{{display:grid; grid-template-columns:1fr 1fr; gap:24px}}</style>
</head><body>
<h1>App Store Review Analysis &mdash; App {app} / {cc_upper}</h1>
<h2>Metrics</h2>
<ul>
  <li>Total reviews: <b>{count}</b></li>
  <li>Average rating: <b>{avg}</b></li>
</ul>
<div class="grid">
  <div><h3>Ratings</h3>{ratings_chart}</div>
  <div><h3>Sentiment</h3>{sentiment_chart}</div>
</div>
<h2>Top Negative Keywords</h2>
<p>{keywords}</p>
<h2>Recommendations</h2>
<ul>
{recommendations}
</ul>
<p style="margin-top:40px;font-size:12px;color:#666">Generated by App Store Review Analysis API</p>
</body></html>
"#,
        app = esc(app_id),
        cc = esc(country),
        cc_upper = esc(&country.to_uppercase()),
        count = metrics.count,
        avg = metrics.average_rating,
    )
}
