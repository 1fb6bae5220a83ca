//! Pure SVG chart components for the dashboard
//!
//! These components render directly as SVG elements within Dioxus RSX,
//! using CSS variables for theming.

use dioxus::prelude::*;
use geodrill_core::ClimateChart;

/// Qualitative palette cycled over the months
const MONTH_COLORS: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

/// Temperature vs. precipitation scatter, one colored bubble per month
///
/// Bubble radius grows with precipitation.
#[component]
pub fn ClimateScatter(
    chart: ClimateChart,
    /// Chart width in pixels
    #[props(default = 640)]
    width: u32,
    /// Chart height in pixels
    #[props(default = 360)]
    height: u32,
) -> Element {
    let points = &chart.series.points;
    if points.is_empty() {
        return rsx! {
            div {
                class: "chart-container chart-empty",
                style: "width: {width}px; height: {height}px;",
                "No data"
            }
        };
    }

    let (t_lo, t_hi) = chart.series.temperature_range();
    let (p_lo, p_hi) = chart.series.precipitation_range();
    let t_range = (t_hi - t_lo).max(1.0);
    let p_range = (p_hi - p_lo).max(1.0);

    // Padding for labels and bubble overflow
    let padding_left = 55.0;
    let padding_right = 25.0;
    let padding_top = 40.0;
    let padding_bottom = 45.0;

    let plot_width = width as f64 - padding_left - padding_right;
    let plot_height = height as f64 - padding_top - padding_bottom;

    let scale_x = |t: f64| padding_left + ((t - t_lo) / t_range) * plot_width;
    let scale_y = |p: f64| padding_top + (1.0 - (p - p_lo) / p_range) * plot_height;
    let radius = |p: f64| 5.0 + 11.0 * (p - p_lo) / p_range;

    let grid_lines = 4;

    rsx! {
        div {
            class: "chart-container",
            style: "width: {width}px;",

            svg {
                width: "{width}",
                height: "{height}",
                view_box: "0 0 {width} {height}",

                text {
                    x: "{width as f64 / 2.0}",
                    y: "20",
                    text_anchor: "middle",
                    font_size: "16",
                    fill: "var(--accent-primary)",
                    "{chart.title}"
                }

                // Horizontal grid with precipitation ticks
                for i in 0..=grid_lines {
                    {
                        let p_val = p_lo + (i as f64) * p_range / grid_lines as f64;
                        let y_pos = scale_y(p_val);
                        rsx! {
                            line {
                                key: "h{i}",
                                x1: "{padding_left}",
                                y1: "{y_pos:.1}",
                                x2: "{width as f64 - padding_right}",
                                y2: "{y_pos:.1}",
                                stroke: "var(--border-color)",
                                stroke_dasharray: "2,2",
                                stroke_width: "1",
                            }
                            text {
                                x: "{padding_left - 6.0}",
                                y: "{y_pos:.1}",
                                text_anchor: "end",
                                dominant_baseline: "middle",
                                font_size: "10",
                                fill: "var(--text-muted)",
                                "{p_val:.0}"
                            }
                        }
                    }
                }

                // Temperature ticks
                for i in 0..=grid_lines {
                    {
                        let t_val = t_lo + (i as f64) * t_range / grid_lines as f64;
                        rsx! {
                            text {
                                key: "t{i}",
                                x: "{scale_x(t_val):.1}",
                                y: "{height as f64 - padding_bottom + 16.0}",
                                text_anchor: "middle",
                                font_size: "10",
                                fill: "var(--text-muted)",
                                "{t_val:.1}"
                            }
                        }
                    }
                }

                // Axis titles
                text {
                    x: "{padding_left + plot_width / 2.0}",
                    y: "{height as f64 - 8.0}",
                    text_anchor: "middle",
                    font_size: "11",
                    fill: "var(--text-secondary)",
                    "Temperature (°C)"
                }
                text {
                    x: "14",
                    y: "{padding_top + plot_height / 2.0}",
                    text_anchor: "middle",
                    font_size: "11",
                    fill: "var(--text-secondary)",
                    transform: "rotate(-90 14 {padding_top + plot_height / 2.0})",
                    "Precipitation (mm)"
                }

                for (i, point) in points.iter().enumerate() {
                    {
                        let color = MONTH_COLORS[i % MONTH_COLORS.len()];
                        let cx = scale_x(point.temperature_c);
                        let cy = scale_y(point.precipitation_mm);
                        let r = radius(point.precipitation_mm);
                        let tooltip = format!(
                            "{}: {:.1} °C, {:.0} mm",
                            point.month, point.temperature_c, point.precipitation_mm
                        );
                        rsx! {
                            circle {
                                key: "{point.month}",
                                cx: "{cx:.1}",
                                cy: "{cy:.1}",
                                r: "{r:.1}",
                                fill: "{color}",
                                fill_opacity: "0.75",
                                stroke: "white",
                                stroke_width: "1",
                                title { "{tooltip}" }
                            }
                        }
                    }
                }
            }

            // Month legend
            div { class: "chart-legend",
                for (i, point) in points.iter().enumerate() {
                    {
                        let color = MONTH_COLORS[i % MONTH_COLORS.len()];
                        rsx! {
                            span {
                                key: "{point.month}",
                                class: "legend-item",
                                span {
                                    class: "legend-swatch",
                                    style: "background: {color};",
                                }
                                "{point.month}"
                            }
                        }
                    }
                }
            }

            p { class: "chart-subtitle", "{chart.subtitle}" }
        }
    }
}
