//! HTML chart report for the per-minute table
//!
//! A self-contained page with an inline SVG line chart (one line per column
//! against time of day) and a peak summary table. No scripts, no external
//! assets.

use crate::table::CombinedTable;
use crate::time_point::TimePoint;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MAX_HOUR_TICKS: usize = 12;
const Y_TICKS: u32 = 5;

/// Line colours, cycled when there are more columns
pub const PALETTE: [&str; 15] = [
    "#00215d", "#00468b", "#0071bc", "#589fef", "#8fd0ff", "#8c0000", "#c50827", "#ff5050",
    "#ff857c", "#ffb9ac", "#c9c9c9", "#999999", "#6b6b6b", "#3f3f3f", "#2a2a2a",
];

/// HTML chart formatter for a [`CombinedTable`]
#[derive(Debug)]
pub struct HtmlOutput<'a> {
    table: &'a CombinedTable,
    title: String,
}

impl<'a> HtmlOutput<'a> {
    /// Create an HTML chart formatter
    pub fn new(table: &'a CombinedTable, title: impl Into<String>) -> Self {
        Self {
            table,
            title: title.into(),
        }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: Helvetica, Arial, sans-serif;
            font-size: 13px;
            margin: 20px;
            background-color: white;
        }
        h1, h2 {
            color: #333;
        }
        .grid line {
            stroke: #e5e5e5;
        }
        .axis text {
            fill: #333;
        }
        .series {
            fill: none;
            stroke-width: 1.5;
        }
        table {
            border-collapse: collapse;
            margin-top: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 10px;
            text-align: right;
        }
        th {
            background-color: #00468b;
            color: white;
        }
        td.label {
            text-align: left;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
        }
        "#
    }

    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    /// Y axis maximum rounded up to a multiple of the tick step
    fn y_max(&self) -> u32 {
        let peak = self
            .table
            .labels()
            .iter()
            .filter_map(|l| self.table.column(l))
            .flat_map(|c| c.iter().copied())
            .max()
            .unwrap_or(0)
            .max(1);
        let step = peak.div_ceil(Y_TICKS).max(1);
        step * Y_TICKS
    }

    fn x(&self, offset: usize) -> f64 {
        let span = self.table.len().saturating_sub(1).max(1) as f64;
        MARGIN_LEFT + Self::plot_width() * offset as f64 / span
    }

    fn y(&self, value: u32, y_max: u32) -> f64 {
        MARGIN_TOP + Self::plot_height() * (1.0 - f64::from(value) / f64::from(y_max))
    }

    /// Hour boundaries to label, thinned to at most `MAX_HOUR_TICKS`
    fn hour_ticks(&self) -> Vec<(usize, TimePoint)> {
        let hours: Vec<(usize, TimePoint)> = self
            .table
            .times()
            .enumerate()
            .filter(|(_, t)| t.is_hour_aligned())
            .collect();
        let stride = hours.len().div_ceil(MAX_HOUR_TICKS).max(1);
        hours.into_iter().step_by(stride).collect()
    }

    fn render_axes(&self, y_max: u32) -> String {
        let mut svg = String::new();
        let bottom = MARGIN_TOP + Self::plot_height();

        svg.push_str("    <g class=\"grid axis\">\n");
        for i in 0..=Y_TICKS {
            let value = y_max / Y_TICKS * i;
            let y = self.y(value, y_max);
            svg.push_str(&format!(
                "      <line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>\n",
                MARGIN_LEFT,
                MARGIN_LEFT + Self::plot_width()
            ));
            svg.push_str(&format!(
                "      <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{value}</text>\n",
                MARGIN_LEFT - 6.0,
                y + 4.0
            ));
        }
        for (offset, t) in self.hour_ticks() {
            let x = self.x(offset);
            svg.push_str(&format!(
                "      <line x1=\"{x:.1}\" y1=\"{MARGIN_TOP:.1}\" x2=\"{x:.1}\" y2=\"{bottom:.1}\"/>\n"
            ));
            svg.push_str(&format!(
                "      <text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                bottom + 16.0,
                t.hour_minute()
            ));
        }
        svg.push_str("    </g>\n");

        svg.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Time</text>\n",
            MARGIN_LEFT + Self::plot_width() / 2.0,
            HEIGHT - 8.0
        ));
        svg.push_str(&format!(
            "    <text transform=\"translate(14,{:.1}) rotate(-90)\" text-anchor=\"middle\">Number of participants</text>\n",
            MARGIN_TOP + Self::plot_height() / 2.0
        ));

        svg
    }

    fn render_series(&self, y_max: u32) -> String {
        let mut svg = String::new();
        for (i, label) in self.table.labels().iter().enumerate() {
            let Some(column) = self.table.column(label) else {
                continue;
            };
            let points: Vec<String> = column
                .iter()
                .enumerate()
                .map(|(offset, &value)| format!("{:.1},{:.1}", self.x(offset), self.y(value, y_max)))
                .collect();
            svg.push_str(&format!(
                "    <polyline class=\"series\" stroke=\"{}\" points=\"{}\"><title>{}</title></polyline>\n",
                PALETTE[i % PALETTE.len()],
                points.join(" "),
                Self::escape_html(label)
            ));
        }
        svg
    }

    fn render_legend(&self) -> String {
        let mut svg = String::new();
        let x = WIDTH - MARGIN_RIGHT + 16.0;
        for (i, label) in self.table.labels().iter().enumerate() {
            let y = MARGIN_TOP + 8.0 + 18.0 * i as f64;
            svg.push_str(&format!(
                "    <line x1=\"{x:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{}\" stroke-width=\"3\"/>\n",
                x + 20.0,
                PALETTE[i % PALETTE.len()]
            ));
            svg.push_str(&format!(
                "    <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
                x + 26.0,
                y + 4.0,
                Self::escape_html(label)
            ));
        }
        svg
    }

    /// Generate the SVG chart element
    pub fn to_svg(&self) -> String {
        let y_max = self.y_max();
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n"
        );
        svg.push_str(&self.render_axes(y_max));
        svg.push_str(&self.render_series(y_max));
        svg.push_str(&self.render_legend());
        svg.push_str("</svg>\n");
        svg
    }

    /// Peak count and first peak minute for every column
    fn render_summary(&self) -> String {
        let mut html = String::new();

        html.push_str("    <h2>Peak attendance</h2>\n");
        html.push_str("    <table>\n");
        html.push_str("        <tr><th>Source</th><th>Peak</th><th>At</th></tr>\n");

        for label in self.table.labels() {
            let column = self.table.column(label).unwrap_or_default();
            let peak = column.iter().copied().max().unwrap_or(0);
            let at = column
                .iter()
                .position(|&v| v == peak && peak > 0)
                .map(|offset| self.table.start().plus_minutes(offset as i64).hour_minute())
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!(
                "        <tr><td class=\"label\">{}</td><td>{}</td><td>{}</td></tr>\n",
                Self::escape_html(label),
                peak,
                at
            ));
        }

        html.push_str("    </table>\n");
        html
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"ja\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str(&format!("    <title>{}</title>\n", Self::escape_html(&self.title)));
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str(&format!("    <h1>{}</h1>\n", Self::escape_html(&self.title)));
        html.push_str(&self.to_svg());
        html.push_str(&self.render_summary());

        html.push_str("    <div class=\"footer\">\n");
        html.push_str(&format!(
            "        {} to {}, generated by headcount\n",
            self.table.start(),
            self.table.end_exclusive()
        ));
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{align_series, OrderedSeries};
    use crate::interval::Interval;
    use crate::occupancy::count_occupancy;
    use crate::padding::pad_to_hours;

    fn tp(s: &str) -> TimePoint {
        s.parse().unwrap()
    }

    fn table(spans: &[(&str, &str, &str)]) -> CombinedTable {
        let inputs = spans
            .iter()
            .enumerate()
            .map(|(key, (label, s, e))| {
                let interval = Interval::new(tp(s), tp(e)).unwrap();
                OrderedSeries::new(key as i64, count_occupancy(label, &[interval]).unwrap())
            })
            .collect();
        pad_to_hours(&align_series(inputs).unwrap())
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(HtmlOutput::escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(HtmlOutput::escape_html("a&b"), "a&amp;b");
        assert_eq!(HtmlOutput::escape_html("\"test\""), "&quot;test&quot;");
        assert_eq!(HtmlOutput::escape_html("'test'"), "&#39;test&#39;");
    }

    #[test]
    fn test_html_output_basic_structure() {
        let t = table(&[("Z1", "2020-09-03 09:10", "2020-09-03 09:40")]);
        let html = HtmlOutput::new(&t, "Day 3").to_html();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Day 3</title>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Number of participants"));
    }

    #[test]
    fn test_one_polyline_per_column() {
        let t = table(&[
            ("Z1", "2020-09-03 09:10", "2020-09-03 09:40"),
            ("Z2", "2020-09-03 09:20", "2020-09-03 10:40"),
        ]);
        let svg = HtmlOutput::new(&t, "x").to_svg();
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains(PALETTE[0]));
        assert!(svg.contains(PALETTE[2]));
    }

    #[test]
    fn test_hour_labels_on_axis() {
        let t = table(&[("Z1", "2020-09-03 09:10", "2020-09-03 10:40")]);
        let svg = HtmlOutput::new(&t, "x").to_svg();
        assert!(svg.contains(">09:00</text>"));
        assert!(svg.contains(">10:00</text>"));
    }

    #[test]
    fn test_hour_ticks_thinned_for_long_days() {
        let t = table(&[("Z1", "2020-09-03 00:10", "2020-09-03 23:40")]);
        let ticks = HtmlOutput::new(&t, "x").hour_ticks();
        assert!(ticks.len() <= MAX_HOUR_TICKS);
        assert_eq!(ticks[0].1, tp("2020-09-03 00:00"));
    }

    #[test]
    fn test_labels_escaped() {
        let t = table(&[("<b>", "2020-09-03 09:10", "2020-09-03 09:40")]);
        let html = HtmlOutput::new(&t, "x").to_html();
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_summary_reports_peak() {
        let t = table(&[
            ("Z1", "2020-09-03 09:10", "2020-09-03 09:40"),
            ("Z2", "2020-09-03 09:20", "2020-09-03 09:30"),
        ]);
        let html = HtmlOutput::new(&t, "x").to_html();
        assert!(html.contains("<td class=\"label\">Total</td><td>2</td><td>09:20</td>"));
    }

    #[test]
    fn test_y_max_rounds_to_ticks() {
        let t = table(&[("Z1", "2020-09-03 09:10", "2020-09-03 09:40")]);
        assert_eq!(HtmlOutput::new(&t, "x").y_max(), 5);
    }
}
