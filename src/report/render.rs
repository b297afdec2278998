use std::fmt::Write as _;
use std::path::PathBuf;

use super::bundle::{MonthBundle, RangeReport, SectionReport};
use crate::analysis::climate::{ChannelStats, ClimateResult};
use crate::analysis::co2::Co2Result;
use crate::analysis::correlation::CorrelationResult;
use crate::analysis::weight::WeightResult;
use crate::analysis::SectionResult;
use crate::attribute::Attribute;
use crate::data::datetime::format_timestamp;
use crate::data::series::{
    HUMIDITY_EXTERIOR, HUMIDITY_INTERIOR, RECORD, TEMPERATURE_EXTERIOR, TEMPERATURE_INTERIOR,
};
use crate::error::RenderError;
use crate::processing::anomaly::Anomaly;
use crate::processing::statistics::SummaryStats;
use crate::processing::trend::TrendMapping;

/// Page separator of the text report.
pub const PAGE_BREAK: char = '\u{000C}';

/// Turns the assembled bundles into one report file.
pub trait ReportRenderer {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    fn render_to_string(&self, report: &RangeReport) -> Result<String, RenderError>;

    /// Write the report into its folder and return the file path.
    fn render(&self, report: &RangeReport) -> Result<PathBuf, RenderError> {
        let path = report
            .folder
            .join(format!("{}.{}", report.file_stem, self.extension()));
        let content = self.render_to_string(report)?;
        std::fs::create_dir_all(&report.folder).map_err(|source| RenderError::Io {
            path: report.folder.clone(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Report written to {:?}", path);
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render_to_string(&self, report: &RangeReport) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Paginated plain text: a title page, then one page per month.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render_to_string(&self, report: &RangeReport) -> Result<String, RenderError> {
        let mut out = String::new();
        heading(&mut out, &report.title, '=');
        let _ = writeln!(out, "Hive: {}", report.hive_id);
        let _ = writeln!(out, "Months: {}", report.months.len());

        for bundle in &report.months {
            out.push(PAGE_BREAK);
            out.push('\n');
            month_page(&mut out, bundle);
        }
        Ok(out)
    }
}

/// `N/A` for a missing value, two decimals otherwise.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "N/A".to_string(),
    }
}

fn heading(out: &mut String, text: &str, underline: char) {
    let _ = writeln!(out, "{text}");
    let _ = writeln!(out, "{}", underline.to_string().repeat(text.chars().count()));
}

fn table(out: &mut String, title: &str, header: &[&str], rows: &[Vec<String>]) {
    let _ = writeln!(out, "\n{title}");
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &width)| format!("{c:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    let _ = writeln!(out, "  {}", line(header.to_vec()));
    let rule: usize = widths.iter().sum::<usize>() + 3 * columns.saturating_sub(1);
    let _ = writeln!(out, "  {}", "-".repeat(rule));
    for row in rows {
        let _ = writeln!(out, "  {}", line(row.iter().map(String::as_str).collect()));
    }
}

fn month_page(out: &mut String, bundle: &MonthBundle) {
    heading(out, &format!("Report for {}", bundle.window), '=');
    for section in &bundle.sections {
        let _ = writeln!(out);
        section_block(out, section);
    }
}

fn section_block(out: &mut String, section: &SectionReport) {
    heading(out, section.section.title(), '-');
    match &section.result {
        SectionResult::Error(e) => {
            let _ = writeln!(out, "Error: {}", e.error);
            return;
        }
        SectionResult::Co2(r) => co2(out, r),
        SectionResult::Weight(r) => weight(out, r),
        SectionResult::Temperature(r) => climate(out, r, "Temperature", [TEMPERATURE_INTERIOR, TEMPERATURE_EXTERIOR]),
        SectionResult::Humidity(r) => climate(out, r, "Humidity", [HUMIDITY_INTERIOR, HUMIDITY_EXTERIOR]),
        SectionResult::Correlation(r) => correlation(out, r),
    }

    let slots = section.chart_slots();
    if !slots.is_empty() {
        let _ = writeln!(out, "\nCharts");
        for (name, written) in slots {
            match written {
                Some(path) => {
                    let _ = writeln!(out, "  {}", path.display());
                }
                None => {
                    let _ = writeln!(out, "  Plot not found: {name}");
                }
            }
        }
    }
}

fn stats_rows(stats: &SummaryStats, unit: &str) -> Vec<Vec<String>> {
    [
        ("Mean", stats.mean),
        ("Median", stats.median),
        ("Standard Deviation", stats.std_dev),
        ("Min", stats.min),
        ("Max", stats.max),
    ]
    .iter()
    .map(|(label, value)| vec![format!("{label} ({unit})"), format_value(*value)])
    .collect()
}

fn trend_rows(trend: &TrendMapping) -> Vec<Vec<String>> {
    trend
        .iter()
        .map(|(period, mean)| vec![period.clone(), format_value(Some(*mean))])
        .collect()
}

fn anomaly_table(out: &mut String, anomalies: &[Anomaly], columns: &[&str]) {
    if anomalies.is_empty() {
        let _ = writeln!(out, "\nAnomalies\n  None detected");
        return;
    }
    let mut header: Vec<&str> = columns.to_vec();
    header.push("Timestamp");
    let rows: Vec<Vec<String>> = anomalies
        .iter()
        .map(|a| {
            let mut row: Vec<String> = columns.iter().map(|c| format_value(a.value(c))).collect();
            row.push(format_timestamp(&a.timestamp));
            row
        })
        .collect();
    table(out, "Anomalies", &header, &rows);
}

fn co2(out: &mut String, r: &Co2Result) {
    table(out, "CO2 Statistics", &["Statistic", "Value"], &stats_rows(&r.statistics, Attribute::Co2.unit()));

    let mut diurnal = vec![
        vec!["Daytime Mean CO2 (ppm)".to_string(), format_value(r.diurnal.day_mean)],
        vec!["Nighttime Mean CO2 (ppm)".to_string(), format_value(r.diurnal.night_mean)],
    ];
    if let Some(v) = &r.diurnal.variability {
        diurnal.push(vec!["Daytime Variability (ppm)".to_string(), format_value(v.day)]);
        diurnal.push(vec!["Nighttime Variability (ppm)".to_string(), format_value(v.night)]);
    }
    table(out, "Diurnal Variations", &["Metric", "Value"], &diurnal);

    if !r.trends.weekly.is_empty() {
        table(out, "Weekly Trend", &["Week", "Average CO2 (ppm)"], &trend_rows(&r.trends.weekly));
    }
    if !r.trends.daily.is_empty() {
        table(out, "Daily Trend", &["Date", "Average CO2 (ppm)"], &trend_rows(&r.trends.daily));
    }
    anomaly_table(out, &r.anomalies, &[RECORD]);
}

fn weight(out: &mut String, r: &WeightResult) {
    table(out, "Weight Statistics", &["Statistic", "Value"], &stats_rows(&r.statistics, Attribute::Weight.unit()));

    if r.fluctuations.is_empty() {
        let _ = writeln!(out, "\nSignificant Daily Fluctuations\n  None above 1 kg");
    } else {
        let rows: Vec<Vec<String>> = r
            .fluctuations
            .iter()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    format_value(Some(d.min)),
                    format_value(Some(d.max)),
                    format_value(Some(d.mean)),
                    format_value(Some(d.fluctuation_range)),
                ]
            })
            .collect();
        table(
            out,
            "Significant Daily Fluctuations",
            &["Date", "Min (kg)", "Max (kg)", "Mean (kg)", "Range (kg)"],
            &rows,
        );
    }

    table(
        out,
        "Hourly Patterns",
        &["Metric", "Value"],
        &[
            vec!["Daytime Mean Weight (kg)".to_string(), format_value(r.hourly_patterns.day_mean)],
            vec!["Nighttime Mean Weight (kg)".to_string(), format_value(r.hourly_patterns.night_mean)],
        ],
    );
    anomaly_table(out, &r.anomalies, &[RECORD]);
}

fn climate(out: &mut String, r: &ClimateResult, name: &str, [interior, exterior]: [&str; 2]) {
    let row = |label: &str, pick: fn(&ChannelStats) -> Option<f64>| {
        vec![label.to_string(), format_value(pick(&r.interior)), format_value(pick(&r.exterior))]
    };
    table(
        out,
        &format!("{name} Statistics"),
        &["Metric", interior, exterior],
        &[
            row("Average", |s| s.mean),
            row("Min", |s| s.min),
            row("Max", |s| s.max),
            row("Standard Deviation", |s| s.std_dev),
            row("Range", |s| s.range),
        ],
    );
    anomaly_table(out, &r.anomalies, &[interior, exterior]);
}

fn correlation(out: &mut String, r: &CorrelationResult) {
    let rows: Vec<Vec<String>> = r
        .pairs
        .iter()
        .map(|p| vec![p.name.to_string(), p.formatted()])
        .collect();
    table(out, "Correlation Results", &["Pair", "Result"], &rows);
    let _ = writeln!(out, "  ({} aligned readings)", r.aligned_rows);
}
