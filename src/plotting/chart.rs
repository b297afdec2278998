use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use super::{coolwarm, BoxChart, DualAxisChart, Heatmap, HourlyProfileChart, Line, Plotter, Rgb, TimeChart};
use crate::data::datetime::{from_epoch_seconds, to_epoch_seconds};
use crate::error::PlotError;
use crate::processing::downsampling::lttb_downsample;
use crate::processing::statistics::BoxSummary;

/// PNG charts drawn with `plotters`.
#[derive(Debug, Clone)]
pub struct ChartPlotter {
    pub width: u32,
    pub height: u32,
    /// Lines longer than this are reduced with LTTB before drawing.
    pub max_points: usize,
}

impl Default for ChartPlotter {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            max_points: 2000,
        }
    }
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

fn date_tick(secs: &f64) -> String {
    from_epoch_seconds(*secs)
        .map(|ts| ts.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Range covering `values` with a 5% margin. A single value gets a unit
/// margin so the range is never empty.
fn padded(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let margin = if max > min { (max - min) * 0.05 } else { 1.0 };
    Some((min - margin)..(max + margin))
}

impl ChartPlotter {
    fn to_xy(&self, line: &Line) -> Vec<(f64, f64)> {
        let points: Vec<(f64, f64)> = line
            .points
            .iter()
            .map(|(ts, v)| (to_epoch_seconds(ts), *v))
            .collect();
        lttb_downsample(&points, self.max_points)
    }
}

impl Plotter for ChartPlotter {
    fn time_series(&self, chart: &TimeChart, path: &Path) -> Result<(), PlotError> {
        let lines: Vec<(&Line, Vec<(f64, f64)>)> = chart.lines.iter().map(|l| (l, self.to_xy(l))).collect();
        let all = || lines.iter().flat_map(|(_, pts)| pts.iter());
        let empty = || PlotError::Empty(chart.title.clone());
        let x_range = padded(all().map(|p| p.0)).ok_or_else(empty)?;
        let y_range = padded(all().map(|p| p.1)).ok_or_else(empty)?;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        ctx.configure_mesh()
            .x_labels(10)
            .y_labels(10)
            .x_label_formatter(&date_tick)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc("Date")
            .y_desc(&chart.y_label)
            .draw()?;

        for (line, points) in &lines {
            let c = color(line.color);
            ctx.draw_series(LineSeries::new(points.iter().copied(), c))?
                .label(line.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn hourly_profile(&self, chart: &HourlyProfileChart, path: &Path) -> Result<(), PlotError> {
        let points: Vec<(f64, f64)> = chart.profile.iter().map(|(h, v)| (f64::from(*h), *v)).collect();
        let y_range = padded(points.iter().map(|p| p.1)).ok_or_else(|| PlotError::Empty(chart.title.clone()))?;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..23.5f64, y_range)?;

        ctx.configure_mesh()
            .x_labels(24)
            .y_labels(10)
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc("Hour of Day")
            .y_desc(&chart.y_label)
            .draw()?;

        let c = color(chart.color);
        ctx.draw_series(LineSeries::new(points.iter().copied(), c))?
            .label(chart.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        ctx.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, c.filled())))?;

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn dual_axis(&self, chart: &DualAxisChart, path: &Path) -> Result<(), PlotError> {
        let left = self.to_xy(&chart.left);
        let right: Vec<(&Line, Vec<(f64, f64)>)> = chart.right.iter().map(|l| (l, self.to_xy(l))).collect();
        let empty = || PlotError::Empty(chart.title.clone());

        let x_range = padded(
            left.iter()
                .map(|p| p.0)
                .chain(right.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.0))),
        )
        .ok_or_else(empty)?;
        let left_range = padded(left.iter().map(|p| p.1)).ok_or_else(empty)?;
        let right_range = padded(right.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1))).ok_or_else(empty)?;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), left_range)?
            .set_secondary_coord(x_range, right_range);

        ctx.configure_mesh()
            .x_labels(10)
            .y_labels(10)
            .x_label_formatter(&date_tick)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc("Date")
            .y_desc(&chart.left_label)
            .draw()?;
        ctx.configure_secondary_axes()
            .y_labels(10)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .y_desc(&chart.right_label)
            .draw()?;

        let c = color(chart.left.color);
        ctx.draw_series(LineSeries::new(left.iter().copied(), c))?
            .label(chart.left.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        for (line, points) in &right {
            let c = color(line.color);
            ctx.draw_secondary_series(LineSeries::new(points.iter().copied(), c))?
                .label(line.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn box_plot(&self, chart: &BoxChart, path: &Path) -> Result<(), PlotError> {
        // Groups without readings keep their slot on the axis but draw nothing.
        let boxes: Vec<(f64, RGBColor, BoxSummary, Vec<f64>)> = chart
            .groups
            .iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let summary = BoxSummary::compute(&group.values)?;
                let outliers = group
                    .values
                    .iter()
                    .copied()
                    .filter(|v| *v < summary.lower_whisker || *v > summary.upper_whisker)
                    .collect();
                Some((i as f64, color(group.color), summary, outliers))
            })
            .collect();
        if boxes.is_empty() {
            return Err(PlotError::Empty(chart.title.clone()));
        }
        let y_range = padded(
            chart
                .groups
                .iter()
                .flat_map(|g| g.values.iter().copied()),
        )
        .ok_or_else(|| PlotError::Empty(chart.title.clone()))?;

        let n = chart.groups.len();
        let x_tick = |v: &f64| {
            let idx = v.round();
            if (v - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < n {
                chart.groups[idx as usize].label.clone()
            } else {
                String::new()
            }
        };

        let root = BitMapBackend::new(path, (self.width.min(900), self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_range)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .y_labels(10)
            .x_label_formatter(&x_tick)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .draw()?;

        const HALF_WIDTH: f64 = 0.3;
        for (x, c, summary, outliers) in &boxes {
            let (x, c, s) = (*x, *c, summary);
            ctx.draw_series(std::iter::once(Rectangle::new(
                [(x - HALF_WIDTH, s.q1), (x + HALF_WIDTH, s.q3)],
                c.mix(0.6).filled(),
            )))?;
            ctx.draw_series(std::iter::once(Rectangle::new(
                [(x - HALF_WIDTH, s.q1), (x + HALF_WIDTH, s.q3)],
                BLACK.stroke_width(1),
            )))?;

            // Median, whiskers and their caps.
            let cap = HALF_WIDTH / 2.0;
            let segments = [
                vec![(x - HALF_WIDTH, s.median), (x + HALF_WIDTH, s.median)],
                vec![(x, s.q3), (x, s.upper_whisker)],
                vec![(x, s.q1), (x, s.lower_whisker)],
                vec![(x - cap, s.upper_whisker), (x + cap, s.upper_whisker)],
                vec![(x - cap, s.lower_whisker), (x + cap, s.lower_whisker)],
            ];
            ctx.draw_series(
                segments
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
            )?;
            ctx.draw_series(
                outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), 3, BLACK.stroke_width(1))),
            )?;
        }

        root.present()?;
        Ok(())
    }

    fn heatmap(&self, chart: &Heatmap, path: &Path) -> Result<(), PlotError> {
        let labels = &chart.matrix.labels;
        let n = labels.len();
        if n == 0 {
            return Err(PlotError::Empty(chart.title.clone()));
        }
        let extent = n as f64 - 0.5;
        // Row 0 is drawn at the top.
        let index = |v: &f64| -> Option<usize> {
            let idx = v.round();
            ((v - idx).abs() < 1e-6 && idx >= 0.0 && idx < n as f64).then_some(idx as usize)
        };
        let x_tick = |v: &f64| index(v).map(|i| labels[i].clone()).unwrap_or_default();
        let y_tick = |v: &f64| index(v).map(|i| labels[n - 1 - i].clone()).unwrap_or_default();

        let side = self.height.max(600);
        let root = BitMapBackend::new(path, (side + 200, side)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(140)
            .build_cartesian_2d(-0.5f64..extent, -0.5f64..extent)?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_tick)
            .y_label_formatter(&y_tick)
            .draw()?;

        let cells: Vec<(f64, f64, Option<f64>)> = chart
            .matrix
            .values
            .iter()
            .enumerate()
            .flat_map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .map(move |(col, v)| (col as f64, (n - 1 - row) as f64, *v))
            })
            .collect();

        ctx.draw_series(cells.iter().map(|&(x, y, v)| {
            let fill = v.map(coolwarm).map(color).unwrap_or(WHITE);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], fill.filled())
        }))?;
        ctx.draw_series(cells.iter().map(|&(x, y, v)| {
            let text = v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string());
            Text::new(text, (x - 0.15, y), ("sans-serif", 16).into_font())
        }))?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::correlation::CorrelationMatrix;

    #[test]
    fn padded_range() {
        assert_eq!(padded([0.0, 100.0].into_iter()), Some(-5.0..105.0));
        assert_eq!(padded([5.0].into_iter()), Some(4.0..6.0));
        assert_eq!(padded([f64::NAN].into_iter()), None);
    }

    #[test]
    fn empty_charts_are_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let plotter = ChartPlotter::default();
        let chart = TimeChart {
            title: "CO2 Trend".to_string(),
            y_label: "CO2 (ppm)".to_string(),
            lines: vec![Line::new("CO2 Level", crate::plotting::RED, Vec::new())],
        };
        let path = dir.path().join("co2_monthly_trend.png");
        assert!(matches!(plotter.time_series(&chart, &path), Err(PlotError::Empty(_))));
        assert!(!path.exists());

        let heatmap = Heatmap {
            title: "Correlation Heatmap".to_string(),
            matrix: CorrelationMatrix {
                labels: Vec::new(),
                values: Vec::new(),
            },
        };
        assert!(matches!(plotter.heatmap(&heatmap, &path), Err(PlotError::Empty(_))));

        let boxes = BoxChart {
            title: "Diurnal CO2 Variation".to_string(),
            x_label: "Period".to_string(),
            y_label: "CO2 (ppm)".to_string(),
            groups: vec![crate::plotting::BoxGroup {
                label: "Day".to_string(),
                color: crate::plotting::ORANGE,
                values: vec![f64::NAN],
            }],
        };
        assert!(matches!(plotter.box_plot(&boxes, &path), Err(PlotError::Empty(_))));
    }
}
