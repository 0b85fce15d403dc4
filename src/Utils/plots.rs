use crate::analysis::sampling::SamplePoint;
use log::info;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// Everything drawn for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub title: String,
    pub var: String,
    /// runs of consecutive samples, drawn as separate lines
    pub segments: Vec<Vec<SamplePoint>>,
    pub x_min: f64,
    pub x_max: f64,
    pub y_intercept: Option<f64>,
    pub roots: Vec<f64>,
    /// excluded abscissas, drawn as dashed vertical lines
    pub asymptotes: Vec<f64>,
    pub evaluated_point: Option<SamplePoint>,
}

impl PlotData {
    /// vertical extent of the samples and markers, padded by 5%
    pub fn y_bounds(&self) -> (f64, f64) {
        let markers = self
            .y_intercept
            .into_iter()
            .chain(self.roots.iter().map(|_| 0.0))
            .chain(self.evaluated_point.map(|p| p.y));
        let ys = self
            .segments
            .iter()
            .flatten()
            .map(|p| p.y)
            .chain(markers)
            .filter(|y| y.is_finite());
        let (lo, hi) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        if lo > hi {
            return (-1.0, 1.0);
        }
        let pad = if hi > lo { 0.05 * (hi - lo) } else { 1.0 };
        (lo - pad, hi + pad)
    }
}

/// Renders the curve with its intercepts, asymptotes and evaluated point into a PNG file.
pub fn plot_function(data: &PlotData, path: &Path) -> Result<(), Box<dyn Error>> {
    let (y_min, y_max) = data.y_bounds();
    let root_area = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(&data.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(data.x_min..data.x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(&data.var)
        .y_desc(format!("f({})", data.var))
        .draw()?;

    for (i, segment) in data.segments.iter().enumerate() {
        let series = LineSeries::new(segment.iter().map(|p| (p.x, p.y)), &BLUE);
        let drawn = chart.draw_series(series)?;
        if i == 0 {
            drawn
                .label(data.title.clone())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        }
    }

    let dash = (y_max - y_min) / 60.0;
    for &asymptote in &data.asymptotes {
        if asymptote < data.x_min || asymptote > data.x_max {
            continue;
        }
        let dashes = (0..30).map(|k| {
            let start = y_min + 2.0 * k as f64 * dash;
            PathElement::new(
                vec![(asymptote, start), (asymptote, start + dash)],
                BLACK.mix(0.6),
            )
        });
        chart.draw_series(dashes)?;
    }

    if !data.roots.is_empty() {
        chart
            .draw_series(
                data.roots
                    .iter()
                    .filter(|r| **r >= data.x_min && **r <= data.x_max)
                    .map(|&r| Circle::new((r, 0.0), 4, RED.filled())),
            )?
            .label("roots")
            .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));
    }
    if let Some(y0) = data.y_intercept {
        chart
            .draw_series(std::iter::once(Circle::new((0.0, y0), 4, GREEN.filled())))?
            .label(format!("f(0) = {}", y0))
            .legend(|(x, y)| Circle::new((x + 10, y), 4, GREEN.filled()));
    }
    if let Some(point) = data.evaluated_point {
        chart
            .draw_series(std::iter::once(Circle::new(
                (point.x, point.y),
                5,
                MAGENTA.filled(),
            )))?
            .label(format!("f({}) = {}", point.x, point.y))
            .legend(|(x, y)| Circle::new((x + 10, y), 5, MAGENTA.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root_area.present()?;
    info!("plot saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(segments: Vec<Vec<SamplePoint>>) -> PlotData {
        PlotData {
            title: "f".to_string(),
            var: "x".to_string(),
            segments,
            x_min: -1.0,
            x_max: 1.0,
            y_intercept: None,
            roots: vec![],
            asymptotes: vec![],
            evaluated_point: None,
        }
    }

    #[test]
    fn test_y_bounds_cover_samples_and_markers() {
        let mut plot = data(vec![vec![
            SamplePoint { x: -1.0, y: 0.0 },
            SamplePoint { x: 1.0, y: 10.0 },
        ]]);
        plot.evaluated_point = Some(SamplePoint { x: 0.5, y: 20.0 });
        let (lo, hi) = plot.y_bounds();
        assert_eq!(lo, -1.0);
        assert_eq!(hi, 21.0);
    }

    #[test]
    fn test_y_bounds_without_samples() {
        assert_eq!(data(vec![]).y_bounds(), (-1.0, 1.0));
        let flat = data(vec![vec![SamplePoint { x: 0.0, y: 3.0 }]]);
        assert_eq!(flat.y_bounds(), (2.0, 4.0));
    }
}
