//! Report images drawn with plotters.
//!
//! Every label goes through a font loaded from an explicit file, so category names
//! in any script render the same on every machine.

use chrono::{Duration, NaiveDate};
use plotters::coord::combinators::BindKeyPoints;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use spendbook_core::format::{category_label, point_label, summary_lines};
use spendbook_core::time::month_day;
use spendbook_core::AggregateSnapshot;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::RenderError;

/// Family name the loaded font is registered under.
const FONT_FAMILY: &str = "spendbook";

const REPORT_SIZE: (u32, u32) = (1600, 700);
const TREND_SIZE: (u32, u32) = (800, 400);

/// Largest total the amount axis can show.
pub const CHART_LIMIT: f64 = 1e15;

/// Most date labels on one axis before days are skipped.
const MAX_DATE_LABELS: usize = 12;

const SUMMARY_COLOR: RGBColor = RGBColor(139, 0, 0);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

const SLICE_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

#[derive(Debug)]
pub struct ReportRenderer {
    font_path: PathBuf,
}

impl ReportRenderer {
    /// Load the font at `font_path` and register it for all report text.
    pub fn new(font_path: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let font_path = font_path.into();
        let bytes = fs::read(&font_path).map_err(|e| RenderError::Font {
            path: font_path.clone(),
            reason: e.to_string(),
        })?;

        // plotters keeps registered font data for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| RenderError::Font {
            path: font_path.clone(),
            reason: "not a usable TrueType/OpenType font".to_string(),
        })?;

        debug!(font = %font_path.display(), "registered report font");
        Ok(Self { font_path })
    }

    /// Two panels (today's categories as a pie, daily totals as a line) with the
    /// month and today totals underneath. Overwrites `out`.
    pub fn render_report(&self, snapshot: &AggregateSnapshot, out: &Path) -> Result<(), RenderError> {
        if snapshot.todays_category_totals.is_empty() {
            return Err(RenderError::NoData);
        }
        check_chartable("today's total", snapshot.todays_category_totals.values())?;
        check_chartable("daily total", snapshot.daily_totals.values())?;
        ensure_parent(out)?;

        let root = BitMapBackend::new(out, REPORT_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (body, footer) = root.split_vertically(REPORT_SIZE.1 - 70);
        let (left, right) = body.split_horizontally(REPORT_SIZE.0 * 2 / 5);

        draw_pie(&left, &snapshot.todays_category_totals)?;
        draw_daily_line(
            &right,
            &snapshot.daily_totals,
            &LineOptions {
                title: "Daily spending trend",
                annotate: true,
                grid: false,
            },
        )?;

        let (width, _) = footer.dim_in_pixel();
        let style = font(22)
            .color(&SUMMARY_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (i, line) in summary_lines(snapshot).iter().enumerate() {
            footer
                .draw(&Text::new(
                    line.as_str(),
                    (width as i32 / 2, 6 + i as i32 * 28),
                    style.clone(),
                ))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        debug!(out = %out.display(), font = %self.font_path.display(), "rendered report");
        Ok(())
    }

    /// Daily totals on their own, with a grid. Overwrites `out`.
    pub fn render_trend(&self, daily: &BTreeMap<NaiveDate, f64>, out: &Path) -> Result<(), RenderError> {
        if daily.is_empty() {
            return Err(RenderError::NoData);
        }
        check_chartable("daily total", daily.values())?;
        ensure_parent(out)?;

        let root = BitMapBackend::new(out, TREND_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        draw_daily_line(
            &root,
            daily,
            &LineOptions {
                title: "Daily spending trend",
                annotate: false,
                grid: true,
            },
        )?;

        root.present().map_err(draw_err)?;
        debug!(out = %out.display(), font = %self.font_path.display(), "rendered trend");
        Ok(())
    }
}

struct LineOptions<'a> {
    title: &'a str,
    annotate: bool,
    grid: bool,
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn font(size: u32) -> TextStyle<'static> {
    (FONT_FAMILY, size).into_font().color(&BLACK)
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Axis ranges are built from these values and must stay well inside `f64`.
fn check_chartable<'a>(what: &str, values: impl IntoIterator<Item = &'a f64>) -> Result<(), RenderError> {
    match values.into_iter().find(|v| !(v.is_finite() && v.abs() <= CHART_LIMIT)) {
        Some(v) => Err(RenderError::OutOfRange {
            what: what.to_string(),
            value: *v,
        }),
        None => Ok(()),
    }
}

fn ensure_parent(out: &Path) -> Result<(), RenderError> {
    match out.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

fn draw_pie(area: &Area<'_>, totals: &BTreeMap<String, f64>) -> Result<(), RenderError> {
    let area = area
        .titled("Spending by category", font(28))
        .map_err(draw_err)?;

    let total: f64 = totals.values().sum();
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);

    // a pie of zeros has no angles
    if total <= 0.0 {
        let style = font(20).pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new("nothing spent today", center, style))
            .map_err(draw_err)?;
        return Ok(());
    }

    let radius = f64::from(w.min(h)) * 0.33;
    let sizes: Vec<f64> = totals.values().copied().collect();
    let labels: Vec<String> = totals
        .iter()
        .map(|(cat, amount)| category_label(cat, *amount))
        .collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| SLICE_COLORS[i % SLICE_COLORS.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(font(18));
    pie.label_offset(radius * 0.15);
    pie.percentages(font(16).color(&WHITE));
    area.draw(&pie).map_err(draw_err)?;
    Ok(())
}

fn draw_daily_line(
    area: &Area<'_>,
    daily: &BTreeMap<NaiveDate, f64>,
    opts: &LineOptions<'_>,
) -> Result<(), RenderError> {
    let Some(first) = daily.keys().next().copied() else {
        return Err(RenderError::NoData);
    };
    let points = day_points(daily, first);
    let x_end = points.last().map(|p| p.0).unwrap_or(0) + 1;

    let mut chart = ChartBuilder::on(area)
        .caption(opts.title, font(28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (-1..x_end).with_key_points(key_days(&points)),
            0f64..y_upper(&points),
        )
        .map_err(draw_err)?;

    let to_label = |x: &i32| month_day(first + Duration::days(i64::from(*x)));
    let mut mesh = chart.configure_mesh();
    mesh.x_desc("date")
        .y_desc("amount")
        .x_label_formatter(&to_label)
        .label_style(font(14))
        .axis_desc_style(font(18));
    if !opts.grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))
        .map_err(draw_err)?;

    let annotate = opts.annotate;
    chart
        .draw_series(points.iter().map(|&(x, y)| {
            let label = if annotate { point_label(y) } else { String::new() };
            EmptyElement::at((x, y))
                + Circle::new((0, 0), 4, LINE_COLOR.filled())
                + Text::new(
                    label,
                    (0, -8),
                    font(14).pos(Pos::new(HPos::Center, VPos::Bottom)),
                )
        }))
        .map_err(draw_err)?;

    Ok(())
}

/// Day offsets from `first`, paired with that day's total.
fn day_points(daily: &BTreeMap<NaiveDate, f64>, first: NaiveDate) -> Vec<(i32, f64)> {
    daily
        .iter()
        .map(|(day, total)| ((*day - first).num_days() as i32, *total))
        .collect()
}

/// Offsets that get a date label: every data day, thinned evenly once there are
/// more than fit. The last day is always labeled.
fn key_days(points: &[(i32, f64)]) -> Vec<i32> {
    let step = points.len().div_ceil(MAX_DATE_LABELS).max(1);
    let mut days: Vec<i32> = points.iter().step_by(step).map(|p| p.0).collect();
    if let Some(&(last, _)) = points.last() {
        if days.last() != Some(&last) {
            if days.len() == MAX_DATE_LABELS {
                days.pop();
            }
            days.push(last);
        }
    }
    days
}

/// Top of the amount axis, leaving headroom for point labels.
fn y_upper(points: &[(i32, f64)]) -> f64 {
    let max = points.iter().map(|p| p.1).fold(0.0, f64::max);
    if max > 0.0 { max * 1.15 } else { 1.0 }
}
