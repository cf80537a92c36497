// ABOUTME: Raster bar chart of joint angles drawn with tiny-skia
// ABOUTME: Returns RGB pixels for embedding plus bar geometry so labels can be set as PDF text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use std::collections::BTreeMap;
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::assessment::{evaluate_joint_angle, AngleEvaluation};
use crate::image::{ColorSpace, EmbeddedImage, ImageEncoding};
use crate::pdf::Color;

/// Raster width in pixels
pub const CHART_WIDTH_PX: u32 = 990;
/// Raster height in pixels
pub const CHART_HEIGHT_PX: u32 = 440;
/// Degrees between horizontal gridlines
pub const GRID_STEP_DEGREES: f64 = 30.0;

/// Smallest value the vertical axis tops out at
const MIN_AXIS_DEGREES: f64 = 180.0;
/// Plot area padding in pixels
const PADDING_PX: f32 = 20.0;

/// Chart drawing failure
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// No joint angles to plot
    #[error("no joint angles to chart")]
    Empty,
    /// The pixmap could not be allocated
    #[error("chart canvas {width}x{height} could not be allocated")]
    Canvas {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Geometry of one bar, in fractions of the chart size
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    /// Joint name
    pub joint: String,
    /// Plotted angle
    pub degrees: f64,
    /// Evaluation that picked the bar color
    pub evaluation: AngleEvaluation,
    /// Horizontal center, 0 (left) to 1 (right)
    pub center_x: f64,
    /// Top of the bar, 0 (top) to 1 (bottom)
    pub top_y: f64,
}

/// Rendered chart
#[derive(Debug, Clone)]
pub struct JointAngleChart {
    image: EmbeddedImage,
    bars: Vec<ChartBar>,
    axis_max: f64,
}

impl JointAngleChart {
    /// Pixels for embedding
    #[must_use]
    pub const fn image(&self) -> &EmbeddedImage {
        &self.image
    }

    /// Consume into the embeddable image
    #[must_use]
    pub fn into_image(self) -> EmbeddedImage {
        self.image
    }

    /// Bars in plotting order
    #[must_use]
    pub fn bars(&self) -> &[ChartBar] {
        &self.bars
    }

    /// Value at the top of the vertical axis
    #[must_use]
    pub const fn axis_max(&self) -> f64 {
        self.axis_max
    }

    /// Fraction of the chart height where the plot area ends
    #[must_use]
    pub fn baseline_y() -> f64 {
        f64::from(CHART_HEIGHT_PX as f32 - PADDING_PX) / f64::from(CHART_HEIGHT_PX)
    }

    /// Fraction of the chart height for a gridline value
    #[must_use]
    pub fn value_y(&self, degrees: f64) -> f64 {
        let plot_height = f64::from(CHART_HEIGHT_PX as f32 - 2.0 * PADDING_PX);
        let padding = f64::from(PADDING_PX);
        (padding + plot_height * (1.0 - degrees / self.axis_max)) / f64::from(CHART_HEIGHT_PX)
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

/// Round the tallest bar up to the next gridline, never below 180 degrees
fn axis_max(angles: &BTreeMap<String, f64>) -> f64 {
    let tallest = angles
        .values()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    ((tallest / GRID_STEP_DEGREES).ceil() * GRID_STEP_DEGREES).max(MIN_AXIS_DEGREES)
}

/// Draw one bar per joint, colored by its evaluation
///
/// # Errors
///
/// Returns an error when there are no angles or the canvas cannot be allocated.
pub fn render_joint_angle_chart(
    angles: &BTreeMap<String, f64>,
) -> Result<JointAngleChart, ChartError> {
    if angles.is_empty() {
        return Err(ChartError::Empty);
    }
    let mut pixmap =
        Pixmap::new(CHART_WIDTH_PX, CHART_HEIGHT_PX).ok_or(ChartError::Canvas {
            width: CHART_WIDTH_PX,
            height: CHART_HEIGHT_PX,
        })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let axis_max = axis_max(angles);
    let width = CHART_WIDTH_PX as f32;
    let height = CHART_HEIGHT_PX as f32;
    let plot_left = PADDING_PX;
    let plot_right = width - PADDING_PX;
    let plot_top = PADDING_PX;
    let plot_bottom = height - PADDING_PX;
    let plot_height = plot_bottom - plot_top;

    let grid_paint = paint_for(Color::BORDER);
    let grid_stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    let mut value = 0.0;
    while value <= axis_max {
        let y = plot_bottom - plot_height * (value / axis_max) as f32;
        let mut builder = PathBuilder::new();
        builder.move_to(plot_left, y);
        builder.line_to(plot_right, y);
        if let Some(path) = builder.finish() {
            pixmap.stroke_path(&path, &grid_paint, &grid_stroke, Transform::identity(), None);
        }
        value += GRID_STEP_DEGREES;
    }

    let slot = (plot_right - plot_left) / angles.len() as f32;
    let bar_width = slot * 0.6;
    let mut bars = Vec::with_capacity(angles.len());
    for (index, (joint, &degrees)) in angles.iter().enumerate() {
        let clamped = if degrees.is_finite() {
            degrees.clamp(0.0, axis_max)
        } else {
            0.0
        };
        let evaluation = evaluate_joint_angle(joint, degrees);
        let center = (index as f32 + 0.5).mul_add(slot, plot_left);
        let bar_height = plot_height * (clamped / axis_max) as f32;
        let top = plot_bottom - bar_height;

        if let Some(rect) = Rect::from_xywh(center - bar_width / 2.0, top, bar_width, bar_height) {
            pixmap.fill_rect(rect, &paint_for(evaluation.color()), Transform::identity(), None);
        }
        bars.push(ChartBar {
            joint: joint.clone(),
            degrees,
            evaluation,
            center_x: f64::from(center / width),
            top_y: f64::from(top / height),
        });
    }

    let axis_paint = paint_for(Color::MUTED);
    let mut builder = PathBuilder::new();
    builder.move_to(plot_left, plot_top);
    builder.line_to(plot_left, plot_bottom);
    builder.line_to(plot_right, plot_bottom);
    if let Some(path) = builder.finish() {
        pixmap.stroke_path(
            &path,
            &axis_paint,
            &Stroke {
                width: 2.0,
                ..Stroke::default()
            },
            Transform::identity(),
            None,
        );
    }

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue()]
        })
        .collect();

    Ok(JointAngleChart {
        image: EmbeddedImage {
            width: CHART_WIDTH_PX,
            height: CHART_HEIGHT_PX,
            color_space: ColorSpace::Rgb,
            encoding: ImageEncoding::Raw,
            data,
        },
        bars,
        axis_max,
    })
}
