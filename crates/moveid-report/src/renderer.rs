// ABOUTME: Lays an analysis report out into a paginated A4 PDF with a fixed section order
// ABOUTME: Image and chart failures degrade to placeholders; every placed block is logged for inspection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Report document assembly.
//!
//! Sections are emitted top to bottom in a fixed order. Every block goes
//! through [`PageCursor::reserve`], so a block either fits under the cursor or
//! starts a new page. Wrapped text is placed one line at a time.

use chrono::{DateTime, Utc};
use moveid_core::models::{AnalysisReport, PhaseResult};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::assessment::{evaluate_joint_angle, format_joint_name, normal_range, RiskLevel};
use crate::chart::{render_joint_angle_chart, JointAngleChart};
use crate::image::decode_source_image;
use crate::layout::{PageCursor, PageGeometry, Slot};
use crate::metrics::{text_width, truncate_to_width, wrap_text, Font};
use crate::pdf::{Color, PdfCanvas, PdfError};

const TITLE: &str = "MoveID Movement Analysis Report";
const DISCLAIMER: &str = "This report was generated automatically and is intended for educational and \
    training purposes only. It does not replace an assessment by a qualified health or fitness \
    professional. Reference ranges, evaluations and risk levels are indicative heuristics, not \
    clinical thresholds.";

const BODY_SIZE: f64 = 10.5;
const BODY_LINE: f64 = 14.0;
const SMALL_SIZE: f64 = 8.5;
const SMALL_LINE: f64 = 11.0;
const HEADING_SIZE: f64 = 14.0;
const HEADING_HEIGHT: f64 = 28.0;
/// A heading only goes at the bottom of a page if this much room follows it
const HEADING_KEEP_WITH_NEXT: f64 = 40.0;
const SECTION_GAP: f64 = 14.0;
const TABLE_HEADER_HEIGHT: f64 = 20.0;
const TABLE_ROW_HEIGHT: f64 = 18.0;
const PHASE_MAX_LINES: usize = 4;
const PHASE_LINE: f64 = 13.0;
const MAX_SOURCE_IMAGE_HEIGHT: f64 = 300.0;
const ANNOTATION_HEIGHT: f64 = 34.0;
const CHART_LABEL_BAND: f64 = 28.0;
const PLACEHOLDER_HEIGHT: f64 = 40.0;

/// Report sections in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Title band and subject block
    Header,
    /// Score box and description
    ExecutiveSummary,
    /// Embedded source frame with annotation box
    SourceImage,
    /// Joint angle table, muscles and movement quality
    BiomechanicalParameters,
    /// One block per movement phase
    PhaseAnalysis,
    /// Bar chart of joint angles
    JointAngleChart,
    /// Risk level box and risk factors
    RiskAssessment,
    /// Numbered recommendations
    Recommendations,
    /// Technical details and disclaimer
    TechnicalAppendix,
    /// Page numbers on every page
    Footer,
}

/// Where one block landed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockPlacement {
    /// Owning section
    pub section: Section,
    /// Zero-based page index
    pub page: usize,
    /// Top y, top-down
    pub top: f64,
    /// Bottom y, top-down
    pub bottom: f64,
}

/// Which optional sections to include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    /// Draw the joint angle chart
    pub include_charts: bool,
    /// Embed the source frame when one is supplied
    pub include_source_image: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_charts: true,
            include_source_image: true,
        }
    }
}

/// Everything needed to render one report
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// Report to lay out
    pub report: &'a AnalysisReport,
    /// Subject shown in the header
    pub subject_name: &'a str,
    /// Exercise label shown in the header
    pub exercise_label: &'a str,
    /// Generation timestamp printed in the header and footer
    pub generated_at: DateTime<Utc>,
    /// Representative still frame, JPEG or PNG
    pub source_image: Option<&'a [u8]>,
    /// Optional section switches
    pub options: RenderOptions,
}

/// Rendered PDF plus its layout log
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// PDF file contents
    pub bytes: Vec<u8>,
    /// Number of pages
    pub page_count: usize,
    /// Sections in the order they were emitted
    pub sections: Vec<Section>,
    /// Every block placed by the page cursor
    pub placements: Vec<BlockPlacement>,
}

/// Rendering failure
///
/// Only document serialization can fail; image and chart problems are
/// replaced with placeholders.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PDF serialization failed
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Download file name: `moveid-<exercise>-<YYYYMMDD-HHMMSS>.pdf`
#[must_use]
pub fn report_file_name(exercise_label: &str, timestamp: DateTime<Utc>) -> String {
    let mut slug = String::with_capacity(exercise_label.len());
    for c in exercise_label.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "analysis" } else { slug };
    format!("moveid-{slug}-{}.pdf", timestamp.format("%Y%m%d-%H%M%S"))
}

fn score_color(score: u8) -> Color {
    match score {
        80..=u8::MAX => Color::rgb(46, 160, 67),
        60..=79 => Color::rgb(230, 145, 30),
        _ => Color::rgb(207, 34, 46),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Stateless report renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer {
    geometry: PageGeometry,
}

impl ReportRenderer {
    /// Renderer for A4 pages
    #[must_use]
    pub const fn new() -> Self {
        Self {
            geometry: PageGeometry::a4(),
        }
    }

    /// Renderer for custom page geometry
    #[must_use]
    pub const fn with_geometry(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    /// Lay out and serialize the report
    ///
    /// # Errors
    ///
    /// Returns an error only if the PDF cannot be serialized.
    #[instrument(skip_all, fields(exercise = %request.exercise_label))]
    pub fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedDocument, RenderError> {
        let mut doc = DocumentBuilder::new(self.geometry);

        doc.header(request);
        doc.executive_summary(request.report);
        if request.options.include_source_image {
            if let Some(bytes) = request.source_image {
                doc.source_image(bytes, request.report);
            }
        }
        doc.biomechanical_parameters(request.report);
        doc.phase_analysis(&request.report.movement_phases);
        if request.options.include_charts && !request.report.biomechanics.joint_angles.is_empty() {
            doc.joint_angle_chart(request.report);
        }
        doc.risk_assessment(request.report);
        doc.recommendations(&request.report.recommendations);
        doc.technical_appendix(request.report);
        doc.footer(request.generated_at);

        let page_count = doc.canvas.page_count();
        let title = format!("{TITLE} - {}", capitalize(request.exercise_label));
        let bytes = doc.canvas.finish(&title, request.generated_at)?;
        debug!(
            page_count,
            sections = doc.sections.len(),
            blocks = doc.placements.len(),
            size_bytes = bytes.len(),
            "report rendered"
        );

        Ok(RenderedDocument {
            bytes,
            page_count,
            sections: doc.sections,
            placements: doc.placements,
        })
    }
}

struct DocumentBuilder {
    geometry: PageGeometry,
    canvas: PdfCanvas,
    cursor: PageCursor,
    sections: Vec<Section>,
    placements: Vec<BlockPlacement>,
    current: Section,
}

impl DocumentBuilder {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            canvas: PdfCanvas::new(geometry),
            cursor: PageCursor::new(geometry),
            sections: Vec::new(),
            placements: Vec::new(),
            current: Section::Header,
        }
    }

    fn left(&self) -> f64 {
        self.geometry.margin
    }

    fn width(&self) -> f64 {
        self.geometry.content_width()
    }

    fn right(&self) -> f64 {
        self.geometry.width - self.geometry.margin
    }

    fn begin(&mut self, section: Section) {
        self.current = section;
        self.sections.push(section);
    }

    /// Reserve a block of `height`, advance past it and log it
    fn place(&mut self, height: f64) -> Slot {
        self.place_keeping(height, height)
    }

    /// Like [`Self::place`], but require `required` points of room so the block
    /// is not stranded at the bottom of a page
    fn place_keeping(&mut self, height: f64, required: f64) -> Slot {
        let slot = self.cursor.reserve(required.max(height));
        self.cursor.advance(height);
        self.canvas.ensure_page(slot.page);
        self.placements.push(BlockPlacement {
            section: self.current,
            page: slot.page,
            top: slot.top,
            bottom: slot.top + height,
        });
        slot
    }

    fn heading(&mut self, title: &str) {
        let slot = self.place_keeping(HEADING_HEIGHT, HEADING_HEIGHT + HEADING_KEEP_WITH_NEXT);
        let (left, right) = (self.left(), self.right());
        self.canvas.text(
            slot.page,
            left,
            slot.top + HEADING_SIZE + 2.0,
            title,
            Font::Bold,
            HEADING_SIZE,
            Color::ACCENT,
        );
        let rule_y = slot.top + HEADING_HEIGHT - 6.0;
        self.canvas
            .line(slot.page, (left, rule_y), (right, rule_y), Color::BORDER);
    }

    /// Emit pre-wrapped lines one block per line
    fn lines(
        &mut self,
        lines: &[String],
        font: Font,
        size: f64,
        line_height: f64,
        color: Color,
        indent: f64,
    ) {
        let x = self.left() + indent;
        for line in lines {
            let slot = self.place(line_height);
            self.canvas
                .text(slot.page, x, slot.top + size, line, font, size, color);
        }
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f64, line_height: f64, color: Color) {
        let lines = wrap_text(text, font, size, self.width());
        self.lines(&lines, font, size, line_height, color, 0.0);
    }

    fn placeholder(&mut self, message: &str) {
        let slot = self.place(PLACEHOLDER_HEIGHT);
        let (left, width) = (self.left(), self.width());
        self.canvas
            .fill_rect(slot.page, left, slot.top, width, PLACEHOLDER_HEIGHT - 6.0, Color::PANEL);
        self.canvas.stroke_rect(
            slot.page,
            left,
            slot.top,
            width,
            PLACEHOLDER_HEIGHT - 6.0,
            Color::BORDER,
            0.75,
        );
        self.canvas.text(
            slot.page,
            left + 12.0,
            slot.top + 21.0,
            message,
            Font::Regular,
            BODY_SIZE,
            Color::MUTED,
        );
    }

    fn gap(&mut self) {
        self.cursor.space(SECTION_GAP);
    }

    fn header(&mut self, request: &RenderRequest<'_>) {
        self.begin(Section::Header);
        let (left, width) = (self.left(), self.width());

        let band = self.place(64.0);
        self.canvas
            .fill_rect(band.page, left, band.top, width, 56.0, Color::ACCENT);
        self.canvas.text(
            band.page,
            left + 16.0,
            band.top + 27.0,
            TITLE,
            Font::Bold,
            18.0,
            Color::WHITE,
        );
        self.canvas.text(
            band.page,
            left + 16.0,
            band.top + 45.0,
            "Automated biomechanical movement assessment",
            Font::Regular,
            10.0,
            Color::WHITE,
        );

        let info = self.place(58.0);
        self.canvas
            .fill_rect(info.page, left, info.top, width, 50.0, Color::PANEL);
        let subject = if request.subject_name.trim().is_empty() {
            "Not informed"
        } else {
            request.subject_name.trim()
        };
        let rows = [
            ("Subject:", subject.to_owned(), "Exercise:", capitalize(request.exercise_label)),
            (
                "Generated:",
                request.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                "Confidence:",
                format!("{:.0}%", request.report.confidence_score * 100.0),
            ),
        ];
        let column = left + width / 2.0;
        for (index, (label_a, value_a, label_b, value_b)) in rows.iter().enumerate() {
            let baseline = info.top + 20.0 + 18.0 * index as f64;
            for (x, label, value) in [(left + 12.0, label_a, value_a), (column, label_b, value_b)] {
                self.canvas
                    .text(info.page, x, baseline, label, Font::Bold, 10.0, Color::TEXT);
                let value_x = x + text_width(label, Font::Bold, 10.0) + 4.0;
                let value = truncate_to_width(value, Font::Regular, 10.0, column - left - 80.0);
                self.canvas
                    .text(info.page, value_x, baseline, &value, Font::Regular, 10.0, Color::TEXT);
            }
        }
        self.gap();
    }

    fn executive_summary(&mut self, report: &AnalysisReport) {
        self.begin(Section::ExecutiveSummary);
        self.heading("Executive Summary");
        let (left, width) = (self.left(), self.width());

        let slot = self.place(72.0);
        self.canvas
            .fill_rect(slot.page, left, slot.top, width, 64.0, Color::PANEL);
        self.canvas.fill_rect(
            slot.page,
            left,
            slot.top,
            6.0,
            64.0,
            score_color(report.score),
        );
        self.canvas.text(
            slot.page,
            left + 20.0,
            slot.top + 42.0,
            &format!("{}/100", report.score),
            Font::Bold,
            30.0,
            score_color(report.score),
        );
        let details_x = left + 150.0;
        self.canvas.text(
            slot.page,
            details_x,
            slot.top + 26.0,
            "Overall movement score",
            Font::Bold,
            11.0,
            Color::TEXT,
        );
        let quality = if report.biomechanics.movement_quality.is_empty() {
            "Not assessed"
        } else {
            report.biomechanics.movement_quality.as_str()
        };
        self.canvas.text(
            slot.page,
            details_x,
            slot.top + 44.0,
            &format!("Movement quality: {quality}"),
            Font::Regular,
            10.0,
            Color::MUTED,
        );

        let description = if report.description.trim().is_empty() {
            "No description was provided for this analysis."
        } else {
            report.description.as_str()
        };
        self.paragraph(description, Font::Regular, BODY_SIZE, BODY_LINE, Color::TEXT);
        self.gap();
    }

    fn source_image(&mut self, bytes: &[u8], report: &AnalysisReport) {
        self.begin(Section::SourceImage);
        self.heading("Analyzed Frame");

        let image = match decode_source_image(bytes) {
            Ok(image) => image,
            Err(error) => {
                warn!(%error, size_bytes = bytes.len(), "source image could not be embedded");
                self.placeholder("Source image could not be embedded in this report.");
                self.gap();
                return;
            }
        };

        let mut image_width = self.width().min(360.0);
        let mut image_height = image_width * image.aspect_ratio();
        if image_height > MAX_SOURCE_IMAGE_HEIGHT {
            image_height = MAX_SOURCE_IMAGE_HEIGHT;
            image_width = image_height / image.aspect_ratio();
        }
        let slot = self.place(image_height + ANNOTATION_HEIGHT + 6.0);
        let x = self.left() + (self.width() - image_width) / 2.0;
        self.canvas
            .image(slot.page, x, slot.top, image_width, image_height, image);
        self.canvas.stroke_rect(
            slot.page,
            x,
            slot.top,
            image_width,
            image_height,
            Color::BORDER,
            1.0,
        );

        let annotation_top = slot.top + image_height + 6.0;
        let (left, width) = (self.left(), self.width());
        self.canvas.stroke_rect(
            slot.page,
            left,
            annotation_top,
            width,
            ANNOTATION_HEIGHT - 4.0,
            score_color(report.score),
            1.0,
        );
        let annotation = format!(
            "Representative frame. Score {}/100, {} risk factor(s) flagged, {} joint measurement(s).",
            report.score,
            report.biomechanics.risk_factors.len(),
            report.biomechanics.joint_angles.len(),
        );
        let annotation = truncate_to_width(&annotation, Font::Regular, 9.0, width - 20.0);
        self.canvas.text(
            slot.page,
            left + 10.0,
            annotation_top + 19.0,
            &annotation,
            Font::Regular,
            9.0,
            Color::TEXT,
        );
        self.gap();
    }

    fn table_header(&mut self, columns: &[(&str, f64)]) {
        let slot = self.place_keeping(TABLE_HEADER_HEIGHT, TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT);
        let (left, width) = (self.left(), self.width());
        self.canvas.fill_rect(
            slot.page,
            left,
            slot.top,
            width,
            TABLE_HEADER_HEIGHT,
            Color::PANEL,
        );
        let mut x = left + 6.0;
        for (title, fraction) in columns {
            self.canvas
                .text(slot.page, x, slot.top + 14.0, title, Font::Bold, 10.0, Color::TEXT);
            x += width * fraction;
        }
    }

    fn biomechanical_parameters(&mut self, report: &AnalysisReport) {
        self.begin(Section::BiomechanicalParameters);
        self.heading("Biomechanical Parameters");
        let biomechanics = &report.biomechanics;

        if biomechanics.joint_angles.is_empty() {
            self.paragraph(
                "No joint angle measurements are available for this analysis.",
                Font::Regular,
                BODY_SIZE,
                BODY_LINE,
                Color::MUTED,
            );
        } else {
            let columns = [
                ("Joint", 0.34),
                ("Angle", 0.16),
                ("Normal range", 0.28),
                ("Evaluation", 0.22),
            ];
            self.table_header(&columns);
            for (joint, &degrees) in &biomechanics.joint_angles {
                if !self.cursor.fits(TABLE_ROW_HEIGHT) {
                    self.cursor.break_page();
                    self.table_header(&columns);
                }
                let slot = self.place(TABLE_ROW_HEIGHT);
                let (left, width) = (self.left(), self.width());
                let baseline = slot.top + 13.0;
                let evaluation = evaluate_joint_angle(joint, degrees);
                let cells = [
                    (
                        truncate_to_width(
                            &format_joint_name(joint),
                            Font::Regular,
                            10.0,
                            width * columns[0].1 - 10.0,
                        ),
                        Font::Regular,
                        Color::TEXT,
                    ),
                    (format!("{degrees:.1}°"), Font::Regular, Color::TEXT),
                    (normal_range(joint).to_owned(), Font::Regular, Color::MUTED),
                    (evaluation.label().to_owned(), Font::Bold, evaluation.color()),
                ];
                let mut x = left + 6.0;
                for ((text, font, color), (_, fraction)) in cells.iter().zip(columns.iter()) {
                    self.canvas
                        .text(slot.page, x, baseline, text, *font, 10.0, *color);
                    x += width * fraction;
                }
                let rule_y = slot.top + TABLE_ROW_HEIGHT;
                self.canvas
                    .line(slot.page, (left, rule_y), (left + width, rule_y), Color::BORDER);
            }
        }

        self.cursor.space(8.0);
        let slot = self.place(BODY_LINE + 2.0);
        let left = self.left();
        self.canvas.text(
            slot.page,
            left,
            slot.top + 11.0,
            "Muscle activation",
            Font::Bold,
            11.0,
            Color::TEXT,
        );
        let muscles = if biomechanics.muscle_activation.is_empty() {
            "No muscle activation data recorded.".to_owned()
        } else {
            biomechanics
                .muscle_activation
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.paragraph(&muscles, Font::Regular, BODY_SIZE, BODY_LINE, Color::TEXT);

        let quality = if biomechanics.movement_quality.is_empty() {
            "Not assessed"
        } else {
            biomechanics.movement_quality.as_str()
        };
        self.cursor.space(4.0);
        self.paragraph(
            &format!("Movement quality: {quality}"),
            Font::Bold,
            BODY_SIZE,
            BODY_LINE,
            Color::TEXT,
        );
        self.gap();
    }

    fn phase_analysis(&mut self, phases: &[PhaseResult]) {
        self.begin(Section::PhaseAnalysis);
        self.heading("Movement Phase Analysis");

        if phases.is_empty() {
            self.paragraph(
                "No phase breakdown is available for this analysis.",
                Font::Regular,
                BODY_SIZE,
                BODY_LINE,
                Color::MUTED,
            );
            self.gap();
            return;
        }

        let text_width_limit = self.width() - 24.0;
        for phase in phases {
            let mut lines = wrap_text(&phase.analysis, Font::Regular, 9.5, text_width_limit);
            if lines.len() > PHASE_MAX_LINES {
                lines.truncate(PHASE_MAX_LINES);
                if let Some(last) = lines.last_mut() {
                    *last = truncate_to_width(
                        &format!("{last}..."),
                        Font::Regular,
                        9.5,
                        text_width_limit,
                    );
                }
            }
            let block_height = 24.0 + PHASE_LINE * lines.len() as f64 + 22.0;
            let slot = self.place(block_height + 8.0);
            let (left, width, right) = (self.left(), self.width(), self.right());

            self.canvas
                .stroke_rect(slot.page, left, slot.top, width, block_height, Color::BORDER, 0.75);
            self.canvas.text(
                slot.page,
                left + 12.0,
                slot.top + 17.0,
                &format!("{} ({:.0}% of movement)", phase.phase, phase.timestamp_percent),
                Font::Bold,
                11.0,
                Color::TEXT,
            );
            let quality = format!("Quality: {}/100", phase.quality_score);
            self.canvas.text(
                slot.page,
                right - 12.0 - text_width(&quality, Font::Bold, 10.0),
                slot.top + 17.0,
                &quality,
                Font::Bold,
                10.0,
                score_color(phase.quality_score),
            );
            for (index, line) in lines.iter().enumerate() {
                self.canvas.text(
                    slot.page,
                    left + 12.0,
                    slot.top + 24.0 + PHASE_LINE * index as f64 + 9.5,
                    line,
                    Font::Regular,
                    9.5,
                    Color::MUTED,
                );
            }

            let bar_top = slot.top + block_height - 16.0;
            let bar_width = width - 24.0;
            self.canvas
                .fill_rect(slot.page, left + 12.0, bar_top, bar_width, 6.0, Color::PANEL);
            let filled = bar_width * f64::from(phase.quality_score.min(100)) / 100.0;
            self.canvas.fill_rect(
                slot.page,
                left + 12.0,
                bar_top,
                filled,
                6.0,
                score_color(phase.quality_score),
            );
        }
        self.gap();
    }

    fn joint_angle_chart(&mut self, report: &AnalysisReport) {
        self.begin(Section::JointAngleChart);
        self.heading("Joint Angle Chart");

        let chart = match render_joint_angle_chart(&report.biomechanics.joint_angles) {
            Ok(chart) => chart,
            Err(error) => {
                warn!(%error, "joint angle chart could not be drawn");
                self.placeholder("Joint angle chart is unavailable for this report.");
                self.gap();
                return;
            }
        };
        self.draw_chart(chart);
        self.gap();
    }

    fn draw_chart(&mut self, chart: JointAngleChart) {
        let (left, width) = (self.left(), self.width());
        let chart_height = width * chart.image().aspect_ratio();
        let slot = self.place(chart_height + CHART_LABEL_BAND);

        let bars = chart.bars().to_vec();
        let slot_width = width / bars.len().max(1) as f64;
        for bar in &bars {
            let center = left + width * bar.center_x;
            let value = format!("{:.0}°", bar.degrees);
            let value_width = text_width(&value, Font::Bold, 8.0);
            self.canvas.text(
                slot.page,
                center - value_width / 2.0,
                (slot.top + chart_height * bar.top_y - 3.0).max(slot.top + 8.0),
                &value,
                Font::Bold,
                8.0,
                bar.evaluation.color(),
            );
        }
        let gridline_value = chart.axis_max();
        let top_label_y = slot.top + chart_height * chart.value_y(gridline_value);
        self.canvas.text(
            slot.page,
            left + 2.0,
            top_label_y - 2.0,
            &format!("{gridline_value:.0}°"),
            Font::Regular,
            7.0,
            Color::MUTED,
        );
        self.canvas.image(
            slot.page,
            left,
            slot.top,
            width,
            chart_height,
            chart.into_image(),
        );

        let label_baseline = slot.top + chart_height * JointAngleChart::baseline_y() + 14.0;
        for bar in &bars {
            let label = truncate_to_width(
                &format_joint_name(&bar.joint),
                Font::Regular,
                7.5,
                slot_width - 4.0,
            );
            let center = left + width * bar.center_x;
            self.canvas.text(
                slot.page,
                center - text_width(&label, Font::Regular, 7.5) / 2.0,
                label_baseline.max(slot.top + chart_height + 10.0),
                &label,
                Font::Regular,
                7.5,
                Color::TEXT,
            );
        }
    }

    fn risk_assessment(&mut self, report: &AnalysisReport) {
        self.begin(Section::RiskAssessment);
        self.heading("Risk Assessment");
        let risks = &report.biomechanics.risk_factors;
        let level = RiskLevel::assess(risks.len(), report.score);
        let (left, width) = (self.left(), self.width());

        let slot = self.place(40.0);
        self.canvas
            .fill_rect(slot.page, left, slot.top, width, 34.0, level.color());
        self.canvas.text(
            slot.page,
            left + 12.0,
            slot.top + 22.0,
            level.label(),
            Font::Bold,
            13.0,
            Color::WHITE,
        );
        let summary = format!("{} risk factor(s) identified", risks.len());
        self.canvas.text(
            slot.page,
            left + width - 12.0 - text_width(&summary, Font::Regular, 10.0),
            slot.top + 22.0,
            &summary,
            Font::Regular,
            10.0,
            Color::WHITE,
        );

        if risks.is_empty() {
            self.paragraph(
                "No significant risk factors were identified.",
                Font::Regular,
                BODY_SIZE,
                BODY_LINE,
                Color::TEXT,
            );
        }
        for risk in risks {
            let lines = wrap_text(risk, Font::Regular, BODY_SIZE, width - 16.0);
            for line in &lines {
                let slot = self.place(BODY_LINE);
                self.canvas.fill_rect(
                    slot.page,
                    left,
                    slot.top + 1.0,
                    3.0,
                    BODY_LINE - 2.0,
                    level.color(),
                );
                self.canvas.text(
                    slot.page,
                    left + 12.0,
                    slot.top + BODY_SIZE,
                    line,
                    Font::Regular,
                    BODY_SIZE,
                    Color::TEXT,
                );
            }
            self.cursor.space(3.0);
        }
        self.gap();
    }

    fn recommendations(&mut self, recommendations: &[String]) {
        self.begin(Section::Recommendations);
        self.heading("Recommendations");

        if recommendations.is_empty() {
            self.paragraph(
                "No specific recommendations for this analysis.",
                Font::Regular,
                BODY_SIZE,
                BODY_LINE,
                Color::MUTED,
            );
        }
        let indent = 20.0;
        let wrap_width = self.width() - indent;
        for (index, recommendation) in recommendations.iter().enumerate() {
            let lines = wrap_text(recommendation, Font::Regular, BODY_SIZE, wrap_width);
            for (line_index, line) in lines.iter().enumerate() {
                let slot = self.place(BODY_LINE);
                let left = self.left();
                if line_index == 0 {
                    self.canvas.text(
                        slot.page,
                        left,
                        slot.top + BODY_SIZE,
                        &format!("{}.", index + 1),
                        Font::Bold,
                        BODY_SIZE,
                        Color::ACCENT,
                    );
                }
                self.canvas.text(
                    slot.page,
                    left + indent,
                    slot.top + BODY_SIZE,
                    line,
                    Font::Regular,
                    BODY_SIZE,
                    Color::TEXT,
                );
            }
            self.cursor.space(4.0);
        }
        self.gap();
    }

    fn technical_appendix(&mut self, report: &AnalysisReport) {
        self.begin(Section::TechnicalAppendix);
        self.heading("Technical Appendix");

        let facts = [
            "Analysis engine: MoveID automated movement analysis".to_owned(),
            format!("Confidence score: {:.2}", report.confidence_score),
            format!("Movement phases analyzed: {}", report.movement_phases.len()),
            format!(
                "Joint measurements: {}",
                report.biomechanics.joint_angles.len()
            ),
            "Joint angle evaluation uses indicative reference ranges.".to_owned(),
        ];
        self.lines(&facts, Font::Regular, 9.5, 13.0, Color::TEXT, 0.0);
        self.cursor.space(6.0);
        self.paragraph(DISCLAIMER, Font::Regular, SMALL_SIZE, SMALL_LINE, Color::MUTED);
    }

    /// Page numbers and the generation timestamp, drawn in the bottom margin
    fn footer(&mut self, generated_at: DateTime<Utc>) {
        self.begin(Section::Footer);
        self.canvas.ensure_page(self.cursor.page());
        let total = self.canvas.page_count();
        let (left, right) = (self.left(), self.right());
        let rule_y = self.geometry.bottom_limit() + 12.0;
        let baseline = rule_y + 14.0;
        let stamp = format!("Generated by MoveID on {}", generated_at.format("%Y-%m-%d %H:%M UTC"));

        for page in 0..total {
            self.canvas.line(page, (left, rule_y), (right, rule_y), Color::BORDER);
            self.canvas
                .text(page, left, baseline, &stamp, Font::Regular, 8.0, Color::MUTED);
            let number = format!("Page {} of {total}", page + 1);
            self.canvas.text(
                page,
                right - text_width(&number, Font::Regular, 8.0),
                baseline,
                &number,
                Font::Regular,
                8.0,
                Color::MUTED,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use moveid_core::models::BiomechanicsBlock;
    use std::collections::{BTreeMap, BTreeSet};

    fn sample_report(risks: usize, recommendations: usize) -> AnalysisReport {
        AnalysisReport {
            score: 72,
            description: "Controlled descent with slight forward lean during the ascent.".into(),
            movement_phases: vec![PhaseResult {
                phase: "Descent".into(),
                timestamp_percent: 20.0,
                analysis: "Good control of the eccentric phase.".into(),
                quality_score: 78,
            }],
            biomechanics: BiomechanicsBlock {
                joint_angles: BTreeMap::from([("right_knee".into(), 92.5), ("trunk".into(), 35.0)]),
                muscle_activation: BTreeSet::from(["Quadriceps".to_owned()]),
                risk_factors: (0..risks).map(|i| format!("Risk factor {i}")).collect(),
                movement_quality: "Good".into(),
            },
            recommendations: (0..recommendations)
                .map(|i| format!("Recommendation number {i} with enough words to wrap maybe"))
                .collect(),
            confidence_score: 0.87,
        }
    }

    fn request(report: &AnalysisReport) -> RenderRequest<'_> {
        RenderRequest {
            report,
            subject_name: "Test Subject",
            exercise_label: "agachamento",
            generated_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            source_image: None,
            options: RenderOptions::default(),
        }
    }

    #[test]
    fn test_file_name_uses_slug_and_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            report_file_name("Levantamento Terra", ts),
            "moveid-levantamento-terra-20250314-092653.pdf"
        );
        assert_eq!(report_file_name("  ", ts), "moveid-analysis-20250314-092653.pdf");
    }

    #[test]
    fn test_section_order_without_image() {
        let report = sample_report(1, 3);
        let document = ReportRenderer::new().render(&request(&report)).unwrap();
        assert_eq!(
            document.sections,
            vec![
                Section::Header,
                Section::ExecutiveSummary,
                Section::BiomechanicalParameters,
                Section::PhaseAnalysis,
                Section::JointAngleChart,
                Section::RiskAssessment,
                Section::Recommendations,
                Section::TechnicalAppendix,
                Section::Footer,
            ]
        );
        assert!(document.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_corrupt_source_image_becomes_placeholder() {
        let report = sample_report(0, 1);
        let mut req = request(&report);
        req.source_image = Some(b"definitely not an image");
        let document = ReportRenderer::new().render(&req).unwrap();
        assert!(document.sections.contains(&Section::SourceImage));
    }

    #[test]
    fn test_long_report_paginates_without_splitting_blocks() {
        let report = sample_report(25, 40);
        let document = ReportRenderer::new().render(&request(&report)).unwrap();
        assert!(document.page_count > 1);
        let limit = PageGeometry::a4().bottom_limit();
        for placement in &document.placements {
            assert!(placement.bottom <= limit + 1e-9, "{placement:?}");
            assert!(placement.page < document.page_count);
        }
    }
}
