// ABOUTME: Page geometry and the vertical cursor state machine driving pagination
// ABOUTME: Blocks reserve their full height up front and move to a fresh page when they would overflow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Single-pass, no-lookahead pagination.
//!
//! Coordinates are top-down: `y = 0` is the top edge of the page. The
//! printable area spans `[margin, height - margin]` vertically.

/// A4 width in points
pub const A4_WIDTH: f64 = 595.28;
/// A4 height in points
pub const A4_HEIGHT: f64 = 841.89;
/// Fixed page margin in points
pub const PAGE_MARGIN: f64 = 50.0;

/// Page size and margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
    /// Margin on every side
    pub margin: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait with the fixed margin
    #[must_use]
    pub const fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: PAGE_MARGIN,
        }
    }

    /// Width available between the side margins
    #[must_use]
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y a block may reach
    #[must_use]
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin
    }

    /// Height of the printable area
    #[must_use]
    pub fn printable_height(&self) -> f64 {
        self.bottom_limit() - self.margin
    }
}

/// Where a reserved block landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Zero-based page index
    pub page: usize,
    /// Top y of the block
    pub top: f64,
}

/// Running vertical cursor
#[derive(Debug, Clone)]
pub struct PageCursor {
    geometry: PageGeometry,
    page: usize,
    y: f64,
}

impl PageCursor {
    /// Cursor at the top margin of the first page
    #[must_use]
    pub const fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 0,
            y: geometry.margin,
        }
    }

    /// Current page index
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Current y
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Number of pages opened so far
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Whether a block of `height` fits below the cursor on this page
    #[must_use]
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.geometry.bottom_limit()
    }

    /// Start a new page and reset the cursor to the top margin
    pub fn break_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.margin;
    }

    /// Reserve room for a block, breaking the page first if it would overflow.
    ///
    /// A block taller than the whole printable area is placed at the top of a
    /// page anyway; callers size their blocks below that height.
    pub fn reserve(&mut self, height: f64) -> Slot {
        let at_top = (self.y - self.geometry.margin).abs() < f64::EPSILON;
        if !self.fits(height) && !at_top {
            self.break_page();
        }
        Slot {
            page: self.page,
            top: self.y,
        }
    }

    /// Move the cursor down after drawing
    pub fn advance(&mut self, height: f64) {
        self.y += height;
    }

    /// Add vertical spacing without ever spilling past the bottom limit
    pub fn space(&mut self, height: f64) {
        self.y = (self.y + height).min(self.geometry.bottom_limit());
    }
}
