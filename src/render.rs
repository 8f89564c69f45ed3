//! Rendering boundary
//!
//! The automaton model never talks to a terminal directly. It issues circle,
//! line and text calls on a [`Surface`] and asks a [`LabelMetrics`] provider
//! how large a label is. The TUI plugs a ratatui canvas in behind both.

use crate::automaton::geometry::{Dimensions, Point, Segment};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::canvas::{Circle, Context, Line as CanvasLine};
use std::fmt;

/// Something the model can draw on
pub trait Surface {
    /// Filled circle
    fn disc(&mut self, center: Point, radius: f64, color: Color);

    /// Circle outline
    fn ring(&mut self, center: Point, radius: f64, color: Color);

    fn line(&mut self, segment: Segment, color: Color);

    /// Text whose top-left corner sits at `anchor`
    fn text(&mut self, anchor: Point, text: &str, color: Color);
}

/// Font / label sizing provider handed to states at construction
pub trait LabelMetrics: fmt::Debug + Send + Sync {
    fn text_width(&self, text: &str) -> f64;

    fn line_height(&self) -> f64;

    fn measure(&self, text: &str) -> (f64, f64) {
        (self.text_width(text), self.line_height())
    }
}

/// Fixed-size character cells, as on a terminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

impl LabelMetrics for CellMetrics {
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.cell_width
    }

    fn line_height(&self) -> f64 {
        self.cell_height
    }
}

/// Colours used when drawing states and transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub state_fill: Color,
    pub accepted_fill: Color,
    pub declined_fill: Color,
    pub label: Color,
    pub selection_ring: Color,
    pub accepting_ring: Color,
    pub start_arrow: Color,
    pub transition: Color,
    pub transition_highlight: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            state_fill: Color::White,
            accepted_fill: Color::Green,
            declined_fill: Color::Red,
            label: Color::Black,
            selection_ring: Color::Red,
            accepting_ring: Color::Black,
            start_arrow: Color::White,
            transition: Color::White,
            transition_highlight: Color::Yellow,
        }
    }
}

/// Sizes and colours shared by every state of an automaton
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Theme {
    pub dimensions: Dimensions,
    pub palette: Palette,
}

/// Adapts a ratatui canvas [`Context`] to [`Surface`].
///
/// Model coordinates grow downwards like screen coordinates; the canvas grows
/// upwards, so y is mirrored against `height`.
pub struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    height: f64,
}

impl<'a, 'b> CanvasSurface<'a, 'b> {
    pub fn new(ctx: &'a mut Context<'b>, height: f64) -> Self {
        Self { ctx, height }
    }

    fn flip(&self, p: Point) -> (f64, f64) {
        (p.x, self.height - p.y)
    }
}

impl Surface for CanvasSurface<'_, '_> {
    fn disc(&mut self, center: Point, radius: f64, color: Color) {
        let (x, y) = self.flip(center);
        let mut r = radius;
        while r > 0.0 {
            self.ctx.draw(&Circle {
                x,
                y,
                radius: r,
                color,
            });
            r -= 1.5;
        }
    }

    fn ring(&mut self, center: Point, radius: f64, color: Color) {
        let (x, y) = self.flip(center);
        self.ctx.draw(&Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn line(&mut self, segment: Segment, color: Color) {
        let (x1, y1) = self.flip(segment.start);
        let (x2, y2) = self.flip(segment.end);
        self.ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
    }

    fn text(&mut self, anchor: Point, text: &str, color: Color) {
        let (x, y) = self.flip(anchor);
        self.ctx
            .print(x, y, Span::styled(text.to_owned(), Style::default().fg(color)));
    }
}
