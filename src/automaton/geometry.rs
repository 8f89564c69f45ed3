//! Plane geometry for state nodes and transition arrows
//!
//! Everything here is derived data: it is recomputed from a state's position
//! (or a transition's endpoints) and never edited in place.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in drawing coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `fallback` for a zero vector
    pub fn normalized_or(self, fallback: Point) -> Point {
        let len = self.length();
        if len <= f64::EPSILON {
            fallback
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }

    /// Rotate counter-clockwise by `degrees` around the origin
    pub fn rotated(self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn perpendicular(self) -> Point {
        Point::new(-self.y, self.x)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A straight line between two points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Sizes used to lay out states and arrows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default = "default_state_radius")]
    pub state_radius: f64,

    #[serde(default = "default_selection_radius")]
    pub selection_radius: f64,

    #[serde(default = "default_accepting_radius")]
    pub accepting_radius: f64,

    #[serde(default = "default_start_arrow_length")]
    pub start_arrow_length: f64,

    #[serde(default = "default_arrow_tip_length")]
    pub arrow_tip_length: f64,

    /// Angle between an arrow shaft and each of its tips, in degrees
    #[serde(default = "default_arrow_tip_angle")]
    pub arrow_tip_angle: f64,

    #[serde(default = "default_loop_radius")]
    pub loop_radius: f64,

    /// Distance between an arrow and its symbol label
    #[serde(default = "default_label_gap")]
    pub label_gap: f64,
}

fn default_state_radius() -> f64 {
    40.0
}

fn default_selection_radius() -> f64 {
    25.0
}

fn default_accepting_radius() -> f64 {
    35.0
}

fn default_start_arrow_length() -> f64 {
    25.0
}

fn default_arrow_tip_length() -> f64 {
    15.0
}

fn default_arrow_tip_angle() -> f64 {
    45.0
}

fn default_loop_radius() -> f64 {
    20.0
}

fn default_label_gap() -> f64 {
    12.0
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            state_radius: default_state_radius(),
            selection_radius: default_selection_radius(),
            accepting_radius: default_accepting_radius(),
            start_arrow_length: default_start_arrow_length(),
            arrow_tip_length: default_arrow_tip_length(),
            arrow_tip_angle: default_arrow_tip_angle(),
            loop_radius: default_loop_radius(),
            label_gap: default_label_gap(),
        }
    }
}

/// The two short strokes of an arrowhead whose point sits at `tip` and whose
/// shaft runs along `direction` (towards the tip).
pub fn arrow_tips(tip: Point, direction: Point, dims: &Dimensions) -> [Segment; 2] {
    let back = direction.normalized_or(Point::new(1.0, 0.0)) * -1.0;
    [
        Segment::new(tip, tip + back.rotated(dims.arrow_tip_angle) * dims.arrow_tip_length),
        Segment::new(tip, tip + back.rotated(-dims.arrow_tip_angle) * dims.arrow_tip_length),
    ]
}

/// The arrow drawn left of a starting state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StartArrow {
    pub shaft: Segment,
    pub tips: [Segment; 2],
}

/// Visual anchors of a state node, all derived from its position and label
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateGeometry {
    pub center: Point,
    pub body_radius: f64,
    pub selection_radius: f64,
    pub accepting_radius: f64,
    /// Top-left corner of the label text
    pub label_anchor: Point,
    pub start_arrow: StartArrow,
}

impl StateGeometry {
    /// Derive every anchor from scratch. Calling this twice with the same
    /// inputs yields identical output.
    pub fn compute(center: Point, label_size: (f64, f64), dims: &Dimensions) -> Self {
        let (label_width, label_height) = label_size;
        let entry = Point::new(center.x - dims.state_radius, center.y);
        let shaft = Segment::new(
            Point::new(entry.x - dims.start_arrow_length, center.y),
            entry,
        );

        Self {
            center,
            body_radius: dims.state_radius,
            selection_radius: dims.selection_radius,
            accepting_radius: dims.accepting_radius,
            label_anchor: Point::new(center.x - label_width / 2.0, center.y - label_height / 2.0),
            start_arrow: StartArrow {
                shaft,
                tips: arrow_tips(entry, Point::new(1.0, 0.0), dims),
            },
        }
    }
}

/// Which side of its state a self-loop is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl LoopDirection {
    pub fn unit(self) -> Point {
        match self {
            LoopDirection::Up => Point::new(0.0, -1.0),
            LoopDirection::Down => Point::new(0.0, 1.0),
            LoopDirection::Left => Point::new(-1.0, 0.0),
            LoopDirection::Right => Point::new(1.0, 0.0),
        }
    }

    /// Next direction clockwise, used to cycle loop placement
    pub fn next(self) -> Self {
        match self {
            LoopDirection::Up => LoopDirection::Right,
            LoopDirection::Right => LoopDirection::Down,
            LoopDirection::Down => LoopDirection::Left,
            LoopDirection::Left => LoopDirection::Up,
        }
    }
}

/// Where a transition arrow is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoints {
    Edge {
        from: Point,
        to: Point,
        from_radius: f64,
        to_radius: f64,
    },
    SelfLoop {
        center: Point,
        state_radius: f64,
        direction: LoopDirection,
    },
}

/// Drawable shape of a transition arrow
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionGeometry {
    Edge {
        shaft: Segment,
        tips: [Segment; 2],
        label_anchor: Point,
    },
    SelfLoop {
        center: Point,
        radius: f64,
        tips: [Segment; 2],
        label_anchor: Point,
    },
}

impl TransitionGeometry {
    pub fn compute(endpoints: &Endpoints, label_size: (f64, f64), dims: &Dimensions) -> Self {
        let (label_width, label_height) = label_size;
        match *endpoints {
            Endpoints::Edge {
                from,
                to,
                from_radius,
                to_radius,
            } => {
                // Overlapping states still get a well defined, horizontal arrow
                let dir = (to - from).normalized_or(Point::new(1.0, 0.0));
                let start = from + dir * from_radius;
                let end = to - dir * to_radius;
                let mid = (start + end) * 0.5;
                let offset = dir.perpendicular() * (dims.label_gap + label_height / 2.0);
                let label_center = mid + offset;

                TransitionGeometry::Edge {
                    shaft: Segment::new(start, end),
                    tips: arrow_tips(end, dir, dims),
                    label_anchor: Point::new(
                        label_center.x - label_width / 2.0,
                        label_center.y - label_height / 2.0,
                    ),
                }
            }
            Endpoints::SelfLoop {
                center,
                state_radius,
                direction,
            } => {
                let out = direction.unit();
                let loop_center = center + out * state_radius;
                let entry_dir = out.rotated(-30.0);
                let entry = center + entry_dir * state_radius;
                let label_center = loop_center + out * (dims.loop_radius + dims.label_gap);

                TransitionGeometry::SelfLoop {
                    center: loop_center,
                    radius: dims.loop_radius,
                    tips: arrow_tips(entry, entry_dir * -1.0, dims),
                    label_anchor: Point::new(
                        label_center.x - label_width / 2.0,
                        label_center.y - label_height / 2.0,
                    ),
                }
            }
        }
    }

    pub fn label_anchor(&self) -> Point {
        match self {
            TransitionGeometry::Edge { label_anchor, .. }
            | TransitionGeometry::SelfLoop { label_anchor, .. } => *label_anchor,
        }
    }

    pub fn tips(&self) -> &[Segment; 2] {
        match self {
            TransitionGeometry::Edge { tips, .. } | TransitionGeometry::SelfLoop { tips, .. } => {
                tips
            }
        }
    }
}
