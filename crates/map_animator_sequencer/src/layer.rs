// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animated map layers and their reveal track.
//!
//! Every layer owns a time window. Before the window the layer is hidden,
//! after it the layer is fully shown, and inside it progress runs linearly
//! from 0 to 1. How progress looks on the map depends on the layer kind, see
//! [`Reveal`].

use crate::error::{Result, TimelineError};
use crate::keyframe::LatLng;
use crate::surface::MapSurface;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shortest allowed window, in seconds
pub const MIN_WINDOW_LENGTH: f64 = 0.1;

/// Window given to new layers unless configured otherwise
pub const DEFAULT_WINDOW: AnimationWindow = AnimationWindow { start: 0.0, end: 5.0 };

/// Default stroke/fill color
pub const DEFAULT_COLOR: &str = "#3388ff";

/// Unique identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    /// Create a new random layer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Time window over which a layer reveals itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationWindow {
    /// Reveal start (seconds)
    pub start: f64,
    /// Reveal end (seconds), always greater than `start`
    pub end: f64,
}

impl AnimationWindow {
    /// Create a window, correcting it so that `0 <= start < end`.
    ///
    /// A start that is not finite becomes 0. An end that is not finite or not
    /// after the start becomes `start + MIN_WINDOW_LENGTH`.
    pub fn new(start: f64, end: f64) -> Self {
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        let end = if end.is_finite() && end > start {
            end
        } else {
            start + MIN_WINDOW_LENGTH
        };
        Self { start, end }
    }

    /// Window length in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Reveal progress at `time`
    pub fn progress(&self, time: f64) -> f64 {
        if time < self.start {
            0.0
        } else if time >= self.end {
            1.0
        } else {
            (time - self.start) / (self.end - self.start)
        }
    }
}

impl Default for AnimationWindow {
    fn default() -> Self {
        DEFAULT_WINDOW
    }
}

/// Stroke and fill style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Stroke color (CSS hex)
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    /// Stroke opacity
    pub opacity: f64,
    /// Fill color (CSS hex)
    pub fill_color: String,
    /// Fill opacity
    pub fill_opacity: f64,
}

impl LayerStyle {
    fn with_fill(weight: f64, fill_opacity: f64) -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            weight,
            opacity: 1.0,
            fill_color: DEFAULT_COLOR.to_string(),
            fill_opacity,
        }
    }

    /// Default style for a layer kind
    pub fn for_kind(kind: &LayerKind) -> Self {
        match kind {
            LayerKind::Line { .. } => Self::with_fill(3.0, 0.0),
            LayerKind::Polygon { .. } => Self::with_fill(3.0, 0.2),
            LayerKind::Country { .. } | LayerKind::Geometry { .. } => Self::with_fill(2.0, 0.2),
            LayerKind::Text { .. } => Self::with_fill(0.0, 0.0),
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// Left aligned
    Left,
    /// Centered
    #[default]
    Center,
    /// Right aligned
    Right,
}

/// Typography for text layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels
    pub size: f32,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Alignment
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 20.0,
            bold: false,
            italic: false,
            align: TextAlign::Center,
        }
    }
}

/// What a layer draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Open polyline
    Line {
        /// Vertices
        points: Vec<LatLng>,
    },
    /// Closed polygon
    Polygon {
        /// Outer ring vertices
        points: Vec<LatLng>,
    },
    /// Text label anchored at a position
    Text {
        /// Anchor
        position: LatLng,
        /// Label text
        content: String,
        /// Typography
        text_style: TextStyle,
    },
    /// Country outline from the country lookup
    Country {
        /// Display name
        name: String,
        /// ISO 3166-1 alpha-2 code
        code: String,
        /// GeoJSON geometry
        geometry: serde_json::Value,
    },
    /// Imported GeoJSON
    Geometry {
        /// GeoJSON document
        data: serde_json::Value,
    },
}

impl LayerKind {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line { .. } => "Line",
            Self::Polygon { .. } => "Polygon",
            Self::Text { .. } => "Text",
            Self::Country { .. } => "Country",
            Self::Geometry { .. } => "GeoJSON",
        }
    }
}

/// Content edit for an existing layer
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    /// Replace line or polygon vertices
    Points(Vec<LatLng>),
    /// Replace text content
    Text(String),
    /// Replace text typography
    TextStyle(TextStyle),
    /// Move a text anchor
    Position(LatLng),
    /// Replace country or imported geometry
    Geometry(serde_json::Value),
}

/// How a layer looks at a given progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reveal {
    /// Path drawn up to a fraction of its length
    TrimPath {
        /// Visible fraction of the path
        visible_fraction: f64,
    },
    /// Area faded in
    Fade {
        /// Stroke opacity
        stroke_opacity: f64,
        /// Fill opacity
        fill_opacity: f64,
    },
    /// Whole element faded in
    Opacity(f64),
}

/// An object on the map with a reveal window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedLayer {
    /// Unique layer ID
    pub id: LayerId,
    /// What the layer draws
    pub kind: LayerKind,
    /// Stroke and fill style
    pub style: LayerStyle,
    /// Reveal window
    pub window: AnimationWindow,
    /// Last resolved progress
    pub progress: f64,
}

impl AnimatedLayer {
    /// Create a layer with the default style for its kind
    pub fn new(kind: LayerKind, window: AnimationWindow) -> Self {
        Self {
            id: LayerId::new(),
            style: LayerStyle::for_kind(&kind),
            kind,
            window,
            progress: 0.0,
        }
    }

    /// Replace the style
    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Visual state at `progress`
    pub fn reveal(&self, progress: f64) -> Reveal {
        match self.kind {
            LayerKind::Line { .. } => Reveal::TrimPath {
                visible_fraction: progress,
            },
            LayerKind::Polygon { .. } | LayerKind::Country { .. } | LayerKind::Geometry { .. } => {
                Reveal::Fade {
                    stroke_opacity: progress,
                    fill_opacity: self.style.fill_opacity * progress,
                }
            }
            LayerKind::Text { .. } => Reveal::Opacity(progress),
        }
    }

    /// Apply a content edit, rejecting edits that do not fit the kind
    pub fn apply_content(&mut self, content: LayerContent) -> Result<()> {
        let id = self.id;
        match (&mut self.kind, content) {
            (LayerKind::Line { points } | LayerKind::Polygon { points }, LayerContent::Points(new)) => {
                *points = new;
            }
            (LayerKind::Text { content, .. }, LayerContent::Text(new)) => {
                *content = new;
            }
            (LayerKind::Text { text_style, .. }, LayerContent::TextStyle(new)) => {
                *text_style = new;
            }
            (LayerKind::Text { position, .. }, LayerContent::Position(new)) => {
                *position = new;
            }
            (LayerKind::Country { geometry, .. }, LayerContent::Geometry(new)) => {
                *geometry = new;
            }
            (LayerKind::Geometry { data }, LayerContent::Geometry(new)) => {
                *data = new;
            }
            (_, content) => {
                let expected = match content {
                    LayerContent::Points(_) => "line or polygon",
                    LayerContent::Text(_) | LayerContent::TextStyle(_) | LayerContent::Position(_) => {
                        "text"
                    }
                    LayerContent::Geometry(_) => "country or geometry",
                };
                return Err(TimelineError::KindMismatch { id, expected });
            }
        }
        Ok(())
    }
}

/// The set of animated layers, in insertion (draw) order
#[derive(Debug, Clone, Default)]
pub struct LayerTrack {
    layers: IndexMap<LayerId, AnimatedLayer>,
    default_window: AnimationWindow,
}

impl LayerTrack {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Window given to layers created by [`LayerTrack::add`]
    pub fn with_default_window(mut self, window: AnimationWindow) -> Self {
        self.default_window = AnimationWindow::new(window.start, window.end);
        self
    }

    /// Add a layer of `kind`; `style` overrides the per-kind default
    pub fn add(&mut self, kind: LayerKind, style: Option<LayerStyle>) -> LayerId {
        let mut layer = AnimatedLayer::new(kind, self.default_window);
        if let Some(style) = style {
            layer.style = style;
        }
        self.insert(layer)
    }

    /// Insert a fully built layer, correcting its window if `start >= end`
    pub fn insert(&mut self, mut layer: AnimatedLayer) -> LayerId {
        layer.window = AnimationWindow::new(layer.window.start, layer.window.end);
        let id = layer.id;
        tracing::debug!("Adding {} layer {id}", layer.kind.name());
        self.layers.insert(id, layer);
        id
    }

    /// Remove a layer
    pub fn remove(&mut self, id: LayerId) -> Result<AnimatedLayer> {
        self.layers
            .shift_remove(&id)
            .ok_or(TimelineError::LayerNotFound(id))
    }

    /// Get a layer
    pub fn get(&self, id: LayerId) -> Option<&AnimatedLayer> {
        self.layers.get(&id)
    }

    fn get_mut(&mut self, id: LayerId) -> Result<&mut AnimatedLayer> {
        self.layers.get_mut(&id).ok_or(TimelineError::LayerNotFound(id))
    }

    /// Replace a layer's style
    pub fn update_style(&mut self, id: LayerId, style: LayerStyle) -> Result<()> {
        self.get_mut(id)?.style = style;
        Ok(())
    }

    /// Replace a layer's window, correcting it if `start >= end`.
    /// Returns the window actually stored.
    pub fn update_window(&mut self, id: LayerId, window: AnimationWindow) -> Result<AnimationWindow> {
        let corrected = AnimationWindow::new(window.start, window.end);
        self.get_mut(id)?.window = corrected;
        Ok(corrected)
    }

    /// Edit a layer's content
    pub fn update_content(&mut self, id: LayerId, content: LayerContent) -> Result<()> {
        self.get_mut(id)?.apply_content(content)
    }

    /// Progress of every layer at `time`, without touching any state
    pub fn resolve(&self, time: f64) -> Vec<(LayerId, f64)> {
        self.layers
            .values()
            .map(|layer| (layer.id, layer.window.progress(time)))
            .collect()
    }

    /// Resolve every layer at `time` and push its progress to the surface.
    ///
    /// No change gate here: re-applying progress is cheap, and a window being
    /// dragged needs every value to land.
    pub fn apply(&mut self, time: f64, surface: &mut impl MapSurface) {
        for layer in self.layers.values_mut() {
            layer.progress = layer.window.progress(time);
            surface.set_layer_progress(layer.id, layer.progress);
        }
    }

    /// Resolve a single layer at `time` and push its progress
    pub fn apply_one(&mut self, id: LayerId, time: f64, surface: &mut impl MapSurface) -> Result<()> {
        let layer = self.get_mut(id)?;
        layer.progress = layer.window.progress(time);
        surface.set_layer_progress(id, layer.progress);
        Ok(())
    }

    /// All layers in draw order
    pub fn layers(&self) -> impl Iterator<Item = &AnimatedLayer> {
        self.layers.values()
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// No layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
