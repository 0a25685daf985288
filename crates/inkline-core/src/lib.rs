//! Inkline Core Library
//!
//! Vector stroke engine: freehand strokes with pressure and timing, smoothing
//! and speed-derived width, and a linear undo/redo history over stroke
//! creation and clearing. Rendering, windowing and input devices are left to
//! the host application.

pub mod command;
pub mod drawing;
pub mod geometry;
pub mod storage;
pub mod stroke;
pub mod style;

pub use command::{Command, Custody, History, StrokeStore};
pub use drawing::Drawing;
pub use geometry::{Color, Point2D};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use stroke::{MIN_STROKE_WIDTH, Stroke, StrokeId, StrokePoint, StrokeSegment};
pub use style::StrokeStyle;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
