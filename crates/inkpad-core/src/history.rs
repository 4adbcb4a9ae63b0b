//! Bounded undo history of encoded surface snapshots.

use crate::error::SurfaceResult;
use crate::raster::Raster;
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of undo states to keep.
pub const DEFAULT_UNDO_LIMIT: usize = 30;

/// A PNG-encoded copy of the surface at one point in time.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.png.len())
            .finish()
    }
}

impl Snapshot {
    /// Encode a raster. Fails for empty rasters or encoder errors.
    pub fn capture(raster: &Raster) -> SurfaceResult<Self> {
        Ok(Self {
            width: raster.width(),
            height: raster.height(),
            png: raster.encode_png()?,
        })
    }

    /// Decode back into pixels.
    pub fn decode(&self) -> SurfaceResult<Raster> {
        Raster::decode_png(&self.png)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The encoded PNG bytes.
    pub fn as_png(&self) -> &[u8] {
        &self.png
    }
}

/// Undo stack that drops its oldest entries beyond a fixed limit.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoHistory {
    /// Create an empty history. A limit of zero is treated as one.
    ///
    /// The limit comes from host configuration, so nothing is preallocated
    /// from it.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Push a snapshot, evicting the oldest one if the limit is exceeded.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Take the most recent snapshot.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    /// Most recent snapshot without removing it.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
