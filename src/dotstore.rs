//! Chunked, stably-addressed storage for match records ("dots").
//!
//! Dots are stored in fixed-capacity chunks, each a flat `Vec`, rather
//! than a hand-rolled doubly-linked list of blocks: a quad-tree index can
//! then hold references straight into those blocks without needing raw
//! pointers to stay valid as blocks move.
//!
//! Each dot is addressed by a stable [`DotHandle`] rather than a pointer:
//! deleting a dot tombstones its slot rather than shifting later entries
//! down, so a handle handed out by [`DotStore::append`] stays valid
//! (either pointing at the same dot, or at a now-empty slot) for as long
//! as the `DotStore` lives.

use crate::error::{Error, Result};
use crate::quadtree::QuadTree;

/// Chunk capacity.
const CHUNK_CAP: usize = 8192;

/// Computes the expected length of a `to_buffer`-shaped wire buffer from its
/// own header, without parsing the whole thing: `3 + 3 * buf[2]`.
pub fn buffer_size(buffer: &[i32]) -> usize {
    3 + 3 * buffer.get(2).copied().unwrap_or(0).max(0) as usize
}

/// A single match record: a diagonal run of length `length` starting at
/// `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dot {
    pub x: i64,
    pub y: i64,
    pub length: i64,
}

/// A stable reference to a dot inside a [`DotStore`]. Valid for the
/// lifetime of the store regardless of later inserts or deletes elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DotHandle {
    chunk: u32,
    slot: u32,
}

impl DotHandle {
    #[cfg(test)]
    pub(crate) fn new_for_test(chunk: u32, slot: u32) -> Self {
        DotHandle { chunk, slot }
    }
}

struct Chunk {
    slots: Vec<Option<Dot>>,
    live: usize,
}

impl Chunk {
    fn new() -> Self {
        Chunk { slots: Vec::with_capacity(CHUNK_CAP), live: 0 }
    }

    fn has_space(&self) -> bool {
        self.live < CHUNK_CAP
    }

    fn add(&mut self, dot: Dot) -> u32 {
        if let Some(pos) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[pos] = Some(dot);
            self.live += 1;
            pos as u32
        } else {
            self.slots.push(Some(dot));
            self.live += 1;
            (self.slots.len() - 1) as u32
        }
    }
}

/// An arena of dots plus an optional spatial index over them.
pub struct DotStore {
    chunks: Vec<Chunk>,
    numdots: usize,
    maxx: i64,
    maxy: i64,
    index: Option<QuadTree>,
}

impl DotStore {
    pub fn new() -> Self {
        DotStore { chunks: Vec::new(), numdots: 0, maxx: 0, maxy: 0, index: None }
    }

    pub fn count(&self) -> usize {
        self.numdots
    }

    pub fn is_empty(&self) -> bool {
        self.numdots == 0
    }

    pub fn max_x(&self) -> i64 {
        self.maxx
    }

    pub fn max_y(&self) -> i64 {
        self.maxy
    }

    pub fn set_maxx(&mut self, x: i64) {
        self.maxx = x;
    }

    pub fn set_maxy(&mut self, y: i64) {
        self.maxy = y;
    }

    /// Drops every chunk, resetting the store to its just-constructed state:
    /// no dots, `maxx`/`maxy` back to 0, any built index discarded.
    pub fn empty(&mut self) {
        self.chunks.clear();
        self.numdots = 0;
        self.maxx = 0;
        self.maxy = 0;
        self.index = None;
    }

    /// Appends a dot, tracking running x/y maxima as it goes.
    pub fn append(&mut self, x: i64, y: i64, length: i64) -> DotHandle {
        if x > self.maxx {
            self.maxx = x;
        }
        if y > self.maxy {
            self.maxy = y;
        }

        let chunk_index = match self.chunks.iter().position(|c| c.has_space()) {
            Some(i) => i,
            None => {
                self.chunks.push(Chunk::new());
                self.chunks.len() - 1
            }
        };

        let slot = self.chunks[chunk_index].add(dot_of(x, y, length));
        self.numdots += 1;
        DotHandle { chunk: chunk_index as u32, slot }
    }

    pub fn get(&self, handle: DotHandle) -> Option<Dot> {
        self.chunks.get(handle.chunk as usize)?.slots.get(handle.slot as usize)?.as_ref().copied()
    }

    /// Returns the `index`-th live dot, in storage order (tombstoned slots
    /// are skipped, so this index is not the same as a raw chunk offset).
    pub fn get_by_index(&self, index: usize) -> Option<Dot> {
        let mut seen = 0usize;
        for chunk in &self.chunks {
            for slot in &chunk.slots {
                if let Some(dot) = slot {
                    if seen == index {
                        return Some(*dot);
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    pub fn delete(&mut self, handle: DotHandle) -> Result<()> {
        let chunk = self.chunks.get_mut(handle.chunk as usize).ok_or(Error::NotFound)?;
        let slot = chunk.slots.get_mut(handle.slot as usize).ok_or(Error::NotFound)?;
        if slot.take().is_some() {
            chunk.live -= 1;
            self.numdots -= 1;
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    fn iter_live(&self) -> impl Iterator<Item = (DotHandle, Dot)> + '_ {
        self.chunks.iter().enumerate().flat_map(|(ci, chunk)| {
            chunk.slots.iter().enumerate().filter_map(move |(si, slot)| {
                slot.map(|dot| (DotHandle { chunk: ci as u32, slot: si as u32 }, dot))
            })
        })
    }

    /// Returns a new store containing only dots of at least `min_length`.
    pub fn filter(&self, min_length: i64) -> DotStore {
        let mut out = DotStore::new();
        out.maxx = self.maxx;
        out.maxy = self.maxy;
        for (_, dot) in self.iter_live() {
            if dot.length >= min_length {
                out.append(dot.x, dot.y, dot.length);
            }
        }
        out
    }

    /// For every match longer than `window`, lays down extra sub-dots that
    /// step diagonally across it in `window`-sized strides, so renderers
    /// that only look at a dot's starting point still see it cross every
    /// grid cell it passes through.
    pub fn interpolate(&mut self, window: i64) {
        let snapshot: Vec<Dot> = self.iter_live().map(|(_, dot)| dot).collect();
        let mut extra = Vec::new();

        for dot in snapshot {
            if dot.length > window {
                let mut remainder = dot.length - window;
                let mut xpos = dot.x + window;
                let mut ypos = dot.y + window;
                while remainder > 0 {
                    extra.push((xpos, ypos, remainder));
                    xpos += window;
                    ypos += window;
                    remainder -= window;
                }
            }
        }

        for (x, y, length) in extra {
            self.append(x, y, length);
        }
    }

    /// Serializes to a flat wire layout: `[maxx, maxy, n, (x, y,
    /// length) * n]`, all as `i32`.
    pub fn to_buffer(&self) -> Vec<i32> {
        let mut buffer = Vec::with_capacity(self.numdots * 3 + 3);
        buffer.push(self.maxx as i32);
        buffer.push(self.maxy as i32);
        buffer.push(self.numdots as i32);
        for (_, dot) in self.iter_live() {
            buffer.push(dot.x as i32);
            buffer.push(dot.y as i32);
            buffer.push(dot.length as i32);
        }
        buffer
    }

    /// Inverse of [`DotStore::to_buffer`].
    pub fn from_buffer(buffer: &[i32]) -> Result<DotStore> {
        if buffer.len() < 3 {
            return Err(Error::InvalidParameter("buffer too short for a dot-store header"));
        }
        let maxx = buffer[0] as i64;
        let maxy = buffer[1] as i64;
        let num = buffer[2] as usize;
        if buffer.len() != num * 3 + 3 {
            return Err(Error::InvalidParameter("buffer length does not match its record count"));
        }

        let mut store = DotStore::new();
        store.maxx = maxx;
        store.maxy = maxy;
        for record in buffer[3..].chunks_exact(3) {
            store.append(record[0] as i64, record[1] as i64, record[2] as i64);
        }
        Ok(store)
    }

    /// Builds (or rebuilds) the spatial index over the dots currently held.
    pub fn create_index(&mut self) {
        let x_bound = self.maxx.max(1);
        let y_bound = self.maxy.max(1);
        let mut index = QuadTree::new(0, 0, x_bound, y_bound);
        for (handle, dot) in self.iter_live() {
            index.insert(dot.x, dot.y, dot.length, handle);
        }
        self.index = Some(index);
    }

    /// Panics if no index has been built.
    pub fn destroy_index(&mut self) {
        assert!(self.index.is_some(), "destroy_index called without a built index");
        self.index = None;
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Uses the index to find the longest match on row `y`.
    pub fn longest_row(&self, y: i64) -> Result<Option<Dot>> {
        let index = self.index.as_ref().ok_or(Error::IndexRequired)?;
        Ok(index.longest_in_row(y).map(|d| dot_of(d.x, d.y, d.length)))
    }

    /// Uses the index to find the longest match in column `x`.
    pub fn longest_col(&self, x: i64) -> Result<Option<Dot>> {
        let index = self.index.as_ref().ok_or(Error::IndexRequired)?;
        Ok(index.longest_in_column(x).map(|d| dot_of(d.x, d.y, d.length)))
    }

    /// Direct indexed point lookup.
    pub fn get_indexed(&self, x: i64, y: i64) -> Result<Option<Dot>> {
        let index = self.index.as_ref().ok_or(Error::IndexRequired)?;
        Ok(index.point_lookup(x, y).map(|d| dot_of(d.x, d.y, d.length)))
    }

    pub(crate) fn index(&self) -> Option<&QuadTree> {
        self.index.as_ref()
    }
}

impl Default for DotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn dot_of(x: i64, y: i64, length: i64) -> Dot {
    Dot { x, y, length }
}
