// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tile scheduler.  The raster is cut into horizontal blocks of
//! `BLOCK_HEIGHT` rows.  Worker threads claim blocks one at a time by
//! bumping a shared atomic cursor, so a thread that drew a cheap block
//! (all sky, or all cardioid) comes straight back for another instead
//! of idling while a neighbour grinds through the boundary.
//!
//! Every block's rows are handed out exactly once, to the thread that
//! claimed its index, so no two threads ever touch the same pixel and
//! the result does not depend on how many threads ran or in what
//! order they finished.

use itertools::iproduct;
use log::{debug, trace, warn};
use num::Complex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::coloring::{color_sample, ColoringMode, Rgb};
use crate::escape::{escape_distance, escape_time, is_interior, PixelSample};
use crate::planes::PlaneMapper;
use crate::request::{Raster, RenderRequest, CHANNELS};

/// Rows per block.
pub const BLOCK_HEIGHT: usize = 16;

/// Never run fewer workers than this, however few cores we see.
pub const MIN_THREADS: usize = 4;

/// The number of workers `render` uses on this machine.
pub fn default_threads() -> usize {
    std::cmp::max(num_cpus::get(), MIN_THREADS)
}

// One block's rows of the output, waiting for whoever claims it.  The
// lock is only a safe way to move the `&mut` rows to the claiming
// thread: the atomic cursor hands each index to exactly one worker, so
// every slot is locked once, by one thread, and never waited on.
type Slot<'a> = Mutex<Option<&'a mut [u8]>>;

/// Contains everything a worker needs to color a pixel, derived once
/// from the request.  Once built, this object is shared read-only by
/// all the workers.
pub struct TileRenderer {
    plane: PlaneMapper,
    width: usize,
    height: usize,
    limit: u32,
    mode: ColoringMode,
    supersample: bool,
}

impl TileRenderer {
    /// The request must already be validated.
    pub fn new(request: &RenderRequest) -> Self {
        TileRenderer {
            plane: PlaneMapper::new(request.viewport(), request.width(), request.height()),
            width: request.width(),
            height: request.height(),
            limit: request.max_iterations(),
            mode: request.mode(),
            supersample: request.supersampled(),
        }
    }

    /// The iteration cap in use.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of blocks the raster is cut into.
    pub fn block_count(&self) -> usize {
        (self.height + BLOCK_HEIGHT - 1) / BLOCK_HEIGHT
    }

    fn sample(&self, c: Complex<f64>) -> PixelSample {
        if is_interior(c) {
            PixelSample::interior(self.limit)
        } else if self.mode.needs_distance() {
            escape_distance(c, self.limit)
        } else {
            escape_time(c, self.limit)
        }
    }

    fn color_at(&self, x: f64, y: f64) -> Rgb {
        color_sample(&self.sample(self.plane.pixel_to_point(x, y)), self.mode)
    }

    /// The final color of pixel `(x, y)`: either the sample at the
    /// pixel itself, or the component-wise mean of four samples at the
    /// centers of its quarters.
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let (x, y) = (x as f64, y as f64);
        if !self.supersample {
            return self.color_at(x, y);
        }
        let mut sum = (0u32, 0u32, 0u32);
        for (sy, sx) in iproduct!(0..2u8, 0..2u8) {
            let Rgb(r, g, b) = self.color_at(
                x + (f64::from(sx) + 0.5) / 2.0,
                y + (f64::from(sy) + 0.5) / 2.0,
            );
            sum.0 += u32::from(r);
            sum.1 += u32::from(g);
            sum.2 += u32::from(b);
        }
        Rgb((sum.0 / 4) as u8, (sum.1 / 4) as u8, (sum.2 / 4) as u8)
    }

    /// Fill one block.  `rows` holds the bytes of rows `first_row`
    /// onwards, `width * CHANNELS` bytes per row.
    pub fn render_block(&self, first_row: usize, rows: &mut [u8]) {
        let stride = self.width * CHANNELS;
        for (dy, row) in rows.chunks_mut(stride).enumerate() {
            let y = first_row + dy;
            for (x, px) in row.chunks_mut(CHANNELS).enumerate() {
                let Rgb(r, g, b) = self.pixel(x, y);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            }
        }
    }

    // Cut the raster into one slot per block.
    fn slots<'a>(&self, raster: &'a mut Raster) -> Vec<Slot<'a>> {
        let block_bytes = self.width * CHANNELS * BLOCK_HEIGHT;
        raster
            .bytes_mut()
            .chunks_mut(block_bytes)
            .map(|rows| Mutex::new(Some(rows)))
            .collect()
    }

    // Claim blocks until the cursor runs past the end.
    fn drain(&self, cursor: &AtomicUsize, slots: &[Slot]) {
        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            if index >= slots.len() {
                break;
            }
            // Each index is claimed once, so the lock is never contended
            // and the slot is always still full.
            let rows = {
                let mut slot = slots[index].lock().unwrap_or_else(|e| e.into_inner());
                slot.take()
            };
            if let Some(rows) = rows {
                trace!("block {} claimed", index);
                self.render_block(index * BLOCK_HEIGHT, rows);
            }
        }
    }

    /// Render the whole raster with `threads` workers.  If the system
    /// refuses to start a worker, the calling thread finishes whatever
    /// the workers that did start leave behind.
    pub fn render(&self, threads: usize) -> Raster {
        let threads = std::cmp::max(threads, 1);
        let mut raster = Raster::blank(self.width, self.height);
        debug!(
            "rendering {}x{} in {} blocks on {} threads, limit {}, supersample {}",
            self.width,
            self.height,
            self.block_count(),
            threads,
            self.limit,
            self.supersample
        );
        {
            let slots = self.slots(&mut raster);
            let cursor = AtomicUsize::new(0);
            let (slots, cursor) = (&slots, &cursor);

            let joined = crossbeam::scope(|spawner| {
                let mut started = 0;
                for id in 0..threads {
                    let spawned = spawner
                        .builder()
                        .name(format!("mandel-tile-{}", id))
                        .spawn(move |_| self.drain(cursor, slots));
                    match spawned {
                        Ok(_) => started += 1,
                        Err(e) => {
                            warn!("could not start worker {}: {}; continuing on {}", id, e, started);
                            break;
                        }
                    }
                }
                if started < threads {
                    self.drain(cursor, slots);
                }
            });

            if let Err(panic) = joined {
                std::panic::resume_unwind(panic);
            }
        }
        raster
    }
}
