//! Sheet/batch renderer.
//!
//! Many simultaneously-rendered particles usually collapse into a handful of
//! distinct (image, quantized color) keys. Each key is stencilled exactly
//! once per batch into a tiled cell of a shared off-screen sheet; drawing a
//! particle is then a single cell blit instead of a procedural raster. Sheets
//! persist and are reused across batches, growing only as new distinct keys
//! appear; cell assignments reset every batch.

use std::collections::HashMap;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{PlumeError, PlumeResult};
use crate::particle::Particle;
use crate::render::sprite::Sprite;
use crate::render::surface::{Surface, mul_div255};

#[derive(Clone, Copy, Debug)]
pub struct SheetOpts {
    /// Side of one stencilled cell in pixels.
    pub cell_size: u32,
    /// Side of one sheet; must be a positive multiple of `cell_size`.
    pub sheet_size: u32,
}

impl Default for SheetOpts {
    fn default() -> Self {
        Self {
            cell_size: 50,
            sheet_size: 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub sheet: usize,
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, Default)]
pub struct BatchStats {
    pub queued: usize,
    pub distinct_keys: usize,
    pub sheets: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SheetKey {
    image: String, // empty for the built-in sprite
    color: Rgb8,
}

struct CellAssign {
    cell: CellRef,
    stenciled: bool,
}

/// One off-screen bitmap: the base sprite tiled into every cell, cells
/// tinted on demand.
pub struct Sheet {
    size: u32,
    data: Vec<u8>, // premultiplied rgba8
}

impl Sheet {
    fn tiled(sprite: &Sprite, opts: SheetOpts) -> Self {
        let size = opts.sheet_size;
        let cell = opts.cell_size as usize;
        let mut data = vec![0u8; (size as usize) * (size as usize) * 4];
        for cy in (0..size as usize).step_by(cell) {
            for cx in (0..size as usize).step_by(cell) {
                for y in 0..cell {
                    let src = &sprite.data()[y * cell * 4..(y + 1) * cell * 4];
                    let di = ((cy + y) * (size as usize) + cx) * 4;
                    data[di..di + cell * 4].copy_from_slice(src);
                }
            }
        }
        Self { size, data }
    }

    /// Tint one cell in place: keep the sprite's alpha, replace its color.
    /// The raster equivalent of a source-atop fill.
    fn tint_cell(&mut self, cell: CellRef, cell_size: u32, color: Rgb8) {
        for y in cell.y..cell.y + cell_size {
            for x in cell.x..cell.x + cell_size {
                let i = ((y as usize) * (self.size as usize) + (x as usize)) * 4;
                let a = u16::from(self.data[i + 3]);
                self.data[i] = mul_div255(u16::from(color.r), a);
                self.data[i + 1] = mul_div255(u16::from(color.g), a);
                self.data[i + 2] = mul_div255(u16::from(color.b), a);
            }
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Owned by the host scene; never a process-wide global. `prepare` once per
/// frame with every particle due to render, then `draw` each particle.
pub struct BatchRenderer {
    opts: SheetOpts,
    default_sprite: Sprite,
    images: HashMap<String, Sprite>,
    sheets: HashMap<String, Vec<Sheet>>,
    next_cell: HashMap<String, usize>,
    assignments: HashMap<SheetKey, CellAssign>,
    stats: BatchStats,
}

impl Default for BatchRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRenderer {
    pub fn new() -> Self {
        let opts = SheetOpts::default();
        Self {
            opts,
            default_sprite: Sprite::radial(opts.cell_size),
            images: HashMap::new(),
            sheets: HashMap::new(),
            next_cell: HashMap::new(),
            assignments: HashMap::new(),
            stats: BatchStats::default(),
        }
    }

    pub fn with_opts(opts: SheetOpts) -> PlumeResult<Self> {
        if opts.cell_size == 0
            || opts.sheet_size == 0
            || !opts.sheet_size.is_multiple_of(opts.cell_size)
        {
            return Err(PlumeError::render(
                "sheet_size must be a positive multiple of cell_size",
            ));
        }
        Ok(Self {
            opts,
            default_sprite: Sprite::radial(opts.cell_size),
            ..Self::new()
        })
    }

    /// Register a named sprite; resampled to the cell size on the way in.
    /// Named sheets already built for a previous sprite are dropped.
    pub fn register_image(&mut self, name: impl Into<String>, img: &image::RgbaImage) {
        let name = name.into();
        let sprite = Sprite::from_rgba_image(img).resampled(self.opts.cell_size);
        self.sheets.remove(&name);
        self.images.insert(name, sprite);
    }

    /// Start a new batch: reset per-batch cell assignments, allocate a cell
    /// for every distinct (image, color) key, and stencil each key's tinted
    /// sprite into its cell exactly once. Sheets persist from prior batches.
    #[tracing::instrument(skip_all)]
    pub fn prepare<'a, I>(&mut self, particles: I) -> PlumeResult<()>
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        self.assignments.clear();
        self.next_cell.clear();

        let per_row = self.opts.sheet_size / self.opts.cell_size;
        let cells_per_sheet = (per_row * per_row) as usize;

        let mut queued = 0usize;
        for particle in particles {
            queued += 1;
            let key = SheetKey {
                image: particle.image().unwrap_or("").to_string(),
                color: particle.color(),
            };
            if self.assignments.contains_key(&key) {
                continue;
            }

            let counter = self.next_cell.entry(key.image.clone()).or_insert(0);
            let linear = *counter;
            *counter += 1;

            let within = (linear % cells_per_sheet) as u32;
            let cell = CellRef {
                sheet: linear / cells_per_sheet,
                x: (within % per_row) * self.opts.cell_size,
                y: (within / per_row) * self.opts.cell_size,
            };
            self.assignments.insert(key, CellAssign {
                cell,
                stenciled: false,
            });
        }

        for (key, assign) in self.assignments.iter_mut() {
            if assign.stenciled {
                continue;
            }

            let sprite = if key.image.is_empty() {
                &self.default_sprite
            } else {
                self.images.get(&key.image).ok_or_else(|| {
                    PlumeError::render(format!("unknown image '{}'", key.image))
                })?
            };

            let sheets = self.sheets.entry(key.image.clone()).or_default();
            // Never allocated twice for the same key within one pass: each
            // key reaches here at most once per batch.
            while sheets.len() <= assign.cell.sheet {
                sheets.push(Sheet::tiled(sprite, self.opts));
            }
            sheets[assign.cell.sheet].tint_cell(assign.cell, self.opts.cell_size, key.color);
            assign.stenciled = true;
        }

        self.stats = BatchStats {
            queued,
            distinct_keys: self.assignments.len(),
            sheets: self.sheets.values().map(Vec::len).sum(),
        };
        tracing::debug!(
            queued = self.stats.queued,
            keys = self.stats.distinct_keys,
            sheets = self.stats.sheets,
            "batch prepared"
        );
        Ok(())
    }

    /// The cell assigned to this particle in the current batch, if any.
    pub fn cell_for(&self, particle: &Particle) -> Option<CellRef> {
        let key = SheetKey {
            image: particle.image().unwrap_or("").to_string(),
            color: particle.color(),
        };
        self.assignments.get(&key).map(|a| a.cell)
    }

    /// Blit the particle's assigned cell: scaled to its rect, alpha
    /// modulated, rotated around its center by its facing direction.
    pub fn draw(&self, particle: &Particle, surface: &mut Surface) {
        if particle.alpha() <= 0.0 {
            return;
        }
        let key = SheetKey {
            image: particle.image().unwrap_or("").to_string(),
            color: particle.color(),
        };
        let Some(assign) = self.assignments.get(&key) else {
            return; // not queued this batch
        };
        let Some(sheet) = self
            .sheets
            .get(&key.image)
            .and_then(|s| s.get(assign.cell.sheet))
        else {
            return;
        };

        surface.blit_cell(
            sheet.data(),
            sheet.size(),
            assign.cell.x,
            assign.cell.y,
            self.opts.cell_size,
            particle.rect(),
            particle.alpha().min(1.0) as f32,
            particle.dir(),
        );
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }
}
