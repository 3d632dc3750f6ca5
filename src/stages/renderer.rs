//! Renderer stage: turns the tile grid into glyph rows.
//!
//! In [`BuildMode::PerTick`] the rows are produced a few at a time from
//! [`LevelStage::update`], so this stage reports completion frames after its
//! `build` call. In [`BuildMode::Immediate`] everything happens inside `build`.

use log::debug;

use crate::resources::leveldata::{LevelData, TileGrid, TileType};
use crate::stages::{BuildMode, LevelStage, StageCompletion, StageContext, StageKind};

pub const WALL_GLYPH: char = '#';
pub const FLOOR_GLYPH: char = '.';

pub fn glyph(tile: TileType) -> char {
    match tile {
        TileType::Wall => WALL_GLYPH,
        TileType::Floor => FLOOR_GLYPH,
    }
}

fn render_row(grid: &TileGrid, y: u32) -> String {
    (0..grid.width())
        .map(|x| grid.get(x, y).map(glyph).unwrap_or(' '))
        .collect()
}

#[derive(Debug)]
pub struct RendererStage {
    rows_per_tick: u32,
    next_row: u32,
    pending: Option<StageCompletion>,
    built: bool,
}

impl RendererStage {
    pub fn new(rows_per_tick: u32) -> Self {
        Self {
            rows_per_tick: rows_per_tick.max(1),
            next_row: 0,
            pending: None,
            built: false,
        }
    }

    /// True while rows remain to be rendered.
    pub fn in_progress(&self) -> bool {
        self.pending.is_some()
    }

    fn render_rows(&mut self, level: &mut LevelData, count: u32) {
        let end = self.next_row.saturating_add(count).min(level.grid.height());
        for y in self.next_row..end {
            let row = render_row(&level.grid, y);
            level.render_rows.push(row);
        }
        self.next_row = end;

        if self.next_row >= level.grid.height() {
            if let Some(completion) = self.pending.take() {
                debug!("Renderer built: {} rows", level.render_rows.len());
                completion.complete();
            }
        }
    }
}

impl Default for RendererStage {
    fn default() -> Self {
        Self::new(4)
    }
}

impl LevelStage for RendererStage {
    fn kind(&self) -> StageKind {
        StageKind::Renderer
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn build(&mut self, level: &mut LevelData, ctx: StageContext) {
        level.render_rows.clear();
        self.next_row = 0;
        self.built = true;
        self.pending = Some(ctx.completion);
        match ctx.mode {
            BuildMode::Immediate => self.render_rows(level, u32::MAX),
            BuildMode::PerTick => self.render_rows(level, self.rows_per_tick),
        }
    }

    fn update(&mut self, level: &mut LevelData) {
        if self.pending.is_some() {
            self.render_rows(level, self.rows_per_tick);
        }
    }

    fn dispose(&mut self, level: &mut LevelData) {
        // Dropping the handle abandons a render still in flight.
        self.pending = None;
        self.next_row = 0;
        level.render_rows.clear();
        self.built = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::CompletionSignal;
    use crossbeam_channel::{Receiver, unbounded};

    fn ctx(mode: BuildMode) -> (StageContext, Receiver<CompletionSignal>) {
        let (tx, rx) = unbounded();
        (
            StageContext {
                mode,
                completion: StageCompletion::new(StageKind::Renderer, 1, tx),
            },
            rx,
        )
    }

    fn level(width: u32, height: u32) -> LevelData {
        let mut level = LevelData::new(width, height);
        level.grid = TileGrid::new(width, height);
        level.grid.set(1, 0, TileType::Floor);
        level
    }

    #[test]
    fn test_immediate_renders_everything_in_build() {
        let mut level = level(3, 5);
        let (ctx, rx) = ctx(BuildMode::Immediate);
        let mut stage = RendererStage::new(1);
        stage.build(&mut level, ctx);

        assert_eq!(level.render_rows.len(), 5);
        assert_eq!(level.render_rows[0], "#.#");
        assert_eq!(rx.try_iter().count(), 1);
        assert!(!stage.in_progress());
    }

    #[test]
    fn test_per_tick_completes_after_updates() {
        let mut level = level(3, 5);
        let (ctx, rx) = ctx(BuildMode::PerTick);
        let mut stage = RendererStage::new(2);
        stage.build(&mut level, ctx);
        assert_eq!(level.render_rows.len(), 2);
        assert_eq!(rx.try_iter().count(), 0);

        stage.update(&mut level);
        assert_eq!(level.render_rows.len(), 4);
        assert_eq!(rx.try_iter().count(), 0);

        stage.update(&mut level);
        assert_eq!(level.render_rows.len(), 5);
        assert_eq!(rx.try_iter().count(), 1);

        // Further updates are no-ops.
        stage.update(&mut level);
        assert_eq!(level.render_rows.len(), 5);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_dispose_mid_render_drops_completion() {
        let mut level = level(3, 6);
        let (ctx, rx) = ctx(BuildMode::PerTick);
        let mut stage = RendererStage::new(1);
        stage.build(&mut level, ctx);
        stage.dispose(&mut level);
        stage.update(&mut level);

        assert!(level.render_rows.is_empty());
        assert!(!stage.is_built());
        assert_eq!(rx.try_iter().count(), 0);
    }
}
