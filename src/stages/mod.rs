//! Level generation stages.
//!
//! A stage is one independently built unit of level content. Every stage
//! implements [`LevelStage`]; the
//! [`LevelBuilder`](crate::resources::levelbuilder::LevelBuilder) owns the
//! stages and runs them in their declared order. Stages never call each other.
//!
//! Completion is reported through a [`StageCompletion`] handle handed to the
//! stage in its [`StageContext`]. A stage may complete inside `build` or any
//! number of frames later from its own `update`.
//!
//! Submodules:
//! - [`map`] – allocates the tile grid
//! - [`dungeon`] – carves rooms and corridors through a [`dungeon::DungeonGenerator`]
//! - [`colliders`] – one collider per wall tile
//! - [`renderer`] – glyph rows for the grid, possibly over several frames
//! - [`spawners`] – actor spawn points in intermediate rooms

pub mod colliders;
pub mod dungeon;
pub mod map;
pub mod renderer;
pub mod spawners;

use crossbeam_channel::Sender;

use crate::resources::leveldata::LevelData;

/// Identity of a stage. A builder holds at most one stage per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Map,
    Dungeon,
    Colliders,
    Renderer,
    ActorSpawners,
    /// A [`LevelBuilder`](crate::resources::levelbuilder::LevelBuilder) used as a stage.
    Builder,
}

/// How a builder drives its stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Tooling/preview: every stage is built within the `build` call.
    Immediate,
    /// Live: one stage is built per scheduling tick.
    #[default]
    PerTick,
}

/// Completion signal sent by a stage over the builder's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal {
    pub kind: StageKind,
    pub cycle: u64,
}

/// Handle a stage uses to report that it finished building.
///
/// Tagged with the stage kind and the build cycle it was issued for, so a
/// late signal from a disposed cycle cannot be counted in the next one.
#[derive(Debug, Clone)]
pub struct StageCompletion {
    kind: StageKind,
    cycle: u64,
    tx: Sender<CompletionSignal>,
}

impl StageCompletion {
    pub fn new(kind: StageKind, cycle: u64, tx: Sender<CompletionSignal>) -> Self {
        Self { kind, cycle, tx }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Report completion. A disconnected builder is not an error; the signal is dropped.
    pub fn complete(&self) {
        let _ = self.tx.send(CompletionSignal {
            kind: self.kind,
            cycle: self.cycle,
        });
    }
}

/// Per-build context handed to [`LevelStage::build`].
#[derive(Debug, Clone)]
pub struct StageContext {
    pub mode: BuildMode,
    pub completion: StageCompletion,
}

/// Contract every level generation stage fulfils.
///
/// - `build` is called at most once per build cycle; calling it again before
///   `dispose` is a contract violation the builder rejects.
/// - `dispose` releases generated resources, resets the built flag, and must
///   be safe whether or not `build` ran or finished.
pub trait LevelStage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn is_built(&self) -> bool;

    fn build(&mut self, level: &mut LevelData, ctx: StageContext);

    /// Own per-frame work of a stage that completes over several frames.
    fn update(&mut self, _level: &mut LevelData) {}

    fn dispose(&mut self, level: &mut LevelData);
}
