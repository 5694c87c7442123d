//! The ordered stage chain.
//!
//! Stage order is data, not types: a `Vec` of boxed [`Stage`]s, each tagged
//! with its [`StageKind`]. The engine builds the standard chain
//! (Tape → Dirt → Pump → Reverb) but tests and benches can assemble any
//! subset.

use crate::{
    io::AudioBlock,
    params::EngineParameters,
    stage::{
        BlockContext, DirtStage, ProcessSpec, PumpStage, ReverbStage, Stage, StageKind, TapeStage,
    },
};

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Tape → Dirt → Pump → Reverb.
    pub fn standard() -> Self {
        Self::new()
            .with(TapeStage::new())
            .with(DirtStage::new())
            .with(PumpStage::new())
            .with(ReverbStage::new())
    }

    pub fn with(mut self, stage: impl Stage + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage kinds in processing order.
    pub fn kinds(&self) -> impl Iterator<Item = StageKind> + '_ {
        self.stages.iter().map(|stage| stage.kind())
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        for stage in &mut self.stages {
            stage.prepare(spec);
        }
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn update(&mut self, params: &EngineParameters, ctx: &BlockContext) {
        for stage in &mut self.stages {
            stage.update(params, ctx);
        }
    }

    /// Run every stage in order. `before_stage` sees the block just before
    /// each one runs.
    pub fn process<F>(&mut self, block: &mut AudioBlock, mut before_stage: F)
    where
        F: FnMut(StageKind, &mut AudioBlock),
    {
        for stage in &mut self.stages {
            before_stage(stage.kind(), block);
            stage.process(block);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}
