//! The cube engine context: one object that owns the cube and every piece of
//! state that drives it. Everything happens on [`CubeEngine::advance`], so a
//! driver only has to call it once per frame.

use crate::{
    analysis::{BandHit, BandTrigger},
    mapping::{key_to_move, StimulusMapper},
    notation::parse_sequence,
    render::{HudSnapshot, RenderSnapshot},
    solver::{SolverPhase, UndoSolver, UndoStack},
    timeline::{MoveOrigin, ScheduledMove},
    AppConfig, Cube, Face, Move, PlaybackClock, Result, RotationEngine, Scheduler,
};

/// What happened during one [`CubeEngine::advance`] call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Move taken off the queue and started this tick.
    pub started: Option<ScheduledMove>,
    /// Move whose quarter turn finished this tick.
    pub completed: Option<Move>,
    /// Moves the solver popped off the undo stack this tick.
    pub solver_moves: Vec<Move>,
    /// Whether the solver switched to its active phase this tick.
    pub solver_latched: bool,
}

#[derive(Debug)]
pub struct CubeEngine {
    config: AppConfig,
    cube: Cube,
    rotation: RotationEngine,
    scheduler: Scheduler,
    clock: PlaybackClock,
    mapper: StimulusMapper,
    bands: BandTrigger,
    solver: UndoSolver,
}

impl Default for CubeEngine {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl CubeEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            cube: Cube::new(),
            rotation: RotationEngine::new(),
            scheduler: Scheduler::new(),
            clock: PlaybackClock::default(),
            mapper: StimulusMapper::new(config.history.limit),
            bands: BandTrigger::new(config.trigger.clone()),
            solver: UndoSolver::new(config.solver.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Queues one stimulus move and records its inverse on the undo stack.
    pub fn trigger_move(&mut self, face: Face, clockwise: bool) -> Move {
        let mv = self.mapper.trigger(&mut self.scheduler, face, clockwise);
        let change = self.solver.record_stimulus(mv);
        tracing::debug!(%mv, ?change, backlog = self.solver.stack().len(), "stimulus");
        mv
    }

    /// Keyboard trigger. Keys that are not face letters are ignored.
    pub fn trigger_key(&mut self, key: char) -> Option<Move> {
        let mv = key_to_move(key)?;
        self.mapper.set_last_trigger(format!("Key {key} → {}", mv.face));
        Some(self.trigger_move(mv.face, mv.is_clockwise()))
    }

    /// Triggers every move of a notation string such as `"R U' F"`. Nothing
    /// is queued unless the whole string parses.
    pub fn trigger_notation(&mut self, text: &str) -> Result<Vec<Move>> {
        let moves = parse_sequence(text)?;
        for mv in &moves {
            self.trigger_move(mv.face, mv.is_clockwise());
        }
        Ok(moves)
    }

    /// Feeds one spectrum frame to the band trigger and turns a hit into a
    /// stimulus move.
    pub fn observe_spectrum(&mut self, spectrum: &[f32]) -> Option<BandHit> {
        let hit = self.bands.observe(spectrum, self.rotation.is_idle())?;
        self.mapper.set_last_trigger(hit.label());
        self.trigger_move(hit.face(), hit.clockwise);
        Some(hit)
    }

    /// Starts `mv` immediately, bypassing the queue and the undo stack.
    /// Returns `false` and changes nothing while another turn animates.
    pub fn begin_move(&mut self, mv: Move) -> bool {
        let started = self.rotation.begin(mv);
        if started {
            self.mapper.log(mv, MoveOrigin::Direct);
        }
        started
    }

    /// One frame: clock, solver, queue, animation, in that order.
    pub fn advance(&mut self, angle_step: f32, delta_seconds: f32) -> TickReport {
        let mut report = TickReport::default();

        self.clock.advance(delta_seconds);
        let now = self.clock.time_seconds;

        report.solver_latched = self.solver.update_phase(now);
        let ready = self.rotation.is_idle() && self.scheduler.is_empty();
        report.solver_moves = self.solver.tick(now, ready);
        for &mv in &report.solver_moves {
            self.mapper
                .submit(&mut self.scheduler, mv, MoveOrigin::Solver);
        }

        report.started = self.scheduler.tick(&mut self.rotation);
        report.completed = self.rotation.tick(&mut self.cube, angle_step);
        report
    }

    /// [`advance`](Self::advance) with the configured angle step and frame
    /// time.
    pub fn step(&mut self) -> TickReport {
        let animation = &self.config.animation;
        let (angle_step, frame_seconds) = (animation.angle_step, animation.frame_seconds);
        self.advance(angle_step, frame_seconds)
    }

    /// Back to a solved cube with empty queue, stack, history and clock.
    pub fn rebuild(&mut self) {
        self.cube.initialize();
        self.rotation.reset();
        self.scheduler.clear();
        self.clock.reset();
        self.mapper.clear();
        self.bands.reset();
        self.solver.reset();
        tracing::info!("cube rebuilt");
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn mapper(&self) -> &StimulusMapper {
        &self.mapper
    }

    pub fn bands(&self) -> &BandTrigger {
        &self.bands
    }

    pub fn undo_stack(&self) -> &UndoStack {
        self.solver.stack()
    }

    pub fn solver_phase(&self) -> SolverPhase {
        self.solver.phase()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.clock.time_seconds
    }

    /// Nothing animating and nothing queued.
    pub fn is_settled(&self) -> bool {
        self.rotation.is_idle() && self.scheduler.is_empty()
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.cube, &self.rotation)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SolverConfig, rotation::QUARTER_TURN, Axis, Color, Position};

    const STEP: f32 = QUARTER_TURN / 10.0;
    const FRAME: f32 = 1.0 / 60.0;

    fn engine_with_warmup(warmup_seconds: f32) -> CubeEngine {
        CubeEngine::new(AppConfig {
            solver: SolverConfig {
                warmup_seconds,
                ..SolverConfig::default()
            },
            ..AppConfig::default()
        })
    }

    /// Advances until nothing is animating, queued or owed.
    fn run_until_drained(engine: &mut CubeEngine) -> usize {
        for frame in 0..100_000 {
            if engine.is_settled() && engine.undo_stack().is_empty() {
                return frame;
            }
            engine.advance(STEP, FRAME);
        }
        panic!("engine never drained");
    }

    fn run_until_settled(engine: &mut CubeEngine) {
        for _ in 0..10_000 {
            if engine.is_settled() {
                return;
            }
            engine.advance(STEP, FRAME);
        }
        panic!("engine never settled");
    }

    #[test]
    fn right_turn_scenario() {
        let mut engine = engine_with_warmup(1.0);
        engine.trigger_move(Face::Right, true);
        assert_eq!(engine.undo_stack().as_slice(), &[Move::counter_clockwise(Face::Right)]);

        run_until_settled(&mut engine);
        assert!(!engine.cube().is_solved());
        let moved = engine
            .cube()
            .cubelets()
            .iter()
            .find(|c| c.home() == Position::new(1, -1, 1))
            .unwrap();
        assert_eq!(moved.position(), Position::new(1, -1, -1));
        assert_eq!(moved.stickers().get(Face::Back), Some(Color::White));
        assert_eq!(engine.undo_stack().len(), 1);

        run_until_drained(&mut engine);
        assert!(engine.cube().is_solved());
        assert!(engine.undo_stack().is_empty());
        assert!(engine.elapsed_seconds() >= 1.0);
    }

    #[test]
    fn draining_undoes_an_accumulated_scramble() {
        let mut engine = engine_with_warmup(30.0);
        let scramble = "R U' F F L' D B' B' U R' F' L D' D'";
        engine.trigger_notation(scramble).unwrap();
        run_until_settled(&mut engine);
        assert!(!engine.cube().is_solved());
        assert!(!engine.solver.is_active());
        assert_eq!(engine.undo_stack().len(), 14);

        run_until_drained(&mut engine);
        assert!(engine.cube().is_solved());
        assert!(engine.solver.is_active());
    }

    #[test]
    fn cancellation_keeps_the_drain_sound() {
        let mut engine = engine_with_warmup(0.0);
        engine.trigger_move(Face::Up, true);
        engine.trigger_move(Face::Front, false);
        engine.advance(STEP, FRAME);
        assert!(engine.solver.is_active());
        assert_eq!(engine.undo_stack().top(), Some(Move::clockwise(Face::Front)));

        let depth = engine.undo_stack().len();
        engine.trigger_move(Face::Front, true);
        assert_eq!(engine.undo_stack().len(), depth - 1);

        run_until_drained(&mut engine);
        assert!(engine.cube().is_solved());
    }

    #[test]
    fn busy_begin_move_changes_nothing() {
        let mut engine = CubeEngine::default();
        assert!(engine.begin_move(Move::clockwise(Face::Left)));
        engine.advance(STEP, FRAME);
        let active = *engine.rotation().state();
        let cube = engine.cube().clone();

        assert!(!engine.begin_move(Move::clockwise(Face::Down)));
        assert_eq!(*engine.rotation().state(), active);
        assert_eq!(engine.cube(), &cube);
        assert_eq!(engine.mapper().stats().total, 1);
    }

    #[test]
    fn triggers_while_busy_are_deferred_not_dropped() {
        let mut engine = CubeEngine::default();
        engine.trigger_move(Face::Right, true);
        engine.advance(STEP, FRAME);
        engine.trigger_move(Face::Right, true);
        assert_eq!(engine.scheduler().len(), 1);

        let mut completed = Vec::new();
        for _ in 0..40 {
            completed.extend(engine.advance(STEP, FRAME).completed);
        }
        assert_eq!(completed, vec![Move::clockwise(Face::Right); 2]);
    }

    #[test]
    fn invalid_triggers_are_ignored() {
        let mut engine = CubeEngine::default();
        assert_eq!(engine.trigger_key('q'), None);
        assert!(engine.trigger_notation("R X").is_err());
        assert!(engine.scheduler().is_empty());
        assert!(engine.undo_stack().is_empty());

        assert_eq!(engine.trigger_key('U'), Some(Move::counter_clockwise(Face::Up)));
        assert_eq!(engine.hud().last_trigger.as_deref(), Some("Key U → U"));
    }

    #[test]
    fn solver_moves_show_up_in_history() {
        let mut engine = engine_with_warmup(0.5);
        engine.trigger_notation("R U").unwrap();
        run_until_drained(&mut engine);

        let origins: Vec<MoveOrigin> = engine.mapper().history().map(|m| m.origin).collect();
        assert_eq!(
            origins,
            vec![
                MoveOrigin::Stimulus,
                MoveOrigin::Stimulus,
                MoveOrigin::Solver,
                MoveOrigin::Solver,
            ]
        );
        assert_eq!(engine.mapper().stats().count(Face::Up), 2);
    }

    #[test]
    fn render_snapshot_follows_the_active_turn() {
        let mut engine = CubeEngine::default();
        assert!(engine.render_snapshot().rotation.is_none());

        engine.trigger_move(Face::Front, true);
        engine.advance(STEP, FRAME);

        let snapshot = engine.render_snapshot();
        let turn = snapshot.rotation.expect("front turn should be animating");
        assert_eq!(turn.mv, Move::clockwise(Face::Front));
        assert_eq!((turn.axis, turn.layer), (Axis::Z, 1));
        assert!(turn.angle > 0.0 && turn.angle < QUARTER_TURN);

        let turning: Vec<_> = snapshot.cubelets.iter().filter(|c| c.turning).collect();
        assert_eq!(turning.len(), 9);
        assert!(turning.iter().all(|c| c.position.z == 1));

        run_until_settled(&mut engine);
        let settled = engine.render_snapshot();
        assert!(settled.rotation.is_none());
        assert!(settled.cubelets.iter().all(|c| !c.turning));
    }

    #[test]
    fn rebuild_clears_everything() {
        let mut engine = engine_with_warmup(0.0);
        engine.trigger_notation("F B L").unwrap();
        for _ in 0..15 {
            engine.advance(STEP, FRAME);
        }
        engine.rebuild();

        assert!(engine.cube().is_solved());
        assert!(engine.is_settled());
        assert!(engine.undo_stack().is_empty());
        assert_eq!(engine.mapper().stats().total, 0);
        assert_eq!(engine.solver_phase(), SolverPhase::Accumulating);
        assert_eq!(engine.elapsed_seconds(), 0.0);
    }

    #[test]
    fn independent_engines_do_not_interfere() {
        let mut a = CubeEngine::default();
        let b = CubeEngine::default();
        a.trigger_move(Face::Back, true);
        run_until_settled(&mut a);
        assert!(!a.cube().is_solved());
        assert!(b.cube().is_solved());
    }
}
