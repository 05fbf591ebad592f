use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{
    notation::format_sequence,
    rotation::{ActiveRotation, RotationEngine},
    solver::SolverPhase,
    Axis, Band, Color, Cube, CubeEngine, Face, Move, Position,
};

/// Read-only view of one cubelet for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeletView {
    pub id: usize,
    pub position: Position,
    pub stickers: Vec<(Face, Color)>,
    /// Whether the cubelet sits in the layer that is currently turning and
    /// must be drawn offset by [`RotationView::angle`].
    pub turning: bool,
}

/// The in-flight turn as the renderer needs it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationView {
    pub mv: Move,
    pub axis: Axis,
    pub layer: i8,
    pub angle: f32,
}

impl From<&ActiveRotation> for RotationView {
    fn from(active: &ActiveRotation) -> Self {
        Self {
            mv: active.mv,
            axis: active.turn.axis,
            layer: active.turn.layer,
            angle: active.angle,
        }
    }
}

/// Everything needed to draw one frame of the cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub cubelets: Vec<CubeletView>,
    pub rotation: Option<RotationView>,
}

impl RenderSnapshot {
    pub fn capture(cube: &Cube, rotation: &RotationEngine) -> Self {
        let active = rotation.active().map(RotationView::from);
        let cubelets = cube
            .cubelets()
            .iter()
            .map(|cubelet| CubeletView {
                id: cubelet.id(),
                position: cubelet.position(),
                stickers: cubelet.stickers().iter().collect(),
                turning: active.is_some_and(|turn| cubelet.in_layer(turn.axis, turn.layer)),
            })
            .collect();

        Self {
            cubelets,
            rotation: active,
        }
    }
}

/// Data for the text overlay: history, counters, solver backlog and the
/// band meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub history: Vec<Move>,
    pub total_moves: u64,
    pub face_counts: Vec<(Face, u64)>,
    pub backlog: usize,
    pub queued: usize,
    pub solver_phase: SolverPhase,
    pub last_trigger: Option<String>,
    pub elapsed_seconds: f32,
    /// Latest level of each band, in [`Band::ALL`] order.
    pub band_levels: [f32; 6],
    /// Moving average each level is compared against.
    pub band_averages: [f32; 6],
}

impl HudSnapshot {
    pub fn capture(engine: &CubeEngine) -> Self {
        let mapper = engine.mapper();
        let bands = engine.bands();
        Self {
            history: mapper.history().map(|entry| entry.mv).collect(),
            total_moves: mapper.stats().total,
            face_counts: mapper.stats().faces().collect(),
            backlog: engine.undo_stack().len(),
            queued: engine.scheduler().len(),
            solver_phase: engine.solver_phase(),
            last_trigger: mapper.last_trigger().map(str::to_owned),
            elapsed_seconds: engine.elapsed_seconds(),
            band_levels: bands.levels(),
            band_averages: bands.averages(),
        }
    }

    /// Plain-text overlay, one item per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let phase = match self.solver_phase {
            SolverPhase::Accumulating => "warming up",
            SolverPhase::Active { .. } => "solving",
        };
        let _ = writeln!(out, "Time: {:.1}s ({phase})", self.elapsed_seconds);
        let _ = writeln!(out, "Backlog: {}  Queued: {}", self.backlog, self.queued);
        let _ = writeln!(out, "Total Moves: {}", self.total_moves);
        for (face, count) in &self.face_counts {
            let _ = writeln!(out, "{face}: {count}");
        }
        for (band, (level, average)) in Band::ALL
            .iter()
            .zip(self.band_levels.iter().zip(&self.band_averages))
        {
            let _ = writeln!(out, "{}: {level:.3}  EMA: {average:.3}", band.label());
        }
        if let Some(trigger) = &self.last_trigger {
            let _ = writeln!(out, "Triggered: {trigger}");
        }
        let _ = write!(out, "History: {}", format_sequence(&self.history));
        out
    }
}

/// Draws the cube as an unfolded cross:
///
/// ```text
///       U
///     L F R B
///       D
/// ```
pub fn render_net(cube: &Cube) -> String {
    let rows = |face: Face| -> Vec<String> {
        cube.face_grid(face)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', Color::initial))
                    .collect()
            })
            .collect()
    };
    let pad = " ".repeat(4);
    let mut out = String::new();

    for row in rows(Face::Up) {
        let _ = writeln!(out, "{pad}{row}");
    }
    let middle = [Face::Left, Face::Front, Face::Right, Face::Back].map(rows);
    for i in 0..3 {
        let line: Vec<&str> = middle.iter().map(|face| face[i].as_str()).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    for row in rows(Face::Down) {
        let _ = writeln!(out, "{pad}{row}");
    }
    out
}
