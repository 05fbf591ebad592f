//! Cubelet model: 27 unit cubes with integer positions and face stickers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Direction, Face};
use crate::Face::{Back as B, Down as D, Front as F, Left as L, Right as R, Up as U};

/// Rotation axis. `x` points right, `y` points down and `z` points to the
/// front, matching the screen-space layout of the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Sticker colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Yellow,
    Orange,
    Red,
    Green,
    Blue,
}

impl Color {
    /// Colour of the face in the solved state.
    pub fn home(face: Face) -> Self {
        match face {
            Face::Up => Color::White,
            Face::Down => Color::Yellow,
            Face::Left => Color::Orange,
            Face::Right => Color::Red,
            Face::Front => Color::Green,
            Face::Back => Color::Blue,
        }
    }

    /// 8-bit RGB triple used by renderers.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Color::White => [255, 255, 255],
            Color::Yellow => [255, 255, 0],
            Color::Orange => [255, 165, 0],
            Color::Red => [255, 0, 0],
            Color::Green => [0, 255, 0],
            Color::Blue => [0, 0, 255],
        }
    }

    /// Single letter used by the text renderer.
    pub fn initial(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Blue => 'B',
        }
    }
}

/// Integer cubelet position, every coordinate in `-1..=1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8, z: i8) -> Self {
        Self { x, y, z }
    }

    /// All 27 grid positions, `x` outermost and `z` innermost.
    pub fn grid() -> impl Iterator<Item = Position> {
        (-1..=1).flat_map(|x| {
            (-1..=1).flat_map(move |y| (-1..=1).map(move |z| Position::new(x, y, z)))
        })
    }

    pub fn coord(self, axis: Axis) -> i8 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Integer quarter turn about `axis`; `sign` is `+1` or `-1`.
    pub fn rotated(self, axis: Axis, sign: i8) -> Self {
        let Position { x, y, z } = self;
        match axis {
            Axis::X => Position::new(x, -z * sign, y * sign),
            Axis::Y => Position::new(z * sign, y, -x * sign),
            Axis::Z => Position::new(-y * sign, x * sign, z),
        }
    }

    /// Whether this position lies on the outer layer of `face`.
    pub fn touches(self, face: Face) -> bool {
        match face {
            Face::Right => self.x == 1,
            Face::Left => self.x == -1,
            Face::Up => self.y == -1,
            Face::Down => self.y == 1,
            Face::Front => self.z == 1,
            Face::Back => self.z == -1,
        }
    }

    /// Number of coordinates at an extreme, i.e. how many stickers a cubelet
    /// here carries.
    pub fn exposed_faces(self) -> usize {
        Face::ALL.into_iter().filter(|&face| self.touches(face)).count()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Face-label relabelling after a quarter turn, indexed by `Face::index`.
type StickerTable = [Face; 6];

// x: U->B->D->F->U
const X_CLOCKWISE: StickerTable = [B, F, L, R, U, D];
const X_COUNTER: StickerTable = [F, B, L, R, D, U];
// y: F->R->B->L->F
const Y_CLOCKWISE: StickerTable = [U, D, F, B, R, L];
const Y_COUNTER: StickerTable = [U, D, B, F, L, R];
// z: U->R->D->L->U
const Z_CLOCKWISE: StickerTable = [R, L, U, D, F, B];
const Z_COUNTER: StickerTable = [L, R, D, U, F, B];

fn sticker_table(axis: Axis, direction: Direction) -> &'static StickerTable {
    match (axis, direction) {
        (Axis::X, Direction::Clockwise) => &X_CLOCKWISE,
        (Axis::X, Direction::CounterClockwise) => &X_COUNTER,
        (Axis::Y, Direction::Clockwise) => &Y_CLOCKWISE,
        (Axis::Y, Direction::CounterClockwise) => &Y_COUNTER,
        (Axis::Z, Direction::Clockwise) => &Z_CLOCKWISE,
        (Axis::Z, Direction::CounterClockwise) => &Z_COUNTER,
    }
}

/// Stickers of one cubelet, keyed by the face each one currently points at.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stickers([Option<Color>; 6]);

impl Stickers {
    /// Solved-state stickers for a cubelet at `position`.
    pub fn for_position(position: Position) -> Self {
        let mut stickers = Self::default();
        for face in Face::ALL {
            if position.touches(face) {
                stickers.0[face.index()] = Some(Color::home(face));
            }
        }
        stickers
    }

    pub fn get(&self, face: Face) -> Option<Color> {
        self.0[face.index()]
    }

    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, Color)> + '_ {
        Face::ALL
            .into_iter()
            .filter_map(|face| self.get(face).map(|color| (face, color)))
    }

    fn relabelled(&self, table: &StickerTable) -> Self {
        let mut out = Self::default();
        for (face, color) in self.iter() {
            out.0[table[face.index()].index()] = Some(color);
        }
        out
    }
}

/// One of the 27 unit cubes. Its identity survives every move; only the
/// position and sticker labels change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cubelet {
    id: usize,
    home: Position,
    position: Position,
    stickers: Stickers,
}

impl Cubelet {
    fn new(id: usize, home: Position) -> Self {
        Self {
            id,
            home,
            position: home,
            stickers: Stickers::for_position(home),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn stickers(&self) -> &Stickers {
        &self.stickers
    }

    pub fn in_layer(&self, axis: Axis, layer: i8) -> bool {
        self.position.coord(axis) == layer
    }

    fn turn(&mut self, axis: Axis, direction: Direction) {
        self.position = self.position.rotated(axis, direction.sign());
        self.stickers = self.stickers.relabelled(sticker_table(axis, direction));
    }
}

/// The full puzzle: 27 cubelets, one per grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    cubelets: Vec<Cubelet>,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

impl Cube {
    /// Builds a solved cube.
    pub fn new() -> Self {
        let mut cube = Self {
            cubelets: Vec::with_capacity(27),
        };
        cube.initialize();
        cube
    }

    /// Rebuilds all cubelets in their solved state.
    pub fn initialize(&mut self) {
        self.cubelets.clear();
        self.cubelets.extend(
            Position::grid()
                .enumerate()
                .map(|(id, home)| Cubelet::new(id, home)),
        );
    }

    pub fn cubelets(&self) -> &[Cubelet] {
        &self.cubelets
    }

    pub fn cubelet_at(&self, position: Position) -> Option<&Cubelet> {
        self.cubelets.iter().find(|c| c.position == position)
    }

    /// Commits a finished quarter turn: every cubelet in the layer is moved
    /// and its stickers relabelled.
    pub fn apply_layer_permutation(&mut self, axis: Axis, layer: i8, direction: Direction) {
        for cubelet in self.cubelets.iter_mut().filter(|c| c.in_layer(axis, layer)) {
            cubelet.turn(axis, direction);
        }
    }

    /// True when every visible sticker shows the home colour of the face it
    /// points at.
    pub fn is_solved(&self) -> bool {
        self.cubelets.iter().all(|cubelet| {
            cubelet
                .stickers
                .iter()
                .all(|(face, color)| color == Color::home(face))
        })
    }

    /// The nine stickers of one face as seen from outside, row by row.
    ///
    /// Up is read with Back at the top, Down with Front at the top, and the
    /// four side faces with Up at the top, so that the faces line up when
    /// laid out as an unfolded cross.
    pub fn face_grid(&self, face: Face) -> [[Option<Color>; 3]; 3] {
        let mut grid = [[None; 3]; 3];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let position = facelet_position(face, row as i8 - 1, col as i8 - 1);
                *cell = self.cubelet_at(position).and_then(|c| c.stickers.get(face));
            }
        }
        grid
    }
}

fn facelet_position(face: Face, row: i8, col: i8) -> Position {
    match face {
        Face::Up => Position::new(col, -1, row),
        Face::Down => Position::new(col, 1, -row),
        Face::Front => Position::new(col, row, 1),
        Face::Back => Position::new(-col, row, -1),
        Face::Left => Position::new(-1, row, col),
        Face::Right => Position::new(1, row, -col),
    }
}
