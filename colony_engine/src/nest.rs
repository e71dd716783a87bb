use crate::entities::{IdGenerator, NestId, PieceId, SpeciesId};
use crate::geometry::Coord;
use crate::map::{Grid, Occupant};

/// A health-bearing block of a nest. Pieces never move.
#[derive(Clone, Debug, PartialEq)]
pub struct NestPiece {
    id: PieceId,
    cell: usize,
    position: Coord,
    health: f64,
}

impl NestPiece {
    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn cell(&self) -> usize {
        self.cell
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn health(&self) -> f64 {
        self.health
    }
}

/// What happened to a piece that was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceOutcome {
    Damaged,
    Destroyed,
    /// The piece was the last one, so the whole nest is gone.
    NestDestroyed,
}

/// A colony's home: where food is delivered and brood is raised.
#[derive(Clone, Debug)]
pub struct Nest {
    id: NestId,
    species: SpeciesId,
    position: Coord,
    pieces: Vec<NestPiece>,
    food: u32,
}

impl Nest {
    /// Lays down a square of pieces `radius` cells either side of `position`, sharing
    /// `health` equally, and puts every piece on the grid.
    pub fn create_nest(
        id: NestId,
        species: SpeciesId,
        position: Coord,
        health: f64,
        radius: usize,
        grid: &mut Grid,
        ids: &mut IdGenerator,
    ) -> Nest {
        let position = grid.cell_coord(grid.cell_index(position));
        let footprint = grid.block(position, radius);
        let share = health / footprint.len() as f64;

        let pieces = footprint
            .into_iter()
            .map(|cell| {
                let piece = NestPiece {
                    id: ids.next_piece(),
                    cell,
                    position: grid.cell_coord(cell),
                    health: share,
                };
                grid.insert(
                    Occupant::NestPiece {
                        nest: id,
                        piece: piece.id,
                    },
                    piece.position,
                );
                piece
            })
            .collect();

        Nest {
            id,
            species,
            position,
            pieces,
            food: 0,
        }
    }

    pub fn id(&self) -> NestId {
        self.id
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    /// Centre of the nest.
    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn pieces(&self) -> &[NestPiece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&NestPiece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    /// Total health of the pieces still standing.
    pub fn health(&self) -> f64 {
        self.pieces.iter().map(|piece| piece.health).sum()
    }

    pub fn is_alive(&self) -> bool {
        !self.pieces.is_empty()
    }

    /// Whether a piece of the nest stands in the cell at `index`.
    pub fn contains_cell(&self, index: usize) -> bool {
        self.pieces.iter().any(|piece| piece.cell == index)
    }

    /// Food in store.
    pub fn food(&self) -> u32 {
        self.food
    }

    pub(crate) fn store_food(&mut self, amount: u32) {
        self.food = self.food.saturating_add(amount);
    }

    /// Spends `cost` units if there are that many in store.
    pub(crate) fn spend_food(&mut self, cost: u32) -> bool {
        if self.food < cost {
            return false;
        }
        self.food -= cost;
        true
    }

    /// Takes `amount` off a piece. A piece left with no health dies and leaves the grid.
    /// Returns `None` if the piece is not part of this nest.
    pub(crate) fn damage_piece(
        &mut self,
        piece: PieceId,
        amount: f64,
        grid: &mut Grid,
    ) -> Option<PieceOutcome> {
        let index = self.pieces.iter().position(|other| other.id == piece)?;
        self.pieces[index].health -= amount;

        if self.pieces[index].health > 0.0 {
            return Some(PieceOutcome::Damaged);
        }

        self.pieces.remove(index);
        grid.remove(Occupant::NestPiece {
            nest: self.id,
            piece,
        });

        if self.pieces.is_empty() {
            Some(PieceOutcome::NestDestroyed)
        } else {
            Some(PieceOutcome::Destroyed)
        }
    }
}
