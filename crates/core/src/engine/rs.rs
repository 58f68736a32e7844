//! Reservation station pool.
//!
//! Each station holds an issued instruction until both of its operands are
//! resolved to concrete values; there is no separate scoreboard structure
//! here, because the ROB backward scan (`Rob::find_latest_producer`) is
//! the dependency map, and a station's own `Operand::Tag` fields are a
//! direct subscription to the producer that will clear it.

use crate::engine::rob::RobTag;
use crate::isa::Opcode;

/// A source operand: either a concrete value, or the tag of the ROB entry
/// that will produce it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The value is already known.
    Value(i64),
    /// The value will arrive on the CDB when this tag's entry completes.
    Tag(RobTag),
}

impl Operand {
    /// True once this operand holds a concrete value.
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Operand::Value(_))
    }

    /// The concrete value, if ready.
    #[must_use]
    pub fn value(self) -> Option<i64> {
        match self {
            Operand::Value(v) => Some(v),
            Operand::Tag(_) => None,
        }
    }
}

/// A single reservation station.
#[derive(Clone, Debug)]
pub struct ReservationStation {
    /// The opcode this station is executing.
    pub opcode: Opcode,
    /// First source operand.
    pub op_j: Operand,
    /// Second source operand.
    pub op_k: Operand,
    /// ROB entry this station will write its result into.
    pub rob_dest: RobTag,
    /// Program-order index of the issuing instruction.
    pub issue_pc: usize,
    /// Cycles remaining before this station's result is produced. `None`
    /// until both operands are ready (the countdown hasn't started).
    pub remaining: Option<u8>,
    /// Opcode-dependent immediate: a load/store offset for `Lw`/`Sw`, or an
    /// absolute target address for `J`/`Jal`/the conditional branches.
    /// Unused (`0`) for arithmetic opcodes.
    pub imm: i64,
}

struct Slot {
    rs: Option<ReservationStation>,
}

/// Fixed-size pool of reservation stations.
pub struct RsPool {
    slots: Vec<Slot>,
}

impl RsPool {
    /// Creates an empty pool with `capacity` stations.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot { rs: None });
        Self { slots }
    }

    /// Total capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently busy stations.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.rs.is_some()).count()
    }

    /// Index of a free station, if any.
    #[must_use]
    pub fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.rs.is_none())
    }

    /// Occupies station `idx` with `rs`. Overwrites whatever was there —
    /// callers must only pass indices returned by `find_free`.
    pub fn occupy(&mut self, idx: usize, rs: ReservationStation) {
        self.slots[idx].rs = Some(rs);
    }

    /// Frees station `idx`.
    pub fn free(&mut self, idx: usize) {
        self.slots[idx].rs = None;
    }

    /// Reference to the station at `idx`, if busy.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&ReservationStation> {
        self.slots[idx].rs.as_ref()
    }

    /// Mutable reference to the station at `idx`, if busy.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut ReservationStation> {
        self.slots[idx].rs.as_mut()
    }

    /// Indices of every busy station, in slot order.
    #[must_use]
    pub fn busy_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.rs.as_ref().map(|_| i))
            .collect()
    }

    /// Broadcasts a completed result from `tag` to every station awaiting
    /// it, clearing the matching operand(s) to `Operand::Value`.
    pub fn broadcast(&mut self, tag: RobTag, value: i64) {
        for slot in &mut self.slots {
            let Some(rs) = slot.rs.as_mut() else { continue };
            if rs.op_j == Operand::Tag(tag) {
                rs.op_j = Operand::Value(value);
            }
            if rs.op_k == Operand::Tag(tag) {
                rs.op_k = Operand::Value(value);
            }
        }
    }

    /// Frees every station whose `rob_dest` is in `tags` (used after a
    /// branch flush retires the ROB entries those stations were targeting).
    pub fn release_targeting(&mut self, tags: &[RobTag]) {
        for slot in &mut self.slots {
            if let Some(rs) = &slot.rs {
                if tags.contains(&rs.rob_dest) {
                    slot.rs = None;
                }
            }
        }
    }
}
