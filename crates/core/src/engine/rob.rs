//! Reorder Buffer (ROB) for in-order commit of out-of-order results.
//!
//! The ROB is a circular buffer tracking in-flight instructions from issue
//! through commit. It provides allocation (renaming), completion (write
//! result), in-order retirement from the head, and a backward scan used by
//! issue to find the most recent in-flight producer of a register.

use crate::isa::{Instruction, Opcode};

/// Index of a live entry in the ROB. Reused immediately after the entry it
/// names retires, so a stale `RobTag` captured before a commit must never
/// be compared against a later allocation without also checking the
/// generation the issue stage observed at rename time — in this design
/// that comparison is never needed, because reservation stations clear
/// their tag the moment the producing entry broadcasts, not later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RobTag(pub usize);

/// An entry in the Reorder Buffer.
#[derive(Clone, Debug)]
pub struct RobEntry {
    /// The instruction this entry was allocated for.
    pub opcode: Opcode,
    /// Architectural destination register, if any.
    pub dest: Option<usize>,
    /// Computed result (ALU output, load value, or link address).
    pub result: i64,
    /// True once execute has written `result`.
    pub ready: bool,
    /// Program-order index of the instruction, used to decide which
    /// younger entries a taken branch must flush.
    pub issue_pc: usize,
    /// Resolved branch target, valid once `ready`.
    pub branch_target: Option<usize>,
    /// Whether a branch at this entry was resolved taken.
    pub branch_taken: bool,
    /// Effective address for `Sw`, valid once `ready`.
    pub store_addr: Option<i64>,
    /// Value to store for `Sw`, valid once `ready`.
    pub store_data: Option<i64>,
}

impl RobEntry {
    fn new(opcode: Opcode, dest: Option<usize>, issue_pc: usize) -> Self {
        Self {
            opcode,
            dest,
            result: 0,
            ready: false,
            issue_pc,
            branch_target: None,
            branch_taken: false,
            store_addr: None,
            store_data: None,
        }
    }
}

struct Slot {
    entry: RobEntry,
    valid: bool,
}

/// Circular-buffer Reorder Buffer.
pub struct Rob {
    slots: Vec<Slot>,
    head: usize,
    tail: usize,
    count: usize,
}

impl Rob {
    /// Creates an empty ROB with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            entry: RobEntry::new(Opcode::Halt, None, 0),
            valid: false,
        });
        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Total capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if no entries are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True if the ROB has no free slot left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Allocates a new entry at the tail for `instr`, returning its tag.
    /// Returns `None` if the ROB is full.
    pub fn allocate(&mut self, instr: &Instruction, program_index: usize) -> Option<RobTag> {
        if self.is_full() {
            return None;
        }
        let idx = self.tail;
        self.slots[idx] = Slot {
            entry: RobEntry::new(instr.opcode, instr.rd, program_index),
            valid: true,
        };
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
        Some(RobTag(idx))
    }

    /// Writes the arithmetic/load result for `tag` and marks it ready.
    pub fn complete_value(&mut self, tag: RobTag, result: i64) {
        let slot = &mut self.slots[tag.0];
        slot.entry.result = result;
        slot.entry.ready = true;
    }

    /// Writes the resolved branch outcome for `tag` and marks it ready.
    pub fn complete_branch(&mut self, tag: RobTag, target: usize, taken: bool) {
        let slot = &mut self.slots[tag.0];
        slot.entry.branch_target = Some(target);
        slot.entry.branch_taken = taken;
        slot.entry.ready = true;
    }

    /// Writes the resolved store address/data for `tag` and marks it ready.
    pub fn complete_store(&mut self, tag: RobTag, addr: i64, data: i64) {
        let slot = &mut self.slots[tag.0];
        slot.entry.store_addr = Some(addr);
        slot.entry.store_data = Some(data);
        slot.entry.ready = true;
    }

    /// Reference to the entry at `tag`.
    #[must_use]
    pub fn entry(&self, tag: RobTag) -> &RobEntry {
        &self.slots[tag.0].entry
    }

    /// Reference to the head entry (oldest), if any entry is live.
    #[must_use]
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&self.slots[self.head].entry)
        }
    }

    /// Retires the head entry if it is ready. Returns `None` if the ROB is
    /// empty or the head instruction hasn't finished executing yet.
    pub fn commit_head(&mut self) -> Option<RobEntry> {
        if self.count == 0 || !self.slots[self.head].entry.ready {
            return None;
        }
        let slot = &mut self.slots[self.head];
        slot.valid = false;
        let entry = slot.entry.clone();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        Some(entry)
    }

    /// Drops every live entry whose `issue_pc` is strictly greater than
    /// `issue_pc` (i.e. every instruction younger than the branch that
    /// resolved at that program position). The branch's own entry, and
    /// everything older, is kept.
    pub fn flush_after(&mut self, issue_pc: usize) {
        if self.count == 0 {
            return;
        }
        let mut idx = self.head;
        let mut new_count = 0;
        let mut new_tail = self.head;
        for _ in 0..self.count {
            if self.slots[idx].entry.issue_pc <= issue_pc {
                new_count += 1;
                new_tail = (idx + 1) % self.slots.len();
            } else {
                self.slots[idx].valid = false;
            }
            idx = (idx + 1) % self.slots.len();
        }
        self.count = new_count;
        self.tail = new_tail;
    }

    /// Drops every live entry. Used when the CLI aborts a run early.
    pub fn flush_all(&mut self) {
        for slot in &mut self.slots {
            slot.valid = false;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// The tags that `flush_after` would drop, for releasing their
    /// reservation stations.
    #[must_use]
    pub fn tags_after(&self, issue_pc: usize) -> Vec<RobTag> {
        let mut idx = self.head;
        let mut out = Vec::new();
        for _ in 0..self.count {
            if self.slots[idx].entry.issue_pc > issue_pc {
                out.push(RobTag(idx));
            }
            idx = (idx + 1) % self.slots.len();
        }
        out
    }

    /// Finds the most recent in-flight producer of `reg`, scanning from the
    /// newest allocated entry backward to the oldest. Returns the tag and,
    /// if already computed, the value.
    ///
    /// Scanning newest-to-oldest (rather than oldest-to-newest) is required
    /// for correctness: if two live entries both write `reg`, only the
    /// younger one's value is live in the architectural register once both
    /// commit, so a consumer issued between them must rename against the
    /// younger producer.
    #[must_use]
    pub fn find_latest_producer(&self, reg: usize) -> Option<(RobTag, Option<i64>)> {
        if self.count == 0 {
            return None;
        }
        let mut idx = if self.tail == 0 {
            self.slots.len() - 1
        } else {
            self.tail - 1
        };
        for _ in 0..self.count {
            let slot = &self.slots[idx];
            if slot.valid && slot.entry.dest == Some(reg) {
                let value = if slot.entry.ready {
                    Some(slot.entry.result)
                } else {
                    None
                };
                return Some((RobTag(idx), value));
            }
            idx = if idx == 0 { self.slots.len() - 1 } else { idx - 1 };
        }
        None
    }

    /// True if any live entry carries the given opcode. Used after a flush
    /// to tell whether a speculatively-issued `HALT` survived it.
    #[must_use]
    pub fn has_opcode(&self, opcode: Opcode) -> bool {
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.slots[idx].valid && self.slots[idx].entry.opcode == opcode {
                return true;
            }
            idx = (idx + 1) % self.slots.len();
        }
        false
    }

    /// Iterates every live entry from head to tail.
    pub fn for_each_valid(&self, mut f: impl FnMut(RobTag, &RobEntry)) {
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.slots[idx].valid {
                f(RobTag(idx), &self.slots[idx].entry);
            }
            idx = (idx + 1) % self.slots.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(rd: usize, _issue_pc: usize) -> Instruction {
        Instruction {
            opcode: Opcode::Add,
            rd: Some(rd),
            rs1: Some(1),
            rs2: Some(2),
            imm: 0,
            label: None,
        }
    }

    #[test]
    fn allocate_and_commit() {
        let mut rob = Rob::new(4);
        assert!(rob.is_empty());
        let tag = rob.allocate(&add(3, 0), 0).unwrap();
        assert_eq!(rob.len(), 1);
        assert!(rob.commit_head().is_none());
        rob.complete_value(tag, 42);
        let entry = rob.commit_head().unwrap();
        assert_eq!(entry.result, 42);
        assert!(rob.is_empty());
    }

    #[test]
    fn full_rob_rejects_allocation() {
        let mut rob = Rob::new(2);
        let _ = rob.allocate(&add(1, 0), 0).unwrap();
        let _ = rob.allocate(&add(2, 1), 1).unwrap();
        assert!(rob.is_full());
        assert!(rob.allocate(&add(3, 2), 2).is_none());
    }

    #[test]
    fn commit_is_in_order() {
        let mut rob = Rob::new(4);
        let t1 = rob.allocate(&add(1, 0), 0).unwrap();
        let t2 = rob.allocate(&add(2, 1), 1).unwrap();
        rob.complete_value(t2, 200);
        assert!(rob.commit_head().is_none(), "head still not ready");
        rob.complete_value(t1, 100);
        assert_eq!(rob.commit_head().unwrap().result, 100);
        assert_eq!(rob.commit_head().unwrap().result, 200);
    }

    #[test]
    fn flush_after_keeps_branch_and_older() {
        let mut rob = Rob::new(8);
        let _ = rob.allocate(&add(1, 0), 0).unwrap();
        let _ = rob.allocate(&add(2, 1), 1).unwrap();
        let _ = rob.allocate(&add(3, 2), 2).unwrap();
        assert_eq!(rob.len(), 3);
        rob.flush_after(0);
        assert_eq!(rob.len(), 1);
    }

    #[test]
    fn find_latest_producer_returns_youngest() {
        let mut rob = Rob::new(8);
        let t1 = rob.allocate(&add(5, 0), 0).unwrap();
        let t2 = rob.allocate(&add(5, 1), 1).unwrap();
        rob.complete_value(t1, 100);
        rob.complete_value(t2, 200);
        let (tag, value) = rob.find_latest_producer(5).unwrap();
        assert_eq!(tag, t2);
        assert_eq!(value, Some(200));
    }

    #[test]
    fn find_latest_producer_not_ready_yields_none_value() {
        let mut rob = Rob::new(8);
        let tag = rob.allocate(&add(5, 0), 0).unwrap();
        let (found, value) = rob.find_latest_producer(5).unwrap();
        assert_eq!(found, tag);
        assert_eq!(value, None);
    }

    #[test]
    fn circular_wraparound() {
        let mut rob = Rob::new(2);
        for i in 0..10 {
            let tag = rob.allocate(&add(1, i), i).unwrap();
            rob.complete_value(tag, i as i64);
            assert_eq!(rob.commit_head().unwrap().result, i as i64);
        }
    }

    proptest::proptest! {
        /// Any interleaving of allocate/commit against a fixed-capacity ROB
        /// must keep occupancy within that capacity — allocate already
        /// refuses past `is_full`, but this checks no sequence of calls can
        /// sneak `count` past `slots.len()` through `flush_after`/`flush_all`
        /// bookkeeping either.
        #[test]
        fn occupancy_never_exceeds_capacity(steps in proptest::collection::vec(0u8..4, 1..200)) {
            let mut rob = Rob::new(4);
            let mut pc = 0usize;
            for step in steps {
                match step {
                    0 => {
                        if let Some(tag) = rob.allocate(&add(1, pc), pc) {
                            rob.complete_value(tag, pc as i64);
                            pc += 1;
                        }
                    }
                    1 => {
                        let _ = rob.commit_head();
                    }
                    2 => rob.flush_after(pc.saturating_sub(1)),
                    _ => rob.flush_all(),
                }
                proptest::prop_assert!(rob.len() <= rob.capacity());
            }
        }
    }
}
