use std::fmt::Write;

use ir::InstId;

use super::{fold::Boundary, StackCode};

/// Optional observer hooks for tracing stackify decisions.
///
/// Hooks fire in processing order: roots from the last instruction to the first, operands
/// right to left.
pub(super) trait StackifyObserver {
    fn on_root(&mut self, _root: InstId) {}

    fn on_fold(&mut self, _consumer: InstId, _inst: InstId) {}

    fn on_reference(&mut self, _consumer: InstId, _arg: InstId, _boundary: Boundary) {}

    fn on_slot(&mut self, _inst: InstId, _slot: u32) {}

    fn on_store(&mut self, _inst: InstId, _slot: u32, _fused: bool) {}

    fn on_drop(&mut self, _inst: InstId) {}
}

pub(super) struct NullObserver;

impl StackifyObserver for NullObserver {}

/// A snapshot-oriented trace collector.
///
/// The `render` output is stable and human-oriented: the slot assignment, one line per
/// decision in processing order, then the final operation sequence.
#[derive(Default)]
pub(super) struct StackifyTrace {
    out: String,
}

impl StackifyTrace {
    pub(super) fn render(self, code: &StackCode) -> String {
        if self.out.is_empty() {
            return "<empty block>\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(&mut out, "STACKIFY");

        let mut slots: Vec<(u32, InstId)> = code
            .slot_of
            .iter()
            .filter_map(|(inst, slot)| slot.map(|slot| (slot, inst)))
            .collect();
        slots.sort_unstable();
        if !slots.is_empty() {
            let _ = write!(&mut out, "slots: ");
            for (i, (slot, inst)) in slots.into_iter().enumerate() {
                if i != 0 {
                    let _ = write!(&mut out, ", ");
                }
                let _ = write!(&mut out, "{slot}={inst}");
            }
            let _ = writeln!(&mut out);
        }

        let _ = writeln!(&mut out, "trace:");
        out.push_str(&self.out);
        let _ = writeln!(&mut out, "code:");
        let _ = write!(&mut out, "{code}");
        out
    }
}

impl StackifyObserver for StackifyTrace {
    fn on_root(&mut self, root: InstId) {
        let _ = writeln!(&mut self.out, "root {root}");
    }

    fn on_fold(&mut self, consumer: InstId, inst: InstId) {
        let _ = writeln!(&mut self.out, "  fold {inst} into {consumer}");
    }

    fn on_reference(&mut self, consumer: InstId, arg: InstId, boundary: Boundary) {
        let _ = writeln!(&mut self.out, "  keep {arg} in {consumer}: {boundary}");
    }

    fn on_slot(&mut self, inst: InstId, slot: u32) {
        let _ = writeln!(&mut self.out, "  slot {slot} for {inst}");
    }

    fn on_store(&mut self, inst: InstId, slot: u32, fused: bool) {
        let op = if fused { "local.tee" } else { "local.set" };
        let _ = writeln!(&mut self.out, "  store {inst} with {op} {slot}");
    }

    fn on_drop(&mut self, inst: InstId) {
        let _ = writeln!(&mut self.out, "  drop {inst}");
    }
}
