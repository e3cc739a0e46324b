use intern::{PackedInterner, TypedInterner};

use crate::{IdentId, NameId};

/// Stores all the interned strings associated with a Workflow.
#[derive(Debug)]
pub struct WorkflowStrings {
    /// Raw ids from the workflow document (nodes, ports, triggers, edges, entrypoint)
    pub idents: TypedInterner<IdentId, PackedInterner<u32, usize>>,
    /// Display names: node and trigger labels, port names
    pub names: TypedInterner<NameId, PackedInterner<u16, u32>>,
}

impl Default for WorkflowStrings {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl WorkflowStrings {
    /// Allocate room for roughly `num_items` nodes, ports and edges.
    pub fn with_capacity(num_items: usize) -> Self {
        // ids tend to be uuids, so 36 chars is a decent guess:
        Self {
            idents: TypedInterner::new(PackedInterner::with_capacity_and_str_len(
                num_items * 2,
                num_items * 2 * 36,
            )),
            names: TypedInterner::new(PackedInterner::with_capacity_and_str_len(
                num_items,
                num_items * 16,
            )),
        }
    }

    /// Print interner sizes at debug level.
    pub fn log_sizes(&self) {
        use intern::GetStr;
        log::debug!(
            "{} idents (str len {}), {} names (str len {})",
            self.idents.len(),
            self.idents.str_len(),
            self.names.len(),
            self.names.str_len(),
        );
    }
}
