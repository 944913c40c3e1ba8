use std::cell::Cell;

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

/// Next id for this thread. Ids are never reused.
pub fn use_id() -> u64 {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

/// DOM id for a component part, e.g. `veil-menu-button-3`.
pub fn element_id(part: &str) -> String {
    format!("veil-{part}-{}", use_id())
}
