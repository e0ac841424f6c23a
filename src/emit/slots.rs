//! Local slot allocation for inserted code.

/// Hands out fresh local slots beyond a method's declared locals.
///
/// An index-based arena: slot numbers increase monotonically and are never
/// reclaimed within one transformation. Existing slots are never renumbered,
/// so argument slot indices resolved against the original signature stay valid
/// in the rewritten body, including across newly inserted exception handlers.
#[derive(Debug)]
pub struct LocalSlotAllocator {
    next: u16,
}

impl LocalSlotAllocator {
    /// Create an allocator whose first handed-out slot is `first_free`
    /// (typically the method's declared slot count).
    #[must_use]
    pub fn new(first_free: u16) -> Self {
        LocalSlotAllocator { next: first_free }
    }

    /// Allocate a fresh slot.
    pub fn alloc(&mut self) -> u16 {
        let slot = self.next;
        self.next = self.next.saturating_add(1);
        slot
    }

    /// One past the highest slot handed out so far (the rewritten method's
    /// slot count).
    #[must_use]
    pub fn high_water(&self) -> u16 {
        self.next
    }
}
