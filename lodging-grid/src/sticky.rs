//! Frozen (sticky) column offsets.

/// Stacking order of frozen header cells.
pub const HEADER_Z_INDEX: u8 = 15;

/// Stacking order of frozen body cells.
pub const BODY_Z_INDEX: u8 = 5;

/// Where a frozen cell is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickyPosition {
    /// Distance from the leading edge.
    pub left: u32,
    pub z_index: u8,
}

/// Leading-edge offsets of the first `frozen_count` columns.
///
/// Each offset is the sum of the measured widths of the frozen headers
/// before it. Offsets go stale whenever the columns, the data, the frozen
/// count or the viewport width change; [`invalidate`](Self::invalidate)
/// marks them for re-measurement.
#[derive(Debug, Clone, Default)]
pub struct StickyLayout {
    frozen_count: usize,
    offsets: Vec<u32>,
    dirty: bool,
}

impl StickyLayout {
    /// Creates a layout that still needs measuring.
    pub fn new(frozen_count: usize) -> Self {
        Self {
            frozen_count,
            offsets: Vec::new(),
            dirty: frozen_count > 0,
        }
    }

    /// Returns `true` if any column is frozen.
    pub fn is_enabled(&self) -> bool {
        self.frozen_count > 0
    }

    pub fn frozen_count(&self) -> usize {
        self.frozen_count
    }

    /// Changes the frozen column count.
    pub fn set_frozen_count(&mut self, count: usize) {
        if count != self.frozen_count {
            self.frozen_count = count;
            self.invalidate();
        }
    }

    /// Marks the offsets stale.
    pub fn invalidate(&mut self) {
        self.dirty = self.is_enabled();
        if !self.is_enabled() {
            self.offsets.clear();
        }
    }

    /// Returns `true` if the offsets need re-measuring.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recomputes offsets from measured header widths, in column order.
    ///
    /// Stops at the first frozen column without a measurement.
    pub fn measure(&mut self, header_widths: &[u32]) -> &[u32] {
        self.offsets.clear();
        let mut left = 0u32;
        for width in header_widths.iter().take(self.frozen_count) {
            self.offsets.push(left);
            left = left.saturating_add(*width);
        }
        self.dirty = false;
        &self.offsets
    }

    /// Measured offsets.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Returns `true` if the column at `index` is frozen.
    pub fn is_frozen(&self, index: usize) -> bool {
        index < self.frozen_count
    }

    /// Position of the column at `index`, or `None` if it scrolls freely.
    ///
    /// Unmeasured frozen columns pin at 0.
    pub fn position(&self, index: usize, header: bool) -> Option<StickyPosition> {
        if !self.is_frozen(index) {
            return None;
        }
        Some(StickyPosition {
            left: self.offsets.get(index).copied().unwrap_or(0),
            z_index: if header { HEADER_Z_INDEX } else { BODY_Z_INDEX },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_sum_preceding_widths() {
        let mut layout = StickyLayout::new(2);
        assert!(layout.is_dirty());

        assert_eq!(layout.measure(&[120, 80, 200]), &[0, 120]);
        assert!(!layout.is_dirty());
        assert_eq!(layout.position(1, true), Some(StickyPosition { left: 120, z_index: 15 }));
        assert_eq!(layout.position(0, false).map(|p| p.z_index), Some(5));
        assert_eq!(layout.position(2, false), None);
    }

    #[test]
    fn test_invalidate_and_resize() {
        let mut layout = StickyLayout::new(1);
        layout.measure(&[100]);
        layout.invalidate();
        assert!(layout.is_dirty());

        layout.set_frozen_count(3);
        assert_eq!(layout.measure(&[10, 20]), &[0, 10]);
        // third frozen column was not measured
        assert_eq!(layout.position(2, false).map(|p| p.left), Some(0));
    }

    #[test]
    fn test_disabled() {
        let mut layout = StickyLayout::new(0);
        assert!(!layout.is_dirty());
        layout.invalidate();
        assert!(!layout.is_dirty());
        assert_eq!(layout.position(0, true), None);
    }
}
