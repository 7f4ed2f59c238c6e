/// Generation rows of component bits, each indexed by entity slot.
pub(crate) struct EntityMasks {
    rows: Vec<Vec<u32>>,
    row_capacity: usize,
}

impl EntityMasks {
    pub(crate) fn new(row_capacity: usize) -> EntityMasks {
        EntityMasks {
            rows: vec![Vec::with_capacity(row_capacity)],
            row_capacity,
        }
    }

    /// Opens a new generation row and returns its index.
    pub(crate) fn push_row(&mut self) -> usize {
        self.rows.push(Vec::with_capacity(self.row_capacity));
        self.rows.len() - 1
    }

    #[inline]
    pub(crate) fn get(&self, generation: usize, slot: usize) -> u32 {
        self.rows
            .get(generation)
            .and_then(|row| row.get(slot))
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub(crate) fn has(&self, generation: usize, slot: usize, bitflag: u32) -> bool {
        self.get(generation, slot) & bitflag == bitflag
    }

    pub(crate) fn set(&mut self, generation: usize, slot: usize, bitflag: u32) {
        let row = &mut self.rows[generation];
        if row.len() <= slot {
            row.resize(slot + 1, 0);
        }
        row[slot] |= bitflag;
    }

    pub(crate) fn clear(&mut self, generation: usize, slot: usize, bitflag: u32) {
        if let Some(mask) = self.rows[generation].get_mut(slot) {
            *mask &= !bitflag;
        }
    }

    pub(crate) fn zero(&mut self, slot: usize) {
        for row in &mut self.rows {
            if let Some(mask) = row.get_mut(slot) {
                *mask = 0;
            }
        }
    }
}
