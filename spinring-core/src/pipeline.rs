//! Frame pipeline between the renderer and the link
//!
//! A fixed ring of frame slots, each with a full flag. The producer fills
//! the slot under the write cursor and publishes it with
//! [`Pipeline::advance_write`]; the consumer drains the slot under the read
//! cursor and releases it with [`Pipeline::advance_read`]. A slot is only
//! writable while empty and only readable while full, so the slot being
//! written is never the slot being drained.

/// Pipeline contract violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// No empty slot to write into
    Overrun,
    /// No full slot to read from
    Underrun,
}

/// `SLOTS` frame buffers of `BYTES` bytes each
pub struct Pipeline<const SLOTS: usize, const BYTES: usize> {
    slots: [[u8; BYTES]; SLOTS],
    full: [bool; SLOTS],
    write: usize,
    read: usize,
}

impl<const SLOTS: usize, const BYTES: usize> Default for Pipeline<SLOTS, BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SLOTS: usize, const BYTES: usize> Pipeline<SLOTS, BYTES> {
    /// Empty pipeline with both cursors on slot 0
    ///
    /// At least one slot is required:
    ///
    /// ```compile_fail
    /// let _ = spinring_core::pipeline::Pipeline::<0, 16>::new();
    /// ```
    pub const fn new() -> Self {
        const { assert!(SLOTS > 0, "pipeline needs at least one slot") };
        Self {
            slots: [[0; BYTES]; SLOTS],
            full: [false; SLOTS],
            write: 0,
            read: 0,
        }
    }

    /// Mark every slot empty and rewind both cursors
    pub fn reset(&mut self) {
        self.full = [false; SLOTS];
        self.write = 0;
        self.read = 0;
    }

    pub fn write_ready(&self) -> bool {
        !self.full[self.write]
    }

    pub fn read_ready(&self) -> bool {
        self.full[self.read]
    }

    /// The slot under the write cursor
    pub fn write_slot(&mut self) -> Result<&mut [u8; BYTES], PipelineError> {
        if !self.write_ready() {
            return Err(PipelineError::Overrun);
        }
        Ok(&mut self.slots[self.write])
    }

    /// The slot under the read cursor
    pub fn read_slot(&self) -> Result<&[u8; BYTES], PipelineError> {
        if !self.read_ready() {
            return Err(PipelineError::Underrun);
        }
        Ok(&self.slots[self.read])
    }

    /// Publish the write slot and move to the next one
    pub fn advance_write(&mut self) -> Result<(), PipelineError> {
        if !self.write_ready() {
            return Err(PipelineError::Overrun);
        }
        self.full[self.write] = true;
        self.write = (self.write + 1) % SLOTS;
        Ok(())
    }

    /// Release the read slot and move to the next one
    pub fn advance_read(&mut self) -> Result<(), PipelineError> {
        if !self.read_ready() {
            return Err(PipelineError::Underrun);
        }
        self.full[self.read] = false;
        self.read = (self.read + 1) % SLOTS;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let mut p: Pipeline<2, 4> = Pipeline::new();
        assert!(p.write_ready());
        assert!(!p.read_ready());

        p.advance_write().unwrap();
        p.reset();
        assert!(!p.read_ready());
        assert!(p.write_ready());
    }

    #[test]
    fn test_two_slot_alternation() {
        let mut p: Pipeline<2, 4> = Pipeline::new();

        p.write_slot().unwrap().copy_from_slice(&[1, 1, 1, 1]);
        p.advance_write().unwrap();
        assert!(p.write_ready());
        assert!(p.read_ready());

        p.write_slot().unwrap().copy_from_slice(&[2, 2, 2, 2]);
        p.advance_write().unwrap();
        // Both slots full: the producer must wait for the consumer
        assert!(!p.write_ready());
        assert_eq!(p.write_slot().err(), Some(PipelineError::Overrun));
        assert_eq!(p.advance_write(), Err(PipelineError::Overrun));

        assert_eq!(p.read_slot().unwrap(), &[1, 1, 1, 1]);
        p.advance_read().unwrap();
        assert!(p.write_ready());
        assert_eq!(p.read_slot().unwrap(), &[2, 2, 2, 2]);
        p.advance_read().unwrap();

        assert!(!p.read_ready());
        assert_eq!(p.advance_read(), Err(PipelineError::Underrun));
    }

    #[test]
    fn test_single_slot_blocks_until_read() {
        let mut p: Pipeline<1, 4> = Pipeline::new();
        p.advance_write().unwrap();
        assert!(!p.write_ready());
        p.advance_read().unwrap();
        assert!(p.write_ready());
    }

    #[test]
    fn test_write_never_aliases_read() {
        let mut p: Pipeline<3, 1> = Pipeline::new();
        for round in 0..10u8 {
            p.write_slot().unwrap()[0] = round;
            p.advance_write().unwrap();
            if round % 2 == 1 {
                assert_eq!(p.read_slot().unwrap()[0], round - 1);
                p.advance_read().unwrap();
                assert_eq!(p.read_slot().unwrap()[0], round);
                p.advance_read().unwrap();
            }
        }
    }
}
