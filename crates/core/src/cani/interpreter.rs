//! Pixel block interpreter.

use crate::{
    display::{transaction, PixelSink, Rgb565, Window},
    Error, Result,
};

const LITERAL_MASK: u8 = 0x80;
const REPEAT_MASK: u8 = 0xC0;
const REPEAT_TAG: u8 = 0x80;
const WINDOW_TAG: u8 = 0xC0;

/// A single decoded pixel instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction<'a> {
    /// Big-endian colour words sent verbatim.
    Literal(&'a [u8]),
    /// A colour repeated the given number of times.
    Repeat { count: u8, color: Rgb565 },
    /// Changes the drawing window.
    Window(Window),
}

impl<'a> Instruction<'a> {
    /// Sends the instruction to the sink.
    pub fn render<S: PixelSink + ?Sized>(self, sink: &mut S) -> Result<()> {
        match self {
            Instruction::Literal(words) => {
                for word in words.chunks_exact(2) {
                    let color = Rgb565::from_be_bytes([word[0], word[1]]);
                    sink.write_color(color).map_err(Error::display)?;
                }
            }
            Instruction::Repeat { count, color } => {
                for _ in 0..count {
                    sink.write_color(color).map_err(Error::display)?;
                }
            }
            Instruction::Window(window) => {
                sink.set_window(window).map_err(Error::display)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the instructions of a pixel block.
///
/// Never looks past the end of the block: an instruction whose operands do not
/// fit yields [`Error::InstructionOverrun`] and stops the iteration.
#[derive(Clone, Debug)]
pub struct Instructions<'a> {
    block: &'a [u8],
    pos: usize,
}

impl<'a> Instructions<'a> {
    pub const fn new(block: &'a [u8]) -> Self {
        Self { block, pos: 0 }
    }

    /// Returns the number of bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        let operands = self
            .block
            .get(self.pos..end)
            .ok_or(Error::InstructionOverrun)?;
        self.pos = end;
        Ok(operands)
    }

    fn decode(&mut self, tag: u8) -> Result<Instruction<'a>> {
        if tag & LITERAL_MASK == 0 {
            let count = usize::from(tag);
            return Ok(Instruction::Literal(self.take(count * 2)?));
        }

        if tag & REPEAT_MASK == REPEAT_TAG {
            let word = self.take(2)?;
            return Ok(Instruction::Repeat {
                count: tag & !REPEAT_MASK,
                color: Rgb565::from_be_bytes([word[0], word[1]]),
            });
        }

        if tag == WINDOW_TAG {
            let bytes = self.take(4)?;
            return Ok(Instruction::Window(Window::new(
                bytes[0], bytes[1], bytes[2], bytes[3],
            )));
        }

        Err(Error::UnknownInstruction(tag))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = *self.block.get(self.pos)?;
        self.pos += 1;

        let instruction = self.decode(tag);
        if instruction.is_err() {
            // Stop at the first corrupted instruction.
            self.pos = self.block.len();
        }
        Some(instruction)
    }
}

/// Validates the whole block and then renders it inside a single bus transaction.
///
/// A corrupted block is rejected before anything is sent to the display.
pub fn run_block<S: PixelSink + ?Sized>(block: &[u8], sink: &mut S) -> Result<()> {
    for instruction in Instructions::new(block) {
        instruction?;
    }

    transaction(sink, |sink| {
        for instruction in Instructions::new(block) {
            instruction?.render(sink)?;
        }
        Ok(())
    })
}
