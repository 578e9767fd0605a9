use crate::{
    errors::FatalError,
    mem::{Block, Heap},
    opcode::{LiteralIndex, Slot},
    value::Number,
};

/// Bytes per slot: one tag byte followed by an 8-byte payload.
pub const SLOT_SIZE: usize = 9;

/// Tag bit set on slots marked by `VarDecl`.
const DECLARED: u8 = 0x80;
const KIND_MASK: u8 = 0x7F;

const TAG_UNDEFINED: u8 = 0;
const TAG_FALSE: u8 = 1;
const TAG_TRUE: u8 = 2;
const TAG_NUMBER: u8 = 3;
const TAG_STRING: u8 = 4;

/// A slot's contents as stored in the heap. Strings are kept as literal
/// indices and resolved against the pool on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Stored {
    Undefined,
    Boolean(bool),
    Number(Number),
    String(LiteralIndex),
}

impl Stored {
    fn encode(self, declared: bool) -> [u8; SLOT_SIZE] {
        let mut raw = [0u8; SLOT_SIZE];
        raw[0] = match self {
            Stored::Undefined => TAG_UNDEFINED,
            Stored::Boolean(false) => TAG_FALSE,
            Stored::Boolean(true) => TAG_TRUE,
            Stored::Number(n) => {
                raw[1..].copy_from_slice(&n.to_le_bytes());
                TAG_NUMBER
            }
            Stored::String(index) => {
                raw[1..3].copy_from_slice(&index.to_le_bytes());
                TAG_STRING
            }
        };
        if declared {
            raw[0] |= DECLARED;
        }
        raw
    }

    fn decode(raw: &[u8]) -> Self {
        match raw[0] & KIND_MASK {
            TAG_FALSE => Stored::Boolean(false),
            TAG_TRUE => Stored::Boolean(true),
            TAG_NUMBER => {
                let mut payload = [0u8; 8];
                payload.copy_from_slice(&raw[1..SLOT_SIZE]);
                Stored::Number(Number::from_le_bytes(payload))
            }
            TAG_STRING => Stored::String(LiteralIndex::from_le_bytes([raw[1], raw[2]])),
            _ => Stored::Undefined,
        }
    }
}

/// The slots of one execution, laid out in a single heap block.
///
/// Accessors return `None` for slots outside the declared capacity, or once
/// the file has been released; the interpreter turns that into a fault
/// carrying the program counter.
#[derive(Debug)]
pub(crate) struct VariableFile {
    block: Option<Block>,
    capacity: usize,
}

impl VariableFile {
    pub fn allocate(heap: &mut Heap<'_>, capacity: usize) -> Result<Self, FatalError> {
        let block = heap.allocate(capacity * SLOT_SIZE)?;
        // Tag 0 is "undefined, not declared".
        heap.bytes_mut(&block).fill(0);
        Ok(VariableFile {
            block: Some(block),
            capacity,
        })
    }

    /// Give the block back to `heap`. Later calls do nothing.
    pub fn release(&mut self, heap: &mut Heap<'_>) {
        if let Some(block) = self.block.take() {
            heap.release(block);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn read(&self, heap: &Heap<'_>, slot: Slot) -> Option<Stored> {
        self.raw(heap, slot).map(Stored::decode)
    }

    /// Overwrite the value of `slot`, keeping its declared flag.
    pub fn write(&self, heap: &mut Heap<'_>, slot: Slot, value: Stored) -> Option<()> {
        let raw = self.raw_mut(heap, slot)?;
        let declared = raw[0] & DECLARED != 0;
        raw.copy_from_slice(&value.encode(declared));
        Some(())
    }

    /// Mark `slot` as a declared variable holding undefined.
    pub fn declare(&self, heap: &mut Heap<'_>, slot: Slot) -> Option<()> {
        let raw = self.raw_mut(heap, slot)?;
        raw.copy_from_slice(&Stored::Undefined.encode(true));
        Some(())
    }

    pub fn is_declared(&self, heap: &Heap<'_>, slot: Slot) -> Option<bool> {
        self.raw(heap, slot).map(|raw| raw[0] & DECLARED != 0)
    }

    fn range(&self, slot: Slot) -> Option<core::ops::Range<usize>> {
        let slot = slot as usize;
        (slot < self.capacity).then(|| slot * SLOT_SIZE..(slot + 1) * SLOT_SIZE)
    }

    fn raw<'h>(&self, heap: &'h Heap<'_>, slot: Slot) -> Option<&'h [u8]> {
        let range = self.range(slot)?;
        Some(&heap.bytes(self.block.as_ref()?)[range])
    }

    fn raw_mut<'h>(&self, heap: &'h mut Heap<'_>, slot: Slot) -> Option<&'h mut [u8]> {
        let range = self.range(slot)?;
        Some(&mut heap.bytes_mut(self.block.as_ref()?)[range])
    }
}
