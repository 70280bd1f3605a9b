//! The target description GDB sees: a MIPS R3000 with the PlayStation's
//! CP0 debug registers and a placeholder FPU.

mod mips;

pub use mips::{MipsRegId, TARGET_DESCRIPTION_XML};
