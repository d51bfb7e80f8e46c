/// Instruction classes with a decoder, selected by the 5-bit class field (bits 15..11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeClass {
    /// Register-register arithmetic/logic (`0b0000x`).
    Alu,
    /// Immediate byte load (`0b01xxx`).
    Immediate,
}

impl OpcodeClass {
    /// Converts a 5-bit class field into a decodable class.
    ///
    /// `None` covers every class without a decoder (shifts, memory, branches, I/O).
    #[must_use]
    pub const fn from_u5(class: u8) -> Option<Self> {
        match class {
            0x00 | 0x01 => Some(Self::Alu),
            0x08..=0x0F => Some(Self::Immediate),
            _ => None,
        }
    }
}

/// Arithmetic/logic operations of the A-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    And,
    Or,
    Xor,
    Add,
    Sub,
    Cmp,
}

impl AluOp {
    /// Returns true for the arithmetic group (`code` bit set).
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Cmp)
    }

    /// Returns `(code, typ)` for this operation; [`ALU_ENCODING_TABLE`] is built from it.
    #[must_use]
    pub const fn fields(self) -> (u8, u8) {
        match self {
            Self::And => (0, 0),
            Self::Or => (0, 1),
            Self::Xor => (0, 2),
            Self::Add => (1, 0),
            Self::Sub => (1, 1),
            Self::Cmp => (1, 2),
        }
    }
}

/// Immediate-load operations of the I-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImmOp {
    /// Replace the low byte, keep the high byte.
    Movl,
    /// Replace the high byte, keep the low byte.
    Movh,
}

impl ImmOp {
    /// Returns the 3-bit `opc` selector for this operation.
    #[must_use]
    pub const fn opc(self) -> u8 {
        match self {
            Self::Movl => 0,
            Self::Movh => 1,
        }
    }
}

const fn alu_entry(op: AluOp) -> (u8, u8, AluOp) {
    let (code, typ) = op.fields();
    (code, typ, op)
}

const fn imm_entry(op: ImmOp) -> (u8, ImmOp) {
    (op.opc(), op)
}

/// Assigned A-class `(code, typ)` encodings. Any pair absent here is invalid.
pub const ALU_ENCODING_TABLE: &[(u8, u8, AluOp)] = &[
    alu_entry(AluOp::And),
    alu_entry(AluOp::Or),
    alu_entry(AluOp::Xor),
    alu_entry(AluOp::Add),
    alu_entry(AluOp::Sub),
    alu_entry(AluOp::Cmp),
];

/// Assigned I-class `opc` encodings. Any selector absent here is invalid.
pub const IMM_ENCODING_TABLE: &[(u8, ImmOp)] = &[imm_entry(ImmOp::Movl), imm_entry(ImmOp::Movh)];

/// Looks up an A-class operation.
#[must_use]
pub fn classify_alu(code: u8, typ: u8) -> Option<AluOp> {
    ALU_ENCODING_TABLE
        .iter()
        .find_map(|(entry_code, entry_typ, op)| {
            ((*entry_code == code) && (*entry_typ == typ)).then_some(*op)
        })
}

/// Looks up an I-class operation.
#[must_use]
pub fn classify_imm(opc: u8) -> Option<ImmOp> {
    IMM_ENCODING_TABLE
        .iter()
        .find_map(|(entry_opc, op)| (*entry_opc == opc).then_some(*op))
}

/// Extracts the 5-bit class field.
#[must_use]
pub const fn class_field(word: u16) -> u8 {
    ((word >> 11) & 0x1F) as u8
}

/// Builds an A-class word. Register fields are masked to 3 bits.
#[must_use]
pub const fn encode_alu(op: AluOp, dst: u8, opa: u8, opb: u8) -> u16 {
    let (code, typ) = op.fields();
    ((code as u16) << 11)
        | (((dst & 0x7) as u16) << 8)
        | (((opa & 0x7) as u16) << 5)
        | (((opb & 0x7) as u16) << 2)
        | (typ as u16)
}

/// Builds an I-class word. The register field is masked to 3 bits.
#[must_use]
pub const fn encode_imm(op: ImmOp, srcdst: u8, imm: u8) -> u16 {
    0x4000 | ((op.opc() as u16) << 11) | (((srcdst & 0x7) as u16) << 8) | (imm as u16)
}
