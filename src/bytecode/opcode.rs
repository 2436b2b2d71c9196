/// One byte of operation, optionally followed by big-endian operands whose
/// widths are fixed per opcode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Constant = 0,
    Pop = 1,
    Add = 2,
    Sub = 3,
    Mul = 4,
    Div = 5,
    True = 6,
    False = 7,
    Equal = 8,
    NotEqual = 9,
    GreaterThan = 10,
    Minus = 11,
    Bang = 12,
    JumpNotTruthy = 13,
    Jump = 14,
    Null = 15,
    GetGlobal = 16,
    SetGlobal = 17,
    Array = 18,
    Hash = 19,
    Index = 20,
    Call = 21,
    ReturnValue = 22,
    Return = 23,
    GetLocal = 24,
    SetLocal = 25,
    GetBuiltin = 26,
    Closure = 27,
    GetFree = 28,
    CurrentClosure = 29,
}

/// Mnemonic and operand widths of one opcode.
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        let op = match byte {
            0 => Opcode::Constant,
            1 => Opcode::Pop,
            2 => Opcode::Add,
            3 => Opcode::Sub,
            4 => Opcode::Mul,
            5 => Opcode::Div,
            6 => Opcode::True,
            7 => Opcode::False,
            8 => Opcode::Equal,
            9 => Opcode::NotEqual,
            10 => Opcode::GreaterThan,
            11 => Opcode::Minus,
            12 => Opcode::Bang,
            13 => Opcode::JumpNotTruthy,
            14 => Opcode::Jump,
            15 => Opcode::Null,
            16 => Opcode::GetGlobal,
            17 => Opcode::SetGlobal,
            18 => Opcode::Array,
            19 => Opcode::Hash,
            20 => Opcode::Index,
            21 => Opcode::Call,
            22 => Opcode::ReturnValue,
            23 => Opcode::Return,
            24 => Opcode::GetLocal,
            25 => Opcode::SetLocal,
            26 => Opcode::GetBuiltin,
            27 => Opcode::Closure,
            28 => Opcode::GetFree,
            29 => Opcode::CurrentClosure,
            _ => return None,
        };

        Some(op)
    }

    pub fn definition(self) -> Definition {
        let (name, operand_widths): (&'static str, &'static [usize]) = match self {
            Opcode::Constant => ("OpConstant", &[2]),
            Opcode::Pop => ("OpPop", &[]),
            Opcode::Add => ("OpAdd", &[]),
            Opcode::Sub => ("OpSub", &[]),
            Opcode::Mul => ("OpMul", &[]),
            Opcode::Div => ("OpDiv", &[]),
            Opcode::True => ("OpTrue", &[]),
            Opcode::False => ("OpFalse", &[]),
            Opcode::Equal => ("OpEqual", &[]),
            Opcode::NotEqual => ("OpNotEqual", &[]),
            Opcode::GreaterThan => ("OpGreaterThan", &[]),
            Opcode::Minus => ("OpMinus", &[]),
            Opcode::Bang => ("OpBang", &[]),
            Opcode::JumpNotTruthy => ("OpJumpNotTruthy", &[2]),
            Opcode::Jump => ("OpJump", &[2]),
            Opcode::Null => ("OpNull", &[]),
            Opcode::GetGlobal => ("OpGetGlobal", &[2]),
            Opcode::SetGlobal => ("OpSetGlobal", &[2]),
            Opcode::Array => ("OpArray", &[2]),
            Opcode::Hash => ("OpHash", &[2]),
            Opcode::Index => ("OpIndex", &[]),
            Opcode::Call => ("OpCall", &[1]),
            Opcode::ReturnValue => ("OpReturnValue", &[]),
            Opcode::Return => ("OpReturn", &[]),
            Opcode::GetLocal => ("OpGetLocal", &[1]),
            Opcode::SetLocal => ("OpSetLocal", &[1]),
            Opcode::GetBuiltin => ("OpGetBuiltin", &[1]),
            Opcode::Closure => ("OpClosure", &[2, 1]),
            Opcode::GetFree => ("OpGetFree", &[1]),
            Opcode::CurrentClosure => ("OpCurrentClosure", &[]),
        };

        Definition {
            name,
            operand_widths,
        }
    }
}
