use std::fmt;

/// Destination registers of a C-instruction. All false means `null`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    pub fn is_null(&self) -> bool {
        !(self.a || self.d || self.m)
    }

    /// `ddd` field: A, D, M from high to low bit.
    pub fn bits(&self) -> u16 {
        (self.a as u16) << 2 | (self.d as u16) << 1 | self.m as u16
    }

    pub fn from_bits(bits: u16) -> Self {
        Dest {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("null");
        }
        // Canonical Hack spelling: AMD, AM, AD, MD
        if self.a {
            f.write_str("A")?;
        }
        if self.m {
            f.write_str("M")?;
        }
        if self.d {
            f.write_str("D")?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Address {
    Literal(u32),
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Literal(value) => write!(f, "{}", value),
            Address::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
    /// `@value` or `@symbol`
    Address(Address),
    /// `dest=comp;jump`
    Compute {
        dest: Dest,
        comp: String,
        jump: Option<String>,
    },
    /// `(LABEL)`, binds the address of the next real instruction
    Label(String),
}

impl Instruction {
    /// Whether this instruction occupies a ROM word.
    pub fn is_real(&self) -> bool {
        !matches!(self, Instruction::Label(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Address(address) => write!(f, "@{}", address),
            Instruction::Label(label) => write!(f, "({})", label),
            Instruction::Compute { dest, comp, jump } => {
                if !dest.is_null() {
                    write!(f, "{}=", dest)?;
                }
                f.write_str(comp)?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
        }
    }
}

#[test]
fn test_dest_bits() {
    let md = Dest {
        a: false,
        d: true,
        m: true,
    };
    assert_eq!(md.bits(), 0b011);
    assert_eq!(md.to_string(), "MD");
    assert_eq!(Dest::from_bits(0b111).to_string(), "AMD");
    assert_eq!(Dest::default().to_string(), "null");
}

#[test]
fn test_display() {
    let jump = Instruction::Compute {
        dest: Dest::default(),
        comp: "0".to_string(),
        jump: Some("JMP".to_string()),
    };
    assert_eq!(jump.to_string(), "0;JMP");
    assert_eq!(
        Instruction::Address(Address::Symbol("LOOP".into())).to_string(),
        "@LOOP"
    );
    assert!(!Instruction::Label("LOOP".into()).is_real());
}
