//! A minimal Hack CPU for executing what the toolchain produces.

#![allow(dead_code)]

use hack_toolchain::assembler;
use hack_toolchain::translator::{Options, Translator};

pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

const RAM_SIZE: usize = 1 << 15;
const JMP: u16 = 0b1110_1010_1000_0111;

pub struct Cpu {
    pub rom: Vec<u16>,
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
}

fn alu(x: i16, y: i16, control: u16) -> i16 {
    let bit = |n: u16| control & (1 << n) != 0;
    let mut x = if bit(5) { 0 } else { x };
    if bit(4) {
        x = !x;
    }
    let mut y = if bit(3) { 0 } else { y };
    if bit(2) {
        y = !y;
    }
    let out = if bit(1) { x.wrapping_add(y) } else { x & y };
    if bit(0) {
        !out
    } else {
        out
    }
}

impl Cpu {
    pub fn new(rom: Vec<u16>) -> Self {
        Cpu {
            rom,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    fn address(&self) -> usize {
        (self.a as u16 as usize) & (RAM_SIZE - 1)
    }

    /// Sitting on `@here` followed by `0;JMP`, i.e. a halt loop.
    pub fn halted(&self) -> bool {
        self.pc + 1 < self.rom.len()
            && self.rom[self.pc] as usize == self.pc
            && self.rom[self.pc + 1] == JMP
    }

    pub fn step(&mut self) {
        let word = self.rom[self.pc];
        if word & 0x8000 == 0 {
            self.a = word as i16;
            self.pc += 1;
            return;
        }

        let addr = self.address();
        let y = if word & (1 << 12) != 0 {
            self.ram[addr]
        } else {
            self.a
        };
        let out = alu(self.d, y, (word >> 6) & 0b11_1111);
        let target = self.a as u16 as usize;

        if word & 0b001_000 != 0 {
            self.ram[addr] = out;
        }
        if word & 0b010_000 != 0 {
            self.d = out;
        }
        if word & 0b100_000 != 0 {
            self.a = out;
        }

        let jump = (word & 0b100 != 0 && out < 0)
            || (word & 0b010 != 0 && out == 0)
            || (word & 0b001 != 0 && out > 0);
        self.pc = if jump { target } else { self.pc + 1 };
    }

    /// Run until a halt loop is reached.
    pub fn run(&mut self, limit: usize) {
        for _ in 0..limit {
            if self.halted() {
                return;
            }
            assert!(self.pc < self.rom.len(), "ran off the end of ROM");
            self.step();
        }
        panic!("program did not halt within {} steps", limit);
    }

    /// The value on top of the stack.
    pub fn top(&self) -> i16 {
        self.ram[self.ram[SP] as usize - 1]
    }
}

pub fn translate_units(units: &[(&str, &str)], bootstrap: bool) -> Vec<String> {
    let mut translator = Translator::new(Options {
        bootstrap,
        comments: true,
    });
    for (name, source) in units {
        translator
            .translate_unit(name, source)
            .expect("translation failed");
    }
    translator.finish()
}

pub fn load(asm: &[String]) -> Cpu {
    let rom = assembler::assemble(&asm.join("\n")).expect("assembly failed");
    Cpu::new(rom)
}

/// Translate, assemble and run a single unit with SP at 256.
pub fn run_vm(source: &str, setup: impl FnOnce(&mut Cpu)) -> Cpu {
    let mut cpu = load(&translate_units(&[("Main", source)], false));
    cpu.ram[SP] = 256;
    setup(&mut cpu);
    cpu.run(100_000);
    cpu
}

/// Translate, assemble and run a program that boots into `Sys.init`.
pub fn run_program(units: &[(&str, &str)]) -> Cpu {
    let mut cpu = load(&translate_units(units, true));
    cpu.run(2_000_000);
    cpu
}

#[test]
fn test_alu() {
    // D+A
    assert_eq!(alu(3, 4, 0b000010), 7);
    // D-1
    assert_eq!(alu(3, 4, 0b001110), 2);
    // -1
    assert_eq!(alu(3, 4, 0b111010), -1);
    // A-D
    assert_eq!(alu(3, 4, 0b000111), 1);
}
