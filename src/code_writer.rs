use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use crate::ast::{Addressing, ArithmeticOp, Command, Segment};
use crate::symbol_table;
use crate::{Error, Result};

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

/// Symbol of the trailing infinite loop.
pub const HALT_LABEL: &str = "END";

/// Return label used by the bootstrap call into `Sys.init`.
const BOOTSTRAP_RETURN: &str = "Bootstrap$ret";

/// Pointers saved in a call frame, in push order.
const FRAME: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

fn at_c(arg: impl std::fmt::Display) -> String {
    format!("@{}", arg)
}

fn at_s(arg: &str) -> String {
    format!("@{}", arg)
}

/// Push D onto the stack.
fn push_d() -> Vec<String> {
    svec![
        "@SP",
        "M=M+1",
        "A=M-1", // Don't need to refetch SP; this is safe
        "M=D"
    ]
}

/// Push code for segments addressed through a base pointer.
fn seg_push(base: &str, index: u16) -> Vec<String> {
    let mut code = svec![
        at_s(base),
        "D=M",
        at_c(index),
        "A=D+A", // A = base + index
        "D=M"    // D = value to push
    ];
    code.extend(push_d());
    code
}

fn seg_push_direct(label: &str) -> Vec<String> {
    let mut code = svec![at_s(label), "D=M"];
    code.extend(push_d());
    code
}

fn seg_pop(base: &str, index: u16) -> Vec<String> {
    svec![
        at_s(base),
        "D=M",
        at_c(index),
        "D=D+A", // D = base + index
        "@R13",
        "M=D", // Store target addr in R13
        "@SP",
        "AM=M-1", // SP--, A <- new SP (val to be popped)
        "D=M",
        "@R13",
        "A=M", // At the target address...
        "M=D"  // ... store the popped val
    ]
}

fn seg_pop_direct(label: &str) -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M", at_s(label), "M=D"]
}

fn simple_un_op(comp: &str) -> Vec<String> {
    svec!["@SP", "A=M-1", format!("M={}", comp)]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(comp: &str) -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1",             // SP--, looking at top of stack now
        "D=M",                // Right arg in D
        "A=A-1",              // Looking at second arg of stack, will overwrite
        format!("M={}", comp) // Op and overwrite second element
    ]
}

fn fixed_sym(base: u16, index: u16) -> String {
    format!("R{}", base as u32 + index as u32)
}

/// Function names are emitted as bare labels, so they must stay clear of
/// predefined symbols, the halt loop and comparison labels.
fn check_function_name(name: &str) -> Result<()> {
    let generated = ["true_", "end_"].iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    });
    if name == HALT_LABEL || generated || symbol_table::is_predefined(name) {
        return Err(Error::DuplicateSymbol(name.to_string()));
    }
    Ok(())
}

fn pointer_register(index: u16) -> &'static str {
    if index == 0 {
        "THIS"
    } else {
        "THAT"
    }
}

/// Generates assembly for VM commands.
///
/// Owns the jump-label counter, so every comparison and call site gets a
/// label that is unique for the whole run, across all files.
#[derive(Debug, Default)]
pub struct CodeWriter {
    file_name: String,
    function: Option<String>,
    gen_sym: usize,
    declared: HashSet<String>,
    referenced: BTreeSet<String>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start translating a new source file. Statics and top-level labels are
    /// namespaced by `file_name`.
    pub fn set_file_name(&mut self, file_name: &str) {
        self.file_name = file_name.to_string();
        self.function = None;
        self.declared.clear();
        self.referenced.clear();
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn next_gen_sym(&mut self) -> usize {
        let tmp = self.gen_sym;
        self.gen_sym += 1;
        tmp
    }

    fn scope(&self) -> &str {
        self.function.as_deref().unwrap_or(&self.file_name)
    }

    /// Convert VM label to asm symbol, scoped to the enclosing function
    pub fn label_to_sym(&self, label: &str) -> String {
        format!("{}${}", self.scope(), label)
    }

    fn static_sym(&self, index: u16) -> String {
        format!("{}.{}", self.file_name, index)
    }

    pub fn write(&mut self, command: &Command) -> Result<Vec<String>> {
        trace!(%command, "translating");
        let code = match command {
            Command::Arithmetic(op) => self.arithmetic(*op),
            Command::Push(seg, index) => self.push(*seg, *index),
            Command::Pop(seg, index) => self.pop(*seg, *index)?,
            Command::Label(label) => self.label(label),
            Command::Goto(label) => self.goto(label),
            Command::IfGoto(label) => self.if_goto(label),
            Command::Function(name, locals) => self.function(name, *locals)?,
            Command::Call(name, args) => self.call(name, *args)?,
            Command::Return => self.ret(),
        };
        Ok(code)
    }

    fn arithmetic(&mut self, op: ArithmeticOp) -> Vec<String> {
        match op {
            ArithmeticOp::Add => simple_bin_op("D+M"),
            ArithmeticOp::Sub => simple_bin_op("M-D"),
            ArithmeticOp::And => simple_bin_op("D&M"),
            ArithmeticOp::Or => simple_bin_op("D|M"),
            ArithmeticOp::Neg => simple_un_op("-M"),
            ArithmeticOp::Not => simple_un_op("!M"),
            ArithmeticOp::Eq => self.compare("JEQ"),
            ArithmeticOp::Gt => self.compare("JGT"),
            ArithmeticOp::Lt => self.compare("JLT"),
        }
    }

    fn push(&self, segment: Segment, index: u16) -> Vec<String> {
        match segment.addressing() {
            Addressing::Literal => {
                let mut code = svec![at_c(index), "D=A"];
                code.extend(push_d());
                code
            }
            Addressing::Indirect(base) => seg_push(base, index),
            Addressing::Fixed(base) => seg_push_direct(&fixed_sym(base, index)),
            Addressing::Register => seg_push_direct(pointer_register(index)),
            Addressing::Static => seg_push_direct(&self.static_sym(index)),
        }
    }

    fn pop(&self, segment: Segment, index: u16) -> Result<Vec<String>> {
        Ok(match segment.addressing() {
            Addressing::Literal => {
                return Err(Error::MalformedCommand(
                    Command::Pop(segment, index).to_string(),
                ))
            }
            Addressing::Indirect(base) => seg_pop(base, index),
            Addressing::Fixed(base) => seg_pop_direct(&fixed_sym(base, index)),
            Addressing::Register => seg_pop_direct(pointer_register(index)),
            Addressing::Static => seg_pop_direct(&self.static_sym(index)),
        })
    }

    /// True is -1 (all bits set), false is 0.
    fn compare(&mut self, jump: &str) -> Vec<String> {
        let sym = self.next_gen_sym();
        let true_sym = format!("true_{}", sym);
        let end_sym = format!("end_{}", sym);
        svec![
            "@SP",
            "AM=M-1", // SP--, looking at top of stack now
            "D=M",    // Right arg in D
            "A=A-1",  // Looking at second arg of stack, will overwrite
            "D=M-D",
            at_s(&true_sym),
            format!("D;{}", jump),
            "D=0",
            at_s(&end_sym),
            "0;JMP",
            format!("({})", true_sym),
            "D=-1",
            format!("({})", end_sym),
            "@SP",
            "A=M-1",
            "M=D"
        ]
    }

    fn label(&mut self, label: &str) -> Vec<String> {
        let sym = self.label_to_sym(label);
        self.declared.insert(sym.clone());
        svec![format!("({})", sym)]
    }

    fn goto(&mut self, label: &str) -> Vec<String> {
        let sym = self.label_to_sym(label);
        self.referenced.insert(sym.clone());
        svec![
            at_s(&sym),
            "0;JMP" // Unconditional jump
        ]
    }

    fn if_goto(&mut self, label: &str) -> Vec<String> {
        let sym = self.label_to_sym(label);
        self.referenced.insert(sym.clone());
        svec![
            "@SP",
            "AM=M-1",
            "D=M", // Stack popped into D
            at_s(&sym),
            "D;JNE" // False is 0
        ]
    }

    fn function(&mut self, name: &str, locals: u16) -> Result<Vec<String>> {
        check_function_name(name)?;
        self.function = Some(name.to_string());
        let mut code = svec![format!("({})", name)];
        if locals > 0 {
            code.extend(svec!["@SP", "A=M"]);
            for _ in 0..locals {
                code.extend(svec!["M=0", "A=A+1"]);
            }
            code.extend(svec!["D=A", "@SP", "M=D"]);
        }
        Ok(code)
    }

    fn call(&mut self, name: &str, args: u16) -> Result<Vec<String>> {
        check_function_name(name)?;
        let n = self.next_gen_sym();
        let ret = format!("{}$ret.{}", self.scope(), n);
        Ok(call_with_return(name, args, &ret))
    }

    fn ret(&self) -> Vec<String> {
        let mut code = svec![
            "@LCL",
            "D=M",
            "@R13",
            "M=D", // frame = LCL
            "@5",
            "A=D-A",
            "D=M",
            "@R14",
            "M=D", // ret = *(frame - 5), before *ARG can overwrite it
            "@SP",
            "AM=M-1",
            "D=M",
            "@ARG",
            "A=M",
            "M=D", // *ARG = pop()
            "@ARG",
            "D=M+1",
            "@SP",
            "M=D" // SP = ARG + 1
        ];
        // THAT, THIS, ARG, LCL = *(frame - 1..4)
        for pointer in FRAME.iter().rev() {
            code.extend(svec!["@R13", "AM=M-1", "D=M", at_s(pointer), "M=D"]);
        }
        code.extend(svec!["@R14", "A=M", "0;JMP"]);
        code
    }

    /// `SP = 256; call Sys.init 0`
    pub fn bootstrap(&self) -> Vec<String> {
        let mut code = svec!["@256", "D=A", "@SP", "M=D"];
        code.extend(call_with_return("Sys.init", 0, BOOTSTRAP_RETURN));
        code
    }

    pub fn halt(&self) -> Vec<String> {
        svec![
            format!("({})", HALT_LABEL),
            at_s(HALT_LABEL),
            "0;JMP"
        ]
    }

    /// Fails on the first jump whose target was never declared in this file.
    pub fn check_labels(&self) -> Result<()> {
        match self.referenced.iter().find(|sym| !self.declared.contains(*sym)) {
            Some(sym) => Err(Error::UndefinedSymbol(sym.clone())),
            None => Ok(()),
        }
    }
}

fn call_with_return(name: &str, args: u16, ret: &str) -> Vec<String> {
    let mut code = svec![at_s(ret), "D=A"];
    code.extend(push_d());
    for pointer in FRAME {
        code.extend(svec![at_s(pointer), "D=M"]);
        code.extend(push_d());
    }
    code.extend(svec![
        "@SP",
        "D=M",
        at_c(args as u32 + 5),
        "D=D-A",
        "@ARG",
        "M=D", // ARG = SP - args - 5
        "@SP",
        "D=M",
        "@LCL",
        "M=D", // LCL = SP
        at_s(name),
        "0;JMP",
        format!("({})", ret)
    ]);
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Command::*;

    fn writer(file: &str) -> CodeWriter {
        let mut writer = CodeWriter::new();
        writer.set_file_name(file);
        writer
    }

    #[test]
    fn push_constant() {
        let code = writer("Main").write(&Push(Segment::Constant, 7)).unwrap();
        assert_eq!(code, vec!["@7", "D=A", "@SP", "M=M+1", "A=M-1", "M=D"]);
    }

    #[test]
    fn static_is_namespaced_by_file() {
        let a = writer("A").write(&Pop(Segment::Static, 0)).unwrap();
        let b = writer("B").write(&Pop(Segment::Static, 0)).unwrap();
        assert!(a.contains(&"@A.0".to_string()));
        assert!(b.contains(&"@B.0".to_string()));
    }

    #[test]
    fn temp_and_pointer_are_direct() {
        let mut w = writer("Main");
        assert!(w.write(&Push(Segment::Temp, 3)).unwrap().contains(&"@R8".to_string()));
        assert!(w.write(&Pop(Segment::Pointer, 1)).unwrap().contains(&"@THAT".to_string()));
    }

    #[test]
    fn comparison_labels_are_unique() {
        let mut w = writer("Main");
        let first = w.write(&Arithmetic(ArithmeticOp::Eq)).unwrap();
        let second = w.write(&Arithmetic(ArithmeticOp::Lt)).unwrap();
        assert!(first.contains(&"(true_0)".to_string()));
        assert!(second.contains(&"(end_1)".to_string()));
        assert!(second.contains(&"D;JLT".to_string()));
    }

    #[test]
    fn labels_are_scoped_by_function() {
        let mut w = writer("Main");
        assert_eq!(w.write(&Label("TOP".into())).unwrap(), vec!["(Main$TOP)"]);
        w.write(&Function("Main.loop".into(), 0)).unwrap();
        assert_eq!(
            w.write(&Goto("TOP".into())).unwrap(),
            vec!["@Main.loop$TOP", "0;JMP"]
        );
    }

    #[test]
    fn undefined_jump_target() {
        let mut w = writer("Main");
        w.write(&Function("Main.f".into(), 0)).unwrap();
        w.write(&IfGoto("LATER".into())).unwrap();
        w.write(&Label("LATER".into())).unwrap();
        w.check_labels().unwrap();
        w.write(&Goto("NOWHERE".into())).unwrap();
        assert!(matches!(
            w.check_labels(),
            Err(Error::UndefinedSymbol(sym)) if sym == "Main.f$NOWHERE"
        ));
    }

    #[test]
    fn function_zeroes_locals() {
        let code = writer("Main").write(&Function("Main.f".into(), 2)).unwrap();
        assert_eq!(
            code,
            vec!["(Main.f)", "@SP", "A=M", "M=0", "A=A+1", "M=0", "A=A+1", "D=A", "@SP", "M=D"]
        );
        let none = writer("Main").write(&Function("Main.g".into(), 0)).unwrap();
        assert_eq!(none, vec!["(Main.g)"]);
    }

    #[test]
    fn call_repositions_arg_and_lcl() {
        let mut w = writer("Main");
        w.write(&Function("Main.main".into(), 0)).unwrap();
        let code = w.write(&Call("Math.max".into(), 2)).unwrap();
        assert_eq!(code.first().map(String::as_str), Some("@Main.main$ret.0"));
        assert!(code.contains(&"@7".to_string()));
        assert_eq!(code.last().map(String::as_str), Some("(Main.main$ret.0)"));
    }

    #[test]
    fn consecutive_calls_get_distinct_return_labels() {
        let mut w = writer("Main");
        let first = w.write(&Call("Math.max".into(), 2)).unwrap();
        let second = w.write(&Call("Math.max".into(), 2)).unwrap();
        assert_eq!(first.last().map(String::as_str), Some("(Main$ret.0)"));
        assert_eq!(second.last().map(String::as_str), Some("(Main$ret.1)"));
    }

    #[test]
    fn function_names_cannot_shadow_reserved_labels() {
        for name in ["END", "SP", "R13", "SCREEN", "true_0", "end_12"] {
            assert!(
                matches!(
                    writer("Main").write(&Function(name.into(), 0)),
                    Err(Error::DuplicateSymbol(ref sym)) if sym == name
                ),
                "{}",
                name
            );
            assert!(matches!(
                writer("Main").write(&Call(name.into(), 0)),
                Err(Error::DuplicateSymbol(_))
            ));
        }
        for name in ["Main.end", "true_", "end_x", "R16", "ENDING"] {
            assert!(writer("Main").write(&Function(name.into(), 0)).is_ok(), "{}", name);
        }
    }

    #[test]
    fn pop_constant_is_rejected() {
        assert!(writer("Main").write(&Pop(Segment::Constant, 0)).is_err());
    }
}
