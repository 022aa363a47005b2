use hack_toolchain::assembler::{assemble, assemble_to_binary};
use hack_toolchain::mnemonic::decode;
use hack_toolchain::Error;

#[test]
fn test_address_literals() {
    for v in (0..32768u32).step_by(331).chain([1, 16384, 32767]) {
        let output = assemble_to_binary(&format!("@{}\n", v)).expect("Assembly failed");
        assert_eq!(output, vec![format!("0{:015b}", v)]);
    }
}

#[test]
fn test_predefined_symbols() {
    let source = "@R0\n@R15\n@SP\n@LCL\n@THAT\n@SCREEN\n@KBD\n";
    let output = assemble_to_binary(source).expect("Assembly failed");

    assert_eq!(output.len(), 7);
    assert_eq!(output[0], "0000000000000000"); // R0 = 0
    assert_eq!(output[1], "0000000000001111"); // R15 = 15
    assert_eq!(output[2], "0000000000000000"); // SP = 0
    assert_eq!(output[3], "0000000000000001"); // LCL = 1
    assert_eq!(output[4], "0000000000000100"); // THAT = 4
    assert_eq!(output[5], "0100000000000000"); // SCREEN = 16384
    assert_eq!(output[6], "0110000000000000"); // KBD = 24576
}

#[test]
fn test_variable_allocation() {
    let source = "@var1\n@var2\n@var1\n@var3\n";
    let output = assemble_to_binary(source).expect("Assembly failed");

    assert_eq!(output[0], "0000000000010000"); // var1 = RAM[16]
    assert_eq!(output[1], "0000000000010001"); // var2 = RAM[17]
    assert_eq!(output[2], "0000000000010000"); // var1 again
    assert_eq!(output[3], "0000000000010010"); // var3 = RAM[18]
}

#[test]
fn test_labels_and_forward_references() {
    let source = "@END\n0;JMP\nD=1\n(END)\n@END\n0;JMP\n";
    let output = assemble_to_binary(source).expect("Assembly failed");

    assert_eq!(output.len(), 5); // Labels don't generate code
    assert_eq!(output[0], "0000000000000011"); // @END points to instruction 3
    assert_eq!(output[1], "1110101010000111"); // 0;JMP
    assert_eq!(output[2], "1110111111010000"); // D=1
    assert_eq!(output[3], "0000000000000011"); // @END again
    assert_eq!(output[4], "1110101010000111"); // 0;JMP
}

const ADD: &str = "\
// Computes R0 = 2 + 3  (R0 refers to RAM[0])

@2
D=A
@3
D=D+A
@0
M=D
";

#[test]
fn test_add_program() {
    let output = assemble_to_binary(ADD).expect("Assembly failed");
    assert_eq!(
        output,
        vec![
            "0000000000000010",
            "1110110000010000",
            "0000000000000011",
            "1110000010010000",
            "0000000000000000",
            "1110001100001000",
        ]
    );
}

const MAX: &str = "\
// Computes R2 = max(R0, R1)
   @R0
   D=M              // D = first number
   @R1
   D=D-M            // D = first number - second number
   @OUTPUT_FIRST
   D;JGT            // if D>0 (first is greater) goto output_first
   @R1
   D=M              // D = second number
   @OUTPUT_D
   0;JMP            // goto output_d
(OUTPUT_FIRST)
   @R0
   D=M              // D = first number
(OUTPUT_D)
   @R2
   M=D              // M[2] = D (greatest number)
(INFINITE_LOOP)
   @INFINITE_LOOP
   0;JMP            // infinite loop
";

#[test]
fn test_max_program() {
    let output = assemble_to_binary(MAX).expect("Assembly failed");
    assert_eq!(output.len(), 16);
    assert_eq!(output[4], "0000000000001010"); // OUTPUT_FIRST = 10
    assert_eq!(output[5], "1110001100000001"); // D;JGT
    assert_eq!(output[8], "0000000000001100"); // OUTPUT_D = 12
    assert_eq!(output[11], "1111110000010000"); // D=M
    assert_eq!(output[14], "0000000000001110"); // INFINITE_LOOP = 14
}

#[test]
fn test_words_decode_back_to_source() {
    let source = "AM=M+1\nD;JGE\nMD=D|M;JNE\nA=!A\n0;JMP\n";
    let words = assemble(source).expect("Assembly failed");
    let decoded: Vec<String> = words
        .iter()
        .map(|w| decode(*w).expect("valid word").to_string())
        .collect();
    assert_eq!(decoded, vec!["AM=M+1", "D;JGE", "MD=D|M;JNE", "A=!A", "0;JMP"]);
}

#[test]
fn test_errors_stop_assembly() {
    let err = assemble("@1\n@70000\n").unwrap_err();
    assert!(matches!(err.root(), Error::ValueOverflow(70000)));

    let err = assemble("D=M;JXX\n").unwrap_err();
    assert!(matches!(err.root(), Error::UnknownMnemonic { .. }));
    assert!(err.to_string().contains("line 1"));

    let err = assemble("@1\nthis is not asm\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(matches!(err.root(), Error::MalformedInstruction(_)));
}
