//! Binary encoding of Hack instructions.
//!
//! The dest/comp/jump mnemonic tables are fixed by the architecture, so they
//! live in compile-time perfect hash maps. Unknown mnemonics are reported to
//! the caller instead of being encoded as a default.

use crate::error::AsmError;
use phf::phf_map;

/// Destination mnemonic to 3-bit code. The empty string is the null dest.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// Computation mnemonic to 7-bit code (`a` bit + 6 ALU bits).
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    // a=0, operand from the A register
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "D|A" => "0010101",

    // a=1, operand from memory
    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "D|M" => "1010101",
};

/// Jump mnemonic to 3-bit code. The empty string is no jump.
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

#[inline]
#[must_use]
pub fn dest(mnemonic: &str) -> Option<&'static str> {
    DEST_MAP.get(mnemonic).copied()
}

#[inline]
#[must_use]
pub fn comp(mnemonic: &str) -> Option<&'static str> {
    COMP_MAP.get(mnemonic).copied()
}

#[inline]
#[must_use]
pub fn jump(mnemonic: &str) -> Option<&'static str> {
    JUMP_MAP.get(mnemonic).copied()
}

/// Encodes a C-instruction as `111` + comp(7) + dest(3) + jump(3).
///
/// # Errors
/// Returns the offending mnemonic if any of the three fields is unknown.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_c_instruction;
/// let word = encode_c_instruction("D", "D+1", "").unwrap();
/// assert_eq!(word, "1110011111010000");
/// ```
pub fn encode_c_instruction(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
) -> Result<String, AsmError> {
    let d = dest(dest_mnemonic).ok_or_else(|| AsmError::UnknownDest(dest_mnemonic.to_string()))?;
    let c = comp(comp_mnemonic).ok_or_else(|| AsmError::UnknownComp(comp_mnemonic.to_string()))?;
    let j = jump(jump_mnemonic).ok_or_else(|| AsmError::UnknownJump(jump_mnemonic.to_string()))?;
    Ok(format!("111{c}{d}{j}"))
}

/// Encodes an A-instruction: a leading `0` and a 15-bit address.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_a_instruction;
/// assert_eq!(encode_a_instruction(100), "0000000001100100");
/// ```
#[inline]
#[must_use]
pub fn encode_a_instruction(address: u16) -> String {
    format!("{address:016b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_translations() {
        assert_eq!(dest(""), Some("000"));
        assert_eq!(dest("M"), Some("001"));
        assert_eq!(dest("D"), Some("010"));
        assert_eq!(dest("MD"), Some("011"));
        assert_eq!(dest("A"), Some("100"));
        assert_eq!(dest("AM"), Some("101"));
        assert_eq!(dest("AD"), Some("110"));
        assert_eq!(dest("AMD"), Some("111"));
        assert_eq!(dest("DM"), None);
    }

    #[test]
    fn comp_translations() {
        assert_eq!(comp("0"), Some("0101010"));
        assert_eq!(comp("D+A"), Some("0000010"));
        assert_eq!(comp("M-D"), Some("1000111"));
        assert_eq!(comp("D|M"), Some("1010101"));
        assert_eq!(comp("M+D"), None);
    }

    #[test]
    fn jump_translations() {
        assert_eq!(jump(""), Some("000"));
        assert_eq!(jump("JEQ"), Some("010"));
        assert_eq!(jump("JMP"), Some("111"));
        assert_eq!(jump("JXX"), None);
    }

    #[test]
    fn encode_c_variants() {
        assert_eq!(
            encode_c_instruction("D", "D+1", "").unwrap(),
            "1110011111010000"
        );
        assert_eq!(
            encode_c_instruction("MD", "M-1", "JEQ").unwrap(),
            "1111110010011010"
        );
        assert_eq!(
            encode_c_instruction("", "0", "JMP").unwrap(),
            "1110101010000111"
        );
        assert_eq!(
            encode_c_instruction("M", "1", "").unwrap(),
            "1110111111001000"
        );
    }

    #[test]
    fn encode_c_rejects_unknown_mnemonics() {
        assert!(matches!(
            encode_c_instruction("DX", "0", ""),
            Err(AsmError::UnknownDest(_))
        ));
        assert!(matches!(
            encode_c_instruction("D", "M+M", ""),
            Err(AsmError::UnknownComp(_))
        ));
        assert!(matches!(
            encode_c_instruction("D", "0", "JOOP"),
            Err(AsmError::UnknownJump(_))
        ));
    }

    #[test]
    fn encode_a_bounds() {
        assert_eq!(encode_a_instruction(0), "0000000000000000");
        assert_eq!(encode_a_instruction(16384), "0100000000000000");
        assert_eq!(encode_a_instruction(32767), "0111111111111111");
    }
}
