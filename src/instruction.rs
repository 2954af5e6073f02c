use std::fmt;

use crate::jump_table::JumpTable;

/// One decoded program position.
///
/// Loop variants carry the position of their partner bracket, so the
/// dispatch loop never has to look anything up at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[` with the position of its matching `]`.
    LoopStart(usize),
    /// `]` with the position of its matching `[`.
    LoopEnd(usize),
    /// Anything else: whitespace, comments, unknown characters.
    Skip,
}

impl Instruction {
    /// True for the eight characters of the instruction set `><+-.,[]`.
    pub fn is_command(ch: char) -> bool {
        matches!(ch, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']')
    }

    /// Decode the character found at `position`.
    ///
    /// Brackets take their partner from `jumps`; a bracket the table does not
    /// know about decodes as [`Instruction::Skip`].
    pub fn decode(ch: char, position: usize, jumps: &JumpTable) -> Self {
        match ch {
            '>' => Instruction::Right,
            '<' => Instruction::Left,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => jumps
                .partner(position)
                .map_or(Instruction::Skip, Instruction::LoopStart),
            ']' => jumps
                .partner(position)
                .map_or(Instruction::Skip, Instruction::LoopEnd),
            _ => Instruction::Skip,
        }
    }

    /// Source character for commands, `None` for [`Instruction::Skip`].
    pub fn symbol(&self) -> Option<char> {
        match self {
            Instruction::Right => Some('>'),
            Instruction::Left => Some('<'),
            Instruction::Increment => Some('+'),
            Instruction::Decrement => Some('-'),
            Instruction::Output => Some('.'),
            Instruction::Input => Some(','),
            Instruction::LoopStart(_) => Some('['),
            Instruction::LoopEnd(_) => Some(']'),
            Instruction::Skip => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol().unwrap_or(' '))
    }
}
