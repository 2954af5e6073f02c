use crate::error::{Aborted, BuildError, RuntimeError};
use crate::input::ByteSource;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::tape::{DEFAULT_TAPE_LEN, Tape};

/// What a single [`Interpreter::step`] did.
///
/// `cursor`/`cell` are sampled before the instruction ran and the `_after`
/// fields once it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Source position of the executed instruction.
    pub position: usize,
    pub instruction: Instruction,
    pub cursor: usize,
    pub cell: u8,
    pub cursor_after: usize,
    pub cell_after: u8,
    /// Set when a loop bracket jumped to its partner.
    pub jumped_to: Option<usize>,
    /// Byte appended to the output, for `.`.
    pub emitted: Option<u8>,
}

/// A validated program bound to its own tape.
///
/// The interpreter maintains:
/// - the decoded program, one [`Instruction`] per source character, with
///   loop partners taken from the [`JumpTable`],
/// - a circular memory tape (30,000 cells by default) and its cursor,
/// - a program counter and the output accumulated so far.
///
/// An instance runs one program once; build a new one for a fresh run.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: Vec<Instruction>,
    tape: Tape,
    pc: usize,
    output: Vec<u8>,
    steps: u64,
}

impl Interpreter {
    /// Validate `source` and allocate the default 30,000-cell tape.
    pub fn new(source: &str) -> Result<Self, BuildError> {
        Self::with_tape_len(source, DEFAULT_TAPE_LEN)
    }

    /// Validate `source` and allocate a tape of `tape_len` cells.
    ///
    /// Bracket errors are reported before the tape length is checked.
    pub fn with_tape_len(source: &str, tape_len: usize) -> Result<Self, BuildError> {
        let chars: Vec<char> = source.chars().collect();
        let jumps = JumpTable::build(&chars)?;
        let tape = Tape::new(tape_len)?;
        let program = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| Instruction::decode(c, i, &jumps))
            .collect();

        Ok(Self {
            program,
            tape,
            pc: 0,
            output: Vec::new(),
            steps: 0,
        })
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn program_counter(&self) -> usize {
        self.pc
    }

    /// Bytes emitted by `.` so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Positions executed so far, skipped characters included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.pc >= self.program.len()
    }

    /// Execute the instruction under the program counter.
    ///
    /// Returns `Ok(None)` without doing anything once the program counter has
    /// reached the end. On error the program counter stays on the failing
    /// instruction.
    pub fn step<I>(&mut self, input: &mut I) -> Result<Option<StepEvent>, RuntimeError>
    where
        I: ByteSource + ?Sized,
    {
        let Some(&instruction) = self.program.get(self.pc) else {
            return Ok(None);
        };
        let position = self.pc;
        let (cursor, cell) = (self.tape.cursor(), self.tape.get());
        let mut jumped_to = None;
        let mut emitted = None;

        match instruction {
            Instruction::Right => self.tape.move_right(),
            Instruction::Left => self.tape.move_left(),
            Instruction::Increment => self.tape.increment(),
            Instruction::Decrement => self.tape.decrement(),
            Instruction::Output => {
                self.output.push(cell);
                emitted = Some(cell);
            }
            Instruction::Input => match input.next_byte() {
                Ok(Some(b)) => self.tape.set(b),
                Ok(None) => return Err(RuntimeError::InputExhausted { ip: position }),
                Err(source) => return Err(RuntimeError::Io { ip: position, source }),
            },
            // Land on the partner itself; the advance below moves past it.
            Instruction::LoopStart(end) if cell == 0 => {
                self.pc = end;
                jumped_to = Some(end);
            }
            Instruction::LoopEnd(start) if cell != 0 => {
                self.pc = start;
                jumped_to = Some(start);
            }
            Instruction::LoopStart(_) | Instruction::LoopEnd(_) | Instruction::Skip => {}
        }

        self.pc += 1;
        self.steps += 1;

        let event = StepEvent {
            position,
            instruction,
            cursor,
            cell,
            cursor_after: self.tape.cursor(),
            cell_after: self.tape.get(),
            jumped_to,
            emitted,
        };
        tracing::trace!(?event, "step");
        Ok(Some(event))
    }

    /// Run until the program counter falls off the end of the program.
    ///
    /// Returns every byte written by `.`. If a `,` fails, [`Aborted`] carries
    /// the output produced up to that point.
    pub fn run<I>(&mut self, input: &mut I) -> Result<Vec<u8>, Aborted>
    where
        I: ByteSource + ?Sized,
    {
        loop {
            match self.step(input) {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(error) => return Err(self.abort(error)),
            }
        }
        tracing::debug!(steps = self.steps, output = self.output.len(), "run finished");
        Ok(self.output.clone())
    }

    /// Package `error` with the output accumulated so far.
    pub fn abort(&self, error: RuntimeError) -> Aborted {
        tracing::debug!(
            %error,
            ip = self.pc,
            steps = self.steps,
            output = self.output.len(),
            "run aborted"
        );
        Aborted {
            error,
            output: self.output.clone(),
        }
    }
}
