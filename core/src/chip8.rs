use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{ADDRESS_MASK, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::{LoadError, RuntimeFault};
use crate::frame_buffer::FrameBuffer;
use crate::instruction::Instruction;
use crate::operations::{self, Bus};
use crate::state::State;

/// The last address an instruction can start at; both of its bytes have to be addressable
const LAST_INSTRUCTION: u16 = ADDRESS_MASK - 1;

/// What a single call to `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran
    Executed(Instruction),
    /// Nothing ran; the program is waiting on `Fx0A` for a key press
    AwaitingKey,
    /// The program counter ran off the end of memory; there is nothing left to execute
    Halted,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `pressed_keys` with public interfaces for manipulating them
///  - the last loaded `program`, so the machine can be reset
///  - a `fault` that stopped the program, if any
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - stepping the CPU
/// - ticking its timers
/// - inspecting its frame buffer for rendering by some display
///
/// Stepping and ticking are driven from outside on separate clocks; see `Clock`.
pub struct Chip8 {
    state: State,
    pressed_keys: [bool; 16],
    program: Vec<u8>,
    fault: Option<RuntimeFault>,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `Cxnn` results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            pressed_keys: [false; 16],
            program: Vec::new(),
            fault: None,
            rng,
        }
    }

    /// Copies a program into memory at 0x200 on a freshly reset machine.
    /// Loading again replaces the previous program entirely.
    /// Execution doesn't start until the host calls `step`.
    ///
    /// # Arguments
    /// * `program` raw big-endian instructions and data
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: program.len(),
            });
        }
        self.program = program.to_vec();
        self.reset();
        log::debug!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Restores the power-on state and reloads the last program
    pub fn reset(&mut self) {
        self.state = State::new();
        self.pressed_keys = [false; 16];
        self.fault = None;
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + self.program.len()].copy_from_slice(&self.program);
        log::debug!("reset with {} byte program", self.program.len());
    }

    /// Advances the CPU by a single instruction
    /// - does nothing while awaiting a keypress
    /// - halts once the program counter runs off the end of memory
    /// - repeats the fault that stopped the program, if there was one
    /// - otherwise gets, decodes and executes the next opcode
    ///
    /// An invalid opcode is skipped but still reported as an error.
    pub fn step(&mut self) -> Result<StepOutcome, RuntimeFault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.state.register_needing_key.is_some() {
            return Ok(StepOutcome::AwaitingKey);
        }
        if self.state.pc > LAST_INSTRUCTION {
            return Ok(StepOutcome::Halted);
        }

        let address = self.state.pc;
        let op = self.state.op_at(address);
        let instruction = match Instruction::decode(&op) {
            Some(instruction) => instruction,
            None => {
                log::warn!("skipping unknown opcode {:04X} at {:03X}", op, address);
                self.state.pc += 0x2;
                return Err(RuntimeFault::InvalidOpcode {
                    opcode: op,
                    address,
                });
            }
        };
        log::trace!(
            "{:03X}: {:04X} {:<16} v{:02X?} i{:03X} sp{}",
            address,
            op,
            instruction.to_string(),
            self.state.v,
            self.state.i,
            self.state.sp
        );

        let mut bus = Bus {
            pressed_keys: &self.pressed_keys,
            rng: &mut self.rng,
        };
        if let Err(fault) = operations::execute(instruction, &mut self.state, &mut bus) {
            log::debug!("program stopped: {}", fault);
            self.fault = Some(fault);
            return Err(fault);
        }

        if self.state.pc > LAST_INSTRUCTION {
            log::debug!("program counter {:#06X} is past the end of memory", self.state.pc);
            return Ok(StepOutcome::Halted);
        }
        Ok(StepOutcome::Executed(instruction))
    }

    /// Decrements the delay and sound timers, stopping at 0.
    /// The host calls this at 60Hz no matter how many steps ran in between.
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Sets the pressed status of a key.
    /// A press also completes a pending `Fx0A`, storing the key in its register.
    ///
    /// # Arguments
    /// * `key` the keypad key, 0x0..=0xF
    /// * `pressed` whether the key is now down
    pub fn key_event(&mut self, key: u8, pressed: bool) {
        if key > 0xF {
            log::warn!("ignoring event for key {:#X}; the keypad has 16 keys", key);
            return;
        }
        self.pressed_keys[key as usize] = pressed;
        if !pressed {
            return;
        }
        if let Some(register) = self.state.register_needing_key.take() {
            log::debug!("key {:X} completed wait into V{:X}", key, register);
            self.state.v[register as usize] = key;
        }
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys[(key & 0xF) as usize]
    }

    /// Whether a program is blocked on `Fx0A`
    pub fn awaiting_key(&self) -> bool {
        self.state.register_needing_key.is_some()
    }

    /// Whether a tone should be playing
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The fault that stopped the program, if any
    pub fn fault(&self) -> Option<RuntimeFault> {
        self.fault
    }

    /// The current frame, whether or not it changed
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns a copy of the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Decodes the instruction at the program counter without running it
    pub fn current_instruction(&self) -> Option<Instruction> {
        Instruction::decode(&self.state.op_at(self.state.pc))
    }

    /// Read-only view of the registers, memory and timers
    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FONT_ADDRESS, STACK_DEPTH};

    fn loaded(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load(program).unwrap();
        chip8
    }

    #[test]
    fn test_load_places_program_at_0x200() {
        let chip8 = loaded(&[0xAA, 0xBB]);
        assert_eq!(chip8.state.memory[0x200..0x202], [0xAA, 0xBB]);
        assert_eq!(chip8.state.op_at(chip8.state.pc), 0xAABB);
    }

    #[test]
    fn test_load_accepts_largest_program() {
        let mut chip8 = Chip8::new();
        let program = vec![0x12; 3583];
        assert_eq!(chip8.load(&program), Ok(()));
        assert_eq!(chip8.state.memory[0xFFE], 0x12);
        assert_eq!(chip8.state.memory[0xFFF], 0x00);
    }

    #[test]
    fn test_load_rejects_oversized_program() {
        let mut chip8 = Chip8::new();
        let program = vec![0x12; 3584];
        assert_eq!(
            chip8.load(&program),
            Err(LoadError::ProgramTooLarge { size: 3584 })
        );
        assert!(chip8.state.memory[0x200..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_reload_replaces_previous_program() {
        let mut chip8 = loaded(&[0x60, 0x22, 0x61, 0x33, 0x62, 0x44]);
        chip8.step().unwrap();
        chip8.key_event(0x2, true);
        chip8.load(&[0x63, 0x55]).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x206], [0x63, 0x55, 0, 0, 0, 0]);
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.v, [0; 16]);
        assert!(!chip8.is_pressed(0x2));
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x3], 0x55);
        // runs off the short program into zeroed memory rather than the old tail
        assert!(chip8.step().is_err());
        assert_eq!(chip8.state.v[0x1], 0x00);
    }

    #[test]
    fn test_reload_clears_fault() {
        let mut chip8 = loaded(&[0x00, 0xEE]);
        assert!(chip8.step().is_err());
        chip8.load(&[0x60, 0x01]).unwrap();
        assert_eq!(chip8.fault(), None);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x0], 0x01);
    }

    #[test]
    fn test_rejected_load_keeps_current_program() {
        let mut chip8 = loaded(&[0x60, 0x01]);
        assert!(chip8.load(&vec![0x12; 3584]).is_err());
        assert_eq!(chip8.state.memory[0x200..0x202], [0x60, 0x01]);
    }

    #[test]
    fn test_load_keeps_sprite_sheet() {
        let chip8 = loaded(&[0xFF; 64]);
        assert_eq!(
            chip8.state.memory[FONT_ADDRESS as usize..FONT_ADDRESS as usize + 5],
            [0xF0, 0x90, 0x90, 0x90, 0xF0]
        );
    }

    #[test]
    fn test_step_sets_index() {
        let mut chip8 = loaded(&[0xA2, 0xF0]);
        let outcome = chip8.step();
        assert_eq!(
            outcome,
            Ok(StepOutcome::Executed(Instruction::LoadIndex { addr: 0x2F0 }))
        );
        assert_eq!(chip8.state.i, 0x2F0);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_step_copies_register() {
        let mut chip8 = loaded(&[0x60, 0x22, 0x81, 0x00]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x0], 0x22);
        assert_eq!(chip8.state.v[0x1], 0x22);
    }

    #[test]
    fn test_call_then_return() {
        let mut chip8 = loaded(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x204);
        assert_eq!(chip8.state.sp, 1);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0);
    }

    #[test]
    fn test_adds_index_register() {
        let mut chip8 = loaded(&[0xA0, 0x50, 0x61, 0xAF, 0xF1, 0x1E]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.state.i, 0x0FF);
    }

    #[test]
    fn test_stack_overflow_stops_the_program() {
        // 0x200: CALL 0x200, forever
        let mut chip8 = loaded(&[0x22, 0x00]);
        for _ in 0..STACK_DEPTH {
            chip8.step().unwrap();
        }
        let fault = RuntimeFault::StackOverflow { address: 0x200 };
        assert_eq!(chip8.step(), Err(fault));
        assert_eq!(chip8.state.sp as usize, STACK_DEPTH);
        assert_eq!(chip8.fault(), Some(fault));
        // stays stopped
        assert_eq!(chip8.step(), Err(fault));
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_stack_underflow_stops_the_program() {
        let mut chip8 = loaded(&[0x00, 0xEE]);
        let fault = RuntimeFault::StackUnderflow { address: 0x200 };
        assert_eq!(chip8.step(), Err(fault));
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.step(), Err(fault));
    }

    #[test]
    fn test_invalid_opcode_is_skipped() {
        let mut chip8 = loaded(&[0xFF, 0xFF, 0x61, 0x05]);
        assert_eq!(
            chip8.step(),
            Err(RuntimeFault::InvalidOpcode {
                opcode: 0xFFFF,
                address: 0x200
            })
        );
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.fault(), None);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x05);
    }

    #[test]
    fn test_halts_past_end_of_memory() {
        let mut chip8 = loaded(&[0x1F, 0xFE]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0xFFE);
        // 0xFFE holds 0x0000, an unknown opcode; skipping it runs off the end
        assert!(chip8.step().is_err());
        assert_eq!(chip8.step(), Ok(StepOutcome::Halted));
        assert_eq!(chip8.step(), Ok(StepOutcome::Halted));
    }

    #[test]
    fn test_halts_when_an_instruction_leaves_memory() {
        let mut chip8 = loaded(&[0x1F, 0xFE]);
        chip8.step().unwrap();
        chip8.state.memory[0xFFE..].copy_from_slice(&[0x60, 0x01]);
        assert_eq!(chip8.step(), Ok(StepOutcome::Halted));
        assert_eq!(chip8.state.v[0x0], 0x01);
    }

    #[test]
    fn test_doesnt_step_while_register_needs_key() {
        let mut chip8 = loaded(&[0xF3, 0x0A, 0x61, 0x01]);
        chip8.step().unwrap();
        assert!(chip8.awaiting_key());
        let pc = chip8.state.pc;
        for _ in 0..10 {
            assert_eq!(chip8.step(), Ok(StepOutcome::AwaitingKey));
        }
        assert_eq!(chip8.state.pc, pc);
        assert_eq!(chip8.state.v[0x1], 0x00);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = loaded(&[0xF3, 0x0A, 0x61, 0x01]);
        chip8.step().unwrap();
        chip8.key_event(0xE, false);
        assert!(chip8.awaiting_key());
        chip8.key_event(0xE, true);
        assert!(!chip8.awaiting_key());
        assert_eq!(chip8.state.v[0x3], 0xE);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x01);
    }

    #[test]
    fn test_timers_tick_while_awaiting_key() {
        // V0 = 5; DT = V0; wait for key
        let mut chip8 = loaded(&[0x60, 0x05, 0xF0, 0x15, 0xF1, 0x0A]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        for _ in 0..3 {
            chip8.step().unwrap();
            chip8.tick_timers();
        }
        assert!(chip8.awaiting_key());
        assert_eq!(chip8.state.delay_timer, 2);
    }

    #[test]
    fn test_key_state_is_level_triggered() {
        let mut chip8 = Chip8::new();
        chip8.key_event(0x4, true);
        assert!(chip8.is_pressed(0x4));
        chip8.key_event(0x4, true);
        assert!(chip8.is_pressed(0x4));
        chip8.key_event(0x4, false);
        assert!(!chip8.is_pressed(0x4));
    }

    #[test]
    fn test_ignores_keys_off_the_keypad() {
        let mut chip8 = loaded(&[0xF3, 0x0A]);
        chip8.step().unwrap();
        chip8.key_event(0x10, true);
        assert!(chip8.awaiting_key());
        assert!(chip8.pressed_keys.iter().all(|k| !k));
    }

    #[test]
    fn test_skips_on_held_key() {
        // V0 = 7; SKP V0; V1 = 1; V2 = 2
        let mut chip8 = loaded(&[0x60, 0x07, 0xE0, 0x9E, 0x61, 0x01, 0x62, 0x02]);
        chip8.key_event(0x7, true);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.state.v[0x1], 0x00);
        assert_eq!(chip8.state.v[0x2], 0x02);
    }

    #[test]
    fn test_timers_saturate() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 1;
        assert!(chip8.sound_active());
        chip8.tick_timers();
        assert_eq!(chip8.state.delay_timer, 1);
        assert_eq!(chip8.state.sound_timer, 0);
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.state.delay_timer, 0);
        assert_eq!(chip8.state.sound_timer, 0);
    }

    #[test]
    fn test_timer_ticks_are_independent_of_steps() {
        // V0 = 100; DT = V0; ST = V0; then spin on JP 0x206
        let program = [0x60, 0x64, 0xF0, 0x15, 0xF0, 0x18, 0x12, 0x06];
        for steps_per_tick in [0, 1, 3, 17] {
            let mut chip8 = loaded(&program);
            for _ in 0..3 {
                chip8.step().unwrap();
            }
            for _ in 0..60 {
                for _ in 0..steps_per_tick {
                    chip8.step().unwrap();
                }
                chip8.tick_timers();
            }
            assert_eq!(chip8.state.delay_timer, 40);
            assert_eq!(chip8.state.sound_timer, 40);
        }
    }

    #[test]
    fn test_draw_twice_collides_and_erases() {
        // I = glyph 0; DRW V0, V1, 5; DRW V0, V1, 5
        let mut chip8 = loaded(&[0xF0, 0x29, 0xD0, 0x15, 0xD0, 0x15]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0xF], 0x0);
        assert_eq!(chip8.frame().lit(), 14);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0xF], 0x1);
        assert_eq!(chip8.frame().lit(), 0);
    }

    #[test]
    fn test_take_frame_only_after_changes() {
        let mut chip8 = loaded(&[0xD0, 0x15, 0x60, 0x01]);
        assert_eq!(chip8.take_frame(), None);
        chip8.step().unwrap();
        let frame = chip8.take_frame().expect("draw should dirty the frame");
        assert_eq!(frame.lit(), 0);
        chip8.step().unwrap();
        assert_eq!(chip8.take_frame(), None);
    }

    #[test]
    fn test_reset_reloads_program() {
        let mut chip8 = loaded(&[0x60, 0x22, 0x22, 0x00]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        chip8.key_event(0x1, true);
        chip8.reset();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.sp, 0);
        assert_eq!(chip8.state.v[0x0], 0x00);
        assert!(!chip8.is_pressed(0x1));
        assert_eq!(chip8.state.memory[0x200..0x204], [0x60, 0x22, 0x22, 0x00]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x0], 0x22);
    }

    #[test]
    fn test_reset_clears_fault() {
        let mut chip8 = loaded(&[0x00, 0xEE]);
        assert!(chip8.step().is_err());
        chip8.reset();
        assert_eq!(chip8.fault(), None);
    }

    #[test]
    fn test_current_instruction() {
        let chip8 = loaded(&[0x00, 0xE0]);
        assert_eq!(chip8.current_instruction(), Some(Instruction::ClearScreen));
        assert_eq!(chip8.state().pc, 0x200);
    }
}
