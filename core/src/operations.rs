use rand::{Rng, RngCore};

use crate::constants::{ADDRESS_MASK, FONT_ADDRESS, FONT_GLYPH_SIZE, STACK_DEPTH};
use crate::error::RuntimeFault;
use crate::instruction::Instruction;
use crate::state::State;

/// What an instruction does to the program counter once it has executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramCounter {
    /// pc += 2
    Next,
    /// pc += 4
    Skip,
    /// pc = addr
    Jump(u16),
}

impl ProgramCounter {
    fn skip_if(condition: bool) -> Self {
        if condition {
            ProgramCounter::Skip
        } else {
            ProgramCounter::Next
        }
    }
}

/// Everything an instruction may read besides the state it mutates
pub struct Bus<'a> {
    pub pressed_keys: &'a [bool; 16],
    pub rng: &'a mut dyn RngCore,
}

/// Executes `instruction` against `state` and moves the program counter.
///
/// Faults are raised before anything is written, so a failed instruction leaves `state` untouched.
pub fn execute(
    instruction: Instruction,
    state: &mut State,
    bus: &mut Bus<'_>,
) -> Result<(), RuntimeFault> {
    let pc = match instruction {
        Instruction::ClearScreen => clr(state),
        Instruction::Return => rts(state)?,
        Instruction::Jump { addr } => ProgramCounter::Jump(addr),
        Instruction::Call { addr } => call(state, addr)?,
        Instruction::SkipIfEqual { x, byte } => ProgramCounter::skip_if(state.reg(x) == byte),
        Instruction::SkipIfNotEqual { x, byte } => ProgramCounter::skip_if(state.reg(x) != byte),
        Instruction::SkipIfRegistersEqual { x, y } => {
            ProgramCounter::skip_if(state.reg(x) == state.reg(y))
        }
        Instruction::SkipIfRegistersNotEqual { x, y } => {
            ProgramCounter::skip_if(state.reg(x) != state.reg(y))
        }
        Instruction::Load { x, byte } => {
            state.set_reg(x, byte);
            ProgramCounter::Next
        }
        Instruction::Add { x, byte } => {
            state.set_reg(x, state.reg(x).wrapping_add(byte));
            ProgramCounter::Next
        }
        Instruction::Move { x, y } => {
            let vy = state.reg(y);
            alu(state, x, vy, None)
        }
        Instruction::Or { x, y } => {
            let res = state.reg(x) | state.reg(y);
            alu(state, x, res, None)
        }
        Instruction::And { x, y } => {
            let res = state.reg(x) & state.reg(y);
            alu(state, x, res, None)
        }
        Instruction::Xor { x, y } => {
            let res = state.reg(x) ^ state.reg(y);
            alu(state, x, res, None)
        }
        Instruction::AddRegisters { x, y } => {
            let (res, carry) = state.reg(x).overflowing_add(state.reg(y));
            alu(state, x, res, Some(carry))
        }
        Instruction::Sub { x, y } => {
            let (res, borrow) = state.reg(x).overflowing_sub(state.reg(y));
            alu(state, x, res, Some(!borrow))
        }
        Instruction::SubN { x, y } => {
            let (res, borrow) = state.reg(y).overflowing_sub(state.reg(x));
            alu(state, x, res, Some(!borrow))
        }
        Instruction::ShiftRight { x } => {
            let vx = state.reg(x);
            alu(state, x, vx >> 1, Some(vx & 0x1 == 0x1))
        }
        Instruction::ShiftLeft { x } => {
            let vx = state.reg(x);
            alu(state, x, vx << 1, Some(vx >> 7 == 0x1))
        }
        Instruction::LoadIndex { addr } => {
            state.i = addr & ADDRESS_MASK;
            ProgramCounter::Next
        }
        Instruction::JumpOffset { addr } => {
            ProgramCounter::Jump((addr + u16::from(state.reg(0x0))) & ADDRESS_MASK)
        }
        Instruction::Random { x, byte } => {
            let rand_byte: u8 = bus.rng.gen();
            state.set_reg(x, rand_byte & byte);
            ProgramCounter::Next
        }
        Instruction::Draw { x, y, n } => draw(state, x, y, n),
        Instruction::SkipIfPressed { x } => ProgramCounter::skip_if(is_pressed(state, bus, x)),
        Instruction::SkipIfNotPressed { x } => {
            ProgramCounter::skip_if(!is_pressed(state, bus, x))
        }
        Instruction::ReadDelay { x } => {
            state.set_reg(x, state.delay_timer);
            ProgramCounter::Next
        }
        Instruction::AwaitKey { x } => {
            state.register_needing_key = Some(x & 0xF);
            ProgramCounter::Next
        }
        Instruction::SetDelay { x } => {
            state.delay_timer = state.reg(x);
            ProgramCounter::Next
        }
        Instruction::SetSound { x } => {
            state.sound_timer = state.reg(x);
            ProgramCounter::Next
        }
        Instruction::AddIndex { x } => {
            state.i = (state.i + u16::from(state.reg(x))) & ADDRESS_MASK;
            ProgramCounter::Next
        }
        Instruction::LoadGlyph { x } => {
            state.i = FONT_ADDRESS + u16::from(state.reg(x) & 0xF) * FONT_GLYPH_SIZE;
            ProgramCounter::Next
        }
        Instruction::StoreBcd { x } => bcd(state, x),
        Instruction::StoreRegisters { x } => stor(state, x),
        Instruction::LoadRegisters { x } => read(state, x),
    };

    state.pc = match pc {
        ProgramCounter::Next => state.pc + 0x2,
        ProgramCounter::Skip => state.pc + 0x4,
        ProgramCounter::Jump(addr) => addr & ADDRESS_MASK,
    };
    Ok(())
}

/// clear
fn clr(state: &mut State) -> ProgramCounter {
    state.frame_buffer.clear();
    state.draw_flag = true;
    ProgramCounter::Next
}

/// PC = STACK.pop()
fn rts(state: &mut State) -> Result<ProgramCounter, RuntimeFault> {
    if state.sp == 0 {
        return Err(RuntimeFault::StackUnderflow { address: state.pc });
    }
    state.sp -= 1;
    Ok(ProgramCounter::Jump(state.stack[state.sp as usize]))
}

/// STACK.push(PC + 2); PC = addr
fn call(state: &mut State, addr: u16) -> Result<ProgramCounter, RuntimeFault> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(RuntimeFault::StackOverflow { address: state.pc });
    }
    state.stack[state.sp as usize] = (state.pc + 0x2) & ADDRESS_MASK;
    state.sp += 1;
    Ok(ProgramCounter::Jump(addr))
}

/// Vx = result; VF = flag
///
/// The flag is written after the result so that it survives when x is F.
fn alu(state: &mut State, x: u8, result: u8, flag: Option<bool>) -> ProgramCounter {
    state.set_reg(x, result);
    if let Some(flag) = flag {
        state.v[0xF] = u8::from(flag);
    }
    ProgramCounter::Next
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory I..I+n at position Vx, Vy with wrapping.
/// VF is set if any pixels were erased and cleared otherwise.
fn draw(state: &mut State, x: u8, y: u8, n: u8) -> ProgramCounter {
    let sprite: Vec<u8> = (0..u16::from(n))
        .map(|row| state.read(state.i + row))
        .collect();
    let origin_x = state.reg(x) as usize;
    let origin_y = state.reg(y) as usize;
    let collision = state.frame_buffer.draw_sprite(origin_x, origin_y, &sprite);
    state.v[0xF] = u8::from(collision);
    state.draw_flag = true;
    ProgramCounter::Next
}

fn is_pressed(state: &State, bus: &Bus<'_>, x: u8) -> bool {
    bus.pressed_keys[(state.reg(x) & 0xF) as usize]
}

/// mem[I..I+3] = bcd(Vx)
fn bcd(state: &mut State, x: u8) -> ProgramCounter {
    let vx = state.reg(x);
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    for (offset, digit) in (0..).zip(digits) {
        state.write(state.i + offset, digit);
    }
    ProgramCounter::Next
}

/// mem[I..=I+x] = V0..=Vx
fn stor(state: &mut State, x: u8) -> ProgramCounter {
    for register in 0..=(x & 0xF) {
        state.write(state.i + u16::from(register), state.reg(register));
    }
    ProgramCounter::Next
}

/// V0..=Vx = mem[I..=I+x]
fn read(state: &mut State, x: u8) -> ProgramCounter {
    for register in 0..=(x & 0xF) {
        let value = state.read(state.i + u16::from(register));
        state.set_reg(register, value);
    }
    ProgramCounter::Next
}
