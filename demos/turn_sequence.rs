//! A tactics-game turn driven by a scripted list of inputs.
//!
//! Run with `cargo run --example turn_sequence`.

use phasestack::builder::ControllerBuilder;
use phasestack::core::{Assets, State, StateError, StateKind};
use phasestack::machine::{Context, Queued};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
enum Input {
    Select(u32),
    Cancel,
}

#[derive(Default)]
struct Field {
    inputs: VecDeque<Input>,
    cursor_visible: bool,
    moves: Vec<(u32, u32)>,
    turn: u32,
}

impl Assets for Field {
    fn reset_assets(&mut self) {
        self.cursor_visible = false;
    }

    fn destroy(&mut self) {
        println!("field torn down after {} moves", self.moves.len());
    }
}

fn next_input(ctx: &mut Context<'_, Field>) -> Option<Input> {
    ctx.assets_mut().inputs.pop_front()
}

/// Start of a turn; nothing before it can be undone.
#[derive(Default)]
struct TurnStart;

impl State<Field> for TurnStart {
    fn kind(&self) -> StateKind {
        StateKind::new("TurnStart")
    }

    fn name(&self) -> &str {
        "TurnStart"
    }

    fn revertible(&self) -> bool {
        false
    }

    fn configure(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        ctx.assets_mut().turn += 1;
        println!("-- turn {} --", ctx.assets().turn);
        ctx.advance([Queued::factory(ChooseUnit::default)]);
        Ok(())
    }
}

#[derive(Default)]
struct ChooseUnit;

impl State<Field> for ChooseUnit {
    fn kind(&self) -> StateKind {
        StateKind::new("ChooseUnit")
    }

    fn name(&self) -> &str {
        "ChooseUnit"
    }

    fn configure(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        ctx.assets_mut().cursor_visible = true;
        Ok(())
    }

    fn update_interactions(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        if let Some(Input::Select(unit)) = next_input(ctx) {
            println!("unit {unit} selected");
            ctx.advance([Queued::instance(ChooseMove { unit })]);
        }
        Ok(())
    }
}

struct ChooseMove {
    unit: u32,
}

impl State<Field> for ChooseMove {
    fn kind(&self) -> StateKind {
        StateKind::new("ChooseMove")
    }

    fn name(&self) -> &str {
        "ChooseMove"
    }

    fn configure(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        ctx.assets_mut().cursor_visible = true;
        println!("showing move range of unit {}", self.unit);
        Ok(())
    }

    fn update_interactions(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        match next_input(ctx) {
            Some(Input::Select(tile)) => {
                let unit = self.unit;
                ctx.advance([Queued::instance(ConfirmMove { unit, tile })]);
            }
            Some(Input::Cancel) => {
                ctx.regress();
            }
            None => {}
        }
        Ok(())
    }

    fn prev(&mut self, _assets: &mut Field) {
        println!("hiding move range of unit {}", self.unit);
    }
}

struct ConfirmMove {
    unit: u32,
    tile: u32,
}

impl State<Field> for ConfirmMove {
    fn kind(&self) -> StateKind {
        StateKind::new("ConfirmMove")
    }

    fn name(&self) -> &str {
        "ConfirmMove"
    }

    fn configure(&mut self, _ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        println!("move unit {} to tile {}?", self.unit, self.tile);
        Ok(())
    }

    fn update_interactions(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        match next_input(ctx) {
            Some(Input::Select(_)) => {
                let (unit, tile) = (self.unit, self.tile);
                ctx.advance([
                    Queued::instance(ResolveMove { unit, tile }),
                    Queued::factory(TurnStart::default),
                ]);
            }
            Some(Input::Cancel) => {
                ctx.regress();
            }
            None => {}
        }
        Ok(())
    }
}

struct ResolveMove {
    unit: u32,
    tile: u32,
}

impl State<Field> for ResolveMove {
    fn kind(&self) -> StateKind {
        StateKind::new("ResolveMove")
    }

    fn name(&self) -> &str {
        "ResolveMove"
    }

    fn configure(&mut self, ctx: &mut Context<'_, Field>) -> Result<(), StateError> {
        if ctx.assets().moves.iter().any(|(_, tile)| *tile == self.tile) {
            return Err(ctx.fail_transition(format!("tile {} is occupied", self.tile)));
        }
        ctx.assets_mut().moves.push((self.unit, self.tile));
        println!("unit {} moved to tile {}", self.unit, self.tile);
        ctx.advance(Vec::new());
        Ok(())
    }
}

fn main() {
    let script = [
        Input::Select(1),
        Input::Select(7),
        Input::Cancel,
        Input::Select(8),
        Input::Select(0),
        Input::Select(2),
        Input::Select(3),
        Input::Cancel,
        Input::Cancel,
        Input::Select(3),
        Input::Select(4),
        Input::Select(0),
    ];
    let field = Field {
        inputs: script.into_iter().collect(),
        ..Field::default()
    };

    let mut machine = match ControllerBuilder::new()
        .name("Battle")
        .assets(field)
        .entry_point(Queued::factory(TurnStart::default))
        .build()
    {
        Ok(machine) => machine,
        Err(err) => {
            eprintln!("could not build controller: {err}");
            return;
        }
    };

    for _ in 0..64 {
        if let Err(err) = machine.update() {
            eprintln!("controller halted: {err}");
            break;
        }
        if machine.assets().inputs.is_empty() && !machine.is_transitioning() {
            break;
        }
    }

    println!("cursor visible: {}", machine.assets().cursor_visible);
    println!("\n{}", machine.stack_trace());
}
