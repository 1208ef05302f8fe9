//! Line-oriented command scripts.
//!
//! Each line drives one engine operation or prints part of its state, so a
//! whole interaction (clicks, drags, keys, edits, clipboard) can be replayed
//! without a window. Blank lines and lines starting with `#` are skipped.

use std::io::Write;

use cellgrid_core::{
    CellAddress, CommitDirection, Direction, EditTrigger, EngineMode, PointerModifiers,
    SelectionRect, SheetEngine,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{Result, ScriptError};
use crate::keymap::{self, KeyCombo, Keymap};

pub struct ScriptRunner<W: Write> {
    engine: SheetEngine,
    keymap: Keymap,
    out: W,
}

impl<W: Write> ScriptRunner<W> {
    pub fn new(engine: SheetEngine, keymap: Keymap, out: W) -> Self {
        ScriptRunner {
            engine,
            keymap,
            out,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Run every line, stopping at the first error.
    pub fn run_script(&mut self, text: &str) -> Result<()> {
        for (index, line) in text.lines().enumerate() {
            self.run_line(index + 1, line)?;
        }
        Ok(())
    }

    pub fn run_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let ctx = Ctx { line: line_no };
        tracing::trace!(line = line_no, command, "script command");

        match command.to_ascii_lowercase().as_str() {
            "set" => {
                let (cell, value) = match rest.split_once(char::is_whitespace) {
                    Some((cell, value)) => (cell, value.trim()),
                    None => (rest, ""),
                };
                let address = ctx.cell(cell)?;
                if self.engine.mode() == EngineMode::Edit {
                    return Err(ctx.bad("cannot set a cell while editing"));
                }
                self.engine.move_to(address, false);
                self.engine
                    .begin_edit(EditTrigger::Programmatic(Some(value.to_string())));
                self.engine.commit_edit(CommitDirection::Stay);
            }
            "select" => {
                if args.is_empty() {
                    return Err(ctx.bad("select needs at least one range"));
                }
                let rects = args
                    .iter()
                    .map(|arg| ctx.rect(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.engine.set_selection(rects[0].top_left(), &rects);
            }
            "add" => {
                let rect = ctx.rect(ctx.arg(&args, 0, "add needs a range")?)?;
                self.engine.add_selection(rect);
            }
            "move" | "extend" => {
                let direction = ctx.direction(ctx.arg(&args, 0, "missing direction")?)?;
                let steps = match args.get(1) {
                    Some(n) => n
                        .parse::<isize>()
                        .map_err(|_| ctx.bad(format!("invalid step count '{}'", n)))?,
                    None => 1,
                };
                let (rows, columns) = direction.delta();
                self.engine.move_by(
                    rows.saturating_mul(steps),
                    columns.saturating_mul(steps),
                    command.eq_ignore_ascii_case("extend"),
                );
            }
            "key" => {
                if args.is_empty() {
                    return Err(ctx.bad("key needs at least one key"));
                }
                for combo in &args {
                    let combo = combo
                        .parse::<KeyCombo>()
                        .map_err(|err| ctx.bad(err.to_string()))?;
                    self.press(combo.to_event());
                }
            }
            "type" => {
                for c in rest.chars() {
                    self.press(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
                }
            }
            "click" => {
                let address = ctx.cell(ctx.arg(&args, 0, "click needs a cell")?)?;
                let modifiers = ctx.modifiers(args.get(1).copied())?;
                let (x, y) = self.center_of(address);
                self.engine.pointer_down(x, y, modifiers);
                self.engine.pointer_up();
            }
            "drag" => {
                let from = ctx.cell(ctx.arg(&args, 0, "drag needs two cells")?)?;
                let to = ctx.cell(ctx.arg(&args, 1, "drag needs two cells")?)?;
                let modifiers = ctx.modifiers(args.get(2).copied())?;
                let (x, y) = self.center_of(from);
                self.engine.pointer_down(x, y, modifiers);
                let (x, y) = self.center_of(to);
                self.engine.pointer_move(x, y);
                self.engine.pointer_up();
            }
            "release" => self.engine.pointer_up(),
            "hover" => {
                let address = ctx.cell(ctx.arg(&args, 0, "hover needs a cell")?)?;
                let (x, y) = self.center_of(address);
                if let Some((_, text)) = self.engine.hover(x, y) {
                    writeln!(self.out, "{}", text)?;
                }
            }
            "leave" => self.engine.pointer_leave(),
            "dblclick" => {
                let address = ctx.cell(ctx.arg(&args, 0, "dblclick needs a cell")?)?;
                let (x, y) = self.center_of(address);
                self.engine.double_click(x, y);
            }
            "fill" => match args.as_slice() {
                [to] => {
                    let to = ctx.cell(to)?;
                    if self.engine.pointer_down_on_fill_handle() {
                        let (x, y) = self.center_of(to);
                        self.engine.pointer_move(x, y);
                        self.engine.pointer_up();
                    }
                }
                [source, target] => {
                    let source = ctx.cell(source)?;
                    let target = ctx.rect(target)?;
                    self.engine.fill(source, Some(target));
                }
                _ => return Err(ctx.bad("usage: fill <cell> | fill <source> <range>")),
            },
            "edit" => {
                let initial = (!rest.is_empty()).then(|| rest.to_string());
                if !self.engine.begin_edit(EditTrigger::Programmatic(initial)) {
                    return Err(ctx.bad("already editing"));
                }
            }
            "commit" => {
                let direction = match args.first() {
                    Some(dir) => ctx.commit_direction(dir)?,
                    None => CommitDirection::Down,
                };
                self.engine.commit_edit(direction);
            }
            "cancel" => {
                self.engine.cancel_edit();
            }
            "delete" => {
                self.engine.delete_selection();
            }
            "undo" => {
                self.engine.undo();
            }
            "redo" => {
                self.engine.redo();
            }
            "copy" => {
                self.engine.copy();
            }
            "cut" => {
                self.engine.cut();
            }
            "paste" => {
                self.engine.paste();
            }
            "scroll" => {
                let x = ctx.number(ctx.arg(&args, 0, "scroll needs x and y")?)?;
                let y = ctx.number(ctx.arg(&args, 1, "scroll needs x and y")?)?;
                self.engine.scroll_to(x, y);
            }
            "resize" => {
                let width = ctx.number(ctx.arg(&args, 0, "resize needs width and height")?)?;
                let height = ctx.number(ctx.arg(&args, 1, "resize needs width and height")?)?;
                self.engine.resize(width, height);
            }
            "print" => {
                let rect = ctx.rect(ctx.arg(&args, 0, "print needs a cell or range")?)?;
                for row in rect.top..=rect.bottom {
                    let values: Vec<String> = (rect.left..=rect.right)
                        .map(|column| self.engine.display_value(CellAddress::new(row, column)))
                        .collect();
                    writeln!(self.out, "{}", values.join("\t"))?;
                }
            }
            "raw" => {
                let address = ctx.cell(ctx.arg(&args, 0, "raw needs a cell")?)?;
                writeln!(self.out, "{}", self.engine.get_value(address).to_input())?;
            }
            "selection" => {
                let selection = self.engine.selection();
                let rects: Vec<String> = selection.all_rects().map(|r| r.to_string()).collect();
                writeln!(self.out, "{} {}", selection.active_cell(), rects.join(","))?;
            }
            "clipboard" => {
                let text = self.engine.clipboard_text().unwrap_or_default();
                writeln!(self.out, "{}", text)?;
            }
            "visible" => {
                let range = self.engine.visible_range();
                writeln!(
                    self.out,
                    "rows {}-{} columns {}-{}",
                    range.rows.start(),
                    range.rows.end(),
                    range.columns.start(),
                    range.columns.end()
                )?;
            }
            "mode" => {
                let mode = match self.engine.mode() {
                    EngineMode::Navigate => "navigate".to_string(),
                    EngineMode::Edit => {
                        format!("edit {}", self.engine.edit_buffer().unwrap_or_default())
                    }
                };
                writeln!(self.out, "{}", mode.trim_end())?;
            }
            other => {
                return Err(ScriptError::UnknownCommand {
                    line: line_no,
                    command: other.to_string(),
                });
            }
        }
        Ok(())
    }

    fn press(&mut self, key: KeyEvent) {
        match keymap::translate(&self.keymap, self.engine.mode(), key) {
            Some(action) => {
                self.engine.dispatch(action);
            }
            None => tracing::debug!(?key, keymap = self.keymap.name(), "unbound key"),
        }
    }

    /// Bring `address` on screen and return the centre of its rect.
    fn center_of(&mut self, address: CellAddress) -> (f32, f32) {
        self.engine.scroll_into_view(address);
        let rect = self.engine.cell_rect(address);
        (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }
}

/// Argument parsing for one script line.
struct Ctx {
    line: usize,
}

impl Ctx {
    fn bad(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::BadArgument {
            line: self.line,
            message: message.into(),
        }
    }

    fn arg<'a>(&self, args: &[&'a str], index: usize, missing: &str) -> Result<&'a str> {
        args.get(index).copied().ok_or_else(|| self.bad(missing))
    }

    fn cell(&self, input: &str) -> Result<CellAddress> {
        input.parse::<CellAddress>().map_err(|err| self.bad(err))
    }

    fn rect(&self, input: &str) -> Result<SelectionRect> {
        input.parse::<SelectionRect>().map_err(|err| self.bad(err))
    }

    fn number(&self, input: &str) -> Result<f32> {
        input
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.bad(format!("invalid number '{}'", input)))
    }

    fn direction(&self, input: &str) -> Result<Direction> {
        match input.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(self.bad(format!("invalid direction '{}'", input))),
        }
    }

    fn commit_direction(&self, input: &str) -> Result<CommitDirection> {
        match input.to_ascii_lowercase().as_str() {
            "up" => Ok(CommitDirection::Up),
            "down" => Ok(CommitDirection::Down),
            "left" => Ok(CommitDirection::Left),
            "right" => Ok(CommitDirection::Right),
            "stay" => Ok(CommitDirection::Stay),
            _ => Err(self.bad(format!("invalid commit direction '{}'", input))),
        }
    }

    fn modifiers(&self, input: Option<&str>) -> Result<PointerModifiers> {
        match input.map(|s| s.to_ascii_lowercase()).as_deref() {
            None => Ok(PointerModifiers::NONE),
            Some("shift") => Ok(PointerModifiers::SHIFT),
            Some("ctrl") => Ok(PointerModifiers::CTRL),
            Some(other) => Err(self.bad(format!("invalid modifier '{}'", other))),
        }
    }
}
