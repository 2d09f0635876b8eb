//! Editing scripts: one command per line, replayed against a session.
//!
//! Time only moves on `wait` and `hold`, so a script replays the same way
//! every run.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use nodegraph_core::history::{Clock, ManualClock, StepOutcome};
use nodegraph_core::{EditorSession, Graph, KeyCombo, NodeId};

/// Interval between synthetic auto-repeat key-downs during `hold`.
const AUTOREPEAT_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Add { kind: String, pos: [f32; 2] },
    Move { id: NodeId, delta: [f32; 2] },
    Drag { delta: [f32; 2], ids: Vec<NodeId> },
    Connect { from: NodeId, to: NodeId },
    Disconnect { from: NodeId, to: NodeId },
    Remove { id: NodeId },
    Rename { id: NodeId, title: String },
    Wait(Duration),
    Undo,
    Redo,
    Key(KeyCombo),
    Hold { combo: KeyCombo, duration: Duration },
    Reset,
    Load(PathBuf),
    Save(PathBuf),
    Print,
}

/// A parsed step and the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub step: Step,
}

/// Parses a whole script. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns an error naming the first line that fails to parse.
pub fn parse_script(text: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }
        let step = parse_step(content).with_context(|| format!("line {number}: '{content}'"))?;
        lines.push(Line { number, step });
    }
    Ok(lines)
}

/// Cuts a `#` comment. A `#` directly followed by text is a node id.
fn strip_comment(line: &str) -> &str {
    let mut chars = line.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        if c == '#' && chars.peek().map_or(true, |(_, next)| next.is_whitespace()) {
            return &line[..index];
        }
    }
    line
}

fn parse_step(line: &str) -> Result<Step> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = words.split_first().context("Empty command")?;

    let step = match (*command, args) {
        ("add", [kind, x, y]) => Step::Add {
            kind: kind.to_string(),
            pos: [number(x)?, number(y)?],
        },
        ("move", [id, dx, dy]) => Step::Move {
            id: node_id(id)?,
            delta: [number(dx)?, number(dy)?],
        },
        ("drag", [dx, dy, ids @ ..]) if !ids.is_empty() => Step::Drag {
            delta: [number(dx)?, number(dy)?],
            ids: ids.iter().map(|id| node_id(id)).collect::<Result<_>>()?,
        },
        ("connect", [from, to]) => Step::Connect {
            from: node_id(from)?,
            to: node_id(to)?,
        },
        ("disconnect", [from, to]) => Step::Disconnect {
            from: node_id(from)?,
            to: node_id(to)?,
        },
        ("remove", [id]) => Step::Remove { id: node_id(id)? },
        ("rename", [id, title @ ..]) if !title.is_empty() => Step::Rename {
            id: node_id(id)?,
            title: title.join(" "),
        },
        ("wait", [ms]) => Step::Wait(millis(ms)?),
        ("undo", []) => Step::Undo,
        ("redo", []) => Step::Redo,
        ("key", [combo]) => Step::Key(combo.parse()?),
        ("hold", [combo, ms]) => Step::Hold {
            combo: combo.parse()?,
            duration: millis(ms)?,
        },
        ("reset", []) => Step::Reset,
        ("load", [path]) => Step::Load(PathBuf::from(path)),
        ("save", [path]) => Step::Save(PathBuf::from(path)),
        ("print", []) => Step::Print,
        (
            "add" | "move" | "drag" | "connect" | "disconnect" | "remove" | "rename" | "wait"
            | "undo" | "redo" | "key" | "hold" | "reset" | "load" | "save" | "print",
            _,
        ) => bail!("Wrong arguments for '{command}'"),
        _ => bail!("Unknown command '{command}'"),
    };
    Ok(step)
}

fn number(text: &str) -> Result<f32> {
    let value = f32::from_str(text).with_context(|| format!("'{text}' is not a number"))?;
    if !value.is_finite() {
        bail!("'{text}' is not a finite number");
    }
    Ok(value)
}

fn millis(text: &str) -> Result<Duration> {
    let ms = u64::from_str(text).with_context(|| format!("'{text}' is not a duration in ms"))?;
    Ok(Duration::from_millis(ms))
}

/// Accepts `3` or `#3`.
fn node_id(text: &str) -> Result<NodeId> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    let id = u64::from_str(digits).with_context(|| format!("'{text}' is not a node id"))?;
    Ok(NodeId(id))
}

/// Replays parsed steps, writing a line of output for each visible effect.
///
/// # Errors
///
/// Stops at the first step that fails, naming its line.
pub fn run_script<W: Write>(
    session: &mut EditorSession<ManualClock>,
    clock: &ManualClock,
    lines: &[Line],
    out: &mut W,
) -> Result<()> {
    for line in lines {
        run_step(session, clock, &line.step, out)
            .with_context(|| format!("line {}", line.number))?;
    }
    Ok(())
}

fn run_step<W: Write>(
    session: &mut EditorSession<ManualClock>,
    clock: &ManualClock,
    step: &Step,
    out: &mut W,
) -> Result<()> {
    match step {
        Step::Add { kind, pos } => {
            let id = session.add_node(kind, *pos)?;
            writeln!(out, "added {id} {kind}")?;
        }
        Step::Move { id, delta } => session.move_node(*id, *delta)?,
        Step::Drag { delta, ids } => session.drag(ids, *delta)?,
        Step::Connect { from, to } => session.connect(*from, *to)?,
        Step::Disconnect { from, to } => session.disconnect(*from, *to)?,
        Step::Remove { id } => session.remove_node(*id)?,
        Step::Rename { id, title } => session.rename_node(*id, title)?,
        Step::Wait(duration) => clock.advance(*duration),
        Step::Undo => {
            let outcome = session.undo();
            report(out, "undo", outcome)?;
        }
        Step::Redo => {
            let outcome = session.redo();
            report(out, "redo", outcome)?;
        }
        Step::Key(combo) => {
            press(session, combo, out)?;
            session.key_up(&combo.key);
        }
        Step::Hold { combo, duration } => {
            let end = clock.now() + *duration;
            while clock.now() < end {
                press(session, combo, out)?;
                clock.advance(AUTOREPEAT_INTERVAL);
            }
            session.key_up(&combo.key);
        }
        Step::Reset => session.load_document(Graph::new()),
        Step::Load(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read graph from {}", path.display()))?;
            session.load_document(Graph::from_json(&json)?);
            writeln!(out, "loaded {}", path.display())?;
        }
        Step::Save(path) => {
            std::fs::write(path, session.graph().to_json()?)
                .with_context(|| format!("Failed to write graph to {}", path.display()))?;
            writeln!(out, "saved {}", path.display())?;
        }
        Step::Print => print_session(session, out)?,
    }
    Ok(())
}

fn press<W: Write>(
    session: &mut EditorSession<ManualClock>,
    combo: &KeyCombo,
    out: &mut W,
) -> Result<()> {
    if let Some((command, outcome)) = session.key_down(combo) {
        report(out, &format!("{combo} -> {command}"), outcome)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, label: &str, outcome: StepOutcome) -> Result<()> {
    let text = match outcome {
        StepOutcome::Restored => "ok".to_string(),
        StepOutcome::Empty(direction) => format!("nothing to {direction}"),
        StepOutcome::Disabled => "paused".to_string(),
        StepOutcome::RestoreFailed => "failed".to_string(),
    };
    writeln!(out, "{label}: {text}")?;
    Ok(())
}

fn print_session<W: Write>(session: &EditorSession<ManualClock>, out: &mut W) -> Result<()> {
    let graph = session.graph();
    for node in graph.nodes() {
        writeln!(
            out,
            "node {} {} \"{}\" at ({}, {})",
            node.id, node.kind, node.title, node.pos[0], node.pos[1]
        )?;
    }
    for link in graph.links() {
        writeln!(out, "link {} -> {}", link.from, link.to)?;
    }
    let history = session.history();
    writeln!(
        out,
        "history undo={} redo={}",
        history.undo_len(),
        history.redo_len()
    )?;
    Ok(())
}
