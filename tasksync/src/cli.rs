//! Command-line front end.
//!
//! Each subcommand loads the collection, performs at most one mutation,
//! waits for every response to be reconciled, then prints one window of the
//! resulting list. All changes go through [`TaskSync`], so the printed list
//! is always what the service confirmed.

use std::io::Write;

use chrono::NaiveDate;
use tasksync_proto::{MoveDirection, Priority, Task, TaskId};

use crate::config::ClientConfig;
use crate::edit::{FieldEdit, FormError, TaskForm};
use crate::filter::FilterKind;
use crate::gateway::TaskGateway;
use crate::store::TaskSync;
use crate::window::{ItemRenderer, Viewport};

/// Subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one page of tasks.
    List(ListArgs),
    /// Create a task at the end of the list.
    Add(AddArgs),
    /// Change fields of an existing task.
    Edit(EditArgs),
    /// Delete a task.
    Delete {
        /// Task id.
        id: TaskId,
    },
    /// Flip a task between open and done.
    Toggle {
        /// Task id.
        id: TaskId,
    },
    /// Swap a task with its neighbour in the full list.
    Move {
        /// Task id.
        id: TaskId,
        /// `up` or `down`.
        direction: MoveDirection,
        /// Filter the list is being viewed under.
        #[arg(long)]
        filter: Option<FilterKind>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::List(ListArgs::default())
    }
}

/// Arguments for `list`.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// all, active, completed, low, medium, high, or priority=<p>.
    #[arg(long)]
    pub filter: Option<FilterKind>,
    /// First row to show, counted within the filtered list.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Rows to show; overrides the configured window size.
    #[arg(long)]
    pub window: Option<usize>,
}

/// Arguments for `add`.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Task description.
    pub text: String,
    /// low, medium, or high.
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Due date as `YYYY-MM-DD`.
    #[arg(long)]
    pub due: Option<NaiveDate>,
    /// Create the task already done.
    #[arg(long)]
    pub completed: bool,
}

/// Arguments for `edit`.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    /// Task id.
    pub id: TaskId,
    /// New description.
    #[arg(long)]
    pub text: Option<String>,
    /// New priority.
    #[arg(long)]
    pub priority: Option<Priority>,
    /// New due date as `YYYY-MM-DD`.
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    /// Remove the due date.
    #[arg(long)]
    pub clear_due: bool,
    /// Set the completion flag.
    #[arg(long)]
    pub completed: Option<bool>,
}

/// Errors that end a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The service rejected a request or could not be reached.
    #[error("task service error: {0}")]
    Gateway(String),

    /// The form did not validate.
    #[error(transparent)]
    Form(#[from] FormError),

    /// No task with that id was loaded.
    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one command against `gateway`, writing the result to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when the service reports a failure, the form input
/// is invalid, or `out` cannot be written.
pub async fn run<G, W>(
    command: Command,
    config: &ClientConfig,
    gateway: G,
    out: &mut W,
) -> Result<(), CliError>
where
    G: TaskGateway + 'static,
    W: Write,
{
    let mut sync = TaskSync::new(gateway);
    sync.initialize();
    settle(&mut sync).await?;

    let mut filter = config.default_filter;
    let mut offset = 0;
    let mut window_size = config.window_size;

    match command {
        Command::List(args) => {
            filter = args.filter.unwrap_or(filter);
            offset = args.offset;
            window_size = args.window.map_or(window_size, |n| n.max(1));
        }
        Command::Add(args) => {
            let mut form = TaskForm::new().with_max_text_len(config.max_text_len);
            form.apply(FieldEdit::Text(args.text));
            if let Some(priority) = args.priority {
                form.apply(FieldEdit::Priority(priority));
            }
            form.apply(FieldEdit::DueDate(args.due));
            form.apply(FieldEdit::Completed(args.completed));
            sync.create(form.to_draft()?);
            settle(&mut sync).await?;
            if let Some(task) = sync.tasks().last() {
                writeln!(out, "added #{}", task.id)?;
            }
        }
        Command::Edit(args) => {
            let task = sync
                .store()
                .get(args.id)
                .ok_or(CliError::UnknownTask(args.id))?;
            let mut form = TaskForm::for_task(task).with_max_text_len(config.max_text_len);
            if let Some(text) = args.text {
                form.apply(FieldEdit::Text(text));
            }
            if let Some(priority) = args.priority {
                form.apply(FieldEdit::Priority(priority));
            }
            if args.clear_due {
                form.apply(FieldEdit::DueDate(None));
            } else if let Some(due) = args.due {
                form.apply(FieldEdit::DueDate(Some(due)));
            }
            if let Some(completed) = args.completed {
                form.apply(FieldEdit::Completed(completed));
            }
            sync.update(form.to_task(args.id)?);
            settle(&mut sync).await?;
            writeln!(out, "updated #{}", args.id)?;
        }
        Command::Delete { id } => {
            sync.remove(id);
            settle(&mut sync).await?;
            writeln!(out, "deleted #{id}")?;
        }
        Command::Toggle { id } => {
            sync.toggle_completion(id);
            settle(&mut sync).await?;
            if let Some(task) = sync.store().get(id) {
                let state = if task.completed { "done" } else { "open" };
                writeln!(out, "#{id} is now {state}")?;
            }
        }
        Command::Move {
            id,
            direction,
            filter: view_filter,
        } => {
            if sync.store().get(id).is_none() {
                return Err(CliError::UnknownTask(id));
            }
            filter = view_filter.unwrap_or(filter);
            if sync.store().can_move(id, direction) {
                let view = sync.view(filter);
                if view
                    .position_of(id)
                    .is_some_and(|position| view.move_skips_hidden(position, direction))
                {
                    writeln!(
                        out,
                        "note: #{id} swaps with a task hidden by filter {filter}"
                    )?;
                }
                sync.move_task(id, direction);
                settle(&mut sync).await?;
                writeln!(out, "moved #{id} {direction}")?;
            } else {
                let edge = match direction {
                    MoveDirection::Up => "top",
                    MoveDirection::Down => "bottom",
                };
                writeln!(out, "#{id} is already at the {edge}")?;
            }
        }
    }

    print_window(&sync, filter, offset, window_size, out)?;
    Ok(())
}

async fn settle<G>(sync: &mut TaskSync<G>) -> Result<(), CliError> {
    for (request, effect) in sync.settle().await {
        tracing::debug!(%request, ?effect, "reconciled");
    }
    match sync.store().last_error() {
        Some(error) => Err(CliError::Gateway(error.to_string())),
        None => Ok(()),
    }
}

fn print_window<G, W: Write>(
    sync: &TaskSync<G>,
    filter: FilterKind,
    offset: usize,
    size: usize,
    out: &mut W,
) -> std::io::Result<()> {
    let view = sync.view(filter);
    if view.is_empty() {
        if view.is_empty_collection() && filter == FilterKind::All {
            writeln!(out, "No tasks found. Add one with `tasksync add <text>`.")?;
        } else {
            writeln!(out, "No tasks match filter {filter}.")?;
        }
        return Ok(());
    }

    let mut renderer = LineRenderer::default();
    let range = Viewport::at(offset).present(&view, size, &mut renderer);
    for line in &renderer.lines {
        writeln!(out, "{line}")?;
    }
    writeln!(
        out,
        "-- {}-{} of {} ({filter})",
        range.start + 1,
        range.end,
        view.len()
    )
}

/// Formats each visible row as one line of text.
#[derive(Debug, Default)]
struct LineRenderer {
    lines: Vec<String>,
}

impl ItemRenderer for LineRenderer {
    fn render_item(&mut self, offset: usize, task: &Task) {
        let mark = if task.completed { 'x' } else { ' ' };
        let due = task
            .due_date
            .map(|due| format!("  (due {due})"))
            .unwrap_or_default();
        self.lines.push(format!(
            "{:>3}. [{mark}] #{:<4} {:<6} {}{due}",
            offset + 1,
            task.id,
            task.priority,
            task.text
        ));
    }
}
