use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    AnswerOutcome, CardAction, CrudController, CrudOutcome, EntityRef, HttpCourseApi,
    LabFeedback, LabStepChecker, OptionMark, QuizBoard, QuizListPoller, QuizRunner,
    ReorderBoard, ReorderScope, SessionValidator, SubmoduleParent, SyncMode, SystemClock,
    ValidationOutcome,
};
use shared::{
    domain::{
        ContentId, ContentType, ItemId, ModuleId, QuizId, SessionId, StepId, SubmoduleId,
    },
    protocol::ReviewQuestion,
};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal_host;

use terminal_host::{PrintingBoard, TerminalHost};

#[derive(Parser, Debug)]
#[command(name = "coursectl", about = "Course dashboard and learner pages on the terminal")]
struct Cli {
    #[arg(long, default_value = "coursectl.toml")]
    config: PathBuf,
    /// Overrides the configured server URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drag a list from one order to another.
    Reorder {
        #[arg(value_enum)]
        list: ListKind,
        /// Owning module (submodules) or submodule (nested submodules, items).
        #[arg(long)]
        owner: Option<i64>,
        /// The submodule list hangs under another submodule.
        #[arg(long)]
        nested: bool,
        #[arg(long, value_delimiter = ',', required = true)]
        from: Vec<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,
        /// Sync as soon as the drag ends instead of waiting for save.
        #[arg(long)]
        immediate: bool,
    },
    CreateModule {
        title: String,
    },
    CreateSubmodule {
        title: String,
        #[arg(long, conflicts_with = "parent", required_unless_present = "parent")]
        module: Option<i64>,
        #[arg(long)]
        parent: Option<i64>,
    },
    CreateItem {
        #[arg(long)]
        submodule: i64,
        #[arg(long)]
        content_type: Option<ContentType>,
        #[arg(long)]
        content_id: Option<i64>,
    },
    ListContent {
        content_type: ContentType,
    },
    Rename {
        #[arg(value_enum)]
        kind: EntityArg,
        id: i64,
        title: String,
    },
    Duplicate {
        #[arg(value_enum)]
        kind: EntityArg,
        id: i64,
    },
    Delete {
        #[arg(value_enum)]
        kind: EntityArg,
        id: i64,
    },
    Unlink {
        item_id: i64,
    },
    DeleteContent {
        content_type: ContentType,
        id: i64,
    },
    TogglePublish {
        #[arg(value_enum)]
        kind: EntityArg,
        id: i64,
        /// The entity currently shows as published.
        #[arg(long)]
        published: bool,
    },
    /// Show the learner's quiz list; `--watch` keeps locked quizzes counting down.
    Quizzes {
        #[arg(long)]
        watch: bool,
    },
    /// Take a quiz interactively from a JSON file of review questions.
    TakeQuiz {
        quiz_id: i64,
        #[arg(long)]
        questions: PathBuf,
    },
    ValidateSession {
        session_id: i64,
        #[arg(long)]
        requirements: usize,
        #[arg(long)]
        code_file: PathBuf,
    },
    LabStep {
        step_id: i64,
        input: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Modules,
    Submodules,
    Items,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EntityArg {
    Module,
    Submodule,
    Item,
}

impl EntityArg {
    fn with_id(self, id: i64) -> EntityRef {
        match self {
            Self::Module => EntityRef::Module(ModuleId(id)),
            Self::Submodule => EntityRef::Submodule(SubmoduleId(id)),
            Self::Item => EntityRef::Item(ItemId(id)),
        }
    }
}

fn reorder_scope(list: ListKind, owner: Option<i64>, nested: bool) -> Result<ReorderScope> {
    match (list, owner, nested) {
        (ListKind::Modules, None, false) => Ok(ReorderScope::Modules),
        (ListKind::Modules, _, _) => bail!("the module list has no owner"),
        (ListKind::Submodules, Some(id), false) => {
            Ok(ReorderScope::SubmodulesOfModule(ModuleId(id)))
        }
        (ListKind::Submodules, Some(id), true) => {
            Ok(ReorderScope::SubmodulesOfParent(SubmoduleId(id)))
        }
        (ListKind::Items, Some(id), false) => Ok(ReorderScope::ItemsOfSubmodule(SubmoduleId(id))),
        (ListKind::Items, Some(_), true) => bail!("--nested only applies to submodule lists"),
        (_, None, _) => bail!("--owner is required for {list:?}"),
    }
}

fn print_board(board: &QuizBoard) {
    if let Some(notice) = &board.notice {
        println!("{notice}");
    }
    for card in &board.cards {
        let action = match &card.action {
            CardAction::Completed => "Completed".to_string(),
            CardAction::Locked { label } => label.clone(),
            CardAction::Start { href } => format!("Start Quiz ({href})"),
            CardAction::Retry { href } => format!("Retry Quiz ({href})"),
        };
        println!("[{}] {}\n    {}\n    {action}", card.button_id, card.title, card.blurb);
    }
}

fn prompt_choice(question: &ReviewQuestion) -> Result<usize> {
    if question.options.is_empty() {
        bail!("question {} has no options to choose from", question.id);
    }
    println!("\n{}", question.text);
    for (n, option) in question.options.iter().enumerate() {
        println!("  {}) {}", n + 1, option.text);
    }
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("input closed before the quiz was finished");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => return Ok(n - 1),
            _ => println!("Pick a number between 1 and {}.", question.options.len()),
        }
    }
}

fn report_crud(outcome: CrudOutcome) -> Result<()> {
    match outcome {
        CrudOutcome::Applied => Ok(()),
        CrudOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        CrudOutcome::Rejected(message) | CrudOutcome::Failed(message) => bail!(message),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings(&cli.config)?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let api = Arc::new(
        HttpCourseApi::with_timeout(&settings.server_url, settings.request_timeout())
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?,
    );
    let host = Arc::new(TerminalHost::new(cli.yes));
    let crud = CrudController::new(api.clone(), host.clone());

    match cli.command {
        Command::Reorder {
            list,
            owner,
            nested,
            from,
            to,
            immediate,
        } => {
            let scope = reorder_scope(list, owner, nested)?;
            let mode = if immediate {
                SyncMode::Immediate
            } else {
                SyncMode::ExplicitSave
            };
            let mut board = ReorderBoard::new(api, host);
            board.capture(scope, mode, from);
            let mut outcome = board.on_drag_end(scope, to).await;
            if mode == SyncMode::ExplicitSave {
                outcome = board.save(scope).await;
            }
            println!("{scope}: {outcome:?}");
        }
        Command::CreateModule { title } => report_crud(crud.create_module(&title).await)?,
        Command::CreateSubmodule {
            title,
            module,
            parent,
        } => {
            let parent = match (module, parent) {
                (Some(id), _) => SubmoduleParent::Module(ModuleId(id)),
                (None, Some(id)) => SubmoduleParent::Submodule(SubmoduleId(id)),
                (None, None) => bail!("either --module or --parent is required"),
            };
            report_crud(crud.create_submodule(&title, parent).await)?;
        }
        Command::CreateItem {
            submodule,
            content_type,
            content_id,
        } => report_crud(
            crud.create_item(SubmoduleId(submodule), content_type, content_id.map(ContentId))
                .await,
        )?,
        Command::ListContent { content_type } => {
            for item in crud.list_content(content_type).await? {
                println!("{}\t{}", item.id, item.title);
            }
        }
        Command::Rename { kind, id, title } => {
            report_crud(crud.rename(kind.with_id(id), &title).await)?
        }
        Command::Duplicate { kind, id } => report_crud(crud.duplicate(kind.with_id(id)).await)?,
        Command::Delete { kind, id } => report_crud(crud.delete(kind.with_id(id)).await)?,
        Command::Unlink { item_id } => report_crud(crud.unlink_item(ItemId(item_id)).await)?,
        Command::DeleteContent { content_type, id } => {
            report_crud(crud.delete_content(content_type, ContentId(id)).await)?
        }
        Command::TogglePublish {
            kind,
            id,
            published,
        } => report_crud(crud.toggle_publish(kind.with_id(id), published).await)?,
        Command::Quizzes { watch } => {
            let mut poller = QuizListPoller::new(api).with_tick(settings.countdown_tick());
            let board = poller.load().await;
            print_board(&board);
            if watch && poller.active_countdowns() > 0 {
                let mut surface = PrintingBoard { board };
                poller.run(&mut surface, &SystemClock).await;
            }
        }
        Command::TakeQuiz { quiz_id, questions } => {
            let raw = fs::read_to_string(&questions)
                .with_context(|| format!("failed to read '{}'", questions.display()))?;
            let questions: Vec<ReviewQuestion> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid question file '{}'", questions.display()))?;
            let mut runner = QuizRunner::new(QuizId(quiz_id), questions.clone(), api, host);

            for question in &questions {
                let choice = prompt_choice(question)?;
                let option_id = question.options[choice].id;
                match runner.select_option(question.id, option_id).await? {
                    AnswerOutcome::Correct => println!("Correct!"),
                    AnswerOutcome::Incorrect { correct_option_id } => {
                        let answer = question
                            .options
                            .iter()
                            .find(|option| option.id == correct_option_id)
                            .map(|option| option.text.as_str())
                            .unwrap_or("?");
                        println!("Incorrect. The answer was: {answer}");
                    }
                    AnswerOutcome::AlreadyAnswered => {}
                }
                println!("Progress: {}", runner.progress().label());
            }

            let result = runner.submit().await?;
            println!("\n{}\n{}", result.summary(), result.verdict.feedback());
            for card in runner.review()? {
                println!("\n{}", card.text);
                for line in card.lines {
                    let mark = match line.mark {
                        OptionMark::Correct => "+",
                        OptionMark::WrongSelection => "x",
                        OptionMark::Plain => " ",
                    };
                    let chosen = if line.selected { " (your answer)" } else { "" };
                    println!("  [{mark}] {}{chosen}", line.text);
                }
            }
        }
        Command::ValidateSession {
            session_id,
            requirements,
            code_file,
        } => {
            let code = fs::read_to_string(&code_file)
                .with_context(|| format!("failed to read '{}'", code_file.display()))?;
            let mut validator =
                SessionValidator::new(SessionId(session_id), requirements, api, host)
                    .with_redirect_delay(settings.redirect_delay());
            let outcome = validator.check(&code).await?;
            for (n, status) in validator.checklist().iter().enumerate() {
                println!("requirement {}: {status:?}", n + 1);
            }
            if let ValidationOutcome::Incomplete { passed, total } = outcome {
                println!("{passed} of {total} requirements met.");
            }
        }
        Command::LabStep { step_id, input } => {
            let mut checker = LabStepChecker::new(StepId(step_id), api, host);
            if let LabFeedback::Incorrect { message } = checker.check(&input).await? {
                println!("{message}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
