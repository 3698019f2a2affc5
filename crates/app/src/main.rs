use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use najah_core::Clock;
use najah_core::model::{
    AssignmentId, CorrectionResult, CursorAction, QuizAssignment, QuizQuestion, UserId,
};
use services::notifications::DEFAULT_NOTICE_CAPACITY;
use services::{
    ApiConfig, AssignmentBoard, AuthContext, BoardService, HttpQuizApi, NoticeLevel,
    NoticeReceiver, QuizApi, QuizSession, SessionController, SessionError, ToastTray,
    notice_channel,
};
use storage::{DraftRepository, Storage};

const DEFAULT_STORE_PATH: &str = "najah-quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStudentId { raw: String },
    InvalidAssignmentId { raw: String },
    MissingStudent,
    MissingAssignment,
    UnknownAssignment(AssignmentId),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStudentId { raw } => write!(f, "invalid --student value: {raw}"),
            ArgsError::InvalidAssignmentId { raw } => {
                write!(f, "invalid --assignment value: {raw}")
            }
            ArgsError::MissingStudent => {
                write!(f, "a student id is required (--student or NAJAH_STUDENT_ID)")
            }
            ArgsError::MissingAssignment => write!(f, "take requires --assignment <id>"),
            ArgsError::UnknownAssignment(id) => {
                write!(f, "assignment {id} is not assigned to this student")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  najah-quiz list [--student <id>] [--store <path>]");
    eprintln!("  najah-quiz take --assignment <id> [--student <id>] [--store <path>]");
    eprintln!();
    eprintln!("While taking a quiz:");
    eprintln!("  <n>     pick choice n (or type a free-text answer)");
    eprintln!("  :n :p   next / previous question");
    eprintln!("  :s      submit");
    eprintln!("  :q      quit (answers stay saved on this device)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NAJAH_STUDENT_ID, NAJAH_STORE_PATH (default {DEFAULT_STORE_PATH})");
    eprintln!("  NAJAH_API_BASE_URL, NAJAH_API_TIMEOUT_SECS, NAJAH_API_TOKEN");
    eprintln!("  RUST_LOG (e.g. RUST_LOG=debug)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Take,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "take" => Some(Self::Take),
            _ => None,
        }
    }
}

struct Args {
    command: Command,
    student: UserId,
    assignment: Option<AssignmentId>,
    store: PathBuf,
}

impl Args {
    fn parse(command: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut student = match std::env::var("NAJAH_STUDENT_ID") {
            Ok(raw) => Some(
                raw.parse::<UserId>()
                    .map_err(|_| ArgsError::InvalidStudentId { raw })?,
            ),
            Err(_) => None,
        };
        let mut store = std::env::var("NAJAH_STORE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);
        let mut assignment = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--student" => {
                    let value = require_value(args, "--student")?;
                    student = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidStudentId { raw: value.clone() })?,
                    );
                }
                "--assignment" => {
                    let value = require_value(args, "--assignment")?;
                    assignment = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidAssignmentId { raw: value.clone() })?,
                    );
                }
                "--store" => store = PathBuf::from(require_value(args, "--store")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let student = student.ok_or(ArgsError::MissingStudent)?;
        if command == Command::Take && assignment.is_none() {
            return Err(ArgsError::MissingAssignment);
        }
        Ok(Self {
            command,
            student,
            assignment,
            store,
        })
    }
}

//
// ─── OUTPUT ────────────────────────────────────────────────────────────────────
//

fn flush_toasts(tray: &mut ToastTray, notices: &mut NoticeReceiver) {
    tray.collect(notices);
    for toast in tray.drain_visible() {
        let tag = match toast.notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "erreur",
        };
        eprintln!("[{tag}] {}", toast.notice.message);
    }
}

fn print_board(board: &AssignmentBoard, drafts: &DraftRepository, student: UserId) {
    let now = Clock::system().now();
    let rows = board.rows(drafts, student, None);
    if rows.is_empty() {
        println!("Aucun quiz assigné.");
        return;
    }
    for row in rows {
        let score = row
            .result
            .as_ref()
            .map(|r| format!("  {:.0}%", r.percentage))
            .unwrap_or_default();
        let overdue = if !row.status.is_done() && row.assignment.is_overdue(now) {
            "  (en retard)"
        } else {
            ""
        };
        println!(
            "{:>5}  {:<36} {}{score}{overdue}",
            row.assignment.id.value(),
            row.assignment.title,
            row.status
        );
    }
}

fn print_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();
    let current = session.answers().get(question.id());

    println!();
    println!(
        "Question {}/{} ({} répondues)",
        progress.current + 1,
        progress.total,
        progress.answered
    );
    println!("{}", question.text());
    for (i, choice) in question.choices().iter().enumerate() {
        let mark = if current == Some(choice.as_str()) { '*' } else { ' ' };
        println!(" {mark} {}. {choice}", i + 1);
    }
    if !question.kind().is_closed() {
        if let Some(answer) = current {
            println!("   Réponse : {answer}");
        }
    }
    if session.primary_action() == CursorAction::Submit {
        println!("(:s pour soumettre)");
    }
}

fn print_correction(correction: &CorrectionResult) {
    println!();
    println!(
        "Score : {}/{} ({:.1}%), {}/{} bonnes réponses",
        correction.score,
        correction.max_score,
        correction.percentage,
        correction.correct_count(),
        correction.total_questions()
    );
    for item in &correction.corrections {
        let mark = if item.is_correct { "✓" } else { "✗" };
        println!("{mark} {}", item.question);
        if !item.is_correct {
            println!("    votre réponse : {}", item.student_answer);
            println!("    bonne réponse : {}", item.correct_answer);
        }
    }
}

/// Map a choice number to its text for closed questions; anything else is taken as typed.
fn resolve_choice(question: Option<&QuizQuestion>, raw: &str) -> String {
    question
        .filter(|q| q.kind().is_closed())
        .and_then(|q| {
            let n = raw.parse::<usize>().ok()?;
            q.choices().get(n.checked_sub(1)?).cloned()
        })
        .unwrap_or_else(|| raw.to_string())
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn take_quiz(
    controller: &SessionController,
    assignment: QuizAssignment,
    board: &AssignmentBoard,
    tray: &mut ToastTray,
    notices: &mut NoticeReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = controller.open(assignment);
    println!("{} ({})", session.assignment().title, controller.status(&session, board.records()));

    let started = controller.start(&mut session).await;
    flush_toasts(tray, notices);
    started?;

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print_question(&session);
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        match input.trim() {
            "" => {}
            ":q" => break,
            ":n" => {
                session.next();
            }
            ":p" => {
                session.previous();
            }
            ":s" => match controller.submit(&mut session, board.records()).await {
                Ok(correction) => {
                    flush_toasts(tray, notices);
                    print_correction(&correction);
                    break;
                }
                Err(SessionError::SubmissionFailed(err)) => {
                    eprintln!("{err}");
                    session.recover();
                }
                Err(SessionError::AlreadyCompleted) => {
                    flush_toasts(tray, notices);
                    break;
                }
                Err(err) => eprintln!("{err}"),
            },
            raw => {
                let value = resolve_choice(session.current_question(), raw);
                match controller.answer_current(&mut session, value) {
                    Ok(()) => {
                        session.next();
                    }
                    Err(err) => eprintln!("{err}"),
                }
            }
        }
        flush_toasts(tray, notices);
    }

    session.return_to_list();
    flush_toasts(tray, notices);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    let first = argv.peek().cloned();
    let command = match first.as_deref() {
        None => Command::List,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::List,
        Some(first) => {
            let command = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            command
        }
    };

    let args = Args::parse(command, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = ApiConfig::from_env()?;
    let mut auth = AuthContext::new(args.student);
    if let Ok(token) = std::env::var("NAJAH_API_TOKEN") {
        auth = auth.with_token(token);
    }
    let api: Arc<dyn QuizApi> = Arc::new(HttpQuizApi::new(&config, &auth)?);
    let storage = Storage::sqlite(&args.store)?;
    let drafts = DraftRepository::new(Arc::clone(&storage.kv));
    info!(
        "student {} against {} (drafts in {})",
        args.student,
        config.base_url(),
        args.store.display()
    );

    let (notifier, mut notices) = notice_channel(DEFAULT_NOTICE_CAPACITY);
    let mut tray = ToastTray::new(Clock::system());
    let boards = BoardService::new(auth.clone(), Arc::clone(&api), notifier.clone());

    let loaded = boards.load().await;
    flush_toasts(&mut tray, &mut notices);
    let board = loaded?;

    match args.command {
        Command::List => {
            print_board(&board, &drafts, args.student);
            Ok(())
        }
        Command::Take => {
            let id = args.assignment.ok_or(ArgsError::MissingAssignment)?;
            let assignment = board
                .find(id)
                .cloned()
                .ok_or(ArgsError::UnknownAssignment(id))?;
            let controller = SessionController::new(auth, api, drafts, notifier);
            take_quiz(&controller, assignment, &board, &mut tray, &mut notices).await
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
