use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::warn;
use services::pages::{film_recommendations, Page, Router};
use services::{AppServices, Clock, PosterLookup, QuizLoopService};
use trivia_core::model::{QuizSession, RoundVerdict, ROUND_TIME_LIMIT_SECS};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  cargo run -p app -- play        [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- leaderboard [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:trivia.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIVIA_DB_URL, TRIVIA_LLM_API_KEY, TRIVIA_OMDB_API_KEY");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRIVIA_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://trivia.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    if !app.questions_enabled() {
        warn!("TRIVIA_LLM_API_KEY is not set; questions degrade to the sentinel");
    }
    if !app.posters_enabled() {
        warn!("TRIVIA_OMDB_API_KEY is not set; posters will be absent");
    }

    match cmd {
        Command::Play => {
            let mut renderer = Renderer::new(app);
            renderer.run().await
        }
        Command::Leaderboard => {
            print_leaderboard(app.quiz_loop().as_ref()).await;
            Ok(())
        }
    }
}

async fn print_leaderboard(quiz_loop: &QuizLoopService) {
    match quiz_loop.leaderboard().await {
        Ok(entries) if entries.is_empty() => println!("No scores recorded yet."),
        Ok(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                println!("{}. {} - {}", i + 1, entry.name, entry.score);
            }
        }
        Err(err) => eprintln!("could not read the leaderboard: {err}"),
    }
}

/// Thin terminal renderer over the session state machine.
///
/// One synchronous pass per interaction: the round expiry check runs lazily
/// before any input is interpreted, matching the no-background-timer model.
struct Renderer {
    router: Router,
    quiz_loop: Arc<QuizLoopService>,
    posters: Arc<dyn PosterLookup>,
    session: QuizSession,
    last_outcome: Option<String>,
}

impl Renderer {
    fn new(app: AppServices) -> Self {
        Self {
            router: Router::new(),
            quiz_loop: app.quiz_loop(),
            posters: app.posters(),
            session: QuizSession::new(),
            last_outcome: None,
        }
    }

    async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            match self.router.current() {
                Page::Welcome => {
                    if !self.welcome_screen().await? {
                        return Ok(());
                    }
                }
                Page::Quiz => self.quiz_screen().await?,
                Page::Summary => self.summary_screen().await?,
                Page::Leaderboard => {
                    println!("\n=== {} ===", Page::Leaderboard.title());
                    print_leaderboard(self.quiz_loop.as_ref()).await;
                    self.back_to_welcome()?;
                }
                page => {
                    println!("\n=== {} ===", page.title());
                    println!("Coming soon.");
                    self.back_to_welcome()?;
                }
            }
        }
    }

    /// Returns false when the player quits.
    async fn welcome_screen(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        println!("\n=== {} ===", Page::Welcome.title());
        println!("An interactive quiz game celebrating films directed by Black filmmakers.");
        println!("[1] Start Quiz  [2] Leaderboard  [3] Director Spotlight");
        println!("[4] Share Your Score  [5] Customize Theme  [q] Quit");

        match read_line()?.as_str() {
            "1" => {
                self.session = self.quiz_loop.start_session().await;
                self.last_outcome = None;
                self.router.goto(Page::Quiz);
            }
            "2" => self.router.goto(Page::Leaderboard),
            "3" => self.router.goto(Page::DirectorSpotlight),
            "4" => self.router.goto(Page::SocialSharing),
            "5" => self.router.goto(Page::ThemeCustomization),
            "q" => return Ok(false),
            _ => {}
        }
        Ok(true)
    }

    async fn quiz_screen(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Lazy expiry check before anything else happens this pass.
        if let Some(outcome) = self.quiz_loop.check_expiry(&mut self.session).await? {
            self.last_outcome = Some(format!(
                "Time's up! The correct answer was: {}",
                outcome.correct_answer
            ));
        }
        if self.session.is_finished() {
            self.router.goto(Page::Summary);
            return Ok(());
        }

        if let Some(message) = self.last_outcome.take() {
            println!("\n{message}");
        }
        self.render_round().await;

        let input = read_line()?;
        // Re-check expiry against the time the player actually took.
        if let Some(outcome) = self.quiz_loop.check_expiry(&mut self.session).await? {
            self.last_outcome = Some(format!(
                "Time's up! The correct answer was: {}",
                outcome.correct_answer
            ));
            return Ok(());
        }

        match input.as_str() {
            "s" => {
                let result = self.quiz_loop.submit_answer(&mut self.session).await?;
                self.last_outcome = Some(match result.outcome.verdict {
                    RoundVerdict::Correct => {
                        format!("Correct! +{} points", result.outcome.points_awarded)
                    }
                    _ => format!(
                        "Incorrect. The correct answer is: {}",
                        result.outcome.correct_answer
                    ),
                });
            }
            "" => {}
            choice => {
                let selection = {
                    let round = self.session.current_round();
                    choice
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| round.and_then(|r| r.question().options().get(i)))
                        .cloned()
                };
                match selection {
                    Some(option) => {
                        if let Err(err) = self.session.select_option(&option) {
                            println!("{err}");
                        }
                    }
                    None => println!("Pick an option number, or 's' to submit."),
                }
            }
        }
        Ok(())
    }

    async fn render_round(&self) {
        let Some(round) = self.session.current_round() else {
            return;
        };
        let question = round.question();

        println!("\n--- Question {} of 10 ---", self.session.round_index() + 1);
        println!("{}", question.prompt());
        for (i, option) in question.options().iter().enumerate() {
            let marker = if round.selected() == Some(option.as_str()) {
                "*"
            } else {
                " "
            };
            println!(" {marker}[{}] {option}", i + 1);
        }
        if !question.is_answerable() {
            println!("No options available for this question.");
        }

        let elapsed = self
            .session
            .elapsed(self.quiz_loop.clock().now())
            .map_or(0, |d| d.num_seconds());
        println!(
            "Time remaining: {} seconds | Progress: {:.0}%",
            (ROUND_TIME_LIMIT_SECS - elapsed).max(0),
            self.session.progress() * 100.0
        );

        if let Some(url) = self.posters.lookup(question.subject_title()).await {
            println!("Poster: {url}");
        }
        print!("Answer (number), 's' to submit, Enter to refresh: ");
        let _ = io::stdout().flush();
    }

    async fn summary_screen(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(message) = self.last_outcome.take() {
            println!("\n{message}");
        }
        println!("\n=== {} ===", Page::Summary.title());
        println!("Your final score: {}", self.session.score());

        while !self.session.score_recorded() {
            print!("Enter your name for the leaderboard (blank to skip): ");
            let _ = io::stdout().flush();
            let name = read_line()?;
            if name.is_empty() {
                break;
            }
            // A failed insert is fatal to this attempt only; the prompt is
            // the retry.
            if let Err(err) = self.quiz_loop.record_score(&mut self.session, &name).await {
                eprintln!("could not record your score: {err}");
            }
        }

        println!("Film Recommendations:");
        for film in film_recommendations() {
            println!("  {film}");
        }

        self.router.goto(Page::Leaderboard);
        Ok(())
    }

    fn back_to_welcome(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        println!("Press Enter to return to the welcome screen.");
        read_line()?;
        self.router.goto(Page::Welcome);
        Ok(())
    }
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line)?;
    if n == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
