pub mod config;
pub mod executor;
pub mod gui;
pub mod query;
pub mod storage;

use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use config::Schema;
use executor::{ConditionMode, Executor, QueryResult};

/// CSV 샤드 위에서 동작하는 작은 SQL 저장소
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// 스키마 설명 파일
    #[arg(value_name = "SCHEMA FILE", default_value = "schema.json")]
    schema: PathBuf,

    /// 스키마 디렉터리를 만들 위치
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// 쿼리 하나를 실행하고 종료
    #[arg(short, long)]
    command: Option<String>,

    /// 데스크톱 창으로 실행
    #[arg(long)]
    gui: bool,

    /// WHERE 조건을 묶는 방식
    #[arg(long, value_enum, default_value = "left-fold")]
    condition_mode: ModeArg,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// AND/OR를 왼쪽부터 차례로 적용
    LeftFold,
    /// AND를 OR보다 먼저 적용
    Precedence,
}

impl From<ModeArg> for ConditionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::LeftFold => ConditionMode::LeftFold,
            ModeArg::Precedence => ConditionMode::Precedence,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    // 스키마를 읽지 못하면 더 진행할 수 없습니다.
    let schema = match Schema::from_file(&args.schema) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let exe = Executor::new(schema, &args.data_dir).with_mode(args.condition_mode.into());
    if let Err(e) = rt.block_on(exe.initialize()) {
        eprintln!("Fatal error: {e}");
        return ExitCode::FAILURE;
    }

    if args.gui {
        return match gui::Application::new(rt, exe).launch() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Fatal error: {e}");
                ExitCode::FAILURE
            }
        };
    }
    if let Some(command) = &args.command {
        return match rt.block_on(exe.run(strip_statement(command))) {
            QueryResult::Error(msg) => {
                eprintln!("Error: {msg}");
                ExitCode::FAILURE
            }
            result => {
                print_result(&result);
                ExitCode::SUCCESS
            }
        };
    }
    repl(&rt, &exe);
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("shardql=debug")
        } else {
            EnvFilter::new("shardql=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn repl(rt: &Runtime, exe: &Executor) {
    println!("Database initialized. Enter SQL queries (or 'exit' to quit):");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(line) = lines.next() else {
            break;
        };
        let input = match line {
            Ok(input) => input,
            Err(e) => {
                eprintln!("Failed to read line: {e}");
                break;
            }
        };
        // 종료 명령어 처리
        let src = strip_statement(&input);
        if src.is_empty() {
            continue;
        }
        if matches!(src, "exit" | "EXIT" | "quit" | "QUIT" | ".exit" | ".quit") {
            break;
        }
        match rt.block_on(exe.run(src)) {
            QueryResult::Error(msg) => eprintln!("Error: {msg}"),
            result => print_result(&result),
        }
    }
}

fn strip_statement(src: &str) -> &str {
    let src = src.trim();
    src.strip_suffix(';').unwrap_or(src).trim_end()
}

fn print_result(result: &QueryResult) {
    match result {
        QueryResult::Rows(rows) => {
            for row in rows {
                println!("{}", row.join(","));
            }
        }
        QueryResult::Inserted => println!("Row inserted successfully."),
        QueryResult::Deleted(_) => println!("Rows deleted successfully."),
        QueryResult::Error(msg) => eprintln!("Error: {msg}"),
    }
}
